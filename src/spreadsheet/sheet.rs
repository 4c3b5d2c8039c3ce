use crate::spreadsheet::Grid;

/// A worksheet held in memory as rows of text cells.
///
/// Rows may have different lengths; any cell beyond the end of its row reads
/// as empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sheet {
    /// Sheet name
    pub name: String,
    /// Cell values, row by row
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Creates an empty sheet.
    pub fn new(name: &str) -> Self {
        Sheet {
            name: name.to_owned(),
            rows: Vec::new(),
        }
    }

    /// Creates a sheet from literal rows.
    pub fn from_rows<R, S>(name: &str, rows: Vec<R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Sheet {
            name: name.to_owned(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Stores a value, growing the sheet as needed. Empty values are not stored.
    pub fn set(&mut self, row: usize, col: usize, value: &str) {
        if value.is_empty() {
            return;
        }
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_owned();
    }
}

impl Grid for Sheet {
    fn value(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_initial() {
        let sheet = Sheet::new("users");
        assert_eq!(sheet.name, "users");
        assert_eq!(sheet.row_count(), 0);
        assert_eq!(sheet.value(3, 3), "");
    }

    #[test]
    fn sheet_set_grows_ragged_rows() {
        let mut sheet = Sheet::new("");
        sheet.set(1, 3, "x");
        sheet.set(3, 1, "y");
        sheet.set(5, 5, "");

        assert_eq!(sheet.row_count(), 4);
        assert_eq!(sheet.rows[0].len(), 0);
        assert_eq!(sheet.rows[1].len(), 4);
        assert_eq!(sheet.value(1, 3), "x");
        assert_eq!(sheet.value(3, 1), "y");
        assert_eq!(sheet.value(3, 2), "");
    }

    #[test]
    fn sheet_from_rows() {
        let sheet = Sheet::from_rows("s", vec![vec!["", "1", "id"], vec!["", "2"]]);
        assert_eq!(sheet.value(0, 2), "id");
        assert_eq!(sheet.value(1, 1), "2");
        assert_eq!(sheet.value(1, 2), "");
        assert_eq!(sheet.value(9, 0), "");
    }
}
