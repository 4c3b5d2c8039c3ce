use crate::error::TableDefError;
use glob::Pattern;

/// Selects which worksheets of a workbook are read.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name patterns; `None` accepts every sheet.
    pub sheet_name_patterns: Option<Vec<Pattern>>,

    /// Maximum number of sheets to read.
    pub sheet_limit: Option<usize>,
}

impl Criteria {
    /// Accepts every sheet.
    pub fn all() -> Self {
        Criteria::default()
    }

    /// Accepts sheets whose names match the glob pattern (`orders_*`).
    pub fn matching(pattern: &str) -> Result<Self, TableDefError> {
        Ok(Criteria {
            sheet_name_patterns: Some(vec![Pattern::new(pattern)?]),
            sheet_limit: None,
        })
    }

    /// Accepts only the sheet with exactly this name.
    pub fn exact(name: &str) -> Result<Self, TableDefError> {
        Ok(Criteria {
            sheet_name_patterns: Some(vec![Pattern::new(&Pattern::escape(name))?]),
            sheet_limit: Some(1),
        })
    }

    /// Returns true if no patterns are specified or the name matches any of them.
    pub fn accept(&self, sheet_name: &str) -> bool {
        match &self.sheet_name_patterns {
            Some(patterns) => patterns.iter().any(|pattern| pattern.matches(sheet_name)),
            None => true,
        }
    }

    /// Returns true once `count` sheets have been read.
    pub(crate) fn is_full(&self, count: usize) -> bool {
        self.sheet_limit.map(|limit| count >= limit).unwrap_or(false)
    }
}
