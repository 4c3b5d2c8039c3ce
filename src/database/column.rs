/// One attribute of a table, as declared on a row of the definition sheet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Raw type expression such as `VARCHAR(32)` or `INT UNSIGNED`
    pub kind: String,
    /// Part of the primary key
    pub primary_key: bool,
    pub not_null: bool,
    pub unique: bool,
    /// Gets a single-column secondary index
    pub index: bool,
    /// Free-form DDL fragment appended to the column, e.g. `AUTO_INCREMENT`
    pub option: String,
    pub comment: String,
    /// Contributed by the shared common-columns sheet rather than the table itself
    pub is_common: bool,
}

impl Column {
    /// Creates a plain nullable column.
    pub fn new(name: &str, kind: &str) -> Self {
        Column {
            name: name.to_owned(),
            kind: kind.to_owned(),
            ..Default::default()
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn index(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn option(mut self, option: &str) -> Self {
        self.option = option.to_owned();
        self
    }

    pub fn comment(mut self, comment: &str) -> Self {
        self.comment = comment.to_owned();
        self
    }

    pub fn common(mut self) -> Self {
        self.is_common = true;
        self
    }
}

/// A named, ordered group of columns backing a unique constraint or an index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Key {
    pub name: String,
    /// Column names in declared key order
    pub columns: Vec<String>,
}

impl Key {
    pub fn new<I, S>(name: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Key {
            name: name.to_owned(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}
