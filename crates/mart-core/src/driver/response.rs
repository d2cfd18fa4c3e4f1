/// Rows returned by a query, with every value rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Rows {
    pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Rows {
        Rows {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: vec![],
        }
    }

    /// Appends a row; `None` is SQL `NULL`.
    pub fn push<I, V>(&mut self, row: I)
    where
        I: IntoIterator<Item = Option<V>>,
        V: Into<String>,
    {
        self.rows
            .push(row.into_iter().map(|value| value.map(Into::into)).collect());
    }

    /// Index of the column called `name`, compared case-insensitively.
    ///
    /// Qualified names (`table.column`) match on the column part. When
    /// several columns match, the last one wins.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.rsplit('.').next().unwrap_or(name);
        self.columns.iter().rposition(|column| {
            let column = column.rsplit('.').next().unwrap_or(column);
            column.eq_ignore_ascii_case(name)
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
