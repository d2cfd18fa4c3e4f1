use std::{cmp::Ordering, fmt};

/// A physical table discovered from database metadata.
///
/// Tables order and compare by name only so that a sorted slice can be
/// searched with [`Table::find`].
#[derive(Debug, Clone)]
pub struct Table {
    /// Name of the table
    pub name: String,

    /// Column names, in the order the database reports them
    pub columns: Vec<String>,

    /// Short alias accepted as a qualifier, e.g. `exon__dm` for
    /// `human_gene__exon__dm`.
    pub shortcut: String,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let name = name.into();
        Self {
            shortcut: name.clone(),
            columns: columns.into_iter().map(Into::into).collect(),
            name,
        }
    }

    /// Creates a table whose shortcut is derived from the star base it
    /// belongs to.
    pub fn for_star_base(
        star_base: &str,
        name: impl Into<String>,
        columns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut table = Table::new(name, columns);
        table.shortcut = shortcut(star_base, &table.name);
        table
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Returns the table's own spelling of `column`, compared
    /// case-insensitively.
    pub fn column_ignore_case(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.eq_ignore_ascii_case(column))
            .map(String::as_str)
    }

    pub fn is_main(&self) -> bool {
        is_main_table(&self.name)
    }

    pub fn is_dimension(&self) -> bool {
        self.name.to_ascii_lowercase().ends_with("_dm")
    }

    /// Binary searches `tables`, which must be sorted by name.
    pub fn find<'a>(name: &str, tables: &'a [Table]) -> Option<&'a Table> {
        tables
            .binary_search_by(|table| table.name.as_str().cmp(name))
            .ok()
            .map(|index| &tables[index])
    }
}

/// Returns `true` for names of the form `<star>_main` or `<star>__main`.
pub fn is_main_table(name: &str) -> bool {
    name.ends_with("_main")
}

/// Returns `true` if `name` starts with `star_base`, ignoring ASCII case.
pub fn starts_with_ignore_case(name: &str, star_base: &str) -> bool {
    name.len() >= star_base.len()
        && name.as_bytes()[..star_base.len()].eq_ignore_ascii_case(star_base.as_bytes())
}

fn shortcut(star_base: &str, name: &str) -> String {
    if !starts_with_ignore_case(name, star_base) {
        return name.to_string();
    }

    let rest = name[star_base.len()..].trim_start_matches('_');
    if rest.is_empty() {
        name.to_string()
    } else {
        rest.to_string()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Table {}

impl PartialOrd for Table {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Table {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.columns.join(", "))
    }
}
