use mart_core::{Field, Table};

use std::{collections::HashMap, fmt};

/// Resolves column names to the table that owns them.
///
/// A mapper covers an ordered list of tables. Bare (`name`), fully
/// qualified (`table.name`) and shortcut qualified (`shortcut.name`) names
/// all resolve to the first table in that list that defines the column.
/// Fields carrying a table constraint resolve through a secondary
/// `column -> tables` index instead, picking the first table whose name
/// contains the constraint.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    /// Key used to join the mapper's tables to each other.
    primary_key: String,

    /// Table names in priority order.
    tables: Vec<String>,

    /// Every name variant mapped to the index of its first owning table.
    name_to_table: HashMap<String, usize>,

    /// Bare column name mapped to every owning table, in priority order.
    column_tables: HashMap<String, Vec<usize>>,
}

impl FieldMapper {
    /// Builds the lookup for `tables`. The order of `tables` matters: an
    /// ambiguous column resolves to the first table defining it.
    pub fn new<'a>(
        tables: impl IntoIterator<Item = &'a Table>,
        primary_key: impl Into<String>,
    ) -> Self {
        let mut mapper = FieldMapper {
            primary_key: primary_key.into(),
            tables: vec![],
            name_to_table: HashMap::new(),
            column_tables: HashMap::new(),
        };

        for (index, table) in tables.into_iter().enumerate() {
            mapper.tables.push(table.name.clone());

            for column in &table.columns {
                for name in [
                    column.clone(),
                    format!("{}.{}", table.name, column),
                    format!("{}.{}", table.shortcut, column),
                ] {
                    mapper.name_to_table.entry(name).or_insert(index);
                }

                let owners = mapper.column_tables.entry(column.clone()).or_default();
                if !owners.contains(&index) {
                    owners.push(index);
                }
            }
        }

        mapper
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Table names covered by this mapper, in priority order.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    /// Returns `table.column` for `field`, or `None` if it cannot be mapped.
    pub fn qualified_name(&self, field: &impl Field) -> Option<String> {
        let name = field.field();

        let index = match field.table_constraint() {
            None => *self.name_to_table.get(name)?,
            Some(constraint) => *self
                .column_tables
                .get(name)?
                .iter()
                .find(|&&index| self.tables[index].contains(constraint))?,
        };

        Some(format!("{}.{}", self.tables[index], stripped_column(name)))
    }

    /// Returns the name of the table owning `field`.
    pub fn table_name(&self, field: &impl Field) -> Option<String> {
        let qualified = self.qualified_name(field)?;
        let (table, _) = qualified.split_once('.')?;
        Some(table.to_string())
    }

    pub fn can_map(&self, field: &impl Field) -> bool {
        self.qualified_name(field).is_some()
    }

    pub fn can_map_all<F: Field>(&self, fields: &[F]) -> bool {
        fields.iter().all(|field| self.can_map(field))
    }
}

/// Strips a leading `prefix.` from `prefix.column`.
pub(crate) fn stripped_column(column: &str) -> &str {
    match column.split_once('.') {
        Some((_, column)) => column,
        None => column,
    }
}

impl fmt::Display for FieldMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[tables={}, key={}, #map={}]",
            self.tables.join("+"),
            self.primary_key,
            self.name_to_table.len()
        )
    }
}
