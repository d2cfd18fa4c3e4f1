use anyhow::{bail, Context, Result};
use clap::Args;
use mart::{Attribute, Filter, Query};
use std::path::PathBuf;

/// Query given either as a JSON file or as individual flags. Flags are
/// applied on top of the file.
#[derive(Args, Debug, Default)]
pub(crate) struct QueryArgs {
    /// JSON file holding a serialized query
    #[arg(long)]
    query_file: Option<PathBuf>,

    /// Table name prefix of the star schema, repeatable
    #[arg(long = "star-base")]
    star_bases: Vec<String>,

    /// Candidate join key, repeatable, in priority order
    #[arg(long = "primary-key")]
    primary_keys: Vec<String>,

    /// Column to select, as `field` or `field@table-constraint`
    #[arg(short, long = "attribute")]
    attributes: Vec<String>,

    /// `field=value`, `field>=value`, `field like value`, `field in a,b,c`,
    /// `field is null` or `field is not null`; prefix the field with
    /// `constraint:` to pin its table
    #[arg(short, long = "filter")]
    filters: Vec<String>,

    /// Maximum number of rows; 0 means unlimited
    #[arg(long)]
    limit: Option<usize>,
}

impl QueryArgs {
    pub(crate) fn to_query(&self) -> Result<Query> {
        let mut query = match &self.query_file {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => Query::new(),
        };

        if !self.star_bases.is_empty() {
            query = query.with_star_bases(&self.star_bases);
        }

        if !self.primary_keys.is_empty() {
            query = query.with_primary_keys(&self.primary_keys);
        }

        for attribute in &self.attributes {
            query = query.with_attribute(parse_attribute(attribute));
        }

        for filter in &self.filters {
            query = query.with_filter(parse_filter(filter)?);
        }

        if let Some(limit) = self.limit {
            query = query.with_limit(limit);
        }

        Ok(query)
    }
}

fn parse_attribute(arg: &str) -> Attribute {
    match arg.split_once('@') {
        Some((field, constraint)) => Attribute::new(field).with_table_constraint(constraint),
        None => Attribute::new(arg),
    }
}

fn parse_filter(arg: &str) -> Result<Filter> {
    let (constraint, arg) = match arg.split_once(':') {
        Some((constraint, rest)) if is_identifier(constraint) => (Some(constraint), rest),
        _ => (None, arg),
    };

    let filter = parse_condition(arg.trim())?;

    Ok(match constraint {
        Some(constraint) => filter.with_table_constraint(constraint),
        None => filter,
    })
}

const OPERATORS: [&str; 10] = [
    " in ", " not like ", " like ", "<=", ">=", "<>", "!=", "=", "<", ">",
];

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_condition(arg: &str) -> Result<Filter> {
    let lower = arg.to_ascii_lowercase();

    if let Some(field) = lower
        .strip_suffix(" is not null")
        .map(|_| &arg[..arg.len() - " is not null".len()])
    {
        return Ok(Filter::is_not_null(field.trim()));
    }

    if let Some(field) = lower
        .strip_suffix(" is null")
        .map(|_| &arg[..arg.len() - " is null".len()])
    {
        return Ok(Filter::is_null(field.trim()));
    }

    // The leftmost operator splits field from value; at equal positions the
    // longer operator wins.
    let op = OPERATORS
        .iter()
        .filter_map(|op| lower.find(op).map(|index| (index, *op)))
        .min_by_key(|(index, op)| (*index, std::cmp::Reverse(op.len())));

    if let Some((index, op)) = op {
        let field = arg[..index].trim();
        let value = arg[index + op.len()..].trim();

        return Ok(match op.trim() {
            "in" => Filter::in_list(field, value.split(',').map(str::trim)),
            op => Filter::compare(field, op.parse()?, value),
        });
    }

    bail!("cannot parse filter `{arg}`; expected e.g. `chr_name=1`")
}
