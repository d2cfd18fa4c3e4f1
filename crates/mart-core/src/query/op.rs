use crate::Error;

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Comparison operator of a [`Filter`](super::Filter).
///
/// Parsing ignores case and collapses runs of whitespace, so `NOT  LIKE`
/// reads as [`Op::NotLike`]. Anything outside this set is an invalid query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Op {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "like")]
    Like,
    #[serde(rename = "not like")]
    NotLike,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
            Op::Like => "like",
            Op::NotLike => "not like",
        }
    }

    /// Word operators are written with a space on each side.
    pub fn is_word(self) -> bool {
        matches!(self, Op::Like | Op::NotLike)
    }
}

impl FromStr for Op {
    type Err = Error;

    fn from_str(s: &str) -> Result<Op, Error> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        Ok(match normalized.as_str() {
            "=" => Op::Eq,
            "!=" | "<>" => Op::Ne,
            "<" => Op::Lt,
            "<=" => Op::Le,
            ">" => Op::Gt,
            ">=" => Op::Ge,
            "like" => Op::Like,
            "not like" => Op::NotLike,
            _ => {
                return Err(Error::invalid_query(format!(
                    "unsupported comparison operator `{s}`"
                )))
            }
        })
    }
}

impl TryFrom<String> for Op {
    type Error = Error;

    fn try_from(s: String) -> Result<Op, Error> {
        s.parse()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
