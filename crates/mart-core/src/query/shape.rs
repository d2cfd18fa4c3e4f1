use serde::{Deserialize, Serialize};

/// Star bases and primary keys of a query.
///
/// Queries with the same shape discover the same tables and build the same
/// mapper candidates, so the shape keys both caches. Keys compare by value;
/// [`QueryShape::fingerprint`] is only a compact label for logs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryShape {
    pub star_bases: Vec<String>,
    pub primary_keys: Vec<String>,
}

impl QueryShape {
    pub fn new(star_bases: Vec<String>, primary_keys: Vec<String>) -> QueryShape {
        QueryShape {
            star_bases,
            primary_keys,
        }
    }

    /// Order-sensitive polynomial (base 31) hash over the star bases followed
    /// by the primary keys.
    pub fn fingerprint(&self) -> u32 {
        self.star_bases
            .iter()
            .chain(&self.primary_keys)
            .fold(0u32, |acc, s| acc.wrapping_mul(31).wrapping_add(string_hash(s)))
    }
}

fn string_hash(s: &str) -> u32 {
    s.encode_utf16()
        .fold(0u32, |acc, c| acc.wrapping_mul(31).wrapping_add(u32::from(c)))
}
