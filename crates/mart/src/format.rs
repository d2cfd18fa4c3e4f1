use std::io::{self, Write};

/// How result rows are written.
///
/// Every row is written on its own line with values separated by
/// `separator`. `NULL` values are written as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    separator: String,
}

impl Format {
    pub fn tabulated(separator: impl Into<String>) -> Format {
        Format {
            separator: separator.into(),
        }
    }

    /// Tab separated values
    pub fn tsv() -> Format {
        Format::tabulated("\t")
    }

    /// Comma separated values, without quoting
    pub fn csv() -> Format {
        Format::tabulated(",")
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub(crate) fn write_row<'a>(
        &self,
        out: &mut impl Write,
        values: impl IntoIterator<Item = Option<&'a str>>,
    ) -> io::Result<()> {
        let mut s = "";
        for value in values {
            out.write_all(s.as_bytes())?;
            if let Some(value) = value {
                out.write_all(value.as_bytes())?;
            }
            s = &self.separator;
        }
        out.write_all(b"\n")
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::tsv()
    }
}
