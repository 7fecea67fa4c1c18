//! Sequential identifier allocation. Book and student keys are human-readable
//! strings (`BK-0001`, `LIB-0001`) and the next key is always derived from the
//! current maximum, so gaps left by deletes are never filled.

use std::fmt;

use crate::error::LibraryError;

/// Width of the zero-padded numeric suffix. Numbers past 9999 keep growing.
const ID_DIGITS: usize = 4;

/// Key families allocated by the application.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IdPrefix {
    Book,
    Student,
}

impl IdPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            IdPrefix::Book => "BK",
            IdPrefix::Student => "LIB",
        }
    }

    /// Render `number` with this prefix and the fixed padding.
    pub fn format(self, number: u64) -> String {
        format!("{}-{:0width$}", self.as_str(), number, width = ID_DIGITS)
    }

    /// Extract the numeric suffix from an identifier of this family.
    pub fn parse(self, id: &str) -> Result<u64, LibraryError> {
        let malformed = || LibraryError::MalformedId {
            prefix: self.as_str(),
            id: id.to_string(),
        };

        let digits = id
            .strip_prefix(self.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(malformed)?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        digits.parse::<u64>().map_err(|_| malformed())
    }

    /// Accept only the canonical spelling this family allocates: the prefix,
    /// a dash, and at least four digits without extra leading zeros.
    pub fn check(self, id: &str) -> Result<(), LibraryError> {
        let number = self.parse(id)?;
        if self.format(number) == id {
            Ok(())
        } else {
            Err(LibraryError::MalformedId {
                prefix: self.as_str(),
                id: id.to_string(),
            })
        }
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the identifier following `last`, or the first one when the table is
/// empty.
pub fn next_identifier(prefix: IdPrefix, last: Option<&str>) -> Result<String, LibraryError> {
    let next = match last {
        Some(id) => prefix
            .parse(id)?
            .checked_add(1)
            .ok_or_else(|| LibraryError::IdsExhausted {
                prefix: prefix.as_str(),
                last: id.to_string(),
            })?,
        None => 1,
    };
    Ok(prefix.format(next))
}
