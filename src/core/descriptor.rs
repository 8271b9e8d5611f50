//! Query descriptors: one extract/load statement pair per unit of transfer.

use serde::{Deserialize, Serialize};

use crate::error::{EtlError, Result};

/// An immutable extract/load statement pair.
///
/// The extract statement runs against the source; the load statement is a
/// parameterized template (`$1`..`$N`) executed against the warehouse once
/// per extracted row, binding column values positionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    extract: String,
    load: String,
}

impl QueryDescriptor {
    /// Create a descriptor, rejecting empty statements.
    pub fn new(extract: impl Into<String>, load: impl Into<String>) -> Result<Self> {
        let extract = extract.into();
        let load = load.into();

        if extract.trim().is_empty() {
            return Err(EtlError::Config("extract statement is empty".to_string()));
        }
        if load.trim().is_empty() {
            return Err(EtlError::Config("load statement is empty".to_string()));
        }

        Ok(Self { extract, load })
    }

    /// The extract statement.
    pub fn extract(&self) -> &str {
        &self.extract
    }

    /// The load statement.
    pub fn load(&self) -> &str {
        &self.load
    }

    /// Number of positional parameters (`$1`..`$N`) in the load statement.
    ///
    /// The highest placeholder index wins, so `VALUES ($1, $2, $1)` has an
    /// arity of 2. Used to reject shape mismatches before any row is
    /// written.
    #[must_use]
    pub fn load_arity(&self) -> usize {
        let bytes = self.load.as_bytes();
        let mut max = 0usize;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'$' {
                let mut j = i + 1;
                let mut n = 0usize;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    n = n * 10 + usize::from(bytes[j] - b'0');
                    j += 1;
                }
                if j > i + 1 && n > max {
                    max = n;
                }
                i = j;
            } else {
                i += 1;
            }
        }

        max
    }
}
