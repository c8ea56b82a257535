//! Dataset fingerprinting for the run summary.
//!
//! The hash covers every scored driver's monthly inputs, so two runs over the
//! same data produce the same `DatasetHash` regardless of fetch timing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::MonthlySeries;

/// BLAKE3 content hash of the scored inputs, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    /// Hash driver inputs. `BTreeMap` gives a deterministic key order.
    pub fn of_inputs(inputs: &BTreeMap<String, MonthlySeries>) -> Self {
        let mut hasher = blake3::Hasher::new();
        for (key, series) in inputs {
            hasher.update(key.as_bytes());
            hasher.update(&[0]);
            for p in series.points() {
                hasher.update(p.date.to_string().as_bytes());
                match p.value {
                    Some(v) => hasher.update(&v.to_bits().to_le_bytes()),
                    None => hasher.update(b"null"),
                };
            }
            hasher.update(&[0xff]);
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
