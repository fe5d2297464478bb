use std::fmt;

use serde::Serialize;

pub const UNKNOWN_REGION: &str = "Unknown";

/// Short identifier of a DLC pack, as it appears in the network table.
/// Used both for graph node ids and dependency index keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DlcId(String);

impl DlcId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DlcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One row of the lookup table: the source of truth for known short names.
#[derive(Debug, Clone)]
pub struct LookupEntry {
    pub canonical_name: String,
    pub short_name: String,
    pub region: String,
}

/// One row of the network table: a (route, locomotive) pairing with the
/// short names of the DLCs it requires, already split and trimmed.
#[derive(Debug, Clone)]
pub struct RequirementRow {
    pub route: String,
    pub locomotive: String,
    pub required_dlcs: Vec<String>,
}

/// Resolution result for a single short name. Unresolved names stay usable:
/// they carry `known = false` and the "Unknown" region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
    pub short_name: String,
    pub canonical_name: Option<String>,
    pub region: String,
    pub known: bool,
}
