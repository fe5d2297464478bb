use std::collections::HashMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::core::{DlcId, ResolvedIdentity};

pub mod builder;
pub mod highlight;
pub mod viz;

pub use builder::build_graph;

/// A known DLC pack, visible in the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: DlcId,
    pub label: String,
    pub region: String,
    pub full_name: String,
}

/// Directed requirement edge. The (source, target) pair is never
/// order-normalized, so A->B and B->A are distinct edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: DlcId,
    pub target: DlcId,
    pub locomotives: Vec<String>,
}

/// One (locomotive, required DLCs) pairing from the network table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequirement {
    pub locomotive: String,
    pub required_dlcs: Vec<ResolvedIdentity>,
}

/// Per-route requirement index keyed by route short name, in first-seen row
/// order. Built from every row, so it also covers routes that never resolve
/// to a graph node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyIndex {
    entries: HashMap<DlcId, Vec<RouteRequirement>>,
    order: Vec<DlcId>,
}

impl DependencyIndex {
    pub fn push(&mut self, route: DlcId, requirement: RouteRequirement) {
        let slot = self.entries.entry(route.clone()).or_default();
        if slot.is_empty() {
            self.order.push(route);
        }
        slot.push(requirement);
    }

    pub fn get(&self, route: &DlcId) -> Option<&[RouteRequirement]> {
        self.entries.get(route).map(Vec::as_slice)
    }

    pub fn contains(&self, route: &DlcId) -> bool {
        self.entries.contains_key(route)
    }

    pub fn routes(&self) -> &[DlcId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for DependencyIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for route in &self.order {
            if let Some(requirements) = self.entries.get(route) {
                map.serialize_entry(route, requirements)?;
            }
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub regions: Vec<String>,
    pub dependency_index: DependencyIndex,
}
