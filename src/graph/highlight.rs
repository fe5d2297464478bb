use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::core::DlcId;
use crate::graph::{DependencyIndex, Edge, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeClass {
    Selected,
    Required,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeClass {
    Highlighted,
    Normal,
}

#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub node_class: BTreeMap<DlcId, NodeClass>,
    pub edge_class: BTreeMap<String, EdgeClass>,
}

/// Union of every required DLC short name across all index entries for the
/// route, deduplicated. Includes names that never resolved to a node.
pub fn required_closure(index: &DependencyIndex, route: &DlcId) -> HashSet<String> {
    let mut closure = HashSet::new();
    if let Some(entries) = index.get(route) {
        for entry in entries {
            for required in &entry.required_dlcs {
                closure.insert(required.short_name.clone());
            }
        }
    }
    closure
}

/// Pure classification of nodes and edges for a selection. `selected = None`
/// clears the selection and classifies everything as normal.
pub fn classify(
    selected: Option<&DlcId>,
    nodes: &[Node],
    edges: &[Edge],
    index: &DependencyIndex,
) -> Classification {
    let closure = selected
        .map(|route| required_closure(index, route))
        .unwrap_or_default();

    let node_class = nodes
        .iter()
        .map(|node| {
            let class = match selected {
                Some(route) if *route == node.id => NodeClass::Selected,
                Some(_) if closure.contains(node.id.as_str()) => NodeClass::Required,
                _ => NodeClass::Normal,
            };
            (node.id.clone(), class)
        })
        .collect();

    let edge_class = edges
        .iter()
        .map(|edge| {
            let highlighted = selected
                .map(|route| *route == edge.source && closure.contains(edge.target.as_str()))
                .unwrap_or(false);
            let class = if highlighted {
                EdgeClass::Highlighted
            } else {
                EdgeClass::Normal
            };
            (edge.id.clone(), class)
        })
        .collect();

    Classification {
        node_class,
        edge_class,
    }
}
