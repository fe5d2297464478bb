use std::collections::{HashMap, HashSet};

use crate::core::{DlcId, IdentifierResolver, RequirementRow, ResolvedIdentity};
use crate::graph::{DependencyIndex, Edge, Node, RouteGraph, RouteRequirement};

/// Builds the deduplicated directed graph plus the dependency index in a
/// single pass over the network rows, in input order.
///
/// Unresolved short names never become nodes or edges but are still recorded
/// verbatim in the dependency index for their row.
pub fn build_graph(rows: &[RequirementRow], resolver: &IdentifierResolver) -> RouteGraph {
    let mut nodes: Vec<Node> = Vec::new();
    let mut node_ids: HashSet<DlcId> = HashSet::new();
    let mut regions: Vec<String> = Vec::new();
    let mut edges: Vec<Edge> = Vec::new();
    let mut edge_slots: HashMap<(DlcId, DlcId), usize> = HashMap::new();
    let mut index = DependencyIndex::default();

    for row in rows {
        let route = row.route.trim();
        if route.is_empty() {
            continue;
        }
        let route_id = DlcId::new(route);
        let route_identity = resolver.resolve(route);
        if route_identity.known {
            ensure_node(&route_identity, &mut nodes, &mut node_ids, &mut regions);
        }

        let required: Vec<ResolvedIdentity> = row
            .required_dlcs
            .iter()
            .map(|token| resolver.resolve(token))
            .collect();
        index.push(
            route_id.clone(),
            RouteRequirement {
                locomotive: row.locomotive.clone(),
                required_dlcs: required.clone(),
            },
        );

        for identity in &required {
            if !identity.known {
                continue;
            }
            ensure_node(identity, &mut nodes, &mut node_ids, &mut regions);
            if !route_identity.known {
                continue;
            }
            let target_id = DlcId::new(identity.short_name.clone());
            let key = (route_id.clone(), target_id.clone());
            match edge_slots.get(&key) {
                Some(&slot) => edges[slot].locomotives.push(row.locomotive.clone()),
                None => {
                    edge_slots.insert(key, edges.len());
                    edges.push(Edge {
                        id: format!("{route_id}-{target_id}"),
                        source: route_id.clone(),
                        target: target_id,
                        locomotives: vec![row.locomotive.clone()],
                    });
                }
            }
        }
    }

    RouteGraph {
        nodes,
        edges,
        regions,
        dependency_index: index,
    }
}

fn ensure_node(
    identity: &ResolvedIdentity,
    nodes: &mut Vec<Node>,
    node_ids: &mut HashSet<DlcId>,
    regions: &mut Vec<String>,
) {
    let id = DlcId::new(identity.short_name.clone());
    if !node_ids.insert(id.clone()) {
        return;
    }
    if !regions.iter().any(|region| region == &identity.region) {
        regions.push(identity.region.clone());
    }
    nodes.push(Node {
        id,
        label: identity.short_name.clone(),
        region: identity.region.clone(),
        full_name: identity
            .canonical_name
            .clone()
            .unwrap_or_else(|| identity.short_name.clone()),
    });
}
