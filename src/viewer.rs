use serde::Serialize;

use crate::core::{DlcId, IdentifierResolver, LookupEntry, RequirementRow};
use crate::graph::highlight::{self, Classification};
use crate::graph::{build_graph, DependencyIndex, Edge, RouteGraph};
use crate::layout::{LayoutEngine, LayoutParams, Point, Result, Viewport};

/// Positioned read model handed to the rendering boundary. Rebuilt from the
/// engine after every tick; the renderer never touches engine internals.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<Edge>,
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionedNode {
    pub id: DlcId,
    pub label: String,
    pub region: String,
    pub full_name: String,
    pub x: f64,
    pub y: f64,
}

/// Owns the graph, the layout engine and the current selection. Loading a
/// new graph discards the previous layout state and clears the selection.
#[derive(Debug)]
pub struct Viewer {
    params: LayoutParams,
    viewport: Viewport,
    graph: RouteGraph,
    layout: LayoutEngine,
    selected: Option<DlcId>,
}

impl Viewer {
    pub fn new(params: LayoutParams, viewport: Viewport) -> Self {
        let graph = RouteGraph::default();
        let layout = LayoutEngine::new(&graph, params.clone(), viewport);
        Self {
            params,
            viewport,
            graph,
            layout,
            selected: None,
        }
    }

    /// Builds an immutable graph from fully loaded tables, then reinitializes
    /// the layout over it. No partial graph is ever observable.
    pub fn load_graph(&mut self, lookup: &[LookupEntry], network: &[RequirementRow]) {
        let resolver = IdentifierResolver::new(lookup);
        self.graph = build_graph(network, &resolver);
        self.layout = LayoutEngine::new(&self.graph, self.params.clone(), self.viewport);
        self.selected = None;
    }

    pub fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    pub fn dependency_index(&self) -> &DependencyIndex {
        &self.graph.dependency_index
    }

    /// `None` deselects; clicking another node switches the selection.
    pub fn select_node(&mut self, id: Option<DlcId>) {
        self.selected = id;
    }

    pub fn selected(&self) -> Option<&DlcId> {
        self.selected.as_ref()
    }

    pub fn classification(&self) -> Classification {
        highlight::classify(
            self.selected.as_ref(),
            &self.graph.nodes,
            &self.graph.edges,
            &self.graph.dependency_index,
        )
    }

    pub fn snapshot(&self) -> Snapshot {
        let nodes = self
            .graph
            .nodes
            .iter()
            .map(|node| {
                let point = self.layout.position(&node.id).unwrap_or_default();
                PositionedNode {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    region: node.region.clone(),
                    full_name: node.full_name.clone(),
                    x: point.x,
                    y: point.y,
                }
            })
            .collect();
        Snapshot {
            nodes,
            edges: self.graph.edges.clone(),
            regions: self.graph.regions.clone(),
        }
    }

    pub fn start(&mut self) {
        self.layout.start();
    }

    pub fn stop(&mut self) {
        self.layout.stop();
    }

    pub fn reheat(&mut self) {
        self.layout.reheat();
    }

    pub fn tick(&mut self) -> Result<bool> {
        self.layout.tick()
    }

    pub fn run_to_rest(&mut self, max_ticks: u64) -> Result<u64> {
        self.layout.run_to_rest(max_ticks)
    }

    pub fn on_drag_start(&mut self, id: &DlcId, pointer: Point) -> Result<()> {
        self.layout.on_drag_start(id, pointer)
    }

    pub fn on_drag_move(&mut self, id: &DlcId, pointer: Point) -> Result<()> {
        self.layout.on_drag_move(id, pointer)
    }

    pub fn on_drag_end(&mut self, id: &DlcId) -> Result<()> {
        self.layout.on_drag_end(id)
    }
}
