use std::collections::HashMap;
use std::f64::consts::PI;

use crate::core::DlcId;
use crate::graph::RouteGraph;
use crate::layout::{LayoutError, LayoutParams, Point, Result, Viewport};

const MIN_DISTANCE: f64 = 1e-6;
const INITIAL_RADIUS: f64 = 10.0;

#[derive(Debug)]
struct SimNode {
    id: DlcId,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    fx: Option<f64>,
    fy: Option<f64>,
}

impl SimNode {
    fn pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging(DlcId),
}

/// Discrete-time force simulation over the node set. Owns all position
/// state; it is rebuilt from scratch whenever a new graph is loaded.
#[derive(Debug)]
pub struct LayoutEngine {
    params: LayoutParams,
    viewport: Viewport,
    nodes: Vec<SimNode>,
    index: HashMap<DlcId, usize>,
    links: Vec<(usize, usize)>,
    alpha: f64,
    alpha_target: f64,
    running: bool,
    ticks: u64,
    drag: DragState,
}

impl LayoutEngine {
    pub fn new(graph: &RouteGraph, params: LayoutParams, viewport: Viewport) -> Self {
        let center = viewport.center();
        // Deterministic phyllotaxis placement: distinct initial positions
        // without randomness, so rebuilds reproduce the same layout.
        let initial_angle = PI * (3.0 - 5.0_f64.sqrt());
        let mut nodes = Vec::with_capacity(graph.nodes.len());
        let mut index = HashMap::new();
        for (i, node) in graph.nodes.iter().enumerate() {
            let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
            let angle = initial_angle * i as f64;
            index.insert(node.id.clone(), i);
            nodes.push(SimNode {
                id: node.id.clone(),
                x: center.x + radius * angle.cos(),
                y: center.y + radius * angle.sin(),
                vx: 0.0,
                vy: 0.0,
                fx: None,
                fy: None,
            });
        }

        let links = graph
            .edges
            .iter()
            .filter_map(|edge| {
                let source = index.get(&edge.source)?;
                let target = index.get(&edge.target)?;
                Some((*source, *target))
            })
            .collect();

        Self {
            params,
            viewport,
            nodes,
            index,
            links,
            alpha: 1.0,
            alpha_target: 0.0,
            running: false,
            ticks: 0,
            drag: DragState::Idle,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Idempotent; leaves no pending work behind.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reheat(&mut self) {
        self.alpha = 1.0;
        self.running = true;
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticking is suspended, not destroyed, once alpha decays below the
    /// threshold; reheat or a drag target brings it back.
    pub fn is_ticking(&self) -> bool {
        self.running && (self.alpha >= self.params.alpha_min || self.alpha_target > 0.0)
    }

    pub fn position(&self, id: &DlcId) -> Option<Point> {
        let slot = self.index.get(id)?;
        let node = &self.nodes[*slot];
        Some(Point::new(node.x, node.y))
    }

    pub fn positions(&self) -> impl Iterator<Item = (&DlcId, Point)> {
        self.nodes
            .iter()
            .map(|node| (&node.id, Point::new(node.x, node.y)))
    }

    pub fn is_pinned(&self, id: &DlcId) -> bool {
        self.index
            .get(id)
            .map(|slot| self.nodes[*slot].pinned())
            .unwrap_or(false)
    }

    /// Advances the simulation by one step. Returns false when suspended or
    /// stopped. At most one step runs per call; there is no inner scheduler.
    pub fn tick(&mut self) -> Result<bool> {
        if !self.running {
            return Ok(false);
        }
        if self.alpha < self.params.alpha_min && self.alpha_target == 0.0 {
            return Ok(false);
        }

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay_rate;

        let n = self.nodes.len();
        let mut force_x = vec![0.0; n];
        let mut force_y = vec![0.0; n];
        self.accumulate_charge(&mut force_x, &mut force_y);
        self.accumulate_links(&mut force_x, &mut force_y);
        self.accumulate_axis_anchors(&mut force_x, &mut force_y);

        for (i, node) in self.nodes.iter_mut().enumerate() {
            if node.pinned() {
                continue;
            }
            node.vx = (node.vx + force_x[i]) * self.params.friction;
            node.vy = (node.vy + force_y[i]) * self.params.friction;
            node.x += node.vx;
            node.y += node.vy;
        }

        self.resolve_collisions();
        self.apply_centering();
        self.snap_pinned();
        self.check_finite()?;

        self.ticks += 1;
        Ok(true)
    }

    /// Bounded run loop: ticks until the simulation suspends or `max_ticks`
    /// is reached. Returns the number of ticks executed.
    pub fn run_to_rest(&mut self, max_ticks: u64) -> Result<u64> {
        let mut ran = 0;
        while ran < max_ticks {
            if !self.tick()? {
                break;
            }
            ran += 1;
        }
        Ok(ran)
    }

    /// Pins the node at its current position; the pointer takes over on the
    /// first move event. Reheats a resting simulation toward the drag target.
    pub fn on_drag_start(&mut self, id: &DlcId, _pointer: Point) -> Result<()> {
        let slot = *self
            .index
            .get(id)
            .ok_or_else(|| LayoutError::UnknownNode(id.to_string()))?;
        if self.alpha_target == 0.0 && !self.is_ticking() {
            self.alpha_target = self.params.drag_alpha_target;
            self.running = true;
        }
        let node = &mut self.nodes[slot];
        node.fx = Some(node.x);
        node.fy = Some(node.y);
        self.drag = DragState::Dragging(id.clone());
        Ok(())
    }

    /// Stray moves outside an active drag of `id` are ignored.
    pub fn on_drag_move(&mut self, id: &DlcId, pointer: Point) -> Result<()> {
        if self.drag != DragState::Dragging(id.clone()) {
            return Ok(());
        }
        let slot = *self
            .index
            .get(id)
            .ok_or_else(|| LayoutError::UnknownNode(id.to_string()))?;
        let node = &mut self.nodes[slot];
        node.fx = Some(pointer.x);
        node.fy = Some(pointer.y);
        Ok(())
    }

    /// Releases the node back to physics control and lets alpha decay
    /// naturally toward rest.
    pub fn on_drag_end(&mut self, id: &DlcId) -> Result<()> {
        if self.drag != DragState::Dragging(id.clone()) {
            return Ok(());
        }
        let slot = *self
            .index
            .get(id)
            .ok_or_else(|| LayoutError::UnknownNode(id.to_string()))?;
        self.alpha_target = 0.0;
        let node = &mut self.nodes[slot];
        node.fx = None;
        node.fy = None;
        self.drag = DragState::Idle;
        Ok(())
    }

    fn accumulate_charge(&self, force_x: &mut [f64], force_y: &mut [f64]) {
        // Direct O(n^2) pair summation; the graphs here are small.
        let n = self.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let dx = self.nodes[j].x - self.nodes[i].x;
                let dy = self.nodes[j].y - self.nodes[i].y;
                let mut d2 = dx * dx + dy * dy;
                if d2 < MIN_DISTANCE {
                    d2 = MIN_DISTANCE;
                }
                let d = d2.sqrt();
                let (ux, uy) = if d > MIN_DISTANCE {
                    (dx / d, dy / d)
                } else {
                    (1.0, 0.0)
                };
                let f = self.params.charge_strength * self.alpha / d2;
                force_x[i] += ux * f;
                force_y[i] += uy * f;
                force_x[j] -= ux * f;
                force_y[j] -= uy * f;
            }
        }
    }

    fn accumulate_links(&self, force_x: &mut [f64], force_y: &mut [f64]) {
        for &(source, target) in &self.links {
            let dx = self.nodes[target].x - self.nodes[source].x;
            let dy = self.nodes[target].y - self.nodes[source].y;
            let d = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            // Spring toward the target separation, split between endpoints.
            let pull = (d - self.params.link_distance) / d * self.alpha;
            let fx = dx * pull * 0.5;
            let fy = dy * pull * 0.5;
            force_x[source] += fx;
            force_y[source] += fy;
            force_x[target] -= fx;
            force_y[target] -= fy;
        }
    }

    fn accumulate_axis_anchors(&self, force_x: &mut [f64], force_y: &mut [f64]) {
        let center = self.viewport.center();
        for (i, node) in self.nodes.iter().enumerate() {
            force_x[i] += (center.x - node.x) * self.params.axis_strength * self.alpha;
            force_y[i] += (center.y - node.y) * self.params.axis_strength * self.alpha;
        }
    }

    fn resolve_collisions(&mut self) {
        let n = self.nodes.len();
        let clearance = self.params.collide_radius;
        for _ in 0..self.params.collide_iterations {
            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = self.nodes[j].x - self.nodes[i].x;
                    let dy = self.nodes[j].y - self.nodes[i].y;
                    let d = (dx * dx + dy * dy).sqrt();
                    if d >= clearance {
                        continue;
                    }
                    let d = d.max(MIN_DISTANCE);
                    let (ux, uy) = if d > MIN_DISTANCE {
                        (dx / d, dy / d)
                    } else {
                        (1.0, 0.0)
                    };
                    let overlap = clearance - d;
                    let i_pinned = self.nodes[i].pinned();
                    let j_pinned = self.nodes[j].pinned();
                    // A pinned node is an immovable obstacle; its partner
                    // absorbs the whole correction.
                    let (shift_i, shift_j) = match (i_pinned, j_pinned) {
                        (false, false) => (overlap / 2.0, overlap / 2.0),
                        (false, true) => (overlap, 0.0),
                        (true, false) => (0.0, overlap),
                        (true, true) => (0.0, 0.0),
                    };
                    self.nodes[i].x -= ux * shift_i;
                    self.nodes[i].y -= uy * shift_i;
                    self.nodes[j].x += ux * shift_j;
                    self.nodes[j].y += uy * shift_j;
                }
            }
        }
    }

    fn apply_centering(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        let n = self.nodes.len() as f64;
        let centroid_x: f64 = self.nodes.iter().map(|node| node.x).sum::<f64>() / n;
        let centroid_y: f64 = self.nodes.iter().map(|node| node.y).sum::<f64>() / n;
        let center = self.viewport.center();
        let shift_x = (center.x - centroid_x) * self.params.center_strength;
        let shift_y = (center.y - centroid_y) * self.params.center_strength;
        for node in &mut self.nodes {
            if node.pinned() {
                continue;
            }
            node.x += shift_x;
            node.y += shift_y;
        }
    }

    fn snap_pinned(&mut self) {
        for node in &mut self.nodes {
            if let Some(fx) = node.fx {
                node.x = fx;
                node.vx = 0.0;
            }
            if let Some(fy) = node.fy {
                node.y = fy;
                node.vy = 0.0;
            }
        }
    }

    fn check_finite(&mut self) -> Result<()> {
        for node in &self.nodes {
            let finite = node.x.is_finite()
                && node.y.is_finite()
                && node.vx.is_finite()
                && node.vy.is_finite();
            if !finite {
                self.running = false;
                return Err(LayoutError::NonFinite {
                    id: node.id.to_string(),
                    ticks: self.ticks,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{IdentifierResolver, LookupEntry, RequirementRow};
    use crate::graph::build_graph;

    fn lookup(names: &[(&str, &str)]) -> Vec<LookupEntry> {
        names
            .iter()
            .map(|(short, region)| LookupEntry {
                canonical_name: format!("Route {short}"),
                short_name: short.to_string(),
                region: region.to_string(),
            })
            .collect()
    }

    fn chain_graph(shorts: &[&str]) -> RouteGraph {
        let entries = lookup(
            &shorts
                .iter()
                .map(|short| (*short, "US"))
                .collect::<Vec<_>>(),
        );
        let resolver = IdentifierResolver::new(&entries);
        let rows: Vec<RequirementRow> = shorts
            .windows(2)
            .map(|pair| RequirementRow {
                route: pair[0].to_string(),
                locomotive: "Loco".to_string(),
                required_dlcs: vec![pair[1].to_string()],
            })
            .collect();
        build_graph(&rows, &resolver)
    }

    fn engine(shorts: &[&str]) -> LayoutEngine {
        LayoutEngine::new(
            &chain_graph(shorts),
            LayoutParams::default(),
            Viewport::default(),
        )
    }

    #[test]
    fn initial_positions_are_distinct_and_finite() {
        let engine = engine(&["A", "B", "C", "D"]);
        let positions: Vec<Point> = engine.positions().map(|(_, point)| point).collect();
        for (i, a) in positions.iter().enumerate() {
            assert!(a.x.is_finite() && a.y.is_finite());
            for b in positions.iter().skip(i + 1) {
                assert!(a != b, "coincident initial positions");
            }
        }
    }

    #[test]
    fn tick_count_to_rest_is_finite_and_graph_size_independent() {
        let mut small = engine(&["A", "B"]);
        let mut large = engine(&["A", "B", "C", "D", "E", "F", "G"]);
        small.start();
        large.start();

        let small_ticks = small.run_to_rest(10_000).expect("small run");
        let large_ticks = large.run_to_rest(10_000).expect("large run");

        assert_eq!(small_ticks, large_ticks);
        assert!(
            (280..=320).contains(&small_ticks),
            "expected roughly 300 ticks, got {small_ticks}"
        );
        assert!(!small.is_ticking());
    }

    #[test]
    fn run_to_rest_is_reproducible() {
        let mut first = engine(&["A", "B", "C"]);
        let mut second = engine(&["A", "B", "C"]);
        first.start();
        second.start();
        first.run_to_rest(10_000).expect("first run");
        second.run_to_rest(10_000).expect("second run");

        let a: Vec<(String, Point)> = first
            .positions()
            .map(|(id, point)| (id.to_string(), point))
            .collect();
        let b: Vec<(String, Point)> = second
            .positions()
            .map(|(id, point)| (id.to_string(), point))
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn dragged_node_sits_exactly_at_the_pointer_on_the_next_tick() {
        let mut engine = engine(&["A", "B", "C"]);
        engine.start();
        let id = DlcId::new("A");
        let start = engine.position(&id).expect("position");

        engine.on_drag_start(&id, start).expect("drag start");
        let pointer = Point::new(123.5, 77.25);
        engine.on_drag_move(&id, pointer).expect("drag move");
        engine.tick().expect("tick");

        assert_eq!(engine.position(&id), Some(pointer));
        assert!(engine.is_pinned(&id));
    }

    #[test]
    fn drag_end_releases_the_node_back_to_forces() {
        let mut engine = engine(&["A", "B", "C"]);
        engine.start();
        let id = DlcId::new("A");
        let start = engine.position(&id).expect("position");
        engine.on_drag_start(&id, start).expect("drag start");
        let pointer = Point::new(10.0, 10.0);
        engine.on_drag_move(&id, pointer).expect("drag move");
        engine.tick().expect("tick");

        engine.on_drag_end(&id).expect("drag end");
        assert!(!engine.is_pinned(&id));
        engine.tick().expect("tick");
        // Forces pull the released node away from the far corner.
        assert_ne!(engine.position(&id), Some(pointer));
    }

    #[test]
    fn drag_start_reheats_a_resting_simulation() {
        let mut engine = engine(&["A", "B"]);
        engine.start();
        engine.run_to_rest(10_000).expect("run to rest");
        assert!(!engine.is_ticking());

        let id = DlcId::new("A");
        let start = engine.position(&id).expect("position");
        engine.on_drag_start(&id, start).expect("drag start");
        assert!(engine.is_ticking());
        assert!(engine.tick().expect("tick"));

        engine.on_drag_end(&id).expect("drag end");
        let extra = engine.run_to_rest(10_000).expect("decay back to rest");
        assert!(extra > 0);
        assert!(!engine.is_ticking());
    }

    #[test]
    fn stray_drag_move_without_matching_start_is_ignored() {
        let mut engine = engine(&["A", "B"]);
        engine.start();
        let id = DlcId::new("A");
        engine
            .on_drag_move(&id, Point::new(5.0, 5.0))
            .expect("stray move");
        assert!(!engine.is_pinned(&id));
    }

    #[test]
    fn drag_start_on_unknown_node_errors() {
        let mut engine = engine(&["A", "B"]);
        let missing = DlcId::new("ZZ");
        let err = engine
            .on_drag_start(&missing, Point::default())
            .expect_err("unknown node");
        assert!(matches!(err, LayoutError::UnknownNode(_)));
    }

    #[test]
    fn stop_is_idempotent_and_start_resumes() {
        let mut engine = engine(&["A", "B"]);
        engine.start();
        assert!(engine.tick().expect("tick"));
        engine.stop();
        engine.stop();
        assert!(!engine.tick().expect("stopped tick"));
        engine.start();
        assert!(engine.tick().expect("resumed tick"));
    }

    #[test]
    fn reheat_after_rest_ticks_again() {
        let mut engine = engine(&["A", "B"]);
        engine.start();
        engine.run_to_rest(10_000).expect("run to rest");
        assert!(!engine.tick().expect("suspended"));
        engine.reheat();
        assert!(engine.tick().expect("reheated tick"));
    }

    #[test]
    fn non_finite_state_halts_the_simulation() {
        let mut engine = engine(&["A", "B"]);
        engine.start();
        engine.nodes[0].x = f64::NAN;
        let err = engine.tick().expect_err("non-finite");
        assert!(matches!(err, LayoutError::NonFinite { .. }));
        assert!(!engine.running);
    }

    #[test]
    fn positions_stay_finite_over_a_full_run() {
        let mut engine = engine(&["A", "B", "C", "D", "E"]);
        engine.start();
        engine.run_to_rest(10_000).expect("run");
        for (_, point) in engine.positions() {
            assert!(point.x.is_finite() && point.y.is_finite());
        }
    }

    #[test]
    fn empty_graph_runs_without_panicking() {
        let graph = RouteGraph::default();
        let mut engine = LayoutEngine::new(&graph, LayoutParams::default(), Viewport::default());
        engine.start();
        engine.run_to_rest(10).expect("empty run");
    }
}
