use serde::Deserialize;
use thiserror::Error;

pub mod engine;

pub use engine::LayoutEngine;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("unknown node id: {0}")]
    UnknownNode(String),
    #[error("non-finite position for node {id} after {ticks} ticks")]
    NonFinite { id: String, ticks: u64 },
}

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Simulation parameters. Defaults reproduce the reference layout; the
/// config file may override individual values.
#[derive(Debug, Clone)]
pub struct LayoutParams {
    pub link_distance: f64,
    pub charge_strength: f64,
    pub center_strength: f64,
    pub collide_radius: f64,
    pub collide_iterations: usize,
    pub axis_strength: f64,
    pub alpha_min: f64,
    /// Per-tick blend rate toward the alpha target; 0.023 matches the
    /// canonical x0.977 decay toward rest.
    pub alpha_decay_rate: f64,
    pub drag_alpha_target: f64,
    pub friction: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            link_distance: 30.0,
            charge_strength: -100.0,
            center_strength: 0.1,
            collide_radius: 20.0,
            collide_iterations: 1,
            axis_strength: 0.07,
            alpha_min: 0.001,
            alpha_decay_rate: 0.023,
            drag_alpha_target: 0.3,
            friction: 0.6,
        }
    }
}
