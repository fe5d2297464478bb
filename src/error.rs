use thiserror::Error;

use crate::config::ConfigError;
use crate::layout::LayoutError;
use crate::table::TableError;

#[derive(Debug, Error)]
pub enum LocographError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LocographError>;
