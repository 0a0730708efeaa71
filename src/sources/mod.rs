// Sources module - format adapters producing canonical tables

pub mod cli_text;
pub mod engine;
pub mod structured;

use std::path::Path;

use crate::diagnostics::WarningSink;
use crate::error::{AppError, AppResult};
use crate::ospf::OspfNeighborTable;
use crate::routes::RouteTable;

/// The closed set of state representations a table can be built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Flat JSON records from the simulation engine
    Engine,
    /// Enveloped router JSON export (physical or emulated router)
    StructuredDevice,
    /// "show" command text capture
    CliText,
}

impl SourceKind {
    /// Build a route table from the text of one capture. Structured-device
    /// tables come back normalized.
    pub fn parse_route_table(self, text: &str, origin: &str, sink: &dyn WarningSink) -> AppResult<RouteTable> {
        match self {
            SourceKind::Engine => engine::parse_route_table(text),
            SourceKind::StructuredDevice => {
                structured::parse_route_table(text, origin, sink).map(|table| table.normalized())
            }
            SourceKind::CliText => cli_text::route::parse_route_table(text, sink),
        }
    }

    pub fn parse_ospf_neighbor_table(
        self,
        text: &str,
        origin: &str,
        sink: &dyn WarningSink,
    ) -> AppResult<OspfNeighborTable> {
        match self {
            SourceKind::Engine => engine::parse_ospf_neighbor_table(text),
            SourceKind::StructuredDevice => structured::parse_ospf_neighbor_table(text, origin, sink),
            SourceKind::CliText => cli_text::ospf::parse_ospf_neighbor_table(text),
        }
    }

    pub fn load_route_table(self, path: &Path, sink: &dyn WarningSink) -> AppResult<RouteTable> {
        tracing::debug!("Loading {:?} route table from {}", self, path.display());
        let text = std::fs::read_to_string(path).map_err(|e| AppError::read(path, e))?;
        self.parse_route_table(&text, &path.display().to_string(), sink)
    }

    pub fn load_ospf_neighbor_table(self, path: &Path, sink: &dyn WarningSink) -> AppResult<OspfNeighborTable> {
        tracing::debug!("Loading {:?} ospf neighbor table from {}", self, path.display());
        let text = std::fs::read_to_string(path).map_err(|e| AppError::read(path, e))?;
        self.parse_ospf_neighbor_table(&text, &path.display().to_string(), sink)
    }
}
