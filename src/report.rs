// Report types - per-node outcomes aggregated for output

use serde::Serialize;

use crate::config::{EnvType, NodeParam, OutputFormat};
use crate::error::AppResult;
use crate::ospf::{OspfNeighborTable, OspfNeighborTableEntry};
use crate::routes::{RouteTable, RouteTableEntry};
use crate::state::CrossCheckResult;

pub const NON_OSPF_SPEAKER_NOTE: &str = "ignored (non-ospf-speaker)";

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TableDiff {
    Route(CrossCheckResult<RouteTableEntry>),
    OspfNeighbor(CrossCheckResult<OspfNeighborTableEntry>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TableDump {
    Route(RouteTable),
    OspfNeighbor(OspfNeighborTable),
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum NodeOutcome {
    Checked {
        result: TableDiff,
    },
    Ignored {
        result: serde_json::Map<String, serde_json::Value>,
        note: String,
    },
    Dumped {
        src: TableDump,
        dst: TableDump,
    },
    Failed {
        error: String,
    },
}

impl NodeOutcome {
    pub fn non_ospf_speaker() -> Self {
        NodeOutcome::Ignored {
            result: serde_json::Map::new(),
            note: NON_OSPF_SPEAKER_NOTE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub node_param: NodeParam,
    #[serde(flatten)]
    pub outcome: NodeOutcome,
}

impl NodeReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, NodeOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub src_env: EnvType,
    pub dst_env: EnvType,
    pub all_results: Vec<NodeReport>,
}

impl Report {
    pub fn failed_nodes(&self) -> usize {
        self.all_results.iter().filter(|r| r.is_failed()).count()
    }

    pub fn render(&self, format: OutputFormat) -> AppResult<String> {
        Ok(match format {
            OutputFormat::Json => serde_json::to_string(self)?,
            OutputFormat::Yaml => serde_yaml::to_string(self)?,
        })
    }
}
