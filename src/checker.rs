// State checker - builds both tables per node and cross-checks them
//
// Nodes are independent: each one runs on its own blocking task and a failure
// while building one node's tables is recorded in that node's report only.

use futures::future::join_all;
use std::sync::Arc;

use crate::config::{Config, EnvConfig, EnvType, NodeParam, TableKind};
use crate::diagnostics::WarningSink;
use crate::error::{AppError, AppResult};
use crate::ospf::OspfNeighborTable;
use crate::report::{NodeOutcome, NodeReport, TableDiff, TableDump};
use crate::routes::RouteTable;
use crate::sources::SourceKind;
use crate::state::cross_check;

/// Choose the adapter for a node in an environment
pub fn source_kind(env: &EnvConfig, node: &NodeParam) -> SourceKind {
    match env.env_type {
        EnvType::Batfish => SourceKind::Engine,
        EnvType::Emulated => SourceKind::StructuredDevice,
        EnvType::Original if node.is_juniper() => SourceKind::StructuredDevice,
        EnvType::Original => SourceKind::CliText,
    }
}

/// Restrict the run to one node when a name is given (case-insensitive)
pub fn select_nodes(node_params: &[NodeParam], name: Option<&str>) -> AppResult<Vec<NodeParam>> {
    let Some(name) = name else {
        return Ok(node_params.to_vec());
    };
    node_params
        .iter()
        .find(|n| n.name.eq_ignore_ascii_case(name))
        .map(|n| vec![n.clone()])
        .ok_or_else(|| AppError::UnknownNode(name.to_string()))
}

pub struct StateChecker {
    table: TableKind,
    debug: bool,
    src: EnvConfig,
    dst: EnvConfig,
    sink: Arc<dyn WarningSink>,
}

impl StateChecker {
    pub fn new(config: &Config, sink: Arc<dyn WarningSink>) -> Self {
        StateChecker {
            table: config.table,
            debug: config.debug,
            src: config.src.config.clone(),
            dst: config.dst.config.clone(),
            sink,
        }
    }

    fn route_table(&self, env: &EnvConfig, node: &NodeParam) -> AppResult<RouteTable> {
        source_kind(env, node).load_route_table(&env.routes_path(node), self.sink.as_ref())
    }

    fn ospf_neighbor_table(&self, env: &EnvConfig, node: &NodeParam) -> AppResult<OspfNeighborTable> {
        source_kind(env, node).load_ospf_neighbor_table(&env.ospf_neighbors_path(node), self.sink.as_ref())
    }

    /// Cross-check (or dump, in debug mode) one node's tables
    pub fn check_node(&self, node: &NodeParam) -> AppResult<NodeOutcome> {
        match self.table {
            TableKind::Route => {
                let src = self.route_table(&self.src, node)?;
                let dst = self.route_table(&self.dst, node)?;
                if self.debug {
                    return Ok(NodeOutcome::Dumped {
                        src: TableDump::Route(src),
                        dst: TableDump::Route(dst),
                    });
                }
                let diff = cross_check(&src, &dst, self.sink.as_ref());
                tracing::info!("route table consistent: {}", diff.is_consistent());
                Ok(NodeOutcome::Checked {
                    result: TableDiff::Route(diff),
                })
            }
            TableKind::OspfNeighbor => {
                if !node.ospf {
                    return Ok(NodeOutcome::non_ospf_speaker());
                }
                let src = self.ospf_neighbor_table(&self.src, node)?;
                let dst = self.ospf_neighbor_table(&self.dst, node)?;
                if self.debug {
                    return Ok(NodeOutcome::Dumped {
                        src: TableDump::OspfNeighbor(src),
                        dst: TableDump::OspfNeighbor(dst),
                    });
                }
                let diff = cross_check(&src, &dst, self.sink.as_ref());
                tracing::info!("ospf neighbor table consistent: {}", diff.is_consistent());
                Ok(NodeOutcome::Checked {
                    result: TableDiff::OspfNeighbor(diff),
                })
            }
        }
    }

    fn report_for(&self, node: NodeParam) -> AppResult<NodeReport> {
        let _span = tracing::info_span!("node", name = %node.name).entered();
        tracing::info!("checking {:?} table", self.table);

        let outcome = match self.check_node(&node) {
            Ok(outcome) => outcome,
            Err(e) if e.is_node_scoped() => {
                tracing::error!("{}", e);
                NodeOutcome::Failed { error: e.to_string() }
            }
            Err(e) => return Err(e),
        };
        Ok(NodeReport {
            node_param: node,
            outcome,
        })
    }

    /// Check every node concurrently. Reports keep the order of `nodes`.
    pub async fn check_nodes(self: Arc<Self>, nodes: Vec<NodeParam>) -> AppResult<Vec<NodeReport>> {
        let tasks = nodes.into_iter().map(|node| {
            let checker = Arc::clone(&self);
            let param = node.clone();
            async move {
                match tokio::task::spawn_blocking(move || checker.report_for(node)).await {
                    Ok(report) => report,
                    Err(e) => {
                        tracing::error!("worker for {} failed: {}", param.name, e);
                        Ok(NodeReport {
                            node_param: param,
                            outcome: NodeOutcome::Failed {
                                error: AppError::Task(e.to_string()).to_string(),
                            },
                        })
                    }
                }
            }
        });

        join_all(tasks).await.into_iter().collect()
    }
}
