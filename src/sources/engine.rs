// Analysis-engine adapter
//
// The simulation engine answers route and OSPF session queries as flat JSON
// arrays, one record per route per next-hop. Records map 1:1 onto table
// entries; nothing is grouped by destination here.

use serde::Deserialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::ospf::{OspfNeighborTable, OspfNeighborTableEntry};
use crate::routes::{RouteEntry, RouteEntryNextHop, RouteTable, RouteTableEntry};

/// Only the global routing instance is compared
pub const DEFAULT_VRF: &str = "default";
pub const OSPF_TABLE_NAME: &str = "_engine_ospf_neighbor_";

#[derive(Debug, Clone, Deserialize)]
pub struct EngineRouteRecord {
    #[serde(rename = "VRF")]
    pub vrf: String,
    #[serde(rename = "Network")]
    pub network: String,
    /// Object form `{"type": ..., ...}`; older engine versions emit a bare string
    #[serde(rename = "Next_Hop", default)]
    pub next_hop: Option<Value>,
    #[serde(rename = "Next_Hop_IP", default)]
    pub next_hop_ip: Option<String>,
    #[serde(rename = "Next_Hop_Interface", default)]
    pub next_hop_interface: Option<String>,
    #[serde(rename = "Admin_Distance", default)]
    pub admin_distance: Option<i64>,
    #[serde(rename = "Protocol", default)]
    pub protocol: Option<String>,
    #[serde(rename = "Metric", default)]
    pub metric: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteInterface {
    pub hostname: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineOspfSessionRecord {
    #[serde(rename = "VRF")]
    pub vrf: String,
    #[serde(rename = "Remote_IP")]
    pub remote_ip: String,
    #[serde(rename = "Remote_Interface")]
    pub remote_interface: RemoteInterface,
    #[serde(rename = "Session_Status")]
    pub session_status: String,
}

impl From<&EngineRouteRecord> for RouteTableEntry {
    fn from(record: &EngineRouteRecord) -> Self {
        let nexthop = RouteEntryNextHop::new(record.next_hop_ip.clone(), record.next_hop_interface.clone());
        let entry = RouteEntry {
            nexthops: vec![nexthop],
            nexthop_type: record
                .next_hop
                .as_ref()
                .and_then(|nh| nh.get("type"))
                .and_then(Value::as_str)
                .map(String::from),
            preference: record.admin_distance,
            protocol: record.protocol.clone(),
            metric: record.metric,
        };
        RouteTableEntry::new(record.network.clone(), vec![entry])
    }
}

impl From<&EngineOspfSessionRecord> for OspfNeighborTableEntry {
    fn from(record: &EngineOspfSessionRecord) -> Self {
        // The session query carries neither router-id nor priority
        OspfNeighborTableEntry {
            address: record.remote_ip.clone(),
            interface: record.remote_interface.hostname.clone(),
            state: record.session_status.clone(),
            id: None,
            priority: None,
        }
    }
}

pub fn route_table_from_records(records: &[EngineRouteRecord]) -> RouteTable {
    let entries = records
        .iter()
        .filter(|r| r.vrf == DEFAULT_VRF)
        .map(RouteTableEntry::from)
        .collect();
    RouteTable::new(DEFAULT_VRF, entries)
}

pub fn ospf_neighbor_table_from_records(records: &[EngineOspfSessionRecord]) -> OspfNeighborTable {
    let entries = records
        .iter()
        .filter(|r| r.vrf == DEFAULT_VRF)
        .map(OspfNeighborTableEntry::from)
        .collect();
    OspfNeighborTable::new(OSPF_TABLE_NAME, entries)
}

pub fn parse_route_table(json_str: &str) -> AppResult<RouteTable> {
    let records: Vec<EngineRouteRecord> = serde_json::from_str(json_str)?;
    Ok(route_table_from_records(&records))
}

pub fn parse_ospf_neighbor_table(json_str: &str) -> AppResult<OspfNeighborTable> {
    let records: Vec<EngineOspfSessionRecord> = serde_json::from_str(json_str)?;
    Ok(ospf_neighbor_table_from_records(&records))
}
