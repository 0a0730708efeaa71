// Routes module - canonical route table model

pub mod lookup;
pub mod normalize;

use serde::{Deserialize, Serialize};

/// A single next-hop of a route entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteEntryNextHop {
    /// Next-hop address, unset for directly-connected routes
    pub to: Option<String>,
    /// Outgoing interface
    pub via: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteEntry {
    #[serde(rename = "nexthop")]
    pub nexthops: Vec<RouteEntryNextHop>,
    pub nexthop_type: Option<String>,
    /// Administrative distance
    pub preference: Option<i64>,
    pub protocol: Option<String>,
    pub metric: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTableEntry {
    pub destination: String, // CIDR notation
    pub entries: Vec<RouteEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    pub table_name: String,
    pub entries: Vec<RouteTableEntry>,
}

impl RouteEntryNextHop {
    pub fn new(to: Option<String>, via: Option<String>) -> Self {
        RouteEntryNextHop { to, via }
    }
}

impl RouteTableEntry {
    pub fn new(destination: impl Into<String>, entries: Vec<RouteEntry>) -> Self {
        RouteTableEntry {
            destination: destination.into(),
            entries,
        }
    }

    /// The next-hop of the first route entry, if any
    pub fn first_nexthop(&self) -> Option<&RouteEntryNextHop> {
        self.entries.first().and_then(|e| e.nexthops.first())
    }
}

impl RouteTable {
    pub fn new(table_name: impl Into<String>, entries: Vec<RouteTableEntry>) -> Self {
        RouteTable {
            table_name: table_name.into(),
            entries,
        }
    }
}
