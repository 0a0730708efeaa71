// Route table normalization
//
// Structured-device exports group ECMP next-hops and alternative route entries
// under one destination. Expansion turns every (route entry x next-hop) pair
// into its own table entry so tables from different sources line up entry by
// entry.

use super::{RouteEntry, RouteTable, RouteTableEntry};

/// Split a route entry with several next-hops into one entry per next-hop.
/// Entries with zero or one next-hop come back unchanged.
pub fn expand_nexthops(entry: &RouteEntry) -> Vec<RouteEntry> {
    if entry.nexthops.len() <= 1 {
        return vec![entry.clone()];
    }

    entry
        .nexthops
        .iter()
        .map(|nexthop| RouteEntry {
            nexthops: vec![nexthop.clone()],
            nexthop_type: entry.nexthop_type.clone(),
            preference: entry.preference,
            protocol: entry.protocol.clone(),
            metric: entry.metric,
        })
        .collect()
}

/// Expand next-hops of every route entry, then split the table entry into
/// one table entry per resulting route entry.
pub fn expand_table_entry(table_entry: &RouteTableEntry) -> Vec<RouteTableEntry> {
    let route_entries: Vec<RouteEntry> = table_entry.entries.iter().flat_map(expand_nexthops).collect();

    if route_entries.len() <= 1 {
        return vec![RouteTableEntry::new(table_entry.destination.clone(), route_entries)];
    }

    route_entries
        .into_iter()
        .map(|route_entry| RouteTableEntry::new(table_entry.destination.clone(), vec![route_entry]))
        .collect()
}

impl RouteTable {
    /// A new table where every entry carries exactly one route entry with at
    /// most one next-hop
    pub fn normalized(&self) -> RouteTable {
        RouteTable {
            table_name: self.table_name.clone(),
            entries: self.entries.iter().flat_map(expand_table_entry).collect(),
        }
    }
}
