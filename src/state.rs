// State tables and the cross-check engine
//
// A cross-check scans both tables independently: every destination entry is
// looked up in the source table, then every source entry is looked up in the
// destination table. Entries are paired by each table kind's own notion of
// equivalence (see `routes::lookup` and `ospf`).

use serde::{Deserialize, Serialize};

use crate::diagnostics::WarningSink;

/// A table whose entries can be matched against another table of the same kind
pub trait StateTable {
    type Entry: Clone + Serialize;

    fn entries(&self) -> &[Self::Entry];

    /// Find the entry of this table equivalent to `query`, if any
    fn find_entry_equiv(&self, query: &Self::Entry, sink: &dyn WarningSink) -> Option<&Self::Entry>;
}

/// An entry found in both tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair<E> {
    pub src_entry: E,
    pub dst_entry: E,
}

/// Three-way partition of two tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCheckResult<E> {
    pub both: Vec<MatchedPair<E>>,
    pub only_src: Vec<E>,
    pub only_dst: Vec<E>,
}

impl<E> CrossCheckResult<E> {
    pub fn is_consistent(&self) -> bool {
        self.only_src.is_empty() && self.only_dst.is_empty()
    }
}

/// Cross-check two tables of the same kind
pub fn cross_check<T: StateTable>(src: &T, dst: &T, sink: &dyn WarningSink) -> CrossCheckResult<T::Entry> {
    let mut both = Vec::new();
    let mut only_dst = Vec::new();

    for dst_entry in dst.entries() {
        match src.find_entry_equiv(dst_entry, sink) {
            Some(src_entry) => both.push(MatchedPair {
                src_entry: src_entry.clone(),
                dst_entry: dst_entry.clone(),
            }),
            None => only_dst.push(dst_entry.clone()),
        }
    }

    let only_src = src
        .entries()
        .iter()
        .filter(|src_entry| dst.find_entry_equiv(src_entry, sink).is_none())
        .cloned()
        .collect();

    CrossCheckResult {
        both,
        only_src,
        only_dst,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::ospf::{OspfNeighborTable, OspfNeighborTableEntry};
    use crate::routes::{RouteEntry, RouteEntryNextHop, RouteTable, RouteTableEntry};
    use pretty_assertions::assert_eq;

    fn neighbor(address: &str, interface: &str) -> OspfNeighborTableEntry {
        OspfNeighborTableEntry {
            address: address.to_string(),
            interface: interface.to_string(),
            state: "FULL".to_string(),
            id: None,
            priority: None,
        }
    }

    fn route(destination: &str, to: &str, via: &str) -> RouteTableEntry {
        RouteTableEntry::new(
            destination,
            vec![RouteEntry {
                nexthops: vec![RouteEntryNextHop::new(Some(to.to_string()), Some(via.to_string()))],
                preference: Some(110),
                protocol: Some("OSPF".to_string()),
                metric: Some(20),
                ..Default::default()
            }],
        )
    }

    #[test]
    fn test_cross_check_asymmetry() {
        let a = neighbor("10.0.0.1", "eth0");
        let b = neighbor("10.0.0.2", "eth1");
        let c = neighbor("10.0.0.3", "eth2");
        let src = OspfNeighborTable::new("src", vec![a.clone(), b.clone()]);
        let dst = OspfNeighborTable::new("dst", vec![b.clone(), c.clone()]);
        let sink = CollectingSink::new();

        let result = cross_check(&src, &dst, &sink);

        assert_eq!(
            result.both,
            vec![MatchedPair {
                src_entry: b.clone(),
                dst_entry: b
            }]
        );
        assert_eq!(result.only_src, vec![a]);
        assert_eq!(result.only_dst, vec![c]);
        assert!(!result.is_consistent());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_self_diff_identity() {
        let table = RouteTable::new(
            "inet.0",
            vec![
                route("10.1.1.0/24", "10.0.0.2", "ge-0/0/0.0"),
                route("10.1.1.0/24", "10.0.0.3", "ge-0/0/1.0"),
                route("10.2.0.0/16", "10.0.0.2", "ge-0/0/0.0"),
            ],
        );
        let copy = table.clone();
        let sink = CollectingSink::new();

        let result = cross_check(&table, &copy, &sink);

        assert!(result.is_consistent());
        assert_eq!(result.both.len(), table.entries.len());
        for (pair, entry) in result.both.iter().zip(&table.entries) {
            assert_eq!(&pair.src_entry, entry);
            assert_eq!(&pair.dst_entry, entry);
        }
    }

    #[test]
    fn test_result_serializes_in_report_shape() {
        let src = OspfNeighborTable::new("src", vec![neighbor("10.0.0.1", "eth0")]);
        let dst = OspfNeighborTable::new("dst", vec![]);
        let result = cross_check(&src, &dst, &CollectingSink::new());

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["both"], serde_json::json!([]));
        assert_eq!(value["only_dst"], serde_json::json!([]));
        assert_eq!(value["only_src"][0]["address"], "10.0.0.1");
        assert_eq!(value["only_src"][0]["priority"], serde_json::Value::Null);
    }
}
