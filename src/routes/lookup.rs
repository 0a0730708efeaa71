// Route entry lookup by destination with next-hop tie-break

use super::{RouteTable, RouteTableEntry};
use crate::diagnostics::{Warning, WarningSink};
use crate::state::StateTable;

impl RouteTable {
    /// Find all entries whose destination equals `destination`, in table order
    pub fn find_all_entries_by_destination(&self, destination: &str) -> Vec<&RouteTableEntry> {
        self.entries
            .iter()
            .filter(|e| e.destination == destination)
            .collect()
    }
}

impl StateTable for RouteTable {
    type Entry = RouteTableEntry;

    fn entries(&self) -> &[RouteTableEntry] {
        &self.entries
    }

    /// Match on destination. When several entries share it, pick the first
    /// whose single next-hop has the same `to` or the same `via` as the
    /// query; otherwise fall back to the first candidate.
    ///
    /// The fallback can pair unrelated equal-cost paths. It is kept for
    /// compatibility with existing reports and flagged with a warning.
    ///
    /// Unset `to`/`via` values never match each other. Older reports treated
    /// two undefined next-hop addresses as equal, so ambiguous directly
    /// connected candidates may pair differently here.
    fn find_entry_equiv(&self, query: &RouteTableEntry, sink: &dyn WarningSink) -> Option<&RouteTableEntry> {
        let candidates = self.find_all_entries_by_destination(&query.destination);
        let first = *candidates.first()?;
        if candidates.len() == 1 {
            return Some(first);
        }

        if let Some(entry) = candidates
            .iter()
            .copied()
            .find(|candidate| nexthops_overlap(candidate, query))
        {
            return Some(entry);
        }

        sink.warn(Warning::AmbiguousRoute {
            destination: query.destination.clone(),
            candidates: candidates.len(),
        });
        Some(first)
    }
}

/// True when both entries carry a next-hop and they agree on `to` or `via`.
/// An unset field never matches another unset field.
fn nexthops_overlap(a: &RouteTableEntry, b: &RouteTableEntry) -> bool {
    let (Some(nh_a), Some(nh_b)) = (a.first_nexthop(), b.first_nexthop()) else {
        return false;
    };
    let same = |x: &Option<String>, y: &Option<String>| matches!((x, y), (Some(x), Some(y)) if x == y);
    same(&nh_a.to, &nh_b.to) || same(&nh_a.via, &nh_b.via)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::routes::{RouteEntry, RouteEntryNextHop};

    fn entry(destination: &str, to: Option<&str>, via: Option<&str>) -> RouteTableEntry {
        RouteTableEntry::new(
            destination,
            vec![RouteEntry {
                nexthops: vec![RouteEntryNextHop::new(
                    to.map(String::from),
                    via.map(String::from),
                )],
                protocol: Some("OSPF".to_string()),
                ..Default::default()
            }],
        )
    }

    fn table() -> RouteTable {
        RouteTable::new(
            "inet.0",
            vec![
                entry("10.1.1.0/24", Some("10.0.0.2"), Some("ge-0/0/0.0")),
                entry("10.1.1.0/24", Some("10.0.0.3"), Some("ge-0/0/1.0")),
                entry("10.9.0.0/16", Some("10.0.0.2"), Some("ge-0/0/0.0")),
            ],
        )
    }

    #[test]
    fn test_single_candidate_matches_on_destination_only() {
        let sink = CollectingSink::new();
        let query = entry("10.9.0.0/16", Some("192.0.2.1"), Some("eth9"));
        let found = table().find_entry_equiv(&query, &sink).cloned();
        assert_eq!(found, Some(table().entries[2].clone()));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tie_break_on_to() {
        let sink = CollectingSink::new();
        let query = entry("10.1.1.0/24", Some("10.0.0.3"), Some("Ethernet2"));
        let table = table();
        let found = table.find_entry_equiv(&query, &sink);
        assert_eq!(found, Some(&table.entries[1]));
    }

    #[test]
    fn test_tie_break_on_via() {
        let sink = CollectingSink::new();
        let query = entry("10.1.1.0/24", Some("172.16.0.1"), Some("ge-0/0/1.0"));
        let table = table();
        assert_eq!(table.find_entry_equiv(&query, &sink), Some(&table.entries[1]));
    }

    #[test]
    fn test_fallback_to_first_candidate_warns() {
        let sink = CollectingSink::new();
        let query = entry("10.1.1.0/24", None, None);
        let table = table();
        assert_eq!(table.find_entry_equiv(&query, &sink), Some(&table.entries[0]));
        assert_eq!(
            sink.warnings(),
            vec![Warning::AmbiguousRoute {
                destination: "10.1.1.0/24".to_string(),
                candidates: 2
            }]
        );
    }

    #[test]
    fn test_unset_nexthop_fields_do_not_match() {
        let table = RouteTable::new(
            "inet.0",
            vec![
                entry("10.0.0.0/30", None, Some("ge-0/0/0.0")),
                entry("10.0.0.0/30", None, Some("ge-0/0/1.0")),
            ],
        );

        let sink = CollectingSink::new();
        let query = entry("10.0.0.0/30", None, Some("ge-0/0/1.0"));
        assert_eq!(table.find_entry_equiv(&query, &sink), Some(&table.entries[1]));
        assert!(sink.is_empty());

        let query = entry("10.0.0.0/30", None, Some("Ethernet1"));
        assert_eq!(table.find_entry_equiv(&query, &sink), Some(&table.entries[0]));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_no_candidate() {
        let sink = CollectingSink::new();
        let query = entry("203.0.113.0/24", Some("10.0.0.2"), None);
        assert!(table().find_entry_equiv(&query, &sink).is_none());
    }
}
