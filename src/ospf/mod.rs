// OSPF module - canonical OSPF neighbor table model and lookup

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Warning, WarningSink};
use crate::state::StateTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfNeighborTableEntry {
    /// Neighbor interface address
    pub address: String,
    /// Local interface
    pub interface: String,
    /// Adjacency state, e.g. "FULL"
    pub state: String,
    /// Neighbor router-id
    pub id: Option<String>,
    pub priority: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OspfNeighborTable {
    pub table_name: String,
    pub entries: Vec<OspfNeighborTableEntry>,
}

impl OspfNeighborTable {
    pub fn new(table_name: impl Into<String>, entries: Vec<OspfNeighborTableEntry>) -> Self {
        OspfNeighborTable {
            table_name: table_name.into(),
            entries,
        }
    }

    /// Find all entries with the given neighbor address, in table order
    pub fn find_all_entries_by_address(&self, address: &str) -> Vec<&OspfNeighborTableEntry> {
        self.entries.iter().filter(|e| e.address == address).collect()
    }
}

impl StateTable for OspfNeighborTable {
    type Entry = OspfNeighborTableEntry;

    fn entries(&self) -> &[OspfNeighborTableEntry] {
        &self.entries
    }

    fn find_entry_equiv(
        &self,
        query: &OspfNeighborTableEntry,
        sink: &dyn WarningSink,
    ) -> Option<&OspfNeighborTableEntry> {
        let candidates = self.find_all_entries_by_address(&query.address);
        if candidates.len() > 1 {
            sink.warn(Warning::AmbiguousNeighbor {
                address: query.address.clone(),
                candidates: candidates.len(),
            });
        }
        candidates.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;

    fn neighbor(address: &str, interface: &str) -> OspfNeighborTableEntry {
        OspfNeighborTableEntry {
            address: address.to_string(),
            interface: interface.to_string(),
            state: "FULL".to_string(),
            id: Some("10.255.0.2".to_string()),
            priority: Some(1),
        }
    }

    #[test]
    fn test_ambiguous_address_picks_first_and_warns_once() {
        let table = OspfNeighborTable::new(
            "_cli_ospf_neighbor_",
            vec![
                neighbor("192.0.2.1", "Ethernet1"),
                neighbor("192.0.2.1", "Ethernet2"),
                neighbor("192.0.2.9", "Ethernet3"),
            ],
        );
        let sink = CollectingSink::new();

        let found = table.find_entry_equiv(&neighbor("192.0.2.1", "ge-0/0/0.0"), &sink);

        assert_eq!(found, Some(&table.entries[0]));
        assert_eq!(
            sink.warnings(),
            vec![Warning::AmbiguousNeighbor {
                address: "192.0.2.1".to_string(),
                candidates: 2
            }]
        );
    }

    #[test]
    fn test_unique_address_does_not_warn() {
        let table = OspfNeighborTable::new("t", vec![neighbor("192.0.2.9", "Ethernet3")]);
        let sink = CollectingSink::new();
        assert!(table.find_entry_equiv(&neighbor("192.0.2.9", "x"), &sink).is_some());
        assert!(table.find_entry_equiv(&neighbor("192.0.2.8", "x"), &sink).is_none());
        assert!(sink.is_empty());
    }
}
