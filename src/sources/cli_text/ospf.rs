// "show ip ospf neighbor" text parser
//
// Two dialects: one prints the OSPF instance and VRF between router-id and
// priority, the other does not.
//
//   Neighbor ID     Instance VRF      Pri State      Dead Time   Address      Interface
//   10.255.0.2      1        default  1   FULL/DR    00:00:33    10.0.0.2     Ethernet1
//
//   Neighbor ID     Pri   State           Dead Time   Address         Interface
//   10.255.0.2        1   FULL/BDR        00:00:38    10.0.0.2        GigabitEthernet0/1

use std::sync::LazyLock;

use regex::Captures;

use super::{LineGrammar, LinePattern, capture, parse_lines};
use crate::error::{AppError, AppResult};
use crate::ospf::{OspfNeighborTable, OspfNeighborTableEntry};

pub const TABLE_NAME: &str = "_cli_ospf_neighbor_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborDialect {
    WithInstance,
    Plain,
}

const ID_RE: &str = r"(?P<id>(?:\d+\.){3}\d+)";
const INSTANCE_RE: &str = r"\d+";
const VRF_RE: &str = "default"; // global routing table only
const PRIORITY_RE: &str = r"(?P<priority>\d+)";
const STATE_RE: &str = r"(?P<state>\w+)/\s*(?:DROTHER|BDR|DR|-)"; // DR/BDR role is dropped
const TIME_RE: &str = r"\d+:\d\d:\d\d";
const ADDR_RE: &str = r"(?P<addr>(?:\d+\.){3}\d+)";
const INTF_RE: &str = r"(?P<intf>[\w/:.\-]+)";

static PATTERNS: LazyLock<Vec<LinePattern<NeighborDialect>>> = LazyLock::new(|| {
    let with_instance = [ID_RE, INSTANCE_RE, VRF_RE, PRIORITY_RE, STATE_RE, TIME_RE, ADDR_RE, INTF_RE];
    let plain = [ID_RE, PRIORITY_RE, STATE_RE, TIME_RE, ADDR_RE, INTF_RE];
    vec![
        LinePattern::new(&with_instance.join(r"\s+"), NeighborDialect::WithInstance),
        LinePattern::new(&plain.join(r"\s+"), NeighborDialect::Plain),
    ]
});

#[derive(Default)]
pub struct CliOspfNeighborParser {
    entries: Vec<OspfNeighborTableEntry>,
}

impl CliOspfNeighborParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_table(self) -> OspfNeighborTable {
        OspfNeighborTable::new(TABLE_NAME, self.entries)
    }
}

impl LineGrammar for CliOspfNeighborParser {
    type Kind = NeighborDialect;

    fn patterns() -> &'static [LinePattern<NeighborDialect>] {
        &PATTERNS
    }

    fn on_match(&mut self, kind: NeighborDialect, caps: &Captures<'_>, line_no: usize, _line: &str) -> AppResult<()> {
        let raw_priority = &caps["priority"];
        let priority = raw_priority
            .parse()
            .map_err(|_| AppError::invalid_field("priority", raw_priority, &format!("line {}", line_no)))?;

        let entry = OspfNeighborTableEntry {
            address: caps["addr"].to_string(),
            interface: caps["intf"].to_string(),
            state: caps["state"].to_string(),
            id: capture(caps, "id"),
            priority: Some(priority),
        };
        tracing::debug!("{:?} neighbor: {:?}", kind, entry);

        self.entries.push(entry);
        Ok(())
    }
}

pub fn parse_ospf_neighbor_table(text: &str) -> AppResult<OspfNeighborTable> {
    let mut parser = CliOspfNeighborParser::new();
    let matched = parse_lines(&mut parser, text)?;
    tracing::debug!("{} neighbor lines matched", matched);
    Ok(parser.into_table())
}
