// "show ip route" text parser (IOS-like and EOS-like dialects)
//
//   C        10.0.0.0/24 is directly connected, Ethernet1
//   O        10.1.1.0/24 [110/20] via 10.0.0.2, 00:01:23, Ethernet1
//                                 via 10.0.0.6, 00:01:23, Ethernet2

use std::sync::LazyLock;

use regex::Captures;

use super::{LineGrammar, LinePattern, capture, parse_lines};
use crate::diagnostics::{Warning, WarningSink};
use crate::error::{AppError, AppResult};
use crate::routes::{RouteEntry, RouteEntryNextHop, RouteTable, RouteTableEntry};

/// Table name used until a `VRF:` header says otherwise
pub const DEFAULT_TABLE_NAME: &str = "default";
pub const UNKNOWN_PROTOCOL: &str = "_unknown_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteLine {
    Direct,
    Entry,
    Continuation,
    Vrf,
}

const PROTO_RE: &str = r"^\s*(?P<proto>[A-Za-z])"; // protocol code at line start
const PREFIX_RE: &str = r"(?P<prefix>(?:\d+\.){3}\d+/\d+)"; // x.x.x.x/xx
const PM_RE: &str = r"\[(?P<preference>\d+)/(?P<metric>\d+)\]"; // [distance/metric]
const IP_RE: &str = r"(?P<ip>(?:\d+\.){3}\d+)";
const TIME_RE: &str = r"[ywdhm\d:]+"; // "1y2w3d", "1d02h", "00:01:23"; not captured
const INTF_RE: &str = r"(?P<intf>[\w/:.\-]+)";

static PATTERNS: LazyLock<Vec<LinePattern<RouteLine>>> = LazyLock::new(|| {
    let bases = [
        (format!(r"{PROTO_RE}.*\s{PREFIX_RE} is directly connected"), RouteLine::Direct),
        (format!(r"{PROTO_RE}.*\s{PREFIX_RE}\s+{PM_RE}\s+via\s+{IP_RE}"), RouteLine::Entry),
        (format!(r"^\s*(?:\[\d+/\d+\]\s+)?via\s+{IP_RE}"), RouteLine::Continuation),
    ];
    // Time and interface are both free-form; order must stay
    // time+interface, time only, interface only
    let suffixes = [
        format!(r", {TIME_RE}, {INTF_RE}"),
        format!(r", {TIME_RE}\s*$"),
        format!(r", {INTF_RE}"),
        r"\s*$".to_string(),
    ];

    let mut patterns: Vec<LinePattern<RouteLine>> = bases
        .iter()
        .flat_map(|(base, kind)| {
            suffixes
                .iter()
                .map(move |suffix| LinePattern::new(&format!("{base}{suffix}"), *kind))
        })
        .collect();
    patterns.push(LinePattern::new(r"^\s*VRF:\s*(?P<table_name>\S+)", RouteLine::Vrf));
    patterns
});

/// Expand a one-letter protocol code
pub fn long_protocol(code: &str, sink: &dyn WarningSink) -> String {
    match code {
        "C" => "Direct",
        "L" => "Local",
        "S" => "Static",
        "O" => "OSPF",
        "B" => "BGP",
        _ => {
            sink.warn(Warning::UnknownProtocol { code: code.to_string() });
            UNKNOWN_PROTOCOL
        }
    }
    .to_string()
}

pub struct CliRouteParser<'a> {
    table_name: String,
    entries: Vec<RouteTableEntry>,
    sink: &'a dyn WarningSink,
}

impl<'a> CliRouteParser<'a> {
    pub fn new(sink: &'a dyn WarningSink) -> Self {
        CliRouteParser {
            table_name: DEFAULT_TABLE_NAME.to_string(),
            entries: Vec::new(),
            sink,
        }
    }

    pub fn into_table(self) -> RouteTable {
        RouteTable::new(self.table_name, self.entries)
    }

    fn add_direct_entry(&mut self, caps: &Captures<'_>) {
        let protocol = long_protocol(&caps["proto"], self.sink);
        let nexthops = capture(caps, "intf")
            .map(|intf| vec![RouteEntryNextHop::new(None, Some(intf))])
            .unwrap_or_default();

        tracing::debug!("direct connected: proto={} prefix={} nexthops={:?}", protocol, &caps["prefix"], nexthops);

        let entry = RouteEntry {
            nexthops,
            preference: Some(0),
            protocol: Some(protocol),
            ..Default::default()
        };
        self.entries.push(RouteTableEntry::new(&caps["prefix"], vec![entry]));
    }

    fn add_entry(&mut self, caps: &Captures<'_>, line_no: usize) -> AppResult<()> {
        let protocol = long_protocol(&caps["proto"], self.sink);
        let preference = parse_number(caps, "preference", line_no)?;
        let metric = parse_number(caps, "metric", line_no)?;
        let nexthop = RouteEntryNextHop::new(capture(caps, "ip"), capture(caps, "intf"));

        tracing::debug!(
            "entry: proto={}, [{}/{}] prefix={}, nexthop={:?}",
            protocol,
            preference,
            metric,
            &caps["prefix"],
            nexthop
        );

        let entry = RouteEntry {
            nexthops: vec![nexthop],
            preference: Some(preference),
            protocol: Some(protocol),
            metric: Some(metric),
            ..Default::default()
        };
        self.entries.push(RouteTableEntry::new(&caps["prefix"], vec![entry]));
        Ok(())
    }

    /// Append a next-hop to the last route entry of the last table entry
    fn add_nexthop_to_last_entry(&mut self, caps: &Captures<'_>, line_no: usize, line: &str) {
        let nexthop = RouteEntryNextHop::new(capture(caps, "ip"), capture(caps, "intf"));
        tracing::debug!("entry (same destination): nexthop={:?}", nexthop);

        match self.entries.last_mut().and_then(|e| e.entries.last_mut()) {
            Some(route_entry) => route_entry.nexthops.push(nexthop),
            None => self.sink.warn(Warning::OrphanContinuation {
                line_no,
                line: line.to_string(),
            }),
        }
    }
}

fn parse_number(caps: &Captures<'_>, name: &str, line_no: usize) -> AppResult<i64> {
    let raw = &caps[name];
    raw.parse()
        .map_err(|_| AppError::invalid_field(name, raw, &format!("line {}", line_no)))
}

impl LineGrammar for CliRouteParser<'_> {
    type Kind = RouteLine;

    fn patterns() -> &'static [LinePattern<RouteLine>] {
        &PATTERNS
    }

    fn on_match(&mut self, kind: RouteLine, caps: &Captures<'_>, line_no: usize, line: &str) -> AppResult<()> {
        match kind {
            RouteLine::Direct => self.add_direct_entry(caps),
            RouteLine::Entry => self.add_entry(caps, line_no)?,
            RouteLine::Continuation => self.add_nexthop_to_last_entry(caps, line_no, line),
            RouteLine::Vrf => self.table_name = caps["table_name"].to_string(),
        }
        Ok(())
    }
}

pub fn parse_route_table(text: &str, sink: &dyn WarningSink) -> AppResult<RouteTable> {
    let mut parser = CliRouteParser::new(sink);
    let matched = parse_lines(&mut parser, text)?;
    tracing::debug!("{} route lines matched", matched);
    Ok(parser.into_table())
}
