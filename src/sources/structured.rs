// Structured-device adapter
//
// Router JSON exports (CLI `| display json` on a physical router, JSON-RPC on
// an emulated one) share one schema where every scalar is wrapped as a
// one-element list of `{"data": value}`:
//
//   {"route-information": [{"route-table": [{"table-name": [{"data": "inet.0"}],
//     "rt": [{"rt-destination": [{"data": "10.0.0.0/24"}], "rt-entry": [...]}]}]}]}

use serde_json::Value;

use crate::diagnostics::{Warning, WarningSink};
use crate::error::{AppError, AppResult};
use crate::ospf::{OspfNeighborTable, OspfNeighborTableEntry};
use crate::routes::{RouteEntry, RouteEntryNextHop, RouteTable, RouteTableEntry};

pub const ROUTE_TABLE_NAME: &str = "inet.0";
pub const OSPF_TABLE_NAME: &str = "_structured_ospf_neighbor_";

/// Unwrap `obj[key][0].data`
pub fn envelope<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    obj.get(key)?.get(0)?.get("data")
}

/// Unwrap an enveloped value as a string
pub fn envelope_str(obj: &Value, key: &str) -> Option<String> {
    match envelope(obj, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Unwrap an enveloped value as an integer. Absent keys are `Ok(None)`,
/// present but non-numeric values are an error.
fn envelope_int(obj: &Value, key: &str, origin: &str) -> AppResult<Option<i64>> {
    let Some(value) = envelope(obj, key) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| AppError::invalid_field(key, value.to_string(), origin))
}

fn required_str(obj: &Value, key: &str, origin: &str) -> AppResult<String> {
    envelope_str(obj, key).ok_or_else(|| AppError::missing_field(key, origin))
}

fn list<'a>(obj: &'a Value, key: &str, origin: &str) -> AppResult<&'a Vec<Value>> {
    obj.get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::missing_field(key, origin))
}

fn warn_if_multiple(items: &[Value], key: &str, sink: &dyn WarningSink) {
    if items.len() > 1 {
        sink.warn(Warning::MultipleValues {
            key: key.to_string(),
            detail: Value::Array(items.to_vec()).to_string(),
        });
    }
}

fn parse_nexthop(nh: &Value) -> RouteEntryNextHop {
    let to = envelope_str(nh, "to");
    let via = envelope_str(nh, "via").or_else(|| envelope_str(nh, "nh-local-interface"));
    RouteEntryNextHop { to, via }
}

fn parse_route_entry(rt_entry: &Value, origin: &str) -> AppResult<RouteEntry> {
    let nexthops = rt_entry
        .get("nh")
        .and_then(Value::as_array)
        .map(|nhs| nhs.iter().map(parse_nexthop).collect())
        .unwrap_or_default();

    Ok(RouteEntry {
        nexthops,
        nexthop_type: envelope_str(rt_entry, "nh-type"),
        preference: envelope_int(rt_entry, "preference", origin)?,
        protocol: envelope_str(rt_entry, "protocol-name"),
        metric: envelope_int(rt_entry, "metric", origin)?,
    })
}

fn parse_route_table_entry(rt: &Value, origin: &str, sink: &dyn WarningSink) -> AppResult<RouteTableEntry> {
    let destinations = list(rt, "rt-destination", origin)?;
    warn_if_multiple(destinations, "rt-destination", sink);
    let destination = required_str(rt, "rt-destination", origin)?;

    let rt_entries = list(rt, "rt-entry", origin)?;
    warn_if_multiple(rt_entries, "rt-entry", sink);
    let entries = rt_entries
        .iter()
        .map(|e| parse_route_entry(e, origin))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(RouteTableEntry::new(destination, entries))
}

/// Build the `inet.0` route table of a structured export. The result is not
/// normalized; see `RouteTable::normalized`.
pub fn route_table_from_value(data: &Value, origin: &str, sink: &dyn WarningSink) -> AppResult<RouteTable> {
    let route_information = list(data, "route-information", origin)?;
    let route_tables = route_information
        .first()
        .map(|info| list(info, "route-table", origin))
        .transpose()?
        .ok_or_else(|| AppError::missing_field("route-table", origin))?;

    let inet0 = route_tables
        .iter()
        .find(|t| envelope_str(t, "table-name").as_deref() == Some(ROUTE_TABLE_NAME))
        .ok_or_else(|| AppError::MissingTable {
            table: ROUTE_TABLE_NAME.to_string(),
            origin: origin.to_string(),
        })?;

    let entries = match inet0.get("rt").and_then(Value::as_array) {
        Some(rts) => rts
            .iter()
            .map(|rt| parse_route_table_entry(rt, origin, sink))
            .collect::<AppResult<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(RouteTable::new(ROUTE_TABLE_NAME, entries))
}

fn parse_neighbor(neighbor: &Value, origin: &str) -> AppResult<OspfNeighborTableEntry> {
    Ok(OspfNeighborTableEntry {
        address: required_str(neighbor, "neighbor-address", origin)?,
        interface: required_str(neighbor, "interface-name", origin)?,
        state: required_str(neighbor, "ospf-neighbor-state", origin)?,
        id: envelope_str(neighbor, "neighbor-id"),
        priority: envelope_int(neighbor, "neighbor-priority", origin)?,
    })
}

pub fn ospf_neighbor_table_from_value(
    data: &Value,
    origin: &str,
    sink: &dyn WarningSink,
) -> AppResult<OspfNeighborTable> {
    let information = list(data, "ospf-neighbor-information", origin)?;
    warn_if_multiple(information, "ospf-neighbor-information", sink);

    // A router without adjacencies exports the container with no neighbor list
    let entries = match information
        .first()
        .and_then(|info| info.get("ospf-neighbor"))
        .and_then(Value::as_array)
    {
        Some(neighbors) => neighbors
            .iter()
            .map(|n| parse_neighbor(n, origin))
            .collect::<AppResult<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(OspfNeighborTable::new(OSPF_TABLE_NAME, entries))
}

pub fn parse_route_table(json_str: &str, origin: &str, sink: &dyn WarningSink) -> AppResult<RouteTable> {
    let data: Value = serde_json::from_str(json_str)?;
    route_table_from_value(&data, origin, sink)
}

pub fn parse_ospf_neighbor_table(json_str: &str, origin: &str, sink: &dyn WarningSink) -> AppResult<OspfNeighborTable> {
    let data: Value = serde_json::from_str(json_str)?;
    ospf_neighbor_table_from_value(&data, origin, sink)
}
