//! Decoders for the two per-partition listings the topology discoverer
//! fetches before any repeated job is scheduled.

use crate::error::Result;
use crate::xml;
use sbcmon_common::metric::{MetricDesc, MetricSink};
use sbcmon_common::types::{InterfaceGroup, Zone};
use serde::Deserialize;

pub static ZONE_TOTAL_CALLS_CONFIGURED: MetricDesc = MetricDesc::gauge(
    "sonus_zone_total_calls_configured",
    "Total call limit per zone",
    &["addresscontext", "zone"],
);

pub static ZONE_USAGE_TOTAL: MetricDesc = MetricDesc::gauge(
    "sonus_zone_usage_total",
    "Active calls per zone and direction",
    &["direction", "addresscontext", "zone"],
);

/// Metrics emitted as a side effect of zone discovery.
pub static ZONE_DESCRIPTORS: [&MetricDesc; 2] = [&ZONE_TOTAL_CALLS_CONFIGURED, &ZONE_USAGE_TOTAL];

pub fn zone_status_url(base: &str, partition: &str) -> String {
    format!("{base}/operational/addressContext/{partition}/zoneStatus/")
}

pub fn interface_group_url(base: &str, partition: &str) -> String {
    format!("{base}/operational/addressContext/{partition}/ipInterfaceGroup/")
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ZoneStatusCollection {
    #[serde(rename = "zoneStatus")]
    zones: Vec<ZoneStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ZoneStatus {
    name: String,
    inbound_calls_usage: f64,
    outbound_calls_usage: f64,
    total_calls_configured: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InterfaceGroupCollection {
    #[serde(rename = "ipInterfaceGroup")]
    groups: Vec<InterfaceGroupRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InterfaceGroupRecord {
    name: String,
}

/// Decodes a partition's zone listing, emitting the zone usage gauges for
/// it, and returns the zones found.
///
/// An empty body yields no zones.
pub fn decode_zones(partition: &str, body: &[u8], sink: &MetricSink) -> Result<Vec<Zone>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let collection: ZoneStatusCollection = xml::decode("zoneStatus", body)?;

    let mut zones = Vec::with_capacity(collection.zones.len());
    for zone in collection.zones {
        let name = zone.name.as_str();
        sink.emit(
            &ZONE_TOTAL_CALLS_CONFIGURED,
            zone.total_calls_configured,
            [partition, name],
        );
        sink.emit(
            &ZONE_USAGE_TOTAL,
            zone.inbound_calls_usage,
            ["inbound", partition, name],
        );
        sink.emit(
            &ZONE_USAGE_TOTAL,
            zone.outbound_calls_usage,
            ["outbound", partition, name],
        );
        zones.push(Zone { name: zone.name });
    }
    Ok(zones)
}

/// Decodes a partition's interface group listing.
pub fn decode_interface_groups(body: &[u8]) -> Result<Vec<InterfaceGroup>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let collection: InterfaceGroupCollection = xml::decode("ipInterfaceGroup", body)?;
    Ok(collection
        .groups
        .into_iter()
        .map(|g| InterfaceGroup { name: g.name })
        .collect())
}
