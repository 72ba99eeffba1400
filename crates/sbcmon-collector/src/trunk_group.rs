use crate::error::Result;
use crate::{xml, MetricClass};
use sbcmon_common::metric::{MetricDesc, MetricSink};
use sbcmon_common::types::{Repetition, RequestContext};
use serde::Deserialize;

const URL_SUFFIX: &str = "/operational/global/globalTrunkGroupStatus/";

pub static USAGE: MetricDesc = MetricDesc::gauge(
    "sonus_TG_usage_total",
    "Number of active calls",
    &["zone", "name", "direction"],
);

pub static BANDWIDTH: MetricDesc = MetricDesc::gauge(
    "sonus_TG_bytes",
    "Bandwidth in use by current calls",
    &["zone", "name", "direction"],
);

pub static TOTAL_CHANNELS: MetricDesc = MetricDesc::gauge(
    "sonus_TG_total_channels",
    "Number of configured channels",
    &["zone", "name"],
);

pub static STATE: MetricDesc =
    MetricDesc::gauge("sonus_TG_state", "State of the trunkgroup", &["zone", "name"]);

pub static OUTBOUND_STATE: MetricDesc = MetricDesc::gauge(
    "sonus_TG_outbound_state",
    "State of outbound calls on the trunkgroup",
    &["zone", "name"],
);

static DESCRIPTORS: [&MetricDesc; 5] = [
    &USAGE,
    &BANDWIDTH,
    &TOTAL_CHANNELS,
    &STATE,
    &OUTBOUND_STATE,
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TrunkGroupCollection {
    #[serde(rename = "globalTrunkGroupStatus")]
    trunk_groups: Vec<TrunkGroupStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TrunkGroupStatus {
    name: String,
    zone: String,
    state: String,
    packet_out_detect_state: String,
    inbound_calls_usage: f64,
    outbound_calls_usage: f64,
    #[serde(rename = "bwInboundUsage")]
    bandwidth_inbound_usage: f64,
    #[serde(rename = "bwOutboundUsage")]
    bandwidth_outbound_usage: f64,
    total_calls_configured: f64,
}

impl TrunkGroupStatus {
    fn in_service(&self) -> bool {
        self.state == "inService"
    }

    fn outbound_normal(&self) -> bool {
        self.packet_out_detect_state == "normal"
    }
}

/// Call usage and state of every global trunk group.
pub struct TrunkGroupMetric;

impl MetricClass for TrunkGroupMetric {
    fn name(&self) -> &str {
        "TrunkGroup"
    }

    fn repetition(&self) -> Repetition {
        Repetition::None
    }

    fn url(&self, ctx: &RequestContext) -> String {
        format!("{}{URL_SUFFIX}", ctx.base)
    }

    fn descriptors(&self) -> &'static [&'static MetricDesc] {
        &DESCRIPTORS
    }

    fn convert(&self, _ctx: &RequestContext, body: &[u8], sink: &MetricSink) -> Result<()> {
        let collection: TrunkGroupCollection = xml::decode("globalTrunkGroupStatus", body)?;

        for tg in &collection.trunk_groups {
            let (zone, name) = (tg.zone.as_str(), tg.name.as_str());
            sink.emit(&USAGE, tg.inbound_calls_usage, [zone, name, "inbound"]);
            sink.emit(&USAGE, tg.outbound_calls_usage, [zone, name, "outbound"]);
            sink.emit(&BANDWIDTH, tg.bandwidth_inbound_usage, [zone, name, "inbound"]);
            sink.emit(&BANDWIDTH, tg.bandwidth_outbound_usage, [zone, name, "outbound"]);
            sink.emit(&TOTAL_CHANNELS, tg.total_calls_configured, [zone, name]);
            sink.emit(&STATE, xml::flag(tg.in_service()), [zone, name]);
            sink.emit(&OUTBOUND_STATE, xml::flag(tg.outbound_normal()), [zone, name]);
        }
        Ok(())
    }
}
