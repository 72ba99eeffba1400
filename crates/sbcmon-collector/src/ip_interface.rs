use crate::error::Result;
use crate::{xml, MetricClass};
use sbcmon_common::metric::{MetricDesc, MetricSink};
use sbcmon_common::types::{Repetition, RequestContext};
use serde::Deserialize;

pub static STATUS: MetricDesc = MetricDesc::gauge(
    "sonus_ipinterface_status",
    "Current status of ipInterfaceGroup",
    &["name", "status_text"],
);

pub static RX_PACKETS: MetricDesc = MetricDesc::counter(
    "sonus_ipinterface_rxpackets",
    "Number of packets received on ipInterfaceGroup",
    &["name"],
);

pub static TX_PACKETS: MetricDesc = MetricDesc::counter(
    "sonus_ipinterface_txpackets",
    "Number of packets transmitted on ipInterfaceGroup",
    &["name"],
);

pub static RX_BANDWIDTH: MetricDesc = MetricDesc::gauge(
    "sonus_ipinterface_rxbandwidth",
    "Receive bandwidth in use on interface, in bytes per second",
    &["name"],
);

pub static TX_BANDWIDTH: MetricDesc = MetricDesc::gauge(
    "sonus_ipinterface_txbandwidth",
    "Transmit bandwidth in use on interface, in bytes per second",
    &["name"],
);

pub static MEDIA_STREAMS: MetricDesc = MetricDesc::gauge(
    "sonus_ipinterface_media_streams",
    "Number of media streams currently on ipInterfaceGroup",
    &["name"],
);

static DESCRIPTORS: [&MetricDesc; 6] = [
    &STATUS,
    &RX_PACKETS,
    &TX_PACKETS,
    &RX_BANDWIDTH,
    &TX_BANDWIDTH,
    &MEDIA_STREAMS,
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IpInterfaceStatusCollection {
    #[serde(rename = "ipInterfaceStatus")]
    interfaces: Vec<IpInterfaceStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IpInterfaceStatus {
    name: String,
    oper_state: String,
    rx_packets: f64,
    tx_packets: f64,
    rx_actual_bandwidth: f64,
    tx_actual_bandwidth: f64,
    num_media_streams: f64,
}

impl IpInterfaceStatus {
    /// 0 while resources are allocated, 1 for any other operational state.
    fn status_value(&self) -> f64 {
        xml::flag(self.oper_state != "resAllocated")
    }
}

/// Per-interface traffic and status, fetched once per interface group.
pub struct IpInterfaceMetric;

impl MetricClass for IpInterfaceMetric {
    fn name(&self) -> &str {
        "IPInterface"
    }

    fn repetition(&self) -> Repetition {
        Repetition::PerPartitionInterfaceGroup
    }

    fn url(&self, ctx: &RequestContext) -> String {
        format!(
            "{}/operational/addressContext/{}/ipInterfaceGroup/{}/ipInterfaceStatus/",
            ctx.base,
            ctx.partition(),
            ctx.interface_group()
        )
    }

    fn descriptors(&self) -> &'static [&'static MetricDesc] {
        &DESCRIPTORS
    }

    fn convert(&self, _ctx: &RequestContext, body: &[u8], sink: &MetricSink) -> Result<()> {
        let collection: IpInterfaceStatusCollection = xml::decode("ipInterfaceStatus", body)?;

        for interface in &collection.interfaces {
            let name = interface.name.as_str();
            sink.emit(
                &STATUS,
                interface.status_value(),
                [name, interface.oper_state.as_str()],
            );
            sink.emit(&RX_PACKETS, interface.rx_packets, [name]);
            sink.emit(&TX_PACKETS, interface.tx_packets, [name]);
            sink.emit(&RX_BANDWIDTH, interface.rx_actual_bandwidth, [name]);
            sink.emit(&TX_BANDWIDTH, interface.tx_actual_bandwidth, [name]);
            sink.emit(&MEDIA_STREAMS, interface.num_media_streams, [name]);
        }
        Ok(())
    }
}
