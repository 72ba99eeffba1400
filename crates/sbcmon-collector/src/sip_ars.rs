use crate::error::Result;
use crate::{xml, MetricClass};
use sbcmon_common::metric::{MetricDesc, MetricSink};
use sbcmon_common::types::{Repetition, RequestContext};
use serde::Deserialize;

pub static ENDPOINT_STATUS: MetricDesc = MetricDesc::gauge(
    "sonus_sipars_endpoint_status",
    "State of a sipArs monitored endpoint",
    &["zone", "endpoint_address", "endpoint_port", "state_name"],
);

static DESCRIPTORS: [&MetricDesc; 1] = [&ENDPOINT_STATUS];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SipArsCollection {
    #[serde(rename = "sipArsStatus")]
    endpoints: Vec<SipArsStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipArsStatus {
    endpoint_domain_name: String,
    endpoint_ip_address: String,
    endpoint_ip_port_num: String,
    endpoint_ars_state: String,
}

impl SipArsStatus {
    /// The domain name when the endpoint has one, else its IP address.
    fn address(&self) -> &str {
        if self.endpoint_domain_name.is_empty() {
            &self.endpoint_ip_address
        } else {
            &self.endpoint_domain_name
        }
    }

    fn blacklisted(&self) -> bool {
        self.endpoint_ars_state == "blacklisted"
    }
}

/// Address reachability state of SIP peers, fetched once per zone.
pub struct SipArsMetric;

impl MetricClass for SipArsMetric {
    fn name(&self) -> &str {
        "SIP ARS"
    }

    fn repetition(&self) -> Repetition {
        Repetition::PerPartitionZone
    }

    fn url(&self, ctx: &RequestContext) -> String {
        format!(
            "{}/operational/addressContext/{}/zone/{}/sipArsStatus/",
            ctx.base,
            ctx.partition(),
            ctx.zone()
        )
    }

    fn descriptors(&self) -> &'static [&'static MetricDesc] {
        &DESCRIPTORS
    }

    fn convert(&self, ctx: &RequestContext, body: &[u8], sink: &MetricSink) -> Result<()> {
        let collection: SipArsCollection = xml::decode("sipArsStatus", body)?;

        for endpoint in &collection.endpoints {
            sink.emit(
                &ENDPOINT_STATUS,
                xml::flag(endpoint.blacklisted()),
                [
                    ctx.zone(),
                    endpoint.address(),
                    endpoint.endpoint_ip_port_num.as_str(),
                    endpoint.endpoint_ars_state.as_str(),
                ],
            );
        }
        Ok(())
    }
}
