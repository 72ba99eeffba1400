use crate::error::Result;
use crate::{xml, MetricClass};
use sbcmon_common::metric::{MetricDesc, MetricSink};
use sbcmon_common::types::{Repetition, RequestContext};
use serde::Deserialize;

pub static REQUESTS_SENT: MetricDesc = MetricDesc::counter(
    "sonus_TG_sip_req_sent",
    "Number of SIP requests sent",
    &["zone", "name", "method"],
);

pub static REQUESTS_RECEIVED: MetricDesc = MetricDesc::counter(
    "sonus_TG_sip_req_recv",
    "Number of SIP requests received",
    &["zone", "name", "method"],
);

pub static RESPONSES_SENT: MetricDesc = MetricDesc::counter(
    "sonus_TG_sip_resp_sent",
    "Number of SIP responses sent",
    &["zone", "name", "code"],
);

pub static RESPONSES_RECEIVED: MetricDesc = MetricDesc::counter(
    "sonus_TG_sip_resp_recv",
    "Number of SIP responses received",
    &["zone", "name", "code"],
);

static DESCRIPTORS: [&MetricDesc; 4] = [
    &REQUESTS_SENT,
    &REQUESTS_RECEIVED,
    &RESPONSES_SENT,
    &RESPONSES_RECEIVED,
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SipStatisticCollection {
    #[serde(rename = "sipCurrentStatistics")]
    statistics: Vec<SipStatistics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SipStatistics {
    #[serde(rename = "name")]
    trunk_group: String,

    rcv_invite: f64,
    snd_invite: f64,
    rcv_ack: f64,
    snd_ack: f64,
    rcv_prack: f64,
    snd_prack: f64,
    rcv_info: f64,
    snd_info: f64,
    rcv_refer: f64,
    snd_refer: f64,
    rcv_bye: f64,
    snd_bye: f64,
    rcv_cancel: f64,
    snd_cancel: f64,
    rcv_register: f64,
    snd_register: f64,
    rcv_update: f64,
    snd_update: f64,
    rcv_subscriber: f64,
    snd_subscriber: f64,
    rcv_notify: f64,
    snd_notify: f64,
    rcv_option: f64,
    snd_option: f64,
    rcv_message: f64,
    snd_message: f64,
    rcv_publish: f64,
    snd_publish: f64,
    rcv_unknown_msg: f64,

    rcv_18x: f64,
    snd_18x: f64,
    rcv_1xx: f64,
    snd_1xx: f64,
    rcv_2xx: f64,
    snd_2xx: f64,
    rcv_non_inv2xx: f64,
    snd_non_inv2xx: f64,
    rcv_3xx: f64,
    snd_3xx: f64,
    rcv_4xx: f64,
    snd_4xx: f64,
    rcv_5xx: f64,
    snd_5xx: f64,
    rcv_6xx: f64,
    snd_6xx: f64,
    rcv_non_inv_err: f64,
    snd_non_inv_err: f64,

    inv_re_transmit: f64,
    reg_re_transmit: f64,
    // The element spells this one differently from its siblings.
    #[serde(rename = "byeRetransmit")]
    bye_re_transmit: f64,
    cancel_re_transmit: f64,
    other_re_transmit: f64,
}

impl SipStatistics {
    fn requests_sent(&self) -> [(&'static str, f64); 18] {
        [
            ("INVITE", self.snd_invite),
            ("PRACK", self.snd_prack),
            ("INFO", self.snd_info),
            ("REFER", self.snd_refer),
            ("BYE", self.snd_bye),
            ("CANCEL", self.snd_cancel),
            ("REGISTER", self.snd_register),
            ("UPDATE", self.snd_update),
            ("SUBSCRIBE", self.snd_subscriber),
            ("NOTIFY", self.snd_notify),
            ("OPTIONS", self.snd_option),
            ("MESSAGE", self.snd_message),
            ("PUBLISH", self.snd_publish),
            ("INVITE (retrans)", self.inv_re_transmit),
            ("REGISTER (retrans)", self.reg_re_transmit),
            ("BYE (retrans)", self.bye_re_transmit),
            ("CANCEL (retrans)", self.cancel_re_transmit),
            ("Other (retrans)", self.other_re_transmit),
        ]
    }

    fn requests_received(&self) -> [(&'static str, f64); 14] {
        [
            ("INVITE", self.rcv_invite),
            ("PRACK", self.rcv_prack),
            ("INFO", self.rcv_info),
            ("REFER", self.rcv_refer),
            ("BYE", self.rcv_bye),
            ("CANCEL", self.rcv_cancel),
            ("REGISTER", self.rcv_register),
            ("UPDATE", self.rcv_update),
            ("SUBSCRIBE", self.rcv_subscriber),
            ("NOTIFY", self.rcv_notify),
            ("OPTIONS", self.rcv_option),
            ("MESSAGE", self.rcv_message),
            ("PUBLISH", self.rcv_publish),
            ("Unknown", self.rcv_unknown_msg),
        ]
    }

    fn responses_sent(&self) -> [(&'static str, f64); 10] {
        [
            ("ACK", self.snd_ack),
            ("18x", self.snd_18x),
            ("1xx", self.snd_1xx),
            ("2xx", self.snd_2xx),
            ("Non-INVITE 2xx", self.snd_non_inv2xx),
            ("3xx", self.snd_3xx),
            ("4xx", self.snd_4xx),
            ("5xx", self.snd_5xx),
            ("6xx", self.snd_6xx),
            ("Non-INVITE error", self.snd_non_inv_err),
        ]
    }

    fn responses_received(&self) -> [(&'static str, f64); 10] {
        [
            ("ACK", self.rcv_ack),
            ("18x", self.rcv_18x),
            ("1xx", self.rcv_1xx),
            ("2xx", self.rcv_2xx),
            ("Non-INVITE 2xx", self.rcv_non_inv2xx),
            ("3xx", self.rcv_3xx),
            ("4xx", self.rcv_4xx),
            ("5xx", self.rcv_5xx),
            ("6xx", self.rcv_6xx),
            ("Non-INVITE error", self.rcv_non_inv_err),
        ]
    }
}

/// SIP request and response counters per trunk group, fetched once per zone.
pub struct SipStatisticMetric;

impl MetricClass for SipStatisticMetric {
    fn name(&self) -> &str {
        "SipStatistic"
    }

    fn repetition(&self) -> Repetition {
        Repetition::PerPartitionZone
    }

    fn url(&self, ctx: &RequestContext) -> String {
        format!(
            "{}/operational/addressContext/{}/zone/{}/sipCurrentStatistics/",
            ctx.base,
            ctx.partition(),
            ctx.zone()
        )
    }

    fn descriptors(&self) -> &'static [&'static MetricDesc] {
        &DESCRIPTORS
    }

    fn convert(&self, ctx: &RequestContext, body: &[u8], sink: &MetricSink) -> Result<()> {
        let collection: SipStatisticCollection = xml::decode("sipCurrentStatistics", body)?;
        let zone = ctx.zone();

        for stats in &collection.statistics {
            let name = stats.trunk_group.as_str();
            for (method, value) in stats.requests_sent() {
                sink.emit(&REQUESTS_SENT, value, [zone, name, method]);
            }
            for (method, value) in stats.requests_received() {
                sink.emit(&REQUESTS_RECEIVED, value, [zone, name, method]);
            }
            for (code, value) in stats.responses_sent() {
                sink.emit(&RESPONSES_SENT, value, [zone, name, code]);
            }
            for (code, value) in stats.responses_received() {
                sink.emit(&RESPONSES_RECEIVED, value, [zone, name, code]);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<collection xmlns:y="http://tail-f.com/ns/rest">
  <sipCurrentStatistics xmlns="http://sonusnet.com/ns/mibs/SONUS-SIP-PEER-PERF-STATS/1.0">
    <name>TEST_Logan</name>
    <rcvInvite>12</rcvInvite>
    <sndInvite>9</sndInvite>
    <rcvAck>4</rcvAck>
    <sndAck>0</sndAck>
    <snd18x>7</snd18x>
    <rcv4xx>3</rcv4xx>
    <byeRetransmit>2</byeRetransmit>
    <rcvUnknownMsg>1</rcvUnknownMsg>
    <emergencyAccept>0</emergencyAccept>
  </sipCurrentStatistics>
</collection>"#;

    fn find<'a>(
        observations: &'a [sbcmon_common::metric::Observation],
        desc: &MetricDesc,
        key: &str,
    ) -> &'a sbcmon_common::metric::Observation {
        observations
            .iter()
            .find(|o| o.desc == desc && o.label_values[2] == key)
            .unwrap()
    }

    #[test]
    fn emits_every_method_and_code() {
        let (sink, rx) = MetricSink::channel();
        let ctx = RequestContext::for_zone("b", "default", "ZONE_A");
        SipStatisticMetric
            .convert(&ctx, SAMPLE.as_bytes(), &sink)
            .unwrap();

        let observations = rx.drain();
        assert_eq!(observations.len(), 18 + 14 + 10 + 10);
        assert!(observations
            .iter()
            .all(|o| o.label_values[0] == "ZONE_A" && o.label_values[1] == "TEST_Logan"));

        assert_eq!(find(&observations, &REQUESTS_SENT, "INVITE").value, 9.0);
        assert_eq!(find(&observations, &REQUESTS_RECEIVED, "INVITE").value, 12.0);
        assert_eq!(find(&observations, &REQUESTS_SENT, "BYE (retrans)").value, 2.0);
        assert_eq!(find(&observations, &REQUESTS_RECEIVED, "Unknown").value, 1.0);
        assert_eq!(find(&observations, &RESPONSES_SENT, "18x").value, 7.0);
        assert_eq!(find(&observations, &RESPONSES_RECEIVED, "ACK").value, 4.0);
        assert_eq!(find(&observations, &RESPONSES_RECEIVED, "4xx").value, 3.0);
    }
}
