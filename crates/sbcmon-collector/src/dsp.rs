use crate::error::Result;
use crate::{xml, MetricClass};
use sbcmon_common::metric::{MetricDesc, MetricSink};
use sbcmon_common::types::{Repetition, RequestContext};
use serde::Deserialize;

const URL_SUFFIX: &str = "/operational/system/dspStatus/dspUsage/";

pub static RESOURCES_USED: MetricDesc = MetricDesc::gauge(
    "sonus_dsp_resources_used",
    "Usage of DSP resources per slot",
    &["system", "slot"],
);

pub static RESOURCES_TOTAL: MetricDesc = MetricDesc::gauge(
    "sonus_dsp_resources_total",
    "Total compression resources",
    &["system"],
);

pub static COMPRESSION_UTILIZATION: MetricDesc = MetricDesc::gauge(
    "sonus_dsp_compression_utilization",
    "Compression resource utilization, in percent",
    &["system"],
);

pub static CODEC_UTILIZATION: MetricDesc = MetricDesc::gauge(
    "sonus_dsp_codec_utilization",
    "Codec utilization, in percent",
    &["system", "codec"],
);

static DESCRIPTORS: [&MetricDesc; 4] = [
    &RESOURCES_USED,
    &RESOURCES_TOTAL,
    &COMPRESSION_UTILIZATION,
    &CODEC_UTILIZATION,
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DspUsageCollection {
    #[serde(rename = "dspUsage")]
    usage: Option<DspUsage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DspUsage {
    system_name: String,
    slot1_resources_utilized: f64,
    slot2_resources_utilized: f64,
    slot3_resources_utilized: f64,
    slot4_resources_utilized: f64,
    compression_total: f64,
    compression_utilization: f64,
    g711_utilization: f64,
    g711_ss_utilization: f64,
    g726_utilization: f64,
    g7231_utilization: f64,
    g722_utilization: f64,
    g7221_utilization: f64,
    g729_ab_utilization: f64,
    ecm_utilization: f64,
    ilbc_utilization: f64,
    amr_nb_utilization: f64,
    amr_wb_utilization: f64,
    tone_utilization: f64,
    g711_v8_utilization: f64,
    g711_ss_v8_utilization: f64,
    g726_v8_utilization: f64,
    g7231_v8_utilization: f64,
    g722_v8_utilization: f64,
    g7221_v8_utilization: f64,
    g729_ab_v8_utilization: f64,
    ecm_v34_utilization: f64,
    ilbc_v8_utilization: f64,
    opus_utilization: f64,
}

impl DspUsage {
    fn slots(&self) -> [(&'static str, f64); 4] {
        [
            ("1", self.slot1_resources_utilized),
            ("2", self.slot2_resources_utilized),
            ("3", self.slot3_resources_utilized),
            ("4", self.slot4_resources_utilized),
        ]
    }

    /// Utilization per codec, keyed by the codec's display name.
    fn codecs(&self) -> [(&'static str, f64); 22] {
        [
            ("G.711", self.g711_utilization),
            ("G.711 Silence Suppression", self.g711_ss_utilization),
            ("G.726", self.g726_utilization),
            ("G.723.1", self.g7231_utilization),
            ("G.722", self.g722_utilization),
            ("G.722.1", self.g7221_utilization),
            ("G.729", self.g729_ab_utilization),
            ("ECM", self.ecm_utilization),
            ("iLBC", self.ilbc_utilization),
            ("AMR-NB", self.amr_nb_utilization),
            ("AMR-WB", self.amr_wb_utilization),
            ("Tone", self.tone_utilization),
            ("G.711 V8", self.g711_v8_utilization),
            ("G.711 Silence Suppression V8", self.g711_ss_v8_utilization),
            ("G.726 V8", self.g726_v8_utilization),
            ("G.723.1 V8", self.g7231_v8_utilization),
            ("G.722 V8", self.g722_v8_utilization),
            ("G.722.1 V8", self.g7221_v8_utilization),
            ("G.729 V8", self.g729_ab_v8_utilization),
            ("ECM V.34", self.ecm_v34_utilization),
            ("iLBC V8", self.ilbc_v8_utilization),
            ("Opus", self.opus_utilization),
        ]
    }
}

/// DSP resource and codec utilization for the whole system.
pub struct DspMetric;

impl MetricClass for DspMetric {
    fn name(&self) -> &str {
        "DSP"
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
        let collection: DspUsageCollection = xml::decode("dspUsage", body)?;
        let Some(usage) = collection.usage else {
            tracing::debug!("dspUsage document has no usage record");
            return Ok(());
        };
        let system = usage.system_name.as_str();

        for (slot, used) in usage.slots() {
            sink.emit(&RESOURCES_USED, used, [system, slot]);
        }
        sink.emit(&RESOURCES_TOTAL, usage.compression_total, [system]);
        sink.emit(
            &COMPRESSION_UTILIZATION,
            usage.compression_utilization,
            [system],
        );
        for (codec, utilization) in usage.codecs() {
            sink.emit(&CODEC_UTILIZATION, utilization, [system, codec]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<collection xmlns:y="http://tail-f.com/ns/rest">
  <dspUsage xmlns="http://sonusnet.com/ns/mibs/SONUS-DRM-DSPSTATUS/1.0">
    <systemName>densbc01</systemName>
    <slot1ResourcesUtilized>68</slot1ResourcesUtilized>
    <slot2ResourcesUtilized>0</slot2ResourcesUtilized>
    <slot3ResourcesUtilized>0</slot3ResourcesUtilized>
    <slot4ResourcesUtilized>0</slot4ResourcesUtilized>
    <compressionTotal>4096</compressionTotal>
    <compressionAvailable>4028</compressionAvailable>
    <compressionUtilization>2</compressionUtilization>
    <g711Total>4096</g711Total>
    <g711Utilization>1</g711Utilization>
    <opusUtilization>7</opusUtilization>
  </dspUsage>
</collection>"#;

    #[test]
    fn emits_slot_total_and_codec_series() {
        let (sink, rx) = MetricSink::channel();
        DspMetric
            .convert(&RequestContext::root("b"), SAMPLE.as_bytes(), &sink)
            .unwrap();

        let observations = rx.drain();
        assert_eq!(observations.len(), 4 + 1 + 1 + 22);

        let slot1 = &observations[0];
        assert_eq!(slot1.desc, &RESOURCES_USED);
        assert_eq!(slot1.value, 68.0);
        assert_eq!(slot1.label_values, vec!["densbc01", "1"]);

        let total = observations
            .iter()
            .find(|o| o.desc == &RESOURCES_TOTAL)
            .unwrap();
        assert_eq!(total.value, 4096.0);

        let opus = observations
            .iter()
            .find(|o| o.label_values.get(1).map(String::as_str) == Some("Opus"))
            .unwrap();
        assert_eq!(opus.value, 7.0);

        let codecs: Vec<&str> = observations
            .iter()
            .filter(|o| o.desc == &CODEC_UTILIZATION)
            .map(|o| o.label_values[1].as_str())
            .collect();
        assert_eq!(codecs.len(), 22);
        assert_eq!(codecs.last(), Some(&"Opus"));
    }

    #[test]
    fn missing_usage_record_emits_nothing() {
        let (sink, rx) = MetricSink::channel();
        DspMetric
            .convert(
                &RequestContext::root("b"),
                br#"<collection xmlns:y="http://tail-f.com/ns/rest"></collection>"#,
                &sink,
            )
            .unwrap();
        assert!(rx.drain().is_empty());
    }
}
