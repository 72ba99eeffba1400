use crate::error::{ConvertError, Result};
use crate::{xml, MetricClass};
use sbcmon_common::metric::{MetricDesc, MetricSink};
use sbcmon_common::types::{Repetition, RequestContext};
use serde::Deserialize;

const URL_SUFFIX: &str = "/operational/system/fanStatus/";

pub static FAN_SPEED: MetricDesc = MetricDesc::gauge(
    "sonus_fan_speed",
    "Current speed of fans, in RPM",
    &["server", "fanID"],
);

static DESCRIPTORS: [&MetricDesc; 1] = [&FAN_SPEED];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FanCollection {
    #[serde(rename = "fanStatus")]
    fans: Vec<FanStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FanStatus {
    server_name: String,
    fan_id: String,
    speed: String,
}

impl FanStatus {
    /// Speed is reported as text, e.g. `5632 RPM`.
    fn rpm(&self) -> Result<f64> {
        let raw = self.speed.trim();
        let number = raw.strip_suffix("RPM").unwrap_or(raw).trim();
        number.parse::<f64>().map_err(|e| ConvertError::Field {
            field: "speed",
            value: self.speed.clone(),
            reason: e.to_string(),
        })
    }
}

/// Chassis fan speeds.
pub struct FanMetric;

impl MetricClass for FanMetric {
    fn name(&self) -> &str {
        "Fan"
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
        let collection: FanCollection = xml::decode("fanStatus", body)?;

        for fan in &collection.fans {
            match fan.rpm() {
                Ok(rpm) => sink.emit(&FAN_SPEED, rpm, [&fan.server_name, &fan.fan_id]),
                Err(e) => {
                    tracing::warn!(server = %fan.server_name, fan = %fan.fan_id, error = %e, "Skipping fan record");
                }
            }
        }
        Ok(())
    }
}
