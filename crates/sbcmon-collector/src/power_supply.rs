use crate::error::Result;
use crate::{xml, MetricClass};
use sbcmon_common::metric::{MetricDesc, MetricSink};
use sbcmon_common::types::{Repetition, RequestContext};
use serde::Deserialize;

const URL_SUFFIX: &str = "/operational/system/powerSupplyStatus/";

pub static POWER_FAULT: MetricDesc = MetricDesc::gauge(
    "sonus_powersupply_powerfault",
    "Is there a power fault, per supply",
    &["server", "powerSupplyID"],
);

pub static VOLTAGE_FAULT: MetricDesc = MetricDesc::gauge(
    "sonus_powersupply_voltagefault",
    "Is there a voltage fault, per supply",
    &["server", "powerSupplyID"],
);

static DESCRIPTORS: [&MetricDesc; 2] = [&POWER_FAULT, &VOLTAGE_FAULT];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PowerSupplyCollection {
    #[serde(rename = "powerSupplyStatus")]
    supplies: Vec<PowerSupplyStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PowerSupplyStatus {
    server_name: String,
    power_supply_id: String,
    power_fault: bool,
    voltage_fault: bool,
}

pub struct PowerSupplyMetric;

impl MetricClass for PowerSupplyMetric {
    fn name(&self) -> &str {
        "PowerSupply"
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
        let collection: PowerSupplyCollection = xml::decode("powerSupplyStatus", body)?;

        for psu in &collection.supplies {
            let labels = [&psu.server_name, &psu.power_supply_id];
            sink.emit(&POWER_FAULT, xml::flag(psu.power_fault), labels);
            sink.emit(&VOLTAGE_FAULT, xml::flag(psu.voltage_fault), labels);
        }
        Ok(())
    }
}
