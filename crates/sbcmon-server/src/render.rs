//! Prometheus text rendering of one cycle's observations.
//!
//! Observations are replayed into a registry built for this scrape only, so
//! nothing from a previous cycle can leak into the next response. The
//! process-wide self-telemetry registry is gathered alongside it.

use anyhow::Context;
use prometheus::{CounterVec, Encoder, GaugeVec, Opts, Registry, TextEncoder};
use sbcmon_common::metric::{MetricDesc, MetricKind, Observation};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

enum Family {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

impl Family {
    fn new(desc: &MetricDesc, registry: &Registry) -> prometheus::Result<Self> {
        let opts = Opts::new(desc.name, desc.help);
        let family = match desc.kind {
            MetricKind::Gauge => {
                let vec = GaugeVec::new(opts, desc.labels)?;
                registry.register(Box::new(vec.clone()))?;
                Family::Gauge(vec)
            }
            MetricKind::Counter => {
                let vec = CounterVec::new(opts, desc.labels)?;
                registry.register(Box::new(vec.clone()))?;
                Family::Counter(vec)
            }
        };
        Ok(family)
    }

    fn record(&self, observation: &Observation) -> prometheus::Result<()> {
        let values: Vec<&str> = observation.label_values.iter().map(String::as_str).collect();
        match self {
            Family::Gauge(vec) => vec.get_metric_with_label_values(&values)?.set(observation.value),
            Family::Counter(vec) => {
                if observation.value.is_nan() || observation.value < 0.0 {
                    return Err(prometheus::Error::Msg(format!(
                        "counter value {} is not a non-negative number",
                        observation.value
                    )));
                }
                vec.get_metric_with_label_values(&values)?
                    .inc_by(observation.value)
            }
        }
        Ok(())
    }
}

/// Builds a registry holding `observations`, grouped by descriptor.
///
/// Malformed observations (label arity mismatch, negative counters, a
/// descriptor rejected by the client library) are dropped and logged, as is
/// any repeat of a series already seen in this cycle; the first value wins.
/// Returns the registry and the number of dropped observations.
pub fn scrape_registry(observations: &[Observation]) -> (Registry, usize) {
    let registry = Registry::new();
    let mut families: HashMap<&'static str, Family> = HashMap::new();
    let mut seen: HashSet<(&'static str, &[String])> = HashSet::new();
    let mut dropped = 0;

    for observation in observations {
        let desc = observation.desc;
        if !observation.is_well_formed() {
            tracing::warn!(
                metric = desc.name,
                expected = desc.labels.len(),
                got = observation.label_values.len(),
                "Dropping observation with mismatched labels"
            );
            dropped += 1;
            continue;
        }

        if !seen.insert((desc.name, observation.label_values.as_slice())) {
            tracing::warn!(
                metric = desc.name,
                labels = ?observation.label_values,
                "Dropping duplicate series"
            );
            dropped += 1;
            continue;
        }

        let family = match families.entry(desc.name) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => match Family::new(desc, &registry) {
                Ok(family) => entry.insert(family),
                Err(e) => {
                    tracing::warn!(metric = desc.name, error = %e, "Dropping observation for unregistrable metric");
                    dropped += 1;
                    continue;
                }
            },
        };

        if let Err(e) = family.record(observation) {
            tracing::warn!(
                metric = desc.name,
                labels = ?observation.label_values,
                error = %e,
                "Dropping observation"
            );
            dropped += 1;
        }
    }

    (registry, dropped)
}

/// Renders the cycle's observations followed by the self-telemetry in
/// Prometheus text exposition format.
pub fn render(observations: &[Observation], telemetry: &Registry) -> anyhow::Result<String> {
    let (scrape, dropped) = scrape_registry(observations);
    if dropped > 0 {
        tracing::warn!(dropped, "Observations dropped while rendering");
    }

    let mut families = scrape.gather();
    families.extend(telemetry.gather());

    let mut buf = Vec::new();
    TextEncoder::new()
        .encode(&families, &mut buf)
        .context("Failed to encode metrics")?;
    String::from_utf8(buf).context("Encoded metrics are not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::IntCounter;

    static FAN_SPEED: MetricDesc =
        MetricDesc::gauge("sonus_fan_speed", "Fan speed in RPM", &["server", "fanID"]);
    static REQ_SENT: MetricDesc = MetricDesc::counter(
        "sonus_TG_sip_req_sent",
        "SIP requests sent",
        &["zone", "name", "method"],
    );

    fn observation(desc: &'static MetricDesc, value: f64, labels: &[&str]) -> Observation {
        Observation {
            desc,
            value,
            label_values: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn renders_gauges_and_counters() {
        let observations = vec![
            observation(&FAN_SPEED, 5632.0, &["sbc1", "FAN1"]),
            observation(&FAN_SPEED, 5700.0, &["sbc1", "FAN2"]),
            observation(&REQ_SENT, 12.0, &["ext", "ext", "INVITE"]),
        ];
        let text = render(&observations, &Registry::new()).unwrap();

        assert!(text.contains("# HELP sonus_fan_speed Fan speed in RPM"));
        assert!(text.contains("# TYPE sonus_fan_speed gauge"));
        assert!(text.contains("sonus_fan_speed{fanID=\"FAN1\",server=\"sbc1\"} 5632"));
        assert!(text.contains("sonus_fan_speed{fanID=\"FAN2\",server=\"sbc1\"} 5700"));
        assert!(text.contains("# TYPE sonus_TG_sip_req_sent counter"));
        assert!(text.contains("sonus_TG_sip_req_sent{method=\"INVITE\",name=\"ext\",zone=\"ext\"} 12"));
    }

    #[test]
    fn drops_malformed_observations() {
        let observations = vec![
            observation(&FAN_SPEED, 1.0, &["only-one"]),
            observation(&REQ_SENT, -3.0, &["ext", "ext", "BYE"]),
            observation(&FAN_SPEED, 2.0, &["sbc1", "FAN1"]),
        ];
        let (registry, dropped) = scrape_registry(&observations);
        assert_eq!(dropped, 2);

        let families = registry.gather();
        let fan = families
            .iter()
            .find(|f| f.get_name() == "sonus_fan_speed")
            .unwrap();
        assert_eq!(fan.get_metric().len(), 1);
    }

    #[test]
    fn repeated_series_keeps_first_value() {
        let observations = vec![
            observation(&REQ_SENT, 5.0, &["ext", "ext", "INVITE"]),
            observation(&REQ_SENT, 7.0, &["ext", "ext", "INVITE"]),
            observation(&FAN_SPEED, 5632.0, &["sbc1", "FAN1"]),
            observation(&FAN_SPEED, 10.0, &["sbc1", "FAN1"]),
            observation(&REQ_SENT, 2.0, &["ext", "ext", "BYE"]),
        ];
        let (_, dropped) = scrape_registry(&observations);
        assert_eq!(dropped, 2);

        let text = render(&observations, &Registry::new()).unwrap();
        assert!(text.contains("sonus_TG_sip_req_sent{method=\"INVITE\",name=\"ext\",zone=\"ext\"} 5\n"));
        assert!(text.contains("sonus_TG_sip_req_sent{method=\"BYE\",name=\"ext\",zone=\"ext\"} 2\n"));
        assert!(text.contains("sonus_fan_speed{fanID=\"FAN1\",server=\"sbc1\"} 5632\n"));
    }

    #[test]
    fn empty_cycle_renders_only_telemetry() {
        let telemetry = Registry::new();
        let failures = IntCounter::new("sonus_exporter_test_total", "test counter").unwrap();
        telemetry.register(Box::new(failures.clone())).unwrap();
        failures.inc();

        let text = render(&[], &telemetry).unwrap();
        assert!(text.contains("sonus_exporter_test_total 1"));
        assert!(!text.contains("sonus_fan_speed"));
    }
}
