use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

/// Static description of one exported metric: fully-qualified name, help
/// text, type and label names.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

impl MetricDesc {
    pub const fn gauge(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
            labels,
        }
    }

    pub const fn counter(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Counter,
            labels,
        }
    }
}

/// A single sampled value for a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub desc: &'static MetricDesc,
    pub value: f64,
    pub label_values: Vec<String>,
}

impl Observation {
    /// Whether the label values line up with the descriptor's label names.
    pub fn is_well_formed(&self) -> bool {
        self.label_values.len() == self.desc.labels.len()
    }
}

/// Write side of the per-cycle observation channel. Cheap to clone; every
/// job holds its own handle.
#[derive(Debug, Clone)]
pub struct MetricSink {
    tx: mpsc::UnboundedSender<Observation>,
}

/// Single consumer of a cycle's observations.
#[derive(Debug)]
pub struct ObservationReceiver {
    rx: mpsc::UnboundedReceiver<Observation>,
}

impl MetricSink {
    pub fn channel() -> (Self, ObservationReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, ObservationReceiver { rx })
    }

    /// Records a value. Observations emitted after the cycle's receiver has
    /// been drained and dropped are discarded.
    pub fn emit<I, S>(&self, desc: &'static MetricDesc, value: f64, label_values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let observation = Observation {
            desc,
            value,
            label_values: label_values.into_iter().map(Into::into).collect(),
        };
        // The receiver only goes away once the cycle is over.
        let _ = self.tx.send(observation);
    }
}

impl ObservationReceiver {
    /// Takes everything emitted so far and closes the channel.
    pub fn drain(mut self) -> Vec<Observation> {
        self.rx.close();
        let mut observations = Vec::new();
        while let Ok(observation) = self.rx.try_recv() {
            observations.push(observation);
        }
        observations
    }
}
