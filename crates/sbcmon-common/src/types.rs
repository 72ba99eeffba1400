use serde::{Deserialize, Serialize};
use std::fmt;

/// How a metric class is repeated across the discovered topology.
///
/// # Examples
///
/// ```
/// use sbcmon_common::types::Repetition;
///
/// let rep: Repetition = "per_partition_zone".parse().unwrap();
/// assert_eq!(rep, Repetition::PerPartitionZone);
/// assert_eq!(rep.to_string(), "per_partition_zone");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repetition {
    /// Fetched once per cycle.
    None,
    /// Fetched once per partition.
    PerPartition,
    /// Fetched once per (partition, zone) pair.
    PerPartitionZone,
    /// Fetched once per (partition, interface group) pair.
    PerPartitionInterfaceGroup,
}

impl fmt::Display for Repetition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repetition::None => write!(f, "none"),
            Repetition::PerPartition => write!(f, "per_partition"),
            Repetition::PerPartitionZone => write!(f, "per_partition_zone"),
            Repetition::PerPartitionInterfaceGroup => write!(f, "per_partition_interface_group"),
        }
    }
}

impl std::str::FromStr for Repetition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Repetition::None),
            "per_partition" => Ok(Repetition::PerPartition),
            "per_partition_zone" => Ok(Repetition::PerPartitionZone),
            "per_partition_interface_group" => Ok(Repetition::PerPartitionInterfaceGroup),
            _ => Err(format!("unknown repetition: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceGroup {
    pub name: String,
}

/// An address context on the monitored element together with the zones and
/// interface groups discovered for it during the current cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub name: String,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub interface_groups: Vec<InterfaceGroup>,
}

impl Partition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zones: Vec::new(),
            interface_groups: Vec::new(),
        }
    }
}

/// Everything the topology discoverer learned in one cycle. Read-only once
/// built; dropped when the cycle ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub partitions: Vec<Partition>,
}

impl Topology {
    pub fn new(partitions: Vec<Partition>) -> Self {
        Self { partitions }
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Total zones across all partitions.
    pub fn zone_count(&self) -> usize {
        self.partitions.iter().map(|p| p.zones.len()).sum()
    }

    /// Total interface groups across all partitions.
    pub fn interface_group_count(&self) -> usize {
        self.partitions.iter().map(|p| p.interface_groups.len()).sum()
    }

    /// Number of jobs a single class with the given repetition expands into.
    ///
    /// # Examples
    ///
    /// ```
    /// use sbcmon_common::types::{Partition, Repetition, Topology, Zone};
    ///
    /// let mut a = Partition::new("a");
    /// a.zones.push(Zone { name: "z1".into() });
    /// a.zones.push(Zone { name: "z2".into() });
    /// let topology = Topology::new(vec![a, Partition::new("b")]);
    ///
    /// assert_eq!(topology.expansion_count(Repetition::None), 1);
    /// assert_eq!(topology.expansion_count(Repetition::PerPartition), 2);
    /// assert_eq!(topology.expansion_count(Repetition::PerPartitionZone), 2);
    /// assert_eq!(topology.expansion_count(Repetition::PerPartitionInterfaceGroup), 0);
    /// ```
    pub fn expansion_count(&self, repetition: Repetition) -> usize {
        match repetition {
            Repetition::None => 1,
            Repetition::PerPartition => self.partition_count(),
            Repetition::PerPartitionZone => self.zone_count(),
            Repetition::PerPartitionInterfaceGroup => self.interface_group_count(),
        }
    }
}

/// Per-job addressing information. One instance is built for every
/// dispatched job and owned by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Base address of the selected target, without trailing slash.
    pub base: String,
    pub partition: Option<String>,
    pub zone: Option<String>,
    pub interface_group: Option<String>,
}

impl RequestContext {
    pub fn root(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            partition: None,
            zone: None,
            interface_group: None,
        }
    }

    pub fn for_partition(base: impl Into<String>, partition: impl Into<String>) -> Self {
        Self {
            partition: Some(partition.into()),
            ..Self::root(base)
        }
    }

    pub fn for_zone(
        base: impl Into<String>,
        partition: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            zone: Some(zone.into()),
            ..Self::for_partition(base, partition)
        }
    }

    pub fn for_interface_group(
        base: impl Into<String>,
        partition: impl Into<String>,
        interface_group: impl Into<String>,
    ) -> Self {
        Self {
            interface_group: Some(interface_group.into()),
            ..Self::for_partition(base, partition)
        }
    }

    /// Partition name, or an empty string for unrepeated jobs.
    pub fn partition(&self) -> &str {
        self.partition.as_deref().unwrap_or_default()
    }

    pub fn zone(&self) -> &str {
        self.zone.as_deref().unwrap_or_default()
    }

    pub fn interface_group(&self) -> &str {
        self.interface_group.as_deref().unwrap_or_default()
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        if let Some(partition) = &self.partition {
            write!(f, " partition={partition}")?;
        }
        if let Some(zone) = &self.zone {
            write!(f, " zone={zone}")?;
        }
        if let Some(group) = &self.interface_group {
            write!(f, " interface_group={group}")?;
        }
        Ok(())
    }
}

/// Error carried by a failed job outcome. Boxed so transport and decode
/// errors from different crates keep their original type and source chain.
pub type JobError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of one dispatched job. Exactly one is produced per job.
#[derive(Debug)]
pub struct JobOutcome {
    pub class: String,
    pub success: bool,
    pub errors: Vec<JobError>,
}

impl JobOutcome {
    pub fn succeeded(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            success: true,
            errors: Vec::new(),
        }
    }

    pub fn failed(class: impl Into<String>, error: impl Into<JobError>) -> Self {
        Self {
            class: class.into(),
            success: false,
            errors: vec![error.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_context_accessors_default_to_empty() {
        let ctx = RequestContext::root("https://sbc/api");
        assert_eq!(ctx.partition(), "");
        assert_eq!(ctx.zone(), "");
        assert_eq!(ctx.interface_group(), "");
        assert_eq!(ctx.to_string(), "https://sbc/api");
    }

    #[test]
    fn zone_context_carries_partition() {
        let ctx = RequestContext::for_zone("https://sbc/api", "default", "ZONE_A");
        assert_eq!(ctx.partition(), "default");
        assert_eq!(ctx.zone(), "ZONE_A");
        assert!(ctx.interface_group.is_none());
        assert_eq!(
            ctx.to_string(),
            "https://sbc/api partition=default zone=ZONE_A"
        );
    }

    #[test]
    fn failed_outcome_keeps_original_error() {
        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "deadline elapsed");
        let outcome = JobOutcome::failed("Fan", err);
        assert!(!outcome.success);
        assert_eq!(outcome.errors.len(), 1);
        let io = outcome.errors[0]
            .downcast_ref::<std::io::Error>()
            .expect("error should keep its type");
        assert_eq!(io.kind(), std::io::ErrorKind::TimedOut);
    }

    #[test]
    fn repetition_rejects_unknown_names() {
        assert!("per_zone".parse::<Repetition>().is_err());
    }
}
