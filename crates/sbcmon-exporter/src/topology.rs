use crate::client::Fetcher;
use crate::error::CycleError;
use sbcmon_collector::topology::{
    decode_interface_groups, decode_zones, interface_group_url, zone_status_url,
};
use sbcmon_common::metric::MetricSink;
use sbcmon_common::types::{JobError, Partition, Topology};

async fn fetch_listing(
    fetcher: &dyn Fetcher,
    partition: &str,
    url: &str,
) -> Result<Vec<u8>, CycleError> {
    let result = match fetcher.fetch(url).await {
        Ok(response) => response.into_body(url),
        Err(e) => Err(e),
    };
    result.map_err(|e| topology_error(partition, url, e))
}

fn topology_error(partition: &str, url: &str, source: impl Into<JobError>) -> CycleError {
    let error = CycleError::Topology {
        partition: partition.to_string(),
        url: url.to_string(),
        source: source.into(),
    };
    tracing::error!(partition, url, error = %error, "Topology discovery failed");
    error
}

/// Lists the zones and interface groups of every configured address
/// context, sequentially. Zone usage gauges are written to `sink` as the
/// zone listings are decoded.
///
/// # Errors
///
/// Any failed or undecodable listing aborts discovery with
/// [`CycleError::Topology`]; no partial topology is returned.
pub async fn discover(
    fetcher: &dyn Fetcher,
    target: &str,
    partitions: &[String],
    sink: &MetricSink,
) -> Result<Topology, CycleError> {
    let mut topology = Topology::default();

    for name in partitions {
        let mut partition = Partition::new(name.as_str());

        let url = zone_status_url(target, name);
        let body = fetch_listing(fetcher, name, &url).await?;
        partition.zones =
            decode_zones(name, &body, sink).map_err(|e| topology_error(name, &url, e))?;

        let url = interface_group_url(target, name);
        let body = fetch_listing(fetcher, name, &url).await?;
        partition.interface_groups =
            decode_interface_groups(&body).map_err(|e| topology_error(name, &url, e))?;

        tracing::debug!(
            partition = %name,
            zones = partition.zones.len(),
            interface_groups = partition.interface_groups.len(),
            "Address context discovered"
        );
        topology.partitions.push(partition);
    }

    Ok(topology)
}
