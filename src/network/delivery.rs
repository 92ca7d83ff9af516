//! Delivery path reconstruction from the current assignment.

use std::collections::{BTreeMap, HashMap};

use super::model::Network;
use crate::error::Result;
use crate::models::DeliveryPath;

/// Builds source → relay → sink paths for every (sink, relay) link.
///
/// Returns an empty map when either side of the assignment is empty. Sinks
/// whose links produce no path are omitted.
pub(crate) fn build_paths(network: &Network) -> Result<BTreeMap<String, Vec<DeliveryPath>>> {
    let assignment = network.assignment();
    let mut paths = BTreeMap::new();
    if assignment.source_links().is_empty() || assignment.sink_links().is_empty() {
        return Ok(paths);
    }

    // relay -> feeding sources, in assignment order
    let mut feeders: HashMap<&str, Vec<&str>> = HashMap::new();
    for (source, relay) in assignment.source_pairs() {
        feeders.entry(relay).or_default().push(source);
    }
    let fallback = network
        .sources()
        .first()
        .map(|&i| network.node_at(i).id());

    for (sink, link) in assignment.sink_links() {
        let mut sink_paths = Vec::with_capacity(link.len());
        for relay in link.iter() {
            let origin = match feeders.get(relay) {
                Some(candidates) => closest(network, candidates, relay)?,
                None => fallback,
            };
            let Some(source) = origin else {
                continue;
            };
            sink_paths.push(DeliveryPath {
                source: source.to_string(),
                relay: relay.to_string(),
                sink: sink.clone(),
                source_to_relay: network.distance(source, relay)?,
                relay_to_sink: network.distance(relay, sink)?,
            });
        }
        if !sink_paths.is_empty() {
            paths.insert(sink.clone(), sink_paths);
        }
    }
    Ok(paths)
}

/// Candidate with the smallest distance to `relay`; first wins on ties.
fn closest<'a>(network: &Network, candidates: &[&'a str], relay: &str) -> Result<Option<&'a str>> {
    let mut best: Option<(&'a str, f64)> = None;
    for &source in candidates {
        let d = network.distance(source, relay)?;
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((source, d));
        }
    }
    Ok(best.map(|(source, _)| source))
}
