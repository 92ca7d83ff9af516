//! Source/relay and sink/relay assignments and derived delivery paths.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Relay link of a source or sink: either one relay or several.
///
/// Both shapes occur in stored results. Algorithms never branch on the shape;
/// they go through [`RelayLink::iter`] or [`AssignmentSolution::source_pairs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayLink {
    /// A single relay.
    One(String),
    /// Several relays, in order.
    Many(Vec<String>),
}

impl RelayLink {
    /// Iterates the linked relays, treating a single relay as a singleton.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            RelayLink::One(id) => std::slice::from_ref(id),
            RelayLink::Many(ids) => ids,
        };
        slice.iter().map(String::as_str)
    }

    /// Number of linked relays.
    pub fn len(&self) -> usize {
        match self {
            RelayLink::One(_) => 1,
            RelayLink::Many(ids) => ids.len(),
        }
    }

    /// Returns `true` if no relay is linked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for RelayLink {
    fn from(id: String) -> Self {
        RelayLink::One(id)
    }
}

impl From<&str> for RelayLink {
    fn from(id: &str) -> Self {
        RelayLink::One(id.to_string())
    }
}

impl From<Vec<String>> for RelayLink {
    fn from(ids: Vec<String>) -> Self {
        RelayLink::Many(ids)
    }
}

/// Which relays each source feeds and which relays serve each sink.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{AssignmentSolution, RelayLink};
///
/// let mut a = AssignmentSolution::new();
/// a.link_source("M1", "W1");
/// a.link_source("M2", vec!["W1".to_string(), "W2".to_string()]);
/// a.link_sink("S1", "W2");
///
/// let pairs: Vec<(&str, &str)> = a.source_pairs().collect();
/// assert_eq!(pairs, vec![("M1", "W1"), ("M2", "W1"), ("M2", "W2")]);
/// assert_eq!(a.sink_pairs().count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentSolution {
    sources: BTreeMap<String, RelayLink>,
    sinks: BTreeMap<String, RelayLink>,
}

impl AssignmentSolution {
    /// Creates an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Links a source to one or more relays, replacing any earlier link.
    pub fn link_source(&mut self, source: impl Into<String>, relays: impl Into<RelayLink>) {
        self.sources.insert(source.into(), relays.into());
    }

    /// Links a sink to one or more relays, replacing any earlier link.
    pub fn link_sink(&mut self, sink: impl Into<String>, relays: impl Into<RelayLink>) {
        self.sinks.insert(sink.into(), relays.into());
    }

    /// Source → relay links as stored.
    pub fn source_links(&self) -> &BTreeMap<String, RelayLink> {
        &self.sources
    }

    /// Sink → relay links as stored.
    pub fn sink_links(&self) -> &BTreeMap<String, RelayLink> {
        &self.sinks
    }

    /// Flattened `(source, relay)` pairs, ordered by source then link order.
    pub fn source_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        flatten(&self.sources)
    }

    /// Flattened `(sink, relay)` pairs, ordered by sink then link order.
    pub fn sink_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        flatten(&self.sinks)
    }

    /// Relays that appear in any link, deduplicated, in first-seen order.
    pub fn used_relays(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for (_, relay) in self.source_pairs().chain(self.sink_pairs()) {
            if !seen.contains(&relay) {
                seen.push(relay);
            }
        }
        seen
    }

    /// Returns `true` if neither side has any link.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.sinks.is_empty()
    }
}

fn flatten(map: &BTreeMap<String, RelayLink>) -> impl Iterator<Item = (&str, &str)> {
    map.iter()
        .flat_map(|(key, link)| link.iter().map(move |relay| (key.as_str(), relay)))
}

/// One source → relay → sink delivery path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryPath {
    /// Origin source.
    pub source: String,
    /// Intermediate relay.
    pub relay: String,
    /// Destination sink.
    pub sink: String,
    /// L1 distance source → relay.
    pub source_to_relay: f64,
    /// L1 distance relay → sink.
    pub relay_to_sink: f64,
}

impl DeliveryPath {
    /// Total path length.
    pub fn total_distance(&self) -> f64 {
        self.source_to_relay + self.relay_to_sink
    }

    /// Node identifiers along the path.
    pub fn hops(&self) -> [&str; 3] {
        [&self.source, &self.relay, &self.sink]
    }
}
