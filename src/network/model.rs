//! The logistics network: node registry, role lists, distance cache, and the
//! current assignment with its delivery paths.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;

use super::cache::DistanceCache;
use super::kmeans::{cluster_points, KMeansConfig};
use crate::error::{LogisticsError, Result};
use crate::models::{AssignmentSolution, DeliveryPath, Node, NodeRecord, NodeRole, Point};

/// A two-tier logistics network.
///
/// Nodes are indexed in insertion order. Distances use the L1 metric and are
/// cached lazily; adding a node extends the cache and keeps every distance
/// already computed. Optimizers build filtered copies instead of mutating a
/// shared network.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Node, NodeRole};
/// use u_logistics::network::Network;
///
/// let mut net = Network::new();
/// net.add_node(Node::new("M1", "Maker", NodeRole::Source, 1.0, 8.0)).unwrap();
/// net.add_node(Node::new("W1", "Hub", NodeRole::Relay, 5.0, 8.0)).unwrap();
/// net.add_node(Node::new("S1", "Store", NodeRole::Sink, 8.0, 8.0)).unwrap();
///
/// assert_eq!(net.distance("M1", "W1").unwrap(), 4.0);
/// assert_eq!(net.distance("W1", "M1").unwrap(), 4.0);
/// assert!(net.distance("M1", "X").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<Node>,
    points: Vec<Point>,
    index: HashMap<String, usize>,
    sources: Vec<usize>,
    relays: Vec<usize>,
    sinks: Vec<usize>,
    cache: DistanceCache,
    assignment: AssignmentSolution,
    delivery_paths: BTreeMap<String, Vec<DeliveryPath>>,
}

impl Network {
    /// Creates an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a network from nodes.
    ///
    /// # Errors
    ///
    /// Fails on duplicate identifiers or invalid node data.
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Result<Self> {
        let mut network = Self::new();
        for node in nodes {
            network.insert(node)?;
        }
        Ok(network)
    }

    /// Builds a network from ingestion records.
    pub fn from_records(records: impl IntoIterator<Item = NodeRecord>) -> Result<Self> {
        let nodes = records
            .into_iter()
            .map(Node::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::from_nodes(nodes)
    }

    /// Registers a node and classifies it by role.
    ///
    /// # Errors
    ///
    /// [`LogisticsError::DuplicateNode`] if the identifier is taken;
    /// [`LogisticsError::InvalidParameter`] if the node data is invalid.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        self.insert(node)
    }

    fn insert(&mut self, node: Node) -> Result<()> {
        node.validate()?;
        if self.index.contains_key(node.id()) {
            return Err(LogisticsError::DuplicateNode(node.id().to_string()));
        }
        let idx = self.nodes.len();
        match node.role() {
            NodeRole::Source => self.sources.push(idx),
            NodeRole::Relay => self.relays.push(idx),
            NodeRole::Sink => self.sinks.push(idx),
        }
        self.index.insert(node.id().to_string(), idx);
        self.points.push(node.location());
        self.nodes.push(node);
        self.cache.grow(self.nodes.len());
        Ok(())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the network has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Looks up a node by identifier.
    pub fn node(&self, id: &str) -> Result<&Node> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    /// Node at an index.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    pub fn node_at(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// Index of a node by identifier.
    pub fn index_of(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| LogisticsError::MissingNode(id.to_string()))
    }

    /// Indices of source nodes.
    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    /// Indices of relay nodes.
    pub fn relays(&self) -> &[usize] {
        &self.relays
    }

    /// Indices of sink nodes.
    pub fn sinks(&self) -> &[usize] {
        &self.sinks
    }

    /// Identifiers of nodes with the given role, in insertion order.
    pub fn ids_with_role(&self, role: NodeRole) -> Vec<&str> {
        let indices = match role {
            NodeRole::Source => &self.sources,
            NodeRole::Relay => &self.relays,
            NodeRole::Sink => &self.sinks,
        };
        indices.iter().map(|&i| self.nodes[i].id()).collect()
    }

    /// L1 distance between two nodes, cached after the first query.
    ///
    /// # Errors
    ///
    /// [`LogisticsError::MissingNode`] if either identifier is absent.
    pub fn distance(&self, a: &str, b: &str) -> Result<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Ok(self.distance_between(i, j))
    }

    /// L1 distance between two node indices, cached after the first query.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn distance_between(&self, i: usize, j: usize) -> f64 {
        self.cache.get_or_compute(i, j, &self.points)
    }

    /// Fills every pairwise distance so the cache is read-only afterwards.
    pub fn warm_distances(&self) {
        self.cache.fill_all(&self.points);
    }

    /// The distance cache.
    pub fn distance_cache(&self) -> &DistanceCache {
        &self.cache
    }

    /// Builds a network with all sources, the selected relays, and all sinks.
    ///
    /// The copy has its own empty distance cache and no assignment.
    ///
    /// # Errors
    ///
    /// [`LogisticsError::MissingNode`] if a selected identifier is absent,
    /// [`LogisticsError::InvalidTopology`] if it does not name a relay.
    pub fn filtered_copy<S: AsRef<str>>(&self, selected_relays: &[S]) -> Result<Network> {
        let mut indices = Vec::with_capacity(selected_relays.len());
        for id in selected_relays {
            indices.push(self.index_of(id.as_ref())?);
        }
        self.filtered_by_index(&indices)
    }

    /// Index-based form of [`Network::filtered_copy`].
    pub fn filtered_by_index(&self, relay_indices: &[usize]) -> Result<Network> {
        for &r in relay_indices {
            if self.nodes[r].role() != NodeRole::Relay {
                return Err(LogisticsError::InvalidTopology(format!(
                    "`{}` is not a relay",
                    self.nodes[r].id()
                )));
            }
        }
        let selected = self
            .sources
            .iter()
            .chain(relay_indices)
            .chain(&self.sinks)
            .map(|&i| self.nodes[i].clone());
        Network::from_nodes(selected)
    }

    /// Clusters the given nodes by location.
    ///
    /// Returns the member identifiers of each cluster and the centroids.
    pub fn cluster_entities<R: Rng>(
        &self,
        ids: &[usize],
        k: usize,
        config: &KMeansConfig,
        rng: &mut R,
    ) -> Result<(Vec<Vec<usize>>, Vec<Point>)> {
        let points: Vec<Point> = ids.iter().map(|&i| self.points[i]).collect();
        let clustering = cluster_points(&points, k, config, rng)?;
        let clusters = clustering
            .clusters
            .into_iter()
            .map(|members| members.into_iter().map(|m| ids[m]).collect())
            .collect();
        Ok((clusters, clustering.centroids))
    }

    /// Current assignment.
    pub fn assignment(&self) -> &AssignmentSolution {
        &self.assignment
    }

    /// Replaces the assignment and rebuilds the delivery paths.
    ///
    /// # Errors
    ///
    /// [`LogisticsError::MissingNode`] if the assignment names an absent
    /// node; the network is left unchanged in that case.
    pub fn set_assignment(&mut self, assignment: AssignmentSolution) -> Result<()> {
        for (key, relay) in assignment.source_pairs().chain(assignment.sink_pairs()) {
            self.index_of(key)?;
            self.index_of(relay)?;
        }
        self.assignment = assignment;
        self.update_delivery_paths()
    }

    /// Sum of source→relay and relay→sink distances over the assignment.
    pub fn total_network_distance(&self) -> Result<f64> {
        let mut total = 0.0;
        for (source, relay) in self.assignment.source_pairs() {
            total += self.distance(source, relay)?;
        }
        for (sink, relay) in self.assignment.sink_pairs() {
            total += self.distance(relay, sink)?;
        }
        Ok(total)
    }

    /// Delivery paths by sink, as of the last rebuild.
    pub fn delivery_paths(&self) -> &BTreeMap<String, Vec<DeliveryPath>> {
        &self.delivery_paths
    }

    /// Rebuilds the delivery paths from the current assignment.
    ///
    /// For each (sink, relay) link the origin is the closest source feeding
    /// that relay; when no source feeds it, the first registered source is
    /// used. Idempotent.
    pub fn update_delivery_paths(&mut self) -> Result<()> {
        self.delivery_paths = super::delivery::build_paths(self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Network {
        Network::from_nodes(vec![
            Node::new("M1", "M1", NodeRole::Source, 1.0, 8.0),
            Node::new("M2", "M2", NodeRole::Source, 2.0, 9.0),
            Node::new("W1", "W1", NodeRole::Relay, 5.0, 8.0),
            Node::new("W2", "W2", NodeRole::Relay, 6.0, 9.0),
            Node::new("S1", "S1", NodeRole::Sink, 8.0, 8.0),
        ])
        .expect("valid network")
    }

    #[test]
    fn test_role_lists() {
        let net = sample();
        assert_eq!(net.sources(), &[0, 1]);
        assert_eq!(net.relays(), &[2, 3]);
        assert_eq!(net.sinks(), &[4]);
        assert_eq!(net.ids_with_role(NodeRole::Relay), vec!["W1", "W2"]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut net = sample();
        let err = net
            .add_node(Node::new("W1", "again", NodeRole::Sink, 0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, LogisticsError::DuplicateNode("W1".into()));
        assert_eq!(net.len(), 5);
        assert_eq!(net.sinks().len(), 1);
    }

    #[test]
    fn test_distance_symmetric_and_cached() {
        let net = sample();
        assert_eq!(net.distance_cache().filled(), 0);
        assert_eq!(net.distance("M1", "S1").expect("present"), 7.0);
        assert_eq!(net.distance("S1", "M1").expect("present"), 7.0);
        assert_eq!(net.distance("W2", "W2").expect("present"), 0.0);
        assert_eq!(net.distance_cache().filled(), 2);
    }

    #[test]
    fn test_add_node_keeps_cached_distances() {
        let mut net = Network::new();
        net.add_node(Node::new("M1", "M1", NodeRole::Source, 1.0, 8.0))
            .expect("new id");
        net.add_node(Node::new("W1", "W1", NodeRole::Relay, 4.0, 8.0))
            .expect("new id");
        assert_eq!(net.distance("M1", "W1").expect("present"), 3.0);

        net.add_node(Node::new("S1", "S1", NodeRole::Sink, 8.0, 8.0))
            .expect("new id");
        assert_eq!(net.distance_cache().size(), 3);
        assert_eq!(net.distance_cache().get(0, 1), Some(3.0));
        assert_eq!(net.distance_cache().filled(), 2);
        assert_eq!(net.distance("W1", "S1").expect("present"), 4.0);
    }

    #[test]
    fn test_missing_node() {
        let net = sample();
        assert_eq!(
            net.distance("M1", "nope"),
            Err(LogisticsError::MissingNode("nope".into()))
        );
    }

    #[test]
    fn test_warm_distances() {
        let net = sample();
        net.warm_distances();
        assert_eq!(net.distance_cache().filled(), 5 * 4);
    }

    #[test]
    fn test_filtered_copy() {
        let net = sample();
        let copy = net.filtered_copy(&["W2"]).expect("valid subset");
        assert_eq!(copy.len(), 4);
        assert_eq!(copy.ids_with_role(NodeRole::Relay), vec!["W2"]);
        assert_eq!(copy.ids_with_role(NodeRole::Source), vec!["M1", "M2"]);
        assert!(copy.assignment().is_empty());

        assert!(matches!(
            net.filtered_copy(&["S1"]),
            Err(LogisticsError::InvalidTopology(_))
        ));
        assert!(matches!(
            net.filtered_copy(&["W9"]),
            Err(LogisticsError::MissingNode(_))
        ));
    }

    #[test]
    fn test_total_network_distance_normalizes_shapes() {
        let mut net = sample();
        let mut a = AssignmentSolution::new();
        a.link_source("M1", "W1");
        a.link_source("M2", vec!["W1".to_string(), "W2".to_string()]);
        a.link_sink("S1", "W2");
        net.set_assignment(a).expect("valid assignment");
        // M1-W1 4 + M2-W1 4 + M2-W2 4 + W2-S1 3
        assert!((net.total_network_distance().expect("ok") - 15.0).abs() < 1e-10);
    }

    #[test]
    fn test_set_assignment_rejects_unknown() {
        let mut net = sample();
        let mut a = AssignmentSolution::new();
        a.link_sink("S1", "W7");
        assert_eq!(
            net.set_assignment(a),
            Err(LogisticsError::MissingNode("W7".into()))
        );
        assert!(net.assignment().is_empty());
    }

    #[test]
    fn test_cluster_entities_returns_node_indices() {
        let net = sample();
        let mut rng = u_numflow::random::create_rng(11);
        let (clusters, centroids) = net
            .cluster_entities(net.sources(), 1, &KMeansConfig::default(), &mut rng)
            .expect("valid");
        assert_eq!(clusters, vec![vec![0, 1]]);
        assert!((centroids[0].x - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_from_records() {
        let records = vec![NodeRecord {
            id: "H1".into(),
            name: "Hub".into(),
            role: "hub".into(),
            x: 5.0,
            y: 5.0,
            capacity: None,
            build_cost: Some(100.0),
            categories: vec![],
        }];
        let net = Network::from_records(records).expect("valid");
        assert_eq!(net.relays(), &[0]);
        assert_eq!(net.node("H1").expect("present").build_cost(), 100.0);
    }
}
