//! Located nodes and their roles in the two-tier network.

use serde::{Deserialize, Serialize};

use crate::error::{LogisticsError, Result};

/// A location in the plane.
///
/// # Examples
///
/// ```
/// use u_logistics::models::Point;
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(3.0, 4.0);
/// assert_eq!(a.manhattan_distance(&b), 7.0);
/// assert!((a.euclidean_distance(&b) - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate.
    pub x: f64,
    /// Y-coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// L1 distance `|dx| + |dy|`, the cost metric of every optimizer.
    pub fn manhattan_distance(&self, other: &Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Straight-line distance, used only for display.
    pub fn euclidean_distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Polar angle of `self` seen from `origin`, in `(-π, π]`.
    pub fn angle_from(&self, origin: &Point) -> f64 {
        (self.y - origin.y).atan2(self.x - origin.x)
    }

    /// Returns `true` if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Position of a node in the supply chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Upstream origin (manufacturer, supplier).
    Source,
    /// Intermediate facility that may be activated (wholesaler, hub).
    Relay,
    /// Downstream demand point (store, demander).
    Sink,
}

impl NodeRole {
    /// Parses a role name, accepting the domain aliases used by data files.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_logistics::models::NodeRole;
    ///
    /// assert_eq!(NodeRole::parse("Wholesaler"), Some(NodeRole::Relay));
    /// assert_eq!(NodeRole::parse("demander"), Some(NodeRole::Sink));
    /// assert_eq!(NodeRole::parse("depot"), None);
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "source" | "manufacturer" | "supplier" => Some(NodeRole::Source),
            "relay" | "wholesaler" | "hub" => Some(NodeRole::Relay),
            "sink" | "store" | "demander" => Some(NodeRole::Sink),
            _ => None,
        }
    }
}

/// A node of the logistics network. Immutable once registered.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Node, NodeRole};
///
/// let hub = Node::new("W1", "Wholesaler 1", NodeRole::Relay, 5.0, 8.0)
///     .with_build_cost(1200.0)
///     .with_capacity(40.0);
/// assert_eq!(hub.id(), "W1");
/// assert_eq!(hub.build_cost(), 1200.0);
/// assert_eq!(hub.capacity(), Some(40.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: String,
    name: String,
    role: NodeRole,
    location: Point,
    capacity: Option<f64>,
    build_cost: Option<f64>,
    categories: Vec<String>,
}

impl Node {
    /// Creates a node without capacity, build cost, or categories.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        role: NodeRole,
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            location: Point::new(x, y),
            capacity: None,
            build_cost: None,
            categories: Vec::new(),
        }
    }

    /// Sets the capacity (demand, for sinks).
    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Sets the activation cost charged when this relay is selected.
    pub fn with_build_cost(mut self, cost: f64) -> Self {
        self.build_cost = Some(cost);
        self
    }

    /// Sets the category tags.
    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    /// Unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role in the network.
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Planar location.
    pub fn location(&self) -> Point {
        self.location
    }

    /// Capacity, if known.
    pub fn capacity(&self) -> Option<f64> {
        self.capacity
    }

    /// Activation cost; zero when not given.
    pub fn build_cost(&self) -> f64 {
        self.build_cost.unwrap_or(0.0)
    }

    /// Category tags.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// L1 distance to another node.
    pub fn distance_to(&self, other: &Node) -> f64 {
        self.location.manhattan_distance(&other.location)
    }

    /// Checks coordinates, capacity, and build cost.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(LogisticsError::InvalidParameter(
                "node identifier must not be empty".into(),
            ));
        }
        if !self.location.is_finite() {
            return Err(LogisticsError::InvalidParameter(format!(
                "node `{}` has non-finite coordinates",
                self.id
            )));
        }
        if let Some(cost) = self.build_cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(LogisticsError::InvalidParameter(format!(
                    "node `{}` has invalid build cost {cost}",
                    self.id
                )));
            }
        }
        if let Some(capacity) = self.capacity {
            if !capacity.is_finite() || capacity < 0.0 {
                return Err(LogisticsError::InvalidParameter(format!(
                    "node `{}` has invalid capacity {capacity}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Flat node record as produced by the ingestion layer.
///
/// # Examples
///
/// ```
/// use u_logistics::models::{Node, NodeRecord, NodeRole};
///
/// let record = NodeRecord {
///     id: "S1".into(),
///     name: "Store 1".into(),
///     role: "store".into(),
///     x: 8.0,
///     y: 8.0,
///     capacity: Some(3.0),
///     build_cost: None,
///     categories: vec!["fresh".into()],
/// };
/// let node = Node::try_from(record).unwrap();
/// assert_eq!(node.role(), NodeRole::Sink);
/// assert_eq!(node.capacity(), Some(3.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role name (`source`/`manufacturer`/`supplier`, `relay`/`wholesaler`/`hub`,
    /// `sink`/`store`/`demander`).
    pub role: String,
    /// X-coordinate.
    pub x: f64,
    /// Y-coordinate.
    pub y: f64,
    /// Capacity (demand, for sinks).
    #[serde(default)]
    pub capacity: Option<f64>,
    /// Activation cost.
    #[serde(default)]
    pub build_cost: Option<f64>,
    /// Category tags.
    #[serde(default)]
    pub categories: Vec<String>,
}

impl TryFrom<NodeRecord> for Node {
    type Error = LogisticsError;

    fn try_from(record: NodeRecord) -> Result<Self> {
        let role = NodeRole::parse(&record.role).ok_or_else(|| {
            LogisticsError::InvalidParameter(format!(
                "node `{}` has unknown role `{}`",
                record.id, record.role
            ))
        })?;
        let node = Node {
            id: record.id,
            name: record.name,
            role,
            location: Point::new(record.x, record.y),
            capacity: record.capacity,
            build_cost: record.build_cost,
            categories: record.categories,
        };
        node.validate()?;
        Ok(node)
    }
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        let role = match node.role {
            NodeRole::Source => "source",
            NodeRole::Relay => "relay",
            NodeRole::Sink => "sink",
        };
        NodeRecord {
            id: node.id.clone(),
            name: node.name.clone(),
            role: role.into(),
            x: node.location.x,
            y: node.location.y,
            capacity: node.capacity,
            build_cost: node.build_cost,
            categories: node.categories.clone(),
        }
    }
}
