//! Error types for network design and routing.

use thiserror::Error;

/// Errors raised by the network model, the assignment optimizers, and the
/// routing solver.
///
/// Every failure is surfaced to the caller as one of these variants; no
/// optimizer substitutes a degraded result for a failed search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogisticsError {
    /// Role counts violate a strategy precondition.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// An identifier does not name a node of the network.
    #[error("node `{0}` is not part of the network")]
    MissingNode(String),

    /// A node with the same identifier is already registered.
    #[error("node `{0}` is already registered")]
    DuplicateNode(String),

    /// No relay subset, hub count, or assignment satisfies the constraints.
    #[error("no feasible solution: {0}")]
    NoFeasibleSolution(String),

    /// The routing oracle cannot place all demand within capacity and fleet bounds.
    #[error("infeasible routing: {0}")]
    InfeasibleRouting(String),

    /// A configuration value or input datum was rejected before searching.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The cancellation flag was raised before any candidate was produced.
    #[error("optimization was cancelled")]
    Cancelled,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LogisticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let e = LogisticsError::MissingNode("W9".into());
        assert_eq!(e.to_string(), "node `W9` is not part of the network");

        let e = LogisticsError::InvalidTopology("need 3 sources".into());
        assert_eq!(e.to_string(), "invalid topology: need 3 sources");

        assert_eq!(
            LogisticsError::Cancelled.to_string(),
            "optimization was cancelled"
        );
    }
}
