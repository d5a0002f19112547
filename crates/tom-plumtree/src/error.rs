use std::fmt;

use crate::types::NodeId;

/// Role transition failures.
///
/// All variants are advisory: the requested end state already holds,
/// so callers usually log and move on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError<P: fmt::Debug = NodeId> {
    #[error("peer {0:?} already in eager peerset")]
    AlreadyEager(P),

    #[error("peer {0:?} already in lazy peerset")]
    AlreadyLazy(P),

    #[error("peer roles already initialized")]
    AlreadyInitialized,
}

impl<P: fmt::Debug> TrackerError<P> {
    /// True when the failed call left the tracker in the state the caller
    /// asked for. Every current variant is a no-op.
    pub fn is_noop(&self) -> bool {
        match self {
            TrackerError::AlreadyEager(_)
            | TrackerError::AlreadyLazy(_)
            | TrackerError::AlreadyInitialized => true,
        }
    }

    /// The peer the failed transition was about, if any.
    pub fn peer(&self) -> Option<&P> {
        match self {
            TrackerError::AlreadyEager(peer) | TrackerError::AlreadyLazy(peer) => Some(peer),
            TrackerError::AlreadyInitialized => None,
        }
    }
}

/// Invalid tracker configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("fanout must be at least 1")]
    ZeroFanout,

    #[error("invalid {var} value {value:?}: {source}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// A string that is not a 64-char hex node id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid node id: {0}")]
pub struct InvalidNodeId(pub String);
