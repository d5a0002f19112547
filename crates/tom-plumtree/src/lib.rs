//! ToM PlumTree peer roles.
//!
//! Tracks which neighbors of an epidemic broadcast tree are eager push
//! targets (full messages forwarded at once) and which are lazy (message
//! ids announced only). The dissemination engine drives it with GRAFT,
//! PRUNE and neighbor up/down events; peer sampling plugs in through the
//! [`Sampler`] trait.
//!
//! ```rust
//! use tom_plumtree::{PeerRole, PeerRoleTracker, StaticSampler};
//!
//! let tracker = PeerRoleTracker::new("me", StaticSampler::new(vec!["a", "b"]));
//! tracker.initialize().unwrap();
//!
//! tracker.on_prune("b").unwrap();
//! assert_eq!(tracker.role(&"b"), Some(PeerRole::Lazy));
//! assert!(tracker.on_prune("b").unwrap_err().is_noop());
//! ```

pub mod config;
pub mod error;
pub mod sampler;
pub mod tracker;
pub mod types;

pub use config::{TrackerConfig, DEFAULT_FANOUT, FANOUT_ENV};
pub use error::{ConfigError, InvalidNodeId, TrackerError};
pub use sampler::{Sampler, StaticSampler};
pub use tracker::PeerRoleTracker;
pub use types::{NodeId, PeerRole, PeerSnapshot, RoleChange};
