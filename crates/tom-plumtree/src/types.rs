use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvalidNodeId;

/// Overlay node identity — 32-byte public key.
///
/// Displayed and parsed as a lowercase hex string. The tracker itself only
/// needs equality and hashing, so any other identifier type works too.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId([u8; 32]);

impl NodeId {
    /// Create from raw public key bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw 32-byte public key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex::encode(&self.0[..6]);
        write!(f, "NodeId({hex}...)")
    }
}

impl FromStr for NodeId {
    type Err = InvalidNodeId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| InvalidNodeId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 32]> for NodeId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for NodeId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ── Peer roles ─────────────────────────────────────────────────────────

/// Push role of a remote peer in the broadcast tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerRole {
    /// Tree edge — full messages are forwarded immediately.
    Eager,
    /// Repair edge — only message ids are announced.
    Lazy,
}

impl fmt::Display for PeerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerRole::Eager => f.write_str("eager"),
            PeerRole::Lazy => f.write_str("lazy"),
        }
    }
}

/// A role transition reported by the tracker.
///
/// `previous` is `None` when the peer was not tracked before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChange<P = NodeId> {
    pub peer: P,
    pub previous: Option<PeerRole>,
    pub current: PeerRole,
}

/// Point-in-time copy of both peer sets.
///
/// Both sets are read under the same lock, so a peer never shows up in
/// both of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerSnapshot<P: Eq + Hash = NodeId> {
    pub eager: HashSet<P>,
    pub lazy: HashSet<P>,
}

impl<P: Eq + Hash> PeerSnapshot<P> {
    /// Role of `peer` at the time the snapshot was taken.
    pub fn role(&self, peer: &P) -> Option<PeerRole> {
        if self.eager.contains(peer) {
            Some(PeerRole::Eager)
        } else if self.lazy.contains(peer) {
            Some(PeerRole::Lazy)
        } else {
            None
        }
    }

    pub fn is_eager(&self, peer: &P) -> bool {
        self.eager.contains(peer)
    }

    pub fn is_lazy(&self, peer: &P) -> bool {
        self.lazy.contains(peer)
    }

    /// Total number of tracked peers.
    pub fn len(&self) -> usize {
        self.eager.len() + self.lazy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eager.is_empty() && self.lazy.is_empty()
    }
}

impl<P: Eq + Hash> Default for PeerSnapshot<P> {
    fn default() -> Self {
        Self {
            eager: HashSet::new(),
            lazy: HashSet::new(),
        }
    }
}
