/// Eager/lazy peer role tracker for the PlumTree broadcast tree.
///
/// Tracks, per remote peer, whether full messages are pushed to it (Eager)
/// or only announced (Lazy). The dissemination layer feeds it GRAFT/PRUNE
/// events and neighbor up/down events; the tracker reports transitions.
///
/// Membership is a single `peer -> role` map behind one lock, so every
/// transition is atomic: a peer is never in both sets, and never missing
/// from both while it moves. No I/O, no background task.
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::config::TrackerConfig;
use crate::error::{ConfigError, TrackerError};
use crate::sampler::Sampler;
use crate::types::{NodeId, PeerRole, PeerSnapshot, RoleChange};

/// Shared eager/lazy membership for one overlay node.
///
/// Share it across connection handlers with `Arc<PeerRoleTracker<..>>`.
pub struct PeerRoleTracker<S, P = NodeId> {
    local_id: P,
    sampler: S,
    config: TrackerConfig,
    initialized: AtomicBool,
    peers: RwLock<HashMap<P, PeerRole>>,
}

impl<S, P> PeerRoleTracker<S, P>
where
    S: Sampler<P>,
    P: Clone + Eq + Hash + fmt::Debug,
{
    /// Create a tracker with empty peer sets and the default config.
    pub fn new(local_id: P, sampler: S) -> Self {
        Self {
            local_id,
            sampler,
            config: TrackerConfig::new(),
            initialized: AtomicBool::new(false),
            peers: RwLock::new(HashMap::new()),
        }
    }

    /// Create a tracker with an explicit config.
    pub fn with_config(
        local_id: P,
        sampler: S,
        config: TrackerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(local_id, sampler)
        })
    }

    /// Seed the eager set with up to `fanout` peers from the sampler.
    ///
    /// One-shot: later calls fail with `AlreadyInitialized`. Candidates that
    /// are already tracked keep their role, and the local id is skipped.
    /// Returns the peers actually added to the eager set.
    pub fn initialize(&self) -> Result<Vec<P>, TrackerError<P>> {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TrackerError::AlreadyInitialized);
        }

        let fanout = self.config.fanout;
        tracing::debug!(local = ?self.local_id, fanout, "initializing peer roles");

        let candidates = self.sampler.find_peers(fanout);
        let mut seeded = Vec::with_capacity(candidates.len().min(fanout));

        let mut peers = self.peers.write();
        for peer in candidates.into_iter().take(fanout) {
            if peer == self.local_id {
                tracing::trace!("sampler returned local id, skipping");
                continue;
            }
            match peers.entry(peer) {
                Entry::Vacant(slot) => {
                    tracing::debug!(peer = ?slot.key(), "initializing with eager peer");
                    seeded.push(slot.key().clone());
                    slot.insert(PeerRole::Eager);
                }
                Entry::Occupied(slot) => {
                    tracing::debug!(
                        peer = ?slot.key(),
                        role = %slot.get(),
                        "candidate already tracked, keeping role"
                    );
                }
            }
        }

        Ok(seeded)
    }

    /// GRAFT: move `peer` to the eager set, out of the lazy set if present.
    ///
    /// Fails with `AlreadyEager` (state unchanged) if it is already eager.
    pub fn on_graft(&self, peer: P) -> Result<RoleChange<P>, TrackerError<P>> {
        self.move_to(peer, PeerRole::Eager)
    }

    /// PRUNE: move `peer` to the lazy set, out of the eager set if present.
    ///
    /// Fails with `AlreadyLazy` (state unchanged) if it is already lazy.
    pub fn on_prune(&self, peer: P) -> Result<RoleChange<P>, TrackerError<P>> {
        self.move_to(peer, PeerRole::Lazy)
    }

    /// Drop `peer` from whichever set holds it. Returns its former role.
    pub fn forget(&self, peer: &P) -> Option<PeerRole> {
        let previous = self.peers.write().remove(peer);
        if let Some(role) = previous {
            tracing::debug!(peer = ?peer, %role, "forgot peer");
        }
        previous
    }

    /// Disconnect path: forget `peer` and tell the sampler it went down.
    pub fn neighbor_down(&self, peer: &P) -> Option<PeerRole> {
        if *peer == self.local_id {
            return None;
        }
        let previous = self.forget(peer);
        self.sampler.neighbor_down(peer);
        previous
    }

    /// Reconnect path: tell the sampler `peer` is up and track it as eager
    /// if it was unknown. Known peers keep their role.
    pub fn neighbor_up(&self, peer: P) -> Option<RoleChange<P>> {
        if peer == self.local_id {
            return None;
        }

        let change = match self.peers.write().entry(peer.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(PeerRole::Eager);
                Some(RoleChange {
                    peer: peer.clone(),
                    previous: None,
                    current: PeerRole::Eager,
                })
            }
            Entry::Occupied(_) => None,
        };
        if change.is_some() {
            tracing::debug!(peer = ?peer, "neighbor up, added as eager peer");
        }

        self.sampler.neighbor_up(&peer);
        change
    }

    // ── Queries ────────────────────────────────────────────────────────
    //
    // Reads are recursive so they can nest inside `for_each_*` callbacks
    // without queueing behind a waiting writer.

    /// Copy of the eager set.
    pub fn eager_peers(&self) -> HashSet<P> {
        self.peers_with(PeerRole::Eager)
    }

    /// Copy of the lazy set.
    pub fn lazy_peers(&self) -> HashSet<P> {
        self.peers_with(PeerRole::Lazy)
    }

    /// Both sets, copied under a single read lock.
    pub fn snapshot(&self) -> PeerSnapshot<P> {
        let mut snapshot = PeerSnapshot::default();
        for (peer, role) in self.peers.read_recursive().iter() {
            match role {
                PeerRole::Eager => snapshot.eager.insert(peer.clone()),
                PeerRole::Lazy => snapshot.lazy.insert(peer.clone()),
            };
        }
        snapshot
    }

    /// Current role of `peer`, `None` if untracked.
    pub fn role(&self, peer: &P) -> Option<PeerRole> {
        self.peers.read_recursive().get(peer).copied()
    }

    pub fn is_eager(&self, peer: &P) -> bool {
        self.role(peer) == Some(PeerRole::Eager)
    }

    pub fn is_lazy(&self, peer: &P) -> bool {
        self.role(peer) == Some(PeerRole::Lazy)
    }

    pub fn contains(&self, peer: &P) -> bool {
        self.peers.read_recursive().contains_key(peer)
    }

    /// Number of tracked peers (eager + lazy).
    pub fn len(&self) -> usize {
        self.peers.read_recursive().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read_recursive().is_empty()
    }

    pub fn eager_len(&self) -> usize {
        self.count(PeerRole::Eager)
    }

    pub fn lazy_len(&self) -> usize {
        self.count(PeerRole::Lazy)
    }

    /// Visit every eager peer while holding the read lock.
    ///
    /// `f` may run read-only queries on the tracker. Calling a mutating
    /// method from `f` deadlocks.
    pub fn for_each_eager(&self, f: impl FnMut(&P)) {
        self.for_each_with(PeerRole::Eager, f)
    }

    /// Visit every lazy peer while holding the read lock.
    ///
    /// `f` may run read-only queries on the tracker. Calling a mutating
    /// method from `f` deadlocks.
    pub fn for_each_lazy(&self, f: impl FnMut(&P)) {
        self.for_each_with(PeerRole::Lazy, f)
    }

    pub fn local_id(&self) -> &P {
        &self.local_id
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of peers requested from the sampler by `initialize`.
    pub fn fanout(&self) -> usize {
        self.config.fanout
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    // ── Internal ───────────────────────────────────────────────────────

    /// Single write-locked update: the peer changes role in one step.
    fn move_to(&self, peer: P, target: PeerRole) -> Result<RoleChange<P>, TrackerError<P>> {
        let previous = {
            let mut peers = self.peers.write();
            let previous = peers.get(&peer).copied();
            if previous != Some(target) {
                peers.insert(peer.clone(), target);
            }
            previous
        };

        if previous == Some(target) {
            tracing::debug!(peer = ?peer, role = %target, "peer already in target peerset");
            return Err(match target {
                PeerRole::Eager => TrackerError::AlreadyEager(peer),
                PeerRole::Lazy => TrackerError::AlreadyLazy(peer),
            });
        }

        tracing::debug!(
            local = ?self.local_id,
            peer = ?peer,
            from = ?previous,
            to = %target,
            "moved peer to {target} peerset"
        );
        Ok(RoleChange {
            peer,
            previous,
            current: target,
        })
    }

    fn peers_with(&self, role: PeerRole) -> HashSet<P> {
        self.peers
            .read_recursive()
            .iter()
            .filter(|(_, r)| **r == role)
            .map(|(peer, _)| peer.clone())
            .collect()
    }

    fn count(&self, role: PeerRole) -> usize {
        self.peers.read_recursive().values().filter(|r| **r == role).count()
    }

    fn for_each_with(&self, role: PeerRole, mut f: impl FnMut(&P)) {
        for (peer, _) in self.peers.read_recursive().iter().filter(|(_, r)| **r == role) {
            f(peer);
        }
    }
}

impl<S, P: fmt::Debug> fmt::Debug for PeerRoleTracker<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peers = self.peers.read_recursive();
        let eager = peers.values().filter(|r| **r == PeerRole::Eager).count();
        f.debug_struct("PeerRoleTracker")
            .field("local_id", &self.local_id)
            .field("fanout", &self.config.fanout)
            .field("eager", &eager)
            .field("lazy", &(peers.len() - eager))
            .finish_non_exhaustive()
    }
}
