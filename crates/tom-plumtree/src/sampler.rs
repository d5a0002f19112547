/// Peer sampling interface consumed by the tracker.
///
/// The sampling layer (HyParView active view, bootstrap list, DHT walk...)
/// picks candidate peers and owns liveness. The tracker only asks it for
/// initial eager peers and tells it about neighbor up/down events.
use std::sync::Arc;

use parking_lot::Mutex;

use crate::types::NodeId;

/// Candidate source and liveness sink for a [`PeerRoleTracker`](crate::PeerRoleTracker).
///
/// Called without any tracker lock held, so implementations may call back
/// into the tracker.
pub trait Sampler<P = NodeId> {
    /// Up to `count` candidate peers. Returning fewer is fine.
    fn find_peers(&self, count: usize) -> Vec<P>;

    /// A neighbor disconnected.
    fn neighbor_down(&self, peer: &P);

    /// A neighbor connected.
    fn neighbor_up(&self, peer: &P);
}

impl<P, S: Sampler<P> + ?Sized> Sampler<P> for Arc<S> {
    fn find_peers(&self, count: usize) -> Vec<P> {
        (**self).find_peers(count)
    }

    fn neighbor_down(&self, peer: &P) {
        (**self).neighbor_down(peer)
    }

    fn neighbor_up(&self, peer: &P) {
        (**self).neighbor_up(peer)
    }
}

impl<P, S: Sampler<P> + ?Sized> Sampler<P> for &S {
    fn find_peers(&self, count: usize) -> Vec<P> {
        (**self).find_peers(count)
    }

    fn neighbor_down(&self, peer: &P) {
        (**self).neighbor_down(peer)
    }

    fn neighbor_up(&self, peer: &P) {
        (**self).neighbor_up(peer)
    }
}

// ── Static sampler ─────────────────────────────────────────────────────

/// Sampler over a fixed candidate list (e.g. configured bootstrap peers).
///
/// Records every neighbor up/down notification it receives.
#[derive(Debug, Default)]
pub struct StaticSampler<P = NodeId> {
    candidates: Vec<P>,
    up: Mutex<Vec<P>>,
    down: Mutex<Vec<P>>,
}

impl<P: Clone> StaticSampler<P> {
    pub fn new(candidates: Vec<P>) -> Self {
        Self {
            candidates,
            up: Mutex::new(Vec::new()),
            down: Mutex::new(Vec::new()),
        }
    }

    /// The configured candidates, in order.
    pub fn candidates(&self) -> &[P] {
        &self.candidates
    }

    /// Peers reported up so far, oldest first.
    pub fn neighbors_up(&self) -> Vec<P> {
        self.up.lock().clone()
    }

    /// Peers reported down so far, oldest first.
    pub fn neighbors_down(&self) -> Vec<P> {
        self.down.lock().clone()
    }
}

impl<P: Clone> Sampler<P> for StaticSampler<P> {
    fn find_peers(&self, count: usize) -> Vec<P> {
        self.candidates.iter().take(count).cloned().collect()
    }

    fn neighbor_down(&self, peer: &P) {
        self.down.lock().push(peer.clone());
    }

    fn neighbor_up(&self, peer: &P) {
        self.up.lock().push(peer.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_peers_respects_count() {
        let sampler = StaticSampler::new(vec![1u8, 2, 3, 4]);
        assert_eq!(sampler.find_peers(2), vec![1, 2]);
        assert_eq!(sampler.find_peers(10), vec![1, 2, 3, 4]);
        assert!(sampler.find_peers(0).is_empty());
    }

    #[test]
    fn records_notifications_in_order() {
        let sampler = StaticSampler::new(Vec::<u8>::new());
        sampler.neighbor_up(&5);
        sampler.neighbor_down(&5);
        sampler.neighbor_up(&9);

        assert_eq!(sampler.neighbors_up(), vec![5, 9]);
        assert_eq!(sampler.neighbors_down(), vec![5]);
    }

    #[test]
    fn shared_sampler_delegates() {
        let sampler = Arc::new(StaticSampler::new(vec!["a", "b"]));
        let shared = Arc::clone(&sampler);
        assert_eq!(Sampler::find_peers(&shared, 1), vec!["a"]);

        Sampler::neighbor_down(&shared, &"b");
        assert_eq!(sampler.neighbors_down(), vec!["b"]);
    }
}
