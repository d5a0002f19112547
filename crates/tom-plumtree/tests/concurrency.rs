//! Concurrent GRAFT/PRUNE from many tasks against one shared tracker.

use std::collections::HashSet;
use std::sync::Arc;

use tom_plumtree::{NodeId, PeerRoleTracker, StaticSampler, TrackerConfig, TrackerError};

fn node_id(seed: u8) -> NodeId {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed as u64);
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    NodeId::from_bytes(bytes)
}

const PEERS: usize = 8;
const WRITERS: usize = 4;
const ROUNDS: usize = 2_000;

/// Readers never see a peer in both sets, nor a known peer in neither.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn transitions_are_atomic_for_readers() {
    let peers: Vec<NodeId> = (1..=PEERS as u8).map(node_id).collect();
    let tracker = Arc::new(
        PeerRoleTracker::with_config(
            node_id(0),
            StaticSampler::new(peers.clone()),
            TrackerConfig::new().fanout(PEERS),
        )
        .unwrap(),
    );
    assert_eq!(tracker.initialize().unwrap().len(), PEERS);

    let mut writers = Vec::new();
    for w in 0..WRITERS {
        let tracker = Arc::clone(&tracker);
        let peers = peers.clone();
        writers.push(tokio::spawn(async move {
            for i in 0..ROUNDS {
                let peer = peers[(i * 7 + w) % PEERS];
                // Lost races surface as AlreadyEager/AlreadyLazy, which are fine.
                let result = if (i + w) % 2 == 0 {
                    tracker.on_graft(peer)
                } else {
                    tracker.on_prune(peer)
                };
                if let Err(e) = result {
                    assert!(e.is_noop());
                }
                if i % 64 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }));
    }

    let reader = {
        let tracker = Arc::clone(&tracker);
        tokio::spawn(async move {
            for i in 0..ROUNDS {
                let snap = tracker.snapshot();
                assert!(snap.eager.is_disjoint(&snap.lazy), "peer in both sets");
                assert_eq!(snap.len(), PEERS, "peer missing from both sets");
                if i % 64 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        })
    };

    for writer in writers {
        writer.await.unwrap();
    }
    reader.await.unwrap();

    let eager = tracker.eager_peers();
    let lazy = tracker.lazy_peers();
    assert!(eager.is_disjoint(&lazy));
    let all: HashSet<NodeId> = eager.union(&lazy).copied().collect();
    assert_eq!(all, peers.into_iter().collect());
}

/// Racing initializers seed the eager set exactly once.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_initialize_runs_once() {
    let peers: Vec<NodeId> = (1..=3).map(node_id).collect();
    let tracker = Arc::new(PeerRoleTracker::new(
        node_id(0),
        StaticSampler::new(peers.clone()),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.initialize() })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert_eq!(e, TrackerError::AlreadyInitialized),
        }
    }
    assert_eq!(ok, 1);
    assert!(tracker.is_initialized());
}
