use std::sync::Arc;

use gw_core::{Aggregation, Direction, HeuristicConfig, SearchConfig};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

use crate::testkit::{exhaustive, ScriptBuilder, ScriptTree};
use crate::{Heuristic, MemoCache, ParallelSearch, SequentialSearch, ValueCache};

use Direction::{Down, Left, Right, Up};

fn core() -> Heuristic {
    Heuristic::new(HeuristicConfig::core_terms_only())
}

fn pool() -> rayon::ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
}

/// Two full plies below the root with no shared nodes; node 0 is the root.
fn branching_tree() -> Arc<ScriptTree> {
    let mut b = ScriptBuilder::new();
    let root = b.node(Up, 0);
    let mut next_score = 0;
    let mut score = move || {
        next_score = (next_score + 37) % 101;
        next_score
    };
    for a in [Left, Up, Right] {
        let kids = [b.node(a, score()), b.node(a, score())];
        b.entry(root, &[a], &kids);
        for &k in &kids {
            for d in [Left, Down] {
                let leaves = [b.node(d, score()), b.node(d, score()), b.node(d, score())];
                b.entry(k, &[d], &leaves);
            }
        }
    }
    // One dead child and one dead leaf.
    b.dead(1).dead(5);
    b.build()
}

fn sequential_value(tree: &Arc<ScriptTree>, cfg: &SearchConfig) -> f32 {
    let h = core();
    let cache = MemoCache::new();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let s = tree.state(0);
    SequentialSearch::new(cfg, &h, &cache, &mut rng).search(&s, 0, &s)
}

fn parallel_value(tree: &Arc<ScriptTree>, cfg: &SearchConfig, cache: &MemoCache) -> (f32, u64) {
    let h = core();
    let s = tree.state(0);
    let engine = ParallelSearch::new(cfg, &h, cache);
    let v = pool().install(|| engine.search(&s, 0, &s));
    (v, engine.stats().expansions)
}

#[test]
fn agrees_with_sequential_without_sampling_or_pruning() {
    for aggregation in [Aggregation::Mean, Aggregation::Min] {
        let cfg = SearchConfig {
            aggregation,
            ..exhaustive(2)
        };
        let seq = sequential_value(&branching_tree(), &cfg);
        let (par, _) = parallel_value(&branching_tree(), &cfg, &MemoCache::new());
        assert_eq!(seq, par, "{aggregation:?}");
    }
}

#[test]
fn root_is_cached_and_warm_search_expands_nothing() {
    let tree = branching_tree();
    let cfg = exhaustive(2);
    let cache = MemoCache::new();

    let (v1, cold_expansions) = parallel_value(&tree, &cfg, &cache);
    assert_eq!(cold_expansions, 1 + 5);
    assert_eq!(cache.get(tree.key(0)), Some(v1));
    // Dead nodes are never written.
    assert!(!cache.contains(tree.key(1)));

    let (v2, warm_expansions) = parallel_value(&tree, &cfg, &cache);
    assert_eq!(v1, v2);
    assert_eq!(warm_expansions, 0);
    assert_eq!(tree.expansions(0), 1);
}

#[test]
fn empty_outcome_set_falls_back_to_parent_heuristic() {
    let mut b = ScriptBuilder::new();
    let root = b.node(Left, 35);
    b.entry(root, &[Left], &[]);
    let tree = b.build();

    let cfg = exhaustive(2);
    let h = core();
    let cache = MemoCache::new();
    let engine = ParallelSearch::new(&cfg, &h, &cache);
    let s = tree.state(root);

    assert_eq!(pool().install(|| engine.search(&s, 0, &s)), 15.0);
    assert_eq!(engine.stats().empty_fallbacks, 1);
}

#[test]
fn transposition_resolves_to_same_value_as_sequential() {
    let mut b = ScriptBuilder::new();
    let root = b.node(Up, 0);
    let a = b.node(Left, 5);
    let c = b.node(Up, 9);
    let shared = b.node(Left, 0);
    let x = b.node(Left, 70);
    let y = b.node(Left, 10);
    b.entry(root, &[Left], &[a])
        .entry(root, &[Up], &[c])
        .entry(a, &[Left], &[shared])
        .entry(c, &[Left], &[shared])
        .entry(shared, &[Left], &[x, y]);
    let tree = b.build();

    let cfg = exhaustive(3);
    let seq = sequential_value(&tree, &cfg);
    assert_eq!(tree.expansions(shared), 1);

    let (par, _) = parallel_value(&tree, &cfg, &MemoCache::new());
    assert_eq!(seq, par);
    assert_eq!(seq, 20.0);
    // At-least-once: a race may compute the shared node twice, never more.
    assert!(tree.expansions(shared) <= 1 + 2);
}

#[test]
fn horizon_states_are_evaluated_but_not_cached() {
    let mut b = ScriptBuilder::new();
    let root = b.node(Up, 0);
    let a = b.node(Left, 10);
    let leaf = b.node(Left, 40);
    b.entry(root, &[Left], &[a]).entry(a, &[Left], &[leaf]);
    let tree = b.build();

    let cfg = exhaustive(2);
    let h = core();
    let cache = MemoCache::new();
    let engine = ParallelSearch::new(&cfg, &h, &cache);
    let s = tree.state(root);

    assert_eq!(pool().install(|| engine.search(&s, 0, &s)), 20.0);
    assert_eq!(cache.get(tree.key(root)), Some(20.0));
    assert_eq!(cache.get(tree.key(a)), Some(20.0));
    assert!(!cache.contains(tree.key(leaf)));
    assert_eq!(cache.len(), 2);
    assert_eq!(engine.stats().cache_writes, 2);
}
