//! # Watchpoint Pool Tests
//!
//! Slot allocation, last-freed-first reuse, capacity and change detection.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rvdb_core::common::WatchError;
use rvdb_core::common::constants::WATCH_POOL_SIZE;
use rvdb_core::sdb::{WatchChange, WatchPool};

use crate::common::harness::ScratchContext;

fn ids(pool: &WatchPool) -> Vec<usize> {
    pool.list().into_iter().map(|w| w.id).collect()
}

#[test]
fn default_pool_has_fixed_capacity() {
    let pool = WatchPool::default();
    assert_eq!(pool.capacity(), WATCH_POOL_SIZE);
    assert_eq!(pool.free_len(), WATCH_POOL_SIZE);
    assert!(pool.is_empty());
}

#[test]
fn id_is_stable_while_active() {
    let ctx = ScratchContext::new();
    let mut pool = WatchPool::default();
    let a = pool.add("1", &ctx).unwrap();
    let b = pool.add("2", &ctx).unwrap();
    let c = pool.add("3", &ctx).unwrap();

    pool.remove(b).unwrap();
    let listed = pool.list();
    assert_eq!(ids(&pool), vec![c, a]);
    assert_eq!(listed[0].expr, "3");
    assert_eq!(listed[1].expr, "1");
}

#[test]
fn freed_ids_are_reused_last_freed_first() {
    let ctx = ScratchContext::new();
    let mut pool = WatchPool::default();
    let first: Vec<usize> = (0..4).map(|i| pool.add(&i.to_string(), &ctx).unwrap()).collect();
    assert_eq!(first, vec![0, 1, 2, 3]);

    pool.remove(1).unwrap();
    pool.remove(3).unwrap();

    assert_eq!(pool.add("10", &ctx), Ok(3));
    assert_eq!(pool.add("11", &ctx), Ok(1));
    assert_eq!(pool.add("12", &ctx), Ok(4));
}

#[test]
fn thirty_third_watch_is_rejected() {
    let ctx = ScratchContext::new();
    let mut pool = WatchPool::default();
    for i in 0..WATCH_POOL_SIZE {
        let _ = pool.add(&i.to_string(), &ctx).unwrap();
    }
    assert_eq!(pool.free_len(), 0);
    assert_eq!(
        pool.add("99", &ctx),
        Err(WatchError::PoolFull(WATCH_POOL_SIZE))
    );
    assert_eq!(pool.len(), WATCH_POOL_SIZE);

    pool.remove(7).unwrap();
    assert_eq!(pool.add("99", &ctx), Ok(7));
}

#[test]
fn removing_unknown_id_fails() {
    let mut pool = WatchPool::default();
    assert_eq!(pool.remove(5), Err(WatchError::NotFound(5)));

    let _ = pool.add("1", &ScratchContext::new()).unwrap();
    pool.remove(0).unwrap();
    assert_eq!(pool.remove(0), Err(WatchError::NotFound(0)));
}

#[test]
fn check_reports_each_change_once() {
    let mut pool = WatchPool::default();
    let id = pool.add("$a0", &ScratchContext::new().reg("a0", 1)).unwrap();

    let ctx = ScratchContext::new().reg("a0", 2);
    assert_eq!(
        pool.check(&ctx),
        vec![WatchChange {
            id,
            expr: "$a0".into(),
            old: 1,
            new: 2,
        }]
    );
    assert!(pool.check(&ctx).is_empty());
    assert_eq!(pool.list()[0].value, 2);
}

#[test]
fn check_visits_most_recent_first() {
    let ctx = ScratchContext::new().reg("a0", 0).reg("a1", 0);
    let mut pool = WatchPool::default();
    let a0 = pool.add("$a0", &ctx).unwrap();
    let a1 = pool.add("$a1 + 1", &ctx).unwrap();

    let after = ScratchContext::new().reg("a0", 5).reg("a1", 5);
    let changed: Vec<usize> = pool.check(&after).into_iter().map(|c| c.id).collect();
    assert_eq!(changed, vec![a1, a0]);
}

proptest! {
    #[test]
    fn every_slot_is_free_or_active(ops in proptest::collection::vec(any::<(bool, u8)>(), 0..200)) {
        let ctx = ScratchContext::new();
        let mut pool = WatchPool::default();
        for (add, n) in ops {
            if add {
                let _ = pool.add("1", &ctx);
            } else {
                let _ = pool.remove(usize::from(n) % WATCH_POOL_SIZE);
            }
            prop_assert_eq!(pool.free_len() + pool.len(), WATCH_POOL_SIZE);
            let mut active = ids(&pool);
            active.sort_unstable();
            active.dedup();
            prop_assert_eq!(active.len(), pool.len());
        }
    }
}
