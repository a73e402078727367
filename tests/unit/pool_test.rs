//! Tests for the growable pool and pooled list

use prometheus_tickbus::config::PoolConfig;
use prometheus_tickbus::core::{Pool, PooledList, RuntimeError};

#[test]
fn test_pool_accounting() {
    let mut pool: Pool<String> = Pool::new(&PoolConfig::fixed(2));
    assert_eq!(pool.available(), 2);

    let a = pool.try_acquire_with(|| "a".to_string()).unwrap();
    assert_eq!(pool.live(), 1);
    assert_eq!(pool.available(), 1);
    assert!(!pool.is_full());

    let b = pool.try_acquire().unwrap();
    assert!(pool.is_full());
    assert_eq!(
        pool.try_acquire().unwrap_err(),
        RuntimeError::PoolExhausted { capacity: 2 }
    );

    pool.release(a);
    pool.release(b);
    assert_eq!(pool.idle(), 2);
    assert_eq!(pool.try_reuse().as_deref(), Some(""));
}

#[test]
fn test_resizable_pool_never_fails() {
    let mut pool: Pool<Vec<u32>> = Pool::with_capacity(1);
    let held: Vec<Vec<u32>> = (0..100)
        .map(|i| {
            let mut v = pool.try_acquire().unwrap();
            v.push(i);
            v
        })
        .collect();
    assert!(held.iter().enumerate().all(|(i, v)| v == &[i as u32]));
    assert!(pool.capacity() >= 100);
}

#[test]
fn test_list_handles_survive_unrelated_removals() {
    let mut list: PooledList<&'static str, u32> = PooledList::with_capacity(2);
    let a = list.add_last("a", 1).unwrap();
    let b = list.add_last("b", 2).unwrap();
    let c = list.add_first("c", 3).unwrap();

    assert_eq!(list.remove(&"a"), Some(1));
    assert_eq!(list.value(b), Some(&2));
    assert_eq!(list.value(c), Some(&3));
    assert_eq!(list.value(a), None);
    assert_eq!(list.next(c), Some(b));
    assert_eq!(list.prev(b), Some(c));
    assert_eq!(list.add_last("b", 9), Err(RuntimeError::DuplicateEntry));
    assert_eq!(list.iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(), vec![("c", 3), ("b", 2)]);
}
