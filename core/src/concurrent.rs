//! Sharded map used as scoring scratch space by parallel ranking.
//!
//! Keys are routed to one of a fixed number of buckets by `key mod N`; each
//! bucket is an ordered map behind its own mutex. Two workers only contend
//! when their keys land in the same bucket.

use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::collections::BTreeMap;

/// Integer keys that can be routed to a bucket.
pub trait ShardKey: Ord + Copy {
    fn shard(self, bucket_count: usize) -> usize;
}

macro_rules! impl_shard_key {
    ($($t:ty),*) => {
        $(
            impl ShardKey for $t {
                #[inline]
                fn shard(self, bucket_count: usize) -> usize {
                    (self as u64 % bucket_count as u64) as usize
                }
            }
        )*
    };
}

impl_shard_key!(i32, i64, u32, u64, usize);

pub struct ConcurrentMap<K, V> {
    buckets: Vec<Mutex<BTreeMap<K, V>>>,
}

impl<K: ShardKey, V> ConcurrentMap<K, V> {
    /// A zero bucket count is treated as one.
    pub fn new(bucket_count: usize) -> Self {
        let buckets = (0..bucket_count.max(1))
            .map(|_| Mutex::new(BTreeMap::new()))
            .collect();
        Self { buckets }
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket(&self, key: K) -> &Mutex<BTreeMap<K, V>> {
        &self.buckets[key.shard(self.buckets.len())]
    }

    /// Locks the key's bucket and returns its value, inserting `V::default()`
    /// if absent. The bucket stays locked until the guard is dropped.
    pub fn access(&self, key: K) -> MappedMutexGuard<'_, V>
    where
        V: Default,
    {
        MutexGuard::map(self.bucket(key).lock(), |data| data.entry(key).or_default())
    }

    pub fn erase(&self, key: K) -> Option<V> {
        self.bucket(key).lock().remove(&key)
    }

    /// Merges every bucket, in bucket order, into one ordered map.
    pub fn into_ordinary_map(self) -> BTreeMap<K, V> {
        let mut result = BTreeMap::new();
        for bucket in self.buckets {
            result.extend(bucket.into_inner());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn concurrent_accumulation_sums() {
        let map: ConcurrentMap<i64, u64> = ConcurrentMap::new(7);
        (0..10_000i64).into_par_iter().for_each(|i| {
            *map.access(i % 100) += 1;
        });
        let result = map.into_ordinary_map();
        assert_eq!(result.len(), 100);
        assert!(result.values().all(|&v| v == 100));
        assert_eq!(result.keys().copied().collect::<Vec<_>>(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn erase_absent_is_noop() {
        let map: ConcurrentMap<i32, f64> = ConcurrentMap::new(3);
        *map.access(4) += 1.5;
        assert_eq!(map.erase(5), None);
        assert_eq!(map.erase(4), Some(1.5));
        assert!(map.into_ordinary_map().is_empty());
    }

    #[test]
    fn zero_buckets_clamped() {
        let map: ConcurrentMap<u32, i32> = ConcurrentMap::new(0);
        assert_eq!(map.bucket_count(), 1);
        *map.access(u32::MAX) -= 3;
        assert_eq!(map.into_ordinary_map()[&u32::MAX], -3);
    }

    #[test]
    fn erase_races_with_access() {
        let map: ConcurrentMap<u64, f64> = ConcurrentMap::new(16);
        (0..1000u64).into_par_iter().for_each(|i| {
            *map.access(i) += 1.0;
        });
        (0..1000u64).into_par_iter().filter(|i| i % 2 == 0).for_each(|i| {
            map.erase(i);
        });
        let result = map.into_ordinary_map();
        assert_eq!(result.len(), 500);
        assert!(result.keys().all(|k| k % 2 == 1));
    }
}
