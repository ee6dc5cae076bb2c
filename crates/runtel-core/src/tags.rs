// Copyright 2026 Runtel Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use dashmap::DashMap;

/// Concurrent memoization of precomputed label sets.
///
/// High-frequency statistics (contention, GC events) recur with a small
/// number of distinct label combinations; caching the computed label value
/// under a composite key derived from the statistic's discrete fields avoids
/// repeated allocation on the emission hot path.
///
/// Get-or-add semantics: under a concurrent race the compute closure may run
/// more than once, but all callers observe the same final cached value for a
/// given key. Entries are never evicted — cardinality is bounded by the
/// closed enumerations the keys are derived from.
pub struct TagCache<T> {
    map: DashMap<String, T>,
}

impl<T: Clone> TagCache<T> {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
        }
    }

    /// Returns the cached value for `key`, computing and storing it on first
    /// miss.
    pub fn get_or_create(&self, key: &str, compute: impl FnOnce() -> T) -> T {
        if let Some(value) = self.map.get(key) {
            return value.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(compute)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<T: Clone> Default for TagCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_compute_runs_once_under_sequential_access() {
        let cache: TagCache<Arc<Vec<String>>> = TagCache::new();
        let calls = AtomicUsize::new(0);

        let first = cache.get_or_create("gc_gen:2", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Arc::new(vec!["gc_gen:2".to_string()])
        });
        let second = cache.get_or_create("gc_gen:2", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Arc::new(vec!["never".to_string()])
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_callers_observe_one_value() {
        let cache: Arc<TagCache<Arc<Vec<String>>>> = Arc::new(TagCache::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.get_or_create("contention_type:0", || {
                        Arc::new(vec!["contention_type:0".to_string()])
                    })
                })
            })
            .collect();

        let values: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let canonical = cache.get_or_create("contention_type:0", || unreachable!());
        for value in values {
            assert!(Arc::ptr_eq(&value, &canonical));
        }
        assert_eq!(cache.len(), 1);
    }
}
