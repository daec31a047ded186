//! Memoized layout metrics.
//!
//! Resize observers fire far more often than the inputs actually change: a
//! single reflow can report the same container width several times. The
//! [`MetricsCache`] keys derived [`LayoutMetrics`] by the exact bit patterns of
//! the width vector and both measurements, so identical reports are answered
//! from memory and any real change re-derives.
//!
//! # Eviction
//!
//! The cache holds at most `capacity` entries. When full, it is cleared
//! wholesale; grids rarely cycle through more than a handful of sizes.

use std::hash::{Hash, Hasher};

use rustc_hash::{FxHashMap, FxHasher};

use crate::metrics::{LayoutMetrics, derive_metrics};

/// Default number of memoized entries.
pub const DEFAULT_METRICS_CACHE_CAPACITY: usize = 32;

/// Key for metrics cache lookups.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MetricsCacheKey {
    /// Fingerprint of the width vector.
    pub widths_hash: u64,
    /// Number of columns.
    pub column_count: usize,
    /// Container width bits.
    pub container_bits: u64,
    /// Gap width bits.
    pub gap_bits: u64,
}

impl MetricsCacheKey {
    /// Build a key from the derivation inputs.
    #[must_use]
    pub fn new(widths: &[f64], container_width: f64, gap_width: f64) -> Self {
        let mut hasher = FxHasher::default();
        for w in widths {
            w.to_bits().hash(&mut hasher);
        }
        Self {
            widths_hash: hasher.finish(),
            column_count: widths.len(),
            container_bits: container_width.to_bits(),
            gap_bits: gap_width.to_bits(),
        }
    }
}

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizing front for [`derive_metrics`].
#[derive(Debug, Clone)]
pub struct MetricsCache {
    entries: FxHashMap<MetricsCacheKey, LayoutMetrics>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for MetricsCache {
    fn default() -> Self {
        Self::new(DEFAULT_METRICS_CACHE_CAPACITY)
    }
}

impl MetricsCache {
    /// Create a cache holding up to `capacity` entries (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Return memoized metrics for these inputs, deriving them on a miss.
    pub fn get_or_derive(
        &mut self,
        widths: &[f64],
        container_width: f64,
        gap_width: f64,
    ) -> &LayoutMetrics {
        let key = MetricsCacheKey::new(widths, container_width, gap_width);
        if self.entries.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
            if self.entries.len() >= self.capacity {
                self.entries.clear();
            }
            self.entries
                .insert(key, derive_metrics(widths, container_width, gap_width));
        }
        &self.entries[&key]
    }

    /// Drop every memoized entry.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> MetricsCacheStats {
        MetricsCacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_inputs_hit() {
        let mut cache = MetricsCache::default();
        let first = cache.get_or_derive(&[50.0, 50.0], 1000.0, 16.0).clone();
        let second = cache.get_or_derive(&[50.0, 50.0], 1000.0, 16.0).clone();
        assert_eq!(first, second);
        assert_eq!(
            cache.stats(),
            MetricsCacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn any_input_change_misses() {
        let mut cache = MetricsCache::default();
        cache.get_or_derive(&[50.0, 50.0], 1000.0, 16.0);
        cache.get_or_derive(&[60.0, 40.0], 1000.0, 16.0);
        cache.get_or_derive(&[60.0, 40.0], 900.0, 16.0);
        cache.get_or_derive(&[60.0, 40.0], 900.0, 8.0);
        assert_eq!(cache.stats().misses, 4);
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn full_cache_clears_before_insert() {
        let mut cache = MetricsCache::new(2);
        cache.get_or_derive(&[50.0, 50.0], 100.0, 0.0);
        cache.get_or_derive(&[50.0, 50.0], 200.0, 0.0);
        cache.get_or_derive(&[50.0, 50.0], 300.0, 0.0);
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn cached_metrics_match_direct_derivation() {
        let mut cache = MetricsCache::default();
        let cached = cache.get_or_derive(&[20.0, 30.0, 50.0], 1020.0, 10.0).clone();
        assert_eq!(cached, derive_metrics(&[20.0, 30.0, 50.0], 1020.0, 10.0));
    }

    #[test]
    fn invalidate_all_forces_rederive() {
        let mut cache = MetricsCache::default();
        cache.get_or_derive(&[50.0, 50.0], 1000.0, 16.0);
        cache.invalidate_all();
        cache.get_or_derive(&[50.0, 50.0], 1000.0, 16.0);
        assert_eq!(cache.stats().misses, 2);
    }
}
