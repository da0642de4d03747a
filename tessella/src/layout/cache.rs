//! Measurement cache for one virtualized column.
//!
//! Every item starts at the estimated height. Measured heights are stored as
//! deltas against the estimate in a Fenwick tree, so offsets stay O(log n)
//! while measurements trickle in.

use ristill_api::{CacheSnapshot, MeasuredItem};

/// Binary indexed tree over `f32` deltas.
#[derive(Debug, Clone, Default)]
struct FenwickTree {
    tree: Vec<f32>,
}

impl FenwickTree {
    fn new(len: usize) -> Self {
        Self {
            tree: vec![0.0; len + 1],
        }
    }

    fn add(&mut self, index: usize, delta: f32) {
        let mut i = index + 1;
        while i < self.tree.len() {
            self.tree[i] += delta;
            i += i & i.wrapping_neg();
        }
    }

    /// Sum of the first `count` entries.
    fn prefix_sum(&self, count: usize) -> f32 {
        let mut i = count.min(self.tree.len().saturating_sub(1));
        let mut sum = 0.0;
        while i > 0 {
            sum += self.tree[i];
            i -= i & i.wrapping_neg();
        }
        sum
    }
}

/// Estimated and measured heights for the items of one column.
#[derive(Debug, Clone, Default)]
pub struct MeasurementCache {
    estimated_height: f32,
    spacing: f32,
    measured: Vec<Option<f32>>,
    deltas: FenwickTree,
    measured_count: usize,
}

impl MeasurementCache {
    /// Create a new cache where every item has the estimated height.
    pub fn new(item_count: usize, estimated_height: f32, spacing: f32) -> Self {
        Self {
            estimated_height: sanitize(estimated_height),
            spacing: sanitize(spacing),
            measured: vec![None; item_count],
            deltas: FenwickTree::new(item_count),
            measured_count: 0,
        }
    }

    /// Drop all measurements and resize.
    pub fn reset(&mut self, item_count: usize, estimated_height: f32) {
        *self = Self::new(item_count, estimated_height, self.spacing);
    }

    pub fn len(&self) -> usize {
        self.measured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measured.is_empty()
    }

    pub fn estimated_height(&self) -> f32 {
        self.estimated_height
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn measured_count(&self) -> usize {
        self.measured_count
    }

    pub fn is_measured(&self, index: usize) -> bool {
        matches!(self.measured.get(index), Some(Some(_)))
    }

    /// Record a real height. Returns `true` if the stored height changed.
    ///
    /// Out-of-range indices and non-finite or negative heights are ignored.
    pub fn record(&mut self, index: usize, height: f32) -> bool {
        if index >= self.measured.len() || !height.is_finite() || height < 0.0 {
            return false;
        }
        let previous = self.measured[index];
        if previous == Some(height) {
            return false;
        }

        let prev_delta = previous.map(|h| h - self.estimated_height).unwrap_or(0.0);
        let new_delta = height - self.estimated_height;
        self.deltas.add(index, new_delta - prev_delta);
        if previous.is_none() {
            self.measured_count += 1;
        }
        self.measured[index] = Some(height);
        true
    }

    /// Height of an item: measured if known, otherwise estimated.
    pub fn height_of(&self, index: usize) -> f32 {
        self.measured
            .get(index)
            .copied()
            .flatten()
            .unwrap_or(self.estimated_height)
    }

    /// Top offset of the item at `index` (spacing included for items above).
    pub fn offset_for(&self, index: usize) -> f32 {
        let clamped = index.min(self.measured.len());
        clamped as f32 * (self.estimated_height + self.spacing) + self.deltas.prefix_sum(clamped)
    }

    /// Total content height. No trailing spacing after the last item.
    pub fn total_height(&self) -> f32 {
        let n = self.measured.len();
        if n == 0 {
            return 0.0;
        }
        self.offset_for(n) - self.spacing
    }

    /// Index of the item covering `offset`. Offsets inside a gap resolve to
    /// the item below the gap; offsets past the end resolve to the last item.
    pub fn index_for_offset(&self, offset: f32) -> usize {
        let n = self.measured.len();
        if n == 0 || !(offset > 0.0) {
            return 0;
        }

        // First index whose bottom edge is past `offset`.
        let (mut lo, mut hi) = (0usize, n);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.offset_for(mid + 1) - self.spacing <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo.min(n - 1)
    }

    /// Export measurements in ascending index order.
    pub fn export(&self) -> CacheSnapshot {
        CacheSnapshot {
            estimated_height: self.estimated_height,
            measured: self
                .measured
                .iter()
                .enumerate()
                .filter_map(|(index, height)| height.map(|height| MeasuredItem { index, height }))
                .collect(),
        }
    }

    /// Apply measurements from a snapshot. Returns how many were applied;
    /// entries outside the current item range are skipped.
    ///
    /// The estimate is derived from the column width, so a snapshot with a
    /// different estimate holds heights for another width and is skipped
    /// entirely.
    pub fn import(&mut self, snapshot: &CacheSnapshot) -> usize {
        if snapshot.estimated_height != self.estimated_height {
            return 0;
        }
        snapshot
            .measured
            .iter()
            .filter(|item| self.record(item.index, item.height) || self.is_measured(item.index))
            .count()
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimated_offsets_are_uniform() {
        let cache = MeasurementCache::new(10, 100.0, 10.0);
        assert_eq!(cache.offset_for(0), 0.0);
        assert_eq!(cache.offset_for(3), 330.0);
        assert_eq!(cache.total_height(), 1090.0);
    }

    #[test]
    fn measurements_shift_following_offsets() {
        let mut cache = MeasurementCache::new(5, 100.0, 0.0);
        assert!(cache.record(1, 250.0));
        assert_eq!(cache.offset_for(1), 100.0);
        assert_eq!(cache.offset_for(2), 350.0);
        assert_eq!(cache.total_height(), 650.0);

        // Re-measuring replaces rather than accumulates.
        assert!(cache.record(1, 50.0));
        assert_eq!(cache.offset_for(2), 150.0);
        assert_eq!(cache.measured_count(), 1);
        assert!(!cache.record(1, 50.0));
    }

    #[test]
    fn index_for_offset_finds_covering_item() {
        let mut cache = MeasurementCache::new(4, 100.0, 20.0);
        cache.record(0, 200.0);
        // item 0: 0..200, gap, item 1: 220..320, gap, item 2: 340..440
        assert_eq!(cache.index_for_offset(0.0), 0);
        assert_eq!(cache.index_for_offset(199.0), 0);
        assert_eq!(cache.index_for_offset(210.0), 1);
        assert_eq!(cache.index_for_offset(350.0), 2);
        assert_eq!(cache.index_for_offset(10_000.0), 3);
        assert_eq!(cache.index_for_offset(-5.0), 0);
        assert_eq!(cache.index_for_offset(f32::NAN), 0);
    }

    #[test]
    fn bad_measurements_are_ignored() {
        let mut cache = MeasurementCache::new(2, 100.0, 0.0);
        assert!(!cache.record(0, f32::NAN));
        assert!(!cache.record(0, f32::INFINITY));
        assert!(!cache.record(0, -1.0));
        assert!(!cache.record(9, 10.0));
        assert_eq!(cache.total_height(), 200.0);
    }

    #[test]
    fn snapshot_round_trip_restores_offsets() {
        let mut cache = MeasurementCache::new(6, 120.0, 8.0);
        cache.record(2, 300.0);
        cache.record(4, 90.0);
        let snapshot = cache.export();
        assert_eq!(snapshot.measured.len(), 2);

        let mut restored = MeasurementCache::new(6, 120.0, 8.0);
        assert_eq!(restored.import(&snapshot), 2);
        assert_eq!(restored.offset_for(6), cache.offset_for(6));
        assert!(restored.is_measured(4));
    }

    #[test]
    fn import_skips_out_of_range_entries() {
        let mut cache = MeasurementCache::new(2, 100.0, 0.0);
        let snapshot = CacheSnapshot {
            estimated_height: 100.0,
            measured: vec![
                MeasuredItem { index: 1, height: 40.0 },
                MeasuredItem { index: 7, height: 40.0 },
            ],
        };
        assert_eq!(cache.import(&snapshot), 1);
        assert_eq!(cache.total_height(), 140.0);
    }

    #[test]
    fn import_skips_snapshot_with_other_estimate() {
        let mut cache = MeasurementCache::new(3, 281.0, 20.0);
        let snapshot = CacheSnapshot {
            estimated_height: 344.0,
            measured: vec![MeasuredItem { index: 0, height: 202.0 }],
        };
        assert_eq!(cache.import(&snapshot), 0);
        assert!(!cache.is_measured(0));
        assert_eq!(cache.total_height(), 3.0 * 281.0 + 2.0 * 20.0);
    }

    #[test]
    fn empty_cache_is_zero_height() {
        let cache = MeasurementCache::new(0, 100.0, 10.0);
        assert_eq!(cache.total_height(), 0.0);
        assert_eq!(cache.index_for_offset(50.0), 0);
    }
}
