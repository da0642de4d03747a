//! Column balancer - greedy shortest-column assignment.
//!
//! Each image, in dataset order, goes to the column with the smallest
//! cumulative height (lowest index on ties). The result is a partition:
//! every input index lands in exactly one column.
//!
//! O(images x columns), fine for a handful of columns and a few thousand
//! images. There is no incremental rebalancing; a column-count change
//! recomputes everything.

use ristill_api::{ColumnId, ImageRecord};

/// Items assigned to one column, in assignment order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAssignment {
    pub column_id: ColumnId,
    /// Indices into the input slice.
    pub items: Vec<usize>,
    /// Sum of the estimated heights (gap included) of `items`.
    pub cumulative_height: f32,
}

impl ColumnAssignment {
    fn empty(index: usize) -> Self {
        Self {
            column_id: ColumnId::for_index(index),
            items: Vec::new(),
            cumulative_height: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Estimated rendered height of an image in a column, plus the gap below it.
pub fn estimated_height(image: &ImageRecord, column_width: f32, gap: f32) -> f32 {
    let width = if column_width.is_finite() { column_width.max(0.0) } else { 0.0 };
    let gap = if gap.is_finite() { gap.max(0.0) } else { 0.0 };
    image.scaled_height(width) + gap
}

/// Partition `images` into `column_count` columns.
///
/// A `column_count` of zero is treated as one.
pub fn assign(
    images: &[ImageRecord],
    column_count: usize,
    column_width: f32,
    gap: f32,
) -> Vec<ColumnAssignment> {
    let column_count = if column_count == 0 {
        tracing::debug!("assign called with zero columns; using one");
        1
    } else {
        column_count
    };

    let mut columns: Vec<ColumnAssignment> =
        (0..column_count).map(ColumnAssignment::empty).collect();

    for (index, image) in images.iter().enumerate() {
        let shortest = shortest_column(&columns);
        let column = &mut columns[shortest];
        column.items.push(index);
        column.cumulative_height += estimated_height(image, column_width, gap);
    }

    columns
}

/// Index of the column with the smallest cumulative height; ties go to the
/// lowest index.
fn shortest_column(columns: &[ColumnAssignment]) -> usize {
    let mut best = 0;
    for (index, column) in columns.iter().enumerate().skip(1) {
        if column.cumulative_height < columns[best].cumulative_height {
            best = index;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use ristill_api::RecordId;

    fn image(index: usize, width: u32, height: u32) -> ImageRecord {
        ImageRecord {
            id: RecordId::new(format!("{index:04}")),
            display_name: format!("Material #{index}"),
            source_url: format!("https://cdn.example.com/{index}.webp"),
            size_bytes: 1000,
            modified_at: DateTime::<Utc>::default(),
            original_name: String::new(),
            width,
            height,
        }
    }

    fn random_images(rng: &mut StdRng, count: usize) -> Vec<ImageRecord> {
        (0..count)
            .map(|i| {
                let shape = rng.gen_range(0..10);
                match shape {
                    0..=4 => image(i, 3840, 2160),
                    5..=8 => image(i, 2160, 3840),
                    _ => image(i, rng.gen_range(500..3000), rng.gen_range(500..3000)),
                }
            })
            .collect()
    }

    #[test]
    fn assignment_is_a_partition() {
        let mut rng = StdRng::seed_from_u64(7);
        for count in [0, 1, 2, 17, 250] {
            let images = random_images(&mut rng, count);
            for k in 1..=6 {
                let columns = assign(&images, k, 240.0, 24.0);
                assert_eq!(columns.len(), k);

                let mut all: Vec<usize> =
                    columns.iter().flat_map(|c| c.items.iter().copied()).collect();
                all.sort_unstable();
                assert_eq!(all, (0..count).collect::<Vec<_>>(), "count={count} k={k}");
            }
        }
    }

    #[test]
    fn column_spread_is_bounded_by_tallest_item() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let images = random_images(&mut rng, 300);
            let k = rng.gen_range(2..=4);
            let columns = assign(&images, k, 280.0, 16.0);

            let tallest = images
                .iter()
                .map(|img| estimated_height(img, 280.0, 16.0))
                .fold(0.0f32, f32::max);
            let max = columns.iter().map(|c| c.cumulative_height).fold(f32::MIN, f32::max);
            let min = columns.iter().map(|c| c.cumulative_height).fold(f32::MAX, f32::min);
            // f32 accumulation slack
            assert!(max - min <= tallest + 0.5, "spread {} > tallest {}", max - min, tallest);
        }
    }

    #[test]
    fn ties_go_to_lowest_column() {
        let images: Vec<_> = (0..7).map(|i| image(i, 100, 100)).collect();
        let columns = assign(&images, 3, 100.0, 0.0);
        assert_eq!(columns[0].items, vec![0, 3, 6]);
        assert_eq!(columns[1].items, vec![1, 4]);
        assert_eq!(columns[2].items, vec![2, 5]);
    }

    #[test]
    fn tall_image_pushes_next_items_elsewhere() {
        let images = vec![image(0, 100, 400), image(1, 100, 100), image(2, 100, 100)];
        let columns = assign(&images, 2, 100.0, 10.0);
        assert_eq!(columns[0].items, vec![0]);
        assert_eq!(columns[1].items, vec![1, 2]);
        assert_eq!(columns[0].cumulative_height, 410.0);
        assert_eq!(columns[1].cumulative_height, 220.0);
    }

    #[test]
    fn degenerate_dimensions_stay_finite() {
        let images = vec![image(0, 0, 1080), image(1, 1920, 0), image(2, 0, 0), image(3, 1920, 1080)];
        let columns = assign(&images, 2, 240.0, 24.0);
        for column in &columns {
            assert!(column.cumulative_height.is_finite());
            assert!(column.cumulative_height >= 0.0);
        }
        // width=0 is laid out as a square
        assert_eq!(estimated_height(&images[0], 240.0, 24.0), 264.0);
    }

    #[test]
    fn zero_columns_means_one() {
        let images: Vec<_> = (0..3).map(|i| image(i, 10, 10)).collect();
        let columns = assign(&images, 0, 100.0, 0.0);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].items, vec![0, 1, 2]);
        assert_eq!(columns[0].column_id, ColumnId::for_index(0));
    }
}
