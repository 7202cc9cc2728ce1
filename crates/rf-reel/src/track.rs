//! Reel track — item arena and derived geometry
//!
//! Offsets are y-up in the content's local space: an item's offset is its top
//! edge, its center sits half an extent below. Scrolling moves every item
//! down (decreasing offset); items that fall under the wrap threshold are
//! recycled above the current top item.
//!
//! Items are stored once, sorted by descending initial offset, and never
//! reordered. The visual top-to-bottom order is always a rotation of that
//! index order, so the bottom item is the one cyclically preceding `top`.

use serde::{Deserialize, Serialize};

/// Geometry of one discovered item, as reported by the layout layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemGeometry {
    /// Vertical offset of the item's top edge
    pub offset: f32,
    /// Height of the item
    pub extent: f32,
}

impl ItemGeometry {
    pub fn new(offset: f32, extent: f32) -> Self {
        Self { offset, extent }
    }

    /// `count` items of equal `extent`, stacked downward from 0 every `spacing`
    pub fn column(count: usize, extent: f32, spacing: f32) -> Vec<Self> {
        (0..count)
            .map(|i| Self::new(-(i as f32) * spacing, extent))
            .collect()
    }
}

/// Viewport reference lines, already converted to content-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Vertical center of the viewport
    pub center: f32,
    /// Lower edge of the viewport
    pub bottom: f32,
}

impl Viewport {
    /// Build from the viewport's top and bottom edges
    pub fn from_edges(top: f32, bottom: f32) -> Self {
        Self {
            center: (top + bottom) * 0.5,
            bottom,
        }
    }
}

/// One arena slot. Identity is the slot index; only the offset moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelItem {
    offset: f32,
}

impl ReelItem {
    #[inline]
    pub fn offset(&self) -> f32 {
        self.offset
    }
}

/// Ordered item arena plus the geometry the motion controller works against
#[derive(Debug, Clone, PartialEq)]
pub struct ReelTrack {
    items: Vec<ReelItem>,
    extent: f32,
    step: f32,
    center_line: f32,
    wrap_threshold: f32,
    /// Index of the visually top-most item
    top: usize,
}

impl ReelTrack {
    /// Build a track from discovered items and optional viewport geometry.
    ///
    /// Zero items yield an empty track on which every operation is inert.
    pub fn new(items: &[ItemGeometry], viewport: Option<Viewport>) -> Self {
        if items.is_empty() {
            log::warn!("reel track built with no items; reel will stay inert");
            return Self::empty();
        }

        let mut sorted = items.to_vec();
        sorted.sort_by(|a, b| b.offset.total_cmp(&a.offset));

        let extent = sorted
            .iter()
            .map(|item| item.extent)
            .fold(1.0_f32, f32::max);

        let step = match average_gap(&sorted) {
            Some(gap) if gap > 1.0 => gap,
            _ => extent,
        };

        let (center_line, wrap_threshold) = match viewport {
            Some(viewport) => (viewport.center, viewport.bottom - extent),
            None => {
                log::debug!("reel track has no viewport; using extent-derived geometry");
                let center = -extent * 1.5;
                (center, center - extent * 2.0)
            }
        };

        Self {
            items: sorted
                .iter()
                .map(|item| ReelItem {
                    offset: item.offset,
                })
                .collect(),
            extent,
            step,
            center_line,
            wrap_threshold,
            top: 0,
        }
    }

    /// A track with no items
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            extent: 1.0,
            step: 1.0,
            center_line: -1.5,
            wrap_threshold: -3.5,
            top: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ReelItem] {
        &self.items
    }

    /// Current offsets in index order
    pub fn offsets(&self) -> impl Iterator<Item = f32> + '_ {
        self.items.iter().map(ReelItem::offset)
    }

    pub fn offset(&self, index: usize) -> Option<f32> {
        self.items.get(index).map(ReelItem::offset)
    }

    /// Uniform item height
    pub fn extent(&self) -> f32 {
        self.extent
    }

    /// Uniform distance between consecutive items
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Offset at which an item's center counts as selected
    pub fn center_line(&self) -> f32 {
        self.center_line
    }

    /// Items whose offset drops below this are recycled to the top
    pub fn wrap_threshold(&self) -> f32 {
        self.wrap_threshold
    }

    /// Length of one full loop of the reel
    pub fn band_length(&self) -> f32 {
        self.items.len() as f32 * self.step
    }

    /// Index of the visually top-most item
    pub fn top_index(&self) -> usize {
        self.top
    }

    /// Index of the visually bottom-most item
    pub fn bottom_index(&self) -> usize {
        let n = self.items.len();
        if n == 0 { 0 } else { (self.top + n - 1) % n }
    }

    /// Vertical center of an item
    pub fn item_center(&self, index: usize) -> Option<f32> {
        self.offset(index).map(|offset| offset - self.extent * 0.5)
    }

    /// Rigidly move every item by `delta` (positive = up)
    pub fn shift(&mut self, delta: f32) {
        for item in &mut self.items {
            item.offset += delta;
        }
    }

    /// Scroll the reel down by `distance` and recycle what fell off.
    ///
    /// Returns the number of item relocations.
    pub fn advance(&mut self, distance: f32) -> usize {
        self.shift(-distance);
        self.recycle()
    }

    /// Move every item under the wrap threshold above the top item.
    ///
    /// Handles any number of wraps in one call: if the whole band dropped
    /// below the threshold it is first lifted by whole loops, then bottom
    /// items are moved one step above the running top until none remain
    /// below. Spacing and cyclic order are preserved.
    pub fn recycle(&mut self) -> usize {
        let n = self.items.len();
        if n == 0 {
            return 0;
        }

        let mut relocations = 0;
        let mut top_offset = self.items[self.top].offset;

        if top_offset < self.wrap_threshold {
            let band = self.band_length();
            let laps = ((self.wrap_threshold - top_offset) / band).ceil();
            self.shift(laps * band);
            top_offset += laps * band;
            relocations += n * laps as usize;
        }

        for _ in 0..n {
            let bottom = self.bottom_index();
            if self.items[bottom].offset >= self.wrap_threshold {
                break;
            }
            top_offset += self.step;
            self.items[bottom].offset = top_offset;
            self.top = bottom;
            relocations += 1;
        }

        relocations
    }

    /// Index of the item whose center is nearest the center line.
    ///
    /// Ties go to the lower index.
    pub fn nearest_to_center(&self) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }

        let half = self.extent * 0.5;
        let mut best = 0;
        let mut best_distance = f32::MAX;
        for (index, item) in self.items.iter().enumerate() {
            let distance = (self.center_line - (item.offset - half)).abs();
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }
        Some(best)
    }

    /// Signed shift that would put item `index` exactly on the center line
    pub fn correction_for(&self, index: usize) -> Option<f32> {
        self.item_center(index)
            .map(|center| self.center_line - center)
    }
}

/// Mean absolute gap between consecutive items, `None` for fewer than two
fn average_gap(sorted: &[ItemGeometry]) -> Option<f32> {
    if sorted.len() < 2 {
        return None;
    }
    let sum: f32 = sorted
        .windows(2)
        .map(|pair| (pair[0].offset - pair[1].offset).abs())
        .sum();
    Some(sum / (sorted.len() - 1) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn five_items() -> ReelTrack {
        ReelTrack::new(&ItemGeometry::column(5, 100.0, 100.0), None)
    }

    /// Visual order top to bottom, as slot indices
    fn visual_order(track: &ReelTrack) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..track.len()).collect();
        indices.sort_by(|&a, &b| {
            track.items()[b]
                .offset()
                .total_cmp(&track.items()[a].offset())
        });
        indices
    }

    fn assert_uniform_spacing(track: &ReelTrack) {
        let order = visual_order(track);
        for pair in order.windows(2) {
            let gap = track.items()[pair[0]].offset() - track.items()[pair[1]].offset();
            assert_abs_diff_eq!(gap, track.step(), epsilon = 1e-2);
        }
    }

    fn assert_cyclic_order(track: &ReelTrack) {
        let order = visual_order(track);
        let n = track.len();
        for pair in order.windows(2) {
            assert_eq!(pair[1], (pair[0] + 1) % n);
        }
        assert_eq!(order[0], track.top_index());
    }

    #[test]
    fn test_sorts_descending() {
        let items = [
            ItemGeometry::new(-200.0, 100.0),
            ItemGeometry::new(0.0, 100.0),
            ItemGeometry::new(-100.0, 100.0),
        ];
        let track = ReelTrack::new(&items, None);
        let offsets: Vec<f32> = track.offsets().collect();
        assert_eq!(offsets, vec![0.0, -100.0, -200.0]);
    }

    #[test]
    fn test_geometry_fallback() {
        let track = five_items();
        assert_eq!(track.extent(), 100.0);
        assert_eq!(track.step(), 100.0);
        assert_eq!(track.center_line(), -150.0);
        assert_eq!(track.wrap_threshold(), -350.0);
        assert_eq!(track.band_length(), 500.0);
    }

    #[test]
    fn test_geometry_from_viewport() {
        let viewport = Viewport::from_edges(0.0, -300.0);
        let track = ReelTrack::new(&ItemGeometry::column(5, 100.0, 100.0), Some(viewport));
        assert_eq!(track.center_line(), -150.0);
        assert_eq!(track.wrap_threshold(), -400.0);
    }

    #[test]
    fn test_extent_is_max_with_floor() {
        let items = [ItemGeometry::new(0.0, 80.0), ItemGeometry::new(-100.0, 120.0)];
        assert_eq!(ReelTrack::new(&items, None).extent(), 120.0);

        let tiny = [ItemGeometry::new(0.0, 0.2)];
        assert_eq!(ReelTrack::new(&tiny, None).extent(), 1.0);
    }

    #[test]
    fn test_step_mean_gap() {
        let items = [
            ItemGeometry::new(0.0, 100.0),
            ItemGeometry::new(-90.0, 100.0),
            ItemGeometry::new(-200.0, 100.0),
        ];
        assert_eq!(ReelTrack::new(&items, None).step(), 100.0);
    }

    #[test]
    fn test_step_falls_back_to_extent() {
        let single = [ItemGeometry::new(0.0, 64.0)];
        assert_eq!(ReelTrack::new(&single, None).step(), 64.0);

        let stacked = [ItemGeometry::new(0.0, 64.0), ItemGeometry::new(0.5, 64.0)];
        assert_eq!(ReelTrack::new(&stacked, None).step(), 64.0);
    }

    #[test]
    fn test_empty_track_is_inert() {
        let mut track = ReelTrack::new(&[], None);
        assert!(track.is_empty());
        assert_eq!(track.advance(1000.0), 0);
        assert_eq!(track.nearest_to_center(), None);
        assert_eq!(track.correction_for(0), None);
    }

    #[test]
    fn test_single_wrap() {
        let mut track = five_items();
        // Bottom item starts at -400, below the -350 threshold
        assert_eq!(track.recycle(), 1);
        assert_eq!(track.offset(4), Some(100.0));
        assert_eq!(track.top_index(), 4);
        assert_uniform_spacing(&track);
        assert_cyclic_order(&track);
    }

    #[test]
    fn test_multi_wrap_in_one_step() {
        let mut track = five_items();
        track.recycle();

        // Two and a half steps in one frame
        let wrapped = track.advance(250.0);
        assert_eq!(wrapped, 2);
        assert_uniform_spacing(&track);
        assert_cyclic_order(&track);
        assert!(track.offsets().all(|o| o >= track.wrap_threshold()));
    }

    #[test]
    fn test_huge_step_keeps_band() {
        let mut track = five_items();
        track.recycle();
        let before: Vec<f32> = track.offsets().collect();

        // Many full loops plus a remainder
        track.advance(500.0 * 37.0 + 130.0);

        assert_uniform_spacing(&track);
        assert_cyclic_order(&track);
        assert!(track.offsets().all(|o| o >= track.wrap_threshold()));

        // Positions stay on the same lattice (mod step) after translation
        for (a, b) in before.iter().zip(track.offsets()) {
            let phase = (a - 130.0 - b).rem_euclid(track.step());
            assert!(phase < 1e-1 || track.step() - phase < 1e-1, "phase {phase}");
        }
    }

    #[test]
    fn test_many_small_steps_keep_band() {
        let mut track = five_items();
        for _ in 0..10_000 {
            track.advance(23.7);
        }
        assert_eq!(track.len(), 5);
        assert_uniform_spacing(&track);
        assert_cyclic_order(&track);
    }

    #[test]
    fn test_nearest_to_center() {
        let track = five_items();
        // Item 1 has its top at -100, center at -150 = center line
        assert_eq!(track.nearest_to_center(), Some(1));
        assert_eq!(track.correction_for(1), Some(0.0));
    }

    #[test]
    fn test_nearest_ties_go_to_lower_index() {
        let mut track = five_items();
        // Centers of items 0 and 1 now straddle the line symmetrically
        track.shift(-50.0);
        assert_eq!(track.nearest_to_center(), Some(0));
        assert_eq!(track.correction_for(0), Some(-50.0));
    }
}
