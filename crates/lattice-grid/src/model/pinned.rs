//! Pinned column layout.
//!
//! Left-pinned columns stick to the left edge of the viewport, each at the
//! summed width of the left-pinned columns before it (plus the selection
//! checkbox column when row selection is on). Right-pinned columns stick to
//! the right edge at the summed width of the right-pinned columns after them.
//!
//! Cells are stacked so that headers stay above the body they scroll over
//! and pinned cells stay above unpinned ones:
//!
//! | Surface | Pinned | z-index |
//! |---------|--------|---------|
//! | header  | yes    | 4       |
//! | header  | no     | 3       |
//! | body    | yes    | 2       |
//! | body    | no     | 1       |

use super::column::{Column, PinnedSide, DEFAULT_COLUMN_WIDTH};
use super::row::GridRow;

/// Width of the row selection checkbox column.
pub const SELECTION_COLUMN_WIDTH: f32 = 58.0;

/// Which part of the grid a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellSurface {
    /// Column header cell.
    Header,
    /// Data cell.
    Body,
}

/// Sticky position of a pinned column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinnedOffset {
    /// Edge the offset is measured from. Never [`PinnedSide::None`].
    pub side: PinnedSide,
    /// Distance from that edge in pixels.
    pub offset: f32,
}

/// Positioning of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinnedStyle {
    /// Sticky offset; `None` for columns that scroll normally.
    pub offset: Option<PinnedOffset>,
    /// Stacking order.
    pub z_index: u32,
    /// Surface the style was computed for.
    pub surface: CellSurface,
}

impl PinnedStyle {
    /// Returns `true` if the cell is sticky.
    pub fn is_pinned(&self) -> bool {
        self.offset.is_some()
    }
}

/// Stacking order of a cell.
pub fn z_index(pinned: bool, surface: CellSurface) -> u32 {
    match (surface, pinned) {
        (CellSurface::Header, true) => 4,
        (CellSurface::Header, false) => 3,
        (CellSurface::Body, true) => 2,
        (CellSurface::Body, false) => 1,
    }
}

/// Offsets of every column of a grid.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PinnedLayout {
    offsets: Vec<Option<PinnedOffset>>,
    selection_column: Option<PinnedOffset>,
}

impl PinnedLayout {
    /// Computes the layout with the default widths.
    pub fn compute<R: GridRow>(columns: &[Column<R>], selection_enabled: bool) -> Self {
        Self::compute_with(columns, selection_enabled, DEFAULT_COLUMN_WIDTH, SELECTION_COLUMN_WIDTH)
    }

    /// Computes the layout.
    ///
    /// `default_width` applies to columns without a configured width and
    /// `selection_width` is the width of the checkbox column.
    #[tracing::instrument(skip_all, target = "lattice_grid::layout", level = "trace")]
    pub fn compute_with<R: GridRow>(
        columns: &[Column<R>],
        selection_enabled: bool,
        default_width: f32,
        selection_width: f32,
    ) -> Self {
        let mut offsets = vec![None; columns.len()];

        let mut left = if selection_enabled { selection_width } else { 0.0 };
        for (index, column) in columns.iter().enumerate() {
            if column.pinned_side() == PinnedSide::Left {
                offsets[index] = Some(PinnedOffset {
                    side: PinnedSide::Left,
                    offset: left,
                });
                left += column.effective_width(default_width);
            }
        }

        let mut right = 0.0;
        for (index, column) in columns.iter().enumerate().rev() {
            if column.pinned_side() == PinnedSide::Right {
                offsets[index] = Some(PinnedOffset {
                    side: PinnedSide::Right,
                    offset: right,
                });
                right += column.effective_width(default_width);
            }
        }

        let any_left = columns.iter().any(|column| column.pinned_side() == PinnedSide::Left);
        let selection_column = (selection_enabled && any_left).then_some(PinnedOffset {
            side: PinnedSide::Left,
            offset: 0.0,
        });

        tracing::trace!(
            target: "lattice_grid::layout",
            columns = columns.len(),
            left_extent = left,
            right_extent = right,
            "computed pinned offsets"
        );
        Self {
            offsets,
            selection_column,
        }
    }

    /// Offset of the column at `index`, if it is pinned.
    pub fn offset(&self, index: usize) -> Option<PinnedOffset> {
        self.offsets.get(index).copied().flatten()
    }

    /// Style of a cell of the column at `index`.
    pub fn style(&self, index: usize, surface: CellSurface) -> PinnedStyle {
        let offset = self.offset(index);
        PinnedStyle {
            offset,
            z_index: z_index(offset.is_some(), surface),
            surface,
        }
    }

    /// Style of a cell of the selection checkbox column.
    pub fn selection_column_style(&self, surface: CellSurface) -> PinnedStyle {
        PinnedStyle {
            offset: self.selection_column,
            z_index: z_index(self.selection_column.is_some(), surface),
            surface,
        }
    }
}

/// Render order of columns: left-pinned, unpinned, then right-pinned, each
/// group keeping its relative order.
pub fn display_order<R: GridRow>(columns: &[Column<R>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(columns.len());
    for side in [PinnedSide::Left, PinnedSide::None, PinnedSide::Right] {
        order.extend(
            columns
                .iter()
                .enumerate()
                .filter(|(_, column)| column.pinned_side() == side)
                .map(|(index, _)| index),
        );
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn col(field: &str, width: f32, side: PinnedSide) -> Column<Value> {
        Column::new(field).with_width(width).pinned(side)
    }

    #[test]
    fn test_left_offsets_include_selection_column() {
        let columns = vec![
            col("id", 80.0, PinnedSide::Left),
            col("name", 180.0, PinnedSide::Left),
            col("age", 100.0, PinnedSide::Left),
            col("city", 120.0, PinnedSide::None),
        ];
        let layout = PinnedLayout::compute(&columns, true);

        assert_eq!(layout.offset(0).map(|o| o.offset), Some(58.0));
        assert_eq!(layout.offset(1).map(|o| o.offset), Some(138.0));
        assert_eq!(layout.offset(2).map(|o| o.offset), Some(318.0));
        assert_eq!(layout.offset(3), None);
    }

    #[test]
    fn test_right_offsets_accumulate_from_the_end() {
        let columns = vec![
            col("a", 100.0, PinnedSide::None),
            col("b", 90.0, PinnedSide::Right),
            col("c", 60.0, PinnedSide::Right),
        ];
        let layout = PinnedLayout::compute(&columns, true);

        assert_eq!(layout.offset(2), Some(PinnedOffset { side: PinnedSide::Right, offset: 0.0 }));
        assert_eq!(layout.offset(1), Some(PinnedOffset { side: PinnedSide::Right, offset: 60.0 }));
        assert_eq!(layout.selection_column_style(CellSurface::Body).offset, None);
    }

    #[test]
    fn test_default_and_clamped_widths() {
        let columns = vec![
            Column::<Value>::new("a").pinned(PinnedSide::Left),
            Column::<Value>::new("b").with_width(20.0).with_min_width(50.0).pinned(PinnedSide::Left),
            Column::<Value>::new("c").pinned(PinnedSide::Left),
        ];
        let layout = PinnedLayout::compute(&columns, false);

        assert_eq!(layout.offset(0).map(|o| o.offset), Some(0.0));
        assert_eq!(layout.offset(1).map(|o| o.offset), Some(150.0));
        assert_eq!(layout.offset(2).map(|o| o.offset), Some(200.0));
    }

    #[test]
    fn test_z_order() {
        let columns = vec![col("id", 80.0, PinnedSide::Left), col("name", 100.0, PinnedSide::None)];
        let layout = PinnedLayout::compute(&columns, false);

        let pinned_header = layout.style(0, CellSurface::Header).z_index;
        let header = layout.style(1, CellSurface::Header).z_index;
        let pinned_body = layout.style(0, CellSurface::Body).z_index;
        let body = layout.style(1, CellSurface::Body).z_index;

        assert!(pinned_header > header);
        assert!(header > pinned_body);
        assert!(pinned_body > body);
    }

    #[test]
    fn test_selection_column_pins_with_left_columns() {
        let columns = vec![col("id", 80.0, PinnedSide::Left)];

        let with_selection = PinnedLayout::compute(&columns, true);
        let style = with_selection.selection_column_style(CellSurface::Header);
        assert_eq!(style.offset.map(|o| o.offset), Some(0.0));
        assert_eq!(style.z_index, 4);

        let without_selection = PinnedLayout::compute(&columns, false);
        assert!(!without_selection.selection_column_style(CellSurface::Header).is_pinned());
    }

    #[test]
    fn test_display_order_groups_pinned_columns() {
        let columns = vec![
            col("a", 1.0, PinnedSide::Right),
            col("b", 1.0, PinnedSide::None),
            col("c", 1.0, PinnedSide::Left),
            col("d", 1.0, PinnedSide::None),
            col("e", 1.0, PinnedSide::Left),
        ];
        assert_eq!(display_order(&columns), vec![2, 4, 1, 3, 0]);
    }
}
