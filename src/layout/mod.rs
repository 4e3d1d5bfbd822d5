//! Greedy row packing for switcher tiles.
//!
//! Tiles are laid out left to right in input order. A tile that does not
//! fit the remaining width of the current row opens a new row; there is no
//! look-ahead or balancing, so the same input always yields the same rows.

/// One packed entry with its precomputed width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEntry<T> {
    pub item: T,
    pub width: u32,
}

/// A transient row of tiles produced for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutRow<T> {
    pub entries: Vec<RowEntry<T>>,
    /// Sum of tile widths plus inter-tile spacing.
    pub width: u32,
}

impl<T> Default for LayoutRow<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            width: 0,
        }
    }
}

impl<T> LayoutRow<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn items(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|entry| &entry.item)
    }
}

/// Packs `(item, tile_width)` pairs into rows no wider than `max_width`.
///
/// A single tile wider than `max_width` still gets a row of its own; it is
/// never dropped.
pub fn pack<T, I>(tiles: I, max_width: u32, spacing: u32) -> Vec<LayoutRow<T>>
where
    I: IntoIterator<Item = (T, u32)>,
{
    let mut rows = Vec::new();
    let mut current: LayoutRow<T> = LayoutRow::default();
    for (item, width) in tiles {
        let increment = if current.is_empty() {
            width
        } else {
            width.saturating_add(spacing)
        };
        if current.is_empty() || current.width.saturating_add(increment) <= max_width {
            current.width = current.width.saturating_add(increment);
            current.entries.push(RowEntry { item, width });
        } else {
            rows.push(std::mem::take(&mut current));
            current.width = width;
            current.entries.push(RowEntry { item, width });
        }
    }
    if !current.is_empty() {
        rows.push(current);
    }
    rows
}

/// Maximum row width for a display, as a fraction of its width.
pub fn max_row_width(display_width: u32, fraction: f64) -> u32 {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        1.0
    };
    (f64::from(display_width) * fraction).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths<T: Copy>(rows: &[LayoutRow<T>]) -> Vec<Vec<T>> {
        rows.iter().map(|r| r.items().copied().collect()).collect()
    }

    #[test]
    fn packs_greedily_with_spacing() {
        // 100 + 8 + 100 = 208 fits 210; the third tile would need 316.
        let rows = pack([(1, 100), (2, 100), (3, 100)], 210, 8);
        assert_eq!(widths(&rows), vec![vec![1, 2], vec![3]]);
        assert_eq!(rows[0].width, 208);
        assert_eq!(rows[1].width, 100);
    }

    #[test]
    fn exact_fit_stays_on_row() {
        let rows = pack([(1, 100), (2, 100)], 208, 8);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].width, 208);
    }

    #[test]
    fn oversized_tile_gets_its_own_row() {
        let rows = pack([(1, 50), (2, 500), (3, 50)], 200, 8);
        assert_eq!(widths(&rows), vec![vec![1], vec![2], vec![3]]);
        assert_eq!(rows[1].width, 500);
    }

    #[test]
    fn empty_input_has_no_rows() {
        let rows: Vec<LayoutRow<u8>> = pack(Vec::new(), 100, 8);
        assert!(rows.is_empty());
    }

    #[test]
    fn no_lookahead_rebalancing() {
        // A later small tile never back-fills an earlier row.
        let rows = pack([(1, 90), (2, 90), (3, 10)], 100, 0);
        assert_eq!(widths(&rows), vec![vec![1], vec![2, 3]]);
    }

    #[test]
    fn max_row_width_clamps_fraction() {
        assert_eq!(max_row_width(1920, 0.8), 1536);
        assert_eq!(max_row_width(1000, 2.0), 1000);
        assert_eq!(max_row_width(1000, f64::NAN), 1000);
    }
}
