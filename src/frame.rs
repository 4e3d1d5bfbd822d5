//! Renderable snapshot of the overlay, independent of any toolkit.

use std::path::PathBuf;

use crate::constants::{AVG_CHAR_WIDTH, ELLIPSIS_WIDTH, PREVIEW_HEADER_RESERVED};
use crate::icons::{IconLookup, IconResolver, fallback_glyph};
use crate::layout::{self, LayoutRow};
use crate::preview::{Dimensions, PreviewResolver};
use crate::state::DisplayMode;
use crate::window::WindowRecord;

const ELLIPSIS: &str = "…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconRef {
    /// Icon name resolved through the desktop registry.
    Named(String),
    /// No icon; draw this letter instead.
    Glyph(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilePreview {
    pub path: Option<PathBuf>,
    pub dimensions: Dimensions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub address: String,
    pub class: String,
    /// Title already cut down to what fits the tile header.
    pub title: String,
    pub icon: IconRef,
    pub preview: Option<TilePreview>,
    pub width: u32,
    pub selected: bool,
}

pub type FrameRow = LayoutRow<Tile>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherFrame {
    pub mode: DisplayMode,
    pub rows: Vec<FrameRow>,
    /// Full title of the selected window, shown under the tiles.
    pub selected_title: String,
    pub max_width: u32,
}

impl SwitcherFrame {
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.rows.iter().flat_map(|row| row.items())
    }

    pub fn tile_count(&self) -> usize {
        self.rows.iter().map(LayoutRow::len).sum()
    }

    pub fn selected(&self) -> Option<&Tile> {
        self.tiles().find(|tile| tile.selected)
    }
}

/// Cuts `title` so it fits `available` pixels at an average glyph width,
/// leaving room for the ellipsis.
pub fn truncate_title(title: &str, available: u32) -> String {
    let max_chars = (i64::from(available) - i64::from(ELLIPSIS_WIDTH)) / i64::from(AVG_CHAR_WIDTH);
    if max_chars <= 0 {
        return ELLIPSIS.to_string();
    }
    let max_chars = max_chars as usize;
    if title.chars().count() <= max_chars {
        return title.to_string();
    }
    let mut cut: String = title.chars().take(max_chars).collect();
    cut.push_str(ELLIPSIS);
    cut
}

/// Tile geometry knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameGeometry {
    pub icon_size: u32,
    pub tile_padding: u32,
    pub tile_spacing: u32,
    pub max_width_fraction: f64,
}

impl FrameGeometry {
    pub fn icon_tile_width(&self) -> u32 {
        self.icon_size + 2 * self.tile_padding
    }

    pub fn preview_tile_width(&self, preview: Dimensions) -> u32 {
        preview.width + 2 * self.tile_padding
    }
}

/// Everything needed to materialize one frame.
pub struct FrameInput<'a> {
    pub windows: &'a [WindowRecord],
    pub selected: usize,
    pub mode: DisplayMode,
    pub display_width: u32,
}

pub fn build_frame(
    input: FrameInput<'_>,
    geometry: FrameGeometry,
    icons: &mut IconResolver,
    previews: &PreviewResolver,
) -> SwitcherFrame {
    let max_width = layout::max_row_width(input.display_width, geometry.max_width_fraction);
    let tiles = input.windows.iter().enumerate().map(|(index, window)| {
        let icon = match icons.resolve(&window.class) {
            IconLookup::Found(name) => IconRef::Named(name),
            IconLookup::NotFound => IconRef::Glyph(fallback_glyph(&window.class)),
        };
        let (preview, width, title) = match input.mode {
            DisplayMode::Icons => (None, geometry.icon_tile_width(), window.title.clone()),
            DisplayMode::Previews => {
                let entry = previews.resolve(&window.address);
                let title = truncate_title(
                    &window.title,
                    entry.dimensions.width.saturating_sub(PREVIEW_HEADER_RESERVED),
                );
                let width = geometry.preview_tile_width(entry.dimensions);
                let preview = TilePreview {
                    path: entry.path,
                    dimensions: entry.dimensions,
                };
                (Some(preview), width, title)
            }
        };
        let tile = Tile {
            index,
            address: window.address.clone(),
            class: window.class.clone(),
            title,
            icon,
            preview,
            width,
            selected: index == input.selected,
        };
        (tile, width)
    });
    let rows = layout::pack(tiles, max_width, geometry.tile_spacing);
    SwitcherFrame {
        mode: input.mode,
        rows,
        selected_title: input
            .windows
            .get(input.selected)
            .map(|window| window.title.clone())
            .unwrap_or_default(),
        max_width,
    }
}
