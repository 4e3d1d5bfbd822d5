//! Terminal overlay: paints frames with ratatui and reads the gesture
//! modifier from crossterm key events.

use std::io::{self, Stdout};

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier as TextModifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use tracing::{debug, warn};

use super::OverlaySurface;
use crate::frame::{IconRef, SwitcherFrame, Tile};
use crate::state::DisplayMode;
use crate::watchdog::Modifier;

/// Horizontal pixels represented by one terminal cell.
const PX_PER_COLUMN: u32 = 8;
/// Vertical pixels represented by one terminal row.
const PX_PER_ROW: u32 = 16;
const MIN_TILE_COLUMNS: u16 = 5;
const ROW_GAP: u16 = 1;

fn accent() -> Color {
    Color::Rgb(0x7a, 0xa2, 0xf7)
}

fn tile_border() -> Color {
    Color::DarkGray
}

fn text_fg() -> Color {
    Color::White
}

fn dim_fg() -> Color {
    Color::Gray
}

/// What a key pressed in the terminal asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKeyAction {
    Request(&'static str),
    Quit,
}

/// Local bindings for driving the switcher from the terminal itself.
pub fn key_action(key: &KeyEvent, active: bool) -> Option<TerminalKeyAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => {
            Some(TerminalKeyAction::Request("prev"))
        }
        KeyCode::Tab => Some(TerminalKeyAction::Request("next")),
        KeyCode::BackTab => Some(TerminalKeyAction::Request("prev")),
        KeyCode::Enter if active => Some(TerminalKeyAction::Request("commit")),
        KeyCode::Esc if active => Some(TerminalKeyAction::Request("hide")),
        KeyCode::Char('m') => Some(TerminalKeyAction::Request("toggle-mode")),
        KeyCode::Esc | KeyCode::Char('q') if !active => Some(TerminalKeyAction::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TerminalKeyAction::Quit)
        }
        _ => None,
    }
}

fn cells(px: u32, per_cell: u32) -> u16 {
    (px / per_cell).min(u32::from(u16::MAX)) as u16
}

fn tile_size(tile: &Tile, mode: DisplayMode) -> (u16, u16) {
    let width = cells(tile.width, PX_PER_COLUMN).max(MIN_TILE_COLUMNS);
    let height = match (mode, &tile.preview) {
        (DisplayMode::Previews, Some(preview)) => {
            cells(preview.dimensions.height, PX_PER_ROW).max(3) + 2
        }
        _ => 4,
    };
    (width, height)
}

fn icon_label(icon: &IconRef) -> String {
    match icon {
        IconRef::Glyph(c) => c.to_string(),
        IconRef::Named(name) => name
            .rsplit('/')
            .next()
            .unwrap_or(name)
            .split('.')
            .next()
            .unwrap_or(name)
            .to_string(),
    }
}

fn render_tile(tile: &Tile, mode: DisplayMode, area: Rect, buf: &mut Buffer) {
    let border_style = if tile.selected {
        Style::default().fg(accent()).add_modifier(TextModifier::BOLD)
    } else {
        Style::default().fg(tile_border())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    block.render(area, buf);
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let mut lines = vec![icon_label(&tile.icon)];
    if mode == DisplayMode::Previews {
        lines.push(tile.title.clone());
        let placeholder = match tile.preview.as_ref().and_then(|p| p.path.as_ref()) {
            Some(_) => "▒".repeat(inner.width as usize),
            None => String::new(),
        };
        lines.push(placeholder);
    }
    let style = if tile.selected {
        Style::default().fg(text_fg()).add_modifier(TextModifier::BOLD)
    } else {
        Style::default().fg(dim_fg())
    };
    Paragraph::new(lines.join("\n"))
        .alignment(Alignment::Center)
        .style(style)
        .render(inner, buf);
}

/// Paints `frame` centred in `area`.
pub fn render_frame(frame: &SwitcherFrame, area: Rect, buf: &mut Buffer) {
    let mut layout: Vec<(u16, u16, Vec<(&Tile, u16)>)> = Vec::new();
    for row in &frame.rows {
        let mut width = 0u16;
        let mut height = 0u16;
        let mut tiles = Vec::new();
        for tile in row.items() {
            let (w, h) = tile_size(tile, frame.mode);
            if !tiles.is_empty() {
                width = width.saturating_add(1);
            }
            width = width.saturating_add(w);
            height = height.max(h);
            tiles.push((tile, w));
        }
        layout.push((width, height, tiles));
    }
    let total_height: u16 = layout
        .iter()
        .map(|(_, h, _)| *h + ROW_GAP)
        .sum::<u16>()
        .saturating_add(1);
    let mut y = area
        .y
        .saturating_add(area.height.saturating_sub(total_height) / 2);
    let bottom = area.y.saturating_add(area.height);
    for (row_width, row_height, tiles) in layout {
        let mut x = area
            .x
            .saturating_add(area.width.saturating_sub(row_width) / 2);
        for (tile, w) in tiles {
            let rect = Rect {
                x,
                y,
                width: w,
                height: row_height,
            }
            .intersection(area);
            if rect.width > 0 && rect.height > 0 {
                render_tile(tile, frame.mode, rect, buf);
            }
            x = x.saturating_add(w + 1);
        }
        y = y.saturating_add(row_height + ROW_GAP);
    }
    if y < bottom {
        let title = Rect {
            x: area.x,
            y,
            width: area.width,
            height: 1,
        };
        Paragraph::new(frame.selected_title.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(text_fg()).add_modifier(TextModifier::BOLD))
            .render(title, buf);
    }
}

fn render_idle(area: Rect, buf: &mut Buffer) {
    let hint = "Tab / Shift-Tab to switch, m to toggle mode, q to quit";
    let rect = Rect {
        x: area.x,
        y: area.y.saturating_add(area.height / 2),
        width: area.width,
        height: area.height.min(1),
    };
    Paragraph::new(hint)
        .alignment(Alignment::Center)
        .style(Style::default().fg(dim_fg()))
        .render(rect, buf);
}

pub struct TerminalSurface {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    modifier: Modifier,
    entered: bool,
    enhanced: bool,
    modifier_held: Option<bool>,
    last_frame: Option<SwitcherFrame>,
}

impl TerminalSurface {
    pub fn new(modifier: Modifier) -> io::Result<Self> {
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)?;
        Ok(Self {
            terminal,
            modifier,
            entered: false,
            enhanced: false,
            modifier_held: None,
            last_frame: None,
        })
    }

    pub fn enter(&mut self) -> io::Result<()> {
        if self.entered {
            return Ok(());
        }
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        self.terminal.hide_cursor()?;
        // Release events (and bare modifier keys) need the kitty protocol.
        self.enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if self.enhanced {
            execute!(
                self.terminal.backend_mut(),
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                )
            )?;
        } else {
            debug!("terminal lacks keyboard enhancement, modifier state unknown");
        }
        self.entered = true;
        self.redraw();
        Ok(())
    }

    pub fn exit(&mut self) -> io::Result<()> {
        if !self.entered {
            return Ok(());
        }
        if self.enhanced {
            execute!(self.terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
        }
        terminal::disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        self.entered = false;
        Ok(())
    }

    /// Tracks the gesture modifier from key traffic.
    pub fn observe_key(&mut self, key: &KeyEvent) {
        if !self.enhanced {
            return;
        }
        match key.code {
            KeyCode::Modifier(code) if self.modifier.matches_code(code) => {
                self.modifier_held = Some(key.kind != KeyEventKind::Release);
            }
            _ if key.kind == KeyEventKind::Press => {
                self.modifier_held = Some(key.modifiers.intersects(self.modifier.flag()));
            }
            _ => {}
        }
    }

    /// Repaints whatever is current, e.g. after a resize.
    pub fn redraw(&mut self) {
        if !self.entered {
            return;
        }
        let frame = self.last_frame.as_ref();
        let result = self
            .terminal
            .draw(|f| {
                let area = f.area();
                match frame {
                    Some(frame) => render_frame(frame, area, f.buffer_mut()),
                    None => render_idle(area, f.buffer_mut()),
                }
            })
            .map(|_| ())
            .map_err(|err| io::Error::other(err.to_string()));
        if let Err(err) = result {
            warn!("terminal draw failed: {err}");
        }
    }
}

impl OverlaySurface for TerminalSurface {
    fn present(&mut self, frame: &SwitcherFrame) {
        self.last_frame = Some(frame.clone());
        self.redraw();
    }

    fn update(&mut self, frame: &SwitcherFrame) {
        self.last_frame = Some(frame.clone());
        self.redraw();
    }

    fn begin_hide(&mut self) {
        self.last_frame = None;
        self.redraw();
    }

    fn teardown(&mut self) {
        self.last_frame = None;
    }

    fn modifier_held(&mut self) -> Option<bool> {
        if self.enhanced { self.modifier_held } else { None }
    }
}

impl Drop for TerminalSurface {
    fn drop(&mut self) {
        let _ = self.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::TilePreview;
    use crate::layout::pack;
    use crate::preview::Dimensions;

    fn tile(index: usize, class: &str, selected: bool) -> Tile {
        Tile {
            index,
            address: format!("0x{index}"),
            class: class.to_string(),
            title: format!("{class} window"),
            icon: IconRef::Glyph(class.chars().next().unwrap().to_ascii_uppercase()),
            preview: None,
            width: 88,
            selected,
        }
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                out.push_str(buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "));
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn renders_tiles_and_selected_title() {
        let tiles = vec![tile(0, "firefox", false), tile(1, "kitty", true)];
        let frame = SwitcherFrame {
            mode: DisplayMode::Icons,
            rows: pack(tiles.into_iter().map(|t| (t, 88)), 800, 8),
            selected_title: "kitty window".into(),
            max_width: 800,
        };
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        render_frame(&frame, area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains('F'));
        assert!(text.contains('K'));
        assert!(text.contains("kitty window"));
    }

    #[test]
    fn preview_tiles_are_taller() {
        let mut t = tile(0, "mpv", true);
        t.preview = Some(TilePreview {
            path: None,
            dimensions: Dimensions {
                width: 320,
                height: 180,
            },
        });
        assert_eq!(tile_size(&t, DisplayMode::Previews), (11, 13));
        assert_eq!(tile_size(&t, DisplayMode::Icons), (11, 4));
    }

    #[test]
    fn key_bindings_depend_on_phase() {
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(key_action(&tab, false), Some(TerminalKeyAction::Request("next")));
        assert_eq!(key_action(&esc, true), Some(TerminalKeyAction::Request("hide")));
        assert_eq!(key_action(&esc, false), Some(TerminalKeyAction::Quit));
        let release = KeyEvent::new_with_kind(KeyCode::Tab, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(key_action(&release, false), None);
    }
}
