use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::components::dialog::centered_rect;
use crate::theme::ThemeColors;

/// `(key, description)` for one binding.
type KeyEntry = (&'static str, &'static str);

/// A category of keybindings.
struct KeyCategory {
    name: &'static str,
    entries: &'static [KeyEntry],
}

const NAVIGATION_KEYS: &[KeyEntry] = &[
    ("j / ↓", "Move down (one row of cells in grid view)"),
    ("k / ↑", "Move up"),
    ("h / l", "Grid: previous / next cell"),
    ("g / Home", "Jump to first item"),
    ("G / End", "Jump to last item"),
    ("PgUp / PgDn", "Page up / page down"),
    ("Enter", "Open folder / show file details"),
    ("Backspace", "Go to parent folder"),
    ("l / →", "List: open folder, Tree: expand"),
    ("h / ←", "List: parent folder, Tree: collapse"),
    ("L", "Tree: reload folder"),
    ("v", "Cycle view (grid → list → tree)"),
    ("s", "Cycle sort (name → created → updated)"),
    ("R / F5", "Refresh"),
];

const SELECTION_KEYS: &[KeyEntry] = &[
    ("Space", "Toggle item"),
    ("J / K", "Extend selection down / up"),
    ("a / Ctrl+A", "Select all"),
    ("Esc", "Clear selection"),
    ("Click", "Select item"),
    ("Ctrl+Click", "Add / remove item"),
    ("Shift+Click", "Select range"),
    ("Drag", "Box-select items"),
    ("Double-click", "Open"),
];

const ACTION_KEYS: &[KeyEntry] = &[
    ("Tab / Right-click", "Context menu"),
    ("n", "New folder"),
    ("r / F2", "Rename"),
    ("m", "Move to…"),
    ("y", "Copy to…"),
    ("d / Delete", "Delete"),
    ("c", "Add comment"),
    ("i", "Change folder icon"),
    ("D", "Details"),
];

const ADDRESS_KEYS: &[KeyEntry] = &[
    ("e / Ctrl+L", "Edit path"),
    ("Ctrl+F", "Search"),
    ("Enter", "Go to path / run search"),
    ("Esc", "Back to breadcrumbs"),
    ("/", "Filter current listing"),
];

const GENERAL_KEYS: &[KeyEntry] = &[
    ("?", "Toggle this help overlay"),
    ("q", "Quit"),
    ("Ctrl+C", "Quit"),
];

const CATEGORIES: &[KeyCategory] = &[
    KeyCategory {
        name: "Navigation",
        entries: NAVIGATION_KEYS,
    },
    KeyCategory {
        name: "Selection",
        entries: SELECTION_KEYS,
    },
    KeyCategory {
        name: "Item Actions",
        entries: ACTION_KEYS,
    },
    KeyCategory {
        name: "Address Bar & Filter",
        entries: ADDRESS_KEYS,
    },
    KeyCategory {
        name: "General",
        entries: GENERAL_KEYS,
    },
];

/// Help overlay widget showing all keybindings.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
    scroll_offset: usize,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a ThemeColors, scroll_offset: usize) -> Self {
        Self {
            theme,
            scroll_offset,
        }
    }

    /// Build all the lines for the help content.
    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();

        // Title
        lines.push(Line::from(vec![Span::styled(
            " Keybinding Reference ",
            Style::default()
                .fg(self.theme.accent_fg)
                .add_modifier(Modifier::BOLD),
        )]));
        lines.push(Line::from(""));

        for category in CATEGORIES {
            // Category header
            lines.push(Line::from(vec![
                Span::styled(
                    format!("── {} ", category.name),
                    Style::default()
                        .fg(self.theme.accent_fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("─".repeat(40), Style::default().fg(self.theme.dim_fg)),
            ]));

            for (key, description) in category.entries {
                let key_width = 20;
                let key_padded = format!("  {:<width$}", key, width = key_width);
                lines.push(Line::from(vec![
                    Span::styled(
                        key_padded,
                        Style::default()
                            .fg(self.theme.warning_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        description.to_string(),
                        Style::default().fg(self.theme.file_fg),
                    ),
                ]));
            }

            lines.push(Line::from(""));
        }

        // Footer
        lines.push(Line::from(vec![Span::styled(
            " Press ? or Esc to close ",
            Style::default().fg(self.theme.dim_fg),
        )]));

        lines
    }

    /// Get total number of content lines (for scroll bounds).
    pub fn total_lines() -> usize {
        let mut count = 2; // title + blank
        for category in CATEGORIES {
            count += 1; // header
            count += category.entries.len();
            count += 1; // blank separator
        }
        count += 1; // footer
        count
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let overlay_width = (area.width as f32 * 0.70).min(80.0) as u16;
        let overlay_height = (area.height as f32 * 0.80).min(50.0) as u16;
        let overlay_area = centered_rect(overlay_width, overlay_height, area);
        Clear.render(overlay_area, buf);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused_fg))
            .style(Style::default().bg(self.theme.dialog_bg));

        let inner = block.inner(overlay_area);
        block.render(overlay_area, buf);

        let content_lines = self.build_content_lines();
        let visible_height = inner.height as usize;

        let scroll = self
            .scroll_offset
            .min(content_lines.len().saturating_sub(visible_height));

        for (i, line) in content_lines
            .iter()
            .skip(scroll)
            .take(visible_height)
            .enumerate()
        {
            let line_y = inner.y + i as u16;
            if line_y >= inner.y + inner.height {
                break;
            }
            buf.set_line(inner.x + 1, line_y, line, inner.width.saturating_sub(2));
        }

        // Draw scroll indicator if content overflows
        if content_lines.len() > visible_height {
            let total = content_lines.len();
            let indicator = format!(" {}/{} ", (scroll + 1).min(total), total);
            let ind_span = Span::styled(indicator, Style::default().fg(self.theme.dim_fg));
            let ind_x = overlay_area.x
                + overlay_area
                    .width
                    .saturating_sub(ind_span.width() as u16 + 1);
            let ind_y = overlay_area.y + overlay_area.height - 1;
            buf.set_span(ind_x, ind_y, &ind_span, ind_span.width() as u16);
        }
    }
}
