use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::components::icons;
use crate::folder::item::ItemKind;
use crate::folder::selection::Selection;
use crate::folder::tree::Row;
use crate::theme::ThemeColors;

/// Tree view: nested rows drawn with box-drawing characters.
pub struct TreeWidget<'a> {
    rows: &'a [Row],
    selection: &'a Selection,
    focus: usize,
    scroll: usize,
    theme: &'a ThemeColors,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> TreeWidget<'a> {
    pub fn new(rows: &'a [Row], selection: &'a Selection, theme: &'a ThemeColors) -> Self {
        Self {
            rows,
            selection,
            focus: 0,
            scroll: 0,
            theme,
            use_icons: true,
            block: None,
        }
    }

    pub fn focus(mut self, focus: usize) -> Self {
        self.focus = focus;
        self
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn use_icons(mut self, use_icons: bool) -> Self {
        self.use_icons = use_icons;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Indentation for `rows[index]`.
    ///
    /// Each ancestor level draws a continuation line unless that ancestor was
    /// the last of its siblings, so we walk back to find it.
    fn build_prefix(rows: &[Row], index: usize) -> String {
        let row = &rows[index];
        if row.depth == 0 {
            return String::new();
        }

        let mut prefix = String::new();
        for d in 1..row.depth {
            let mut ancestor_is_last = false;
            for earlier in rows[..index].iter().rev() {
                if earlier.depth == d {
                    ancestor_is_last = earlier.is_last_sibling;
                    break;
                }
                if earlier.depth < d {
                    break;
                }
            }
            prefix.push_str(if ancestor_is_last { "   " } else { "│  " });
        }
        prefix.push_str(if row.is_last_sibling { "└──" } else { "├──" });
        prefix
    }
}

impl Widget for TreeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if self.rows.is_empty() || inner.height == 0 {
            return;
        }

        let visible = self
            .rows
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(inner.height as usize);

        for (line, (index, row)) in visible.enumerate() {
            let selected = self.selection.contains(&row.id);
            let style = if selected {
                Style::default()
                    .bg(self.theme.selected_bg)
                    .fg(self.theme.selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else if index == self.focus {
                Style::default()
                    .bg(self.theme.focus_bg)
                    .fg(icons::item_color(row, self.theme))
            } else {
                let style = Style::default().fg(icons::item_color(row, self.theme));
                match row.kind {
                    ItemKind::Folder => style.add_modifier(Modifier::BOLD),
                    ItemKind::File => style,
                }
            };

            let prefix = Self::build_prefix(self.rows, index);
            let marker = if selected { "● " } else { "" };
            let text = format!(
                "{}{}{}{}",
                prefix,
                marker,
                icons::indicator(row, self.use_icons),
                row.name
            );
            let line_text = Line::from(Span::styled(text, style));
            buf.set_line(inner.x, inner.y + line as u16, &line_text, inner.width);
        }
    }
}
