use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::components::grid::truncate;
use crate::components::icons;
use crate::folder::item::ItemKind;
use crate::folder::selection::Selection;
use crate::folder::tree::{ItemTree, Row};
use crate::theme::ThemeColors;

/// Width of the right-hand "modified" column.
const DATE_WIDTH: usize = 16;
/// Width of the comment count column.
const COMMENTS_WIDTH: usize = 5;

/// List view: one line per item with name, comment count and modified date.
pub struct ListWidget<'a> {
    rows: &'a [Row],
    tree: &'a ItemTree,
    selection: &'a Selection,
    focus: usize,
    scroll: usize,
    theme: &'a ThemeColors,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> ListWidget<'a> {
    pub fn new(
        rows: &'a [Row],
        tree: &'a ItemTree,
        selection: &'a Selection,
        theme: &'a ThemeColors,
    ) -> Self {
        Self {
            rows,
            tree,
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

    fn columns(&self, row: &Row) -> (String, String) {
        let Some(item) = self.tree.find_by_id(&row.id) else {
            return (String::new(), String::new());
        };
        let comments = if item.comment_count > 0 {
            format!("💬{}", item.comment_count)
        } else {
            String::new()
        };
        let modified = item
            .updated_at
            .or(item.created_at)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        (comments, modified)
    }
}

impl Widget for ListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if self.rows.is_empty() || inner.height == 0 || inner.width == 0 {
            return;
        }

        let width = inner.width as usize;
        // Metadata columns only when there is room for a usable name column.
        let show_meta = width >= DATE_WIDTH + COMMENTS_WIDTH + 20;
        let name_width = if show_meta {
            width - DATE_WIDTH - COMMENTS_WIDTH - 2
        } else {
            width
        };

        let visible = self
            .rows
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(inner.height as usize);

        for (line, (index, row)) in visible.enumerate() {
            let selected = self.selection.contains(&row.id);
            let mut style = Style::default().fg(icons::item_color(row, self.theme));
            if row.kind == ItemKind::Folder {
                style = style.add_modifier(Modifier::BOLD);
            }
            if selected {
                style = style
                    .bg(self.theme.selected_bg)
                    .fg(self.theme.selected_fg)
                    .add_modifier(Modifier::BOLD);
            } else if index == self.focus {
                style = style.bg(self.theme.focus_bg);
            }

            let marker = if selected { "● " } else { "" };
            let label = format!(
                "{}{}{}",
                marker,
                icons::indicator(row, self.use_icons),
                row.name
            );
            let mut spans = vec![Span::styled(
                format!("{:<width$}", truncate(&label, name_width), width = name_width),
                style,
            )];

            if show_meta {
                let (comments, modified) = self.columns(row);
                let meta_style = if selected {
                    style
                } else {
                    Style::default().fg(self.theme.dim_fg)
                };
                spans.push(Span::styled(
                    format!(" {:>width$}", comments, width = COMMENTS_WIDTH),
                    meta_style,
                ));
                spans.push(Span::styled(
                    format!(" {:>width$}", modified, width = DATE_WIDTH),
                    meta_style,
                ));
            }

            buf.set_line(
                inner.x,
                inner.y + line as u16,
                &Line::from(spans),
                inner.width,
            );
        }
    }
}
