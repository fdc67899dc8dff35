use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::folder::address::{AddressBar, AddressMode};
use crate::folder::input::TextInput;
use crate::theme::ThemeColors;

const SEPARATOR: &str = " › ";

/// Screen columns `[start, end)` of each crumb label when drawn from `x`.
///
/// The widget and mouse hit-testing both use this so clicks land on the
/// crumb that was drawn there.
pub fn crumb_spans(crumbs: &[(String, String)], x: u16) -> Vec<(u16, u16)> {
    let sep = SEPARATOR.chars().count() as u16;
    let mut spans = Vec::with_capacity(crumbs.len());
    let mut start = x;
    for (i, (label, _)) in crumbs.iter().enumerate() {
        if i > 0 {
            start = start.saturating_add(sep);
        }
        let end = start.saturating_add(label.chars().count() as u16);
        spans.push((start, end));
        start = end;
    }
    spans
}

/// Breadcrumbs, or the path/search input while editing.
pub struct AddressBarWidget<'a> {
    bar: &'a AddressBar,
    crumbs: &'a [(String, String)],
    theme: &'a ThemeColors,
    loading: bool,
    typing: bool,
}

impl<'a> AddressBarWidget<'a> {
    pub fn new(bar: &'a AddressBar, crumbs: &'a [(String, String)], theme: &'a ThemeColors) -> Self {
        Self {
            bar,
            crumbs,
            theme,
            loading: false,
            typing: false,
        }
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Draw a cursor in the input (keys go to it).
    pub fn typing(mut self, typing: bool) -> Self {
        self.typing = typing;
        self
    }

    fn crumb_line(&self) -> Line<'a> {
        let mut spans = Vec::new();
        let last = self.crumbs.len().saturating_sub(1);
        for (i, (label, _)) in self.crumbs.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(SEPARATOR, Style::default().fg(self.theme.dim_fg)));
            }
            let mut style = Style::default().fg(self.theme.crumb_fg);
            if i == last {
                style = style.add_modifier(Modifier::BOLD);
            } else {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            spans.push(Span::styled(label.clone(), style));
        }
        Line::from(spans)
    }

    fn input_line(&self, prefix: &'static str, input: &'a TextInput, width: usize) -> Line<'a> {
        let text_style = Style::default().fg(self.theme.item_fg);
        let mut spans = vec![Span::styled(
            prefix,
            Style::default()
                .fg(self.theme.accent_fg)
                .add_modifier(Modifier::BOLD),
        )];
        if !self.typing {
            spans.push(Span::styled(input.value.as_str(), text_style));
            return Line::from(spans);
        }

        let (before, at, after) = input.split();
        // Keep the cursor in view by dropping characters from the left.
        let room = width.saturating_sub(prefix.chars().count() + 1);
        let before_len = before.chars().count();
        let before = if before_len > room {
            let skip = before_len - room;
            match before.char_indices().nth(skip) {
                Some((offset, _)) => &before[offset..],
                None => before,
            }
        } else {
            before
        };
        let at = if at.is_empty() { " " } else { at };
        spans.push(Span::styled(before, text_style));
        spans.push(Span::styled(
            at,
            Style::default()
                .bg(self.theme.item_fg)
                .fg(self.theme.address_bg),
        ));
        spans.push(Span::styled(after, text_style));
        Line::from(spans)
    }
}

impl Widget for AddressBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.bar.is_editing() {
            self.theme.border_focused_fg
        } else {
            self.theme.border_fg
        };
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(self.theme.address_bg));
        if self.loading {
            block = block.title_bottom(Line::from(" loading… ").right_aligned());
        }
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let width = inner.width as usize;
        let line = match &self.bar.mode {
            AddressMode::Breadcrumbs => self.crumb_line(),
            AddressMode::Editing(input) => self.input_line("", input, width),
            AddressMode::Search(input) => self.input_line("Search: ", input, width),
        };
        buf.set_line(inner.x, inner.y, &line, inner.width);
    }
}
