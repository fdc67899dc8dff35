use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::app::ToastKind;
use crate::components::grid::truncate;
use crate::theme::ThemeColors;

const DEFAULT_HINTS: &str = " ?:help  Tab:menu  n:new  r:ren  d:del ";

/// Bottom line: current path, view info, toast and key hints.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    info: &'a str,
    theme: &'a ThemeColors,
    toast: Option<(&'a str, ToastKind)>,
    selection: usize,
    hints: &'a str,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, info: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            path_str,
            info,
            theme,
            toast: None,
            selection: 0,
            hints: DEFAULT_HINTS,
        }
    }

    pub fn toast(mut self, message: &'a str, kind: ToastKind) -> Self {
        self.toast = Some((message, kind));
        self
    }

    pub fn selection(mut self, count: usize) -> Self {
        self.selection = count;
        self
    }

    pub fn hints(mut self, hints: &'a str) -> Self {
        self.hints = hints;
        self
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;
        buf.set_style(area, Style::default().bg(self.theme.status_bg));

        if let Some((msg, kind)) = self.toast {
            let style = match kind {
                ToastKind::Error => Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_bg)
                    .add_modifier(Modifier::BOLD),
                ToastKind::Success => Style::default().fg(self.theme.success_fg),
                ToastKind::Info => Style::default().fg(self.theme.info_fg),
            };
            let display = format!("{:<width$}", truncate(msg, width), width = width);
            buf.set_line(area.x, area.y, &Line::from(Span::styled(display, style)), area.width);
            return;
        }

        // [path]  [selection] [info]      [hints]
        let hints_len = self.hints.chars().count();
        let hints = if hints_len * 2 > width { "" } else { self.hints };
        let remaining = width.saturating_sub(hints.chars().count());

        let selection = if self.selection > 0 {
            format!(" {} selected ", self.selection)
        } else {
            String::new()
        };
        let info = format!("{} ", self.info);
        let right_len = selection.chars().count() + info.chars().count();
        let path_budget = remaining.saturating_sub(right_len + 1);

        let path_len = self.path_str.chars().count();
        let path_display = if path_len > path_budget {
            if path_budget > 3 {
                // Keep the tail: the deepest folder is the useful part.
                let tail: String = self
                    .path_str
                    .chars()
                    .skip(path_len - (path_budget - 3))
                    .collect();
                format!("...{}", tail)
            } else {
                String::new()
            }
        } else {
            self.path_str.to_string()
        };

        let gap = remaining
            .saturating_sub(path_display.chars().count())
            .saturating_sub(right_len);

        let mut spans = vec![
            Span::styled(
                format!(" {}", path_display),
                Style::default().fg(self.theme.status_fg),
            ),
            Span::raw(" ".repeat(gap.saturating_sub(1))),
        ];
        if !selection.is_empty() {
            spans.push(Span::styled(
                selection,
                Style::default()
                    .fg(self.theme.accent_fg)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        spans.push(Span::styled(info, Style::default().fg(self.theme.info_fg)));
        spans.push(Span::styled(
            hints,
            Style::default()
                .fg(self.theme.dim_fg)
                .add_modifier(Modifier::DIM),
        ));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
