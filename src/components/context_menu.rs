use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::folder::menu::ContextMenu;
use crate::theme::ThemeColors;

/// Where the menu is drawn: at its anchor, shifted to stay inside `area`.
///
/// Entries occupy the lines between the top and bottom borders, in order.
pub fn menu_rect(menu: &ContextMenu, area: Rect) -> Rect {
    let label_width = menu
        .actions
        .iter()
        .map(|a| a.label().chars().count() + a.key_hint().chars().count() + 3)
        .max()
        .unwrap_or(0) as u16;
    let width = (label_width + 2).min(area.width);
    let height = (menu.actions.len() as u16 + 2).min(area.height);

    let (ax, ay) = menu.anchor;
    let max_x = (area.x + area.width).saturating_sub(width);
    let max_y = (area.y + area.height).saturating_sub(height);
    Rect::new(ax.clamp(area.x, max_x.max(area.x)), ay.clamp(area.y, max_y.max(area.y)), width, height)
}

pub struct ContextMenuWidget<'a> {
    menu: &'a ContextMenu,
    theme: &'a ThemeColors,
}

impl<'a> ContextMenuWidget<'a> {
    pub fn new(menu: &'a ContextMenu, theme: &'a ThemeColors) -> Self {
        Self { menu, theme }
    }
}

impl Widget for ContextMenuWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rect = menu_rect(self.menu, area);
        Clear.render(rect, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.dialog_border_fg))
            .style(Style::default().bg(self.theme.dialog_bg));
        let inner = block.inner(rect);
        block.render(rect, buf);

        let width = inner.width as usize;
        for (i, action) in self.menu.actions.iter().enumerate().take(inner.height as usize) {
            let style = if i == self.menu.focus {
                Style::default()
                    .bg(self.theme.selected_bg)
                    .fg(self.theme.selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.item_fg)
            };
            let label = action.label();
            let hint = action.key_hint();
            let pad = width.saturating_sub(label.chars().count() + hint.chars().count() + 1);
            let line = Line::from(vec![
                Span::styled(format!(" {}{}", label, " ".repeat(pad)), style),
                Span::styled(
                    hint,
                    if i == self.menu.focus {
                        style
                    } else {
                        Style::default().fg(self.theme.dim_fg)
                    },
                ),
            ]);
            buf.set_line(inner.x, inner.y + i as u16, &line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folder::menu::ContextAction;
    use crate::theme::dark_theme;

    fn menu(anchor: (u16, u16)) -> ContextMenu {
        ContextMenu::new(
            vec![ContextAction::Open, ContextAction::Rename, ContextAction::Delete],
            anchor,
        )
    }

    #[test]
    fn rect_sits_at_anchor() {
        let rect = menu_rect(&menu((5, 4)), Rect::new(0, 0, 80, 24));
        assert_eq!((rect.x, rect.y), (5, 4));
        assert_eq!(rect.height, 5);
    }

    #[test]
    fn rect_is_pushed_inside_area() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = menu_rect(&menu((38, 9)), area);
        assert!(rect.x + rect.width <= 40);
        assert!(rect.y + rect.height <= 10);
    }

    #[test]
    fn entries_render_in_order_with_focus() {
        let mut menu = menu((0, 0));
        menu.next();
        let theme = dark_theme();
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        ContextMenuWidget::new(&menu, &theme).render(area, &mut buf);

        let line = |y: u16| -> String {
            (0..area.width)
                .map(|x| buf[(x, y)].symbol().to_string())
                .collect()
        };
        assert!(line(1).contains("Open"));
        assert!(line(2).contains("Rename"));
        assert!(line(3).contains("Delete"));
        assert_eq!(buf[(1, 2)].bg, theme.selected_bg);
    }
}
