use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::components::list::ListWidget;
use crate::folder::browser::Browser;
use crate::folder::dialog::{ActiveDialog, DialogState, ICON_CHOICES};
use crate::folder::item::{FolderItem, ItemKind, Permissions};
use crate::folder::mutation::delete_prompt;
use crate::theme::{icon_color, ThemeColors};

/// Calculate a centered rectangle within the given area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + area.width.saturating_sub(w) / 2;
    let y = area.y + area.height.saturating_sub(h) / 2;
    Rect::new(x, y, w, h)
}

/// Outer rectangle of `dialog` when drawn in `area`.
pub fn dialog_rect(dialog: &ActiveDialog, area: Rect) -> Rect {
    let wide = 56.min(area.width.saturating_sub(4));
    let (width, height) = match dialog {
        ActiveDialog::None => (0, 0),
        ActiveDialog::NewFolder { .. } | ActiveDialog::Rename { .. } => (50, 7),
        ActiveDialog::Comment { .. } => (wide, 7),
        ActiveDialog::Delete { names, .. } => {
            let longest = names.iter().map(|n| n.chars().count()).max().unwrap_or(10) as u16;
            ((longest + 10).max(40), names.len().min(10) as u16 + 6)
        }
        ActiveDialog::Transfer { .. } => (wide, area.height.saturating_sub(4).clamp(10, 22)),
        ActiveDialog::ChangeIcon { .. } => (40, ICON_CHOICES.len() as u16 + 5),
        ActiveDialog::Details { .. } => (wide, 13),
        ActiveDialog::NotFound { path } => ((path.chars().count() as u16 + 8).max(36), 6),
    };
    centered_rect(width.min(area.width.saturating_sub(4)), height, area)
}

/// Modal overlay for whichever dialog is open.
pub struct DialogWidget<'a> {
    state: &'a DialogState,
    theme: &'a ThemeColors,
    use_icons: bool,
}

impl<'a> DialogWidget<'a> {
    pub fn new(state: &'a DialogState, theme: &'a ThemeColors) -> Self {
        Self {
            state,
            theme,
            use_icons: true,
        }
    }

    pub fn use_icons(mut self, use_icons: bool) -> Self {
        self.use_icons = use_icons;
        self
    }

    fn frame(&self, rect: Rect, title: &str, border: Color, buf: &mut Buffer) -> Rect {
        Clear.render(rect, buf);
        let block = Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(self.theme.dialog_bg))
            .padding(Padding::horizontal(1));
        let inner = block.inner(rect);
        block.render(rect, buf);
        inner
    }

    fn hint(&self, text: &str, inner: Rect, buf: &mut Buffer) {
        if inner.height == 0 {
            return;
        }
        let style = Style::default()
            .fg(self.theme.dim_fg)
            .add_modifier(Modifier::DIM);
        let line = Line::from(Span::styled(text.to_string(), style));
        buf.set_line(inner.x, inner.y + inner.height - 1, &line, inner.width);
    }

    fn text(&self, text: &str, style: Style, inner: Rect, y: u16, buf: &mut Buffer) {
        if y >= inner.height {
            return;
        }
        let line = Line::from(Span::styled(text.to_string(), style));
        buf.set_line(inner.x, inner.y + y, &line, inner.width);
    }

    fn render_input(&self, prompt: &str, inner: Rect, buf: &mut Buffer) {
        self.text(prompt, Style::default().fg(self.theme.item_fg), inner, 0, buf);

        let input = &self.state.input;
        let (before, at, after) = input.split();
        let max_width = inner.width as usize;

        // Truncate from the left if the input is too long.
        let before_len = before.chars().count();
        let room = max_width.saturating_sub(2);
        let before = if before_len > room {
            match before.char_indices().nth(before_len - room) {
                Some((offset, _)) => &before[offset..],
                None => before,
            }
        } else {
            before
        };

        let input_style = Style::default().fg(self.theme.item_fg);
        let cursor_style = Style::default()
            .bg(self.theme.item_fg)
            .fg(self.theme.dialog_bg)
            .add_modifier(Modifier::BOLD);
        let line = Line::from(vec![
            Span::styled(before, input_style),
            Span::styled(at, cursor_style),
            Span::styled(after, input_style),
        ]);
        if inner.height > 1 {
            buf.set_line(inner.x, inner.y + 1, &line, inner.width);
        }

        if let Some(error) = &self.state.error {
            self.text(
                &error.to_string(),
                Style::default().fg(self.theme.error_fg),
                inner,
                3,
                buf,
            );
        }
        self.hint("[Enter] Confirm  [Esc] Cancel", inner, buf);
    }

    fn render_delete(&self, names: &[String], inner: Rect, buf: &mut Buffer) {
        let header = delete_prompt(names.len());
        self.text(
            &header,
            Style::default()
                .fg(self.theme.warning_fg)
                .add_modifier(Modifier::BOLD),
            inner,
            0,
            buf,
        );
        let max_items = inner.height.saturating_sub(3) as usize;
        let overflow = names.len() > max_items;
        let shown = if overflow {
            max_items.saturating_sub(1)
        } else {
            names.len()
        };
        let item_style = Style::default().fg(self.theme.item_fg);
        for (i, name) in names.iter().take(shown).enumerate() {
            self.text(&format!("  • {}", name), item_style, inner, 2 + i as u16, buf);
        }
        if overflow {
            let more = format!("  … and {} more", names.len() - shown);
            self.text(&more, Style::default().fg(self.theme.dim_fg), inner, 2 + shown as u16, buf);
        }
        self.hint("[y] Yes  [n/Esc] Cancel", inner, buf);
    }

    fn render_transfer(&self, names: &[String], picker: &Browser, inner: Rect, buf: &mut Buffer) {
        let what = match names {
            [one] => one.clone(),
            _ => format!("{} items", names.len()),
        };
        self.text(
            &format!("Destination for {}:", what),
            Style::default().fg(self.theme.item_fg),
            inner,
            0,
            buf,
        );
        self.text(
            &picker.current_path,
            Style::default()
                .fg(self.theme.crumb_fg)
                .add_modifier(Modifier::BOLD),
            inner,
            1,
            buf,
        );

        let list_height = inner.height.saturating_sub(5);
        let list_area = Rect::new(inner.x, inner.y + 2, inner.width, list_height);
        let rows = picker.rows();
        if picker.loading {
            self.text("Loading…", Style::default().fg(self.theme.dim_fg), inner, 2, buf);
        } else if rows.is_empty() {
            self.text("(no folders)", Style::default().fg(self.theme.dim_fg), inner, 2, buf);
        } else {
            let visible = list_height.max(1) as usize;
            let scroll = (picker.focus + 1).saturating_sub(visible);
            ListWidget::new(&rows, &picker.tree, &picker.selection, self.theme)
                .focus(picker.focus)
                .scroll(scroll)
                .use_icons(self.use_icons)
                .render(list_area, buf);
        }

        let dest = picker
            .selection
            .ids()
            .first()
            .and_then(|id| picker.tree.find_by_id(id))
            .map(|item| item.path.as_str())
            .unwrap_or(picker.current_path.as_str());
        if inner.height >= 2 {
            self.text(
                &format!("→ {}", dest),
                Style::default().fg(self.theme.accent_fg),
                inner,
                inner.height - 2,
                buf,
            );
        }
        if let Some(error) = &self.state.error {
            if inner.height >= 3 {
                self.text(
                    &error.to_string(),
                    Style::default().fg(self.theme.error_fg),
                    inner,
                    inner.height - 3,
                    buf,
                );
            }
        }
        self.hint(
            "[j/k] Move [l] Open [h] Up [Space] Pick [Enter] OK",
            inner,
            buf,
        );
    }

    fn render_icons(&self, name: &str, choice: usize, inner: Rect, buf: &mut Buffer) {
        self.text(
            &format!("Icon for {}", name),
            Style::default().fg(self.theme.item_fg),
            inner,
            0,
            buf,
        );
        for (i, token) in ICON_CHOICES.iter().enumerate() {
            let color = icon_color(*token).unwrap_or(self.theme.folder_fg);
            let label = token.unwrap_or("default");
            let marker = if i == choice { "▶ " } else { "  " };
            let swatch = if self.use_icons { "\u{f07b} " } else { "■ " };
            let mut style = Style::default().fg(color);
            if i == choice {
                style = style.bg(self.theme.focus_bg).add_modifier(Modifier::BOLD);
            }
            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(self.theme.accent_fg)),
                Span::styled(format!("{}{}", swatch, label), style),
            ]);
            let y = 2 + i as u16;
            if y < inner.height.saturating_sub(1) {
                buf.set_line(inner.x, inner.y + y, &line, inner.width);
            }
        }
        self.hint("[j/k] Choose  [Enter] Apply  [Esc] Cancel", inner, buf);
    }

    fn render_details(&self, item: &FolderItem, inner: Rect, buf: &mut Buffer) {
        let kind = match item.kind {
            ItemKind::Folder => "Folder",
            ItemKind::File => "File",
        };
        let when = |t: Option<chrono::DateTime<chrono::Utc>>| {
            t.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "—".to_string())
        };
        let fields = [
            ("Name", item.name.clone()),
            ("Kind", kind.to_string()),
            ("Path", item.path.clone()),
            ("Icon", item.icon.clone().unwrap_or_else(|| "default".into())),
            ("Created", when(item.created_at)),
            ("Updated", when(item.updated_at)),
            ("Comments", item.comment_count.to_string()),
            ("Access", permission_summary(item.permissions)),
        ];
        let label_style = Style::default()
            .fg(self.theme.accent_fg)
            .add_modifier(Modifier::BOLD);
        let value_style = Style::default().fg(self.theme.item_fg);
        for (i, (label, value)) in fields.iter().enumerate() {
            let y = i as u16;
            if y >= inner.height.saturating_sub(1) {
                break;
            }
            let line = Line::from(vec![
                Span::styled(format!("{:<10}", label), label_style),
                Span::styled(value.clone(), value_style),
            ]);
            buf.set_line(inner.x, inner.y + y, &line, inner.width);
        }
        self.hint("[Enter/Esc] Close", inner, buf);
    }
}

/// Short list of what the user may do with an item.
fn permission_summary(p: Permissions) -> String {
    let granted = [
        (p.can_view, "view"),
        (p.can_edit, "edit"),
        (p.can_delete, "delete"),
        (p.can_move, "move"),
        (p.can_copy, "copy"),
        (p.can_download, "download"),
        (p.can_comment, "comment"),
        (p.can_change_icon, "icon"),
    ];
    let names: Vec<&str> = granted
        .iter()
        .filter(|(allowed, _)| *allowed)
        .map(|(_, name)| *name)
        .collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

impl Widget for DialogWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let active = &self.state.active;
        if !self.state.is_open() {
            return;
        }
        let rect = dialog_rect(active, area);
        let border = match active {
            ActiveDialog::Delete { .. } | ActiveDialog::NotFound { .. } => self.theme.error_fg,
            _ => self.theme.dialog_border_fg,
        };
        let inner = self.frame(rect, active.title(), border, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        match active {
            ActiveDialog::None => {}
            ActiveDialog::NewFolder { parent } => {
                self.render_input(&format!("Folder name in {}:", parent), inner, buf);
            }
            ActiveDialog::Rename { original, .. } => {
                self.render_input(&format!("New name for {}:", original), inner, buf);
            }
            ActiveDialog::Comment { name, .. } => {
                self.render_input(&format!("Comment on {}:", name), inner, buf);
            }
            ActiveDialog::Delete { names, .. } => self.render_delete(names, inner, buf),
            ActiveDialog::Transfer { names, picker, .. } => {
                self.render_transfer(names, picker, inner, buf);
            }
            ActiveDialog::ChangeIcon { name, choice, .. } => {
                self.render_icons(name, *choice, inner, buf);
            }
            ActiveDialog::Details { item } => self.render_details(item, inner, buf),
            ActiveDialog::NotFound { path } => {
                self.text(
                    "Folder not found:",
                    Style::default().fg(self.theme.error_fg),
                    inner,
                    0,
                    buf,
                );
                self.text(path, Style::default().fg(self.theme.item_fg), inner, 1, buf);
                self.hint("[Enter/Esc] Dismiss", inner, buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::folder::browser::ViewMode;
    use crate::folder::item::ItemId;
    use crate::folder::mutation::TransferMode;
    use crate::theme::dark_theme;
    use std::time::Duration;

    fn render(state: &DialogState) -> String {
        let theme = dark_theme();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        DialogWidget::new(state, &theme)
            .use_icons(false)
            .render(area, &mut buf);
        buffer_to_string(&buf, area)
    }

    fn buffer_to_string(buf: &Buffer, area: Rect) -> String {
        let mut s = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                s.push_str(buf[(x, y)].symbol());
            }
            s.push('\n');
        }
        s
    }

    #[test]
    fn rename_shows_prefilled_input() {
        let mut state = DialogState::default();
        state.open(ActiveDialog::Rename {
            id: ItemId::from("a"),
            original: "Budget.xlsx".into(),
        });
        let content = render(&state);
        assert!(content.contains("Rename"));
        assert!(content.contains("Budget.xlsx"));
    }

    #[test]
    fn inline_error_is_shown() {
        let mut state = DialogState::default();
        state.open(ActiveDialog::NewFolder {
            parent: "/Root".into(),
        });
        state.set_error(ValidationError::DuplicateName("Acme".into()));
        let content = render(&state);
        assert!(content.contains("\"Acme\" already exists here"));
    }

    #[test]
    fn delete_lists_targets() {
        let mut state = DialogState::default();
        state.open(ActiveDialog::Delete {
            ids: vec![ItemId::from("1"), ItemId::from("2")],
            names: vec!["file1.txt".into(), "file2.txt".into()],
        });
        let content = render(&state);
        assert!(content.contains("Delete these 2 items?"));
        assert!(content.contains("file1.txt"));
        assert!(content.contains("file2.txt"));
    }

    #[test]
    fn transfer_shows_picker_and_destination() {
        let mut picker = Browser::new("/Root", ViewMode::List, false, Duration::ZERO);
        let generation = picker.generation();
        picker.apply_listing(
            generation,
            "/Root",
            vec![
                FolderItem::folder("a", "/Root", "Archive"),
                FolderItem::folder("d", "/Root", "Drafts"),
            ],
        );
        picker.selection.click(&ItemId::from("d"));
        let mut state = DialogState::default();
        state.open(ActiveDialog::Transfer {
            ids: vec![ItemId::from("f")],
            names: vec!["notes.txt".into()],
            mode: TransferMode::Move,
            picker: Box::new(picker),
        });
        let content = render(&state);
        assert!(content.contains("Move To"));
        assert!(content.contains("Destination for notes.txt"));
        assert!(content.contains("Archive"));
        assert!(content.contains("→ /Root/Drafts"));
    }

    #[test]
    fn icon_choices_mark_current() {
        let mut state = DialogState::default();
        state.open(ActiveDialog::ChangeIcon {
            id: ItemId::from("a"),
            name: "Acme".into(),
            choice: 4,
        });
        let content = render(&state);
        assert!(content.contains("▶ ■ green"));
        assert!(content.contains("default"));
    }

    #[test]
    fn details_list_fields() {
        let mut item = FolderItem::file("r", "/Root", "Report.pdf");
        item.comment_count = 2;
        item.permissions = Permissions::read_only();
        let mut state = DialogState::default();
        state.open(ActiveDialog::Details {
            item: Box::new(item),
        });
        let content = render(&state);
        assert!(content.contains("/Root/Report.pdf"));
        assert!(content.contains("Comments  2"));
        assert!(content.contains("view"));
        assert!(!content.contains("delete"));
    }

    #[test]
    fn closed_dialog_draws_nothing() {
        let state = DialogState::default();
        assert!(render(&state).trim().is_empty());
    }

    #[test]
    fn permission_summary_lists_granted() {
        assert_eq!(permission_summary(Permissions::none()), "none");
        assert!(permission_summary(Permissions::all()).starts_with("view, edit"));
    }
}
