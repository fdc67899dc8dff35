use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::components::address_bar::{crumb_spans, AddressBarWidget};
use crate::components::context_menu::{menu_rect, ContextMenuWidget};
use crate::components::dialog::{dialog_rect, DialogWidget};
use crate::components::grid::{GridLayout, GridWidget};
use crate::components::help::HelpOverlay;
use crate::components::list::ListWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::components::tree::TreeWidget;
use crate::folder::address::AddressBar;
use crate::folder::browser::ViewMode;
use crate::folder::path;
use crate::folder::selection::Bounds;

/// Render the application UI and record where everything was drawn.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let [address_area, content_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_address(app, frame, address_area);
    render_content(app, frame, content_area);
    render_status(app, frame, status_area);

    app.layout.menu = app.menu.as_ref().map(|menu| menu_rect(menu, area));
    if let Some(menu) = &app.menu {
        frame.render_widget(ContextMenuWidget::new(menu, &app.theme), area);
    }

    app.layout.dialog = app
        .dialog
        .is_open()
        .then(|| dialog_rect(&app.dialog.active, area));
    if app.dialog.is_open() {
        frame.render_widget(
            DialogWidget::new(&app.dialog, &app.theme).use_icons(app.use_icons),
            area,
        );
    }

    if app.show_help {
        frame.render_widget(HelpOverlay::new(&app.theme, app.help_scroll), area);
    }
}

fn render_address(app: &mut App, frame: &mut Frame, area: Rect) {
    let crumbs = AddressBar::crumbs(&app.browser.current_path, &app.browser.root);
    app.layout.address = area;
    app.layout.crumbs = if app.browser.address.is_editing() {
        Vec::new()
    } else {
        // Crumbs start inside the left border.
        crumb_spans(&crumbs, area.x + 1)
    };
    let widget = AddressBarWidget::new(&app.browser.address, &crumbs, &app.theme)
        .loading(app.browser.loading)
        .typing(app.address_typing());
    frame.render_widget(widget, area);
}

fn render_content(app: &mut App, frame: &mut Frame, area: Rect) {
    let title = if app.browser.is_search_results() {
        " Search results ".to_string()
    } else {
        format!(" {} ", path::file_name(&app.browser.current_path))
    };
    let focused = !app.address_typing();
    let border = if focused {
        app.theme.border_focused_fg
    } else {
        app.theme.border_fg
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(border));
    if app.browser.filtering || !app.browser.filter.is_empty() {
        let cursor = if app.browser.filtering { "▏" } else { "" };
        block = block.title_bottom(Line::from(Span::styled(
            format!(" /{}{} ", app.browser.filter, cursor),
            Style::default().fg(app.theme.accent_fg),
        )));
    }
    let inner = block.inner(area);

    let grid = match app.browser.view {
        ViewMode::Grid => GridLayout::grid(inner.width, app.grid_cell_width),
        ViewMode::List | ViewMode::Tree => GridLayout::rows(inner.width),
    };
    let rows = app.browser.rows();
    app.browser
        .update_scroll(grid.visible_lines(inner.height).max(1), grid.columns);
    app.layout.content = inner;
    app.layout.grid = grid;
    app.layout.boxes = grid.boxes(&rows);

    if rows.is_empty() {
        let message = if app.browser.loading {
            "Loading…"
        } else if !app.browser.filter.is_empty() {
            "No matching items"
        } else if app.browser.is_search_results() {
            "No results"
        } else {
            "This folder is empty"
        };
        let placeholder = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default()
                .fg(app.theme.dim_fg)
                .add_modifier(Modifier::ITALIC),
        )))
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let browser = &app.browser;
    match browser.view {
        ViewMode::Grid => frame.render_widget(
            GridWidget::new(&rows, &browser.selection, grid, &app.theme)
                .focus(browser.focus)
                .scroll(browser.scroll)
                .use_icons(app.use_icons)
                .block(block),
            area,
        ),
        ViewMode::List => frame.render_widget(
            ListWidget::new(&rows, &browser.tree, &browser.selection, &app.theme)
                .focus(browser.focus)
                .scroll(browser.scroll)
                .use_icons(app.use_icons)
                .block(block),
            area,
        ),
        ViewMode::Tree => frame.render_widget(
            TreeWidget::new(&rows, &browser.selection, &app.theme)
                .focus(browser.focus)
                .scroll(browser.scroll)
                .use_icons(app.use_icons)
                .block(block),
            area,
        ),
    }

    if let Some(drag) = browser.selection.drag() {
        let scroll_lines = browser.scroll as i32 * grid.cell_height as i32;
        draw_drag_box(
            frame.buffer_mut(),
            inner,
            drag.bounds(),
            scroll_lines,
            Style::default().fg(app.theme.drag_box_fg),
        );
    }
}

/// Outline a drag box given in content coordinates, clipped to `inner`.
fn draw_drag_box(buf: &mut Buffer, inner: Rect, bounds: Bounds, scroll_lines: i32, style: Style) {
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let min_x = inner.x as i32;
    let min_y = inner.y as i32;
    let max_x = (inner.x + inner.width) as i32 - 1;
    let max_y = (inner.y + inner.height) as i32 - 1;

    let left = min_x + bounds.left;
    let right = min_x + bounds.right;
    let top = min_y + bounds.top - scroll_lines;
    let bottom = min_y + bounds.bottom - scroll_lines;

    let mut put = |x: i32, y: i32, symbol: &str| {
        if (min_x..=max_x).contains(&x) && (min_y..=max_y).contains(&y) {
            let cell = &mut buf[(x as u16, y as u16)];
            cell.set_symbol(symbol);
            cell.set_style(style);
        }
    };

    for x in left..=right {
        put(x, top, "─");
        put(x, bottom, "─");
    }
    for y in top..=bottom {
        put(left, y, "│");
        put(right, y, "│");
    }
    put(left, top, "┌");
    put(right, top, "┐");
    put(left, bottom, "└");
    put(right, bottom, "┘");
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let browser = &app.browser;
    let count = browser.rows().len();
    let info = format!(
        "{} items · {} · {}",
        count,
        browser.view.label(),
        browser.tree.sort_by.label()
    );
    let mut widget = StatusBarWidget::new(&browser.current_path, &info, &app.theme)
        .selection(browser.selection.len());
    if let Some(toast) = &app.toast {
        widget = widget.toast(&toast.message, toast.kind);
    }
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::dispatch::Target;
    use crate::event::ApiEvent;
    use crate::folder::item::FolderItem;
    use ratatui::{backend::TestBackend, Terminal};

    fn app() -> App {
        let mut config = AppConfig::default();
        config.general.root_path = Some("/Root".into());
        config.browser.view = Some("grid".into());
        let mut app = App::new(&config);
        app.use_icons = false;
        app.start("/Root");
        let generation = app.browser.generation();
        app.handle_api(ApiEvent::Listed {
            target: Target::Main,
            generation,
            path: "/Root".into(),
            result: Ok(vec![
                FolderItem::folder("a", "/Root", "Acme"),
                FolderItem::file("f", "/Root", "notes.txt"),
            ]),
        });
        app
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn frame_records_layout() {
        let mut app = app();
        let text = draw(&mut app);
        assert!(text.contains("Acme"));
        assert!(text.contains("notes.txt"));
        assert_eq!(app.layout.content, Rect::new(1, 4, 58, 10));
        assert_eq!(app.layout.boxes.len(), 2);
        assert_eq!(app.layout.crumbs.len(), 1);
        assert!(app.layout.menu.is_none());
    }

    #[test]
    fn menu_rect_is_recorded() {
        let mut app = app();
        draw(&mut app);
        let anchor = app.focus_anchor();
        app.open_menu(anchor);
        let text = draw(&mut app);
        assert!(app.layout.menu.is_some());
        assert!(text.contains("Rename"));
    }

    #[test]
    fn empty_folder_placeholder() {
        let mut config = AppConfig::default();
        config.general.root_path = Some("/Root".into());
        let mut app = App::new(&config);
        app.start("/Root");
        let generation = app.browser.generation();
        app.handle_api(ApiEvent::Listed {
            target: Target::Main,
            generation,
            path: "/Root".into(),
            result: Ok(Vec::new()),
        });
        assert!(draw(&mut app).contains("This folder is empty"));
    }

    #[test]
    fn drag_box_is_clipped() {
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        let inner = Rect::new(1, 1, 8, 3);
        draw_drag_box(&mut buf, inner, Bounds::new(0, 0, 20, 2), 0, Style::default());
        assert_eq!(buf[(1, 1)].symbol(), "┌");
        assert_eq!(buf[(1, 2)].symbol(), "│");
        assert_eq!(buf[(1, 3)].symbol(), "└");
        assert_eq!(buf[(8, 1)].symbol(), "─");
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }
}
