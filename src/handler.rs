use std::time::Instant;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::App;
use crate::components::help::HelpOverlay;
use crate::folder::browser::ViewMode;
use crate::folder::dialog::ActiveDialog;
use crate::folder::input::TextInput;
use crate::folder::menu::ContextAction;
use crate::folder::selection::PointerButton;

/// Handle a key event. The innermost open layer gets it first: help, menu,
/// dialog, address bar, filter, then the listing.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if app.show_help {
        handle_help_key(app, key);
    } else if app.menu.is_some() {
        handle_menu_key(app, key);
    } else if app.dialog.is_open() {
        handle_dialog_key(app, key);
    } else if app.address_typing() {
        handle_address_key(app, key);
    } else if app.browser.filtering {
        handle_filter_key(app, key);
    } else {
        handle_normal_key(app, key);
    }
}

fn handle_help_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
            app.show_help = false;
            app.help_scroll = 0;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.help_scroll = (app.help_scroll + 1).min(HelpOverlay::total_lines());
        }
        KeyCode::Up | KeyCode::Char('k') => app.help_scroll = app.help_scroll.saturating_sub(1),
        _ => {}
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    let Some(menu) = app.menu.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => menu.next(),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => menu.previous(),
        KeyCode::Enter => app.activate_menu(),
        KeyCode::Esc | KeyCode::Char('q') => app.close_menu(),
        _ => {}
    }
}

/// Line editing shared by the dialog input and the address bar.
fn edit_input(input: &mut TextInput, code: KeyCode) -> bool {
    match code {
        KeyCode::Char(c) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => return false,
    }
    true
}

fn handle_dialog_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.cancel_dialog();
        return;
    }
    if key.code == KeyCode::Enter {
        app.submit_dialog();
        return;
    }

    match &app.dialog.active {
        dialog if dialog.takes_text() => {
            if edit_input(&mut app.dialog.input, key.code) {
                app.dialog.error = None;
            }
        }
        ActiveDialog::Transfer { .. } => match key.code {
            KeyCode::Down | KeyCode::Char('j') => app.picker_move_focus(1),
            KeyCode::Up | KeyCode::Char('k') => app.picker_move_focus(-1),
            KeyCode::Right | KeyCode::Char('l') => app.picker_open(),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Backspace => app.picker_go_up(),
            KeyCode::Char(' ') => app.picker_toggle(),
            _ => {}
        },
        ActiveDialog::ChangeIcon { .. } => match key.code {
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
                app.dialog.cycle_icon(1)
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
                app.dialog.cycle_icon(-1)
            }
            _ => {}
        },
        ActiveDialog::Delete { .. } => match key.code {
            KeyCode::Char('y') => app.submit_dialog(),
            KeyCode::Char('n') => app.cancel_dialog(),
            _ => {}
        },
        _ => {}
    }
}

fn handle_address_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_address(),
        KeyCode::Esc => app.cancel_address(),
        code => {
            if let Some(input) = app.browser.address.input_mut() {
                edit_input(input, code);
            }
        }
    }
}

fn handle_filter_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.end_filter(true),
        KeyCode::Esc => app.end_filter(false),
        KeyCode::Backspace => app.filter_pop(),
        KeyCode::Char(c) => app.filter_push(c),
        _ => {}
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    let step = app.line_step() as isize;
    let view = app.browser.view;

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('l') if ctrl => app.begin_address_edit(),
        KeyCode::Char('f') if ctrl => app.begin_search(),
        KeyCode::Char('a') if ctrl => app.select_all(),

        // Focus
        KeyCode::Down | KeyCode::Char('j') => app.move_focus(step, shift),
        KeyCode::Up | KeyCode::Char('k') => app.move_focus(-step, shift),
        KeyCode::Char('J') => app.move_focus(step, true),
        KeyCode::Char('K') => app.move_focus(-step, true),
        KeyCode::Right | KeyCode::Char('l') => match view {
            ViewMode::Grid => app.move_focus(1, shift),
            ViewMode::List => app.open_focused(),
            ViewMode::Tree => app.expand_focused(),
        },
        KeyCode::Left | KeyCode::Char('h') => match view {
            ViewMode::Grid => app.move_focus(-1, shift),
            ViewMode::List => app.go_up(),
            ViewMode::Tree => app.collapse_focused(),
        },
        KeyCode::Home | KeyCode::Char('g') => app.browser.focus_first(),
        KeyCode::End | KeyCode::Char('G') => app.browser.focus_last(),
        KeyCode::PageDown => app.move_focus(step * 10, shift),
        KeyCode::PageUp => app.move_focus(-step * 10, shift),

        // Navigation
        KeyCode::Enter => app.open_focused(),
        KeyCode::Backspace => app.go_up(),
        KeyCode::Char('R') | KeyCode::F(5) => app.refresh(),
        KeyCode::Char('L') if view == ViewMode::Tree => app.reload_focused(),
        KeyCode::Char('e') => app.begin_address_edit(),
        KeyCode::Char('/') => app.begin_filter(),
        KeyCode::Char('v') => app.cycle_view(),
        KeyCode::Char('s') => app.cycle_sort(),

        // Selection
        KeyCode::Char(' ') => app.toggle_focused(),
        KeyCode::Char('a') => app.select_all(),
        KeyCode::Esc => app.clear_selection(),

        // Actions
        KeyCode::Tab => {
            let anchor = app.focus_anchor();
            app.open_menu(anchor);
        }
        KeyCode::Char('n') => app.run_action(ContextAction::NewFolder),
        KeyCode::Char('r') | KeyCode::F(2) => app.run_action(ContextAction::Rename),
        KeyCode::Char('m') => app.run_action(ContextAction::Move),
        KeyCode::Char('y') => app.run_action(ContextAction::Copy),
        KeyCode::Char('d') | KeyCode::Delete => app.run_action(ContextAction::Delete),
        KeyCode::Char('c') => app.run_action(ContextAction::Comment),
        KeyCode::Char('i') => app.run_action(ContextAction::ChangeIcon),
        KeyCode::Char('D') => app.run_action(ContextAction::Details),
        _ => {}
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

/// Handle a mouse event.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, now: Instant) {
    let ctrl = mouse.modifiers.contains(KeyModifiers::CONTROL);
    let shift = mouse.modifiers.contains(KeyModifiers::SHIFT);
    match mouse.kind {
        MouseEventKind::Down(button) => app.mouse_down(
            mouse.column,
            mouse.row,
            pointer_button(button),
            ctrl,
            shift,
            now,
        ),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.mouse_up(now),
        MouseEventKind::ScrollDown => app.scroll_by(1),
        MouseEventKind::ScrollUp => app.scroll_by(-1),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::dispatch::{Request, Target};
    use crate::event::ApiEvent;
    use crate::folder::item::FolderItem;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn loaded_app() -> App {
        let mut config = AppConfig::default();
        config.general.root_path = Some("/Root".into());
        config.browser.view = Some("list".into());
        let mut app = App::new(&config);
        app.start("/Root");
        let Some(Request::List {
            generation, path, ..
        }) = app.take_requests().pop()
        else {
            panic!("expected list request");
        };
        app.handle_api(ApiEvent::Listed {
            target: Target::Main,
            generation,
            path,
            result: Ok(vec![
                FolderItem::folder("a", "/Root", "Acme"),
                FolderItem::folder("b", "/Root", "Beta"),
                FolderItem::file("f", "/Root", "notes.txt"),
            ]),
        });
        app
    }

    #[test]
    fn q_and_ctrl_c_quit() {
        let mut app = loaded_app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = loaded_app();
        handle_key_event(&mut app, ctrl('c'));
        assert!(app.should_quit);
    }

    #[test]
    fn dialog_captures_typing() {
        let mut app = loaded_app();
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        assert!(matches!(app.dialog.active, ActiveDialog::NewFolder { .. }));
        for c in "q1".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        assert!(!app.should_quit);
        assert_eq!(app.dialog.input.value, "q1");
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.dialog.is_open());
    }

    #[test]
    fn space_and_shift_move_build_selection() {
        let mut app = loaded_app();
        handle_key_event(&mut app, key(KeyCode::Char(' ')));
        assert_eq!(app.browser.selection.len(), 1);
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT));
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Down, KeyModifiers::SHIFT));
        assert_eq!(app.browser.selection.len(), 3);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(app.browser.selection.is_empty());
    }

    #[test]
    fn enter_opens_folder_in_list_view() {
        let mut app = loaded_app();
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.browser.current_path, "/Root/Acme");
        handle_key_event(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.browser.current_path, "/Root");
    }

    #[test]
    fn filter_mode_consumes_letters() {
        let mut app = loaded_app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        handle_key_event(&mut app, key(KeyCode::Char('b')));
        assert_eq!(app.browser.filter, "b");
        assert_eq!(app.browser.rows().len(), 1);
        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.browser.filtering);
        assert_eq!(app.browser.filter, "b");
    }

    #[test]
    fn tab_opens_menu_and_esc_closes_it() {
        let mut app = loaded_app();
        handle_key_event(&mut app, key(KeyCode::Tab));
        let menu = app.menu.as_ref().expect("menu open");
        assert_eq!(menu.actions[0], ContextAction::Open);
        handle_key_event(&mut app, key(KeyCode::Down));
        assert_eq!(app.menu.as_ref().unwrap().focus, 1);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(app.menu.is_none());
    }

    #[test]
    fn address_edit_routes_keys_to_input() {
        let mut app = loaded_app();
        handle_key_event(&mut app, key(KeyCode::Char('e')));
        assert!(app.address_typing());
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        handle_key_event(&mut app, key(KeyCode::Char('x')));
        assert_eq!(app.browser.address.input().unwrap().value, "/Root/x");
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.address_typing());
        assert!(!app.browser.filtering);
    }

    #[test]
    fn help_toggles() {
        let mut app = loaded_app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.help_scroll, 1);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(!app.show_help);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = loaded_app();
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        handle_key_event(&mut app, release);
        assert!(!app.should_quit);
    }
}
