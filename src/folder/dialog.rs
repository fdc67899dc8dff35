use tracing::debug;

use crate::error::ValidationError;
use crate::folder::browser::Browser;
use crate::folder::input::TextInput;
use crate::folder::item::{FolderItem, ItemId};
use crate::folder::mutation::TransferMode;

/// Icon tokens offered by the change-icon dialog. `None` restores the default.
pub const ICON_CHOICES: &[Option<&str>] = &[
    None,
    Some("red"),
    Some("orange"),
    Some("yellow"),
    Some("green"),
    Some("blue"),
    Some("purple"),
    Some("gray"),
];

/// The one dialog that may be open. Opening another replaces it.
#[derive(Default)]
pub enum ActiveDialog {
    #[default]
    None,
    NewFolder {
        parent: String,
    },
    Rename {
        id: ItemId,
        original: String,
    },
    Delete {
        ids: Vec<ItemId>,
        names: Vec<String>,
    },
    Transfer {
        ids: Vec<ItemId>,
        names: Vec<String>,
        mode: TransferMode,
        picker: Box<Browser>,
    },
    Comment {
        id: ItemId,
        name: String,
    },
    ChangeIcon {
        id: ItemId,
        name: String,
        choice: usize,
    },
    Details {
        item: Box<FolderItem>,
    },
    NotFound {
        path: String,
    },
}

impl ActiveDialog {
    pub fn title(&self) -> &'static str {
        match self {
            ActiveDialog::None => "",
            ActiveDialog::NewFolder { .. } => "New Folder",
            ActiveDialog::Rename { .. } => "Rename",
            ActiveDialog::Delete { .. } => "Delete Confirmation",
            ActiveDialog::Transfer { mode, .. } => match mode {
                TransferMode::Copy => "Copy To",
                TransferMode::Move => "Move To",
            },
            ActiveDialog::Comment { .. } => "Add Comment",
            ActiveDialog::ChangeIcon { .. } => "Change Icon",
            ActiveDialog::Details { .. } => "Details",
            ActiveDialog::NotFound { .. } => "Not Found",
        }
    }

    /// Dialogs whose body is the text input.
    pub fn takes_text(&self) -> bool {
        matches!(
            self,
            ActiveDialog::NewFolder { .. }
                | ActiveDialog::Rename { .. }
                | ActiveDialog::Comment { .. }
        )
    }
}

/// Dialog slot plus its input buffer and inline validation error.
#[derive(Default)]
pub struct DialogState {
    pub active: ActiveDialog,
    pub input: TextInput,
    pub error: Option<ValidationError>,
}

impl DialogState {
    pub fn is_open(&self) -> bool {
        !matches!(self.active, ActiveDialog::None)
    }

    /// Open `dialog`, replacing whatever was open.
    pub fn open(&mut self, dialog: ActiveDialog) {
        if self.is_open() {
            debug!(
                replaced = self.active.title(),
                opened = dialog.title(),
                "replacing open dialog"
            );
        }
        self.input = match &dialog {
            ActiveDialog::Rename { original, .. } => TextInput::with_value(original),
            _ => TextInput::default(),
        };
        self.error = None;
        self.active = dialog;
    }

    /// Close the current dialog and return what was open.
    pub fn close(&mut self) -> ActiveDialog {
        self.input = TextInput::default();
        self.error = None;
        std::mem::take(&mut self.active)
    }

    pub fn set_error(&mut self, error: ValidationError) {
        self.error = Some(error);
    }

    pub fn picker_mut(&mut self) -> Option<&mut Browser> {
        match &mut self.active {
            ActiveDialog::Transfer { picker, .. } => Some(picker.as_mut()),
            _ => None,
        }
    }

    /// Step the change-icon choice by `delta`, wrapping.
    pub fn cycle_icon(&mut self, delta: isize) {
        if let ActiveDialog::ChangeIcon { choice, .. } = &mut self.active {
            let len = ICON_CHOICES.len() as isize;
            *choice = ((*choice as isize + delta).rem_euclid(len)) as usize;
        }
    }
}

/// Icon index for a folder's current icon token.
pub fn icon_index(icon: Option<&str>) -> usize {
    ICON_CHOICES
        .iter()
        .position(|choice| *choice == icon)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_dialog_is_ever_open() {
        let mut state = DialogState::default();
        state.open(ActiveDialog::NewFolder {
            parent: "/Root".into(),
        });
        state.open(ActiveDialog::NotFound {
            path: "/Root/x".into(),
        });
        assert!(matches!(state.active, ActiveDialog::NotFound { .. }));
    }

    #[test]
    fn rename_prefills_input() {
        let mut state = DialogState::default();
        state.open(ActiveDialog::Rename {
            id: ItemId::from("a"),
            original: "hello.txt".into(),
        });
        assert_eq!(state.input.value, "hello.txt");
        assert_eq!(state.input.cursor, 9);
    }

    #[test]
    fn close_resets_input_and_error() {
        let mut state = DialogState::default();
        state.open(ActiveDialog::NewFolder {
            parent: "/Root".into(),
        });
        state.input.insert('x');
        state.set_error(ValidationError::EmptyName);
        let closed = state.close();
        assert!(matches!(closed, ActiveDialog::NewFolder { .. }));
        assert!(!state.is_open());
        assert!(state.input.value.is_empty());
        assert!(state.error.is_none());
    }

    #[test]
    fn icon_choice_wraps_both_ways() {
        let mut state = DialogState::default();
        state.open(ActiveDialog::ChangeIcon {
            id: ItemId::from("a"),
            name: "A".into(),
            choice: 0,
        });
        state.cycle_icon(-1);
        assert!(matches!(
            state.active,
            ActiveDialog::ChangeIcon { choice, .. } if choice == ICON_CHOICES.len() - 1
        ));
        state.cycle_icon(1);
        assert!(matches!(state.active, ActiveDialog::ChangeIcon { choice: 0, .. }));
    }

    #[test]
    fn icon_index_finds_token() {
        assert_eq!(icon_index(None), 0);
        assert_eq!(icon_index(Some("green")), 4);
        assert_eq!(icon_index(Some("unknown")), 0);
    }

    #[test]
    fn text_dialogs() {
        assert!(ActiveDialog::Comment {
            id: ItemId::from("a"),
            name: "A".into()
        }
        .takes_text());
        assert!(!ActiveDialog::None.takes_text());
    }
}
