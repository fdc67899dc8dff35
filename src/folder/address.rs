//! Address bar: breadcrumbs, free-text path entry, and backend search.

use crate::folder::input::TextInput;
use crate::folder::path;

/// What the bar is currently showing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AddressMode {
    #[default]
    Breadcrumbs,
    Editing(TextInput),
    Search(TextInput),
}

/// Outcome of pressing Enter in the bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressCommand {
    /// Ask the backend whether this path exists before navigating.
    Validate(String),
    /// Rejected without a backend call (outside the root namespace).
    Invalid(String),
    Search(String),
    ClearSearch,
    None,
}

#[derive(Debug, Clone, Default)]
pub struct AddressBar {
    pub mode: AddressMode,
}

impl AddressBar {
    /// Breadcrumb `(label, path)` pairs for `current` under `root`.
    pub fn crumbs(current: &str, root: &str) -> Vec<(String, String)> {
        path::segments(current, root)
    }

    /// Path to navigate to when crumb `index` is clicked.
    pub fn crumb_target(current: &str, root: &str, index: usize) -> Option<String> {
        Self::crumbs(current, root)
            .into_iter()
            .nth(index)
            .map(|(_, p)| p)
    }

    pub fn is_editing(&self) -> bool {
        !matches!(self.mode, AddressMode::Breadcrumbs)
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.mode, AddressMode::Search(_))
    }

    /// Switch to free-text entry, pre-filled with the current path.
    pub fn begin_edit(&mut self, current: &str) {
        self.mode = AddressMode::Editing(TextInput::with_value(current));
    }

    pub fn begin_search(&mut self, query: &str) {
        self.mode = AddressMode::Search(TextInput::with_value(query));
    }

    /// Esc: back to breadcrumbs without navigating.
    pub fn cancel(&mut self) -> AddressCommand {
        let was_search = self.is_searching();
        self.mode = AddressMode::Breadcrumbs;
        if was_search {
            AddressCommand::ClearSearch
        } else {
            AddressCommand::None
        }
    }

    pub fn input_mut(&mut self) -> Option<&mut TextInput> {
        match &mut self.mode {
            AddressMode::Editing(input) | AddressMode::Search(input) => Some(input),
            AddressMode::Breadcrumbs => None,
        }
    }

    pub fn input(&self) -> Option<&TextInput> {
        match &self.mode {
            AddressMode::Editing(input) | AddressMode::Search(input) => Some(input),
            AddressMode::Breadcrumbs => None,
        }
    }

    /// Enter. Editing stays open until the validation response arrives;
    /// search stays open while results are shown.
    pub fn submit(&mut self, root: &str) -> AddressCommand {
        match &self.mode {
            AddressMode::Breadcrumbs => AddressCommand::None,
            AddressMode::Editing(input) => {
                let target = path::normalize(&input.value);
                if path::is_within(&target, &path::normalize(root)) {
                    AddressCommand::Validate(target)
                } else {
                    self.mode = AddressMode::Breadcrumbs;
                    AddressCommand::Invalid(target)
                }
            }
            AddressMode::Search(input) => {
                let query = input.value.trim().to_string();
                if query.is_empty() {
                    self.mode = AddressMode::Breadcrumbs;
                    AddressCommand::ClearSearch
                } else {
                    AddressCommand::Search(query)
                }
            }
        }
    }

    /// The backend answered a `Validate`; leave edit mode either way.
    pub fn finish_edit(&mut self) {
        if matches!(self.mode, AddressMode::Editing(_)) {
            self.mode = AddressMode::Breadcrumbs;
        }
    }
}
