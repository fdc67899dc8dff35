use crate::folder::item::{FolderItem, Permissions};

/// Actions offered by the context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    Open,
    NewFolder,
    Rename,
    Move,
    Copy,
    Delete,
    Comment,
    ChangeIcon,
    Details,
}

impl ContextAction {
    pub fn label(self) -> &'static str {
        match self {
            ContextAction::Open => "Open",
            ContextAction::NewFolder => "New folder",
            ContextAction::Rename => "Rename",
            ContextAction::Move => "Move to…",
            ContextAction::Copy => "Copy to…",
            ContextAction::Delete => "Delete",
            ContextAction::Comment => "Add comment",
            ContextAction::ChangeIcon => "Change icon",
            ContextAction::Details => "Details",
        }
    }

    pub fn key_hint(self) -> &'static str {
        match self {
            ContextAction::Open => "Enter",
            ContextAction::NewFolder => "n",
            ContextAction::Rename => "r",
            ContextAction::Move => "m",
            ContextAction::Copy => "y",
            ContextAction::Delete => "d",
            ContextAction::Comment => "c",
            ContextAction::ChangeIcon => "i",
            ContextAction::Details => "D",
        }
    }
}

/// Actions available for `items`; every permission must hold for every item.
///
/// An empty selection is the background menu.
pub fn available_actions(items: &[&FolderItem]) -> Vec<ContextAction> {
    if items.is_empty() {
        return vec![ContextAction::NewFolder];
    }

    let perms = items
        .iter()
        .fold(Permissions::all(), |acc, item| acc.meet(item.permissions));
    let single = items.len() == 1;
    let single_folder = single && items[0].is_folder();

    let mut actions = Vec::new();
    if single && perms.can_view {
        actions.push(ContextAction::Open);
    }
    if single && perms.can_edit {
        actions.push(ContextAction::Rename);
    }
    if perms.can_move {
        actions.push(ContextAction::Move);
    }
    if perms.can_copy {
        actions.push(ContextAction::Copy);
    }
    if perms.can_delete {
        actions.push(ContextAction::Delete);
    }
    if single && perms.can_comment {
        actions.push(ContextAction::Comment);
    }
    if single_folder && perms.can_change_icon {
        actions.push(ContextAction::ChangeIcon);
    }
    if single && perms.can_view {
        actions.push(ContextAction::Details);
    }
    actions
}

/// An open context menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenu {
    pub actions: Vec<ContextAction>,
    pub focus: usize,
    /// Screen cell the menu was opened at.
    pub anchor: (u16, u16),
}

impl ContextMenu {
    pub fn new(actions: Vec<ContextAction>, anchor: (u16, u16)) -> Self {
        Self {
            actions,
            focus: 0,
            anchor,
        }
    }

    pub fn next(&mut self) {
        if !self.actions.is_empty() {
            self.focus = (self.focus + 1) % self.actions.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.actions.is_empty() {
            self.focus = (self.focus + self.actions.len() - 1) % self.actions.len();
        }
    }

    pub fn focused(&self) -> Option<ContextAction> {
        self.actions.get(self.focus).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_menu_offers_new_folder() {
        assert_eq!(available_actions(&[]), vec![ContextAction::NewFolder]);
    }

    #[test]
    fn single_folder_gets_everything() {
        let folder = FolderItem::folder("a", "/Root", "A");
        let actions = available_actions(&[&folder]);
        assert!(actions.contains(&ContextAction::ChangeIcon));
        assert!(actions.contains(&ContextAction::Rename));
        assert!(actions.contains(&ContextAction::Details));
    }

    #[test]
    fn files_cannot_change_icon() {
        let file = FolderItem::file("f", "/Root", "f.pdf");
        assert!(!available_actions(&[&file]).contains(&ContextAction::ChangeIcon));
    }

    #[test]
    fn multi_selection_requires_all_permissions() {
        let a = FolderItem::folder("a", "/Root", "A");
        let mut b = FolderItem::folder("b", "/Root", "B");
        b.permissions.can_delete = false;
        let actions = available_actions(&[&a, &b]);
        assert!(!actions.contains(&ContextAction::Delete));
        assert!(actions.contains(&ContextAction::Move));
        assert!(!actions.contains(&ContextAction::Rename));
        assert!(!actions.contains(&ContextAction::Open));
    }

    #[test]
    fn read_only_item_is_view_only() {
        let mut f = FolderItem::file("f", "/Root", "f.pdf");
        f.permissions = Permissions::read_only();
        assert_eq!(
            available_actions(&[&f]),
            vec![ContextAction::Open, ContextAction::Details]
        );
    }

    #[test]
    fn menu_focus_wraps() {
        let mut menu = ContextMenu::new(vec![ContextAction::Open, ContextAction::Delete], (0, 0));
        menu.previous();
        assert_eq!(menu.focused(), Some(ContextAction::Delete));
        menu.next();
        assert_eq!(menu.focused(), Some(ContextAction::Open));
    }
}
