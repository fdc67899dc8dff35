use ratatui::style::Color;

use crate::folder::item::{Expansion, ItemKind};
use crate::folder::tree::Row;
use crate::theme::{icon_color, ThemeColors};

/// Leading icon (with trailing space) for a row.
pub fn indicator(row: &Row, use_icons: bool) -> &'static str {
    if use_icons {
        match (row.kind, row.expansion) {
            (ItemKind::Folder, Expansion::Loading) => "\u{f110} ",
            (ItemKind::Folder, Expansion::Expanded) => "\u{f07c} ",
            (ItemKind::Folder, _) => "\u{f07b} ",
            (ItemKind::File, _) => file_icon_by_ext(&row.name),
        }
    } else {
        match (row.kind, row.expansion) {
            (ItemKind::Folder, Expansion::Loading) => "[~] ",
            (ItemKind::Folder, _) => "[D] ",
            (ItemKind::File, _) => "[F] ",
        }
    }
}

/// Nerd Font icon for a document based on its extension.
fn file_icon_by_ext(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "pdf" => "\u{f1c1} ",
        "doc" | "docx" | "odt" | "rtf" => "\u{f1c2} ",
        "xls" | "xlsx" | "ods" | "csv" => "\u{f1c3} ",
        "ppt" | "pptx" | "odp" => "\u{f1c4} ",
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "svg" | "webp" => "\u{f1c5} ",
        "zip" | "tar" | "gz" | "7z" | "rar" => "\u{f1c6} ",
        "mp3" | "wav" | "flac" | "ogg" => "\u{f1c7} ",
        "mp4" | "mkv" | "avi" | "mov" | "webm" => "\u{f1c8} ",
        "json" | "xml" | "html" | "yaml" | "yml" | "toml" => "\u{f1c9} ",
        "txt" | "md" => "\u{f15c} ",
        _ => "\u{f15b} ",
    }
}

/// Foreground for a row: custom folder icon color, else folder/file color.
pub fn item_color(row: &Row, theme: &ThemeColors) -> Color {
    match row.kind {
        ItemKind::Folder => icon_color(row.icon.as_deref()).unwrap_or(theme.folder_fg),
        ItemKind::File => theme.file_fg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folder::item::ItemId;
    use crate::theme::dark_theme;

    fn row(name: &str, kind: ItemKind, icon: Option<&str>) -> Row {
        Row {
            id: ItemId::from(name),
            name: name.to_string(),
            path: format!("/Root/{}", name),
            kind,
            icon: icon.map(str::to_string),
            depth: 0,
            expansion: Expansion::Collapsed,
            is_last_sibling: true,
        }
    }

    #[test]
    fn ascii_indicators() {
        assert_eq!(indicator(&row("A", ItemKind::Folder, None), false), "[D] ");
        assert_eq!(indicator(&row("a.pdf", ItemKind::File, None), false), "[F] ");
    }

    #[test]
    fn file_icons_by_extension() {
        assert_eq!(file_icon_by_ext("Q1 Report.PDF"), "\u{f1c1} ");
        assert_eq!(file_icon_by_ext("Budget.xlsx"), "\u{f1c3} ");
        assert_eq!(file_icon_by_ext("noext"), "\u{f15b} ");
    }

    #[test]
    fn custom_folder_icon_sets_color() {
        let theme = dark_theme();
        let plain = row("A", ItemKind::Folder, None);
        let green = row("B", ItemKind::Folder, Some("green"));
        assert_eq!(item_color(&plain, &theme), theme.folder_fg);
        assert_eq!(item_color(&green, &theme), Color::Rgb(166, 227, 161));
        assert_eq!(item_color(&row("f", ItemKind::File, Some("red")), &theme), theme.file_fg);
    }
}
