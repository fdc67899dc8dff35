//! Theme data model: built-in palettes and resolution from config.
//!
//! Two built-in palettes (dark and light) plus custom hex overrides from the
//! config file. Folder icon tokens map onto fixed accent colors.

use ratatui::style::Color;

use crate::config::{ThemeColorsConfig, ThemeConfig};

// ── Runtime theme colors ─────────────────────────────────────────────────────

/// All runtime colors used in the UI.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Listing
    pub item_fg: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub focus_bg: Color,
    pub folder_fg: Color,
    pub file_fg: Color,

    // Address bar
    pub address_bg: Color,
    pub crumb_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    // Borders & chrome
    pub border_fg: Color,
    pub border_focused_fg: Color,
    pub drag_box_fg: Color,

    // Dialogs
    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    // Semantic colors (not configurable, consistent across themes)
    pub error_fg: Color,
    pub warning_fg: Color,
    pub success_fg: Color,
    pub info_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,
}

// ── Built-in palettes ────────────────────────────────────────────────────────

/// Dark theme using Catppuccin Mocha palette.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        item_fg: Color::Rgb(205, 214, 244),     // #cdd6f4 (text)
        selected_bg: Color::Rgb(69, 71, 90),    // #45475a (surface1)
        selected_fg: Color::Rgb(205, 214, 244),
        focus_bg: Color::Rgb(49, 50, 68),       // #313244 (surface0)
        folder_fg: Color::Rgb(137, 180, 250),   // #89b4fa (blue)
        file_fg: Color::Rgb(205, 214, 244),

        address_bg: Color::Rgb(24, 24, 37),     // #181825 (mantle)
        crumb_fg: Color::Rgb(148, 226, 213),    // #94e2d5 (teal)

        status_bg: Color::Rgb(30, 30, 46),      // #1e1e2e (base)
        status_fg: Color::Rgb(205, 214, 244),

        border_fg: Color::Rgb(88, 91, 112),     // #585b70 (surface2)
        border_focused_fg: Color::Rgb(137, 180, 250),
        drag_box_fg: Color::Rgb(250, 179, 135), // #fab387 (peach)

        dialog_bg: Color::Rgb(49, 50, 68),
        dialog_border_fg: Color::Rgb(137, 180, 250),

        error_fg: Color::Rgb(243, 139, 168),    // #f38ba8 (red)
        warning_fg: Color::Rgb(249, 226, 175),  // #f9e2af (yellow)
        success_fg: Color::Rgb(166, 227, 161),  // #a6e3a1 (green)
        info_fg: Color::Rgb(137, 180, 250),
        accent_fg: Color::Rgb(203, 166, 247),   // #cba6f7 (mauve)
        dim_fg: Color::Rgb(108, 112, 134),      // #6c7086 (overlay0)
    }
}

/// Light theme using Catppuccin Latte.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        item_fg: Color::Rgb(76, 79, 105),       // #4c4f69 (text)
        selected_bg: Color::Rgb(204, 208, 218), // #ccd0da (surface1)
        selected_fg: Color::Rgb(76, 79, 105),
        focus_bg: Color::Rgb(230, 233, 239),    // #e6e9ef (surface0)
        folder_fg: Color::Rgb(30, 102, 245),    // #1e66f5 (blue)
        file_fg: Color::Rgb(76, 79, 105),

        address_bg: Color::Rgb(220, 224, 232),  // #dce0e8 (crust)
        crumb_fg: Color::Rgb(23, 146, 153),     // #179299 (teal)

        status_bg: Color::Rgb(239, 241, 245),   // #eff1f5 (base)
        status_fg: Color::Rgb(76, 79, 105),

        border_fg: Color::Rgb(172, 176, 190),   // #acb0be (surface2)
        border_focused_fg: Color::Rgb(30, 102, 245),
        drag_box_fg: Color::Rgb(254, 100, 11),  // #fe640b (peach)

        dialog_bg: Color::Rgb(230, 233, 239),
        dialog_border_fg: Color::Rgb(30, 102, 245),

        error_fg: Color::Rgb(210, 15, 57),      // #d20f39 (red)
        warning_fg: Color::Rgb(223, 142, 29),   // #df8e1d (yellow)
        success_fg: Color::Rgb(64, 160, 43),    // #40a02b (green)
        info_fg: Color::Rgb(30, 102, 245),
        accent_fg: Color::Rgb(136, 57, 239),    // #8839ef (mauve)
        dim_fg: Color::Rgb(156, 160, 176),      // #9ca0b0 (overlay0)
    }
}

/// Accent color for a folder icon token, `None` for the default icon.
pub fn icon_color(token: Option<&str>) -> Option<Color> {
    match token? {
        "red" => Some(Color::Rgb(243, 139, 168)),
        "orange" => Some(Color::Rgb(250, 179, 135)),
        "yellow" => Some(Color::Rgb(249, 226, 175)),
        "green" => Some(Color::Rgb(166, 227, 161)),
        "blue" => Some(Color::Rgb(137, 180, 250)),
        "purple" => Some(Color::Rgb(203, 166, 247)),
        "gray" => Some(Color::Rgb(147, 153, 178)),
        other => parse_hex_color(other),
    }
}

// ── Color parsing ────────────────────────────────────────────────────────────

/// Parse a hex color string like `"#aabbcc"` into a `ratatui::style::Color`.
/// Returns `None` for malformed input.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

// ── Theme resolution ─────────────────────────────────────────────────────────

/// Resolve the final `ThemeColors` from config.
///
/// - `"dark"` (default): dark Catppuccin palette
/// - `"light"`: light Catppuccin palette
/// - `"custom"`: start from dark palette, then override with custom hex values
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    match config.scheme.as_deref().unwrap_or("dark") {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

/// Apply custom hex color overrides on top of an existing theme.
/// Malformed values keep the palette color.
fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    let overrides = [
        (&custom.item_fg, &mut theme.item_fg),
        (&custom.selected_bg, &mut theme.selected_bg),
        (&custom.selected_fg, &mut theme.selected_fg),
        (&custom.focus_bg, &mut theme.focus_bg),
        (&custom.folder_fg, &mut theme.folder_fg),
        (&custom.file_fg, &mut theme.file_fg),
        (&custom.address_bg, &mut theme.address_bg),
        (&custom.status_bg, &mut theme.status_bg),
        (&custom.status_fg, &mut theme.status_fg),
        (&custom.border_fg, &mut theme.border_fg),
        (&custom.dialog_bg, &mut theme.dialog_bg),
        (&custom.dialog_border_fg, &mut theme.dialog_border_fg),
        (&custom.drag_box_fg, &mut theme.drag_box_fg),
    ];
    for (hex, slot) in overrides {
        if let Some(color) = hex.as_deref().and_then(parse_hex_color) {
            *slot = color;
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_valid() {
        assert_eq!(parse_hex_color("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_hex_color("#1a1b26"), Some(Color::Rgb(26, 27, 38)));
        assert_eq!(parse_hex_color("00ff00"), Some(Color::Rgb(0, 255, 0)));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color(""), None);
        assert_eq!(parse_hex_color("#ééé"), None);
    }

    #[test]
    fn test_resolve_schemes() {
        let light = resolve_theme(&ThemeConfig {
            scheme: Some("light".to_string()),
            custom: None,
        });
        assert_eq!(light.folder_fg, Color::Rgb(30, 102, 245));

        let default = resolve_theme(&ThemeConfig::default());
        assert_eq!(default.folder_fg, Color::Rgb(137, 180, 250));

        let unknown = resolve_theme(&ThemeConfig {
            scheme: Some("neon".to_string()),
            custom: None,
        });
        assert_eq!(unknown.folder_fg, default.folder_fg);
    }

    #[test]
    fn test_resolve_custom_overrides() {
        let config = ThemeConfig {
            scheme: Some("custom".to_string()),
            custom: Some(ThemeColorsConfig {
                folder_fg: Some("#e0af68".to_string()),
                border_fg: Some("#zzzzzz".to_string()),
                ..Default::default()
            }),
        };
        let theme = resolve_theme(&config);
        assert_eq!(theme.folder_fg, Color::Rgb(224, 175, 104));
        assert_eq!(theme.border_fg, dark_theme().border_fg);
        assert_eq!(theme.file_fg, dark_theme().file_fg);
    }

    #[test]
    fn test_icon_tokens() {
        assert_eq!(icon_color(None), None);
        assert_eq!(icon_color(Some("green")), Some(Color::Rgb(166, 227, 161)));
        assert_eq!(icon_color(Some("#010203")), Some(Color::Rgb(1, 2, 3)));
        assert_eq!(icon_color(Some("sparkly")), None);
    }
}
