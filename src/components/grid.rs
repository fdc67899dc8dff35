use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::components::icons;
use crate::folder::item::ItemId;
use crate::folder::selection::{Bounds, Selection};
use crate::folder::tree::Row;
use crate::theme::ThemeColors;

/// Placement of items in the content area, in content coordinates
/// (origin at the first item, not the screen).
///
/// The grid widget draws from it and mouse hit-testing reads it, so both
/// always agree on where an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: usize,
    pub cell_width: u16,
    pub cell_height: u16,
    /// Blank columns/lines after each cell that count as background.
    pub gap: u16,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::rows(0)
    }
}

impl GridLayout {
    pub const GRID_CELL_HEIGHT: u16 = 3;

    /// Fixed-width cells flowing left to right.
    pub fn grid(area_width: u16, cell_width: u16) -> Self {
        let cell_width = cell_width.max(1);
        Self {
            columns: (area_width / cell_width).max(1) as usize,
            cell_width,
            cell_height: Self::GRID_CELL_HEIGHT,
            gap: 1,
        }
    }

    /// One item per line, spanning the width (list and tree views).
    pub fn rows(area_width: u16) -> Self {
        Self {
            columns: 1,
            cell_width: area_width,
            cell_height: 1,
            gap: 0,
        }
    }

    /// Hit box of item `index`.
    pub fn cell(&self, index: usize) -> Bounds {
        let col = (index % self.columns.max(1)) as i32;
        let line = (index / self.columns.max(1)) as i32;
        let w = self.cell_width as i32;
        let h = self.cell_height as i32;
        Bounds::new(
            col * w,
            line * h,
            (w - self.gap as i32).max(1),
            (h - self.gap as i32).max(1),
        )
    }

    /// Hit boxes for every row, in order.
    pub fn boxes(&self, rows: &[Row]) -> Vec<(ItemId, Bounds)> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| (row.id.clone(), self.cell(i)))
            .collect()
    }

    /// How many item lines fit in `height` screen lines.
    pub fn visible_lines(&self, height: u16) -> usize {
        (height / self.cell_height.max(1)) as usize
    }
}

/// Grid view: one cell per item with an icon line and a name line.
pub struct GridWidget<'a> {
    rows: &'a [Row],
    selection: &'a Selection,
    focus: usize,
    scroll: usize,
    layout: GridLayout,
    theme: &'a ThemeColors,
    use_icons: bool,
    block: Option<Block<'a>>,
}

impl<'a> GridWidget<'a> {
    pub fn new(
        rows: &'a [Row],
        selection: &'a Selection,
        layout: GridLayout,
        theme: &'a ThemeColors,
    ) -> Self {
        Self {
            rows,
            selection,
            focus: 0,
            scroll: 0,
            layout,
            theme,
            use_icons: true,
            block: None,
        }
    }

    pub fn focus(mut self, focus: usize) -> Self {
        self.focus = focus;
        self
    }

    /// First item line shown.
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn use_icons(mut self, use_icons: bool) -> Self {
        self.use_icons = use_icons;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl Widget for GridWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(b) => {
                let inner = b.inner(area);
                b.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let label_width = self.layout.cell_width.saturating_sub(self.layout.gap) as usize;
        let first = self.scroll * self.layout.columns;
        for (index, row) in self.rows.iter().enumerate().skip(first) {
            let cell = self.layout.cell(index);
            let x = inner.x as i32 + cell.left;
            let y = inner.y as i32 + cell.top - (self.scroll as i32 * self.layout.cell_height as i32);
            if y + 1 >= (inner.y + inner.height) as i32 {
                break;
            }
            if x + label_width as i32 > (inner.x + inner.width) as i32 {
                continue;
            }

            let selected = self.selection.contains(&row.id);
            let mut style = Style::default().fg(icons::item_color(row, self.theme));
            if selected {
                style = style
                    .bg(self.theme.selected_bg)
                    .fg(self.theme.selected_fg)
                    .add_modifier(Modifier::BOLD);
            } else if index == self.focus {
                style = style.bg(self.theme.focus_bg);
            }

            let icon = icons::indicator(row, self.use_icons);
            let name = truncate(&row.name, label_width);
            let top = Line::from(Span::styled(
                format!("{:^width$}", icon.trim_end(), width = label_width),
                style,
            ));
            let bottom = Line::from(Span::styled(
                format!("{:^width$}", name, width = label_width),
                style,
            ));
            buf.set_line(x as u16, y as u16, &top, label_width as u16);
            buf.set_line(x as u16, y as u16 + 1, &bottom, label_width as u16);
        }
    }
}

/// Shorten `name` to `width` chars with a trailing ellipsis.
pub fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        return name.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = name.chars().take(width - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folder::item::{Expansion, ItemKind};
    use crate::theme::dark_theme;

    fn row(id: &str, name: &str, kind: ItemKind) -> Row {
        Row {
            id: ItemId::from(id),
            name: name.to_string(),
            path: format!("/Root/{}", name),
            kind,
            icon: None,
            depth: 0,
            expansion: Expansion::Unloaded,
            is_last_sibling: false,
        }
    }

    fn buffer_text(buf: &Buffer) -> String {
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
    fn grid_flows_into_columns() {
        let layout = GridLayout::grid(40, 18);
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.cell(0), Bounds::new(0, 0, 17, 2));
        assert_eq!(layout.cell(1), Bounds::new(18, 0, 17, 2));
        assert_eq!(layout.cell(2), Bounds::new(0, 3, 17, 2));
    }

    #[test]
    fn narrow_area_still_has_one_column() {
        assert_eq!(GridLayout::grid(5, 18).columns, 1);
    }

    #[test]
    fn rows_layout_is_one_line_per_item() {
        let layout = GridLayout::rows(30);
        assert_eq!(layout.cell(4), Bounds::new(0, 4, 30, 1));
        assert_eq!(layout.visible_lines(10), 10);
    }

    #[test]
    fn boxes_follow_row_order() {
        let rows = vec![
            row("a", "A", ItemKind::Folder),
            row("f", "f.txt", ItemKind::File),
        ];
        let boxes = GridLayout::grid(40, 18).boxes(&rows);
        assert_eq!(boxes[1].0, ItemId::from("f"));
        assert_eq!(boxes[1].1.left, 18);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("Quarterly Report", 8), "Quarter…");
        assert_eq!(truncate("Q1", 8), "Q1");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn renders_names_in_cells() {
        let rows = vec![
            row("a", "Finance", ItemKind::Folder),
            row("f", "notes.txt", ItemKind::File),
        ];
        let selection = Selection::default();
        let theme = dark_theme();
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        GridWidget::new(&rows, &selection, GridLayout::grid(40, 18), &theme)
            .use_icons(false)
            .render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("Finance"));
        assert!(text.contains("notes.txt"));
        assert!(text.contains("[D]"));
    }

    #[test]
    fn scrolled_rows_are_skipped() {
        let rows: Vec<Row> = (0..6)
            .map(|i| row(&i.to_string(), &format!("item{}", i), ItemKind::File))
            .collect();
        let selection = Selection::default();
        let theme = dark_theme();
        let area = Rect::new(0, 0, 18, 3);
        let mut buf = Buffer::empty(area);
        GridWidget::new(&rows, &selection, GridLayout::grid(18, 18), &theme)
            .scroll(2)
            .render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("item2"));
        assert!(!text.contains("item1"));
        assert!(!text.contains("item3"));
    }
}
