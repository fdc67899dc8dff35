//! Selection model: click, ctrl-click, range, select-all and rubber-band
//! (drag-box) selection over the currently visible items.
//!
//! Membership is by [`ItemId`], so renamed or moved items stay selected
//! across in-place tree updates and are resolved against the tree on render.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::folder::item::{FolderItem, ItemId};
use crate::folder::tree::ItemTree;

/// A point in content coordinates (columns, rows; scroll already applied).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box, right/bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Bounds {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    /// Normalized box spanned by two corners.
    pub fn spanning(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Strict overlap test; touching edges do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        other.left < self.right
            && other.right > self.left
            && other.top < self.bottom
            && other.bottom > self.top
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }
}

/// Which pointer button started an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// An in-progress rubber-band selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DragBox {
    pub anchor: Point,
    pub current: Point,
    /// Ctrl was held at drag start: hits are added to `base`.
    pub additive: bool,
    /// Selection as it was when the drag began.
    pub base: Vec<ItemId>,
}

impl DragBox {
    pub fn bounds(&self) -> Bounds {
        Bounds::spanning(self.anchor, self.current)
    }
}

/// Ordered set of selected item ids.
#[derive(Debug, Clone)]
pub struct Selection {
    ids: Vec<ItemId>,
    pub multi_enabled: bool,
    /// Last plainly clicked item; start of shift-click ranges.
    anchor: Option<ItemId>,
    drag: Option<DragBox>,
    /// A finished drag's box stays visible until this instant.
    clear_at: Option<Instant>,
    /// Background clicks before this instant belong to the drag that just ended.
    suppress_click_until: Option<Instant>,
    clear_delay: Duration,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(true, Duration::from_millis(150))
    }
}

impl Selection {
    pub fn new(multi_enabled: bool, clear_delay: Duration) -> Self {
        Self {
            ids: Vec::new(),
            multi_enabled,
            anchor: None,
            drag: None,
            clear_at: None,
            suppress_click_until: None,
            clear_delay,
        }
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.ids.contains(id)
    }

    pub fn drag(&self) -> Option<&DragBox> {
        self.drag.as_ref()
    }

    /// Plain click: the selection becomes exactly `{id}`.
    pub fn click(&mut self, id: &ItemId) {
        self.ids = vec![id.clone()];
        self.anchor = Some(id.clone());
    }

    /// Ctrl-click: XOR `id` into the selection when multi-select is allowed.
    pub fn toggle(&mut self, id: &ItemId) {
        if !self.multi_enabled {
            self.click(id);
            return;
        }
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id.clone());
        }
        self.anchor = Some(id.clone());
    }

    /// Shift-click: select the run between the anchor and `id` in `visible` order.
    pub fn extend_to(&mut self, id: &ItemId, visible: &[ItemId]) {
        if !self.multi_enabled {
            self.click(id);
            return;
        }
        let anchor_pos = self
            .anchor
            .as_ref()
            .and_then(|a| visible.iter().position(|v| v == a));
        let target_pos = visible.iter().position(|v| v == id);
        match (anchor_pos, target_pos) {
            (Some(a), Some(t)) => {
                let (lo, hi) = if a <= t { (a, t) } else { (t, a) };
                self.ids = visible[lo..=hi].to_vec();
            }
            _ => self.click(id),
        }
    }

    /// Click on empty background. Ignored right after a drag ends.
    pub fn click_background(&mut self, now: Instant) {
        if self.suppress_click_until.is_some_and(|until| now < until) {
            return;
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.anchor = None;
    }

    /// Select every visible item.
    pub fn select_all(&mut self, visible: &[ItemId]) {
        if !self.multi_enabled {
            return;
        }
        self.ids = visible.to_vec();
    }

    /// Drop ids that are no longer visible.
    pub fn retain_visible(&mut self, visible: &[ItemId]) {
        let visible: HashSet<&ItemId> = visible.iter().collect();
        self.ids.retain(|id| visible.contains(id));
        if self.anchor.as_ref().is_some_and(|a| !visible.contains(a)) {
            self.anchor = None;
        }
    }

    /// An item changed id; keep it selected under the new one.
    pub fn rekey(&mut self, old: &ItemId, new: &ItemId) {
        for id in self.ids.iter_mut() {
            if *id == *old {
                *id = new.clone();
            }
        }
        if self.anchor.as_ref() == Some(old) {
            self.anchor = Some(new.clone());
        }
    }

    /// Selected items that still exist in `tree`, in selection order.
    pub fn resolve<'a>(&self, tree: &'a ItemTree) -> Vec<&'a FolderItem> {
        self.ids.iter().filter_map(|id| tree.find_by_id(id)).collect()
    }

    /// Start a rubber band. Returns false when the gesture does not qualify:
    /// wrong button, nested (tree) view, or multi-select disabled.
    pub fn begin_drag(
        &mut self,
        at: Point,
        button: PointerButton,
        nested_view: bool,
        additive: bool,
    ) -> bool {
        if button != PointerButton::Primary || nested_view || !self.multi_enabled {
            return false;
        }
        self.drag = Some(DragBox {
            anchor: at,
            current: at,
            additive,
            base: self.ids.clone(),
        });
        self.clear_at = None;
        true
    }

    /// Move the free corner and reselect everything the box overlaps.
    pub fn update_drag(&mut self, at: Point, boxes: &[(ItemId, Bounds)]) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        drag.current = at;
        let rect = drag.bounds();

        let hits: Vec<ItemId> = if rect.is_empty() {
            Vec::new()
        } else {
            boxes
                .iter()
                .filter(|(_, b)| rect.intersects(b))
                .map(|(id, _)| id.clone())
                .collect()
        };

        if drag.additive {
            let mut ids = drag.base.clone();
            for id in hits {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            self.ids = ids;
        } else {
            self.ids = hits;
        }
    }

    /// Release the pointer. The selection stays; the box lingers briefly and
    /// the trailing background click is swallowed.
    pub fn end_drag(&mut self, now: Instant) {
        if self.drag.is_none() {
            return;
        }
        self.clear_at = Some(now + self.clear_delay);
        self.suppress_click_until = Some(now + self.clear_delay);
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some() && self.clear_at.is_none()
    }

    /// Drop a finished drag box once its delay has passed.
    pub fn tick(&mut self, now: Instant) {
        if self.clear_at.is_some_and(|at| now >= at) {
            self.drag = None;
            self.clear_at = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folder::tree::tests::sample_tree;

    fn id(s: &str) -> ItemId {
        ItemId::from(s)
    }

    /// Three cells side by side, 10 wide and 3 tall, one gap column apart.
    fn grid() -> Vec<(ItemId, Bounds)> {
        vec![
            (id("a"), Bounds::new(0, 0, 10, 3)),
            (id("b"), Bounds::new(11, 0, 10, 3)),
            (id("c"), Bounds::new(22, 0, 10, 3)),
        ]
    }

    #[test]
    fn rekey_keeps_item_selected() {
        let mut sel = Selection::default();
        sel.click(&id("local"));
        sel.toggle(&id("b"));
        sel.rekey(&id("local"), &id("server"));
        assert_eq!(sel.ids(), &[id("server"), id("b")]);
    }

    #[test]
    fn click_replaces_selection() {
        let mut sel = Selection::default();
        sel.click(&id("a"));
        sel.click(&id("b"));
        assert_eq!(sel.ids(), &[id("b")]);
    }

    #[test]
    fn toggle_xors_membership() {
        let mut sel = Selection::default();
        sel.toggle(&id("a"));
        sel.toggle(&id("b"));
        assert_eq!(sel.len(), 2);
        sel.toggle(&id("a"));
        assert_eq!(sel.ids(), &[id("b")]);
    }

    #[test]
    fn toggle_without_multi_acts_as_click() {
        let mut sel = Selection::new(false, Duration::ZERO);
        sel.toggle(&id("a"));
        sel.toggle(&id("b"));
        assert_eq!(sel.ids(), &[id("b")]);
    }

    #[test]
    fn extend_to_selects_range() {
        let visible = vec![id("a"), id("b"), id("c"), id("d")];
        let mut sel = Selection::default();
        sel.click(&id("d"));
        sel.extend_to(&id("b"), &visible);
        assert_eq!(sel.ids(), &[id("b"), id("c"), id("d")]);
    }

    #[test]
    fn background_click_clears() {
        let mut sel = Selection::default();
        sel.click(&id("a"));
        sel.click_background(Instant::now());
        assert!(sel.is_empty());
    }

    #[test]
    fn select_all_and_retain_visible() {
        let mut sel = Selection::default();
        sel.select_all(&[id("a"), id("b"), id("c")]);
        assert_eq!(sel.len(), 3);
        sel.retain_visible(&[id("c"), id("a")]);
        assert_eq!(sel.ids(), &[id("a"), id("c")]);
    }

    #[test]
    fn select_all_requires_multi() {
        let mut sel = Selection::new(false, Duration::ZERO);
        sel.select_all(&[id("a"), id("b")]);
        assert!(sel.is_empty());
    }

    #[test]
    fn resolve_follows_renamed_items() {
        let mut tree = sample_tree();
        let mut sel = Selection::default();
        sel.click(&id("a"));
        crate::folder::mutation::rename(&mut tree, &id("a"), "Renamed").unwrap();
        let resolved = sel.resolve(&tree);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].path, "/Root/Renamed");
    }

    #[test]
    fn bounds_intersection_is_strict() {
        let a = Bounds::new(0, 0, 10, 3);
        assert!(a.intersects(&Bounds::new(9, 2, 5, 5)));
        assert!(!a.intersects(&Bounds::new(10, 0, 5, 3)));
        assert!(!a.intersects(&Bounds::new(0, 3, 10, 3)));
    }

    #[test]
    fn zero_area_drag_selects_nothing() {
        let mut sel = Selection::default();
        assert!(sel.begin_drag(Point::new(5, 1), PointerButton::Primary, false, false));
        sel.update_drag(Point::new(5, 1), &grid());
        assert!(sel.is_empty());
        sel.update_drag(Point::new(5, 2), &grid());
        assert!(sel.is_empty());
    }

    #[test]
    fn plain_drag_replaces_selection() {
        let mut sel = Selection::default();
        sel.click(&id("c"));
        sel.begin_drag(Point::new(2, 1), PointerButton::Primary, false, false);
        sel.update_drag(Point::new(15, 2), &grid());
        assert_eq!(sel.ids(), &[id("a"), id("b")]);
    }

    #[test]
    fn ctrl_drag_unions_with_previous() {
        let mut sel = Selection::default();
        sel.click(&id("c"));
        sel.begin_drag(Point::new(2, 1), PointerButton::Primary, false, true);
        sel.update_drag(Point::new(15, 2), &grid());
        assert_eq!(sel.ids(), &[id("c"), id("a"), id("b")]);

        // Shrinking the box drops hits but never the pre-drag selection.
        sel.update_drag(Point::new(3, 2), &grid());
        assert_eq!(sel.ids(), &[id("c"), id("a")]);
    }

    #[test]
    fn drag_rejected_for_secondary_tree_or_single() {
        let mut sel = Selection::default();
        assert!(!sel.begin_drag(Point::new(0, 0), PointerButton::Secondary, false, false));
        assert!(!sel.begin_drag(Point::new(0, 0), PointerButton::Primary, true, false));
        let mut single = Selection::new(false, Duration::ZERO);
        assert!(!single.begin_drag(Point::new(0, 0), PointerButton::Primary, false, false));
        assert!(sel.drag().is_none());
    }

    #[test]
    fn end_drag_lingers_then_clears_and_swallows_click() {
        let delay = Duration::from_millis(150);
        let mut sel = Selection::new(true, delay);
        sel.begin_drag(Point::new(0, 0), PointerButton::Primary, false, false);
        sel.update_drag(Point::new(12, 2), &grid());
        let now = Instant::now();
        sel.end_drag(now);
        assert!(!sel.is_dragging());
        assert!(sel.drag().is_some());

        sel.click_background(now + Duration::from_millis(10));
        assert_eq!(sel.len(), 2);

        sel.tick(now + delay);
        assert!(sel.drag().is_none());
        sel.click_background(now + delay * 2);
        assert!(sel.is_empty());
    }
}
