//! Cursor state: the logical position inside a grid and the rules that move it.
//!
//! Nothing in here performs a visual effect. Key handlers look at a
//! [`Grid`] snapshot, update the stored [`Position`], and describe what the
//! caller should do next as a list of [`KeyResponse`]s. An empty list means
//! the key was not handled and should reach the host's default handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::grid::{FocusTarget, Grid};
use crate::key::{Binding, KeyCombination, KeyMap};
use crate::pager::{PageDirection, Pager};

/// Where the cursor is. Sub-item is `Some` only while drilled into a cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub section: usize,
    pub row: usize,
    pub column: usize,
    pub sub_item: Option<usize>,
}

impl Position {
    /// The body element this position addresses.
    pub fn body_target(&self) -> FocusTarget {
        match self.sub_item {
            Some(item) => FocusTarget::SubItem {
                section: self.section,
                row: self.row,
                column: self.column,
                item,
            },
            None => self.cell_target(),
        }
    }

    /// The enclosing body cell, ignoring any drilled sub-item.
    pub fn cell_target(&self) -> FocusTarget {
        FocusTarget::Cell {
            section: self.section,
            row: self.row,
            column: self.column,
        }
    }

    /// Head cell of the current column.
    pub fn head_target(&self) -> FocusTarget {
        FocusTarget::Head {
            column: self.column,
        }
    }

    /// Focus sits on a sub-item rather than on the cell itself.
    pub fn is_drilled(&self) -> bool {
        self.sub_item.is_some()
    }
}

/// The part of the grid a key event was delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Head,
    Body,
}

/// One instruction for the caller after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResponse {
    /// The key was consumed; suppress default handling.
    Stop,
    /// Move focus to `target`. `far` asks for an animated scroll.
    Focus { target: FocusTarget, far: bool },
    /// Set every visible section from `from_section` to `to_section` inclusive.
    Select {
        selected: bool,
        from_section: usize,
        to_section: usize,
    },
}

/// The one keyboard-reachable element of each region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStops {
    pub head: FocusTarget,
    /// `None` while the body has no visible rows.
    pub body: Option<FocusTarget>,
}

impl Default for TabStops {
    fn default() -> Self {
        Self {
            head: FocusTarget::Head { column: 0 },
            body: None,
        }
    }
}

/// Configurable key bindings for grid navigation.
pub struct CursorKeyBindings {
    /// Previous column, or previous sub-item while drilled. Default: Left
    pub left: Binding,
    /// Next column, or next sub-item while drilled. Default: Right
    pub right: Binding,
    /// First column. Default: Home
    pub first_column: Binding,
    /// Last column. Default: End
    pub last_column: Binding,
    /// Previous row, or previous sub-item while drilled. Default: Up
    pub up: Binding,
    /// Next row, or next sub-item while drilled. Default: Down
    pub down: Binding,
    /// First visible row. Default: Ctrl+Home
    pub first_row: Binding,
    /// Last visible row. Default: Ctrl+End
    pub last_row: Binding,
    /// About one page up. Default: PageUp
    pub page_up: Binding,
    /// About one page down. Default: PageDown
    pub page_down: Binding,
    /// Toggle selection of every visible section. Default: Ctrl+A
    pub select_all: Binding,
    /// Enter the sub-items of a drillable cell. Default: Enter
    pub drill_in: Binding,
    /// Leave the sub-items. Default: Esc
    pub drill_out: Binding,
    /// Toggle the help overlay. Default: F1
    pub help: Binding,
}

impl Default for CursorKeyBindings {
    fn default() -> Self {
        Self {
            left: Binding::new(KeyCombination::new(KeyCode::Left), "Column left"),
            right: Binding::new(KeyCombination::new(KeyCode::Right), "Column right"),
            first_column: Binding::new(KeyCombination::new(KeyCode::Home), "First column"),
            last_column: Binding::new(KeyCombination::new(KeyCode::End), "Last column"),
            up: Binding::new(KeyCombination::new(KeyCode::Up), "Row up"),
            down: Binding::new(KeyCombination::new(KeyCode::Down), "Row down"),
            first_row: Binding::new(KeyCombination::ctrl(KeyCode::Home), "First row"),
            last_row: Binding::new(KeyCombination::ctrl(KeyCode::End), "Last row"),
            page_up: Binding::new(KeyCombination::new(KeyCode::PageUp), "Page up"),
            page_down: Binding::new(KeyCombination::new(KeyCode::PageDown), "Page down"),
            select_all: Binding::new(KeyCombination::ctrl(KeyCode::Char('a')), "Select all"),
            drill_in: Binding::new(KeyCombination::new(KeyCode::Enter), "Enter cell items"),
            drill_out: Binding::new(KeyCombination::new(KeyCode::Esc), "Leave cell items"),
            help: Binding::new(KeyCombination::new(KeyCode::F(1)), "Help"),
        }
    }
}

impl KeyMap for CursorKeyBindings {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.up, &self.down, &self.left, &self.right, &self.help]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            vec![&self.left, &self.right, &self.first_column, &self.last_column],
            vec![
                &self.up,
                &self.down,
                &self.first_row,
                &self.last_row,
                &self.page_up,
                &self.page_down,
            ],
            vec![&self.select_all],
            vec![&self.drill_in, &self.drill_out],
            vec![&self.help],
        ]
    }
}

/// Position, shift-selection anchor and tab stops of one grid.
#[derive(Debug, Default)]
pub struct CursorState {
    position: Position,
    select_anchor: Option<bool>,
    tab_stops: TabStops,
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Selection value fixed by the first shift-move of the current sequence.
    pub fn selection_anchor(&self) -> Option<bool> {
        self.select_anchor
    }

    /// End the current shift-selection sequence.
    pub fn reset_selection_anchor(&mut self) {
        self.select_anchor = None;
    }

    pub fn tab_stops(&self) -> TabStops {
        self.tab_stops
    }

    /// Record which elements are keyboard-reachable. Only the coordinator
    /// writes this, after it has executed a focus change.
    pub fn set_tab_stops(&mut self, stops: TabStops) {
        self.tab_stops = stops;
    }

    /// Tab stops implied by the current position.
    pub fn expected_tab_stops(&self, grid: &Grid) -> TabStops {
        let p = self.position;
        let body = grid
            .is_row_visible(p.section, p.row)
            .then(|| p.body_target())
            .filter(|t| grid.contains(t));
        TabStops {
            head: p.head_target(),
            body,
        }
    }

    /// Handle a key delivered to a head cell.
    pub fn handle_head_key(
        &mut self,
        grid: &Grid,
        key: &KeyEvent,
        bindings: &CursorKeyBindings,
    ) -> Vec<KeyResponse> {
        if bindings.select_all.matches(key) {
            return select_all(grid);
        }
        match horizontal_column(self.position.column, grid, key, bindings) {
            Some(column) => {
                self.position.column = column;
                self.position.sub_item = None;
                vec![KeyResponse::Focus {
                    target: FocusTarget::Head { column },
                    far: false,
                }]
            }
            None => Vec::new(),
        }
    }

    /// Handle a key delivered to a body cell or sub-item.
    ///
    /// Page keys are handled only when a `pager` is supplied.
    pub fn handle_body_key(
        &mut self,
        grid: &Grid,
        key: &KeyEvent,
        bindings: &CursorKeyBindings,
        pager: Option<&Pager<'_>>,
    ) -> Vec<KeyResponse> {
        if bindings.select_all.matches(key) {
            return select_all(grid);
        }
        if let Some(item) = self.position.sub_item {
            if let Some(responses) = self.handle_sub_item_key(grid, item, key, bindings) {
                return responses;
            }
        }
        if let Some(column) = horizontal_column(self.position.column, grid, key, bindings) {
            let p = self.position;
            if !grid.is_row_visible(p.section, p.row) {
                debug!(?p, "stale position, ignoring horizontal move");
                return Vec::new();
            }
            self.position.column = column;
            self.position.sub_item = None;
            return vec![KeyResponse::Focus {
                target: self.position.cell_target(),
                far: false,
            }];
        }
        if bindings.drill_in.matches(key) {
            return self.drill_in(grid);
        }
        self.vertical(grid, key, bindings, pager)
    }

    // Keys while drilled. `None` lets the key fall through to cell handling.
    fn handle_sub_item_key(
        &mut self,
        grid: &Grid,
        item: usize,
        key: &KeyEvent,
        bindings: &CursorKeyBindings,
    ) -> Option<Vec<KeyResponse>> {
        let p = self.position;
        let drill_out = bindings.drill_out.matches(key);
        let step_back = bindings.left.matches(key) || bindings.up.matches(key);
        let step_forward = bindings.right.matches(key) || bindings.down.matches(key);
        if !drill_out && !step_back && !step_forward {
            return None;
        }
        if !grid.is_row_visible(p.section, p.row) {
            debug!(?p, "stale position, ignoring sub-item key");
            return Some(Vec::new());
        }
        if drill_out {
            self.position.sub_item = None;
            return Some(vec![KeyResponse::Focus {
                target: self.position.cell_target(),
                far: false,
            }]);
        }
        let Some(count) = grid.cell(p.section, p.row, p.column).map(|c| c.sub_items) else {
            debug!(?p, "stale position, ignoring sub-item move");
            return Some(Vec::new());
        };
        let next = if step_back {
            item.checked_sub(1)
        } else {
            Some(item + 1).filter(|&n| n < count)
        };
        Some(match next {
            Some(next) => {
                self.position.sub_item = Some(next);
                vec![KeyResponse::Focus {
                    target: self.position.body_target(),
                    far: false,
                }]
            }
            None => Vec::new(),
        })
    }

    fn drill_in(&mut self, grid: &Grid) -> Vec<KeyResponse> {
        let p = self.position;
        if p.is_drilled() || !grid.schema().is_drillable(p.column) {
            return Vec::new();
        }
        let has_items = grid
            .cell(p.section, p.row, p.column)
            .is_some_and(|c| c.sub_items > 0);
        if !has_items || !grid.is_row_visible(p.section, p.row) {
            return Vec::new();
        }
        self.position.sub_item = Some(0);
        vec![KeyResponse::Focus {
            target: self.position.body_target(),
            far: false,
        }]
    }

    fn vertical(
        &mut self,
        grid: &Grid,
        key: &KeyEvent,
        bindings: &CursorKeyBindings,
        pager: Option<&Pager<'_>>,
    ) -> Vec<KeyResponse> {
        enum Move {
            Step(PageDirection),
            Extreme(PageDirection),
            Page(PageDirection),
        }
        let movement = if bindings.up.matches(key) {
            Move::Step(PageDirection::Up)
        } else if bindings.down.matches(key) {
            Move::Step(PageDirection::Down)
        } else if bindings.first_row.matches(key) {
            Move::Extreme(PageDirection::Up)
        } else if bindings.last_row.matches(key) {
            Move::Extreme(PageDirection::Down)
        } else if pager.is_some() && bindings.page_up.matches(key) {
            Move::Page(PageDirection::Up)
        } else if pager.is_some() && bindings.page_down.matches(key) {
            Move::Page(PageDirection::Down)
        } else {
            return Vec::new();
        };

        let p = self.position;
        let items = grid.visible_cells(p.column);
        let Some(from) = items.iter().position(|t| *t == p.cell_target()) else {
            debug!(?p, "stale position, ignoring vertical move");
            return Vec::new();
        };
        let last = items.len() - 1;
        let (to, far) = match movement {
            Move::Step(PageDirection::Up) => (from.saturating_sub(1), false),
            Move::Step(PageDirection::Down) => ((from + 1).min(last), false),
            Move::Extreme(PageDirection::Up) => (0, true),
            Move::Extreme(PageDirection::Down) => (last, true),
            Move::Page(direction) => match pager {
                Some(pager) => (pager.page_index(&items, from, direction), true),
                None => return Vec::new(),
            },
        };

        let target = items[to];
        let Some((section, row)) = target.row_address() else {
            return Vec::new();
        };
        if !grid.is_row_visible(section, row) {
            debug!(section, row, "vertical target vanished");
            return Vec::new();
        }
        if to == from {
            return vec![KeyResponse::Stop];
        }

        let extend = key.modifiers.contains(KeyModifiers::SHIFT)
            && grid.schema().is_selection(p.column);
        self.position = Position {
            section,
            row,
            column: p.column,
            sub_item: None,
        };
        let focus = KeyResponse::Focus { target, far };
        if !extend {
            return vec![focus];
        }
        let selected = *self.select_anchor.get_or_insert_with(|| {
            !grid.section(p.section).is_some_and(|s| s.selected)
        });
        vec![
            focus,
            KeyResponse::Select {
                selected,
                from_section: p.section,
                to_section: section,
            },
        ]
    }

    /// Move a stale position to the nearest visible row, or to the origin
    /// when nothing is visible.
    pub fn repair(&mut self, grid: &Grid) {
        let old = self.position;
        let Some(section) = nearest_visible(grid.sections().len(), old.section, |s| {
            grid.is_section_visible(s)
        }) else {
            if old != Position::default() {
                debug!(?old, "no visible rows, resetting position");
            }
            self.position = Position::default();
            return;
        };
        let row_count = grid.section(section).map_or(0, |s| s.rows().len());
        let row = nearest_visible(row_count, old.row, |r| grid.is_row_visible(section, r))
            .unwrap_or(0);
        let column = old.column.min(grid.schema().last_index());
        let same_cell = section == old.section && row == old.row && column == old.column;
        let sub_item = old.sub_item.filter(|&item| {
            same_cell
                && grid.schema().is_drillable(column)
                && grid.cell(section, row, column).is_some_and(|c| item < c.sub_items)
        });
        self.position = Position {
            section,
            row,
            column,
            sub_item,
        };
        if self.position != old {
            debug!(?old, new = ?self.position, "repaired position");
        }
    }

    /// Move the position to a clicked element.
    ///
    /// Returns the element that should receive focus when it is not already
    /// the tab stop of its region. Unknown or hidden targets are ignored.
    pub fn resolve_click(&mut self, grid: &Grid, target: FocusTarget) -> Option<FocusTarget> {
        if !grid.contains(&target) {
            return None;
        }
        let current = match target {
            FocusTarget::Head { column } => {
                if column != self.position.column {
                    self.position.column = column;
                    self.position.sub_item = None;
                }
                Some(self.tab_stops.head)
            }
            FocusTarget::Cell {
                section,
                row,
                column,
            } => {
                if !grid.is_row_visible(section, row) {
                    return None;
                }
                self.position = Position {
                    section,
                    row,
                    column,
                    sub_item: None,
                };
                self.tab_stops.body
            }
            FocusTarget::SubItem {
                section,
                row,
                column,
                item,
            } => {
                if !grid.is_row_visible(section, row) || !grid.schema().is_drillable(column) {
                    return None;
                }
                self.position = Position {
                    section,
                    row,
                    column,
                    sub_item: Some(item),
                };
                self.tab_stops.body
            }
        };
        (current != Some(target)).then_some(target)
    }
}

fn horizontal_column(
    column: usize,
    grid: &Grid,
    key: &KeyEvent,
    bindings: &CursorKeyBindings,
) -> Option<usize> {
    let last = grid.schema().last_index();
    if bindings.left.matches(key) {
        Some(column.saturating_sub(1).min(last))
    } else if bindings.right.matches(key) {
        Some((column + 1).min(last))
    } else if bindings.first_column.matches(key) {
        Some(0)
    } else if bindings.last_column.matches(key) {
        Some(last)
    } else {
        None
    }
}

fn select_all(grid: &Grid) -> Vec<KeyResponse> {
    let mut visible = grid.visible_sections();
    let Some(first) = visible.next() else {
        return vec![KeyResponse::Stop];
    };
    let last = visible.last().unwrap_or(first);
    vec![
        KeyResponse::Select {
            selected: !grid.head_selected(),
            from_section: first,
            to_section: last,
        },
        KeyResponse::Stop,
    ]
}

// Probe 0, +1, -1, +2, -2, ... around `from` (clamped into range).
fn nearest_visible(len: usize, from: usize, is_visible: impl Fn(usize) -> bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let from = from.min(len - 1);
    (0..len).find_map(|distance| {
        let after = from + distance;
        if after < len && is_visible(after) {
            return Some(after);
        }
        from.checked_sub(distance)
            .filter(|&before| distance > 0 && is_visible(before))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridRow, Section};
    use crate::pager::ScrollGeometry;
    use crate::schema::{Column, ColumnSchema};
    use ratatui::layout::Rect;

    const SELECT: usize = 0;
    const ID: usize = 1;
    const COMMENT: usize = 3;

    fn schema() -> ColumnSchema {
        ColumnSchema::new(vec![
            Column::selection("select"),
            Column::new("id", "Id"),
            Column::new("date", "Date"),
            Column::new("comment", "Comment").drillable(),
        ])
        .unwrap()
    }

    fn grid(sizes: &[usize]) -> Grid {
        let sections = sizes
            .iter()
            .map(|&n| Section::new((0..n).map(|_| GridRow::new(4)).collect()))
            .collect();
        Grid::new(schema(), sections).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shift(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    fn ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    fn body(state: &mut CursorState, grid: &Grid, key: KeyEvent) -> Vec<KeyResponse> {
        state.handle_body_key(grid, &key, &CursorKeyBindings::default(), None)
    }

    fn head(state: &mut CursorState, grid: &Grid, key: KeyEvent) -> Vec<KeyResponse> {
        state.handle_head_key(grid, &key, &CursorKeyBindings::default())
    }

    fn at(section: usize, row: usize, column: usize) -> Position {
        Position {
            section,
            row,
            column,
            sub_item: None,
        }
    }

    fn near(section: usize, row: usize, column: usize) -> KeyResponse {
        KeyResponse::Focus {
            target: FocusTarget::Cell { section, row, column },
            far: false,
        }
    }

    // ── Horizontal ──

    #[test]
    fn arrow_right_steps_then_clamps() {
        let g = grid(&[2]);
        let mut s = CursorState::new();
        for k in 1..4 {
            assert_eq!(body(&mut s, &g, key(KeyCode::Right)), vec![near(0, 0, k)]);
            assert_eq!(s.position().column, k);
        }
        body(&mut s, &g, key(KeyCode::Right));
        body(&mut s, &g, key(KeyCode::Right));
        assert_eq!(s.position(), at(0, 0, 3));
    }

    #[test]
    fn arrow_left_clamps_at_zero() {
        let g = grid(&[1]);
        let mut s = CursorState::new();
        assert_eq!(body(&mut s, &g, key(KeyCode::Left)), vec![near(0, 0, 0)]);
        assert_eq!(s.position().column, 0);
    }

    #[test]
    fn home_end_are_idempotent() {
        let g = grid(&[3]);
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::End));
        let once = s.position();
        body(&mut s, &g, key(KeyCode::End));
        assert_eq!(s.position(), once);
        assert_eq!(once.column, 3);

        body(&mut s, &g, key(KeyCode::Home));
        let once = s.position();
        body(&mut s, &g, key(KeyCode::Home));
        assert_eq!(s.position(), once);
        assert_eq!(once.column, 0);
    }

    #[test]
    fn head_moves_columns_only() {
        let g = grid(&[3]);
        let mut s = CursorState::new();
        assert_eq!(
            head(&mut s, &g, key(KeyCode::Right)),
            vec![KeyResponse::Focus {
                target: FocusTarget::Head { column: 1 },
                far: false
            }]
        );
        assert!(head(&mut s, &g, key(KeyCode::Down)).is_empty());
        assert!(head(&mut s, &g, key(KeyCode::Enter)).is_empty());
        assert_eq!(s.position(), at(0, 0, 1));
    }

    // ── Vertical ──

    #[test]
    fn arrow_down_walks_across_sections() {
        let g = grid(&[1, 3, 2]);
        let mut s = CursorState::new();
        let expected = [(1, 0), (1, 1), (1, 2), (2, 0), (2, 1)];
        for (section, row) in expected {
            assert_eq!(
                body(&mut s, &g, key(KeyCode::Down)),
                vec![near(section, row, 0)]
            );
        }
        assert_eq!(s.position(), at(2, 1, 0));
        assert_eq!(body(&mut s, &g, key(KeyCode::Down)), vec![KeyResponse::Stop]);
        assert_eq!(s.position(), at(2, 1, 0));
    }

    #[test]
    fn vertical_skips_hidden_rows_and_sections() {
        let mut g = grid(&[1, 3, 2]);
        g.set_section_hidden(1, true);
        g.set_row_hidden(2, 0, true);
        let mut s = CursorState::new();
        assert_eq!(body(&mut s, &g, key(KeyCode::Down)), vec![near(2, 1, 0)]);
        assert_eq!(body(&mut s, &g, key(KeyCode::Up)), vec![near(0, 0, 0)]);
    }

    #[test]
    fn ctrl_home_end_jump_far() {
        let g = grid(&[2, 2, 2]);
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::Right));
        assert_eq!(
            body(&mut s, &g, ctrl(KeyCode::End)),
            vec![KeyResponse::Focus {
                target: FocusTarget::Cell { section: 2, row: 1, column: 1 },
                far: true
            }]
        );
        assert_eq!(s.position(), at(2, 1, 1));
        body(&mut s, &g, ctrl(KeyCode::Home));
        assert_eq!(s.position(), at(0, 0, 1));
    }

    #[test]
    fn page_keys_need_a_pager() {
        let g = grid(&[3]);
        let mut s = CursorState::new();
        assert!(body(&mut s, &g, key(KeyCode::PageDown)).is_empty());
        assert_eq!(s.position(), at(0, 0, 0));
    }

    struct OneLinePerSection;

    impl ScrollGeometry for OneLinePerSection {
        fn viewport(&self) -> Rect {
            Rect::new(0, 0, 80, 10)
        }

        fn target_rect(&self, target: &FocusTarget) -> Option<Rect> {
            let (section, _) = target.row_address()?;
            Some(Rect::new(0, section as u16, 80, 1))
        }
    }

    #[test]
    fn page_down_delegates_to_pager() {
        let g = grid(&[1; 100]);
        let mut s = CursorState::new();
        let pager = Pager::new(&OneLinePerSection);
        let bindings = CursorKeyBindings::default();
        let out = s.handle_body_key(&g, &key(KeyCode::PageDown), &bindings, Some(&pager));
        assert_eq!(
            out,
            vec![KeyResponse::Focus {
                target: FocusTarget::Cell { section: 9, row: 0, column: 0 },
                far: true
            }]
        );
        s.handle_body_key(&g, &key(KeyCode::PageUp), &bindings, Some(&pager));
        assert_eq!(s.position(), at(0, 0, 0));
    }

    #[test]
    fn stale_position_yields_no_response() {
        let mut g = grid(&[3]);
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::Down));
        g.set_row_hidden(0, 1, true);
        assert!(body(&mut s, &g, key(KeyCode::Down)).is_empty());
        assert!(body(&mut s, &g, key(KeyCode::Right)).is_empty());
        s.repair(&g);
        assert_eq!(body(&mut s, &g, key(KeyCode::Up)), vec![near(0, 0, 0)]);
    }

    #[test]
    fn hidden_drilled_row_ignores_sub_item_keys() {
        let mut g = drill_grid();
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::End));
        body(&mut s, &g, key(KeyCode::Enter));
        g.set_row_hidden(0, 0, true);
        assert!(body(&mut s, &g, key(KeyCode::Right)).is_empty());
        assert!(body(&mut s, &g, key(KeyCode::Esc)).is_empty());
        assert_eq!(s.position().sub_item, Some(0));
        s.repair(&g);
        assert_eq!(s.position(), at(0, 1, COMMENT));
    }

    // ── Shift selection ──

    #[test]
    fn shift_move_selects_negated_anchor() {
        let mut g = grid(&[1, 2]);
        let mut s = CursorState::new();
        let out = body(&mut s, &g, shift(KeyCode::Down));
        assert_eq!(
            out,
            vec![
                near(1, 0, SELECT),
                KeyResponse::Select {
                    selected: true,
                    from_section: 0,
                    to_section: 1
                }
            ]
        );
        g.apply_selection(&[
            crate::grid::SelectionChange { section: 0, selected: true },
            crate::grid::SelectionChange { section: 1, selected: true },
        ]);
        // The value is fixed for the rest of the sequence.
        let out = body(&mut s, &g, shift(KeyCode::Down));
        assert_eq!(
            out[1],
            KeyResponse::Select {
                selected: true,
                from_section: 1,
                to_section: 1
            }
        );
        assert_eq!(s.selection_anchor(), Some(true));
    }

    #[test]
    fn shift_sequence_after_reset_uses_new_anchor() {
        let mut g = grid(&[1, 1]);
        g.apply_selection(&[crate::grid::SelectionChange { section: 0, selected: true }]);
        let mut s = CursorState::new();
        s.select_anchor = Some(true);
        s.reset_selection_anchor();
        let out = body(&mut s, &g, shift(KeyCode::Down));
        assert_eq!(
            out[1],
            KeyResponse::Select {
                selected: false,
                from_section: 0,
                to_section: 1
            }
        );
    }

    #[test]
    fn shift_move_at_boundary_only_stops() {
        let g = grid(&[2]);
        let mut s = CursorState::new();
        assert_eq!(body(&mut s, &g, shift(KeyCode::Up)), vec![KeyResponse::Stop]);
        assert_eq!(s.selection_anchor(), None);
    }

    #[test]
    fn shift_outside_selection_column_is_plain_move() {
        let g = grid(&[1, 1]);
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::Right));
        assert_eq!(body(&mut s, &g, shift(KeyCode::Down)), vec![near(1, 0, ID)]);
        assert_eq!(s.selection_anchor(), None);
    }

    #[test]
    fn anchor_survives_column_change() {
        let g = grid(&[1, 1, 1]);
        let mut s = CursorState::new();
        body(&mut s, &g, shift(KeyCode::Down));
        body(&mut s, &g, key(KeyCode::Right));
        body(&mut s, &g, key(KeyCode::Left));
        assert_eq!(s.selection_anchor(), Some(true));
    }

    // ── Select all ──

    #[test]
    fn select_all_on_empty_grid_only_stops() {
        let g = Grid::empty(schema());
        let mut s = CursorState::new();
        assert_eq!(body(&mut s, &g, ctrl(KeyCode::Char('a'))), vec![KeyResponse::Stop]);
        assert_eq!(head(&mut s, &g, ctrl(KeyCode::Char('a'))), vec![KeyResponse::Stop]);
    }

    #[test]
    fn select_all_spans_visible_sections() {
        let mut g = grid(&[1, 1, 1, 1]);
        g.set_section_hidden(0, true);
        g.set_section_hidden(3, true);
        let mut s = CursorState::new();
        let expected = vec![
            KeyResponse::Select {
                selected: true,
                from_section: 1,
                to_section: 2,
            },
            KeyResponse::Stop,
        ];
        assert_eq!(head(&mut s, &g, ctrl(KeyCode::Char('a'))), expected);

        g.apply_selection(&[
            crate::grid::SelectionChange { section: 1, selected: true },
            crate::grid::SelectionChange { section: 2, selected: true },
        ]);
        let out = head(&mut s, &g, ctrl(KeyCode::Char('a')));
        assert!(matches!(out[0], KeyResponse::Select { selected: false, .. }));
    }

    // ── Drilling ──

    fn drill_grid() -> Grid {
        let rows = vec![GridRow::new(4).with_sub_items(COMMENT, 3), GridRow::new(4)];
        Grid::new(schema(), vec![Section::new(rows)]).unwrap()
    }

    fn sub(item: usize) -> KeyResponse {
        KeyResponse::Focus {
            target: FocusTarget::SubItem {
                section: 0,
                row: 0,
                column: COMMENT,
                item,
            },
            far: false,
        }
    }

    #[test]
    fn enter_advance_escape_round_trip() {
        let g = drill_grid();
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::End));
        let before = s.position();

        assert_eq!(body(&mut s, &g, key(KeyCode::Enter)), vec![sub(0)]);
        assert_eq!(body(&mut s, &g, key(KeyCode::Right)), vec![sub(1)]);
        assert_eq!(body(&mut s, &g, key(KeyCode::Down)), vec![sub(2)]);
        assert_eq!(s.position().sub_item, Some(2));

        assert_eq!(body(&mut s, &g, key(KeyCode::Esc)), vec![near(0, 0, COMMENT)]);
        assert_eq!(s.position(), before);
    }

    #[test]
    fn sub_item_ends_let_key_bubble() {
        let g = drill_grid();
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::End));
        body(&mut s, &g, key(KeyCode::Enter));
        assert!(body(&mut s, &g, key(KeyCode::Left)).is_empty());
        assert!(body(&mut s, &g, key(KeyCode::Up)).is_empty());
        body(&mut s, &g, key(KeyCode::Right));
        body(&mut s, &g, key(KeyCode::Right));
        assert!(body(&mut s, &g, key(KeyCode::Right)).is_empty());
        assert_eq!(s.position().sub_item, Some(2));
    }

    #[test]
    fn enter_without_sub_items_is_ignored() {
        let g = drill_grid();
        let mut s = CursorState::new();
        assert!(body(&mut s, &g, key(KeyCode::Enter)).is_empty());
        body(&mut s, &g, key(KeyCode::End));
        body(&mut s, &g, key(KeyCode::Down));
        assert!(body(&mut s, &g, key(KeyCode::Enter)).is_empty());
        assert!(body(&mut s, &g, key(KeyCode::Esc)).is_empty());
    }

    #[test]
    fn horizontal_move_leaves_drilled_state() {
        let g = drill_grid();
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::End));
        body(&mut s, &g, key(KeyCode::Enter));
        assert_eq!(body(&mut s, &g, key(KeyCode::Home)), vec![near(0, 0, 0)]);
        assert_eq!(s.position(), at(0, 0, 0));
    }

    #[test]
    fn vertical_jump_leaves_drilled_state() {
        let g = drill_grid();
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::End));
        body(&mut s, &g, key(KeyCode::Enter));
        body(&mut s, &g, ctrl(KeyCode::End));
        assert_eq!(s.position(), at(0, 1, COMMENT));
    }

    // ── Repair ──

    #[test]
    fn repair_prefers_following_row_at_equal_distance() {
        let mut g = grid(&[1, 3, 2]);
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::Down));
        body(&mut s, &g, key(KeyCode::Down));
        assert_eq!(s.position(), at(1, 1, 0));
        g.set_row_hidden(1, 1, true);
        s.repair(&g);
        assert_eq!(s.position(), at(1, 2, 0));
    }

    #[test]
    fn repair_moves_to_nearest_visible_section() {
        let mut g = grid(&[1, 3, 2]);
        let mut s = CursorState::new();
        body(&mut s, &g, ctrl(KeyCode::End));
        g.set_section_hidden(2, true);
        s.repair(&g);
        assert_eq!(s.position(), at(1, 1, 0));
    }

    #[test]
    fn repair_resets_when_nothing_is_visible() {
        let mut g = grid(&[2, 2]);
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::Right));
        body(&mut s, &g, ctrl(KeyCode::End));
        g.set_section_hidden(0, true);
        g.set_section_hidden(1, true);
        s.repair(&g);
        assert_eq!(s.position(), Position::default());
    }

    #[test]
    fn repair_clears_sub_item_of_moved_row() {
        let mut g = drill_grid();
        let mut s = CursorState::new();
        body(&mut s, &g, key(KeyCode::End));
        body(&mut s, &g, key(KeyCode::Enter));
        s.repair(&g);
        assert_eq!(s.position().sub_item, Some(0));
        g.set_row_hidden(0, 0, true);
        s.repair(&g);
        assert_eq!(s.position(), at(0, 1, COMMENT));
    }

    #[test]
    fn repair_after_removal_clamps_indices() {
        let mut g = grid(&[1, 1, 3]);
        let mut s = CursorState::new();
        body(&mut s, &g, ctrl(KeyCode::End));
        g.remove_section(2);
        s.repair(&g);
        assert_eq!(s.position(), at(1, 0, 0));
    }

    #[test]
    fn nearest_visible_walks_outward() {
        let visible = [false, true, false, false, true];
        assert_eq!(nearest_visible(5, 2, |i| visible[i]), Some(1));
        assert_eq!(nearest_visible(5, 3, |i| visible[i]), Some(4));
        assert_eq!(nearest_visible(5, 9, |i| visible[i]), Some(4));
        assert_eq!(nearest_visible(0, 0, |_| true), None);
        assert_eq!(nearest_visible(3, 1, |_| false), None);
    }

    // ── Clicks and tab stops ──

    #[test]
    fn click_moves_position_and_reports_new_stop() {
        let g = drill_grid();
        let mut s = CursorState::new();
        s.set_tab_stops(s.expected_tab_stops(&g));
        let cell = FocusTarget::Cell { section: 0, row: 1, column: 2 };
        assert_eq!(s.resolve_click(&g, cell), Some(cell));
        assert_eq!(s.position(), at(0, 1, 2));
        s.set_tab_stops(s.expected_tab_stops(&g));
        assert_eq!(s.resolve_click(&g, cell), None);
    }

    #[test]
    fn click_on_sub_item_drills_in() {
        let g = drill_grid();
        let mut s = CursorState::new();
        let item = FocusTarget::SubItem { section: 0, row: 0, column: COMMENT, item: 2 };
        assert_eq!(s.resolve_click(&g, item), Some(item));
        assert_eq!(s.position().sub_item, Some(2));
        assert_eq!(s.expected_tab_stops(&g).body, Some(item));
        assert_eq!(
            s.expected_tab_stops(&g).head,
            FocusTarget::Head { column: COMMENT }
        );
    }

    #[test]
    fn click_on_hidden_or_missing_target_is_ignored() {
        let mut g = grid(&[2]);
        g.set_row_hidden(0, 1, true);
        let mut s = CursorState::new();
        assert_eq!(
            s.resolve_click(&g, FocusTarget::Cell { section: 0, row: 1, column: 0 }),
            None
        );
        assert_eq!(
            s.resolve_click(&g, FocusTarget::Cell { section: 4, row: 0, column: 0 }),
            None
        );
        assert_eq!(s.position(), Position::default());
    }

    #[test]
    fn click_on_head_changes_column() {
        let g = grid(&[1]);
        let mut s = CursorState::new();
        let h = FocusTarget::Head { column: 2 };
        assert_eq!(s.resolve_click(&g, h), Some(h));
        assert_eq!(s.position().column, 2);
    }

    #[test]
    fn empty_grid_has_no_body_stop() {
        let g = Grid::empty(schema());
        let s = CursorState::new();
        assert_eq!(s.expected_tab_stops(&g).body, None);
    }

    #[test]
    fn unknown_keys_are_not_handled() {
        let g = grid(&[2]);
        let mut s = CursorState::new();
        assert!(body(&mut s, &g, key(KeyCode::Char('x'))).is_empty());
        assert!(body(&mut s, &g, key(KeyCode::Tab)).is_empty());
    }
}
