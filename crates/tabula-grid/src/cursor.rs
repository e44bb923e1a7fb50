//! The grid cursor component.
//!
//! [`Cursor`] owns a [`Grid`] and its [`CursorState`]. The host forwards key
//! events tagged with the region that had focus, clicked targets, and focus
//! loss; the cursor answers with [`Message::ScrollIntoView`] for every focus
//! move, [`Message::SelectionChanged`] for checkbox changes, and
//! [`Message::Unhandled`] for keys the host should process itself.
//!
//! The cursor does not draw the grid. Its [`view`](Component::view) only
//! renders the help overlay when one is configured and open.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, ModifierKeyCode};
use ratatui::layout::Rect;
use ratatui::Frame;
use tabula_core::command::Command;
use tabula_core::component::Component;
use tabula_core::event::TerminalEvent;
use tracing::{debug, trace};

use crate::grid::{FocusTarget, Grid, SelectionChange};
use crate::help::{self, ContextHelp, HelpContext};
use crate::pager::{Pager, ScrollGeometry};
use crate::state::{CursorKeyBindings, CursorState, KeyResponse, Position, Region, TabStops};

/// How a focus move should scroll its target into view.
///
/// Neither behavior centers the target; it is scrolled just far enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Step moves: jump without animation.
    Instant,
    /// Far jumps (first/last row, pages): animate.
    Smooth,
}

/// Messages for the cursor component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A key event delivered to the head or the body.
    Key { region: Region, key: KeyEvent },
    /// The user clicked a focusable element.
    Click(FocusTarget),
    /// Keyboard focus left the grid.
    FocusLost,
    /// Outbound: `target` received focus and should be scrolled into view.
    ScrollIntoView {
        target: FocusTarget,
        behavior: ScrollBehavior,
    },
    /// Outbound: selection values changed, in visible document order.
    SelectionChanged(Vec<SelectionChange>),
    /// Outbound: the cursor did not handle this key.
    Unhandled(KeyEvent),
}

impl Message {
    /// Translate a terminal event received while `region` had focus.
    pub fn from_event(region: Region, event: TerminalEvent) -> Option<Self> {
        match event {
            TerminalEvent::Key(key) => Some(Message::Key { region, key }),
            TerminalEvent::FocusLost => Some(Message::FocusLost),
            _ => None,
        }
    }
}

/// Receives every resolved selection change along with the grid.
pub type SelectionHandler = Box<dyn FnMut(&mut Grid, &[SelectionChange]) + Send>;

/// Keyboard navigation engine for one grid.
pub struct Cursor {
    grid: Grid,
    state: CursorState,
    bindings: CursorKeyBindings,
    geometry: Option<Box<dyn ScrollGeometry + Send>>,
    on_select: Option<SelectionHandler>,
    help: Option<ContextHelp>,
    focus: Option<FocusTarget>,
    has_focus: bool,
}

impl Cursor {
    /// Bind a cursor to `grid`, starting at the first cell.
    pub fn new(grid: Grid) -> Self {
        let mut cursor = Self {
            grid,
            state: CursorState::new(),
            bindings: CursorKeyBindings::default(),
            geometry: None,
            on_select: None,
            help: None,
            focus: None,
            has_focus: false,
        };
        cursor.update_tab_index();
        cursor
    }

    /// Replace the default key bindings.
    pub fn with_key_bindings(mut self, bindings: CursorKeyBindings) -> Self {
        self.bindings = bindings;
        self
    }

    /// Enable page keys, measured against the given scroll container.
    pub fn with_scroll_geometry(mut self, geometry: impl ScrollGeometry + Send + 'static) -> Self {
        self.geometry = Some(Box::new(geometry));
        self
    }

    /// Route selection changes to `handler` instead of storing them on the grid.
    pub fn with_selection_handler(
        mut self,
        handler: impl FnMut(&mut Grid, &[SelectionChange]) + Send + 'static,
    ) -> Self {
        self.on_select = Some(Box::new(handler));
        self
    }

    /// Attach a help overlay, toggled by the help binding.
    ///
    /// Build it with [`ContextHelp::new`] from the same bindings so the
    /// listed keys match.
    pub fn with_help(mut self, help: ContextHelp) -> Self {
        self.help = Some(help);
        self
    }

    /// The grid snapshot the cursor navigates.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Mutable access for the host. Call [`update_tab_index`](Self::update_tab_index)
    /// after changing visibility or structure.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Current body position. May be stale until the next
    /// [`update_tab_index`](Self::update_tab_index) if the host hid its row.
    pub fn position(&self) -> Position {
        self.state.position()
    }

    /// The head cell and body element reachable with Tab.
    pub fn tab_stops(&self) -> TabStops {
        self.state.tab_stops()
    }

    /// The element that last received focus from the cursor.
    pub fn focus_target(&self) -> Option<FocusTarget> {
        self.focus
    }

    /// The attached help overlay, if any.
    pub fn help(&self) -> Option<&ContextHelp> {
        self.help.as_ref()
    }

    /// Bindings in effect, e.g. for building a [`ContextHelp`].
    pub fn key_bindings(&self) -> &CursorKeyBindings {
        &self.bindings
    }

    /// Replace the grid and discard the position.
    pub fn reset(&mut self, grid: Grid) {
        debug!(sections = grid.sections().len(), "cursor reset");
        self.grid = grid;
        self.state = CursorState::new();
        self.focus = None;
        self.update_tab_index();
    }

    /// Repair the position after the host changed the grid and refresh the
    /// keyboard-reachable elements.
    pub fn update_tab_index(&mut self) {
        self.state.repair(&self.grid);
        self.refresh_tab_stops();
        if let Some(target) = self.focus {
            let reachable = target.row_address().map_or(true, |(section, row)| {
                self.grid.is_row_visible(section, row)
            });
            if !reachable || !self.grid.contains(&target) {
                self.focus = None;
            }
        }
    }

    fn refresh_tab_stops(&mut self) {
        let stops = self.state.expected_tab_stops(&self.grid);
        self.state.set_tab_stops(stops);
    }

    fn handle_key(&mut self, region: Region, key: KeyEvent) -> Command<Message> {
        if key.kind == KeyEventKind::Release {
            if is_shift(&key) {
                self.state.reset_selection_anchor();
            }
            return Command::none();
        }
        trace!(?region, code = ?key.code, modifiers = ?key.modifiers, "cursor key");
        self.has_focus = true;

        if let Some(help) = self.help.as_mut() {
            if self.bindings.help.matches(&key) {
                help.set_context(help_context(region, self.state.position()));
                help.toggle();
                return Command::none();
            }
            if help.is_visible() {
                help.update(help::Message::KeyPress(key));
                return Command::none();
            }
        }

        let responses = match region {
            Region::Head => self
                .state
                .handle_head_key(&self.grid, &key, &self.bindings),
            Region::Body => {
                let pager = self.geometry.as_deref().map(|g| Pager::new(g));
                self.state
                    .handle_body_key(&self.grid, &key, &self.bindings, pager.as_ref())
            }
        };
        self.execute(responses, key)
    }

    fn execute(&mut self, responses: Vec<KeyResponse>, key: KeyEvent) -> Command<Message> {
        if responses.is_empty() {
            return Command::message(Message::Unhandled(key));
        }
        let mut cmds = Vec::with_capacity(responses.len());
        for response in responses {
            match response {
                KeyResponse::Stop => {}
                KeyResponse::Focus { target, far } => {
                    let behavior = if far {
                        ScrollBehavior::Smooth
                    } else {
                        ScrollBehavior::Instant
                    };
                    self.focus_on(target);
                    cmds.push(Command::message(Message::ScrollIntoView { target, behavior }));
                }
                KeyResponse::Select {
                    selected,
                    from_section,
                    to_section,
                } => cmds.push(self.select(selected, from_section, to_section)),
            }
        }
        Command::sequence(cmds)
    }

    fn focus_on(&mut self, target: FocusTarget) {
        self.focus = Some(target);
        self.refresh_tab_stops();
        if let Some(help) = self.help.as_mut() {
            help.set_context(help_context_of(&target));
        }
    }

    fn select(&mut self, selected: bool, from: usize, to: usize) -> Command<Message> {
        let changes = selection_range(&self.grid, selected, from, to);
        debug!(from, to, selected, count = changes.len(), "selection range");
        if changes.is_empty() {
            return Command::none();
        }
        match self.on_select.as_mut() {
            Some(handler) => handler(&mut self.grid, &changes),
            None => self.grid.apply_selection(&changes),
        }
        Command::message(Message::SelectionChanged(changes))
    }

    fn click(&mut self, target: FocusTarget) -> Command<Message> {
        self.has_focus = true;
        if self.state.resolve_click(&self.grid, target).is_some() {
            self.refresh_tab_stops();
        }
        let stops = self.state.tab_stops();
        if stops.head == target || stops.body == Some(target) {
            self.focus_on(target);
        }
        Command::none()
    }
}

// Visible sections between the two bounds inclusive, in document order.
fn selection_range(grid: &Grid, selected: bool, from: usize, to: usize) -> Vec<SelectionChange> {
    let mut changes = Vec::new();
    let mut inside = false;
    for section in grid.visible_sections() {
        let is_bound = section == from || section == to;
        if !inside {
            if !is_bound {
                continue;
            }
            inside = true;
            changes.push(SelectionChange { section, selected });
            if from == to {
                break;
            }
            continue;
        }
        changes.push(SelectionChange { section, selected });
        if is_bound {
            break;
        }
    }
    changes
}

fn is_shift(key: &KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift)
    )
}

fn help_context(region: Region, position: Position) -> HelpContext {
    match region {
        Region::Head => HelpContext::Head,
        Region::Body if position.is_drilled() => HelpContext::SubItems,
        Region::Body => HelpContext::Body,
    }
}

fn help_context_of(target: &FocusTarget) -> HelpContext {
    match target {
        FocusTarget::Head { .. } => HelpContext::Head,
        FocusTarget::Cell { .. } => HelpContext::Body,
        FocusTarget::SubItem { .. } => HelpContext::SubItems,
    }
}

impl Component for Cursor {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::Key { region, key } => self.handle_key(region, key),
            Message::Click(target) => self.click(target),
            Message::FocusLost => {
                self.has_focus = false;
                self.state.reset_selection_anchor();
                Command::none()
            }
            Message::ScrollIntoView { .. } | Message::SelectionChanged(_) | Message::Unhandled(_) => {
                Command::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        if let Some(help) = &self.help {
            help.view(frame, area);
        }
    }

    fn focused(&self) -> bool {
        self.has_focus
    }
}
