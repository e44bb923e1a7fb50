//! # Grid Cursor Example
//!
//! Drives a [`Cursor`] over a small issue list straight from crossterm events:
//! - Forwarding key events tagged with the focused [`Region`]
//! - Mapping the cursor's outbound messages into the host's own message type
//! - Handling `Unhandled` keys (Tab switches region, `f` filters, `q` quits)
//! - Drawing the table, the short help line and the F1 overlay
//!
//! Run with: `cargo run --example grid_cursor`

use std::collections::VecDeque;
use std::io::stdout;

use tabula::crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use tabula::crossterm::execute;
use tabula::crossterm::terminal::supports_keyboard_enhancement;
use tabula::grid::cursor::Message as CursorMsg;
use tabula::grid::help::ContextHelp;
use tabula::grid::{
    Column, ColumnSchema, Cursor, CursorKeyBindings, FocusTarget, Grid, GridRow, Region,
    ScrollBehavior, Section,
};
use tabula::ratatui::layout::{Constraint, Layout, Rect};
use tabula::ratatui::style::{Color, Modifier, Style};
use tabula::ratatui::text::{Line, Span};
use tabula::ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use tabula::ratatui::{DefaultTerminal, Frame};
use tabula::{Command, Component, TerminalEvent};

struct Issue {
    id: u32,
    lines: &'static [&'static str],
    tags: &'static [&'static str],
}

const ISSUES: &[Issue] = &[
    Issue { id: 101, lines: &["Crash on empty file"], tags: &["bug", "p1"] },
    Issue {
        id: 102,
        lines: &["Slow startup", "  regression since 0.4"],
        tags: &["perf"],
    },
    Issue { id: 103, lines: &["Add dark theme"], tags: &["ui", "good first issue", "theme"] },
    Issue {
        id: 104,
        lines: &["Config reload", "  watch the file", "  keep old values on error"],
        tags: &[],
    },
    Issue { id: 105, lines: &["Typo in README"], tags: &["docs"] },
];

const COLUMNS: usize = 4;
const TAGS: usize = 3;

fn build_grid() -> Result<Grid, Box<dyn std::error::Error>> {
    let schema = ColumnSchema::new(vec![
        Column::selection("select"),
        Column::new("id", "Id"),
        Column::new("title", "Title"),
        Column::new("tags", "Tags").drillable(),
    ])?;
    let sections = ISSUES
        .iter()
        .map(|issue| {
            let rows = (0..issue.lines.len())
                .map(|row| {
                    let tags = if row == 0 { issue.tags.len() } else { 0 };
                    GridRow::new(COLUMNS).with_sub_items(TAGS, tags)
                })
                .collect();
            Section::new(rows)
        })
        .collect();
    Ok(Grid::new(schema, sections)?)
}

#[derive(Debug)]
enum Msg {
    Cursor(CursorMsg),
    ToggleFilter,
    Quit,
}

struct App {
    cursor: Cursor,
    region: Region,
    filtered: bool,
    status: String,
    quit: bool,
}

impl App {
    fn new(grid: Grid) -> Self {
        let help = ContextHelp::new(&CursorKeyBindings::default());
        Self {
            cursor: Cursor::new(grid).with_help(help),
            region: Region::Body,
            filtered: false,
            status: String::from("Tab switches between head and body"),
            quit: false,
        }
    }

    // Keys the cursor leaves to the host.
    fn unhandled(&mut self, key: KeyEvent) -> Command<Msg> {
        match key.code {
            KeyCode::Char('q') => Command::message(Msg::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Command::message(Msg::Quit)
            }
            KeyCode::Char('f') => Command::message(Msg::ToggleFilter),
            KeyCode::Tab | KeyCode::BackTab => {
                let stops = self.cursor.tab_stops();
                let target = match self.region {
                    Region::Head => stops.body,
                    Region::Body => Some(stops.head),
                };
                match target {
                    Some(target) => {
                        self.region = if target.is_head() { Region::Head } else { Region::Body };
                        self.cursor.update(CursorMsg::Click(target)).map(Msg::Cursor)
                    }
                    None => Command::none(),
                }
            }
            _ => Command::none(),
        }
    }

    fn on_cursor(&mut self, msg: CursorMsg) -> Command<Msg> {
        match msg {
            CursorMsg::ScrollIntoView { target, behavior } => {
                let how = match behavior {
                    ScrollBehavior::Instant => "step",
                    ScrollBehavior::Smooth => "jump",
                };
                self.status = format!("{how} to {target:?}");
                Command::none()
            }
            CursorMsg::SelectionChanged(changes) => {
                let ids: Vec<String> = changes
                    .iter()
                    .map(|c| format!("#{}={}", ISSUES[c.section].id, c.selected))
                    .collect();
                self.status = format!("selection {}", ids.join(" "));
                Command::none()
            }
            CursorMsg::Unhandled(key) => self.unhandled(key),
            inbound => self.cursor.update(inbound).map(Msg::Cursor),
        }
    }

    fn focus(&self) -> FocusTarget {
        let stops = self.cursor.tab_stops();
        match self.region {
            Region::Head => stops.head,
            Region::Body => self
                .cursor
                .focus_target()
                .filter(|t| !t.is_head())
                .or(stops.body)
                .unwrap_or(stops.head),
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect) {
        let grid = self.cursor.grid();
        let focus = self.focus();
        let focused = Style::default().fg(Color::Black).bg(Color::Cyan);

        let header = Row::new(grid.schema().columns().iter().enumerate().map(|(column, c)| {
            let label = if c.is_selection {
                checkbox(grid.head_selected()).to_string()
            } else {
                c.head.clone()
            };
            let cell = Cell::from(label);
            if focus == (FocusTarget::Head { column }) {
                cell.style(focused)
            } else {
                cell
            }
        }))
        .style(Style::default().add_modifier(Modifier::BOLD));

        let mut rows = Vec::new();
        for section in grid.visible_sections() {
            let issue = &ISSUES[section];
            let selected = grid.section(section).is_some_and(|s| s.selected);
            for (row, line) in issue.lines.iter().enumerate() {
                if !grid.is_row_visible(section, row) {
                    continue;
                }
                let at = |column| FocusTarget::Cell { section, row, column };
                let style_for = |column| if focus == at(column) { focused } else { Style::default() };
                let tags: Vec<Span> = if row == 0 {
                    issue
                        .tags
                        .iter()
                        .enumerate()
                        .map(|(item, tag)| {
                            let sub = FocusTarget::SubItem { section, row, column: TAGS, item };
                            let style = if focus == sub { focused } else { Style::default() };
                            Span::styled(format!("[{tag}] "), style)
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                rows.push(Row::new(vec![
                    Cell::from(if row == 0 { checkbox(selected) } else { "" }).style(style_for(0)),
                    Cell::from(if row == 0 { format!("#{}", issue.id) } else { String::new() })
                        .style(style_for(1)),
                    Cell::from(*line).style(style_for(2)),
                    Cell::from(Line::from(tags)).style(style_for(TAGS)),
                ]));
            }
        }

        let widths = [
            Constraint::Length(4),
            Constraint::Length(6),
            Constraint::Fill(1),
            Constraint::Fill(1),
        ];
        let title = if self.filtered { " Issues (filtered) " } else { " Issues " };
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(table, area);
    }
}

fn checkbox(selected: bool) -> &'static str {
    if selected {
        "[x]"
    } else {
        "[ ]"
    }
}

impl Component for App {
    type Message = Msg;

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Cursor(msg) => self.on_cursor(msg),
            Msg::ToggleFilter => {
                // Hide every issue without tags.
                self.filtered = !self.filtered;
                for (section, issue) in ISSUES.iter().enumerate() {
                    let hidden = self.filtered && issue.tags.is_empty();
                    self.cursor.grid_mut().set_section_hidden(section, hidden);
                }
                self.cursor.update_tab_index();
                Command::none()
            }
            Msg::Quit => {
                self.quit = true;
                Command::none()
            }
        }
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let [table, status, help] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.draw_table(frame, table);
        frame.render_widget(
            Paragraph::new(self.status.as_str()).style(Style::default().fg(Color::DarkGray)),
            status,
        );
        if let Some(h) = self.cursor.help() {
            frame.render_widget(Paragraph::new(h.short_help_line()), help);
        }
        self.cursor.view(frame, area);
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> std::io::Result<()> {
    let mut queue = VecDeque::new();
    while !app.quit {
        terminal.draw(|frame| app.view(frame, frame.area()))?;

        let event = TerminalEvent::from(event::read()?);
        if let Some(msg) = CursorMsg::from_event(app.region, event) {
            queue.push_back(Msg::Cursor(msg));
        }
        while let Some(msg) = queue.pop_front() {
            queue.extend(app.update(msg).into_messages());
        }
    }
    Ok(())
}

// Terminal modes the cursor benefits from, undone before returning.
fn session(terminal: &mut DefaultTerminal, app: &mut App) -> std::io::Result<()> {
    // Shift releases end a selection sequence; only some terminals report them.
    let enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if enhanced {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        )?;
    }
    execute!(stdout(), EnableFocusChange)?;

    let result = run(terminal, app);

    execute!(stdout(), DisableFocusChange)?;
    if enhanced {
        execute!(stdout(), PopKeyboardEnhancementFlags)?;
    }
    result
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(build_grid()?);

    let mut terminal = tabula::ratatui::init();
    let result = session(&mut terminal, &mut app);
    tabula::ratatui::restore();
    result?;
    Ok(())
}
