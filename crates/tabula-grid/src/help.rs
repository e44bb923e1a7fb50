//! Contextual key help: a short status line and a scrollable overlay.

use std::cell::Cell;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use tabula_core::command::Command;
use tabula_core::component::Component;
use unicode_width::UnicodeWidthStr;

use crate::key::{Binding, KeyMap};
use crate::state::CursorKeyBindings;

/// Messages for the help component.
#[derive(Debug, Clone)]
pub enum Message {
    /// A key press forwarded while the overlay is open.
    KeyPress(KeyEvent),
    Toggle,
    Show,
    Hide,
    /// Switch the bindings shown to those of another context.
    SetContext(HelpContext),
}

/// Which part of the grid the help describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelpContext {
    Head,
    #[default]
    Body,
    SubItems,
}

/// One line of help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// Key label, e.g. `"ctrl+home"`.
    pub keys: String,
    pub description: String,
    /// Heading the entry is listed under in the overlay.
    pub group: String,
}

impl HelpEntry {
    fn from_binding(binding: &Binding, group: &str) -> Self {
        Self {
            keys: binding.keys_label(),
            description: binding.description.clone(),
            group: group.to_string(),
        }
    }
}

/// Visual style configuration for [`ContextHelp`].
#[derive(Debug, Clone)]
pub struct HelpStyle {
    pub key: Style,
    pub description: Style,
    pub group: Style,
    pub border: Style,
    pub title: Style,
}

impl Default for HelpStyle {
    fn default() -> Self {
        Self {
            key: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            description: Style::default().fg(Color::White),
            group: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::DarkGray),
            title: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        }
    }
}

const GROUPS: [&str; 5] = ["Columns", "Rows", "Selection", "Cell items", "General"];
const SHORT_ENTRIES: usize = 5;

/// Help for the grid cursor, switching its content with the focused region.
pub struct ContextHelp {
    head: Vec<HelpEntry>,
    body: Vec<HelpEntry>,
    sub_items: Vec<HelpEntry>,
    short_body: Vec<HelpEntry>,
    context: HelpContext,
    visible: bool,
    style: HelpStyle,
    separator: String,
    max_width: Option<u16>,
    ellipsis: String,
    scroll_offset: usize,
    visible_height: Cell<u16>,
}

impl ContextHelp {
    /// Build the help entries of every context from a set of cursor bindings.
    /// Disabled bindings are left out.
    pub fn new(bindings: &CursorKeyBindings) -> Self {
        let body = bindings
            .full_help()
            .into_iter()
            .zip(GROUPS)
            .flat_map(|(group, name)| entries(group, name))
            .collect();
        let short_body = entries(bindings.short_help(), "");
        let head = [
            entries(
                vec![
                    &bindings.left,
                    &bindings.right,
                    &bindings.first_column,
                    &bindings.last_column,
                ],
                "Columns",
            ),
            entries(vec![&bindings.select_all], "Selection"),
            entries(vec![&bindings.help], "General"),
        ]
        .concat();

        let mut sub_items = Vec::new();
        for (a, b, description) in [
            (&bindings.left, &bindings.up, "Previous item"),
            (&bindings.right, &bindings.down, "Next item"),
        ] {
            let keys: Vec<String> = [a, b]
                .iter()
                .filter(|binding| binding.enabled)
                .map(|binding| binding.keys_label())
                .collect();
            if !keys.is_empty() {
                sub_items.push(HelpEntry {
                    keys: keys.join("/"),
                    description: description.to_string(),
                    group: "Cell items".to_string(),
                });
            }
        }
        sub_items.extend(entries(vec![&bindings.drill_out], "Cell items"));
        sub_items.extend(entries(vec![&bindings.help], "General"));

        Self {
            head,
            body,
            sub_items,
            short_body,
            context: HelpContext::default(),
            visible: false,
            style: HelpStyle::default(),
            separator: " \u{2022} ".to_string(),
            max_width: None,
            ellipsis: "\u{2026}".to_string(),
            scroll_offset: 0,
            visible_height: Cell::new(24),
        }
    }

    pub fn with_style(mut self, style: HelpStyle) -> Self {
        self.style = style;
        self
    }

    /// Separator between entries of the short line.
    pub fn with_separator(mut self, s: impl Into<String>) -> Self {
        self.separator = s.into();
        self
    }

    /// Truncate the short line to `w` terminal columns.
    pub fn with_max_width(mut self, w: u16) -> Self {
        self.max_width = Some(w);
        self
    }

    pub fn with_ellipsis(mut self, s: impl Into<String>) -> Self {
        self.ellipsis = s.into();
        self
    }

    pub fn context(&self) -> HelpContext {
        self.context
    }

    /// Switch context. The overlay scroll restarts at the top when it changes.
    pub fn set_context(&mut self, context: HelpContext) {
        if self.context != context {
            self.context = context;
            self.scroll_offset = 0;
        }
    }

    /// Entries of the current context, in overlay order.
    pub fn entries(&self) -> &[HelpEntry] {
        match self.context {
            HelpContext::Head => &self.head,
            HelpContext::Body => &self.body,
            HelpContext::SubItems => &self.sub_items,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.scroll_offset = 0;
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.scroll_offset = 0;
    }

    pub fn toggle(&mut self) {
        if self.visible {
            self.hide();
        } else {
            self.show();
        }
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    fn short_entries(&self) -> &[HelpEntry] {
        match self.context {
            HelpContext::Body => &self.short_body,
            _ => self.entries(),
        }
    }

    /// A one-line summary for a status bar, bounded by the configured width.
    pub fn short_help_line(&self) -> Line<'_> {
        let mut spans: Vec<Span> = Vec::new();
        let mut total_width = 0;
        let max = self.max_width.map(usize::from);
        let separator_width = self.separator.width();

        for (idx, entry) in self.short_entries().iter().take(SHORT_ENTRIES).enumerate() {
            let entry_width = entry.keys.width() + 1 + entry.description.width();
            let sep_width = if idx > 0 { separator_width } else { 0 };

            if let Some(max_w) = max {
                if total_width + sep_width + entry_width > max_w {
                    spans.push(Span::raw(self.ellipsis.as_str()));
                    break;
                }
            }
            if idx > 0 {
                spans.push(Span::raw(self.separator.as_str()));
                total_width += sep_width;
            }
            spans.push(Span::styled(entry.keys.as_str(), self.style.key));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(entry.description.as_str(), self.style.description));
            total_width += entry_width;
        }
        Line::from(spans)
    }

    // Overlay lines of the current context, grouped under headings.
    fn overlay_lines(&self) -> Vec<Line<'_>> {
        let key_width = self
            .entries()
            .iter()
            .map(|e| e.keys.width())
            .max()
            .unwrap_or(0)
            + 2;
        let mut lines = Vec::new();
        let mut current_group: Option<&str> = None;
        for entry in self.entries() {
            if current_group != Some(entry.group.as_str()) {
                if current_group.is_some() {
                    lines.push(Line::raw(""));
                }
                lines.push(Line::from(Span::styled(entry.group.as_str(), self.style.group)));
                current_group = Some(entry.group.as_str());
            }
            let pad = key_width.saturating_sub(entry.keys.width());
            lines.push(Line::from(vec![
                Span::styled(format!("{}{}", entry.keys, " ".repeat(pad)), self.style.key),
                Span::styled(entry.description.as_str(), self.style.description),
            ]));
        }
        lines
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.entries().len();
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta).min(max);
    }
}

fn entries(bindings: Vec<&Binding>, group: &str) -> Vec<HelpEntry> {
    bindings
        .into_iter()
        .filter(|b| b.enabled)
        .map(|b| HelpEntry::from_binding(b, group))
        .collect()
}

impl Default for ContextHelp {
    fn default() -> Self {
        Self::new(&CursorKeyBindings::default())
    }
}

impl Component for ContextHelp {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::KeyPress(key) if self.visible => {
                let page = self.visible_height.get() as isize;
                match key.code {
                    KeyCode::Esc => self.hide(),
                    KeyCode::Up => self.scroll_by(-1),
                    KeyCode::Down => self.scroll_by(1),
                    KeyCode::PageUp => self.scroll_by(-page),
                    KeyCode::PageDown => self.scroll_by(page),
                    KeyCode::Home => self.scroll_offset = 0,
                    // view() clamps to the real maximum.
                    KeyCode::End => self.scroll_offset = self.entries().len(),
                    _ => {}
                }
            }
            Message::KeyPress(_) => {}
            Message::Toggle => self.toggle(),
            Message::Show => self.show(),
            Message::Hide => self.hide(),
            Message::SetContext(context) => self.set_context(context),
        }
        Command::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }
        let lines = self.overlay_lines();

        let width = area.width.min(60);
        let wanted = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
        let height = area.height.min(wanted.min(20));
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let overlay = Rect::new(x, y, width, height);

        frame.render_widget(Clear, overlay);

        let title = match self.context {
            HelpContext::Head => " Help: column heads ",
            HelpContext::Body => " Help: rows ",
            HelpContext::SubItems => " Help: cell items ",
        };
        let block = Block::default()
            .title(title)
            .title_style(self.style.title)
            .borders(Borders::ALL)
            .border_style(self.style.border);

        let inner_height = block.inner(overlay).height;
        self.visible_height.set(inner_height);
        let max_scroll = lines.len().saturating_sub(usize::from(inner_height));
        let offset = self.scroll_offset.min(max_scroll);

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));

        frame.render_widget(paragraph, overlay);
    }
}
