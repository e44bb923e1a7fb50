use crate::command::Command;
use crate::component::Component;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::Terminal;

/// A headless harness that drives a [`Component`] without a real terminal.
///
/// Every message sent through [`send`](TestHarness::send) goes straight to
/// [`Component::update`]; the messages in the returned [`Command`] are kept
/// in an outbox, in delivery order, instead of being fed back. Tests inspect
/// them with [`take_messages`](TestHarness::take_messages), the way a parent
/// would observe child notifications.
///
/// # Example
///
/// ```rust,ignore
/// use tabula_core::testing::TestHarness;
///
/// let mut h = TestHarness::new(cursor);
/// h.send(Message::Key { region: Region::Body, key: down });
/// let out = h.take_messages();
/// assert!(matches!(out[0], Message::ScrollIntoView { .. }));
/// ```
pub struct TestHarness<C: Component> {
    component: C,
    outbox: Vec<C::Message>,
}

impl<C: Component> TestHarness<C> {
    /// Wrap a component.
    pub fn new(component: C) -> Self {
        Self {
            component,
            outbox: Vec::new(),
        }
    }

    /// Send a message, triggering a single update cycle.
    pub fn send(&mut self, msg: C::Message) {
        let cmd = self.component.update(msg);
        self.collect(cmd);
    }

    /// Remove and return every message collected so far.
    pub fn take_messages(&mut self) -> Vec<C::Message> {
        std::mem::take(&mut self.outbox)
    }

    /// Messages collected so far, without draining them.
    pub fn messages(&self) -> &[C::Message] {
        &self.outbox
    }

    /// Get a shared reference to the component for assertions.
    pub fn component(&self) -> &C {
        &self.component
    }

    /// Get a mutable reference to the component for direct test setup.
    pub fn component_mut(&mut self) -> &mut C {
        &mut self.component
    }

    /// Render the component into a [`Buffer`] of the given dimensions.
    pub fn render(&self, width: u16, height: u16) -> Buffer {
        let backend = ratatui::backend::TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).expect("test backend never fails");
        terminal
            .draw(|frame| {
                self.component.view(frame, frame.area());
            })
            .expect("test backend never fails");
        terminal.backend().buffer().clone()
    }

    /// Render the component and return the visible content as a plain string.
    ///
    /// Buffer rows are separated by newlines; trailing whitespace is kept.
    pub fn render_string(&self, width: u16, height: u16) -> String {
        let buf = self.render(width, height);
        let area = Rect::new(0, 0, width, height);
        let mut output = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                output.push_str(buf[(x, y)].symbol());
            }
            if y < area.bottom() - 1 {
                output.push('\n');
            }
        }
        output
    }

    fn collect(&mut self, cmd: Command<C::Message>) {
        self.outbox.extend(cmd.into_messages());
    }
}
