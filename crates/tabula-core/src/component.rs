use crate::command::Command;
use ratatui::{layout::Rect, Frame};

/// A reusable piece of interactive state that renders into a given [`Rect`].
///
/// A parent owns its components, forwards them messages through
/// [`update`](Component::update), and decides *where* each one renders by
/// passing a sub-region of the frame to [`view`](Component::view).
///
/// # Composition pattern
///
/// Wrap the component's message type in a variant of the parent message and
/// use [`Command::map`] to translate commands:
///
/// ```rust,ignore
/// use tabula_core::{Command, Component};
///
/// struct Screen { cursor: tabula_grid::cursor::Cursor }
///
/// enum ScreenMsg { Cursor(tabula_grid::cursor::Message) }
///
/// impl Screen {
///     fn update(&mut self, msg: ScreenMsg) -> Command<ScreenMsg> {
///         match msg {
///             ScreenMsg::Cursor(m) => self.cursor.update(m).map(ScreenMsg::Cursor),
///         }
///     }
/// }
/// ```
pub trait Component: Send + 'static {
    /// The component's message type.
    ///
    /// It carries both inbound events and the notifications the component
    /// sends back to its parent through [`Command::message`].
    type Message: Send + 'static;

    /// Process a message, mutate state, and return a [`Command`] for the parent.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Render into a specific `area` of the [`Frame`].
    ///
    /// Implementations should confine all rendering to the given rectangle.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Whether this component currently has focus.
    ///
    /// A parent can query `focused()` to decide which child should receive
    /// keyboard events. The default implementation returns `false`.
    fn focused(&self) -> bool {
        false
    }
}
