use std::sync::Arc;

/// A side effect returned from [`Component::update`](crate::Component::update).
///
/// tabula components never suspend: every command is a message (or a group
/// of messages) that the parent receives in the same event-handler turn.
/// Parents lift child commands into their own message type with
/// [`Command::map`].
///
/// # Examples
///
/// ```rust,ignore
/// // Do nothing:
/// let cmd = Command::none();
///
/// // Tell the parent what happened:
/// let cmd = Command::message(Msg::Confirmed(3));
///
/// // Several notifications, delivered in order:
/// let cmd = Command::sequence([Command::message(a), Command::message(b)]);
/// ```
pub struct Command<Msg: Send + 'static> {
    pub(crate) inner: CommandInner<Msg>,
}

pub(crate) enum CommandInner<Msg: Send + 'static> {
    None,
    Message(Msg),
    Sequence(Vec<Command<Msg>>),
}

impl<Msg: Send + 'static> Command<Msg> {
    /// No-op command.
    pub fn none() -> Self {
        Command {
            inner: CommandInner::None,
        }
    }

    /// Deliver a message to the parent.
    pub fn message(msg: Msg) -> Self {
        Command {
            inner: CommandInner::Message(msg),
        }
    }

    /// Group commands whose messages must be delivered in order.
    ///
    /// No-op entries are dropped and a single remaining command is returned
    /// as is.
    pub fn sequence(cmds: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let mut cmds: Vec<_> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Command::none(),
            1 => cmds.pop().unwrap_or_else(Command::none),
            _ => Command {
                inner: CommandInner::Sequence(cmds),
            },
        }
    }

    /// Transform the message type (for component composition).
    pub fn map<NewMsg: Send + 'static>(
        self,
        f: impl Fn(Msg) -> NewMsg + Send + Sync + 'static,
    ) -> Command<NewMsg> {
        self.map_with(Arc::new(f))
    }

    fn map_with<NewMsg: Send + 'static>(
        self,
        f: Arc<dyn Fn(Msg) -> NewMsg + Send + Sync>,
    ) -> Command<NewMsg> {
        let map_all = |cmds: Vec<Command<Msg>>| -> Vec<Command<NewMsg>> {
            cmds.into_iter().map(|cmd| cmd.map_with(f.clone())).collect()
        };
        match self.inner {
            CommandInner::None => Command::none(),
            CommandInner::Message(msg) => Command::message(f(msg)),
            CommandInner::Sequence(cmds) => Command {
                inner: CommandInner::Sequence(map_all(cmds)),
            },
        }
    }

    // --- Inspection methods (useful for testing) ---

    /// Returns `true` if this is a no-op command.
    pub fn is_none(&self) -> bool {
        matches!(self.inner, CommandInner::None)
    }

    /// If this command is a single message, return it.
    pub fn into_message(self) -> Option<Msg> {
        match self.inner {
            CommandInner::Message(msg) => Some(msg),
            _ => None,
        }
    }

    /// Flatten the command tree into its messages, in delivery order.
    pub fn into_messages(self) -> Vec<Msg> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(self, out: &mut Vec<Msg>) {
        match self.inner {
            CommandInner::None => {}
            CommandInner::Message(msg) => out.push(msg),
            CommandInner::Sequence(cmds) => {
                for cmd in cmds {
                    cmd.collect_into(out);
                }
            }
        }
    }
}
