//! Component plumbing for the **tabula** grid engine.
//!
//! `tabula-core` holds the small set of types every tabula component is
//! built from. A component keeps its own state, receives messages through
//! [`Component::update`], and answers with a [`Command`] carrying the
//! notifications its parent should see. Nothing here suspends: a message is
//! fully processed before `update` returns.
//!
//! # Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Component`] | Stateful sub-model that renders into a [`ratatui::layout::Rect`] |
//! | [`Command`] | Messages a component hands back to its parent |
//! | [`TerminalEvent`] | Terminal input forwarded by the host |
//! | [`TestHarness`](testing::TestHarness) | Headless harness for unit-testing a [`Component`] |

pub mod command;
pub mod component;
pub mod event;
pub mod testing;

pub use command::Command;
pub use component::Component;
pub use event::TerminalEvent;
