//! **tabula** -- keyboard navigation for sectioned data grids on [`ratatui`].
//!
//! This is the umbrella crate that re-exports everything needed from a
//! single dependency:
//!
//! ```toml
//! [dependencies]
//! tabula = "0.1"
//! ```
//!
//! # Re-exports
//!
//! * All public items from [`tabula_core`] are available at the crate root
//!   ([`Component`], [`Command`], [`TerminalEvent`], the
//!   [`testing`] harness).
//! * The [`grid`] module re-exports everything from [`tabula_grid`].
//! * [`ratatui`] and [`crossterm`] are re-exported so downstream crates do
//!   not need to depend on them directly.
//!
//! # Quick start
//!
//! ```ignore
//! use tabula::grid::{Column, ColumnSchema, Cursor, Grid, GridRow, Region, Section};
//! use tabula::grid::cursor::Message;
//! use tabula::{Component, TerminalEvent};
//!
//! let schema = ColumnSchema::new(vec![
//!     Column::selection("select"),
//!     Column::new("title", "Title"),
//!     Column::new("tags", "Tags").drillable(),
//! ])?;
//! let rows = vec![GridRow::new(3).with_sub_items(2, 4)];
//! let mut cursor = Cursor::new(Grid::new(schema, vec![Section::new(rows)])?);
//!
//! let event: TerminalEvent = crossterm::event::read()?.into();
//! if let Some(msg) = Message::from_event(Region::Body, event) {
//!     for out in cursor.update(msg).into_messages() {
//!         if let Message::ScrollIntoView { target, behavior } = out {
//!             // scroll the host view so `target` is visible
//!         }
//!     }
//! }
//! ```

pub use tabula_core::*;
pub mod grid {
    pub use tabula_grid::*;
}

// Re-export dependencies for downstream crates
pub use crossterm;
pub use ratatui;
