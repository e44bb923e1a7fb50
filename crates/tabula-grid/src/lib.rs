//! Keyboard focus and selection for sectioned data grids.
//!
//! A grid is a head row of column labels over a body of *sections*, each a
//! run of rows describing one record. Exactly one head cell and one body
//! element are reachable by Tab at any time; arrow keys, Home/End and page
//! keys move that focus, Shift extends a per-section checkbox selection,
//! and Enter drills into the focusable sub-items of one column.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`schema`] | Column descriptors and their validation |
//! | [`grid`] | Index-addressed snapshot of sections, rows and cells |
//! | [`state`] | Position, key handling, repair and click resolution |
//! | [`pager`] | Page-sized jumps measured against host geometry |
//! | [`cursor`] | [`Component`](tabula_core::Component) tying it all together |
//! | [`help`] | Contextual key help line and overlay |
//! | [`key`] | Key bindings and the [`KeyMap`](key::KeyMap) trait |

pub mod cursor;
pub mod grid;
pub mod help;
pub mod key;
pub mod pager;
pub mod schema;
pub mod state;

pub use cursor::{Cursor, ScrollBehavior};
pub use grid::{FocusTarget, Grid, GridError, GridRow, Section, SelectionChange};
pub use schema::{Column, ColumnSchema, SchemaError};
pub use state::{CursorKeyBindings, CursorState, KeyResponse, Position, Region};
