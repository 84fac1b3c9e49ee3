//! Core types shared by the engine, config and IO crates.
//!
//! Nothing in here knows about rules or persistence: a `TableSnapshot` is what
//! the host hands in, a `StyleOverlay` is what comes back out.

pub mod color;
pub mod style;
pub mod table;

pub use color::{CellColor, Color, ColorField, ColorParseError};
pub use style::{CellStyle, StyleOverlay};
pub use table::{CellSnapshot, TableSnapshot};
