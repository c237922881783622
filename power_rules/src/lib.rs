//! # Power Rules
//!
//! The "rule book" crate - contains power entities, mechanics vocabularies and
//! the authored rule tables the forge derives content from.
//! This crate holds data and pure functions only and never touches storage.

pub mod entities;
pub mod mechanics;
pub mod origins;
pub mod stable_id;
pub mod tag_groups;
pub mod templates;

pub use entities::*;
pub use mechanics::*;
pub use origins::*;
pub use stable_id::*;
pub use templates::*;
