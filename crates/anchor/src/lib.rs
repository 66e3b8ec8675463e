//! Anchors (named jump targets) for the plate editor.
//!
//! An anchor is not a node: it is the `anchorId` attribute stamped on a run of
//! inline nodes, optionally accompanied by boolean decorator attributes.

mod command;
mod config;
mod decorator;
mod plugin;
mod range;
pub mod ui;
mod view;

pub use crate::command::*;
pub use crate::config::*;
pub use crate::decorator::*;
pub use crate::plugin::*;
pub use crate::range::*;
pub use crate::view::*;

pub const ANCHOR_ID_ATTR: &str = "anchorId";
pub const ANCHOR_COMMAND: &str = "anchor.set";
pub const UNANCHOR_COMMAND: &str = "anchor.unset";
