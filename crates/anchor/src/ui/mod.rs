//! Toolkit-free state for the anchor balloon: the form, the actions panel,
//! focus cycling, and the controller that drives them from keystrokes.

mod actions;
mod controller;
mod focus;
mod form;

pub use actions::*;
pub use controller::*;
pub use focus::*;
pub use form::*;
