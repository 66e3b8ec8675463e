mod core;
mod inline;
mod ops;
mod plugin;
mod schema;
mod serde_value;

pub use crate::core::*;
pub use crate::inline::*;
pub use crate::ops::*;
pub use crate::plugin::*;
pub use crate::schema::*;
pub use crate::serde_value::*;
