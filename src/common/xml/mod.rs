//! XML helpers shared by every part handler.
//!
//! - [`escape`]: text and attribute escaping
//! - [`dom`]: a minimal owned element tree used for structural edits

pub mod dom;
pub mod escape;

pub use dom::{Element, Node, TagNaming, XmlDocument};
pub use escape::{escape_attr, escape_text};
