//! Common utilities shared by the OOXML part handlers.
//!
//! - [`xml`]: escaping and the minimal element tree every part is edited through
//! - [`id`]: package-wide identifier allocation
//! - [`number`]: number text for caches and cells

pub mod id;
pub mod number;
pub mod xml;

pub use id::{IdPattern, next_id};
pub use xml::{Element, Node, TagNaming, XmlDocument};
