//! Open Packaging Conventions (OPC) implementation.
//!
//! The subset of OPC the chart engine needs to keep a package's relationship
//! and content-type graph consistent:
//!
//! - Part naming ([`PackURI`]) and relationship target resolution
//! - `.rels` parts ([`Relationships`]) and `[Content_Types].xml` ([`ContentTypes`])
//! - Package storage ([`PartStore`], [`DirPackage`], [`MemPackage`])
//! - ZIP-based physical packaging for outer and embedded packages

pub mod constants;
pub mod content_types;
pub mod error;
pub mod package;
pub mod packuri;
pub mod phys_pkg;
pub mod rel;

// Re-export commonly used types
pub use content_types::ContentTypes;
pub use error::OpcError;
pub use package::{DirPackage, MemPackage, PartStore};
pub use packuri::PackURI;
pub use rel::{Relationship, Relationships};
