//! Response projection: XML documents in, flat string records out.

pub mod projector;
pub mod stats;
pub mod xml;

/// A projected entity: field name to raw text, in field order.
pub type ParsedRecord = indexmap::IndexMap<String, String>;

pub use projector::{EntityKind, Projector};
pub use stats::StatCatalog;
pub use xml::{Element, XmlNode, strip_default_namespace};
