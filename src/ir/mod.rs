//! Internal representation (IR) of an IDS specification, plus its codecs.
//!
//! The flat [`Document`] model is the hub every format passes through. Each
//! `io_*` module converts between the IR and one external representation:
//!
//! - [`io_json`]: the flat internal JSON (lossless).
//! - [`io_namespaced_json`]: the namespaced JSON tree that mirrors IDS XML.
//! - [`io_ids_xml`]: standards-shaped IDS XML.
//!
//! The codecs are pure functions with no shared state and never call each
//! other.
//!
//! # Example
//!
//! ```
//! use idskit::ir::{Document, Rule, RuleKind};
//! use idskit::ir::io_ids_xml::{decode_xml, encode_xml};
//!
//! let doc = Document::new_default().with_rule(Rule::new(RuleKind::entity("IfcWall")));
//! let xml = encode_xml(&doc);
//! let back = decode_xml(&xml).unwrap();
//! assert_eq!(back.applicability[0].kind, RuleKind::entity("IfcWall"));
//! ```

mod ids;
pub mod io_ids_xml;
pub mod io_json;
pub mod io_namespaced_json;
mod model;
mod namespaces;
pub mod pretty_xml;

// Re-export core types for convenient access
pub use ids::RuleId;
pub use model::{
    Document, IfcVersion, Rule, RuleKind, RuleType, SpecInfo, DEFAULT_IFC_VERSION, DEFAULT_TITLE,
};
pub use namespaces::{IDS_NAMESPACE, IDS_SCHEMA_LOCATION, XSI_NAMESPACE, XS_NAMESPACE};
