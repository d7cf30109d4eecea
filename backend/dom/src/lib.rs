//! Document model and feature extraction.
//!
//! [`Document`] wraps a parsed snapshot; [`extract`] turns its eligible elements
//! into [`FeatureRecord`]s and [`scope_records`] narrows them to a container.

pub mod attributes;
pub mod classify;
pub mod document;
pub mod extract;
pub mod features;
pub mod scope;

pub use attributes::Attributes;
pub use classify::WidgetKind;
pub use document::{AncestorContext, Document, ElementData, NodeId};
pub use extract::{extract, is_eligible};
pub use features::{ContainerInfo, FeatureRecord, FormInfo, Label, LabelSource, TableContext};
pub use scope::{scope_records, Scoped};
