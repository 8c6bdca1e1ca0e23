//! Traversal consumers.
//!
//! Every exporter walks the schema with [`crate::traverse::walk`] and keeps
//! one [`LayerResolver`] per exported data set, pushing the DSL attribute on
//! descend and popping it on ascend, so each scalar is resolved through the
//! overlaps of every data set above it.
//!
//! - [`nested`] - `parameters`/`groups` objects for one data set
//! - [`ui_tree`] - attribute tree with one column per data set
//! - [`single_path`] - one node of the attribute tree
//! - [`flat`] - dotted-path leaves and schema paths

mod context;
pub mod flat;
pub mod nested;
pub mod single_path;
pub mod ui_tree;

pub use context::{ExportContext, RenderedValue, ValueRef};
pub use flat::{flatten_data_set, flatten_list, structure_paths};
pub use nested::{NestedExporter, NestedGroup, NestedParameter};
pub use single_path::resolve_attribute_path;
pub use ui_tree::{UiAttributeNode, UiParameter, UiTreeBuilder};

use dataset_types::{Attribute, DataSet};

use crate::resolve::{LayerResolver, OverlapItem};

/// Authoritative outcome of a DSL attribute and the data set it names
fn resolved_target<'a>(
    resolver: &mut LayerResolver<'a>,
    attribute: &Attribute,
) -> (OverlapItem<'a>, Option<&'a DataSet>) {
    let provider = resolver.provider;
    let outcome = resolver.first(attribute.id);
    let target = outcome
        .parameter()
        .and_then(|parameter| provider.referenced_data_set(parameter));
    (outcome, target)
}
