//! Dataset Resolver - override resolution and export over hierarchical data sets.
//!
//! Data set lists are tables whose DSL attributes reference other lists, so
//! a data set is the root of a tree of data sets. Any data set on the way
//! down can override ("overlap") a value deeper in the tree by hosting a
//! parameter tagged with the attribute path that reaches it.
//!
//! - `resolve` - layer resolver and overlap iterator (outer overlap wins)
//! - `traverse` - list/attribute walker with per-kind handler callbacks
//! - `export` - nested, attribute-tree, single-path and dotted-path exports
//! - `validate` - reference integrity and cycle checks before export
//! - `store` - in-memory provider loaded from JSON/YAML snapshots
//!
//! # Architecture
//!
//! ```text
//! Customer1 ──address──► Address1 ──postalCode──► A1A
//!    │                      │                      │
//!    overlap([address, postalCode], firstPart)     firstPart = "A1A"
//!                           overlap([postalCode], firstPart)
//! ```
//!
//! Resolving `firstPart` from `Customer1` through `[address, postalCode]`
//! yields Customer1's overlap first, then Address1's, then A1A's own value.
//!
//! # Example
//!
//! ```
//! use dataset_resolver::{AttributeType, DataSetProvider, DataSetStore, NestedExporter};
//! use serde_json::json;
//!
//! let mut store = DataSetStore::new();
//! let addresses = store.add_list("Addresses");
//! let street = store.add_attribute(addresses, "street", AttributeType::Text).unwrap();
//! let customers = store.add_list("Customers");
//! let address = store.add_reference_attribute(customers, "address", addresses).unwrap();
//!
//! let home = store.add_data_set(addresses, "Home").unwrap();
//! store.set_text(home, street, "Main St").unwrap();
//! let customer = store.add_data_set(customers, "Customer1").unwrap();
//! store.set_reference(customer, address, home).unwrap();
//! store.overlap_text(customer, vec![address], street, "Bay St").unwrap();
//!
//! let exported = NestedExporter::new(&store)
//!     .export_json(store.data_set(customer).unwrap())
//!     .unwrap();
//! assert_eq!(
//!     exported["groups"]["address"]["parameters"]["street"]["value"],
//!     json!("Bay St")
//! );
//! ```

pub mod config;
pub mod error;
pub mod evaluator;
pub mod export;
pub mod provider;
pub mod resolve;
pub mod store;
pub mod traverse;
pub mod validate;

// Re-exports
pub use config::EngineConfig;
pub use dataset_types::{
    Attribute, AttributeId, AttributeType, DataSet, DataSetId, DataSetList, DataSetListId,
    FileData, Parameter, ParameterId, ParameterOverlap, ParameterValue,
};
pub use error::{DataSetError, DataSetResult, ValidationError};
pub use evaluator::{FnEvaluator, RawValueEvaluator, ValueEvaluator};
pub use export::{
    flatten_data_set, flatten_list, resolve_attribute_path, structure_paths, ExportContext,
    NestedExporter, NestedGroup, NestedParameter, RenderedValue, UiAttributeNode, UiParameter,
    UiTreeBuilder, ValueRef,
};
pub use provider::DataSetProvider;
pub use resolve::{resolve, LayerResolver, OverlapItem, OverlapIterator, Reachable, StopReason};
pub use store::{DataSetSnapshot, DataSetStore};
pub use traverse::{walk, AttributeNode, ListNode, TraversalHandler};
pub use validate::{validate, ValidationResult};
