//! Override resolution engine.
//!
//! ```text
//! start ──path[0]──► layer 1 ──path[1]──► … ──► layer n
//!   │                  │                          │
//!   overlap(path[0..n], T)?  overlap(path[1..n], T)?   parameter(T)?
//! ```
//!
//! - [`LayerResolver`] - lazily materialized, cached layers of one path
//! - [`OverlapIterator`] - outcomes for one target, authoritative first
//! - [`OverlapItem`] - closed outcome model

mod iter;
mod layers;
mod outcome;

pub use iter::OverlapIterator;
pub use layers::{LayerResolver, Layers, StopReason};
pub use outcome::{OverlapItem, Reachable};

use dataset_types::{AttributeId, DataSet};

use crate::provider::DataSetProvider;

/// Resolve one query with a throwaway resolver
pub fn resolve<'a>(
    provider: &'a dyn DataSetProvider,
    start: &'a DataSet,
    path: &[AttributeId],
    target: AttributeId,
) -> OverlapItem<'a> {
    LayerResolver::with_path(provider, start, path.to_vec()).first(target)
}
