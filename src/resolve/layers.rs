//! Layer resolution.
//!
//! Layer 0 is the start data set. Layer k+1 is whatever the reference
//! attribute `path[k]` resolves to at layer k, resolved with the same
//! overlap machinery over the truncated path `path[..k]`, so an ancestor's
//! overlap of a reference redirects every deeper layer.
//!
//! Layers are cached in a growable `Vec`; the path length is the position
//! counter. `push`/`pop` move the path in step with a traversal and keep
//! every layer whose prefix did not change.

use dataset_types::{Attribute, AttributeId, DataSet};
use tracing::{debug, trace};

use super::iter::OverlapIterator;
use super::outcome::OverlapItem;
use crate::provider::DataSetProvider;

/// Why layer production stopped before the path was exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The layer's list has no attribute with the next path id
    MissingAttribute,
    /// The path attribute is not a DSL reference
    NotReference,
    /// The reference resolved to nothing (unset, empty or unreachable)
    Unresolved,
    /// The reference names a data set the provider does not know
    MissingTarget,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Stop {
    /// Index of the last layer reached
    pub(crate) layer: usize,
    pub(crate) attribute_id: AttributeId,
    pub(crate) reason: StopReason,
}

/// Lazily resolved layers of one `(start, path)` session.
///
/// One resolver serves every target attribute that shares its path; create
/// one per start data set and traversal and drop it afterwards.
pub struct LayerResolver<'a> {
    pub(crate) provider: &'a dyn DataSetProvider,
    start: &'a DataSet,
    pub(crate) path: Vec<AttributeId>,
    /// `layers[0]` is `start`
    layers: Vec<&'a DataSet>,
    /// `references[k]` is the attribute followed from `layers[k]`
    references: Vec<&'a Attribute>,
    stop: Option<Stop>,
}

impl<'a> LayerResolver<'a> {
    /// Resolver with an empty path
    pub fn new(provider: &'a dyn DataSetProvider, start: &'a DataSet) -> Self {
        Self::with_path(provider, start, Vec::new())
    }

    pub fn with_path(
        provider: &'a dyn DataSetProvider,
        start: &'a DataSet,
        path: Vec<AttributeId>,
    ) -> Self {
        Self {
            provider,
            start,
            path,
            layers: vec![start],
            references: Vec::new(),
            stop: None,
        }
    }

    pub fn start(&self) -> &'a DataSet {
        self.start
    }

    pub fn path(&self) -> &[AttributeId] {
        &self.path
    }

    /// Current path length
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Number of layers resolved so far
    pub fn cached_layers(&self) -> usize {
        self.layers.len()
    }

    /// Reference attributes followed to reach the cached layers
    pub fn reference_attributes(&self) -> &[&'a Attribute] {
        &self.references
    }

    /// Extend the path by one reference attribute
    pub fn push(&mut self, reference: AttributeId) {
        self.path.push(reference);
    }

    /// Drop the innermost path element, keeping layers of the remaining prefix
    pub fn pop(&mut self) -> Option<AttributeId> {
        let popped = self.path.pop()?;
        let len = self.path.len();
        if self.layers.len() > len + 1 {
            self.layers.truncate(len + 1);
            self.references.truncate(len);
        }
        if self.stop.is_some_and(|s| s.layer >= len) {
            self.stop = None;
        }
        Some(popped)
    }

    /// Layer `index`, resolving intermediate layers on demand
    pub fn layer(&mut self, index: usize) -> Option<&'a DataSet> {
        while self.layers.len() <= index {
            if !self.advance() {
                return None;
            }
        }
        Some(self.layers[index])
    }

    /// Restartable iterator over all layers of the path
    pub fn layers(&mut self) -> Layers<'_, 'a> {
        Layers {
            resolver: self,
            next: 0,
        }
    }

    /// Innermost layer of the full path, if the path can be walked
    pub fn last_layer(&mut self) -> Option<&'a DataSet> {
        self.layer(self.path.len())
    }

    /// Where and why layer production stopped, if it did
    pub fn stop_reason(&self) -> Option<(&'a DataSet, AttributeId, StopReason)> {
        self.stop
            .map(|s| (self.layers[s.layer], s.attribute_id, s.reason))
    }

    /// Outcomes for `target` along the full path, authoritative first
    pub fn resolve(&mut self, target: AttributeId) -> OverlapIterator<'_, 'a> {
        let len = self.path.len();
        OverlapIterator::new(self, len, target)
    }

    /// Outcomes for `target` along the first `prefix_len` path elements
    /// (clamped to the path length)
    pub fn resolve_at(
        &mut self,
        prefix_len: usize,
        target: AttributeId,
    ) -> OverlapIterator<'_, 'a> {
        let len = prefix_len.min(self.path.len());
        OverlapIterator::new(self, len, target)
    }

    /// Authoritative outcome for `target` along the full path
    pub fn first(&mut self, target: AttributeId) -> OverlapItem<'a> {
        let fallback = self.unreachable(target);
        self.resolve(target).next().unwrap_or(fallback)
    }

    /// Unreachable outcome for the current stop, or for `target` at the last
    /// cached layer when production has not stopped
    pub(crate) fn unreachable(&self, target: AttributeId) -> OverlapItem<'a> {
        match self.stop {
            Some(stop) => OverlapItem::Unreachable {
                data_set: self.layers[stop.layer],
                attribute_id: stop.attribute_id,
            },
            None => OverlapItem::Unreachable {
                data_set: self.layers.last().copied().unwrap_or(self.start),
                attribute_id: target,
            },
        }
    }

    fn advance(&mut self) -> bool {
        if self.stop.is_some() {
            return false;
        }
        let index = self.layers.len() - 1;
        let Some(&reference_id) = self.path.get(index) else {
            return false;
        };

        match self.next_layer(index, reference_id) {
            Ok((attribute, next)) => {
                trace!(
                    layer = index + 1,
                    attribute = %attribute.name,
                    data_set = %next.name,
                    "Resolved layer"
                );
                self.references.push(attribute);
                self.layers.push(next);
                true
            }
            Err(reason) => {
                debug!(
                    layer = index,
                    data_set = %self.layers[index].name,
                    attribute_id = %reference_id,
                    ?reason,
                    "Reference path stops"
                );
                self.stop = Some(Stop {
                    layer: index,
                    attribute_id: reference_id,
                    reason,
                });
                false
            }
        }
    }

    fn next_layer(
        &mut self,
        index: usize,
        reference_id: AttributeId,
    ) -> Result<(&'a Attribute, &'a DataSet), StopReason> {
        let provider = self.provider;
        let layer = self.layers[index];

        let attribute = provider
            .attribute(layer.data_set_list_id, reference_id)
            .ok_or(StopReason::MissingAttribute)?;
        if !attribute.is_reference() {
            return Err(StopReason::NotReference);
        }

        // Layers 0..=index are cached, so this never re-enters `advance`.
        let outcome = self.resolve_at(index, reference_id).next();
        let parameter = outcome
            .and_then(|item| item.parameter())
            .filter(|p| p.data_set_reference().is_some())
            .ok_or(StopReason::Unresolved)?;
        let next = provider
            .referenced_data_set(parameter)
            .ok_or(StopReason::MissingTarget)?;
        Ok((attribute, next))
    }
}

/// Lazy iterator over the layers of a resolver
pub struct Layers<'r, 'a> {
    resolver: &'r mut LayerResolver<'a>,
    next: usize,
}

impl<'a> Iterator for Layers<'_, 'a> {
    type Item = &'a DataSet;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.resolver.path.len() {
            return None;
        }
        let layer = self.resolver.layer(self.next)?;
        self.next += 1;
        Some(layer)
    }
}
