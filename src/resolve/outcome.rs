//! Resolution outcomes.
//!
//! An `OverlapItem` answers "what is the effective value of attribute T
//! reached from data set S through reference path P". Outcomes borrow from
//! the provider and never mutate it.

use dataset_types::{AttributeId, DataSet, Parameter, ParameterOverlap, ParameterValue};

use crate::error::{DataSetError, DataSetResult};

/// Outcome of resolving one `(start, path, target)` query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapItem<'a> {
    /// The path could not be walked to the end. `data_set` is the last
    /// layer reached and `attribute_id` the attribute that could not be
    /// found or followed there.
    Unreachable {
        data_set: &'a DataSet,
        attribute_id: AttributeId,
    },
    Reachable(Reachable<'a>),
}

/// A resolved value (or the confirmed absence of one)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachable<'a> {
    /// An overlap hosted by layer `layer` shadows the target
    Overlap {
        layer: usize,
        host: &'a DataSet,
        overlap: &'a ParameterOverlap,
    },
    /// No overlap; the final layer stores a parameter for the target
    DefaultInitialized {
        data_set: &'a DataSet,
        parameter: &'a Parameter,
    },
    /// No overlap; the target is an attribute of the final layer but unset
    DefaultUninitialized {
        data_set: &'a DataSet,
        attribute_id: AttributeId,
    },
}

impl<'a> Reachable<'a> {
    /// Effective parameter, if one exists
    pub fn parameter(&self) -> Option<&'a Parameter> {
        match *self {
            Reachable::Overlap { overlap, .. } => Some(&overlap.parameter),
            Reachable::DefaultInitialized { parameter, .. } => Some(parameter),
            Reachable::DefaultUninitialized { .. } => None,
        }
    }

    /// Effective payload, if one exists
    pub fn value(&self) -> Option<&'a ParameterValue> {
        self.parameter()?.value.as_ref()
    }

    /// Data set holding the effective value: the overlap host or the final layer
    pub fn data_set(&self) -> &'a DataSet {
        match *self {
            Reachable::Overlap { host, .. } => host,
            Reachable::DefaultInitialized { data_set, .. }
            | Reachable::DefaultUninitialized { data_set, .. } => data_set,
        }
    }

    pub fn attribute_id(&self) -> AttributeId {
        match *self {
            Reachable::Overlap { overlap, .. } => overlap.target(),
            Reachable::DefaultInitialized { parameter, .. } => parameter.attribute_id,
            Reachable::DefaultUninitialized { attribute_id, .. } => attribute_id,
        }
    }

    pub fn is_overlap(&self) -> bool {
        matches!(self, Reachable::Overlap { .. })
    }
}

impl<'a> OverlapItem<'a> {
    pub fn is_reachable(&self) -> bool {
        matches!(self, OverlapItem::Reachable(_))
    }

    pub fn is_overlap(&self) -> bool {
        matches!(self, OverlapItem::Reachable(r) if r.is_overlap())
    }

    /// Reachable projection, or `None` when unreachable
    pub fn reachable(&self) -> Option<Reachable<'a>> {
        match *self {
            OverlapItem::Reachable(r) => Some(r),
            OverlapItem::Unreachable { .. } => None,
        }
    }

    /// Reachable projection for call sites that require one.
    ///
    /// # Errors
    /// `DataSetError::UnreachableAccess` when the outcome is unreachable;
    /// the caller's contract has been broken.
    pub fn as_reachable(&self) -> DataSetResult<&Reachable<'a>> {
        match self {
            OverlapItem::Reachable(r) => Ok(r),
            OverlapItem::Unreachable {
                data_set,
                attribute_id,
            } => Err(DataSetError::UnreachableAccess {
                data_set_id: data_set.id,
                attribute_id: *attribute_id,
            }),
        }
    }

    /// Owned variant of [`OverlapItem::as_reachable`]
    pub fn into_reachable(self) -> DataSetResult<Reachable<'a>> {
        self.as_reachable().copied()
    }

    /// Effective parameter; `None` when unreachable or unset
    pub fn parameter(&self) -> Option<&'a Parameter> {
        self.reachable()?.parameter()
    }

    /// Data set the outcome points at: the value holder when reachable,
    /// the last layer reached otherwise
    pub fn data_set(&self) -> &'a DataSet {
        match *self {
            OverlapItem::Reachable(r) => r.data_set(),
            OverlapItem::Unreachable { data_set, .. } => data_set,
        }
    }
}
