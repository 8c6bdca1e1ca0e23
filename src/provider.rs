//! Read-only access to loaded data sets.
//!
//! The engine never loads, mutates or persists anything; it only borrows
//! from a `DataSetProvider`. `DataSetStore` is the in-memory implementation.

use dataset_types::{
    Attribute, AttributeId, DataSet, DataSetId, DataSetList, DataSetListId, Parameter,
    ParameterOverlap,
};

/// Read-only accessors over already-loaded lists, data sets and parameters
pub trait DataSetProvider {
    /// Look up a list by id
    fn data_set_list(&self, id: DataSetListId) -> Option<&DataSetList>;

    /// Look up a data set by id
    fn data_set(&self, id: DataSetId) -> Option<&DataSet>;

    /// Attributes of a list, in list order. Unknown lists have none.
    fn attributes_of(&self, list: DataSetListId) -> &[Attribute] {
        self.data_set_list(list)
            .map(|l| l.attributes.as_slice())
            .unwrap_or(&[])
    }

    /// Data sets of a list, in list order
    fn data_sets_of(&self, list: DataSetListId) -> Vec<&DataSet> {
        self.data_set_list(list)
            .map(|l| l.data_sets.iter().filter_map(|id| self.data_set(*id)).collect())
            .unwrap_or_default()
    }

    /// Attribute `attribute` of list `list`
    fn attribute(&self, list: DataSetListId, attribute: AttributeId) -> Option<&Attribute> {
        self.attributes_of(list).iter().find(|a| a.id == attribute)
    }

    /// Regular parameter stored on `data_set` for `attribute`
    fn parameter_of(&self, data_set: DataSetId, attribute: AttributeId) -> Option<&Parameter> {
        self.data_set(data_set)?.parameter(attribute)
    }

    /// All overlaps hosted by `data_set`
    fn overlaps_of(&self, data_set: DataSetId) -> &[ParameterOverlap] {
        self.data_set(data_set)
            .map(|ds| ds.overlaps.as_slice())
            .unwrap_or(&[])
    }

    /// Overlap hosted by `data_set` for exactly `(path, target)`
    fn overlap_of(
        &self,
        data_set: DataSetId,
        path: &[AttributeId],
        target: AttributeId,
    ) -> Option<&ParameterOverlap> {
        self.overlaps_of(data_set)
            .iter()
            .find(|o| o.matches(path, target))
    }

    /// Data set a DSL parameter points at
    fn referenced_data_set(&self, parameter: &Parameter) -> Option<&DataSet> {
        self.data_set(parameter.data_set_reference()?)
    }
}
