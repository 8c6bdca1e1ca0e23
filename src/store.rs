//! In-memory data set store
//!
//! `DataSetStore` holds lists and data sets keyed by id and implements
//! `DataSetProvider`. It is filled either through the builder methods
//! below or from a serialized `DataSetSnapshot` (JSON or YAML).

use std::collections::BTreeMap;
use std::path::Path;

use dataset_types::{
    Attribute, AttributeId, AttributeType, DataSet, DataSetId, DataSetList, DataSetListId,
    FileData, ListValue, ListValueId, Parameter, ParameterId, ParameterOverlap, ParameterValue,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DataSetError, DataSetResult};
use crate::provider::DataSetProvider;

/// Serialized form of a store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetSnapshot {
    #[serde(default)]
    pub data_set_lists: Vec<DataSetList>,
    #[serde(default)]
    pub data_sets: Vec<DataSet>,
}

/// In-memory `DataSetProvider`
#[derive(Debug, Clone, Default)]
pub struct DataSetStore {
    lists: BTreeMap<DataSetListId, DataSetList>,
    data_sets: BTreeMap<DataSetId, DataSet>,
}

impl DataSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot. Data sets missing from their list's
    /// row order are appended to it.
    pub fn from_snapshot(snapshot: DataSetSnapshot) -> DataSetResult<Self> {
        let mut store = Self::new();
        for list in snapshot.data_set_lists {
            store.lists.insert(list.id, list);
        }
        for data_set in snapshot.data_sets {
            let list = store
                .lists
                .get_mut(&data_set.data_set_list_id)
                .ok_or(DataSetError::MissingDataSetList(data_set.data_set_list_id))?;
            if !list.data_sets.contains(&data_set.id) {
                list.data_sets.push(data_set.id);
            }
            store.data_sets.insert(data_set.id, data_set);
        }
        debug!(
            lists = store.lists.len(),
            data_sets = store.data_sets.len(),
            "Loaded data set snapshot"
        );
        Ok(store)
    }

    /// Load a snapshot from a JSON string
    pub fn from_snapshot_json(content: &str) -> DataSetResult<Self> {
        Self::from_snapshot(serde_json::from_str(content)?)
    }

    /// Load a snapshot from a YAML string
    pub fn from_snapshot_yaml(content: &str) -> DataSetResult<Self> {
        Self::from_snapshot(serde_yaml::from_str(content)?)
    }

    /// Load a snapshot file; `.yaml`/`.yml` are read as YAML, anything else as JSON
    pub fn from_file(path: impl AsRef<Path>) -> DataSetResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_snapshot_yaml(&content),
            _ => Self::from_snapshot_json(&content),
        }
    }

    /// Serialize the store. Lists and data sets come out in id order.
    pub fn to_snapshot(&self) -> DataSetSnapshot {
        DataSetSnapshot {
            data_set_lists: self.lists.values().cloned().collect(),
            data_sets: self.data_sets.values().cloned().collect(),
        }
    }

    pub fn lists(&self) -> impl Iterator<Item = &DataSetList> {
        self.lists.values()
    }

    pub fn data_sets(&self) -> impl Iterator<Item = &DataSet> {
        self.data_sets.values()
    }

    /// Find a list by name
    pub fn list_by_name(&self, name: &str) -> Option<&DataSetList> {
        self.lists.values().find(|l| l.name == name)
    }

    /// Find a data set by list and name
    pub fn data_set_by_name(&self, list: DataSetListId, name: &str) -> Option<&DataSet> {
        self.data_sets_of(list).into_iter().find(|ds| ds.name == name)
    }

    // ------------------------------------------------------------------------
    // Schema
    // ------------------------------------------------------------------------

    /// Add an empty list
    pub fn add_list(&mut self, name: impl Into<String>) -> DataSetListId {
        let list = DataSetList::new(name);
        let id = list.id;
        self.lists.insert(id, list);
        id
    }

    /// Add a scalar attribute to a list
    pub fn add_attribute(
        &mut self,
        list: DataSetListId,
        name: impl Into<String>,
        attribute_type: AttributeType,
    ) -> DataSetResult<AttributeId> {
        self.push_attribute(Attribute::new(list, name, attribute_type))
    }

    /// Add a DSL attribute referencing `target`
    pub fn add_reference_attribute(
        &mut self,
        list: DataSetListId,
        name: impl Into<String>,
        target: DataSetListId,
    ) -> DataSetResult<AttributeId> {
        if !self.lists.contains_key(&target) {
            return Err(DataSetError::MissingDataSetList(target));
        }
        self.push_attribute(Attribute::new(list, name, AttributeType::Dsl).with_reference(target))
    }

    /// Add a LIST attribute with the given choices
    pub fn add_list_attribute(
        &mut self,
        list: DataSetListId,
        name: impl Into<String>,
        choices: &[&str],
    ) -> DataSetResult<AttributeId> {
        let mut attribute = Attribute::new(list, name, AttributeType::List);
        attribute.list_values = choices
            .iter()
            .map(|text| ListValue {
                id: ListValueId::generate(),
                text: (*text).to_string(),
            })
            .collect();
        self.push_attribute(attribute)
    }

    fn push_attribute(&mut self, attribute: Attribute) -> DataSetResult<AttributeId> {
        let list = self
            .lists
            .get_mut(&attribute.data_set_list_id)
            .ok_or(DataSetError::MissingDataSetList(attribute.data_set_list_id))?;
        let id = attribute.id;
        list.attributes.push(attribute);
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------------

    /// Add an empty data set to a list
    pub fn add_data_set(
        &mut self,
        list: DataSetListId,
        name: impl Into<String>,
    ) -> DataSetResult<DataSetId> {
        let owner = self
            .lists
            .get_mut(&list)
            .ok_or(DataSetError::MissingDataSetList(list))?;
        let data_set = DataSet::new(list, name);
        let id = data_set.id;
        owner.data_sets.push(id);
        self.data_sets.insert(id, data_set);
        Ok(id)
    }

    /// Store a regular parameter, replacing any previous one
    pub fn set_value(
        &mut self,
        data_set: DataSetId,
        attribute: AttributeId,
        value: Option<ParameterValue>,
    ) -> DataSetResult<ParameterId> {
        self.owned_attribute(data_set, attribute)?;
        let parameter = Parameter::new(data_set, attribute, value);
        let id = parameter.id;
        self.data_set_mut(data_set)?
            .parameters
            .insert(attribute, parameter);
        Ok(id)
    }

    pub fn set_text(
        &mut self,
        data_set: DataSetId,
        attribute: AttributeId,
        text: impl Into<String>,
    ) -> DataSetResult<ParameterId> {
        self.set_value(data_set, attribute, Some(ParameterValue::Text(text.into())))
    }

    /// Store the already-encrypted payload of an ENCRYPTED attribute
    pub fn set_encrypted(
        &mut self,
        data_set: DataSetId,
        attribute: AttributeId,
        cipher_text: impl Into<String>,
    ) -> DataSetResult<ParameterId> {
        self.set_text(data_set, attribute, cipher_text)
    }

    pub fn set_file(
        &mut self,
        data_set: DataSetId,
        attribute: AttributeId,
        file: FileData,
    ) -> DataSetResult<ParameterId> {
        self.set_value(data_set, attribute, Some(ParameterValue::File(file)))
    }

    /// Select a LIST choice by its text
    pub fn set_list_value(
        &mut self,
        data_set: DataSetId,
        attribute: AttributeId,
        text: &str,
    ) -> DataSetResult<ParameterId> {
        let choice = self.list_value_id(data_set, attribute, text)?;
        self.set_value(data_set, attribute, Some(ParameterValue::ListValue(choice)))
    }

    /// Point a DSL attribute at another data set
    pub fn set_reference(
        &mut self,
        data_set: DataSetId,
        attribute: AttributeId,
        target: DataSetId,
    ) -> DataSetResult<ParameterId> {
        if !self.data_sets.contains_key(&target) {
            return Err(DataSetError::MissingDataSet(target));
        }
        self.set_value(
            data_set,
            attribute,
            Some(ParameterValue::DataSetReference(target)),
        )
    }

    /// Remove the regular parameter, leaving the attribute uninitialized
    pub fn clear_value(
        &mut self,
        data_set: DataSetId,
        attribute: AttributeId,
    ) -> DataSetResult<()> {
        self.data_set_mut(data_set)?.parameters.remove(&attribute);
        Ok(())
    }

    /// Host an overlap of `target` reached through `path` on `data_set`,
    /// replacing an existing overlap for the same `(path, target)`
    pub fn add_overlap(
        &mut self,
        data_set: DataSetId,
        path: Vec<AttributeId>,
        target: AttributeId,
        value: Option<ParameterValue>,
    ) -> DataSetResult<ParameterId> {
        let host = self.data_set_mut(data_set)?;
        let overlap = ParameterOverlap::new(Parameter::new(data_set, target, value), path);
        let id = overlap.parameter.id;
        host.overlaps
            .retain(|o| !o.matches(&overlap.attribute_path, target));
        host.overlaps.push(overlap);
        Ok(id)
    }

    /// Overlap `target` with text
    pub fn overlap_text(
        &mut self,
        data_set: DataSetId,
        path: Vec<AttributeId>,
        target: AttributeId,
        text: impl Into<String>,
    ) -> DataSetResult<ParameterId> {
        self.add_overlap(data_set, path, target, Some(ParameterValue::Text(text.into())))
    }

    /// Remove the overlap for `(path, target)`; returns whether one existed
    pub fn remove_overlap(
        &mut self,
        data_set: DataSetId,
        path: &[AttributeId],
        target: AttributeId,
    ) -> DataSetResult<bool> {
        let host = self.data_set_mut(data_set)?;
        let before = host.overlaps.len();
        host.overlaps.retain(|o| !o.matches(path, target));
        Ok(host.overlaps.len() != before)
    }

    fn data_set_mut(&mut self, id: DataSetId) -> DataSetResult<&mut DataSet> {
        self.data_sets
            .get_mut(&id)
            .ok_or(DataSetError::MissingDataSet(id))
    }

    fn owned_attribute(
        &self,
        data_set: DataSetId,
        attribute: AttributeId,
    ) -> DataSetResult<&Attribute> {
        let ds = self
            .data_sets
            .get(&data_set)
            .ok_or(DataSetError::MissingDataSet(data_set))?;
        self.attribute(ds.data_set_list_id, attribute)
            .ok_or(DataSetError::MissingAttribute(attribute))
    }

    fn list_value_id(
        &self,
        data_set: DataSetId,
        attribute: AttributeId,
        text: &str,
    ) -> DataSetResult<ListValueId> {
        self.owned_attribute(data_set, attribute)?
            .list_values
            .iter()
            .find(|v| v.text == text)
            .map(|v| v.id)
            .ok_or_else(|| DataSetError::MissingListValue {
                attribute_id: attribute,
                text: text.to_string(),
            })
    }
}

impl DataSetProvider for DataSetStore {
    fn data_set_list(&self, id: DataSetListId) -> Option<&DataSetList> {
        self.lists.get(&id)
    }

    fn data_set(&self, id: DataSetId) -> Option<&DataSet> {
        self.data_sets.get(&id)
    }
}
