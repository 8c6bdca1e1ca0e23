//! Model validation.
//!
//! The resolution engine trusts the model it is given. Run these checks
//! when a snapshot is accepted:
//! 1. Attribute ownership (attributes claim the list that holds them)
//! 2. Referential integrity (DSL attributes name existing lists)
//! 3. Cycle detection over list references (DFS with path tracking)
//! 4. Row order (lists only name their own data sets)
//! 5. Parameters belong to the data set's list
//! 6. Overlap paths walk DSL attributes and end at the target's list

use std::collections::HashSet;

use dataset_types::{AttributeId, DataSet, DataSetListId, ParameterOverlap};
use tracing::warn;

use crate::error::ValidationError;
use crate::provider::DataSetProvider;
use crate::store::DataSetStore;

/// Result of validating a store.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Blocking errors (traversal should not proceed).
    pub errors: Vec<ValidationError>,
    /// Non-blocking warnings.
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if validation passed (no blocking errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error or warning based on severity.
    pub fn add(&mut self, error: ValidationError) {
        warn!(code = error.code(), "{}", error);
        if error.is_blocking() {
            self.errors.push(error);
        } else {
            self.warnings.push(error);
        }
    }

    pub fn issue_count(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }
}

/// Validate every list and data set of `store`.
///
/// # Example
///
/// ```
/// use dataset_resolver::{validate, DataSetStore};
///
/// let store = DataSetStore::new();
/// let result = validate(&store);
/// assert!(result.is_valid());
/// ```
pub fn validate(store: &DataSetStore) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_attribute_owners(store, &mut result);
    validate_list_references(store, &mut result);
    validate_no_cycles(store, &mut result);
    validate_row_order(store, &mut result);

    for data_set in store.data_sets() {
        validate_parameters(store, data_set, &mut result);
        for overlap in &data_set.overlaps {
            validate_overlap(store, data_set, overlap, &mut result);
        }
    }

    result
}

fn validate_attribute_owners(store: &DataSetStore, result: &mut ValidationResult) {
    for list in store.lists() {
        for attribute in &list.attributes {
            if attribute.data_set_list_id != list.id {
                result.add(ValidationError::AttributeOwnerMismatch {
                    attribute_name: attribute.name.clone(),
                    list: list.id,
                    declared: attribute.data_set_list_id,
                });
            }
        }
    }
}

fn validate_list_references(store: &DataSetStore, result: &mut ValidationResult) {
    for list in store.lists() {
        for attribute in list.attributes.iter().filter(|a| a.is_reference()) {
            match attribute.referenced_list() {
                None => result.add(ValidationError::MissingListReference {
                    attribute_id: attribute.id,
                    attribute_name: attribute.name.clone(),
                }),
                Some(target) if store.data_set_list(target).is_none() => {
                    result.add(ValidationError::DanglingListReference {
                        attribute_id: attribute.id,
                        attribute_name: attribute.name.clone(),
                        target,
                    })
                }
                Some(_) => {}
            }
        }
    }
}

fn validate_no_cycles(store: &DataSetStore, result: &mut ValidationResult) {
    let mut global_visited: HashSet<DataSetListId> = HashSet::new();

    for list in store.lists() {
        let mut path: Vec<DataSetListId> = Vec::new();
        let mut path_set: HashSet<DataSetListId> = HashSet::new();
        detect_cycles_dfs(
            list.id,
            store,
            &mut global_visited,
            &mut path,
            &mut path_set,
            result,
        );
    }
}

fn detect_cycles_dfs(
    list_id: DataSetListId,
    store: &DataSetStore,
    global_visited: &mut HashSet<DataSetListId>,
    path: &mut Vec<DataSetListId>,
    path_set: &mut HashSet<DataSetListId>,
    result: &mut ValidationResult,
) {
    if path_set.contains(&list_id) {
        if let Some(pos) = path.iter().position(|id| *id == list_id) {
            let mut cycle: Vec<String> = path[pos..]
                .iter()
                .map(|id| list_name(store, *id))
                .collect();
            cycle.push(list_name(store, list_id));
            result.add(ValidationError::CycleDetected { path: cycle });
        }
        return;
    }

    if global_visited.contains(&list_id) {
        return;
    }

    path.push(list_id);
    path_set.insert(list_id);

    if let Some(list) = store.data_set_list(list_id) {
        for target in list.attributes.iter().filter_map(|a| a.referenced_list()) {
            detect_cycles_dfs(target, store, global_visited, path, path_set, result);
        }
    }

    path.pop();
    path_set.remove(&list_id);
    global_visited.insert(list_id);
}

fn list_name(store: &DataSetStore, id: DataSetListId) -> String {
    store
        .data_set_list(id)
        .map(|l| l.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn validate_row_order(store: &DataSetStore, result: &mut ValidationResult) {
    for list in store.lists() {
        for id in &list.data_sets {
            let owned = store
                .data_set(*id)
                .is_some_and(|ds| ds.data_set_list_id == list.id);
            if !owned {
                result.add(ValidationError::MisplacedDataSet {
                    data_set_list_id: list.id,
                    data_set_id: *id,
                });
            }
        }
    }
}

fn validate_parameters(store: &DataSetStore, data_set: &DataSet, result: &mut ValidationResult) {
    for attribute_id in data_set.parameters.keys() {
        if store
            .attribute(data_set.data_set_list_id, *attribute_id)
            .is_none()
        {
            result.add(ValidationError::ForeignParameter {
                data_set_name: data_set.name.clone(),
                attribute_id: *attribute_id,
            });
        }
    }
}

fn validate_overlap(
    store: &DataSetStore,
    host: &DataSet,
    overlap: &ParameterOverlap,
    result: &mut ValidationResult,
) {
    let checked = overlap_target_list(store, host.data_set_list_id, &overlap.attribute_path)
        .and_then(|list| {
            store
                .attribute(list, overlap.target())
                .map(|_| ())
                .ok_or_else(|| {
                    format!(
                        "target is not an attribute of list '{}'",
                        list_name(store, list)
                    )
                })
        });
    if let Err(reason) = checked {
        result.add(ValidationError::InvalidOverlapPath {
            data_set_name: host.name.clone(),
            target: overlap.target(),
            reason,
        });
    }
}

/// List reached by walking `path` from `start`
fn overlap_target_list(
    store: &DataSetStore,
    start: DataSetListId,
    path: &[AttributeId],
) -> Result<DataSetListId, String> {
    if path.is_empty() {
        return Err("empty attribute path".to_string());
    }
    let mut list = start;
    for id in path {
        let attribute = store.attribute(list, *id).ok_or_else(|| {
            format!(
                "path attribute {} not found in list '{}'",
                id,
                list_name(store, list)
            )
        })?;
        list = attribute
            .referenced_list()
            .ok_or_else(|| format!("path attribute '{}' is not a reference", attribute.name))?;
    }
    Ok(list)
}
