//! Error types for the resolution engine and its exporters
//!
//! Unreachable reference paths are not errors: they are ordinary
//! `OverlapItem::Unreachable` values. The variants here are defects
//! (asking an unreachable outcome for its value, meeting an attribute kind
//! an extractor cannot render) or ambient failures (config, snapshots).

use dataset_types::{AttributeId, AttributeType, DataSetId, DataSetListId};
use thiserror::Error;

/// Main error type for the data-set engine
#[derive(Error, Debug)]
pub enum DataSetError {
    #[error("Unreachable outcome accessed as reachable: attribute {attribute_id} not found from data set {data_set_id}")]
    UnreachableAccess {
        data_set_id: DataSetId,
        attribute_id: AttributeId,
    },

    #[error("Unsupported attribute type {attribute_type} for attribute '{attribute_name}' in {operation}")]
    UnsupportedAttributeType {
        attribute_type: AttributeType,
        attribute_name: String,
        operation: &'static str,
    },

    #[error("Traversal depth limit {max_depth} exceeded at attribute '{attribute_name}'")]
    DepthLimitExceeded {
        max_depth: usize,
        attribute_name: String,
    },

    #[error("Data set list {0} not found")]
    MissingDataSetList(DataSetListId),

    #[error("Data set {0} not found")]
    MissingDataSet(DataSetId),

    #[error("Data set {data_set_id} does not belong to list {data_set_list_id}")]
    ForeignDataSet {
        data_set_id: DataSetId,
        data_set_list_id: DataSetListId,
    },

    #[error("Attribute {0} not found")]
    MissingAttribute(AttributeId),

    #[error("Attribute {attribute_id} has no list value '{text}'")]
    MissingListValue {
        attribute_id: AttributeId,
        text: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DataSetError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnreachableAccess { .. } => "UNREACHABLE_ACCESS",
            Self::UnsupportedAttributeType { .. } => "UNSUPPORTED_ATTRIBUTE_TYPE",
            Self::DepthLimitExceeded { .. } => "DEPTH_LIMIT_EXCEEDED",
            Self::MissingDataSetList(_) => "MISSING_DATA_SET_LIST",
            Self::MissingDataSet(_) => "MISSING_DATA_SET",
            Self::ForeignDataSet { .. } => "FOREIGN_DATA_SET",
            Self::MissingAttribute(_) => "MISSING_ATTRIBUTE",
            Self::MissingListValue { .. } => "MISSING_LIST_VALUE",
            Self::Config(_) => "CONFIG",
            Self::Io(_) => "IO",
            Self::Serialization(_) => "SERIALIZATION",
            Self::Yaml(_) => "YAML",
        }
    }

    /// Check if this error signals a logic or model defect rather than
    /// bad input
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            Self::UnreachableAccess { .. } | Self::UnsupportedAttributeType { .. }
        )
    }
}

pub type DataSetResult<T> = Result<T, DataSetError>;

/// Model inconsistencies found by `validate::validate`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A DSL attribute references a list that does not exist
    #[error("Dangling list reference: attribute '{attribute_name}' ({attribute_id}) -> {target}")]
    DanglingListReference {
        attribute_id: AttributeId,
        attribute_name: String,
        target: DataSetListId,
    },

    /// A DSL attribute has no referenced list
    #[error("Reference attribute '{attribute_name}' ({attribute_id}) names no list")]
    MissingListReference {
        attribute_id: AttributeId,
        attribute_name: String,
    },

    /// Lists reference each other in a loop
    #[error("Cycle detected in list references: {}", format_cycle(path))]
    CycleDetected { path: Vec<String> },

    /// An attribute claims a different owning list than the one holding it
    #[error("Attribute '{attribute_name}' is held by list {list} but claims list {declared}")]
    AttributeOwnerMismatch {
        attribute_name: String,
        list: DataSetListId,
        declared: DataSetListId,
    },

    /// A list's row order names a data set that is missing or belongs elsewhere
    #[error("List {data_set_list_id} names data set {data_set_id} which is not one of its rows")]
    MisplacedDataSet {
        data_set_list_id: DataSetListId,
        data_set_id: DataSetId,
    },

    /// A parameter is stored for an attribute the data set's list does not have
    #[error("Data set '{data_set_name}' stores a parameter for foreign attribute {attribute_id}")]
    ForeignParameter {
        data_set_name: String,
        attribute_id: AttributeId,
    },

    /// An overlap can never match: its path does not walk DSL attributes
    /// or its target is not an attribute of the list at the end of the path
    #[error("Overlap on data set '{data_set_name}' for attribute {target} is unreachable: {reason}")]
    InvalidOverlapPath {
        data_set_name: String,
        target: AttributeId,
        reason: String,
    },
}

fn format_cycle(path: &[String]) -> String {
    path.join(" -> ")
}

impl ValidationError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DanglingListReference { .. } => "DANGLING_LIST_REFERENCE",
            Self::MissingListReference { .. } => "MISSING_LIST_REFERENCE",
            Self::CycleDetected { .. } => "CYCLE_DETECTED",
            Self::AttributeOwnerMismatch { .. } => "ATTRIBUTE_OWNER_MISMATCH",
            Self::MisplacedDataSet { .. } => "MISPLACED_DATA_SET",
            Self::ForeignParameter { .. } => "FOREIGN_PARAMETER",
            Self::InvalidOverlapPath { .. } => "INVALID_OVERLAP_PATH",
        }
    }

    /// Blocking errors make traversal or resolution unsafe; the rest only
    /// leave data that is never read.
    pub fn is_blocking(&self) -> bool {
        !matches!(
            self,
            Self::ForeignParameter { .. } | Self::InvalidOverlapPath { .. }
        )
    }
}
