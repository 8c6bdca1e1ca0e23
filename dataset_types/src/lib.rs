//! Data-set Types - Level 1 Foundation Types
//!
//! Pure data structures for the data-set model. Every other crate in this
//! repository builds on these types; this crate depends on nothing but
//! `serde` and `uuid`.
//!
//! ## Model
//!
//! ```text
//! DataSetList ──owns──► Attribute (ordered)
//!      │                    │ DSL kind: type_data_set_list_id ──► DataSetList
//!      └──owns──► DataSet
//!                    ├── parameters: AttributeId ──► Parameter
//!                    │        DataSetReference(DataSetId) ──► DataSet
//!                    └── overlaps: ParameterOverlap (attribute_path + Parameter)
//! ```
//!
//! ## Rules
//!
//! 1. **NO BUSINESS LOGIC** - resolution lives in the engine crate
//! 2. **CONSTRUCTORS AND ACCESSORS ONLY**
//! 3. **SERIALIZABLE** - every type round-trips through serde

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// IDENTIFIERS
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a `DataSetList`
    DataSetListId
);
uuid_id!(
    /// Identifier of a `DataSet` (one row of a list)
    DataSetId
);
uuid_id!(
    /// Identifier of an `Attribute`, stable and never reused within a list
    AttributeId
);
uuid_id!(
    /// Identifier of a `Parameter` (stored value or overlap)
    ParameterId
);
uuid_id!(
    /// Identifier of one choice of a LIST attribute
    ListValueId
);

// ============================================================================
// ATTRIBUTE TYPES
// ============================================================================

/// Kind of an attribute column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeType {
    /// Free text, may carry macros
    Text,
    /// Text stored encrypted; rendered as text by evaluators
    Encrypted,
    /// One choice out of the attribute's `list_values`
    List,
    /// Attached file
    File,
    /// Multiplicative value used to fan one data set out into many
    Change,
    /// Reference to a data set of another list
    Dsl,
    /// Kind written by a newer model version
    #[serde(other)]
    Unknown,
}

impl AttributeType {
    /// Get the wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::Text => "TEXT",
            AttributeType::Encrypted => "ENCRYPTED",
            AttributeType::List => "LIST",
            AttributeType::File => "FILE",
            AttributeType::Change => "CHANGE",
            AttributeType::Dsl => "DSL",
            AttributeType::Unknown => "UNKNOWN",
        }
    }

    /// Check if this kind references another data set list
    pub fn is_reference(&self) -> bool {
        matches!(self, AttributeType::Dsl)
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ATTRIBUTES AND LISTS
// ============================================================================

/// One choice of a LIST attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListValue {
    pub id: ListValueId,
    pub text: String,
}

/// A typed column of a data set list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    /// Owning list
    pub data_set_list_id: DataSetListId,
    pub attribute_type: AttributeType,
    /// Referenced list, set for DSL attributes only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_data_set_list_id: Option<DataSetListId>,
    /// Available choices, used by LIST attributes only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list_values: Vec<ListValue>,
}

impl Attribute {
    /// Create a new attribute with a generated id
    pub fn new(
        data_set_list_id: DataSetListId,
        name: impl Into<String>,
        attribute_type: AttributeType,
    ) -> Self {
        Self {
            id: AttributeId::generate(),
            name: name.into(),
            data_set_list_id,
            attribute_type,
            type_data_set_list_id: None,
            list_values: Vec::new(),
        }
    }

    /// Set the referenced list (DSL attributes)
    pub fn with_reference(mut self, target: DataSetListId) -> Self {
        self.type_data_set_list_id = Some(target);
        self
    }

    /// Check if this attribute references another list
    pub fn is_reference(&self) -> bool {
        self.attribute_type.is_reference()
    }

    /// Get the referenced list if this is a DSL attribute
    pub fn referenced_list(&self) -> Option<DataSetListId> {
        if self.is_reference() {
            self.type_data_set_list_id
        } else {
            None
        }
    }

    /// Look up the text of a LIST choice
    pub fn list_value_text(&self, id: ListValueId) -> Option<&str> {
        self.list_values
            .iter()
            .find(|v| v.id == id)
            .map(|v| v.text.as_str())
    }
}

/// A named schema of attributes plus the data sets conforming to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetList {
    pub id: DataSetListId,
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Rows of this list, in display order
    #[serde(default)]
    pub data_sets: Vec<DataSetId>,
}

impl DataSetList {
    /// Create an empty list with a generated id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: DataSetListId::generate(),
            name: name.into(),
            attributes: Vec::new(),
            data_sets: Vec::new(),
        }
    }

    /// Find an attribute by id
    pub fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.id == id)
    }

    /// Find an attribute by name
    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// Stored file metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileData {
    pub file_name: String,
    pub content_type: String,
}

impl FileData {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Extension of the stored file name, without the dot
    pub fn extension(&self) -> Option<&str> {
        match self.file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
            _ => None,
        }
    }
}

/// Payload of a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterValue {
    /// TEXT, ENCRYPTED and CHANGE payloads
    Text(String),
    ListValue(ListValueId),
    File(FileData),
    /// DSL payload: the referenced data set
    DataSetReference(DataSetId),
}

/// The value stored for one attribute on one data set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ParameterId,
    pub data_set_id: DataSetId,
    pub attribute_id: AttributeId,
    /// `None` when the parameter exists but carries no value
    #[serde(default)]
    pub value: Option<ParameterValue>,
}

impl Parameter {
    /// Create a parameter with a generated id
    pub fn new(
        data_set_id: DataSetId,
        attribute_id: AttributeId,
        value: Option<ParameterValue>,
    ) -> Self {
        Self {
            id: ParameterId::generate(),
            data_set_id,
            attribute_id,
            value,
        }
    }

    /// Referenced data set, if this is a DSL payload
    pub fn data_set_reference(&self) -> Option<DataSetId> {
        match self.value {
            Some(ParameterValue::DataSetReference(id)) => Some(id),
            _ => None,
        }
    }

    /// Text payload, if any
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            Some(ParameterValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// File payload, if any
    pub fn file(&self) -> Option<&FileData> {
        match &self.value {
            Some(ParameterValue::File(file)) => Some(file),
            _ => None,
        }
    }
}

/// A parameter that shadows a descendant attribute reached through
/// `attribute_path` from the host data set (`parameter.data_set_id`).
/// The overridden attribute is `parameter.attribute_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterOverlap {
    pub parameter: Parameter,
    /// Reference attributes walked from the host, outermost first
    pub attribute_path: Vec<AttributeId>,
}

impl ParameterOverlap {
    pub fn new(parameter: Parameter, attribute_path: Vec<AttributeId>) -> Self {
        Self {
            parameter,
            attribute_path,
        }
    }

    /// Overridden attribute
    pub fn target(&self) -> AttributeId {
        self.parameter.attribute_id
    }

    /// Check whether this overlap answers `(path, target)`
    pub fn matches(&self, path: &[AttributeId], target: AttributeId) -> bool {
        self.target() == target && self.attribute_path.as_slice() == path
    }
}

// ============================================================================
// DATA SETS
// ============================================================================

/// One row of a data set list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSet {
    pub id: DataSetId,
    pub name: String,
    pub data_set_list_id: DataSetListId,
    /// At most one regular parameter per attribute
    #[serde(default)]
    pub parameters: BTreeMap<AttributeId, Parameter>,
    #[serde(default)]
    pub overlaps: Vec<ParameterOverlap>,
}

impl DataSet {
    /// Create an empty data set with a generated id
    pub fn new(data_set_list_id: DataSetListId, name: impl Into<String>) -> Self {
        Self {
            id: DataSetId::generate(),
            name: name.into(),
            data_set_list_id,
            parameters: BTreeMap::new(),
            overlaps: Vec::new(),
        }
    }

    /// Regular (non-overlap) parameter for an attribute
    pub fn parameter(&self, attribute_id: AttributeId) -> Option<&Parameter> {
        self.parameters.get(&attribute_id)
    }

    /// Overlap defined on this data set for `(path, target)`
    pub fn overlap(&self, path: &[AttributeId], target: AttributeId) -> Option<&ParameterOverlap> {
        self.overlaps.iter().find(|o| o.matches(path, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_type_wire_names() {
        let json = serde_json::to_string(&AttributeType::Dsl).unwrap();
        assert_eq!(json, r#""DSL""#);
        let parsed: AttributeType = serde_json::from_str(r#""ENCRYPTED""#).unwrap();
        assert_eq!(parsed, AttributeType::Encrypted);
    }

    #[test]
    fn test_unknown_attribute_type_is_captured() {
        let parsed: AttributeType = serde_json::from_str(r#""JSON_TABLE""#).unwrap();
        assert_eq!(parsed, AttributeType::Unknown);
    }

    #[test]
    fn test_referenced_list_only_for_dsl() {
        let owner = DataSetListId::generate();
        let target = DataSetListId::generate();

        let dsl = Attribute::new(owner, "address", AttributeType::Dsl).with_reference(target);
        assert_eq!(dsl.referenced_list(), Some(target));

        let text = Attribute::new(owner, "name", AttributeType::Text).with_reference(target);
        assert_eq!(text.referenced_list(), None);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(FileData::new("rest.txt", "plain/text").extension(), Some("txt"));
        assert_eq!(FileData::new("archive.tar.gz", "x").extension(), Some("gz"));
        assert_eq!(FileData::new("README", "x").extension(), None);
        assert_eq!(FileData::new(".profile", "x").extension(), None);
        assert_eq!(FileData::new("trailing.", "x").extension(), None);
    }

    #[test]
    fn test_overlap_matches_path_and_target() {
        let ds = DataSetId::generate();
        let a = AttributeId::generate();
        let b = AttributeId::generate();
        let target = AttributeId::generate();

        let overlap = ParameterOverlap::new(
            Parameter::new(ds, target, Some(ParameterValue::Text("x".into()))),
            vec![a, b],
        );

        assert!(overlap.matches(&[a, b], target));
        assert!(!overlap.matches(&[a], target));
        assert!(!overlap.matches(&[b, a], target));
        assert!(!overlap.matches(&[a, b], a));
    }

    #[test]
    fn test_data_set_yaml_roundtrip() {
        let list = DataSetList::new("Customers");
        let attr = Attribute::new(list.id, "name", AttributeType::Text);
        let mut ds = DataSet::new(list.id, "Customer1");
        ds.parameters.insert(
            attr.id,
            Parameter::new(ds.id, attr.id, Some(ParameterValue::Text("Ann".into()))),
        );

        let yaml = serde_yaml::to_string(&ds).unwrap();
        let parsed: DataSet = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, ds);
        assert_eq!(parsed.parameter(attr.id).and_then(|p| p.text()), Some("Ann"));
    }
}
