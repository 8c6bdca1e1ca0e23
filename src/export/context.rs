//! Shared state of an export run and scalar value extraction.

use dataset_types::{Attribute, AttributeType, DataSet, DataSetList, Parameter};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{DataSetError, DataSetResult};
use crate::evaluator::{RawValueEvaluator, ValueEvaluator};
use crate::provider::DataSetProvider;
use crate::resolve::Reachable;

static RAW_EVALUATOR: RawValueEvaluator = RawValueEvaluator;

/// Download reference of a FILE value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRef {
    pub content_type: String,
    pub url: String,
}

/// Value and value reference of one scalar attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedValue {
    pub value: Option<String>,
    pub value_ref: Option<ValueRef>,
}

/// Provider, evaluator and configuration used by every exporter
#[derive(Clone)]
pub struct ExportContext<'a> {
    provider: &'a dyn DataSetProvider,
    evaluator: &'a dyn ValueEvaluator,
    config: EngineConfig,
}

impl<'a> ExportContext<'a> {
    /// Context with the raw evaluator and default configuration
    pub fn new(provider: &'a dyn DataSetProvider) -> Self {
        Self {
            provider,
            evaluator: &RAW_EVALUATOR,
            config: EngineConfig::default(),
        }
    }

    pub fn with_evaluator(mut self, evaluator: &'a dyn ValueEvaluator) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn provider(&self) -> &'a dyn DataSetProvider {
        self.provider
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// List a data set belongs to
    pub fn list_of(&self, data_set: &DataSet) -> DataSetResult<&'a DataSetList> {
        self.provider
            .data_set_list(data_set.data_set_list_id)
            .ok_or(DataSetError::MissingDataSetList(data_set.data_set_list_id))
    }

    /// Value and value reference together
    pub fn render(
        &self,
        attribute: &Attribute,
        value: &Reachable<'_>,
    ) -> DataSetResult<RenderedValue> {
        Ok(RenderedValue {
            value_ref: self.value_ref(attribute, value)?,
            value: self.value(attribute, value)?,
        })
    }

    /// Display value. FILE values become a unique synthesized file name;
    /// every other kind goes through the evaluator.
    pub fn value(
        &self,
        attribute: &Attribute,
        value: &Reachable<'_>,
    ) -> DataSetResult<Option<String>> {
        match attribute.attribute_type {
            AttributeType::File => Ok(value.parameter().and_then(unique_file_name)),
            _ => self.evaluator.evaluate(self.provider, attribute, value),
        }
    }

    /// Download reference; only FILE values have one.
    ///
    /// # Errors
    /// `UnsupportedAttributeType` for kinds this crate does not know.
    pub fn value_ref(
        &self,
        attribute: &Attribute,
        value: &Reachable<'_>,
    ) -> DataSetResult<Option<ValueRef>> {
        match attribute.attribute_type {
            AttributeType::File => Ok(value.parameter().and_then(|parameter| {
                parameter.file().map(|file| ValueRef {
                    content_type: file.content_type.clone(),
                    url: format!("{}{}", self.config.file_url_prefix, parameter.id),
                })
            })),
            AttributeType::Text
            | AttributeType::Encrypted
            | AttributeType::List
            | AttributeType::Change
            | AttributeType::Dsl => Ok(None),
            AttributeType::Unknown => Err(DataSetError::UnsupportedAttributeType {
                attribute_type: attribute.attribute_type,
                attribute_name: attribute.name.clone(),
                operation: "value reference",
            }),
        }
    }
}

/// `<parameterId>.<ext>`, keyed by the parameter that owns the file so an
/// overlapped file never collides with the one it shadows
fn unique_file_name(parameter: &Parameter) -> Option<String> {
    let file = parameter.file()?;
    Some(match file.extension() {
        Some(ext) => format!("{}.{}", parameter.id, ext),
        None => parameter.id.to_string(),
    })
}
