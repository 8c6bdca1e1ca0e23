//! Value evaluation collaborator.
//!
//! Exporters call a `ValueEvaluator` once per scalar attribute to turn the
//! effective stored value into display/export text. Macro expansion and any
//! caching of its results belong to the evaluator implementation.

use dataset_types::{Attribute, AttributeType, ParameterValue};

use crate::error::{DataSetError, DataSetResult};
use crate::provider::DataSetProvider;
use crate::resolve::Reachable;

/// Turns a resolved value into text
pub trait ValueEvaluator {
    /// Evaluate the effective value of `attribute`.
    ///
    /// Returns `Ok(None)` when there is nothing to show.
    fn evaluate(
        &self,
        provider: &dyn DataSetProvider,
        attribute: &Attribute,
        value: &Reachable<'_>,
    ) -> DataSetResult<Option<String>>;
}

/// Evaluator that renders stored values verbatim
#[derive(Debug, Clone, Copy, Default)]
pub struct RawValueEvaluator;

impl ValueEvaluator for RawValueEvaluator {
    fn evaluate(
        &self,
        provider: &dyn DataSetProvider,
        attribute: &Attribute,
        value: &Reachable<'_>,
    ) -> DataSetResult<Option<String>> {
        if attribute.attribute_type == AttributeType::Unknown {
            return Err(DataSetError::UnsupportedAttributeType {
                attribute_type: attribute.attribute_type,
                attribute_name: attribute.name.clone(),
                operation: "value evaluation",
            });
        }

        let text = match value.value() {
            None => None,
            Some(ParameterValue::Text(text)) => Some(text.clone()),
            Some(ParameterValue::ListValue(id)) => {
                attribute.list_value_text(*id).map(str::to_string)
            }
            Some(ParameterValue::File(file)) => Some(file.file_name.clone()),
            Some(ParameterValue::DataSetReference(id)) => {
                provider.data_set(*id).map(|ds| ds.name.clone())
            }
        };
        Ok(text)
    }
}

/// Evaluator that delegates to a closure, for callers that plug in their
/// own macro calculation
pub struct FnEvaluator<F>(pub F);

impl<F> ValueEvaluator for FnEvaluator<F>
where
    F: Fn(&dyn DataSetProvider, &Attribute, &Reachable<'_>) -> DataSetResult<Option<String>>,
{
    fn evaluate(
        &self,
        provider: &dyn DataSetProvider,
        attribute: &Attribute,
        value: &Reachable<'_>,
    ) -> DataSetResult<Option<String>> {
        (self.0)(provider, attribute, value)
    }
}
