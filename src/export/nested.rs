//! Nested export of one data set.
//!
//! ```json
//! {
//!   "parameters": { "param1": { "type": "TEXT", "value": "abc" } },
//!   "groups": {
//!     "Modify Internet + Phone": {
//!       "type": "DSL",
//!       "value": "Default",
//!       "parameters": { "param1": { "type": "TEXT", "value": "abc" } }
//!     }
//!   }
//! }
//! ```
//!
//! Each group is the data set a DSL attribute resolves to, seen through the
//! overlaps of every data set above it.

use std::collections::BTreeMap;
use std::mem;

use dataset_types::{Attribute, AttributeType, DataSet, DataSetList};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::context::{ExportContext, ValueRef};
use super::resolved_target;
use crate::config::EngineConfig;
use crate::error::DataSetResult;
use crate::evaluator::ValueEvaluator;
use crate::provider::DataSetProvider;
use crate::resolve::LayerResolver;
use crate::traverse::{self, AttributeNode, ListNode, TraversalHandler};

/// A scalar attribute in nested form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedParameter {
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_ref: Option<ValueRef>,
}

/// A data set in nested form. The root has no `type`/`value`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedGroup {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub attribute_type: Option<AttributeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, NestedParameter>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub groups: BTreeMap<String, NestedGroup>,
}

/// Exports data sets as nested parameter/group objects
#[derive(Clone)]
pub struct NestedExporter<'a> {
    ctx: ExportContext<'a>,
}

impl<'a> NestedExporter<'a> {
    pub fn new(provider: &'a dyn DataSetProvider) -> Self {
        Self {
            ctx: ExportContext::new(provider),
        }
    }

    pub fn with_context(ctx: ExportContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn with_evaluator(mut self, evaluator: &'a dyn ValueEvaluator) -> Self {
        self.ctx = self.ctx.with_evaluator(evaluator);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.ctx = self.ctx.with_config(config);
        self
    }

    /// Export `data_set` and everything its DSL attributes resolve to
    pub fn export(&self, data_set: &'a DataSet) -> DataSetResult<NestedGroup> {
        let list = self.ctx.list_of(data_set)?;
        let mut handler = NestedHandler {
            ctx: &self.ctx,
            resolver: LayerResolver::new(self.ctx.provider(), data_set),
            current: NestedGroup::default(),
            parents: Vec::new(),
        };
        traverse::walk(self.ctx.provider(), [list], &mut handler, self.ctx.config())?;
        debug!(data_set = %data_set.name, "Nested export finished");
        Ok(handler.current)
    }

    pub fn export_json(&self, data_set: &'a DataSet) -> DataSetResult<serde_json::Value> {
        Ok(serde_json::to_value(self.export(data_set)?)?)
    }
}

struct NestedHandler<'c, 'a> {
    ctx: &'c ExportContext<'a>,
    resolver: LayerResolver<'a>,
    current: NestedGroup,
    parents: Vec<NestedGroup>,
}

impl<'a> TraversalHandler<'a> for NestedHandler<'_, 'a> {
    fn list_children(
        &mut self,
        _provider: &'a dyn DataSetProvider,
        node: &ListNode<'a, '_>,
    ) -> DataSetResult<Vec<&'a Attribute>> {
        Ok(node.list.attributes.iter().filter(|a| a.is_reference()).collect())
    }

    /// Scalars of the level go into `parameters` before any group opens
    fn enter_list(&mut self, node: &ListNode<'a, '_>) -> DataSetResult<()> {
        for attribute in node.list.attributes.iter().filter(|a| !a.is_reference()) {
            let Some(reachable) = self.resolver.first(attribute.id).reachable() else {
                trace!(attribute = %attribute.name, "Skipping unreachable parameter");
                continue;
            };
            let rendered = self.ctx.render(attribute, &reachable)?;
            self.current.parameters.insert(
                attribute.name.clone(),
                NestedParameter {
                    attribute_type: attribute.attribute_type,
                    value: rendered.value,
                    value_ref: rendered.value_ref,
                },
            );
        }
        Ok(())
    }

    fn attribute_child(
        &mut self,
        _provider: &'a dyn DataSetProvider,
        node: &AttributeNode<'a, '_>,
    ) -> DataSetResult<Option<&'a DataSetList>> {
        let (outcome, target) = resolved_target(&mut self.resolver, node.attribute);
        let (Some(reachable), Some(target)) = (outcome.reachable(), target) else {
            debug!(attribute = %node.attribute.name, "Reference unresolved, group omitted");
            return Ok(None);
        };
        let list = self.ctx.list_of(target)?;

        let group = NestedGroup {
            attribute_type: Some(node.attribute.attribute_type),
            value: self.ctx.value(node.attribute, &reachable)?,
            ..NestedGroup::default()
        };
        self.parents.push(mem::replace(&mut self.current, group));
        Ok(Some(list))
    }

    fn descend_attribute(&mut self, node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        self.resolver.push(node.attribute.id);
        Ok(())
    }

    fn ascend_attribute(&mut self, node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        self.resolver.pop();
        if let Some(parent) = self.parents.pop() {
            let group = mem::replace(&mut self.current, parent);
            self.current
                .groups
                .insert(node.attribute.name.clone(), group);
        }
        Ok(())
    }
}
