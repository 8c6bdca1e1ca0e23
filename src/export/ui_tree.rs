//! Attribute tree for table editors.
//!
//! One node per attribute of the schema, each carrying one parameter entry
//! per requested data set (a column of the editor). DSL nodes nest the
//! attributes of the referenced list; rows that cannot reach a nested
//! attribute get an entry without a value.

use dataset_types::{
    Attribute, AttributeId, AttributeType, DataSet, DataSetId, DataSetList, DataSetListId,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::context::{ExportContext, ValueRef};
use super::single_path;
use crate::config::EngineConfig;
use crate::error::{DataSetError, DataSetResult};
use crate::evaluator::ValueEvaluator;
use crate::provider::DataSetProvider;
use crate::resolve::LayerResolver;
use crate::traverse::{self, AttributeNode, ListNode, TraversalHandler};

/// Effective value of one attribute for one data set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiParameter {
    pub data_set: DataSetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_ref: Option<ValueRef>,
    /// Value comes from an overlap rather than the data set itself
    pub overlap: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiAttributeNode {
    pub id: AttributeId,
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_set_list_reference: Option<DataSetListId>,
    pub parameters: Vec<UiParameter>,
    #[serde(default)]
    pub attributes: Vec<UiAttributeNode>,
}

impl UiAttributeNode {
    /// Parameter entry of `data_set`
    pub fn parameter_for(&self, data_set: DataSetId) -> Option<&UiParameter> {
        self.parameters.iter().find(|p| p.data_set == data_set)
    }

    /// Child node by attribute name
    pub fn child(&self, name: &str) -> Option<&UiAttributeNode> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Builds attribute trees for data sets of one list
#[derive(Clone)]
pub struct UiTreeBuilder<'a> {
    ctx: ExportContext<'a>,
}

impl<'a> UiTreeBuilder<'a> {
    pub fn new(provider: &'a dyn DataSetProvider) -> Self {
        Self {
            ctx: ExportContext::new(provider),
        }
    }

    pub fn with_context(ctx: ExportContext<'a>) -> Self {
        Self { ctx }
    }

    /// Replace the raw evaluator, e.g. with one that expands macros
    pub fn with_evaluator(mut self, evaluator: &'a dyn ValueEvaluator) -> Self {
        self.ctx = self.ctx.with_evaluator(evaluator);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.ctx = self.ctx.with_config(config);
        self
    }

    pub fn context(&self) -> &ExportContext<'a> {
        &self.ctx
    }

    /// Full tree of `list` with one column per data set in `rows`
    ///
    /// # Errors
    /// `ForeignDataSet` when a row is not a data set of `list`.
    pub fn build(
        &self,
        list: &'a DataSetList,
        rows: &[&'a DataSet],
    ) -> DataSetResult<Vec<UiAttributeNode>> {
        build_tree(&self.ctx, list, rows, None)
    }

    /// Node of the last attribute of `path`, see [`single_path::resolve_attribute_path`]
    pub fn build_path(
        &self,
        list: &'a DataSetList,
        rows: &[&'a DataSet],
        path: &[AttributeId],
    ) -> DataSetResult<Option<UiAttributeNode>> {
        single_path::resolve_attribute_path(&self.ctx, list, rows, path)
    }
}

/// Walk `list` for `rows`, optionally restricted to one attribute path
pub(super) fn build_tree<'a>(
    ctx: &ExportContext<'a>,
    list: &'a DataSetList,
    rows: &[&'a DataSet],
    path_filter: Option<&[AttributeId]>,
) -> DataSetResult<Vec<UiAttributeNode>> {
    if let Some(foreign) = rows.iter().find(|r| r.data_set_list_id != list.id) {
        return Err(DataSetError::ForeignDataSet {
            data_set_id: foreign.id,
            data_set_list_id: list.id,
        });
    }

    let mut handler = UiTreeHandler {
        ctx,
        rows: rows
            .iter()
            .map(|row| LayerResolver::new(ctx.provider(), *row))
            .collect(),
        path_filter,
        open: Vec::new(),
        levels: vec![Vec::new()],
    };
    traverse::walk(ctx.provider(), [list], &mut handler, ctx.config())?;
    debug!(list = %list.name, rows = rows.len(), "Attribute tree built");
    Ok(handler.levels.pop().unwrap_or_default())
}

struct UiTreeHandler<'c, 'a> {
    ctx: &'c ExportContext<'a>,
    /// One resolver per column, moved in lockstep
    rows: Vec<LayerResolver<'a>>,
    path_filter: Option<&'c [AttributeId]>,
    /// Nodes entered but not yet exited
    open: Vec<UiAttributeNode>,
    /// Finished siblings per nesting level
    levels: Vec<Vec<UiAttributeNode>>,
}

impl UiTreeHandler<'_, '_> {
    fn parameters(&mut self, attribute: &Attribute) -> DataSetResult<Vec<UiParameter>> {
        let mut parameters = Vec::with_capacity(self.rows.len());
        for resolver in &mut self.rows {
            let data_set = resolver.start().id;
            let parameter = match resolver.first(attribute.id).reachable() {
                Some(reachable) => {
                    let rendered = self.ctx.render(attribute, &reachable)?;
                    UiParameter {
                        data_set,
                        value: rendered.value,
                        value_ref: rendered.value_ref,
                        overlap: reachable.is_overlap(),
                    }
                }
                None => UiParameter {
                    data_set,
                    value: None,
                    value_ref: None,
                    overlap: false,
                },
            };
            parameters.push(parameter);
        }
        Ok(parameters)
    }
}

impl<'a> TraversalHandler<'a> for UiTreeHandler<'_, 'a> {
    fn list_children(
        &mut self,
        _provider: &'a dyn DataSetProvider,
        node: &ListNode<'a, '_>,
    ) -> DataSetResult<Vec<&'a Attribute>> {
        let Some(filter) = self.path_filter else {
            return Ok(node.list.attributes.iter().collect());
        };
        Ok(filter
            .get(node.depth())
            .and_then(|id| node.list.attribute(*id))
            .into_iter()
            .collect())
    }

    fn attribute_child(
        &mut self,
        provider: &'a dyn DataSetProvider,
        node: &AttributeNode<'a, '_>,
    ) -> DataSetResult<Option<&'a DataSetList>> {
        if let Some(filter) = self.path_filter {
            if node.depth() + 1 >= filter.len() {
                return Ok(None);
            }
        }
        traverse::referenced_list(provider, node.attribute)
    }

    fn enter_attribute(&mut self, node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        let attribute = node.attribute;
        let parameters = self.parameters(attribute)?;
        self.open.push(UiAttributeNode {
            id: attribute.id,
            name: attribute.name.clone(),
            attribute_type: attribute.attribute_type,
            data_set_list_reference: attribute.referenced_list(),
            parameters,
            attributes: Vec::new(),
        });
        Ok(())
    }

    fn descend_attribute(&mut self, node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        for resolver in &mut self.rows {
            resolver.push(node.attribute.id);
        }
        self.levels.push(Vec::new());
        Ok(())
    }

    fn ascend_attribute(&mut self, _node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        for resolver in &mut self.rows {
            resolver.pop();
        }
        let children = self.levels.pop().unwrap_or_default();
        if let Some(open) = self.open.last_mut() {
            open.attributes = children;
        }
        Ok(())
    }

    fn exit_attribute(&mut self, _node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        if let (Some(node), Some(level)) = (self.open.pop(), self.levels.last_mut()) {
            level.push(node);
        }
        Ok(())
    }
}
