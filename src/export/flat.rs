//! Dotted-path exports.
//!
//! `flatten_data_set` maps every reachable scalar leaf of a data set to its
//! evaluated value, `structure_paths` lists the leaf paths of a schema.
//! Both name a leaf by the attribute names from the root joined with `.`.

use std::collections::BTreeMap;

use dataset_types::{Attribute, DataSet, DataSetList};
use serde_json::Value;
use tracing::{debug, trace};

use super::context::ExportContext;
use super::resolved_target;
use crate::config::EngineConfig;
use crate::error::DataSetResult;
use crate::provider::DataSetProvider;
use crate::resolve::LayerResolver;
use crate::traverse::{self, AttributeNode, TraversalHandler};

/// Dotted name of a leaf below `names`
fn dotted(names: &[&str], leaf: &str) -> String {
    let mut path = names.join(".");
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(leaf);
    path
}

/// Reachable scalar leaves of `data_set` and their values.
///
/// A leaf without a value maps to `null`; leaves behind an unresolved
/// reference are left out.
pub fn flatten_data_set<'a>(
    ctx: &ExportContext<'a>,
    data_set: &'a DataSet,
) -> DataSetResult<BTreeMap<String, Value>> {
    let list = ctx.list_of(data_set)?;
    let mut handler = FlattenHandler {
        ctx,
        resolver: LayerResolver::new(ctx.provider(), data_set),
        names: Vec::new(),
        values: BTreeMap::new(),
    };
    traverse::walk(ctx.provider(), [list], &mut handler, ctx.config())?;
    debug!(data_set = %data_set.name, leaves = handler.values.len(), "Data set flattened");
    Ok(handler.values)
}

/// Flatten every data set of `list`, in list order, keyed by data set name
pub fn flatten_list<'a>(
    ctx: &ExportContext<'a>,
    list: &'a DataSetList,
) -> DataSetResult<Vec<(String, BTreeMap<String, Value>)>> {
    ctx.provider()
        .data_sets_of(list.id)
        .into_iter()
        .map(|data_set| Ok((data_set.name.clone(), flatten_data_set(ctx, data_set)?)))
        .collect()
}

/// Dotted leaf paths of `list`'s schema. DSL attributes only contribute
/// through the leaves of the list they reference.
pub fn structure_paths(
    provider: &dyn DataSetProvider,
    list: &DataSetList,
    config: &EngineConfig,
) -> DataSetResult<Vec<String>> {
    let mut handler = StructureHandler::default();
    traverse::walk(provider, [list], &mut handler, config)?;
    Ok(handler.paths)
}

struct FlattenHandler<'c, 'a> {
    ctx: &'c ExportContext<'a>,
    resolver: LayerResolver<'a>,
    names: Vec<&'a str>,
    values: BTreeMap<String, Value>,
}

impl<'a> TraversalHandler<'a> for FlattenHandler<'_, 'a> {
    fn attribute_child(
        &mut self,
        _provider: &'a dyn DataSetProvider,
        node: &AttributeNode<'a, '_>,
    ) -> DataSetResult<Option<&'a DataSetList>> {
        if !node.attribute.is_reference() {
            return Ok(None);
        }
        match resolved_target(&mut self.resolver, node.attribute).1 {
            Some(target) => self.ctx.list_of(target).map(Some),
            None => {
                trace!(attribute = %node.attribute.name, "Reference unresolved, leaves omitted");
                Ok(None)
            }
        }
    }

    fn enter_attribute(&mut self, node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        let attribute: &'a Attribute = node.attribute;
        if attribute.is_reference() {
            return Ok(());
        }
        let Some(reachable) = self.resolver.first(attribute.id).reachable() else {
            return Ok(());
        };
        let value = self
            .ctx
            .value(attribute, &reachable)?
            .map_or(Value::Null, Value::String);
        self.values.insert(dotted(&self.names, &attribute.name), value);
        Ok(())
    }

    fn descend_attribute(&mut self, node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        self.resolver.push(node.attribute.id);
        self.names.push(&node.attribute.name);
        Ok(())
    }

    fn ascend_attribute(&mut self, _node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        self.resolver.pop();
        self.names.pop();
        Ok(())
    }
}

#[derive(Default)]
struct StructureHandler {
    paths: Vec<String>,
}

impl<'a> TraversalHandler<'a> for StructureHandler {
    fn enter_attribute(&mut self, node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        if !node.attribute.is_reference() {
            let names: Vec<&str> = node.path.iter().map(|a| a.name.as_str()).collect();
            self.paths.push(dotted(&names, &node.attribute.name));
        }
        Ok(())
    }
}
