//! Container/member traversal over data set lists.
//!
//! The schema alternates between lists (containers) and their attributes
//! (members); a DSL attribute has the referenced list as its single child.
//!
//! ```text
//! enter_list ─► [descend_list ─► (attribute)* ─► ascend_list] ─► exit_list
//! enter_attribute ─► [descend_attribute ─► (list) ─► ascend_attribute] ─► exit_attribute
//! ```
//!
//! The descend/ascend pair only fires when the node has children. Handlers
//! decide the children through `list_children` and `attribute_child`, which
//! lets a consumer prune (single attribute path) or skip unresolved
//! references. The walker keeps the path of DSL attributes from the root and
//! hands it to every callback.

use dataset_types::{Attribute, DataSetList};
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{DataSetError, DataSetResult};
use crate::provider::DataSetProvider;

/// A list being visited
#[derive(Debug, Clone, Copy)]
pub struct ListNode<'a, 'p> {
    pub list: &'a DataSetList,
    /// DSL attributes followed from the root to reach `list`
    pub path: &'p [&'a Attribute],
}

impl ListNode<'_, '_> {
    /// Nesting depth; roots are at 0
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// An attribute being visited
#[derive(Debug, Clone, Copy)]
pub struct AttributeNode<'a, 'p> {
    pub attribute: &'a Attribute,
    pub owner: &'a DataSetList,
    /// DSL attributes followed from the root to reach `owner`
    pub path: &'p [&'a Attribute],
}

impl AttributeNode<'_, '_> {
    /// Depth of the owning list
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Per-kind callbacks driven by [`walk`]. Every method has a default, so a
/// handler only overrides what it needs.
pub trait TraversalHandler<'a> {
    /// Attributes of `node` to visit, in order. Defaults to all of them.
    fn list_children(
        &mut self,
        _provider: &'a dyn DataSetProvider,
        node: &ListNode<'a, '_>,
    ) -> DataSetResult<Vec<&'a Attribute>> {
        Ok(node.list.attributes.iter().collect())
    }

    fn enter_list(&mut self, _node: &ListNode<'a, '_>) -> DataSetResult<()> {
        Ok(())
    }

    fn descend_list(&mut self, _node: &ListNode<'a, '_>) -> DataSetResult<()> {
        Ok(())
    }

    fn ascend_list(&mut self, _node: &ListNode<'a, '_>) -> DataSetResult<()> {
        Ok(())
    }

    fn exit_list(&mut self, _node: &ListNode<'a, '_>) -> DataSetResult<()> {
        Ok(())
    }

    /// List to descend into from `node`. Defaults to the referenced list of
    /// a DSL attribute.
    fn attribute_child(
        &mut self,
        provider: &'a dyn DataSetProvider,
        node: &AttributeNode<'a, '_>,
    ) -> DataSetResult<Option<&'a DataSetList>> {
        referenced_list(provider, node.attribute)
    }

    fn enter_attribute(&mut self, _node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        Ok(())
    }

    fn descend_attribute(&mut self, _node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        Ok(())
    }

    fn ascend_attribute(&mut self, _node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        Ok(())
    }

    fn exit_attribute(&mut self, _node: &AttributeNode<'a, '_>) -> DataSetResult<()> {
        Ok(())
    }
}

/// Referenced list of a DSL attribute; `None` for every other kind
pub fn referenced_list<'a>(
    provider: &'a dyn DataSetProvider,
    attribute: &Attribute,
) -> DataSetResult<Option<&'a DataSetList>> {
    match attribute.referenced_list() {
        Some(id) => provider
            .data_set_list(id)
            .map(Some)
            .ok_or(DataSetError::MissingDataSetList(id)),
        None => Ok(None),
    }
}

/// Walk every root list with `handler`.
///
/// # Errors
/// Handler errors propagate unchanged. `DepthLimitExceeded` when nesting
/// goes past `config.max_depth` lists.
pub fn walk<'a, H>(
    provider: &'a dyn DataSetProvider,
    roots: impl IntoIterator<Item = &'a DataSetList>,
    handler: &mut H,
    config: &EngineConfig,
) -> DataSetResult<()>
where
    H: TraversalHandler<'a> + ?Sized,
{
    let mut walker = Walker {
        provider,
        max_depth: config.max_depth,
        path: Vec::new(),
    };
    for root in roots {
        debug!(list = %root.name, "Walking data set list");
        walker.visit_list(root, handler)?;
    }
    Ok(())
}

struct Walker<'a> {
    provider: &'a dyn DataSetProvider,
    max_depth: usize,
    path: Vec<&'a Attribute>,
}

impl<'a> Walker<'a> {
    fn list_node(&self, list: &'a DataSetList) -> ListNode<'a, '_> {
        ListNode {
            list,
            path: &self.path,
        }
    }

    fn attribute_node(
        &self,
        owner: &'a DataSetList,
        attribute: &'a Attribute,
    ) -> AttributeNode<'a, '_> {
        AttributeNode {
            attribute,
            owner,
            path: &self.path,
        }
    }

    fn visit_list<H>(&mut self, list: &'a DataSetList, handler: &mut H) -> DataSetResult<()>
    where
        H: TraversalHandler<'a> + ?Sized,
    {
        handler.enter_list(&self.list_node(list))?;
        let children = handler.list_children(self.provider, &self.list_node(list))?;

        if !children.is_empty() {
            handler.descend_list(&self.list_node(list))?;
            for attribute in children {
                self.visit_attribute(list, attribute, handler)?;
            }
            handler.ascend_list(&self.list_node(list))?;
        }

        handler.exit_list(&self.list_node(list))
    }

    fn visit_attribute<H>(
        &mut self,
        owner: &'a DataSetList,
        attribute: &'a Attribute,
        handler: &mut H,
    ) -> DataSetResult<()>
    where
        H: TraversalHandler<'a> + ?Sized,
    {
        handler.enter_attribute(&self.attribute_node(owner, attribute))?;
        let child = handler.attribute_child(self.provider, &self.attribute_node(owner, attribute))?;

        if let Some(child) = child {
            if self.path.len() + 1 > self.max_depth {
                return Err(DataSetError::DepthLimitExceeded {
                    max_depth: self.max_depth,
                    attribute_name: attribute.name.clone(),
                });
            }
            handler.descend_attribute(&self.attribute_node(owner, attribute))?;
            self.path.push(attribute);
            let visited = self.visit_list(child, handler);
            self.path.pop();
            visited?;
            handler.ascend_attribute(&self.attribute_node(owner, attribute))?;
        }

        handler.exit_attribute(&self.attribute_node(owner, attribute))
    }
}
