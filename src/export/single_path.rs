//! Attribute tree restricted to one explicit attribute path.

use dataset_types::{AttributeId, DataSet, DataSetList};

use super::context::ExportContext;
use super::ui_tree::{build_tree, UiAttributeNode};
use crate::error::DataSetResult;

/// Node of the last attribute of `path`, resolved for every row.
///
/// `path[0]` is an attribute of `list`; each following id is an attribute of
/// the list referenced by the one before it. The returned node has no
/// children. `None` when the path does not follow the schema.
pub fn resolve_attribute_path<'a>(
    ctx: &ExportContext<'a>,
    list: &'a DataSetList,
    rows: &[&'a DataSet],
    path: &[AttributeId],
) -> DataSetResult<Option<UiAttributeNode>> {
    if path.is_empty() {
        return Ok(None);
    }

    let mut level = build_tree(ctx, list, rows, Some(path))?;
    for (depth, id) in path.iter().enumerate() {
        let Some(node) = level.pop() else {
            return Ok(None);
        };
        if node.id != *id {
            return Ok(None);
        }
        if depth + 1 == path.len() {
            return Ok(Some(node));
        }
        level = node.attributes;
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DataSetProvider;
    use crate::store::DataSetStore;
    use dataset_types::AttributeType;

    #[test]
    fn test_last_node_without_children() {
        let mut store = DataSetStore::new();
        let postal_codes = store.add_list("PostalCodes");
        let first_part = store
            .add_attribute(postal_codes, "firstPart", AttributeType::Text)
            .unwrap();
        let addresses = store.add_list("Addresses");
        let to_postal = store
            .add_reference_attribute(addresses, "postalCode", postal_codes)
            .unwrap();
        store
            .add_attribute(addresses, "street", AttributeType::Text)
            .unwrap();

        let postal = store.add_data_set(postal_codes, "A1A").unwrap();
        store.set_text(postal, first_part, "A1A").unwrap();
        let address = store.add_data_set(addresses, "Address1").unwrap();
        store.set_reference(address, to_postal, postal).unwrap();

        let list = store.data_set_list(addresses).unwrap();
        let rows = [store.data_set(address).unwrap()];
        let ctx = ExportContext::new(&store);

        let leaf = resolve_attribute_path(&ctx, list, &rows, &[to_postal, first_part])
            .unwrap()
            .unwrap();
        assert_eq!(leaf.name, "firstPart");
        assert_eq!(leaf.parameters[0].value.as_deref(), Some("A1A"));

        let reference = resolve_attribute_path(&ctx, list, &rows, &[to_postal])
            .unwrap()
            .unwrap();
        assert_eq!(reference.parameters[0].value.as_deref(), Some("A1A"));
        assert!(reference.attributes.is_empty());
    }

    #[test]
    fn test_mismatched_path() {
        let mut store = DataSetStore::new();
        let addresses = store.add_list("Addresses");
        let street = store
            .add_attribute(addresses, "street", AttributeType::Text)
            .unwrap();
        let list = store.data_set_list(addresses).unwrap();
        let ctx = ExportContext::new(&store);

        assert!(resolve_attribute_path(&ctx, list, &[], &[]).unwrap().is_none());
        assert!(resolve_attribute_path(&ctx, list, &[], &[AttributeId::generate()])
            .unwrap()
            .is_none());
        // A TEXT attribute cannot be followed
        assert!(resolve_attribute_path(&ctx, list, &[], &[street, street])
            .unwrap()
            .is_none());
    }
}
