//! Override resolution through reference chains
//!
//! Scenario tests on the customer -> address -> postal code model and
//! property tests over generated reference chains.

mod helpers;

use dataset_resolver::{
    resolve, AttributeId, AttributeType, DataSetId, DataSetProvider, DataSetStore, LayerResolver,
    OverlapItem, ParameterValue, Reachable, StopReason,
};
use helpers::{customer_chain, shadow_first_part};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn texts(items: &[OverlapItem<'_>]) -> Vec<Option<String>> {
    items
        .iter()
        .map(|item| item.parameter().and_then(|p| p.text()).map(str::to_string))
        .collect()
}

/// Test 1: outer overlap shadows the address overlap and the postal code default
#[test]
fn test_customer_overlap_wins() {
    let mut m = customer_chain();
    shadow_first_part(&mut m);

    let start = m.store.data_set(m.customer1).unwrap();
    let path = [m.customer_to_address, m.address_to_postal_code];
    let item = resolve(&m.store, start, &path, m.first_part);

    assert_eq!(
        item.parameter().and_then(|p| p.text()),
        Some("Overlapped by Customer1")
    );
    match item {
        OverlapItem::Reachable(Reachable::Overlap { layer, host, .. }) => {
            assert_eq!(layer, 0);
            assert_eq!(host.id, m.customer1);
        }
        other => panic!("expected customer overlap, got {:?}", other),
    }
}

/// Test 2: the iterator lists every shadowed value, outer to inner
#[test]
fn test_shadowed_values_in_order() {
    let mut m = customer_chain();
    shadow_first_part(&mut m);

    let start = m.store.data_set(m.customer1).unwrap();
    let mut resolver = LayerResolver::with_path(
        &m.store,
        start,
        vec![m.customer_to_address, m.address_to_postal_code],
    );
    let items: Vec<_> = resolver.resolve(m.first_part).collect();

    assert_eq!(
        texts(&items),
        vec![
            Some("Overlapped by Customer1".to_string()),
            Some("Overlapped by Address1".to_string()),
            Some("A1A".to_string()),
        ]
    );
    assert!(matches!(
        items[2],
        OverlapItem::Reachable(Reachable::DefaultInitialized { .. })
    ));
}

/// Test 3: the address overlap applies when resolving from the address
#[test]
fn test_inner_overlap_from_inner_start() {
    let mut m = customer_chain();
    shadow_first_part(&mut m);

    let start = m.store.data_set(m.address1).unwrap();
    let item = resolve(&m.store, start, &[m.address_to_postal_code], m.first_part);
    assert_eq!(
        item.parameter().and_then(|p| p.text()),
        Some("Overlapped by Address1")
    );

    // Untouched sibling falls back to the postal code's own value
    let item = resolve(&m.store, start, &[m.address_to_postal_code], m.second_part);
    assert_eq!(item.parameter().and_then(|p| p.text()), Some("1A1"));
}

/// Test 4: a missing reference ends the chain with an unreachable outcome
#[test]
fn test_unset_reference_is_unreachable() {
    let mut m = customer_chain();
    m.store
        .clear_value(m.address1, m.address_to_postal_code)
        .unwrap();

    let start = m.store.data_set(m.customer1).unwrap();
    let mut resolver = LayerResolver::with_path(
        &m.store,
        start,
        vec![m.customer_to_address, m.address_to_postal_code],
    );
    let items: Vec<_> = resolver.resolve(m.first_part).collect();

    assert_eq!(items.len(), 1);
    match items[0] {
        OverlapItem::Unreachable {
            data_set,
            attribute_id,
        } => {
            assert_eq!(data_set.id, m.address1);
            assert_eq!(attribute_id, m.address_to_postal_code);
        }
        other => panic!("expected unreachable, got {:?}", other),
    }
    let (_, _, reason) = resolver.stop_reason().unwrap();
    assert_eq!(reason, StopReason::Unresolved);
    assert!(items[0].into_reachable().is_err());
}

/// Test 5: an overlapped reference changes which row the next layer is
#[test]
fn test_overlapped_reference_redirects_chain() {
    let mut m = customer_chain();
    let other = m.store.add_data_set(m.postal_codes, "B2B 2B2").unwrap();
    m.store.set_text(other, m.first_part, "B2B").unwrap();
    m.store
        .add_overlap(
            m.customer1,
            vec![m.customer_to_address],
            m.address_to_postal_code,
            Some(ParameterValue::DataSetReference(other)),
        )
        .unwrap();

    let start = m.store.data_set(m.customer1).unwrap();
    let item = resolve(
        &m.store,
        start,
        &[m.customer_to_address, m.address_to_postal_code],
        m.first_part,
    );
    assert_eq!(item.parameter().and_then(|p| p.text()), Some("B2B"));
    assert_eq!(item.data_set().id, other);
}

/// Test 6: layers resolved for one target are the layers of any other
/// target on the same path
#[test]
fn test_shared_resolver_matches_fresh_resolvers() {
    let mut m = customer_chain();
    shadow_first_part(&mut m);
    let start = m.store.data_set(m.customer1).unwrap();
    let path = vec![m.customer_to_address, m.address_to_postal_code];

    let mut shared = LayerResolver::with_path(&m.store, start, path.clone());
    let first = shared.first(m.first_part);
    let second = shared.first(m.second_part);
    let shared_layers: Vec<DataSetId> = shared.layers().map(|ds| ds.id).collect();

    let mut fresh = LayerResolver::with_path(&m.store, start, path.clone());
    let fresh_layers: Vec<DataSetId> = fresh.layers().map(|ds| ds.id).collect();

    assert_eq!(shared_layers, fresh_layers);
    assert_eq!(shared_layers, vec![m.customer1, m.address1, m.postal_code]);
    assert_eq!(first, resolve(&m.store, start, &path, m.first_part));
    assert_eq!(second, resolve(&m.store, start, &path, m.second_part));
}

// ============================================================================
// Generated chains
// ============================================================================

/// Chain of `overlaps.len() + 1` lists; row k hosts `overlaps[k]` (if any)
/// for the final `value` attribute over the rest of the path
struct GeneratedChain {
    store: DataSetStore,
    start: DataSetId,
    path: Vec<AttributeId>,
    target: AttributeId,
    sibling: AttributeId,
}

fn generated_chain(overlaps: &[Option<String>], default: Option<&str>) -> GeneratedChain {
    let mut store = DataSetStore::new();
    let depth = overlaps.len();

    let last = store.add_list(format!("L{depth}"));
    let target = store.add_attribute(last, "value", AttributeType::Text).unwrap();
    let sibling = store.add_attribute(last, "sibling", AttributeType::Text).unwrap();
    let mut row = store.add_data_set(last, format!("R{depth}")).unwrap();
    if let Some(text) = default {
        store.set_text(row, target, text).unwrap();
    }

    let mut list = last;
    let mut path = Vec::new();
    for k in (0..depth).rev() {
        let outer = store.add_list(format!("L{k}"));
        let next = store.add_reference_attribute(outer, "next", list).unwrap();
        let outer_row = store.add_data_set(outer, format!("R{k}")).unwrap();
        store.set_reference(outer_row, next, row).unwrap();
        path.insert(0, next);
        list = outer;
        row = outer_row;
    }

    let rows: Vec<DataSetId> = {
        let start = store.data_set(row).unwrap();
        let mut resolver = LayerResolver::with_path(&store, start, path.clone());
        resolver.layers().map(|ds| ds.id).collect()
    };
    for (k, overlap) in overlaps.iter().enumerate() {
        if let Some(text) = overlap {
            store
                .overlap_text(rows[k], path[k..].to_vec(), target, text.clone())
                .unwrap();
        }
    }

    GeneratedChain {
        store,
        start: row,
        path,
        target,
        sibling,
    }
}

fn arb_chain() -> impl Strategy<Value = (Vec<Option<String>>, Option<String>)> {
    (
        prop::collection::vec(prop::option::of("[a-z]{1,8}"), 1..5),
        prop::option::of("[a-z]{1,8}"),
    )
}

proptest! {
    /// Resolving twice without mutation gives the same outcome
    #[test]
    fn resolution_is_idempotent((overlaps, default) in arb_chain()) {
        let chain = generated_chain(&overlaps, default.as_deref());
        let start = chain.store.data_set(chain.start).unwrap();

        let first: Vec<_> = LayerResolver::with_path(&chain.store, start, chain.path.clone())
            .resolve(chain.target)
            .collect();
        let second: Vec<_> = LayerResolver::with_path(&chain.store, start, chain.path.clone())
            .resolve(chain.target)
            .collect();
        prop_assert_eq!(first, second);
    }

    /// The outermost overlap wins; without overlaps the last row's own value
    /// (or nothing) is used
    #[test]
    fn outer_overlap_wins_else_fallback((overlaps, default) in arb_chain()) {
        let chain = generated_chain(&overlaps, default.as_deref());
        let start = chain.store.data_set(chain.start).unwrap();
        let item = resolve(&chain.store, start, &chain.path, chain.target);

        let expected = overlaps.iter().flatten().next().cloned().or(default.clone());
        prop_assert!(item.is_reachable());
        prop_assert_eq!(item.parameter().and_then(|p| p.text()).map(str::to_string), expected);
        prop_assert_eq!(item.is_overlap(), overlaps.iter().any(Option::is_some));

        let count = LayerResolver::with_path(&chain.store, start, chain.path.clone())
            .resolve(chain.target)
            .count();
        prop_assert_eq!(count, overlaps.iter().flatten().count() + 1);
    }

    /// A chain whose first reference is unset is unreachable, never an error
    #[test]
    fn unset_first_reference_is_unreachable((mut overlaps, default) in arb_chain()) {
        overlaps[0] = None;
        let mut chain = generated_chain(&overlaps, default.as_deref());
        chain.store.clear_value(chain.start, chain.path[0]).unwrap();
        let start = chain.store.data_set(chain.start).unwrap();

        let item = resolve(&chain.store, start, &chain.path, chain.target);
        let is_unreachable_at_start = matches!(
            item,
            OverlapItem::Unreachable { data_set, .. } if data_set.id == chain.start
        );
        prop_assert!(is_unreachable_at_start);
    }

    /// Layers cached while resolving one target match a fresh resolver
    #[test]
    fn cached_layers_are_transparent((overlaps, default) in arb_chain()) {
        let chain = generated_chain(&overlaps, default.as_deref());
        let start = chain.store.data_set(chain.start).unwrap();

        let mut shared = LayerResolver::with_path(&chain.store, start, chain.path.clone());
        let target = shared.first(chain.target);
        let sibling = shared.first(chain.sibling);
        let shared_layers: Vec<_> = shared.layers().map(|ds| ds.id).collect();
        let fresh_layers: Vec<_> = LayerResolver::with_path(&chain.store, start, chain.path.clone())
            .layers()
            .map(|ds| ds.id)
            .collect();

        prop_assert_eq!(shared_layers, fresh_layers);
        prop_assert_eq!(target, resolve(&chain.store, start, &chain.path, chain.target));
        prop_assert_eq!(sibling, resolve(&chain.store, start, &chain.path, chain.sibling));
    }
}
