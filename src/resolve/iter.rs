//! Per-query resolution iterator.
//!
//! Walks the layers of a path outer to inner. At each layer before the
//! last it yields every overlap whose own path equals the remaining path;
//! at the final layer it yields the target's own value. The first item is
//! authoritative: the outermost overlap shadows everything inside it.

use dataset_types::AttributeId;
use tracing::trace;

use super::layers::LayerResolver;
use super::outcome::{OverlapItem, Reachable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Look for an overlap hosted by this layer
    CheckOverlap(usize),
    /// Look at the target's own value on the final layer
    CheckTarget,
    Done,
}

/// Lazy, finite sequence of outcomes for one target attribute
pub struct OverlapIterator<'r, 'a> {
    resolver: &'r mut LayerResolver<'a>,
    /// Number of path elements this query walks
    path_len: usize,
    target: AttributeId,
    step: Step,
}

impl<'r, 'a> OverlapIterator<'r, 'a> {
    pub(crate) fn new(
        resolver: &'r mut LayerResolver<'a>,
        path_len: usize,
        target: AttributeId,
    ) -> Self {
        let step = if path_len == 0 {
            Step::CheckTarget
        } else {
            Step::CheckOverlap(0)
        };
        Self {
            resolver,
            path_len,
            target,
            step,
        }
    }

    pub fn target(&self) -> AttributeId {
        self.target
    }

    fn check_overlap(&mut self, layer: usize) -> Option<OverlapItem<'a>> {
        let provider = self.resolver.provider;
        let host = self.resolver.layer(layer)?;
        let remaining = &self.resolver.path[layer..self.path_len];
        provider
            .overlap_of(host.id, remaining, self.target)
            .map(|overlap| {
                trace!(layer, host = %host.name, target = %self.target, "Overlap found");
                OverlapItem::Reachable(Reachable::Overlap {
                    layer,
                    host,
                    overlap,
                })
            })
    }

    fn check_target(&mut self) -> OverlapItem<'a> {
        let provider = self.resolver.provider;
        let Some(data_set) = self.resolver.layer(self.path_len) else {
            return self.resolver.unreachable(self.target);
        };

        if let Some(parameter) = provider.parameter_of(data_set.id, self.target) {
            OverlapItem::Reachable(Reachable::DefaultInitialized {
                data_set,
                parameter,
            })
        } else if provider
            .attribute(data_set.data_set_list_id, self.target)
            .is_some()
        {
            OverlapItem::Reachable(Reachable::DefaultUninitialized {
                data_set,
                attribute_id: self.target,
            })
        } else {
            OverlapItem::Unreachable {
                data_set,
                attribute_id: self.target,
            }
        }
    }
}

impl<'a> Iterator for OverlapIterator<'_, 'a> {
    type Item = OverlapItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.step {
                Step::Done => return None,
                Step::CheckOverlap(layer) if layer >= self.path_len => {
                    self.step = Step::CheckTarget;
                }
                Step::CheckOverlap(layer) => {
                    if self.resolver.layer(layer).is_none() {
                        self.step = Step::Done;
                        return Some(self.resolver.unreachable(self.target));
                    }
                    self.step = Step::CheckOverlap(layer + 1);
                    if let Some(item) = self.check_overlap(layer) {
                        return Some(item);
                    }
                }
                Step::CheckTarget => {
                    self.step = Step::Done;
                    return Some(self.check_target());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DataSetProvider;
    use crate::store::DataSetStore;
    use dataset_types::{AttributeType, DataSetId};

    struct Fixture {
        store: DataSetStore,
        customer: DataSetId,
        address: DataSetId,
        to_address: AttributeId,
        street: AttributeId,
        zip: AttributeId,
    }

    fn fixture() -> Fixture {
        let mut store = DataSetStore::new();
        let addresses = store.add_list("Addresses");
        let street = store
            .add_attribute(addresses, "street", AttributeType::Text)
            .unwrap();
        let zip = store.add_attribute(addresses, "zip", AttributeType::Text).unwrap();
        let customers = store.add_list("Customers");
        let to_address = store
            .add_reference_attribute(customers, "address", addresses)
            .unwrap();

        let address = store.add_data_set(addresses, "Address1").unwrap();
        store.set_text(address, street, "Main St").unwrap();
        let customer = store.add_data_set(customers, "Customer1").unwrap();
        store.set_reference(customer, to_address, address).unwrap();

        Fixture {
            store,
            customer,
            address,
            to_address,
            street,
            zip,
        }
    }

    #[test]
    fn test_empty_path_checks_start_only() {
        let f = fixture();
        let start = f.store.data_set(f.address).unwrap();
        let mut resolver = LayerResolver::new(&f.store, start);

        let items: Vec<_> = resolver.resolve(f.street).collect();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].parameter().and_then(|p| p.text()), Some("Main St"));
    }

    #[test]
    fn test_default_initialized_and_uninitialized() {
        let f = fixture();
        let start = f.store.data_set(f.customer).unwrap();
        let mut resolver = LayerResolver::with_path(&f.store, start, vec![f.to_address]);

        assert!(matches!(
            resolver.first(f.street),
            OverlapItem::Reachable(Reachable::DefaultInitialized { .. })
        ));
        assert!(matches!(
            resolver.first(f.zip),
            OverlapItem::Reachable(Reachable::DefaultUninitialized { .. })
        ));
    }

    #[test]
    fn test_overlap_then_shadowed_default() {
        let mut f = fixture();
        f.store
            .overlap_text(f.customer, vec![f.to_address], f.street, "Overlapped St")
            .unwrap();
        let start = f.store.data_set(f.customer).unwrap();
        let mut resolver = LayerResolver::with_path(&f.store, start, vec![f.to_address]);

        let items: Vec<_> = resolver.resolve(f.street).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_overlap());
        assert_eq!(items[0].parameter().and_then(|p| p.text()), Some("Overlapped St"));
        assert_eq!(items[1].parameter().and_then(|p| p.text()), Some("Main St"));
    }

    #[test]
    fn test_unknown_target_is_unreachable() {
        let f = fixture();
        let start = f.store.data_set(f.customer).unwrap();
        let mut resolver = LayerResolver::with_path(&f.store, start, vec![f.to_address]);
        let stranger = AttributeId::generate();

        match resolver.first(stranger) {
            OverlapItem::Unreachable {
                data_set,
                attribute_id,
            } => {
                assert_eq!(data_set.id, f.address);
                assert_eq!(attribute_id, stranger);
            }
            other => panic!("expected unreachable, got {:?}", other),
        }
    }

    #[test]
    fn test_overlap_survives_unreachable_inner_layer() {
        let mut f = fixture();
        f.store.clear_value(f.customer, f.to_address).unwrap();
        f.store
            .overlap_text(f.customer, vec![f.to_address], f.street, "Kept")
            .unwrap();
        let start = f.store.data_set(f.customer).unwrap();
        let mut resolver = LayerResolver::with_path(&f.store, start, vec![f.to_address]);

        let items: Vec<_> = resolver.resolve(f.street).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_overlap());
        assert!(matches!(
            items[1],
            OverlapItem::Unreachable { attribute_id, .. } if attribute_id == f.to_address
        ));
    }
}
