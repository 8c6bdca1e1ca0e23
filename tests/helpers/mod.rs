//! Shared data set models for integration tests

#![allow(dead_code)]

use dataset_resolver::{
    AttributeId, AttributeType, DataSetId, DataSetListId, DataSetStore, FileData, ParameterId,
    ParameterValue,
};

/// `DS` in `dsl1` with TEXT/FILE/LIST parameters and a reference to
/// `Default` in `Modify Internet + Phone`
pub struct NestedGroupsModel {
    pub store: DataSetStore,
    pub dsl1: DataSetListId,
    pub data_set: DataSetId,
    pub default: DataSetId,
    pub param2: ParameterId,
    pub default_param2: ParameterId,
    pub reference: AttributeId,
    pub default_param1: AttributeId,
}

pub fn nested_groups() -> NestedGroupsModel {
    let mut store = DataSetStore::new();

    let service = store.add_list("Modify Internet + Phone");
    let default_param1 = store
        .add_attribute(service, "param1", AttributeType::Text)
        .unwrap();
    let default_file = store
        .add_attribute(service, "param2", AttributeType::File)
        .unwrap();
    let default = store.add_data_set(service, "Default").unwrap();
    store.set_text(default, default_param1, "abc").unwrap();
    let default_param2 = store
        .set_file(
            default,
            default_file,
            FileData::new("putty.exe", "application/octet-stream"),
        )
        .unwrap();

    let dsl1 = store.add_list("dsl1");
    let param1 = store.add_attribute(dsl1, "param1", AttributeType::Text).unwrap();
    let file = store.add_attribute(dsl1, "param2", AttributeType::File).unwrap();
    let param3 = store
        .add_list_attribute(dsl1, "param3", &["Connected", "Disconnected"])
        .unwrap();
    let reference = store
        .add_reference_attribute(dsl1, "Modify Internet + Phone", service)
        .unwrap();

    let data_set = store.add_data_set(dsl1, "DS").unwrap();
    store.set_text(data_set, param1, "abc").unwrap();
    let param2 = store
        .set_file(data_set, file, FileData::new("rest.txt", "plain/text"))
        .unwrap();
    store.set_list_value(data_set, param3, "Disconnected").unwrap();
    store.set_reference(data_set, reference, default).unwrap();

    NestedGroupsModel {
        store,
        dsl1,
        data_set,
        default,
        param2,
        default_param2,
        reference,
        default_param1,
    }
}

/// Customer -> address -> postal code chain
pub struct CustomerModel {
    pub store: DataSetStore,
    pub customers: DataSetListId,
    pub addresses: DataSetListId,
    pub postal_codes: DataSetListId,
    pub customer1: DataSetId,
    pub address1: DataSetId,
    pub postal_code: DataSetId,
    pub customer_to_address: AttributeId,
    pub address_to_postal_code: AttributeId,
    pub first_part: AttributeId,
    pub second_part: AttributeId,
    pub street: AttributeId,
}

pub fn customer_chain() -> CustomerModel {
    let mut store = DataSetStore::new();

    let postal_codes = store.add_list("PostalCodes");
    let first_part = store
        .add_attribute(postal_codes, "firstPart", AttributeType::Text)
        .unwrap();
    let second_part = store
        .add_attribute(postal_codes, "secondPart", AttributeType::Text)
        .unwrap();

    let addresses = store.add_list("Addresses");
    let street = store
        .add_attribute(addresses, "street", AttributeType::Text)
        .unwrap();
    let address_to_postal_code = store
        .add_reference_attribute(addresses, "postalCode", postal_codes)
        .unwrap();

    let customers = store.add_list("Customers");
    let customer_to_address = store
        .add_reference_attribute(customers, "address", addresses)
        .unwrap();

    let postal_code = store.add_data_set(postal_codes, "A1A 1A1").unwrap();
    store.set_text(postal_code, first_part, "A1A").unwrap();
    store.set_text(postal_code, second_part, "1A1").unwrap();

    let address1 = store.add_data_set(addresses, "Address1").unwrap();
    store.set_text(address1, street, "Main St").unwrap();
    store
        .set_reference(address1, address_to_postal_code, postal_code)
        .unwrap();

    let customer1 = store.add_data_set(customers, "Customer1").unwrap();
    store
        .set_reference(customer1, customer_to_address, address1)
        .unwrap();

    CustomerModel {
        store,
        customers,
        addresses,
        postal_codes,
        customer1,
        address1,
        postal_code,
        customer_to_address,
        address_to_postal_code,
        first_part,
        second_part,
        street,
    }
}

/// Add both overlaps of `firstPart`: Address1's and Customer1's
pub fn shadow_first_part(model: &mut CustomerModel) {
    model
        .store
        .add_overlap(
            model.address1,
            vec![model.address_to_postal_code],
            model.first_part,
            Some(ParameterValue::Text("Overlapped by Address1".into())),
        )
        .unwrap();
    model
        .store
        .add_overlap(
            model.customer1,
            vec![model.customer_to_address, model.address_to_postal_code],
            model.first_part,
            Some(ParameterValue::Text("Overlapped by Customer1".into())),
        )
        .unwrap();
}

/// Customer with an address and an empty cart
pub struct EmptyReferenceModel {
    pub store: DataSetStore,
    pub customers: DataSetListId,
    pub customer: DataSetId,
}

pub fn empty_reference() -> EmptyReferenceModel {
    let mut store = DataSetStore::new();

    let carts = store.add_list("Carts");
    let cart = store.add_data_set(carts, "EmptyCart").unwrap();

    let addresses = store.add_list("Addresses");
    let province = store
        .add_attribute(addresses, "province", AttributeType::Text)
        .unwrap();
    let address = store.add_data_set(addresses, "Address1").unwrap();
    store.set_text(address, province, "Ontario").unwrap();

    let customers = store.add_list("Customers");
    let to_address = store
        .add_reference_attribute(customers, "Address1", addresses)
        .unwrap();
    let to_cart = store
        .add_reference_attribute(customers, "cart", carts)
        .unwrap();

    let customer = store.add_data_set(customers, "Customer1").unwrap();
    store.set_reference(customer, to_address, address).unwrap();
    store.set_reference(customer, to_cart, cart).unwrap();

    EmptyReferenceModel {
        store,
        customers,
        customer,
    }
}
