//! Property-based tests using proptest
//!
//! These tests verify href derivation, collection path construction and
//! operation-id extraction against randomized inputs.

use azgate::operation::OperationHandle;
use azgate::resource::kinds::{AvailabilitySet, IpAddress, NetworkInterface, StorageAccount};
use azgate::resource::{group_scoped_href, AzureResource};
use proptest::prelude::*;

/// Generate a plausible ARM name segment
fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9_.-]{0,30}"
}

/// Generate an arbitrary scope prefix of varying depth
fn arb_prefix() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z0-9]{1,8}", 0..6)
}

fn availability_sets(parent: &str, subscription: &str) -> String {
    AvailabilitySet::default().collection_path(parent, subscription)
}

fn storage_accounts(parent: &str, subscription: &str) -> String {
    StorageAccount::default().collection_path(parent, subscription)
}

fn network_interfaces(parent: &str, subscription: &str) -> String {
    NetworkInterface::default().collection_path(parent, subscription)
}

fn ip_addresses(parent: &str, subscription: &str) -> String {
    IpAddress::default().collection_path(parent, subscription)
}

type CollectionPath = fn(&str, &str) -> String;

const KINDS: [(CollectionPath, &str); 4] = [
    (availability_sets, "providers/Microsoft.Compute/availabilitySets"),
    (storage_accounts, "providers/Microsoft.Storage/storageAccounts"),
    (network_interfaces, "providers/Microsoft.Network/networkInterfaces"),
    (ip_addresses, "providers/Microsoft.Network/publicIPAddresses"),
];

proptest! {
    /// The href only depends on the trailing segments of the id
    #[test]
    fn test_href_is_depth_invariant(
        prefix in arb_prefix(),
        group in arb_name(),
        name in arb_name(),
    ) {
        let tail = format!("resourceGroups/{}/providers/Microsoft.Compute/availabilitySets/{}", group, name);
        let short = format!("/subscriptions/s/{}", tail);
        let deep = format!("/{}/subscriptions/s/{}", prefix.join("/"), tail);

        let expected = format!("resource_groups/{}/availability_sets/{}", group, name);
        prop_assert_eq!(group_scoped_href(&short, "availability_sets").unwrap(), expected.clone());
        prop_assert_eq!(group_scoped_href(&deep, "availability_sets").unwrap(), expected);
    }

    /// Collection paths never carry an empty segment and differ only by the group
    #[test]
    fn test_collection_paths_have_no_empty_segment(
        subscription in arb_name(),
        group in arb_name(),
    ) {
        for (collection_path, provider_path) in KINDS {
            let global = collection_path("", &subscription);
            let scoped = collection_path(&group, &subscription);

            for path in [&global, &scoped] {
                let route = path.split('?').next().unwrap_or_default();
                prop_assert!(route.starts_with('/'));
                prop_assert!(!route[1..].split('/').any(str::is_empty), "empty segment in {}", path);
                prop_assert!(route.ends_with(provider_path));
            }

            let group_segments = format!("/resourceGroups/{}", urlencoding::encode(&group));
            prop_assert_eq!(scoped.replacen(&group_segments, "", 1), global);
        }
    }

    /// The operation id is the last path segment of the Location header
    #[test]
    fn test_operation_id_extraction(
        id in "[a-zA-Z0-9-]{1,40}",
        location in arb_name(),
        query in prop::option::of("[a-z]{1,8}=[a-z0-9-]{1,12}"),
    ) {
        let mut header = format!(
            "https://management.azure.com/subscriptions/s/providers/Microsoft.Network/locations/{}/operations/{}",
            location, id
        );
        if let Some(query) = &query {
            header = format!("{}?{}", header, query);
        }

        let handle = OperationHandle::from_location(&header).unwrap();
        prop_assert_eq!(handle.operation_id, id);
        prop_assert_eq!(handle.location_hint.as_deref(), Some(location.as_str()));
    }
}
