//! Concrete resource kinds
//!
//! Each kind is one implementation of [`super::AzureResource`]. API versions
//! are pinned per provider namespace.

mod availability_sets;
mod ip_addresses;
mod network_interfaces;
pub mod providers;
mod resource_groups;
mod storage_accounts;

pub use availability_sets::{AvailabilitySet, AvailabilitySetRequest};
pub use ip_addresses::{IpAddress, IpAddressRequest};
pub use network_interfaces::{NetworkInterface, NetworkInterfaceRequest};
pub use providers::{Provider, ProviderResponse};
pub use resource_groups::{ResourceGroup, ResourceGroupRequest};
pub use storage_accounts::{StorageAccount, StorageAccountRequest};

/// `Microsoft.Compute` API version
pub const COMPUTE_API_VERSION: &str = "2016-03-30";

/// `Microsoft.Resources` API version (groups, providers)
pub const RESOURCE_MANAGER_API_VERSION: &str = "2015-01-01";
