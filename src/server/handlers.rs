//! Route handlers
//!
//! Handlers only pull route parameters and the request context out of the
//! request and hand them to the core. Group-scoped kinds share one set of
//! generic handlers instantiated per kind.

use crate::azure::RequestContext;
use crate::error::GatewayError;
use crate::operation::{self, OperationHandle, OPERATION_CONTENT_TYPE};
use crate::resource::catalog::{self, ImageCoordinates};
use crate::resource::crud::{self, render, Outcome};
use crate::resource::kinds::{
    providers, AvailabilitySet, IpAddress, NetworkInterface, Provider, ProviderResponse,
    ResourceGroup, StorageAccount,
};
use crate::resource::{AzureResource, GenericRecord, TrackedResource};
use axum::body::Bytes;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;

/// Kinds that live inside a resource group
pub trait GroupScoped: AzureResource + Default + Send + Sync + 'static {
    /// An existing resource addressed by route parameters
    fn locate(group: &str, name: &str) -> Self;
    /// A resource about to be created in `group`
    fn in_group(group: &str) -> Self;
}

impl GroupScoped for AvailabilitySet {
    fn locate(group: &str, name: &str) -> Self {
        AvailabilitySet::locate(group, name)
    }

    fn in_group(group: &str) -> Self {
        AvailabilitySet::in_group(group)
    }
}

impl GroupScoped for StorageAccount {
    fn locate(group: &str, name: &str) -> Self {
        StorageAccount::locate(group, name)
    }

    fn in_group(group: &str) -> Self {
        StorageAccount::in_group(group)
    }
}

impl GroupScoped for IpAddress {
    fn locate(group: &str, name: &str) -> Self {
        IpAddress::locate(group, name)
    }

    fn in_group(group: &str) -> Self {
        IpAddress::in_group(group)
    }
}

impl GroupScoped for NetworkInterface {
    fn locate(group: &str, name: &str) -> Self {
        NetworkInterface::locate(group, name)
    }

    fn in_group(group: &str) -> Self {
        NetworkInterface::in_group(group)
    }
}

type Listing = Result<Outcome<Vec<GenericRecord>>, GatewayError>;

pub async fn health_check() -> &'static str {
    "Ok"
}

// =========================================================================
// Group-scoped kinds
// =========================================================================

/// Subscription-wide listing (no resource group)
pub async fn list_all<R: GroupScoped>(ctx: RequestContext) -> Listing {
    crud::list(&ctx, R::default(), "").await
}

pub async fn list_in_group<R: GroupScoped>(ctx: RequestContext, Path(group): Path<String>) -> Listing {
    crud::list(&ctx, R::default(), &group).await
}

pub async fn show<R: GroupScoped>(
    ctx: RequestContext,
    Path((group, id)): Path<(String, String)>,
) -> Result<Outcome<R::Response>, GatewayError> {
    crud::get(&ctx, R::locate(&group, &id)).await
}

pub async fn create<R: GroupScoped>(
    ctx: RequestContext,
    Path(group): Path<String>,
    body: Bytes,
) -> Result<Outcome<R::Response>, GatewayError> {
    crud::create(&ctx, R::in_group(&group), &body).await
}

pub async fn destroy<R: GroupScoped>(
    ctx: RequestContext,
    Path((group, id)): Path<(String, String)>,
) -> Result<Outcome<()>, GatewayError> {
    crud::delete(&ctx, R::locate(&group, &id)).await
}

// =========================================================================
// Resource groups
// =========================================================================

pub async fn list_resource_groups(ctx: RequestContext) -> Listing {
    crud::list(&ctx, ResourceGroup::default(), "").await
}

pub async fn show_resource_group(
    ctx: RequestContext,
    Path(group): Path<String>,
) -> Result<Outcome<TrackedResource>, GatewayError> {
    crud::get(&ctx, ResourceGroup::locate(&group)).await
}

pub async fn create_resource_group(
    ctx: RequestContext,
    body: Bytes,
) -> Result<Outcome<TrackedResource>, GatewayError> {
    crud::create(&ctx, ResourceGroup::default(), &body).await
}

pub async fn delete_resource_group(
    ctx: RequestContext,
    Path(group): Path<String>,
) -> Result<Outcome<()>, GatewayError> {
    crud::delete(&ctx, ResourceGroup::locate(&group)).await
}

// =========================================================================
// Providers
// =========================================================================

pub async fn list_providers(ctx: RequestContext) -> Listing {
    crud::list(&ctx, Provider::default(), "").await
}

pub async fn show_provider(
    ctx: RequestContext,
    Path(name): Path<String>,
) -> Result<Outcome<ProviderResponse>, GatewayError> {
    crud::get(&ctx, Provider::named(&name)).await
}

pub async fn register_provider(
    ctx: RequestContext,
    Path(name): Path<String>,
) -> Result<Outcome<ProviderResponse>, GatewayError> {
    providers::register(&ctx, Provider::named(&name)).await
}

// =========================================================================
// Operations
// =========================================================================

pub async fn poll_operation(
    ctx: RequestContext,
    Path((location, service, id)): Path<(String, String, String)>,
) -> Result<Response, GatewayError> {
    let handle = OperationHandle::new(&service, &location, &id);
    let report = operation::poll(&ctx, &handle).await?;
    Ok(render(StatusCode::OK, OPERATION_CONTENT_TYPE, &report))
}

// =========================================================================
// Catalog
// =========================================================================

type Records = Result<Json<Vec<GenericRecord>>, GatewayError>;

pub async fn list_locations(ctx: RequestContext) -> Records {
    Ok(Json(catalog::list_locations(&ctx).await?))
}

pub async fn list_instance_types(ctx: RequestContext, Path(location): Path<String>) -> Records {
    Ok(Json(catalog::list_instance_types(&ctx, &location).await?))
}

pub async fn list_images(ctx: RequestContext, Path(location): Path<String>) -> Records {
    Ok(Json(catalog::list_images(&ctx, &location).await?))
}

pub async fn list_publishers(ctx: RequestContext, Path(location): Path<String>) -> Records {
    let coordinates = ImageCoordinates::at(&location);
    Ok(Json(catalog::list_level(&ctx, &coordinates).await?))
}

pub async fn list_offers(
    ctx: RequestContext,
    Path((location, publisher)): Path<(String, String)>,
) -> Records {
    let coordinates = ImageCoordinates {
        publisher,
        ..ImageCoordinates::at(&location)
    };
    Ok(Json(catalog::list_level(&ctx, &coordinates).await?))
}

pub async fn list_skus(
    ctx: RequestContext,
    Path((location, publisher, offer)): Path<(String, String, String)>,
) -> Records {
    let coordinates = ImageCoordinates {
        publisher,
        offer,
        ..ImageCoordinates::at(&location)
    };
    Ok(Json(catalog::list_level(&ctx, &coordinates).await?))
}

pub async fn list_versions(
    ctx: RequestContext,
    Path((location, publisher, offer, sku)): Path<(String, String, String, String)>,
) -> Records {
    let coordinates = ImageCoordinates {
        location,
        publisher,
        offer,
        sku,
        version: String::new(),
    };
    Ok(Json(catalog::list_level(&ctx, &coordinates).await?))
}

pub async fn show_version(
    ctx: RequestContext,
    Path(coordinates): Path<(String, String, String, String, String)>,
) -> Result<Json<GenericRecord>, GatewayError> {
    let (location, publisher, offer, sku, version) = coordinates;
    let coordinates = ImageCoordinates {
        location,
        publisher,
        offer,
        sku,
        version,
    };
    Ok(Json(catalog::get_version(&ctx, &coordinates).await?))
}
