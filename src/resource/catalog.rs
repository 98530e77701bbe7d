//! Read-only catalog listings
//!
//! Locations, VM sizes and the VM image catalog are forwarded as generic
//! records without a dedicated resource kind. The image listing walks the
//! catalog tree publisher by publisher, one upstream call at a time.

use super::kinds::COMPUTE_API_VERSION;
use super::normalizer::{fetch_many, fetch_one};
use super::{subscription_path, GenericRecord};
use crate::azure::RequestContext;
use crate::error::GatewayError;

const LOCATION_API_VERSION: &str = "2016-02-01";

/// Catalog coordinates of a VM image
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageCoordinates {
    pub location: String,
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

impl ImageCoordinates {
    pub fn at(location: &str) -> Self {
        Self {
            location: location.to_string(),
            ..Self::default()
        }
    }

    fn publisher(&self, publisher: &str) -> Self {
        Self {
            publisher: publisher.to_string(),
            ..self.clone()
        }
    }

    fn offer(&self, offer: &str) -> Self {
        Self {
            offer: offer.to_string(),
            ..self.clone()
        }
    }

    fn sku(&self, sku: &str) -> Self {
        Self {
            sku: sku.to_string(),
            ..self.clone()
        }
    }

    fn version(&self, version: &str) -> Self {
        Self {
            version: version.to_string(),
            ..self.clone()
        }
    }

    /// Path of the catalog node these coordinates address
    ///
    /// Coordinates are filled top-down; the first empty level ends the path
    /// and names the collection being listed.
    pub fn path(&self, subscription: &str) -> String {
        let mut rest = format!(
            "providers/Microsoft.Compute/locations/{}/publishers",
            urlencoding::encode(&self.location)
        );
        let levels = [
            (&self.publisher, "artifacttypes/vmimage/offers"),
            (&self.offer, "skus"),
            (&self.sku, "versions"),
        ];
        for (value, child) in levels {
            if value.is_empty() {
                return subscription_path(subscription, &rest, COMPUTE_API_VERSION);
            }
            rest = format!("{}/{}/{}", rest, urlencoding::encode(value), child);
        }
        if !self.version.is_empty() {
            rest = format!("{}/{}", rest, urlencoding::encode(&self.version));
        }
        subscription_path(subscription, &rest, COMPUTE_API_VERSION)
    }
}

fn record_name(record: &GenericRecord) -> Option<&str> {
    record.get("name").and_then(|v| v.as_str()).filter(|n| !n.is_empty())
}

/// Locations available to the subscription
pub async fn list_locations(ctx: &RequestContext) -> Result<Vec<GenericRecord>, GatewayError> {
    let path = subscription_path(ctx.subscription(), "locations", LOCATION_API_VERSION);
    fetch_many(&ctx.client, &path).await
}

/// VM sizes offered in a location
pub async fn list_instance_types(
    ctx: &RequestContext,
    location: &str,
) -> Result<Vec<GenericRecord>, GatewayError> {
    let path = subscription_path(
        ctx.subscription(),
        &format!(
            "providers/Microsoft.Compute/locations/{}/vmSizes",
            urlencoding::encode(location)
        ),
        COMPUTE_API_VERSION,
    );
    fetch_many(&ctx.client, &path).await
}

/// One level of the image catalog (publishers, offers, skus or versions)
pub async fn list_level(
    ctx: &RequestContext,
    coordinates: &ImageCoordinates,
) -> Result<Vec<GenericRecord>, GatewayError> {
    fetch_many(&ctx.client, &coordinates.path(ctx.subscription())).await
}

/// Detail of one image version
pub async fn get_version(
    ctx: &RequestContext,
    coordinates: &ImageCoordinates,
) -> Result<GenericRecord, GatewayError> {
    let body = fetch_one(
        &ctx.client,
        &coordinates.path(ctx.subscription()),
        &coordinates.version,
    )
    .await?;
    serde_json::from_slice(&body).map_err(|_| GatewayError::malformed(&body))
}

/// Every image version available in a location
///
/// A location whose publisher enumeration fails is treated as having no
/// publishers; regions with incomplete catalogs answer this way. Failures
/// deeper in the tree skip that branch only.
pub async fn list_images(
    ctx: &RequestContext,
    location: &str,
) -> Result<Vec<GenericRecord>, GatewayError> {
    let root = ImageCoordinates::at(location);
    let publishers = match list_level(ctx, &root).await {
        Ok(publishers) => publishers,
        Err(e) => {
            tracing::warn!("SKIP publishers for {} because of error: {}", location, e);
            Vec::new()
        }
    };

    let mut images = Vec::new();
    for publisher in publishers.iter().filter_map(record_name) {
        let at_publisher = root.publisher(publisher);
        for offer in skip_on_error(list_level(ctx, &at_publisher).await).iter().filter_map(record_name) {
            let at_offer = at_publisher.offer(offer);
            for sku in skip_on_error(list_level(ctx, &at_offer).await).iter().filter_map(record_name) {
                let at_sku = at_offer.sku(sku);
                for version in skip_on_error(list_level(ctx, &at_sku).await).iter().filter_map(record_name) {
                    // Some listed versions are rejected by the detail endpoint
                    match get_version(ctx, &at_sku.version(version)).await {
                        Ok(image) => images.push(image),
                        Err(e) => tracing::debug!("skipping image version {}: {}", version, e),
                    }
                }
            }
        }
    }

    Ok(images)
}

fn skip_on_error(result: Result<Vec<GenericRecord>, GatewayError>) -> Vec<GenericRecord> {
    result.unwrap_or_else(|e| {
        tracing::debug!("skipping catalog branch: {}", e);
        Vec::new()
    })
}
