//! HTTP surface
//!
//! Every resource route sits behind the cookie authentication layer and, when
//! configured, under the URL prefix. `/health-check` stays outside both.

pub mod handlers;
pub mod middleware;

use crate::config::Config;
use crate::resource::kinds::{AvailabilitySet, IpAddress, NetworkInterface, StorageAccount};
use axum::http::header::HeaderName;
use axum::routing::{get, post};
use axum::Router;
use handlers::GroupScoped;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Shared, read-only state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }
}

/// Routes for one group-scoped kind under `collection`
fn group_scoped<R: GroupScoped>(collection: &str) -> Router<AppState> {
    Router::new()
        .route(&format!("/{}", collection), get(handlers::list_all::<R>))
        .route(
            &format!("/resource_groups/{{group}}/{}", collection),
            get(handlers::list_in_group::<R>).post(handlers::create::<R>),
        )
        .route(
            &format!("/resource_groups/{{group}}/{}/{{id}}", collection),
            get(handlers::show::<R>).delete(handlers::destroy::<R>),
        )
}

/// All resource routes, without authentication or prefix
///
/// Handlers expect a `RequestContext` in the request extensions; mounted
/// without [`middleware::azure_client_initializer`] they answer 500.
pub fn resource_routes() -> Router<AppState> {
    let catalog = Router::new()
        .route("/locations", get(handlers::list_locations))
        .route(
            "/locations/{location}/instance_types",
            get(handlers::list_instance_types),
        )
        .route("/locations/{location}/images", get(handlers::list_images))
        .route(
            "/locations/{location}/publishers",
            get(handlers::list_publishers),
        )
        .route(
            "/locations/{location}/publishers/{publisher}/offers",
            get(handlers::list_offers),
        )
        .route(
            "/locations/{location}/publishers/{publisher}/offers/{offer}/skus",
            get(handlers::list_skus),
        )
        .route(
            "/locations/{location}/publishers/{publisher}/offers/{offer}/skus/{sku}/versions",
            get(handlers::list_versions),
        )
        .route(
            "/locations/{location}/publishers/{publisher}/offers/{offer}/skus/{sku}/versions/{version}",
            get(handlers::show_version),
        );

    Router::new()
        .route(
            "/resource_groups",
            get(handlers::list_resource_groups).post(handlers::create_resource_group),
        )
        .route(
            "/resource_groups/{group}",
            get(handlers::show_resource_group).delete(handlers::delete_resource_group),
        )
        .merge(group_scoped::<AvailabilitySet>("availability_sets"))
        .merge(group_scoped::<StorageAccount>("storage_accounts"))
        .merge(group_scoped::<NetworkInterface>("network_interfaces"))
        .merge(group_scoped::<IpAddress>("ip_addresses"))
        .route("/providers", get(handlers::list_providers))
        .route("/providers/{provider}", get(handlers::show_provider))
        .route(
            "/providers/{provider}/register",
            post(handlers::register_provider),
        )
        .route(
            "/locations/{location}/services/{service}/operations/{id}",
            get(handlers::poll_operation),
        )
        .merge(catalog)
}

/// Full application router
pub fn build_router(state: AppState) -> Router {
    let authenticated = resource_routes().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::azure_client_initializer,
    ));

    let prefix = state.config.prefix.clone();
    let routes = if prefix.is_empty() {
        authenticated
    } else {
        Router::new().nest(&prefix, authenticated)
    };

    let x_request_id = HeaderName::from_static(middleware::X_REQUEST_ID);

    // Outermost first: assign the id, trace under it, copy it to the response
    let layers = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(middleware::request_span))
        .layer(PropagateRequestIdLayer::new(x_request_id));

    routes
        .route("/health-check", get(handlers::health_check))
        .layer(layers)
        .with_state(state)
}
