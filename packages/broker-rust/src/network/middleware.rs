//! HTTP middleware stack for the broker.
//!
//! Builds the Tower middleware pipeline applied to all inbound
//! requests. Ordering follows the outer-to-inner convention: the
//! first layer listed processes the request first on the way in and
//! the response last on the way out.

use axum::http::header::HeaderName;
use axum::http::{Method, StatusCode};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::config::NetworkConfig;

/// The composed Tower layer type produced by [`build_http_layers`].
///
/// Each layer wraps the next in a `Stack`, from outermost (first
/// applied) to innermost (last applied).
type HttpLayers = tower::layer::util::Stack<
    PropagateRequestIdLayer,
    tower::layer::util::Stack<
        TimeoutLayer,
        tower::layer::util::Stack<
            CorsLayer,
            tower::layer::util::Stack<
                TraceLayer<
                    tower_http::classify::SharedClassifier<
                        tower_http::classify::ServerErrorsAsFailures,
                    >,
                >,
                tower::layer::util::Stack<
                    SetRequestIdLayer<MakeRequestUuid>,
                    tower::layer::util::Identity,
                >,
            >,
        >,
    >,
>;

/// Builds the HTTP-level Tower middleware stack.
///
/// Outermost to innermost:
/// 1. `SetRequestId` -- assigns a UUID v4 `X-Request-Id` per request
/// 2. `Tracing` -- structured request/response spans
/// 3. `CORS` -- based on the configured origins
/// 4. `Timeout` -- bounds request processing duration
/// 5. `PropagateRequestId` -- copies `X-Request-Id` onto the response
#[must_use]
pub fn build_http_layers(config: &NetworkConfig) -> HttpLayers {
    let x_request_id = HeaderName::from_static("x-request-id");

    let cors = build_cors_layer(&config.cors_origins);

    ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .into_inner()
}

/// Builds the CORS layer from the configured origin allowlist.
///
/// A wildcard `"*"` allows any origin; otherwise each origin string
/// is parsed into an explicit allowlist.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
