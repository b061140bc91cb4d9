use std::sync::Arc;

use log::{error, info, Logger};
use serde::Serialize;
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, with_status, Json, WithStatus};
use warp::Filter;

use crate::config::CorsOrigins;
use crate::environment::Environment;
use crate::errors::BackendError;

pub mod admin;
mod handlers;
mod query;
mod rejection;
mod response;

pub use internal::*;

/// The maximum JSON body size to accept.
const MAX_CONTENT_LENGTH: u64 = 64 * 1024;

const CORS_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

const CORS_HEADERS: &[&str] = &[
    "accept",
    "authorization",
    "content-type",
    "origin",
    "x-requested-with",
];

#[derive(Serialize)]
struct BadRequest {
    message: String,
}

pub async fn format_rejection(
    logger: Arc<Logger>,
    rej: reject::Rejection,
) -> Result<WithStatus<Json>, reject::Rejection> {
    if let Some(r) = rej.find::<rejection::Rejection>() {
        let e = &r.error;
        error!(logger, "Backend error"; "context" => ?r.context, "error" => ?r.error, "status" => %status_code_for(e), "message" => %r.error);
        let flattened = r.flatten();

        return Ok(with_status(json(&flattened), status_code_for(e)));
    }

    if let Some(e) = rej.find::<warp::filters::body::BodyDeserializeError>() {
        error!(logger, "Malformed request body"; "error" => %e);
        let body = BadRequest {
            message: e.to_string(),
        };

        return Ok(with_status(json(&body), StatusCode::BAD_REQUEST));
    }

    Err(rej)
}

fn status_code_for(e: &BackendError) -> StatusCode {
    if e.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Every API route under the configured prefix, with error recovery,
/// CORS and request logging applied.
pub fn make_api(
    environment: Environment,
) -> impl Filter<Extract = (impl warp::Reply,), Error = reject::Rejection> + Clone {
    let logger = environment.logger.clone();
    let access_logger = environment.logger.clone();
    let cors = make_cors(&environment.config.cors_origins);

    make_root_route(environment.clone())
        .or(make_regions_route(environment.clone()))
        .or(make_region_route(environment.clone()))
        .or(make_sites_route(environment.clone()))
        .or(make_site_route(environment.clone()))
        .or(make_guides_route(environment.clone()))
        .or(make_feedback_route(environment.clone()))
        .or(make_feedbacks_route(environment.clone()))
        .or(make_estimate_route(environment.clone()))
        .or(make_trips_route(environment.clone()))
        .or(make_preset_packages_route(environment))
        .recover(move |r| format_rejection(logger.clone(), r))
        .with(cors)
        .with(warp::log::custom(move |request: warp::log::Info| {
            info!(
                access_logger, "Handled request";
                "method" => %request.method(),
                "path" => request.path(),
                "status" => request.status().as_u16(),
                "elapsed_ms" => request.elapsed().as_secs_f64() * 1000.0
            );
        }))
}

fn make_cors(origins: &CorsOrigins) -> warp::cors::Builder {
    let cors = warp::cors()
        .allow_methods(CORS_METHODS.iter().copied())
        .allow_headers(CORS_HEADERS.iter().copied())
        .allow_credentials(true);

    match origins {
        CorsOrigins::Any => cors.allow_any_origin(),
        CorsOrigins::List(origins) => cors.allow_origins(origins.iter().map(String::as_str)),
    }
}

mod internal {
    use warp::filters::body::{content_length_limit, json};
    use warp::filters::BoxedFilter;
    use warp::path::end;
    use warp::Filter;
    use warp::Reply;
    use warp::{get as g, path as p, path::param as par, post, query};

    use super::{handlers, query as q, MAX_CONTENT_LENGTH};
    use crate::environment::Environment;

    type Route = BoxedFilter<(Box<dyn Reply>,)>;

    macro_rules! route_filter {
    ($route_variable:ident; $first:expr) => (let $route_variable = $route_variable.and($first););
    ($route_variable:ident; $first:expr, $($rest:expr),+) => (
        let $route_variable = $route_variable.and($first);
        route_filter!($route_variable; $($rest),+);
    )
}

    macro_rules! route {
    ($name:ident => $handler:ident, $route_variable:ident; $($filters:expr),+) => (
        pub fn $name(environment: Environment) -> Route {
            let prefix = prefix(environment.config.api_prefix());

            let $route_variable = warp::any()
                .map(move || environment.clone())
                .and(prefix);

            route_filter!($route_variable; $($filters),+);

            $route_variable.and_then(handlers::$handler)
                .boxed()
        }
    );
}

    /// Matches each `/`-separated segment of `api_prefix`, or nothing
    /// if it is empty.
    fn prefix(api_prefix: &str) -> BoxedFilter<()> {
        api_prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(warp::any().boxed(), |filter, segment| {
                filter.and(p(segment.to_owned())).boxed()
            })
    }

    route!(make_root_route => root, rt; end(), g());
    route!(make_regions_route => regions, rt; p("regions"), end(), g());
    route!(make_region_route => region, rt; p("regions"), par::<String>(), end(), g());
    route!(make_sites_route => sites, rt; p("sites"), end(), g(), query::<q::SitesQuery>());
    route!(make_site_route => site, rt; p("sites"), par::<String>(), end(), g());
    route!(make_guides_route => guides, rt; p("guides"), end(), g());
    route!(make_feedback_route => create_feedback, rt; p("feedback"), end(), post(), content_length_limit(MAX_CONTENT_LENGTH), json());
    route!(make_feedbacks_route => feedbacks, rt; p("feedbacks"), end(), g());
    route!(make_estimate_route => estimate, rt; p!("trip" / "estimate"), end(), post(), content_length_limit(MAX_CONTENT_LENGTH), json());
    route!(make_trips_route => create_trip, rt; p("trips"), end(), post(), content_length_limit(MAX_CONTENT_LENGTH), json());
    route!(make_preset_packages_route => preset_packages, rt; p("preset-packages"), end(), g());
}
