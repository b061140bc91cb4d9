use std::time::{Duration, Instant};

use log::debug;
use warp::{
    reject,
    reply::{json, with_header, Reply},
};

use crate::environment::Environment;
use crate::errors::BackendError;
use crate::estimate::{estimate_trip, TripEstimateRequest};
use crate::feedback::NewFeedback;
use crate::routes::{
    query::SitesQuery,
    rejection::{Context, Rejection},
    response::SuccessResponse,
};
use crate::trip::NewTrip;

const SERVER_TIMING_HEADER: &str = "server-timing";
const ROOT_MESSAGE: &str = "Hidden Heritage API";

type RouteResult = Result<Box<dyn Reply>, reject::Rejection>;

macro_rules! timed {
    ($($body:tt)+) => {{
        let start = Instant::now();

        // TODO when `try` blocks are stabilized, we can wrap the body
        // and return the headers even on errors
        let result = { $($body)+ };

        Ok(Box::new(with_header(
            result,
            SERVER_TIMING_HEADER,
            format_server_timing(start.elapsed()),
        )) as Box<dyn Reply>)
    }};
}

pub async fn root(_environment: Environment) -> RouteResult {
    timed! {
        json(&SuccessResponse::Root { message: ROOT_MESSAGE })
    }
}

pub async fn regions(environment: Environment) -> RouteResult {
    timed! {
        let regions = environment
            .db
            .retrieve_regions()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::regions(), e))?;

        json(&regions)
    }
}

pub async fn region(environment: Environment, slug: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::region(slug.clone()), e);

        debug!(environment.logger, "Retrieving region..."; "slug" => &slug);
        let region = environment
            .db
            .retrieve_region(&slug)
            .await
            .map_err(error_handler)?
            .ok_or_else(|| error_handler(BackendError::RegionNotFound { slug: slug.clone() }))?;

        json(&region)
    }
}

pub async fn sites(environment: Environment, query: SitesQuery) -> RouteResult {
    timed! {
        let SitesQuery { region_id } = query;

        let sites = environment
            .db
            .retrieve_sites(region_id.as_deref())
            .await
            .map_err(|e: BackendError| Rejection::new(Context::sites(region_id.clone()), e))?;

        json(&sites)
    }
}

pub async fn site(environment: Environment, slug: String) -> RouteResult {
    timed! {
        let error_handler = |e: BackendError| Rejection::new(Context::site(slug.clone()), e);

        debug!(environment.logger, "Retrieving site..."; "slug" => &slug);
        let site = environment
            .db
            .retrieve_site(&slug)
            .await
            .map_err(error_handler)?
            .ok_or_else(|| error_handler(BackendError::SiteNotFound { slug: slug.clone() }))?;

        json(&site)
    }
}

pub async fn guides(environment: Environment) -> RouteResult {
    timed! {
        let guides = environment
            .db
            .retrieve_guides()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::guides(), e))?;

        json(&guides)
    }
}

pub async fn create_feedback(environment: Environment, feedback: NewFeedback) -> RouteResult {
    timed! {
        let feedback = environment
            .db
            .insert_feedback(feedback)
            .await
            .map_err(|e: BackendError| Rejection::new(Context::feedback(), e))?;

        debug!(environment.logger, "Saved feedback"; "id" => &feedback.id);

        json(&feedback)
    }
}

pub async fn feedbacks(environment: Environment) -> RouteResult {
    timed! {
        let feedbacks = environment
            .db
            .retrieve_feedbacks()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::feedbacks(), e))?;

        json(&feedbacks)
    }
}

pub async fn estimate(environment: Environment, request: TripEstimateRequest) -> RouteResult {
    timed! {
        debug!(
            environment.logger, "Estimating trip...";
            "sites" => request.site_ids.len(),
            "days" => request.days,
            "guide" => ?request.guide_id
        );

        let estimate = estimate_trip(environment.db.as_ref(), &request)
            .await
            .map_err(|e: BackendError| {
                Rejection::new(Context::estimate(request.site_ids.clone()), e)
            })?;

        json(&estimate)
    }
}

pub async fn create_trip(environment: Environment, trip: NewTrip) -> RouteResult {
    timed! {
        let name = trip.name.clone();

        let trip = environment
            .db
            .insert_trip(trip)
            .await
            .map_err(|e: BackendError| Rejection::new(Context::trip(name), e))?;

        debug!(environment.logger, "Saved trip"; "id" => &trip.id);

        json(&trip)
    }
}

pub async fn preset_packages(environment: Environment) -> RouteResult {
    timed! {
        let packages = environment
            .db
            .retrieve_preset_packages()
            .await
            .map_err(|e: BackendError| Rejection::new(Context::preset_packages(), e))?;

        json(&packages)
    }
}

fn format_server_timing(elapsed: Duration) -> String {
    format!("handler;dur={}", elapsed.as_secs_f64() * 1000.0)
}
