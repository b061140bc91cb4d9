use std::sync::Arc;

use lazy_static::lazy_static;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use warp::http::{Response, StatusCode};
use warp::hyper::body::Bytes;
use warp::{Filter, Reply};

use heritage::catalog::{Guide, PresetPackage, Region, Site};
use heritage::config::{Config, CorsOrigins};
use heritage::db::memory::MemoryDb;
use heritage::environment::Environment;
use heritage::estimate::TripEstimate;
use heritage::feedback::Feedback;
use heritage::routes;
use heritage::seed::seed_if_empty;
use heritage::trip::Trip;
use log::Logger;

lazy_static! {
    static ref LOGGER: Arc<Logger> = Arc::new(log::discard());
}

const PREFIX: &str = "api";

fn url_to(path: &str) -> String {
    format!("/{}/{}", PREFIX, path)
}

async fn seeded_db() -> Arc<MemoryDb> {
    let db = Arc::new(MemoryDb::new());
    seed_if_empty(&LOGGER, db.as_ref()).await.expect("seed");

    db
}

fn api(
    db: Arc<MemoryDb>,
    config: Config,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone + 'static {
    routes::make_api(Environment::new(LOGGER.clone(), db, config))
}

fn parse<T: DeserializeOwned>(response: &Response<Bytes>) -> T {
    serde_json::from_slice(response.body()).unwrap_or_else(|e| {
        panic!(
            "parse {:?} as JSON: {}",
            String::from_utf8_lossy(response.body()),
            e
        )
    })
}

async fn get(
    filter: &(impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone + 'static),
    path: &str,
) -> Response<Bytes> {
    warp::test::request().path(path).reply(filter).await
}

async fn post(
    filter: &(impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone + 'static),
    path: &str,
    body: &Value,
) -> Response<Bytes> {
    warp::test::request()
        .method("POST")
        .path(path)
        .json(body)
        .reply(filter)
        .await
}

async fn site_id(
    filter: &(impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone + 'static),
    slug: &str,
) -> String {
    let response = get(filter, &url_to(&format!("sites/{}", slug))).await;
    assert_eq!(response.status(), StatusCode::OK);

    parse::<Site>(&response).id
}

#[tokio::test]
async fn root_says_hello() {
    let api = api(seeded_db().await, Config::default());

    let response = get(&api, "/api/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("server-timing"));
    assert_eq!(
        parse::<Value>(&response),
        json!({ "message": "Hidden Heritage API" })
    );
}

#[tokio::test]
async fn catalog_is_listed() {
    let api = api(seeded_db().await, Config::default());

    let regions: Vec<Region> = parse(&get(&api, &url_to("regions")).await);
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0].slug, "chambal");

    let sites: Vec<Site> = parse(&get(&api, &url_to("sites")).await);
    assert_eq!(sites.len(), 6);

    let guides: Vec<Guide> = parse(&get(&api, &url_to("guides")).await);
    let fees = guides.iter().map(|g| g.fee_per_day).collect::<Vec<_>>();
    assert_eq!(fees, vec![2000, 1800, 2500]);

    let packages: Vec<PresetPackage> = parse(&get(&api, &url_to("preset-packages")).await);
    let costs = packages.iter().map(|p| p.estimated_cost).collect::<Vec<_>>();
    assert_eq!(costs, vec![4000, 8500, 18000]);
}

#[tokio::test]
async fn sites_filter_by_region() {
    let api = api(seeded_db().await, Config::default());

    let region: Region = parse(&get(&api, &url_to("regions/chambal")).await);

    let path = format!("{}?region_id={}", url_to("sites"), region.id);
    let sites: Vec<Site> = parse(&get(&api, &path).await);
    assert_eq!(sites.len(), 6);

    let path = format!("{}?region_id=elsewhere", url_to("sites"));
    let sites: Vec<Site> = parse(&get(&api, &path).await);
    assert!(sites.is_empty());
}

#[tokio::test]
async fn site_detail_uses_wire_names() {
    let api = api(seeded_db().await, Config::default());

    let response = get(&api, &url_to("sites/bateshwar-temples")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let site: Value = parse(&response);
    assert_eq!(site["type"], "Temple");
    assert_eq!(site["entry_fee"], 50);
    assert_eq!(site["avg_visit_time_mins"], 180);
}

#[tokio::test]
async fn unknown_slugs_are_not_found() {
    let api = api(seeded_db().await, Config::default());

    let response = get(&api, &url_to("regions/nowhere")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        parse::<Value>(&response),
        json!({ "slug": "nowhere", "message": "Region not found" })
    );

    let response = get(&api, &url_to("sites/nowhere")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        parse::<Value>(&response),
        json!({ "slug": "nowhere", "message": "Site not found" })
    );
}

#[tokio::test]
async fn feedback_is_stored_and_listed() {
    let api = api(seeded_db().await, Config::default());

    let response = post(
        &api,
        &url_to("feedback"),
        &json!({
            "name": "Meera",
            "email": "meera@example.com",
            "rating": 4,
            "message": "The ravines at dusk were unforgettable",
            "unexpected": true
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored: Feedback = parse(&response);
    assert!(!stored.id.is_empty());
    assert_eq!(stored.rating, Some(4));

    let response = post(
        &api,
        &url_to("feedback"),
        &json!({
            "name": "Arun",
            "email": "arun@example.com",
            "message": "No rating from me"
        }),
    )
    .await;
    let unrated: Feedback = parse(&response);
    assert_eq!(unrated.rating, None);

    let all: Vec<Feedback> = parse(&get(&api, &url_to("feedbacks")).await);
    assert_eq!(all, vec![stored, unrated]);
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
    let api = api(seeded_db().await, Config::default());

    let response = post(&api, &url_to("feedback"), &json!({ "name": "Nobody" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = parse(&response);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn estimate_prices_sites_in_request_order() {
    let api = api(seeded_db().await, Config::default());

    let temples = site_id(&api, "bateshwar-temples").await;
    let ravines = site_id(&api, "chambal-ravines").await;

    let response = post(
        &api,
        &url_to("trip/estimate"),
        &json!({ "site_ids": [temples, ravines], "budget": 1000, "days": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let estimate: TripEstimate = parse(&response);
    assert_eq!(estimate.total_cost, 1350);
    assert_eq!(estimate.total_time_mins, 420);
    assert_eq!(estimate.guide_cost, 0);
    assert_eq!(estimate.cost_breakdown[0].site_name, "Bateshwar Temples");
    assert_eq!(estimate.cost_breakdown[1].site_name, "Chambal Ravines");
    assert_eq!(
        estimate.route_coordinates,
        vec![[26.3833, 78.4167], [26.5, 78.5]]
    );
    assert_eq!(
        estimate.suggestions,
        vec!["Your budget is ₹1000, but estimated cost is ₹1350. Consider reducing days or sites."]
    );
}

#[tokio::test]
async fn estimate_charges_the_guide_per_day() {
    let api = api(seeded_db().await, Config::default());

    let guides: Vec<Guide> = parse(&get(&api, &url_to("guides")).await);
    let vikram = guides
        .iter()
        .find(|g| g.name == "Vikram Singh")
        .expect("Vikram is seeded");
    let fort = site_id(&api, "garhi-padavali").await;

    let response = post(
        &api,
        &url_to("trip/estimate"),
        &json!({ "site_ids": [fort], "budget": 100000, "days": 2, "guide_id": vikram.id }),
    )
    .await;

    let estimate: TripEstimate = parse(&response);
    assert_eq!(estimate.guide_cost, 5000);
    assert_eq!(estimate.total_cost, 680 + 5000);
    assert_eq!(
        estimate.suggestions,
        vec!["Consider adding Bateshwar Temples nearby for a complete heritage experience!"]
    );
}

#[tokio::test]
async fn estimate_without_known_sites_is_not_found() {
    let api = api(seeded_db().await, Config::default());

    let response = post(
        &api,
        &url_to("trip/estimate"),
        &json!({ "site_ids": ["no-such-site"], "budget": 1000, "days": 1 }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        parse::<Value>(&response),
        json!({ "site_ids": ["no-such-site"], "message": "Sites not found" })
    );
}

#[tokio::test]
async fn trips_are_stored_verbatim() {
    let db = seeded_db().await;
    let api = api(db.clone(), Config::default());

    let temples = site_id(&api, "bateshwar-temples").await;

    let response = post(
        &api,
        &url_to("trips"),
        &json!({
            "name": "Weekend in Chambal",
            "site_ids": [temples],
            "total_cost": 1,
            "total_time_mins": 2
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let trip: Trip = parse(&response);
    assert!(!trip.id.is_empty());
    assert_eq!(trip.total_cost, 1);
    assert_eq!(trip.total_time_mins, 2);
    assert_eq!(trip.guide_id, None);

    let stored = db.trips();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, trip.id);
    assert_eq!(stored[0].site_ids, vec![temples]);
}

#[tokio::test]
async fn prefix_is_configurable() {
    let api = api(
        seeded_db().await,
        Config::new("/v1/heritage/", CorsOrigins::Any),
    );

    let response = get(&api, "/v1/heritage/regions").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&api, "/api/regions").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_allows_configured_origins() {
    let config = Config::new(
        PREFIX,
        CorsOrigins::List(vec!["https://heritage.example".to_owned()]),
    );
    let api = api(seeded_db().await, config);

    let response = warp::test::request()
        .path(&url_to("regions"))
        .header("origin", "https://heritage.example")
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://heritage.example"
    );

    let response = warp::test::request()
        .path(&url_to("regions"))
        .header("origin", "https://elsewhere.example")
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn cors_preflight_allows_common_request_headers() {
    let api = api(seeded_db().await, Config::new(PREFIX, CorsOrigins::Any));

    let response = warp::test::request()
        .method("OPTIONS")
        .path(&url_to("trip/estimate"))
        .header("origin", "https://heritage.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "authorization, content-type")
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let allowed = response.headers()["access-control-allow-headers"]
        .to_str()
        .expect("header value");
    assert!(allowed.contains("authorization"), "{}", allowed);
    assert!(allowed.contains("content-type"), "{}", allowed);

    let response = warp::test::request()
        .method("OPTIONS")
        .path(&url_to("trip/estimate"))
        .header("origin", "https://heritage.example")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "x-not-a-real-header")
        .reply(&api)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
