use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use log::info;
use warp::http::StatusCode;
use warp::reject;
use warp::reply::{json, Reply};
use warp::Filter;

use super::response::SuccessResponse;
use crate::environment::Environment;

pub fn make_healthz_route(
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone {
    warp::path("healthz").and(warp::path::end()).and(warp::get()).map(|| {
        json(&SuccessResponse::Healthz {
            revision: info::REVISION,
            timestamp: info::BUILD_TIMESTAMP,
            version: info::VERSION,
        })
    })
}

pub type TerminationFuture<'a> = BoxFuture<'a, ()>;

pub type TerminationFunctionWrapper<'a> =
    Arc<dyn Fn() -> TerminationFuture<'a> + Send + Sync + 'a>;

pub fn make_termination_route<'a>(
    environment: Environment,
    terminate: TerminationFunctionWrapper<'a>,
) -> impl warp::Filter<Extract = (impl Reply,), Error = reject::Rejection> + Clone + 'a {
    let handler = move || -> BoxFuture<'a, Result<StatusCode, std::convert::Infallible>> {
        let terminate = terminate.clone();
        let logger = environment.logger.clone();

        async move {
            info!(logger, "Termination requested");
            terminate().await;
            Ok(StatusCode::NO_CONTENT)
        }
        .boxed()
    };

    warp::path("terminate")
        .and(warp::path::end())
        .and(warp::post())
        .and_then(handler)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use futures::future::FutureExt;

    use super::{make_healthz_route, make_termination_route};
    use crate::config::Config;
    use crate::db::memory::MemoryDb;
    use crate::environment::Environment;

    #[tokio::test]
    async fn healthz_reports_version() {
        let response = warp::test::request()
            .path("/healthz")
            .reply(&make_healthz_route())
            .await;

        assert_eq!(response.status(), 200);

        let body: serde_json::Value =
            serde_json::from_slice(response.body()).expect("parse healthz body");
        assert_eq!(body["version"], info::VERSION);
    }

    #[tokio::test]
    async fn terminate_calls_back() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let terminate = Arc::new(move || {
            flag.store(true, Ordering::SeqCst);
            async {}.boxed()
        });

        let environment = Environment::new(
            Arc::new(log::discard()),
            Arc::new(MemoryDb::new()),
            Config::default(),
        );

        let response = warp::test::request()
            .method("POST")
            .path("/terminate")
            .reply(&make_termination_route(environment, terminate))
            .await;

        assert_eq!(response.status(), 204);
        assert!(called.load(Ordering::SeqCst));
    }
}
