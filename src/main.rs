use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::mpsc;
use warp::Filter;

use heritage::config::Settings;
use heritage::db::PgDb;
use heritage::environment::Environment;
use heritage::routes;
use heritage::seed::seed_if_empty;
use log::{info, initialize_logger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let settings = Settings::from_env()?;

    info!(logger, "Starting..."; "main_port" => settings.port, "admin_port" => settings.admin_port);
    let logger = Arc::new(logger);

    info!(logger, "Creating database pool..."; "max_connections" => settings.max_connections);
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.connection_string)
        .await?;
    let db = Arc::new(PgDb::new(pool));

    if settings.seed_on_startup {
        seed_if_empty(&logger, db.as_ref()).await?;
    }

    let environment = Environment::new(logger.clone(), db.clone(), settings.config.clone());

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate = Arc::new(move || {
        let termination_sender = termination_sender.clone();

        async move {
            // the receiver is gone once shutdown has started
            let _ = termination_sender.send(()).await;
        }
        .boxed()
    });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let (_, main_server) = warp::serve(routes::make_api(environment.clone()))
            .try_bind_with_graceful_shutdown(([0, 0, 0, 0], settings.port), async move {
                should_terminate.await;
            })?;

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let routes = routes::admin::make_healthz_route().or(
            routes::admin::make_termination_route(environment.clone(), terminate),
        );

        let (_, admin_server) = warp::serve(routes).try_bind_with_graceful_shutdown(
            ([0, 0, 0, 0], settings.admin_port),
            async move {
                should_terminate.await;
            },
        )?;

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Closing database pool...");
    db.close().await;

    info!(logger, "Exiting gracefully...");

    Ok(())
}
