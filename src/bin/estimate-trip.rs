use std::error::Error;

use dotenv::dotenv;
use log::{debug, info, initialize_logger};
use sqlx::postgres::PgPoolOptions;
use structopt::StructOpt;

use heritage::config::get_variable;
use heritage::db::PgDb;
use heritage::estimate::{estimate_trip, TripEstimateRequest};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "estimate-trip",
    about = "Estimate the cost and duration of a trip against the configured database"
)]
struct Opt {
    /// The site IDs to visit, in order
    #[structopt(required = true)]
    site_ids: Vec<String>,

    /// The traveller's budget in rupees
    #[structopt(long, default_value = "0")]
    budget: i64,

    /// How many days the trip lasts
    #[structopt(long, default_value = "1")]
    days: i64,

    /// The ID of a guide to hire for every day
    #[structopt(long)]
    guide: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();

    let opt = Opt::from_args();

    let logger = initialize_logger();

    let connection_string = get_variable("HERITAGE_DB_CONNECTION_STRING")?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&connection_string)
        .await?;
    let db = PgDb::new(pool);

    let request = TripEstimateRequest {
        site_ids: opt.site_ids,
        budget: opt.budget,
        days: opt.days,
        guide_id: opt.guide,
    };

    info!(logger, "Estimating trip..."; "sites" => request.site_ids.len());

    let estimate = estimate_trip(&db, &request).await?;
    debug!(logger, "Estimated trip"; "total_cost" => estimate.total_cost);

    println!("{}", serde_json::to_string_pretty(&estimate)?);

    db.close().await;

    Ok(())
}
