pub mod catalog;
pub mod config;
pub mod db;
pub mod environment;
pub mod errors;
pub mod estimate;
pub mod feedback;
pub mod routes;
pub mod seed;
pub mod trip;
