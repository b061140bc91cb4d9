//! Build metadata shared by the server, the helpers and the admin
//! endpoints.

/// The package version the server was built from.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The VCS revision, if the build environment provided one.
pub const REVISION: Option<&str> = option_env!("HERITAGE_REVISION");

/// When the build ran, if the build environment provided it.
pub const BUILD_TIMESTAMP: Option<&str> = option_env!("HERITAGE_BUILD_TIMESTAMP");

/// Name reported in every log line and by `/healthz`.
pub const SERVICE_NAME: &str = "hidden-heritage";
