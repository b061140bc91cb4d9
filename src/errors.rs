use thiserror::Error;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents an SQL error.
    #[error("SQLx error")]
    Sqlx {
        #[from]
        source: sqlx::Error,
    },

    /// None of the site IDs in an estimate request matched a stored site.
    #[error("Sites not found")]
    SitesNotFound,

    /// No region has the requested slug.
    #[error("Region not found")]
    RegionNotFound { slug: String },

    /// No site has the requested slug.
    #[error("Site not found")]
    SiteNotFound { slug: String },

    /// A region or site slug is already taken.
    #[error("Slug {slug:?} is already in use")]
    DuplicateSlug { slug: String },

    /// A required environment variable is not set.
    #[error("must define {name} environment variable")]
    MissingVariable { name: String },

    /// An environment variable could not be parsed.
    #[error("could not parse {name}={value:?}")]
    InvalidVariable { name: String, value: String },
}

impl BackendError {
    /// Whether this error means the thing asked for does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::SitesNotFound
                | BackendError::RegionNotFound { .. }
                | BackendError::SiteNotFound { .. }
        )
    }
}
