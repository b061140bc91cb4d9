use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SitesQuery {
    pub region_id: Option<String>,
}
