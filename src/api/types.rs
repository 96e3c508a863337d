use serde::{Deserialize, Serialize};

use crate::group::GroupStats;

#[derive(Debug, Deserialize)]
pub struct ApiParams {
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub groups: Vec<GroupStats>,
}
