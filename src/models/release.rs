//! Release model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::Artifact;

/// Flavor assigned to releases created without an explicit one.
pub const DEFAULT_FLAVOR: &str = "default";

/// A named release of the product, grouping zero or more artifacts.
///
/// `name` is the semantic version string used for ordering and display;
/// `id` is the stable storage identifier and the two are distinct on purpose
/// (a release can be deleted and recreated under the same name with a new
/// `created_at`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Release {
    pub id: String,
    pub name: String,
    pub channel: Option<String>,
    pub flavor: String,
    pub created_at: DateTime<Utc>,

    /// Artifacts populated by the store for the current query; not a column.
    #[sqlx(skip)]
    pub artifacts: Vec<Artifact>,
}

impl Release {
    /// Conventional release id: `{name}_{flavor}`.
    pub fn derive_id(name: &str, flavor: &str) -> String {
        format!("{}_{}", name, flavor)
    }
}
