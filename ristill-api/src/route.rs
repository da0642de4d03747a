//! Routes of the materials section.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::RecordId;

/// Path of the listing view.
pub const LISTING_PATH: &str = "/materials";

/// A navigable view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// The gallery of all materials.
    Listing,
    /// A single material, addressed by id.
    Detail(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("not a materials path: {0}")]
    UnknownPath(String),

    #[error("empty material id in path: {0}")]
    EmptyId(String),
}

impl Route {
    pub fn detail(id: impl Into<RecordId>) -> Self {
        Route::Detail(id.into())
    }

    /// The URL path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Listing => LISTING_PATH.to_string(),
            Route::Detail(id) => format!("{LISTING_PATH}/{id}"),
        }
    }

    /// Parse a URL path. A single trailing slash is accepted.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        let trimmed = path.strip_suffix('/').unwrap_or(path);
        if trimmed == LISTING_PATH {
            return Ok(Route::Listing);
        }

        let rest = trimmed
            .strip_prefix(LISTING_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| RouteError::UnknownPath(path.to_string()))?;

        if rest.is_empty() {
            return Err(RouteError::EmptyId(path.to_string()));
        }
        if rest.contains('/') {
            return Err(RouteError::UnknownPath(path.to_string()));
        }
        Ok(Route::Detail(RecordId::new(rest)))
    }

    pub fn is_listing(&self) -> bool {
        matches!(self, Route::Listing)
    }
}
