//! Type-safe listing identifier.
//!
//! [`ListingId`] is a newtype wrapper around the string key the activity log
//! stores in its `internship_id` column, so that listing identifiers cannot be
//! confused with other strings (event names, schema names, ...).

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Stable identifier of an internship listing.
///
/// Used as the key of [`super::StatsMap`] and as the WebSocket subscription
/// target. Ordering is plain string ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    /// Wraps an identifier as read from the store, without validation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a client-supplied identifier, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if the identifier is empty
    /// after trimming.
    pub fn parse(raw: &str) -> Result<Self, GatewayError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "listing id must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ListingId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ListingId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Borrow<str> for ListingId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
