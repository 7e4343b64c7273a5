//! Job record definitions
use serde::Serialize;
use std::fmt;

/// One job listing
///
/// Built fresh from a markup fragment on every scrape and never mutated
/// afterwards. Optional display fields are empty strings when the listing
/// did not provide them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    /// Site-assigned listing id; empty means the record is unusable
    pub id: String,

    /// Name of the posting client
    pub client_name: String,

    pub title: String,

    /// Absolute link to the listing
    pub url: String,

    /// Budget as displayed by the site
    pub budget: String,

    pub client_country: String,

    pub client_payment_verified: bool,
}

impl JobRecord {
    /// Returns true if the record carries an id and can be tracked
    pub fn is_usable(&self) -> bool {
        !self.id.trim().is_empty()
    }

    /// Composite identity key `id|client_name`
    ///
    /// The client name guards against the site reusing an id for a
    /// different client's posting.
    pub fn key(&self) -> String {
        composite_key(&self.id, &self.client_name)
    }
}

impl fmt::Display for JobRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let client = if self.client_name.is_empty() {
            "N/A"
        } else {
            &self.client_name
        };
        write!(f, "{} (client: {})", self.id, client)
    }
}

/// Builds the composite identity key from its parts
pub fn composite_key(id: &str, client_name: &str) -> String {
    format!("{}|{}", id, client_name)
}
