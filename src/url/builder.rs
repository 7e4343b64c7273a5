use crate::config::ScraperConfig;
use crate::{UrlError, UrlResult};
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Builds the listing URL for a page number
///
/// Deterministic per page: the same builder always yields the same URL for
/// the same page.
#[derive(Debug, Clone)]
pub struct JobsUrlBuilder {
    jobs_url: String,
    category: String,
    language: String,
    publication: String,
}

impl JobsUrlBuilder {
    /// Creates a builder from the listing settings
    pub fn from_config(config: &ScraperConfig) -> UrlResult<Self> {
        let base = Url::parse(&config.base_url).map_err(|e| UrlError::Parse(e.to_string()))?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(UrlError::InvalidScheme(base.scheme().to_string()));
        }

        let jobs_url = base
            .join(&config.jobs_path)
            .map_err(|e| UrlError::Parse(e.to_string()))?;

        Ok(Self {
            jobs_url: jobs_url.to_string(),
            category: config.category.clone(),
            language: config.language.clone(),
            publication: config.publication.clone(),
        })
    }

    /// Listing URL for `page` (1-based); page 1 carries no page parameter
    pub fn page_url(&self, page: u32) -> String {
        let mut url = format!(
            "{}?category={}&language={}&publication={}",
            self.jobs_url,
            encode(&self.category),
            encode(&self.language),
            encode(&self.publication),
        );
        if page > 1 {
            url.push_str(&format!("&page={}", page));
        }
        url
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
