//! In-memory fetcher for unit tests

use crate::scrape::{FetchedPage, PageFetcher};
use crate::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use url::Url;

/// Listing URL used by the fake for `page`
pub fn page_url(page: u32) -> String {
    format!("https://example.com/jobs?page={}", page)
}

/// Markup for one listing matching the default selectors
pub fn listing(id: &str, client: &str) -> String {
    format!(
        r#"<div class="project-item" data-project-id="{id}">
            <h2 class="project-title"><a href="/job/{id}">Job {id}</a></h2>
            <span class="author-info"><a>{client}</a></span>
        </div>"#,
    )
}

/// A page holding listings for the given `(id, client)` pairs
pub fn page(items: &[(&str, &str)], total_pages: Option<u32>) -> FetchedPage {
    FetchedPage {
        item_fragments: items.iter().map(|(id, c)| listing(id, c)).collect(),
        total_pages,
    }
}

/// Page number carried by a listing URL's `page` parameter (absent = 1)
fn page_number(url: &str) -> u32 {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse().ok())
        })
        .unwrap_or(1)
}

/// Serves canned pages by page number and records every requested URL
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<u32, Result<FetchedPage, FetchError>>,
    requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, number: u32, page: FetchedPage) -> Self {
        self.pages.insert(number, Ok(page));
        self
    }

    pub fn with_failure(mut self, number: u32, error: FetchError) -> Self {
        self.pages.insert(number, Err(error));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.pages.get(&page_number(url)).cloned().unwrap_or_else(|| {
            Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        })
    }
}
