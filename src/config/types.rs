use serde::Deserialize;

/// Main configuration structure for Workana-Watch
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Listing traversal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Site root, also the base for relative job links
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the job listing below the site root
    #[serde(rename = "jobs-path", default = "default_jobs_path")]
    pub jobs_path: String,

    /// Listing category filter
    #[serde(default = "default_category")]
    pub category: String,

    /// Listing language filter (comma separated for several languages)
    #[serde(default = "default_language")]
    pub language: String,

    /// Publication window filter (e.g. "1d")
    #[serde(default = "default_publication")]
    pub publication: String,

    /// Upper bound on pages per run; absent or 0 means no cap
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,

    /// Stop paginating at the first already-known job.
    ///
    /// Only correct while the listing is ordered newest-first.
    #[serde(rename = "stop-on-known-job", default = "default_true")]
    pub stop_on_known_job: bool,

    /// Fixed delay between page fetches (milliseconds)
    #[serde(rename = "delay-between-requests-ms", default = "default_delay_ms")]
    pub delay_between_requests_ms: u64,

    /// Lower bound of the random delay added to the fixed delay (milliseconds)
    #[serde(rename = "random-delay-min-ms", default)]
    pub random_delay_min_ms: u64,

    /// Upper bound of the random delay added to the fixed delay (milliseconds)
    #[serde(rename = "random-delay-max-ms", default = "default_random_max_ms")]
    pub random_delay_max_ms: u64,

    /// Timeout for loading a single listing page (seconds)
    #[serde(rename = "page-load-timeout-secs", default = "default_timeout_secs")]
    pub page_load_timeout_secs: u64,

    /// User agent sent with listing requests
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl ScraperConfig {
    /// Effective page cap, with 0 treated as "no cap"
    pub fn page_cap(&self) -> Option<u32> {
        self.max_pages.filter(|&n| n > 0)
    }
}

/// CSS selectors used to pick listings and fields out of a page
///
/// Field entries are ordered rule lists. A rule is `css`, `css@attribute`
/// or `css@attribute|slug`; the first rule yielding a non-empty value wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    #[serde(rename = "job-container")]
    pub job_container: String,

    #[serde(rename = "job-item")]
    pub job_item: String,

    pub pagination: String,

    #[serde(rename = "pagination-pages")]
    pub pagination_pages: String,

    pub id: Vec<String>,

    pub title: Vec<String>,

    pub url: Vec<String>,

    pub budget: Vec<String>,

    #[serde(rename = "client-name")]
    pub client_name: Vec<String>,

    #[serde(rename = "client-country")]
    pub client_country: Vec<String>,

    /// Presence of any match marks the client's payment method as verified
    #[serde(rename = "client-payment-verified")]
    pub client_payment_verified: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        fn rules(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            job_container: "#projects".to_string(),
            job_item: "#projects .project-item".to_string(),
            pagination: ".pagination".to_string(),
            pagination_pages: "li a, li span".to_string(),
            id: rules(&[
                "[data-project-id]@data-project-id",
                ".project-title a@href|slug",
                "a[href*='/job/']@href|slug",
            ]),
            title: rules(&[".project-title a", ".project-title", ".project-title a@title"]),
            url: rules(&[".project-title a@href", "a[href*='/job/']@href"]),
            budget: rules(&[".budget .values", ".budget"]),
            client_name: rules(&[".author-info a", ".project-author a", ".author-name"]),
            client_country: rules(&[".country-name", ".country .name"]),
            client_payment_verified: rules(&[
                ".payment-verified",
                ".icon-payment-verified",
                ".payment .verified",
            ]),
        }
    }
}

/// Job store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Retention limit: only the newest jobs up to this count are kept
    #[serde(rename = "max-jobs", default = "default_max_jobs")]
    pub max_jobs: u32,
}

/// Chat notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Slack incoming webhook; notifications are skipped when unset
    #[serde(rename = "slack-webhook-url", default)]
    pub slack_webhook_url: Option<String>,

    /// One message per job instead of one digest per run
    #[serde(rename = "per-job", default = "default_true")]
    pub per_job: bool,

    /// Post a statistics summary after each run
    #[serde(rename = "send-summary", default)]
    pub send_summary: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            slack_webhook_url: None,
            per_job: true,
            send_summary: false,
        }
    }
}

fn default_jobs_path() -> String {
    "/jobs".to_string()
}

fn default_category() -> String {
    "it-programming".to_string()
}

fn default_language() -> String {
    "xx".to_string()
}

fn default_publication() -> String {
    "1d".to_string()
}

fn default_true() -> bool {
    true
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_random_max_ms() -> u64 {
    1500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
        .to_string()
}

fn default_max_jobs() -> u32 {
    1000
}
