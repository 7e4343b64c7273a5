//! Record parser for single job listings
//!
//! Every field of a `JobRecord` is read by an ordered list of `FieldRule`s.
//! Rules fail independently: a rule that matches nothing, lacks its
//! attribute, or yields an unresolvable link simply falls through to the
//! next rule, and a field whose rules all fail stays empty. Parsing a
//! fragment therefore never fails as a whole; a record without an id is
//! returned as-is and dropped by the caller.

use crate::config::SelectorConfig;
use crate::job::JobRecord;
use crate::url::{last_path_segment, resolve_url};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Where a rule reads its value from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// Whitespace-collapsed text content of the element
    Text,
    /// Value of the named attribute
    Attr(String),
}

/// Post-processing applied to a rule's raw value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTransform {
    None,
    /// Resolve as an absolute http(s) link
    Absolute,
    /// Resolve as a link and keep its last path segment
    Slug,
}

/// One extraction rule: `css`, `css@attribute` or `css@attribute|slug`
#[derive(Debug, Clone)]
pub struct FieldRule {
    selector: Selector,
    source: FieldSource,
    transform: FieldTransform,
}

impl FieldRule {
    /// Parses a rule from its textual form
    ///
    /// # Examples
    ///
    /// ```
    /// use workana_watch::scrape::{FieldRule, FieldSource};
    ///
    /// let rule = FieldRule::parse(".project-title a@href").unwrap();
    /// assert_eq!(rule.source(), &FieldSource::Attr("href".to_string()));
    /// assert!(FieldRule::parse("div[[").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, String> {
        let (head, transform) = match text.rsplit_once('|') {
            Some((head, "slug")) => (head, FieldTransform::Slug),
            _ => (text, FieldTransform::None),
        };

        let (css, source) = match head.rsplit_once('@') {
            Some((css, attr)) => {
                let attr = attr.trim();
                if attr.is_empty()
                    || !attr
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
                {
                    return Err(format!("invalid attribute name '{}'", attr));
                }
                (css, FieldSource::Attr(attr.to_string()))
            }
            None => (head, FieldSource::Text),
        };

        if transform == FieldTransform::Slug && source == FieldSource::Text {
            return Err("the slug transform needs an attribute".to_string());
        }

        let css = css.trim();
        if css.is_empty() {
            return Err("empty selector".to_string());
        }

        let selector = Selector::parse(css).map_err(|e| format!("{:?}", e))?;

        Ok(Self {
            selector,
            source,
            transform,
        })
    }

    pub fn source(&self) -> &FieldSource {
        &self.source
    }

    /// Returns the first non-empty value this rule yields in the fragment
    fn extract(&self, fragment: &Html, base_url: &Url) -> Option<String> {
        fragment
            .select(&self.selector)
            .filter_map(|element| self.read(element))
            .filter_map(|raw| match self.transform {
                FieldTransform::None => Some(raw),
                FieldTransform::Absolute => resolve_url(&raw, base_url),
                FieldTransform::Slug => {
                    resolve_url(&raw, base_url).and_then(|abs| last_path_segment(&abs))
                }
            })
            .find(|value| !value.is_empty())
    }

    fn read(&self, element: ElementRef<'_>) -> Option<String> {
        match &self.source {
            FieldSource::Text => Some(collapse_whitespace(element.text())),
            FieldSource::Attr(name) => element.value().attr(name).map(|v| v.trim().to_string()),
        }
    }
}

/// Ordered rules for one field; the first rule with a value wins
#[derive(Debug, Clone, Default)]
struct FieldRules {
    rules: Vec<FieldRule>,
}

impl FieldRules {
    fn compile(field: &str, texts: &[String]) -> Self {
        let rules = texts
            .iter()
            .filter_map(|text| match FieldRule::parse(text) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::warn!("Ignoring {} rule '{}': {}", field, text, e);
                    None
                }
            })
            .collect();
        Self { rules }
    }

    /// Makes plain rules resolve their value as a link
    fn resolving_links(mut self) -> Self {
        for rule in &mut self.rules {
            if rule.transform == FieldTransform::None {
                rule.transform = FieldTransform::Absolute;
            }
        }
        self
    }

    fn first(&self, fragment: &Html, base_url: &Url) -> Option<String> {
        self.rules
            .iter()
            .find_map(|rule| rule.extract(fragment, base_url))
    }

    fn any_match(&self, fragment: &Html) -> bool {
        self.rules
            .iter()
            .any(|rule| fragment.select(&rule.selector).next().is_some())
    }
}

/// Turns one listing's markup into a `JobRecord`
#[derive(Debug, Clone)]
pub struct RecordParser {
    id: FieldRules,
    title: FieldRules,
    url: FieldRules,
    budget: FieldRules,
    client_name: FieldRules,
    client_country: FieldRules,
    client_payment_verified: FieldRules,
}

impl RecordParser {
    /// Compiles the field rules; rules that do not compile are skipped
    pub fn new(selectors: &SelectorConfig) -> Self {
        Self {
            id: FieldRules::compile("id", &selectors.id),
            title: FieldRules::compile("title", &selectors.title),
            url: FieldRules::compile("url", &selectors.url).resolving_links(),
            budget: FieldRules::compile("budget", &selectors.budget),
            client_name: FieldRules::compile("client-name", &selectors.client_name),
            client_country: FieldRules::compile("client-country", &selectors.client_country),
            client_payment_verified: FieldRules::compile(
                "client-payment-verified",
                &selectors.client_payment_verified,
            ),
        }
    }

    /// Parses one listing fragment
    ///
    /// Never fails: missing fields come back empty, and a fragment without
    /// an id yields a record with an empty id.
    ///
    /// # Example
    ///
    /// ```
    /// use url::Url;
    /// use workana_watch::scrape::RecordParser;
    ///
    /// let parser = RecordParser::default();
    /// let base = Url::parse("https://www.workana.com").unwrap();
    /// let job = parser.parse(
    ///     r#"<div class="project-item"><h2 class="project-title"><a href="/job/logo-design">Logo design</a></h2></div>"#,
    ///     &base,
    /// );
    /// assert_eq!(job.id, "logo-design");
    /// assert_eq!(job.url, "https://www.workana.com/job/logo-design");
    /// ```
    pub fn parse(&self, fragment: &str, base_url: &Url) -> JobRecord {
        let document = Html::parse_fragment(fragment);

        let job = JobRecord {
            id: self.id.first(&document, base_url).unwrap_or_default(),
            client_name: self.client_name.first(&document, base_url).unwrap_or_default(),
            title: self.title.first(&document, base_url).unwrap_or_default(),
            url: self.url.first(&document, base_url).unwrap_or_default(),
            budget: self.budget.first(&document, base_url).unwrap_or_default(),
            client_country: self
                .client_country
                .first(&document, base_url)
                .unwrap_or_default(),
            client_payment_verified: self.client_payment_verified.any_match(&document),
        };

        if !job.is_usable() {
            tracing::trace!("Listing fragment yielded no id");
        }

        job
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(&SelectorConfig::default())
    }
}

/// Joins text nodes and collapses runs of whitespace into single spaces
fn collapse_whitespace<'a>(text: impl Iterator<Item = &'a str>) -> String {
    text.flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
