//! Slack Block Kit payloads
//!
//! Every builder returns the complete JSON body for one webhook POST: a
//! plain `text` fallback plus `blocks`.

use crate::job::JobRecord;
use crate::output::JobStatistics;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;

/// Bold rule separating jobs
pub const DIVIDER: &str = "*───────────────────────────────────*";

/// Jobs listed in one digest message
pub const DIGEST_LIMIT: usize = 10;

const JST_OFFSET_HOURS: i64 = 9;

/// `YYYY/MM/DD : HH:MM` in Japan Standard Time
pub fn tokyo_timestamp(now: DateTime<Utc>) -> String {
    (now + ChronoDuration::hours(JST_OFFSET_HOURS))
        .format("%Y/%m/%d : %H:%M")
        .to_string()
}

/// Escapes the characters Slack treats as control sequences in mrkdwn
pub fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wraps every number (with thousands separators and decimals) in `*...*`
pub fn bold_numbers(text: &str) -> String {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let number = NUMBER
        .get_or_init(|| Regex::new(r"(\d+(?:,\d+)*(?:\.\d+)?)").expect("number pattern is valid"));
    number.replace_all(text, "*${1}*").into_owned()
}

fn payment_mark(job: &JobRecord) -> &'static str {
    if job.client_payment_verified {
        "✅"
    } else {
        "❌"
    }
}

fn section(text: String) -> Value {
    json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": text }
    })
}

/// Message announcing a single new job
pub fn job_message(job: &JobRecord, timestamp: &str) -> Value {
    let title = if job.title.is_empty() { "N/A" } else { &job.title };

    let mut lines = vec![
        format!("*🎉 New Job Found 🎉 {}*", timestamp),
        escape_mrkdwn(title),
    ];
    if !job.client_country.is_empty() {
        lines.push(format!("Country: {}", escape_mrkdwn(&job.client_country)));
    }
    if !job.budget.is_empty() {
        lines.push(format!(
            "Budget: {} : {}",
            bold_numbers(&escape_mrkdwn(&job.budget)),
            payment_mark(job)
        ));
    }
    lines.push(DIVIDER.to_string());

    let mut block = section(lines.join("\n"));
    if !job.url.is_empty() {
        block["accessory"] = json!({
            "type": "button",
            "text": { "type": "plain_text", "text": "Open Job" },
            "url": job.url,
            "action_id": "view_job"
        });
    }

    json!({
        "text": format!("🎉 New Job Found 🎉 {} - {}", timestamp, title),
        "blocks": [block]
    })
}

/// One job inside a digest: linked title, country, payment, budget
fn digest_entry(job: &JobRecord) -> Value {
    let title = escape_mrkdwn(if job.title.is_empty() { "N/A" } else { &job.title });

    let mut lines = vec![if job.url.is_empty() {
        format!("*{}*", title)
    } else {
        format!("*<{}|{}>*", job.url, title)
    }];
    if !job.client_country.is_empty() {
        lines.push(format!("Country: {}", escape_mrkdwn(&job.client_country)));
    }
    lines.push(if job.client_payment_verified {
        "Payment: ✅ Verified".to_string()
    } else {
        "Payment: ❌ Not Verified".to_string()
    });
    if !job.budget.is_empty() {
        lines.push(format!("Budget: {}", escape_mrkdwn(&job.budget)));
    }

    section(lines.join("\n"))
}

/// One message listing up to `DIGEST_LIMIT` new jobs
pub fn digest_message(jobs: &[JobRecord], total_scraped: usize) -> Value {
    let count = jobs.len();
    let plural = if count == 1 { "" } else { "s" };

    let mut intro = format!("🎉 *{} New Job{} Found on Workana!*", count, plural);
    if total_scraped > 0 {
        intro.push_str(&format!("\n(Scraped {} jobs total)", total_scraped));
    }

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": { "type": "plain_text", "text": format!("🎉 {} New Job{} Found!", count, plural) }
        }),
        section(intro),
        section(DIVIDER.to_string()),
    ];

    let shown = &jobs[..count.min(DIGEST_LIMIT)];
    for (i, job) in shown.iter().enumerate() {
        if i > 0 {
            blocks.push(section(DIVIDER.to_string()));
        }
        blocks.push(digest_entry(job));
    }

    if count > DIGEST_LIMIT {
        blocks.push(section(format!(
            "*... and {} more new jobs!* Check the database for full list.",
            count - DIGEST_LIMIT
        )));
    }

    blocks.push(json!({
        "type": "context",
        "elements": [{
            "type": "mrkdwn",
            "text": format!("Scraped from Workana.com • Total new jobs: {}", count)
        }]
    }));

    json!({
        "text": format!("Found {} new job(s) on Workana", count),
        "blocks": blocks
    })
}

/// Post-run statistics message
pub fn summary_message(stats: &JobStatistics, duration: Duration) -> Value {
    let field = |label: &str, value: String| {
        json!({ "type": "mrkdwn", "text": format!("*{}:*\n{}", label, value) })
    };

    json!({
        "text": format!("Scraping complete: {} total jobs", stats.total_jobs),
        "blocks": [
            {
                "type": "header",
                "text": { "type": "plain_text", "text": "📊 Workana Scraping Summary" }
            },
            {
                "type": "section",
                "fields": [
                    field("Total Jobs", stats.total_jobs.to_string()),
                    field("New (24h)", stats.new_jobs_24h.to_string()),
                    field("Total Scrapes", stats.total_runs.to_string()),
                    field("Duration", format!("{:.1} min", duration.as_secs_f64() / 60.0)),
                ]
            }
        ]
    })
}
