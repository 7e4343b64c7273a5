use crate::config::NotifyConfig;
use crate::job::JobRecord;
use crate::notify::format::{digest_message, job_message, summary_message, tokyo_timestamp};
use crate::notify::{Notifier, NotifyError};
use crate::output::JobStatistics;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts notifications to a Slack incoming webhook
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
    per_job: bool,
}

impl SlackNotifier {
    /// Creates a notifier for `webhook_url`
    ///
    /// With `per_job` set, every new job gets its own message; otherwise a
    /// batch is sent as one digest.
    pub fn new(webhook_url: impl Into<String>, per_job: bool) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
            per_job,
        })
    }

    /// Creates a notifier when a webhook is configured
    pub fn from_config(config: &NotifyConfig) -> Result<Option<Self>, NotifyError> {
        match &config.slack_webhook_url {
            Some(url) if !url.trim().is_empty() => Ok(Some(Self::new(url.trim(), config.per_job)?)),
            _ => Ok(None),
        }
    }

    /// Posts one JSON payload to the webhook
    pub async fn send_message(&self, payload: &Value) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify_new_jobs(
        &self,
        jobs: &[JobRecord],
        total_scraped: usize,
    ) -> Result<(), NotifyError> {
        if jobs.is_empty() {
            tracing::debug!("No new jobs to notify about");
            return Ok(());
        }

        if !self.per_job {
            tracing::info!("Sending digest of {} new jobs to Slack", jobs.len());
            return self.send_message(&digest_message(jobs, total_scraped)).await;
        }

        tracing::info!("Sending {} new jobs to Slack", jobs.len());
        let mut failed = 0;
        for job in jobs {
            let timestamp = tokyo_timestamp(Utc::now());
            if let Err(e) = self.send_message(&job_message(job, &timestamp)).await {
                tracing::warn!("Failed to send job {} to Slack: {}", job, e);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(NotifyError::Partial {
                failed,
                total: jobs.len(),
            });
        }
        Ok(())
    }

    async fn notify_summary(
        &self,
        stats: &JobStatistics,
        duration: Duration,
    ) -> Result<(), NotifyError> {
        self.send_message(&summary_message(stats, duration)).await
    }
}
