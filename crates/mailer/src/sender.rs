//! The campaign composer/sender.
//!
//! Orchestrates one newsletter send: resolve the audience, create the
//! campaign row, then walk the recipients sequentially rendering,
//! sending, and recording each one. Individual send failures are
//! logged and counted, never fatal; persistence calls go through the
//! retry policy so a transient database blip does not abort the batch.

use lettre::AsyncTransport;
use serde::Serialize;
use sqlx::PgPool;

use palco_core::audience::Audience;
use palco_core::content;
use palco_core::retry::{retry, RetryPolicy};
use palco_core::types::DbId;
use palco_db::is_transient;
use palco_db::models::campaign::Campaign;
use palco_db::models::subscriber::SubscriberInfo;
use palco_db::repositories::{CampaignRepo, RecipientRepo, SubscriberRepo};

use crate::smtp::Mailer;

/// Error type for a campaign send as a whole. Per-recipient failures
/// are not errors; they end up in [`SendOutcome::failed`].
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Subject or content missing.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The audience resolved to zero subscribers; no campaign row was
    /// created.
    #[error("No recipients matched audience '{0}'")]
    NoRecipients(String),

    /// Resuming a send for a campaign that does not exist.
    #[error("Campaign {0} not found")]
    UnknownCampaign(DbId),

    /// The database stayed unreachable through every retry attempt, or
    /// rejected a write outright.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Input for one campaign send.
#[derive(Debug, Clone)]
pub struct SendInput {
    pub subject: String,
    /// HTML template with the `{{name}}` placeholder.
    pub content: String,
    /// Plain-text fallback; defaults to the subject when absent.
    pub preview: Option<String>,
    pub audience: Audience,
}

/// Summary returned to the dashboard after a send completes.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub campaign_id: DbId,
    /// Recipients successfully handed to the SMTP server.
    pub sent: u32,
    /// Recipients that failed (bad address, transport error) and were
    /// skipped.
    pub failed: u32,
    /// Recipients skipped because a previous run already delivered to
    /// them (only non-zero on resume).
    pub skipped: u32,
}

/// Sends campaigns through a [`Mailer`].
pub struct CampaignSender<T> {
    mailer: Mailer<T>,
    retry_policy: RetryPolicy,
}

impl<T> CampaignSender<T>
where
    T: AsyncTransport + Sync,
    T::Error: std::fmt::Display,
{
    pub fn new(mailer: Mailer<T>) -> Self {
        Self {
            mailer,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Override the retry policy (tests use millisecond delays).
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Compose and send a new campaign.
    pub async fn send(&self, pool: &PgPool, input: SendInput) -> Result<SendOutcome, SendError> {
        if input.subject.trim().is_empty() {
            return Err(SendError::Validation("subject must not be empty".into()));
        }
        if input.content.trim().is_empty() {
            return Err(SendError::Validation("content must not be empty".into()));
        }

        let recipients = retry(&self.retry_policy, is_transient, || {
            SubscriberRepo::resolve_audience(pool, input.audience)
        })
        .await?;

        if recipients.is_empty() {
            return Err(SendError::NoRecipients(input.audience.to_string()));
        }

        let campaign = retry(&self.retry_policy, is_transient, || {
            CampaignRepo::create(
                pool,
                &input.subject,
                &input.content,
                input.preview.as_deref(),
                input.audience.as_str(),
                recipients.len() as i32,
            )
        })
        .await?;

        tracing::info!(
            campaign_id = campaign.id,
            audience = %input.audience,
            recipients = recipients.len(),
            "Campaign send started",
        );

        let outcome = self.deliver(pool, &campaign, &recipients).await?;

        tracing::info!(
            campaign_id = campaign.id,
            sent = outcome.sent,
            failed = outcome.failed,
            "Campaign send finished",
        );

        Ok(outcome)
    }

    /// Resume an interrupted send.
    ///
    /// Re-resolves the stored audience and walks it again; recipients
    /// that already have a row are skipped, so nobody is mailed twice.
    pub async fn resume(&self, pool: &PgPool, campaign_id: DbId) -> Result<SendOutcome, SendError> {
        let campaign = retry(&self.retry_policy, is_transient, || {
            CampaignRepo::find_by_id(pool, campaign_id)
        })
        .await?
        .ok_or(SendError::UnknownCampaign(campaign_id))?;

        let audience = Audience::parse(&campaign.audience);
        let recipients = retry(&self.retry_policy, is_transient, || {
            SubscriberRepo::resolve_audience(pool, audience)
        })
        .await?;

        tracing::info!(
            campaign_id,
            recipients = recipients.len(),
            "Campaign send resumed",
        );

        self.deliver(pool, &campaign, &recipients).await
    }

    /// The sequential delivery loop shared by fresh sends and resumes.
    ///
    /// Finalizes the campaign with the count of recipient rows actually
    /// created, which redefines `total_recipients` from "audience size"
    /// to "successful sends" — the dashboard's rate denominator.
    async fn deliver(
        &self,
        pool: &PgPool,
        campaign: &Campaign,
        recipients: &[SubscriberInfo],
    ) -> Result<SendOutcome, SendError> {
        let mut sent = 0u32;
        let mut failed = 0u32;
        let mut skipped = 0u32;

        for recipient in recipients {
            let delivered = retry(&self.retry_policy, is_transient, || {
                RecipientRepo::already_sent(pool, campaign.id, recipient.id)
            })
            .await?;
            if delivered {
                skipped += 1;
                continue;
            }

            let html = content::render(
                &campaign.content,
                recipient.name.as_deref(),
                self.mailer.base_url(),
                campaign.id,
                recipient.id,
            );
            let text = content::personalize(
                campaign.preview_text.as_deref().unwrap_or(&campaign.subject),
                recipient.name.as_deref(),
            );

            match self
                .mailer
                .send_campaign_email(
                    &recipient.email,
                    recipient.name.as_deref(),
                    &campaign.subject,
                    html,
                    text,
                    campaign.id,
                    recipient.id,
                )
                .await
            {
                Ok(()) => {
                    retry(&self.retry_policy, is_transient, || {
                        RecipientRepo::record_sent(pool, campaign.id, recipient.id)
                    })
                    .await?;
                    sent += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        campaign_id = campaign.id,
                        subscriber_id = recipient.id,
                        email = %recipient.email,
                        error = %e,
                        "Failed to send campaign email, skipping recipient",
                    );
                    failed += 1;
                }
            }
        }

        let delivered_total = retry(&self.retry_policy, is_transient, || {
            RecipientRepo::count_for_campaign(pool, campaign.id)
        })
        .await?;

        retry(&self.retry_policy, is_transient, || {
            CampaignRepo::finalize(pool, campaign.id, delivered_total as i32)
        })
        .await?;

        Ok(SendOutcome {
            campaign_id: campaign.id,
            sent,
            failed,
            skipped,
        })
    }
}
