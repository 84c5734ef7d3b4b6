//! SMTP transport wrapper.
//!
//! [`Mailer`] is generic over the lettre transport so the send pipeline
//! can be exercised in tests with [`lettre::transport::stub::AsyncStubTransport`]
//! while production uses the async SMTP transport built from
//! [`MailerConfig`].

use lettre::message::header::{Header, HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use palco_core::types::DbId;

use crate::config::MailerConfig;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Transport-level failure (connection, authentication, stub error).
    #[error("Mail transport error: {0}")]
    Transport(String),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// Custom headers
// ---------------------------------------------------------------------------

/// `X-Campaign-ID`: lets bounce handling and reply filters attribute a
/// message to its campaign.
#[derive(Debug, Clone, PartialEq)]
struct XCampaignId(String);

impl Header for XCampaignId {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Campaign-ID")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// RFC 2369 `List-Unsubscribe` with a single URL.
#[derive(Debug, Clone, PartialEq)]
struct ListUnsubscribe(String);

impl Header for ListUnsubscribe {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("List-Unsubscribe")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// The production transport type.
pub type SmtpMailer = Mailer<AsyncSmtpTransport<Tokio1Executor>>;

/// Sends campaign emails over a lettre transport.
pub struct Mailer<T> {
    transport: T,
    from_address: String,
    base_url: String,
}

impl SmtpMailer {
    /// Build the SMTP mailer from configuration (STARTTLS relay with
    /// optional credentials).
    pub fn from_config(config: &MailerConfig) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone(),
            base_url: config.public_base_url.clone(),
        })
    }
}

impl<T> Mailer<T>
where
    T: AsyncTransport + Sync,
    T::Error: std::fmt::Display,
{
    /// Wrap an arbitrary transport (tests use the stub transport).
    pub fn new(transport: T, from_address: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            from_address: from_address.into(),
            base_url: base_url.into(),
        }
    }

    /// Base URL for tracking links, as configured.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one campaign email: multipart HTML + plain-text fallback,
    /// with campaign attribution and unsubscribe headers.
    pub async fn send_campaign_email(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        subject: &str,
        html_body: String,
        text_body: String,
        campaign_id: DbId,
        subscriber_id: DbId,
    ) -> Result<(), MailError> {
        let from: Mailbox = self.from_address.parse()?;
        let to = Mailbox::new(
            to_name.map(str::to_string),
            to_email.parse::<Address>()?,
        );

        let unsubscribe_url =
            palco_core::content::unsubscribe_url(&self.base_url, campaign_id, subscriber_id);

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(XCampaignId(campaign_id.to_string()))
            .header(ListUnsubscribe(format!("<{unsubscribe_url}>")))
            .multipart(MultiPart::alternative_plain_html(text_body, html_body))
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
