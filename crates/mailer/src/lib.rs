//! Campaign email delivery: SMTP transport wrapper and the sequential
//! send pipeline.

pub mod config;
pub mod sender;
pub mod smtp;

pub use config::MailerConfig;
pub use sender::{CampaignSender, SendError, SendInput, SendOutcome};
pub use smtp::{MailError, Mailer, SmtpMailer};

/// The campaign sender over the production SMTP transport.
pub type SmtpCampaignSender =
    CampaignSender<lettre::AsyncSmtpTransport<lettre::Tokio1Executor>>;
