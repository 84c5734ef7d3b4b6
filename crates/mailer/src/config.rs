//! SMTP and tracking-URL configuration.

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@palco.local";

/// Default public base URL for tracking links in local development.
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";

/// Configuration for the SMTP campaign mailer.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
    /// Base URL the tracking endpoints are reachable at; embedded in
    /// every pixel, rewritten link, and unsubscribe footer.
    pub public_base_url: String,
}

impl MailerConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and campaign sends must be rejected.
    ///
    /// | Variable          | Required | Default                  |
    /// |-------------------|----------|--------------------------|
    /// | `SMTP_HOST`       | yes      | —                        |
    /// | `SMTP_PORT`       | no       | `587`                    |
    /// | `SMTP_FROM`       | no       | `noreply@palco.local`    |
    /// | `SMTP_USER`       | no       | —                        |
    /// | `SMTP_PASSWORD`   | no       | —                        |
    /// | `PUBLIC_BASE_URL` | no       | `http://localhost:3000`  |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PUBLIC_BASE_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        std::env::remove_var("SMTP_HOST");
        assert!(MailerConfig::from_env().is_none());
    }
}
