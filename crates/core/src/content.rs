//! Campaign HTML assembly.
//!
//! Turns the stored campaign template into the per-recipient message
//! body: `{{name}}` personalization, click-tracking link rewriting, the
//! open-tracking pixel, and the unsubscribe footer. All functions are
//! pure string transforms; the caller supplies the public base URL the
//! tracking endpoints are reachable at.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::DbId;

/// Placeholder replaced with the subscriber's name.
pub const NAME_PLACEHOLDER: &str = "{{name}}";

/// Fallback used when a subscriber has no recorded name.
pub const NAME_FALLBACK: &str = "assinante";

/// Public paths of the tracking endpoints.
pub const TRACK_OPEN_PATH: &str = "/api/v1/track/open";
pub const TRACK_CLICK_PATH: &str = "/api/v1/track/click";
pub const TRACK_UNSUBSCRIBE_PATH: &str = "/api/v1/track/unsubscribe";

/// Matches `href="..."` attributes in anchor tags.
static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s*=\s*"([^"]*)""#).expect("href regex is valid"));

/// Replace the `{{name}}` placeholder with the subscriber's name.
///
/// A missing or blank name falls back to [`NAME_FALLBACK`].
pub fn personalize(content: &str, name: Option<&str>) -> String {
    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => NAME_FALLBACK,
    };
    content.replace(NAME_PLACEHOLDER, name)
}

/// Build the click-tracking URL for one target link.
pub fn tracked_click_url(base_url: &str, campaign_id: DbId, subscriber_id: DbId, target: &str) -> String {
    format!(
        "{base_url}{TRACK_CLICK_PATH}?cid={campaign_id}&sid={subscriber_id}&url={}",
        urlencoding::encode(target)
    )
}

/// Rewrite every `<a href="...">` so it routes through the
/// click-tracking endpoint with the original URL percent-encoded.
///
/// Only `http(s)` targets are rewritten; `mailto:` links and fragment
/// anchors must keep working without a round-trip through the server.
pub fn rewrite_links(content: &str, base_url: &str, campaign_id: DbId, subscriber_id: DbId) -> String {
    HREF_RE
        .replace_all(content, |caps: &Captures| {
            let target = &caps[1];
            if target.starts_with("http://") || target.starts_with("https://") {
                format!(
                    r#"href="{}""#,
                    tracked_click_url(base_url, campaign_id, subscriber_id, target)
                )
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// The invisible 1x1 open-tracking pixel.
pub fn tracking_pixel(base_url: &str, campaign_id: DbId, subscriber_id: DbId) -> String {
    format!(
        r#"<img src="{base_url}{TRACK_OPEN_PATH}?cid={campaign_id}&sid={subscriber_id}" width="1" height="1" border="0" alt="" style="display:none;" />"#
    )
}

/// The unsubscribe URL for one recipient.
pub fn unsubscribe_url(base_url: &str, campaign_id: DbId, subscriber_id: DbId) -> String {
    format!("{base_url}{TRACK_UNSUBSCRIBE_PATH}?sid={subscriber_id}&cid={campaign_id}")
}

/// The unsubscribe footer appended to every campaign email.
pub fn unsubscribe_footer(base_url: &str, campaign_id: DbId, subscriber_id: DbId) -> String {
    format!(
        r#"<p style="font-size:12px;color:#6b7280;text-align:center;margin-top:32px;">Para deixar de receber nossos emails, <a href="{}">cancele sua inscri&ccedil;&atilde;o</a>.</p>"#,
        unsubscribe_url(base_url, campaign_id, subscriber_id)
    )
}

/// Assemble the final per-recipient HTML body.
///
/// Order matters: links are rewritten before the pixel and footer are
/// appended so the unsubscribe link itself is never click-tracked.
pub fn render(
    content: &str,
    name: Option<&str>,
    base_url: &str,
    campaign_id: DbId,
    subscriber_id: DbId,
) -> String {
    let body = personalize(content, name);
    let body = rewrite_links(&body, base_url, campaign_id, subscriber_id);
    format!(
        "{body}\n{}\n{}",
        tracking_pixel(base_url, campaign_id, subscriber_id),
        unsubscribe_footer(base_url, campaign_id, subscriber_id)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://palco.example.com";

    #[test]
    fn personalize_uses_name() {
        let out = personalize("<p>Oi {{name}}!</p>", Some("Marina"));
        assert_eq!(out, "<p>Oi Marina!</p>");
    }

    #[test]
    fn personalize_falls_back_for_missing_or_blank_name() {
        assert_eq!(personalize("Oi {{name}}", None), "Oi assinante");
        assert_eq!(personalize("Oi {{name}}", Some("   ")), "Oi assinante");
    }

    #[test]
    fn rewrite_links_encodes_original_url() {
        let content = r#"<a href="https://shows.example.com/agenda?city=sp">agenda</a>"#;
        let out = rewrite_links(content, BASE, 7, 42);

        assert!(out.contains("/api/v1/track/click?cid=7&sid=42&url="));
        assert!(out.contains("https%3A%2F%2Fshows.example.com%2Fagenda%3Fcity%3Dsp"));
        assert!(!out.contains(r#"href="https://shows.example.com"#));
    }

    #[test]
    fn rewrite_links_handles_multiple_anchors() {
        let content = r#"<a href="https://a.example.com">a</a> <a href="https://b.example.com">b</a>"#;
        let out = rewrite_links(content, BASE, 1, 2);
        assert_eq!(out.matches("/api/v1/track/click").count(), 2);
    }

    #[test]
    fn rewrite_links_leaves_mailto_and_anchors_alone() {
        let content = r##"<a href="mailto:oi@palco.com">email</a> <a href="#top">top</a>"##;
        let out = rewrite_links(content, BASE, 1, 2);
        assert_eq!(out, content);
    }

    #[test]
    fn tracking_pixel_encodes_campaign_and_subscriber() {
        let pixel = tracking_pixel(BASE, 9, 31);
        assert!(pixel.contains("/api/v1/track/open?cid=9&sid=31"));
        assert!(pixel.contains(r#"width="1""#));
        assert!(pixel.contains("display:none"));
    }

    #[test]
    fn render_appends_pixel_and_footer_after_rewriting() {
        let content = r#"<p>Oi {{name}}</p><a href="https://shows.example.com">ver</a>"#;
        let out = render(content, Some("Rafa"), BASE, 3, 5);

        assert!(out.contains("Oi Rafa"));
        assert!(out.contains("/api/v1/track/click?cid=3&sid=5"));
        assert!(out.contains("/api/v1/track/open?cid=3&sid=5"));
        assert!(out.contains("/api/v1/track/unsubscribe?sid=5&cid=3"));

        // The unsubscribe link itself must not be click-tracked.
        assert_eq!(out.matches("/api/v1/track/click").count(), 1);
    }
}
