use chrono::{Datelike, Utc};
use serde_json::json;

use crate::common::error::AppError;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";

// Transactional email through the Resend HTTP API. The only mail this
// service sends is the magic-link sign-in message.
#[derive(Clone)]
pub struct Mailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl Mailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from,
        }
    }

    pub async fn send_magic_link(&self, to: &str, url: &str) -> Result<(), AppError> {
        let body = json!({
            "from": self.from,
            "to": [to],
            "subject": "Sign in to Gloria Connect",
            "html": magic_link_html(url),
            "text": magic_link_text(url),
        });

        let response = self
            .http
            .post(RESEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::EmailDelivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::EmailDelivery(format!(
                "provider returned {}",
                response.status()
            )));
        }

        tracing::info!("magic-link email dispatched to {}", to);
        Ok(())
    }
}

// The sign-in link is valid for 20 minutes; enforcement happens at
// verification time, the copy here just has to match.
fn magic_link_html(url: &str) -> String {
    let year = Utc::now().year();
    format!(
        r#"<div style="font-family: 'Segoe UI', Arial, sans-serif; background: #f6f8fa; padding: 40px 0;">
  <table width="100%" cellpadding="0" cellspacing="0" style="max-width: 480px; margin: 0 auto; background: #fff; border-radius: 12px;">
    <tr>
      <td style="padding: 32px 32px 16px 32px; text-align: center;">
        <h2 style="margin: 0 0 8px 0; color: #1a202c; font-size: 24px; font-weight: 700;">Sign in to Gloria Connect</h2>
        <p style="margin: 0 0 24px 0; color: #4a5568; font-size: 16px;">Click the button below to sign in securely. This link is valid for 20 minutes.</p>
        <a href="{url}" style="display: inline-block; padding: 14px 32px; background: #2563eb; color: #fff; border-radius: 8px; font-size: 18px; font-weight: 600; text-decoration: none;">Sign in to Gloria Connect</a>
        <p style="margin: 24px 0 0 0; color: #a0aec0; font-size: 13px;">If you did not request this email, you can safely ignore it.</p>
      </td>
    </tr>
  </table>
  <p style="text-align: center; color: #a0aec0; font-size: 12px; margin-top: 24px;">&copy; {year} Gloria Connect. All rights reserved.</p>
</div>"#
    )
}

fn magic_link_text(url: &str) -> String {
    format!(
        "Sign in to Gloria Connect\n\nClick this link to sign in: {url}\n\nIf you did not request this email, you can ignore it."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_embed_the_sign_in_url() {
        let url = "https://connect.example.ph/en/login?code=abc123";
        assert!(magic_link_html(url).contains(url));
        assert!(magic_link_text(url).contains(url));
    }

    #[test]
    fn html_states_the_twenty_minute_validity() {
        assert!(magic_link_html("https://x").contains("valid for 20 minutes"));
    }
}
