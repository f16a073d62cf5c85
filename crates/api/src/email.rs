// SPDX-FileCopyrightText: Aaron Dewes <aaron@nirvati.de>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Roster-completion notification. The dispatch happens after the stage-3
//! transaction has committed and is fire-and-forget: a delivery failure is
//! logged, never rolled back and never surfaced to the submitting client.

use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct RosterSummary {
    pub captain_email: String,
    pub teammate_emails: Vec<String>,
    pub team_name: String,
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[async_trait::async_trait]
pub trait RosterNotifier {
    async fn send_registration_complete(
        &self,
        recipient: &str,
        summary: &RosterSummary,
    ) -> Result<(), NotifyError>;
}

pub fn render_summary_body(summary: &RosterSummary) -> String {
    let mut body = format!(
        "Your team \"{}\" has completed registration.\n\n\
         Captain: {}\n",
        summary.team_name, summary.captain_email
    );
    if summary.teammate_emails.is_empty() {
        body.push_str("No teammates were enrolled.\n");
    } else {
        body.push_str("Enrolled teammates:\n");
        for email in &summary.teammate_emails {
            body.push_str(&format!("  - {email}\n"));
        }
    }
    body.push_str(
        "\nEach participant will receive their login credentials by email. \
         If a message does not arrive, please also check the spam folder.\n",
    );
    body
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpNotifier {
    /// Build the SMTP dispatcher from the `EMAIL_*` environment variables.
    /// Returns `None` when any of them is missing.
    pub fn from_env() -> Option<Self> {
        let server = std::env::var("EMAIL_SMTP_SERVER").ok()?;
        let username = std::env::var("EMAIL_SMTP_USERNAME").ok()?;
        let password = std::env::var("EMAIL_SMTP_PASSWORD").ok()?;
        let from = std::env::var("EMAIL_FROM_ADDRESS").ok()?.parse().ok()?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&server)
            .ok()?
            .credentials(Credentials::new(username, password))
            .timeout(Some(std::time::Duration::from_secs(10)))
            .build();

        Some(Self { transport, from })
    }
}

#[async_trait::async_trait]
impl RosterNotifier for SmtpNotifier {
    async fn send_registration_complete(
        &self,
        recipient: &str,
        summary: &RosterSummary,
    ) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient.parse()?)
            .subject("Registration complete")
            .header(ContentType::TEXT_PLAIN)
            .body(render_summary_body(summary))?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// Used when SMTP is not configured: the roster summary only reaches the
/// server log.
pub struct NoopNotifier;

#[async_trait::async_trait]
impl RosterNotifier for NoopNotifier {
    async fn send_registration_complete(
        &self,
        recipient: &str,
        summary: &RosterSummary,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            "SMTP not configured; skipping roster summary to {recipient} for team {}",
            summary.team_name
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_body_names_team_and_teammates() {
        let summary = RosterSummary {
            captain_email: "cap@x.com".to_string(),
            teammate_emails: vec!["a@x.com".to_string(), "b@x.com".to_string()],
            team_name: "Знатоки".to_string(),
        };
        let body = render_summary_body(&summary);
        assert!(body.contains("Знатоки"));
        assert!(body.contains("cap@x.com"));
        assert!(body.contains("a@x.com"));
        assert!(body.contains("b@x.com"));
    }

    #[test]
    fn test_summary_body_handles_solo_captain() {
        let summary = RosterSummary {
            captain_email: "cap@x.com".to_string(),
            teammate_emails: Vec::new(),
            team_name: "Solo".to_string(),
        };
        let body = render_summary_body(&summary);
        assert!(body.contains("No teammates"));
    }
}
