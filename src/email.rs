use crate::error::{ReportError, Result};
use crate::report::Report;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::{error, info};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub recipients: Vec<String>,
}

impl EmailConfig {
    /// Reads a `KEY=value` file with SMTP_USER, SMTP_PASS, RECIPIENT_EMAIL
    /// (comma-separated) and an optional SMTP_SERVER.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Option<Self> {
        let mut map = HashMap::new();

        for line in content.lines() {
            if line.trim_start().starts_with('#') {
                continue;
            }
            if let Some((k, v)) = line.split_once('=') {
                let key = k.trim();
                let val = v.trim().trim_matches('"');
                map.insert(key, val);
            }
        }

        let recipients: Vec<String> = map
            .get("RECIPIENT_EMAIL")?
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(ToString::to_string)
            .collect();
        if recipients.is_empty() {
            return None;
        }

        Some(EmailConfig {
            smtp_server: map
                .get("SMTP_SERVER")
                .map_or(DEFAULT_SMTP_SERVER, |s| *s)
                .to_string(),
            smtp_user: (*map.get("SMTP_USER")?).to_string(),
            smtp_pass: (*map.get("SMTP_PASS")?).to_string(),
            recipients,
        })
    }
}

fn build_message(report: &Report, from: &str, to: &str) -> Result<Message> {
    let from_addr = from
        .parse()
        .map_err(|e| ReportError::Email(format!("Invalid sender email address: {e}")))?;
    let to_addr = to
        .parse()
        .map_err(|e| ReportError::Email(format!("Invalid recipient email address: {e}")))?;

    Message::builder()
        .from(from_addr)
        .to(to_addr)
        .subject(report.subject())
        .header(ContentType::TEXT_HTML)
        .body(report.to_html())
        .map_err(|e| ReportError::Email(format!("Failed to build email message: {e}")))
}

/// Mail the HTML report to every recipient. Fails only if no recipient got it.
pub fn send_report(report: &Report, config: &EmailConfig) -> Result<()> {
    let creds = Credentials::new(config.smtp_user.clone(), config.smtp_pass.clone());
    let mailer = SmtpTransport::starttls_relay(&config.smtp_server)
        .map_err(|e| ReportError::Email(format!("Failed to connect to SMTP server: {e}")))?
        .credentials(creds)
        .build();

    let mut delivered = 0;
    for recipient in &config.recipients {
        let sent = build_message(report, &config.smtp_user, recipient).and_then(|email| {
            mailer
                .send(&email)
                .map_err(|e| ReportError::Email(e.to_string()))
        });
        match sent {
            Ok(_) => {
                info!("Sent report to {recipient}");
                delivered += 1;
            }
            Err(e) => error!("Failed to send to {recipient}: {e}"),
        }
    }

    if delivered == 0 {
        return Err(ReportError::Email(format!(
            "Report could not be delivered to any of {} recipients",
            config.recipients.len()
        )));
    }
    Ok(())
}
