use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::MailConfig;
use crate::error::{AppError, AppResult};

/// Outbound mail. The SMTP transport is optional: without an `smtp_host`
/// in the config, messages are still built but only logged, never sent.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<SmtpTransport>,
    from: Mailbox,
}

impl Mailer {
    pub fn from_config(config: &MailConfig) -> anyhow::Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid mail.from address '{}': {}", config.from, e))?;

        let transport = match &config.smtp_host {
            Some(host) => {
                let mut builder = SmtpTransport::relay(host)?
                    .port(config.smtp_port)
                    .timeout(Some(std::time::Duration::from_secs(10)));
                if let (Some(user), Some(pass)) = (&config.username, &config.password) {
                    builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
                }
                Some(builder.build())
            }
            None => None,
        };

        Ok(Self { transport, from })
    }

    /// Mailer that only logs. Used in tests and as the no-config default.
    pub fn disabled() -> Self {
        Self {
            transport: None,
            from: "Quill <noreply@localhost>"
                .parse()
                .expect("static from address"),
        }
    }

    pub fn send_reset_email(&self, to: &str, username: &str, reset_url: &str) -> AppResult<()> {
        let body = reset_email_body(username, reset_url);

        let email = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid recipient address: {e}")))?)
            .subject("Password Reset Request")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Internal(format!("Failed to build reset email: {e}")))?;

        match &self.transport {
            Some(transport) => {
                transport
                    .send(&email)
                    .map_err(|e| AppError::Internal(format!("Failed to send reset email: {e}")))?;
                tracing::info!("Sent password reset email to {}", to);
            }
            None => {
                // No transport configured. Surface the link in the log so the
                // flow remains usable in development.
                tracing::info!(
                    "Mail transport not configured; reset link for {}: {}",
                    to,
                    reset_url
                );
            }
        }
        Ok(())
    }
}

fn reset_email_body(username: &str, reset_url: &str) -> String {
    format!(
        "Hello {username},\n\n\
        To reset your password, visit the following link:\n\n\
        {reset_url}\n\n\
        The link expires in 30 minutes.\n\n\
        If you did not make this request, simply ignore this email and no \
        changes will be made.\n"
    )
}
