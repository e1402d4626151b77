//! SMTP delivery of overdue notices

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};
use std::str::FromStr;

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    models::OverdueNotice,
    repository::OverdueMailer,
};

#[derive(Clone)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn transport(&self) -> AppResult<SmtpTransport> {
        let builder = if self.config.smtp_use_tls {
            SmtpTransport::starttls_relay(&self.config.smtp_host)
                .map_err(|e| AppError::Email(format!("Failed to create SMTP transport: {}", e)))?
        } else {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
        }
        .port(self.config.smtp_port);

        let builder = match (&self.config.smtp_username, &self.config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(builder.build())
    }

    fn build_message(&self, notice: &OverdueNotice) -> AppResult<Message> {
        let from_name = self
            .config
            .smtp_from_name
            .as_deref()
            .unwrap_or("Book Club Library");
        let from_mailbox = Mailbox::from_str(&format!("{} <{}>", from_name, self.config.smtp_from))
            .map_err(|e| AppError::Email(format!("Invalid from address: {}", e)))?;
        let to_mailbox = Mailbox::from_str(&format!("{} <{}>", notice.reader_name, notice.email))
            .or_else(|_| Mailbox::from_str(&notice.email))
            .map_err(|e| AppError::Email(format!("Invalid to address: {}", e)))?;

        Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject(notice))
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body(notice)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body(notice)),
                    ),
            )
            .map_err(|e| AppError::Email(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl OverdueMailer for SmtpMailer {
    async fn send_overdue_notice(&self, notice: &OverdueNotice) -> AppResult<()> {
        let message = self.build_message(notice)?;
        let mailer = self.transport()?;

        // lettre's SMTP transport is blocking
        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
            .map_err(|e| AppError::Email(format!("Failed to send email: {}", e)))?;

        tracing::debug!("Overdue notice delivered to {}", notice.email);
        Ok(())
    }
}

fn subject(notice: &OverdueNotice) -> String {
    match notice.books.len() {
        1 => "Overdue book reminder".to_string(),
        n => format!("Overdue books reminder ({} books)", n),
    }
}

fn plain_body(notice: &OverdueNotice) -> String {
    let lines: Vec<String> = notice
        .books
        .iter()
        .map(|b| format!("  - {} (due {})", b.title, b.due_date.format("%Y-%m-%d")))
        .collect();

    format!(
        r#"Dear {name},

Our records show the following book(s) are past their due date:

{books}

Please return them to the library at your earliest convenience.

Book Club Library
"#,
        name = notice.reader_name,
        books = lines.join("\n")
    )
}

fn html_body(notice: &OverdueNotice) -> String {
    let items: String = notice
        .books
        .iter()
        .map(|b| {
            format!(
                "<li><strong>{}</strong> (due {})</li>",
                escape_html(&b.title),
                b.due_date.format("%Y-%m-%d")
            )
        })
        .collect();

    format!(
        r#"<html><body><p>Dear {}</p><p>Our records show the following book(s) are past their due date:</p><ul>{}</ul><p>Please return them to the library at your earliest convenience.</p><p>Book Club Library</p></body></html>"#,
        escape_html(&notice.reader_name),
        items
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OverdueBook;
    use chrono::{TimeZone, Utc};

    fn notice() -> OverdueNotice {
        OverdueNotice {
            email: "rita@example.org".into(),
            reader_name: "Rita".into(),
            books: vec![
                OverdueBook {
                    title: "Dune".into(),
                    due_date: Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap(),
                },
                OverdueBook {
                    title: "Pride & Prejudice".into(),
                    due_date: Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap(),
                },
            ],
        }
    }

    #[test]
    fn plain_body_lists_every_book() {
        let body = plain_body(&notice());
        assert!(body.starts_with("Dear Rita,"));
        assert!(body.contains("  - Dune (due 2024-06-10)"));
        assert!(body.contains("  - Pride & Prejudice (due 2024-06-12)"));
    }

    #[test]
    fn html_body_escapes_titles() {
        let body = html_body(&notice());
        assert!(body.contains("Pride &amp; Prejudice"));
    }

    #[test]
    fn subject_counts_books() {
        assert_eq!(subject(&notice()), "Overdue books reminder (2 books)");
    }

    #[test]
    fn builds_message_for_valid_addresses() {
        let mailer = SmtpMailer::new(EmailConfig::default());
        assert!(mailer.build_message(&notice()).is_ok());

        let mut bad = notice();
        bad.email = "not an address".into();
        assert!(matches!(mailer.build_message(&bad), Err(AppError::Email(_))));
    }
}
