//! Transactional email delivery.
//!
//! Email is a best-effort side effect of registration and merchandise
//! purchase. Two providers are supported: `console` logs the message for
//! development, `smtp` delivers through lettre. A disabled service, or the
//! smtp provider without credentials, no-ops successfully so that
//! registrations never fail because of mail.

use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::EmailConfig;

/// Errors that can occur during email delivery.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Failed to connect to SMTP relay: {0}")]
    Transport(String),

    #[error("Failed to send email: {0}")]
    SendFailed(String),
}

/// Email message to be sent.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
}

/// One line of a purchase confirmation.
#[derive(Debug, Clone)]
pub struct PurchaseEmailLine {
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    config: Arc<EmailConfig>,
}

impl EmailService {
    /// Creates a new EmailService with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Send an email message.
    pub async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        if !self.config.enabled {
            debug!(
                to = %message.to,
                subject = %message.subject,
                "Email disabled, skipping send"
            );
            return Ok(());
        }

        match self.config.provider.as_str() {
            "smtp" => self.send_smtp(message).await,
            "console" => {
                self.send_console(&message);
                Ok(())
            }
            other => {
                warn!(provider = %other, "Unknown email provider, skipping send");
                Ok(())
            }
        }
    }

    /// Send the ticket confirmation after a successful registration.
    pub async fn send_ticket_confirmation(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        event_name: &str,
        ticket_code: &str,
    ) -> Result<(), EmailError> {
        let greeting = to_name.map(|n| format!(" {}", n)).unwrap_or_default();
        let ticket_url = format!("{}/tickets/{}", self.config.base_url, ticket_code);

        let body_text = format!(
            "Hi{greeting},\n\n\
             You are registered for {event_name}.\n\n\
             Your ticket code is {ticket_code}. Show the QR code on your ticket \
             page at the entrance:\n{ticket_url}\n\n\
             See you there,\n{sender}",
            sender = self.config.sender_name,
        );

        let body_html = format!(
            "<p>Hi{greeting},</p>\
             <p>You are registered for <strong>{event_name}</strong>.</p>\
             <p>Your ticket code is <strong>{ticket_code}</strong>. Show the QR \
             code on your <a href=\"{ticket_url}\">ticket page</a> at the \
             entrance.</p>\
             <p>See you there,<br>{sender}</p>",
            sender = self.config.sender_name,
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: to_name.map(String::from),
            subject: format!("Your ticket for {}", event_name),
            body_text,
            body_html,
        })
        .await
    }

    /// Send the order confirmation after a merchandise purchase.
    pub async fn send_purchase_confirmation(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        event_name: &str,
        lines: &[PurchaseEmailLine],
        total: Decimal,
    ) -> Result<(), EmailError> {
        let greeting = to_name.map(|n| format!(" {}", n)).unwrap_or_default();

        let text_lines: String = lines
            .iter()
            .map(|l| format!("  {} x{} @ {}\n", l.item_name, l.quantity, l.unit_price))
            .collect();
        let html_lines: String = lines
            .iter()
            .map(|l| {
                format!(
                    "<li>{} &times;{} @ {}</li>",
                    l.item_name, l.quantity, l.unit_price
                )
            })
            .collect();

        let body_text = format!(
            "Hi{greeting},\n\n\
             Your merchandise order for {event_name} is confirmed:\n\n\
             {text_lines}\n\
             Total: {total}\n\n\
             Payment is collected at pickup.\n\n\
             Thanks,\n{sender}",
            sender = self.config.sender_name,
        );

        let body_html = format!(
            "<p>Hi{greeting},</p>\
             <p>Your merchandise order for <strong>{event_name}</strong> is \
             confirmed:</p>\
             <ul>{html_lines}</ul>\
             <p>Total: <strong>{total}</strong></p>\
             <p>Payment is collected at pickup.</p>\
             <p>Thanks,<br>{sender}</p>",
            sender = self.config.sender_name,
        );

        self.send(EmailMessage {
            to: to_email.to_string(),
            to_name: to_name.map(String::from),
            subject: format!("Order confirmation for {}", event_name),
            body_text,
            body_html,
        })
        .await
    }

    fn send_console(&self, message: &EmailMessage) {
        info!(
            to = %message.to,
            to_name = ?message.to_name,
            subject = %message.subject,
            from = %self.config.sender_email,
            body = %message.body_text,
            "Email (console provider)"
        );
    }

    async fn send_smtp(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.config.smtp_host.is_empty() || self.config.smtp_username.is_empty() {
            warn!(
                to = %message.to,
                subject = %message.subject,
                "SMTP credentials absent, skipping send"
            );
            return Ok(());
        }

        let from: Mailbox = format!("{} <{}>", self.config.sender_name, self.config.sender_email)
            .parse()
            .map_err(|e| EmailError::InvalidAddress(format!("sender: {}", e)))?;

        let to: Mailbox = match &message.to_name {
            Some(name) => format!("{} <{}>", name, message.to),
            None => message.to.clone(),
        }
        .parse()
        .map_err(|e| EmailError::InvalidAddress(format!("recipient: {}", e)))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(&message.subject)
            .multipart(MultiPart::alternative_plain_html(
                message.body_text.clone(),
                message.body_html.clone(),
            ))
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        let builder = if self.config.smtp_use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .map_err(|e| EmailError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_host)
        };

        let transport = builder
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ))
            .build();

        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        info!(
            to = %message.to,
            subject = %message.subject,
            "Email sent via SMTP"
        );
        Ok(())
    }
}
