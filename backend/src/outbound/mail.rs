//! Reqwest-backed transactional mail adapter.
//!
//! Renders the domain's notifications into plain-text emails and posts them to
//! an HTTP mail API with a bearer key. Rendering is pure so templates can be
//! tested without a network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::domain::ports::{Mailer, MailerError, Notification};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection settings for the mail API.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Send endpoint of the mail API.
    pub endpoint: Url,
    /// Bearer key for the mail API.
    pub api_key: String,
    /// Sender address on every email.
    pub from: String,
}

/// Mail adapter posting one JSON request per send.
pub struct HttpMailer {
    client: Client,
    endpoint: Url,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct SendBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// A notification rendered to a deliverable email.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderedMail {
    to: String,
    subject: String,
    text: String,
}

fn render(notification: &Notification) -> RenderedMail {
    match notification {
        Notification::Welcome { to, name, username } => RenderedMail {
            to: to.clone(),
            subject: "Welcome to the hostel".into(),
            text: format!(
                "Hi {name},\n\n\
                 Your hostel account has been created. Log in with the \
                 username \"{username}\" to view and pay your monthly fees.\n\n\
                 Hostel Management"
            ),
        },
        Notification::Credentials {
            to,
            name,
            username,
            password,
        } => RenderedMail {
            to: to.clone(),
            subject: "Your hostel account details".into(),
            text: format!(
                "Hi {name},\n\n\
                 An account has been created for you.\n\n\
                 Username: {username}\n\
                 Password: {password}\n\n\
                 Please change your password after your first login.\n\n\
                 Hostel Management"
            ),
        },
        Notification::PaymentConfirmation {
            to,
            name,
            period,
            amount,
        } => RenderedMail {
            to: to.clone(),
            subject: format!("Payment received for {period}"),
            text: format!(
                "Hi {name},\n\n\
                 We have received your fee payment of {amount} for {period}. \
                 Thank you.\n\n\
                 Hostel Management"
            ),
        },
        Notification::PaymentReminder {
            to,
            name,
            period,
            amount,
        } => RenderedMail {
            to: to.clone(),
            subject: format!("Fee reminder for {period}"),
            text: format!(
                "Hi {name},\n\n\
                 Your hostel fee of {amount} for {period} is still due. \
                 Please pay at your earliest convenience.\n\n\
                 Hostel Management"
            ),
        },
    }
}

impl HttpMailer {
    /// Build an adapter with the default request timeout.
    pub fn new(config: MailConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            from: config.from,
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, notification: Notification) -> Result<(), MailerError> {
        let mail = render(&notification);
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&SendBody {
                from: &self.from,
                to: &mail.to,
                subject: &mail.subject,
                text: &mail.text,
            })
            .send()
            .await
            .map_err(|e| MailerError::transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(MailerError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeePeriod;

    fn period() -> FeePeriod {
        FeePeriod::try_new(3, 2024).expect("valid period")
    }

    #[test]
    fn welcome_addresses_the_recipient_by_name() {
        let mail = render(&Notification::Welcome {
            to: "asha@example.com".into(),
            name: "Asha Rao".into(),
            username: "asha".into(),
        });
        assert_eq!(mail.to, "asha@example.com");
        assert!(mail.text.contains("Hi Asha Rao"));
        assert!(mail.text.contains("\"asha\""));
    }

    #[test]
    fn credentials_include_the_issued_password() {
        let mail = render(&Notification::Credentials {
            to: "bela@example.com".into(),
            name: "Bela Shah".into(),
            username: "bela".into(),
            password: "secret-pass".into(),
        });
        assert!(mail.text.contains("Username: bela"));
        assert!(mail.text.contains("Password: secret-pass"));
    }

    #[test]
    fn confirmation_names_the_period_in_the_subject() {
        let mail = render(&Notification::PaymentConfirmation {
            to: "asha@example.com".into(),
            name: "Asha Rao".into(),
            period: period(),
            amount: 500,
        });
        assert_eq!(mail.subject, "Payment received for March 2024");
        assert!(mail.text.contains("500"));
    }

    #[test]
    fn reminder_states_the_outstanding_amount_and_period() {
        let mail = render(&Notification::PaymentReminder {
            to: "asha@example.com".into(),
            name: "Asha Rao".into(),
            period: period(),
            amount: 500,
        });
        assert_eq!(mail.subject, "Fee reminder for March 2024");
        assert!(mail.text.contains("500"));
        assert!(mail.text.contains("March 2024"));
    }
}
