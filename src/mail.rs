use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::auth::repo::User;

/// Transactional mail templates.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MailKind {
    Welcome,
    PasswordReset,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, kind: MailKind, user: &User, url: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct MailMessage<'a> {
    from: &'a str,
    to: &'a str,
    template: MailKind,
    name: &'a str,
    url: &'a str,
}

/// Posts mail messages to an HTTP relay service.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, kind: MailKind, user: &User, url: &str) -> anyhow::Result<()> {
        let message = MailMessage {
            from: &self.from,
            to: &user.email,
            template: kind,
            name: &user.name,
            url,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&message)
            .send()
            .await
            .context("mail relay unreachable")?;
        if !response.status().is_success() {
            anyhow::bail!("mail relay rejected message: {}", response.status());
        }
        info!(to = %user.email, kind = ?kind, "mail sent");
        Ok(())
    }
}

/// Stands in when no relay is configured; logs and succeeds.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, kind: MailKind, user: &User, url: &str) -> anyhow::Result<()> {
        info!(to = %user.email, kind = ?kind, %url, "mail suppressed (no relay configured)");
        Ok(())
    }
}
