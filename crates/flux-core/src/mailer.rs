//! Fire-and-forget assignment notifications via the Brevo transactional
//! email API. The mutation path never waits on a send; failures are
//! logged and dropped, never surfaced and never retried.

use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_content: Option<String>,
}

#[derive(Debug, Error)]
enum MailError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("send failed (status={0}): {1}")]
    Status(u16, String),
}

#[derive(Clone, Debug)]
pub struct Recipient {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct Mailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// `None` when the environment carries no mail credentials; callers
    /// then skip notifications entirely.
    pub fn from_env() -> Option<Self> {
        MailConfig::from_env().map(Self::new)
    }

    /// Spawn a send for a new task assignment and return immediately.
    pub fn notify_assignment(
        &self,
        to: Recipient,
        task_title: &str,
        board_name: &str,
        workspace_name: &str,
    ) {
        let subject = format!("You were assigned to \"{task_title}\"");
        let text = format!(
            "{name} assigned you a task.\n\nTask: {task_title}\nBoard: {board_name}\nWorkspace: {workspace_name}\n",
            name = workspace_name,
        );
        let html = format!(
            "<p>You were assigned to <strong>{task_title}</strong> on the \
             <strong>{board_name}</strong> board in <strong>{workspace_name}</strong>.</p>",
        );

        let mailer = self.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&to, &subject, Some(html), Some(text)).await {
                tracing::warn!(to = %to.email, error = %e, "assignment email failed (ignored)");
            }
        });
    }

    async fn send(
        &self,
        to: &Recipient,
        subject: &str,
        html: Option<String>,
        text: Option<String>,
    ) -> Result<(), MailError> {
        let body = BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.config.sender_email.clone(),
                name: self.config.sender_name.clone(),
            },
            to: vec![BrevoEmailAddress {
                email: to.email.clone(),
                name: to.name.clone(),
            }],
            subject: subject.to_string(),
            html_content: html,
            text_content: text,
        };

        let resp = self
            .client
            .post(&self.config.api_url)
            .header("api-key", &self.config.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = resp.text().await.unwrap_or_default();
        Err(MailError::Status(status.as_u16(), detail))
    }
}
