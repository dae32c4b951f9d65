//! Thin Bot API gateway: long-polls for text messages and delivers the
//! controller's reply values. Everything else about the chat transport
//! stays on this side of the seam.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::multipart::Form;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::controller::{Markup, Reply};
use crate::http_client::http_client;

const API_BASE: &str = "https://api.telegram.org";

/// Server-side wait of the long poll. The per-request client timeout is set
/// above this so the server answers first.
const POLL_WAIT_SECS: u64 = 25;
const POLL_TIMEOUT_SLACK_SECS: u64 = 10;

/// One text message somebody sent the bot.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub update_id: i64,
    pub chat_id: i64,
    pub text: String,
}

pub struct TelegramGateway {
    token: String,
}

#[derive(Debug, Deserialize)]
struct UpdatesEnvelope {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

impl TelegramGateway {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token)
    }

    /// Find the offset just past the newest queued update without handling
    /// any of it, so a restart does not replay a backlog of old messages.
    /// Returns 0 when the queue is empty.
    pub fn skip_pending(&self) -> Result<i64> {
        let client = http_client()?;
        let resp = client
            .get(self.url("getUpdates"))
            .query(&[("offset", "-1".to_string()), ("timeout", "0".to_string())])
            .send()
            .context("getUpdates request failed")?;
        let envelope: UpdatesEnvelope = resp.json().context("getUpdates decode failed")?;
        if !envelope.ok {
            bail!(
                "getUpdates rejected: {}",
                envelope.description.unwrap_or_default()
            );
        }
        Ok(envelope
            .result
            .iter()
            .map(|update| update.update_id + 1)
            .max()
            .unwrap_or(0))
    }

    /// Long-poll for updates. The offset is advanced past every update seen,
    /// text or not, so nothing is delivered twice and non-text updates are
    /// dropped on the floor.
    pub fn poll(&self, offset: &mut i64) -> Result<Vec<Incoming>> {
        let client = http_client()?;
        let resp = client
            .get(self.url("getUpdates"))
            .timeout(Duration::from_secs(POLL_WAIT_SECS + POLL_TIMEOUT_SLACK_SECS))
            .query(&[
                ("timeout", POLL_WAIT_SECS.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .context("getUpdates request failed")?;
        let envelope: UpdatesEnvelope = resp.json().context("getUpdates decode failed")?;
        if !envelope.ok {
            bail!(
                "getUpdates rejected: {}",
                envelope.description.unwrap_or_default()
            );
        }

        let mut incoming = Vec::new();
        for update in envelope.result {
            *offset = (*offset).max(update.update_id + 1);
            let Some(message) = update.message else {
                continue;
            };
            let Some(text) = message.text else {
                continue;
            };
            incoming.push(Incoming {
                update_id: update.update_id,
                chat_id: message.chat.id,
                text,
            });
        }
        Ok(incoming)
    }

    pub fn deliver(&self, chat_id: i64, reply: &Reply) -> Result<()> {
        match reply {
            Reply::Text { body, markup } => self.send_text(chat_id, body, markup),
            Reply::Photo { path } => self.send_photo(chat_id, path),
        }
    }

    fn send_text(&self, chat_id: i64, body: &str, markup: &Markup) -> Result<()> {
        let client = http_client()?;
        let mut payload = json!({ "chat_id": chat_id, "text": body });
        if let Some(value) = reply_markup(markup) {
            payload["reply_markup"] = value;
        }
        let resp = client
            .post(self.url("sendMessage"))
            .json(&payload)
            .send()
            .context("sendMessage request failed")?;
        check_response(resp, "sendMessage")
    }

    fn send_photo(&self, chat_id: i64, path: &Path) -> Result<()> {
        let client = http_client()?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .file("photo", path)
            .with_context(|| format!("attach {}", path.display()))?;
        let resp = client
            .post(self.url("sendPhoto"))
            .multipart(form)
            .send()
            .context("sendPhoto request failed")?;
        check_response(resp, "sendPhoto")
    }
}

fn check_response(resp: reqwest::blocking::Response, method: &str) -> Result<()> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().unwrap_or_default();
    let snippet: String = body.trim().replace('\n', " ").chars().take(220).collect();
    bail!("{method} failed: http {status}: {snippet}")
}

/// Custom keyboards render one button per row, sized to content; `Clear`
/// removes whatever keyboard is showing. `None` sends no markup at all.
fn reply_markup(markup: &Markup) -> Option<Value> {
    match markup {
        Markup::None => None,
        Markup::Clear => Some(json!({ "remove_keyboard": true })),
        Markup::Keyboard(labels) => {
            let keyboard: Vec<Vec<Value>> = labels
                .iter()
                .map(|label| vec![json!({ "text": label })])
                .collect();
            Some(json!({ "keyboard": keyboard, "resize_keyboard": true }))
        }
    }
}
