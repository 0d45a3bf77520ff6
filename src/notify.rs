use crate::driver::BatchResult;
use chrono::{DateTime, Utc};
use init4_bin_base::deps::tracing::{debug, warn};
use serde_json::json;

/// Base URL of the Telegram bot API.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// A best-effort sink for run reports.
///
/// Implementations never fail: delivery problems are logged and dropped.
pub trait Notifier {
    /// Deliver an HTML formatted message.
    fn notify(&self, text: &str) -> impl Future<Output = ()> + Send;
}

/// Notifier that discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    async fn notify(&self, _text: &str) {}
}

#[derive(Debug, Clone)]
struct TelegramTarget {
    token: String,
    chat_id: String,
}

/// Posts messages to a Telegram chat through the bot API `sendMessage` method.
///
/// Without both a token and a chat id the notifier is disabled and
/// [`Notifier::notify`] returns immediately without any HTTP call.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    target: Option<TelegramTarget>,
}

impl TelegramNotifier {
    /// Create a notifier. Missing or empty credentials disable it.
    pub fn new(token: Option<String>, chat_id: Option<String>) -> eyre::Result<Self> {
        let client = reqwest::ClientBuilder::new().use_rustls_tls().build()?;

        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        let target = match (non_empty(token), non_empty(chat_id)) {
            (Some(token), Some(chat_id)) => Some(TelegramTarget { token, chat_id }),
            _ => None,
        };
        debug!(enabled = target.is_some(), "telegram notifications");

        Ok(Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
            target,
        })
    }

    /// Point the notifier at a different bot API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Whether credentials were supplied.
    pub const fn is_configured(&self) -> bool {
        self.target.is_some()
    }
}

impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) {
        let Some(target) = &self.target else {
            return;
        };

        let url = format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            target.token
        );
        let payload = json!({
            "chat_id": target.chat_id,
            "text": text,
            "parse_mode": "HTML",
        });

        let result = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(_) => debug!("notification delivered"),
            // the request URL carries the bot token
            Err(error) => warn!(
                error = %error.without_url(),
                "failed to send telegram message"
            ),
        }
    }
}

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Summary sent once a batch has finished.
pub fn batch_report(wallets: usize, result: BatchResult, at: DateTime<Utc>) -> String {
    format!(
        "✅ <b>Transfer Report</b> ✅\n\n\
         <b>Time:</b> {}\n\n\
         📊 <b>Results:</b>\n\
         - Wallets processed: <code>{wallets}</code>\n\
         - Successful transfers: <code>{}</code>\n\
         - Failed transfers: <code>{}</code>",
        at.format("%Y-%m-%d %H:%M:%S UTC"),
        result.success,
        result.failed,
    )
}

/// Message sent when the run aborts.
pub fn fatal_report(error: &str) -> String {
    format!(
        "❌ <b>FATAL ERROR!</b> ❌\nBot stopped. Error:\n<code>{}</code>",
        escape_html(error)
    )
}
