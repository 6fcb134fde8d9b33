//! Discord webhook notifications for scan events.
//!
//! Everything here is fire-and-forget: a failed webhook is logged and
//! never propagated, so notification problems cannot break a scan.

use tracing::warn;

/// At most this many names are listed per embed.
const LIST_LIMIT: usize = 10;

const COLOR_SUCCESS: u32 = 0x00FF00;
const COLOR_INFO: u32 = 0x3498DB;
const COLOR_REMOVED: u32 = 0xE74C3C;
const COLOR_ERROR: u32 = 0xFF0000;

/// Discord webhook notifier. Disabled when no URL is configured.
pub struct Notifier {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl Notifier {
    /// Creates a notifier; a blank URL disables it.
    pub fn new(webhook_url: Option<String>) -> Self {
        let webhook_url = webhook_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        Self {
            http: reqwest::Client::new(),
            webhook_url,
        }
    }

    /// A notifier that never sends anything.
    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    async fn post(&self, payload: serde_json::Value) {
        let Some(url) = &self.webhook_url else {
            return;
        };
        match self.http.post(url).json(&payload).send().await {
            Ok(resp) if resp.status().is_client_error() || resp.status().is_server_error() => {
                warn!(status = %resp.status(), "Discord webhook rejected");
            }
            Ok(_) => {}
            Err(e) => warn!("Discord webhook error: {e}"),
        }
    }

    async fn post_embed(&self, title: &str, description: String, color: u32) {
        self.post(serde_json::json!({
            "embeds": [{
                "title": title,
                "description": description,
                "color": color,
            }]
        }))
        .await;
    }

    pub async fn scan_started(&self) {
        self.post(serde_json::json!({"content": "gogshelf: scan started."}))
            .await;
    }

    pub async fn scan_finished(&self, added: usize, removed: usize, changed: usize, total: usize) {
        let desc =
            format!("Total: {total} | Added: {added} | Removed: {removed} | Updated: {changed}");
        self.post_embed("Scan finished", desc, COLOR_SUCCESS).await;
    }

    pub async fn new_games(&self, names: &[String]) {
        if names.is_empty() {
            return;
        }
        self.post_embed("New games detected", bullet_list(names, LIST_LIMIT), COLOR_INFO)
            .await;
    }

    pub async fn games_removed(&self, keys: &[String]) {
        if keys.is_empty() {
            return;
        }
        self.post_embed(
            "Games removed (installer no longer found)",
            bullet_list(keys, LIST_LIMIT),
            COLOR_REMOVED,
        )
        .await;
    }

    pub async fn error(&self, message: &str, detail: &str) {
        let desc = if detail.is_empty() {
            message.to_string()
        } else {
            format!("{message}\n{detail}")
        };
        self.post_embed("gogshelf error", desc, COLOR_ERROR).await;
    }
}

/// Bullet list of up to `limit` items, with an "and N more" tail.
fn bullet_list(items: &[String], limit: usize) -> String {
    let mut out: String = items
        .iter()
        .take(limit)
        .map(|n| format!("\u{2022} {n}"))
        .collect::<Vec<_>>()
        .join("\n");
    if items.len() > limit {
        out.push_str(&format!(" and {} more", items.len() - limit));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_url_disables_notifier() {
        assert!(!Notifier::new(None).is_enabled());
        assert!(!Notifier::new(Some("   ".into())).is_enabled());
        assert!(Notifier::new(Some("https://discord.example/hook".into())).is_enabled());
    }

    #[test]
    fn bullet_list_truncates_with_tail() {
        let items: Vec<String> = (1..=12).map(|i| format!("Game {i}")).collect();
        let list = bullet_list(&items, 10);
        assert!(list.contains("\u{2022} Game 1"));
        assert!(list.contains("\u{2022} Game 10"));
        assert!(!list.contains("Game 11"));
        assert!(list.ends_with("and 2 more"));
    }

    #[test]
    fn bullet_list_short_has_no_tail() {
        let items = vec!["A".to_string(), "B".to_string()];
        assert_eq!(bullet_list(&items, 10), "\u{2022} A\n\u{2022} B");
    }

    #[tokio::test]
    async fn disabled_notifier_is_a_no_op() {
        // Would panic the runtime with a connection error if it tried to send.
        let n = Notifier::disabled();
        n.scan_started().await;
        n.scan_finished(1, 2, 0, 3).await;
        n.new_games(&["X".into()]).await;
        n.games_removed(&["Y".into()]).await;
        n.error("boom", "detail").await;
    }
}
