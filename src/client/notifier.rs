use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use url::Url;

use super::session::SessionAccessor;

const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Reconnecting client end of the change-notification channel.
///
/// State machine: connecting → open → (frames | error) → closed, looping
/// until `close`. One unit signal goes out on every transition into open —
/// frames may have been missed while disconnected, so a reconnect counts as
/// a change — and on every application-level frame received. Payloads are
/// never interpreted; the receiver's only move is a full re-list.
///
/// Transport errors are logged, not surfaced: the console only ever shows
/// the result of the next successful list.
pub struct ChangeNotifier {
    supervisor: JoinHandle<()>,
}

impl ChangeNotifier {
    pub fn connect(
        ws_url: impl Into<String>,
        session: Arc<dyn SessionAccessor>,
        signals: mpsc::Sender<()>,
    ) -> Self {
        let ws_url = ws_url.into();
        let supervisor = tokio::spawn(async move {
            let base = match Url::parse(&ws_url) {
                Ok(base) => base,
                Err(e) => {
                    warn!("Invalid change channel url {ws_url:?}: {e}");
                    return;
                }
            };
            let mut backoff = INITIAL_BACKOFF;
            loop {
                let url = channel_url(&base, &session.bearer_token());
                match connect_async(url.as_str()).await {
                    Ok((stream, _)) => {
                        debug!("Change channel open");
                        backoff = INITIAL_BACKOFF;
                        if signals.send(()).await.is_err() {
                            return;
                        }
                        let (_, mut frames) = stream.split();
                        while let Some(frame) = frames.next().await {
                            match frame {
                                Ok(Message::Close(_)) => break,
                                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                                Ok(_) => {
                                    if signals.send(()).await.is_err() {
                                        return;
                                    }
                                }
                                Err(e) => {
                                    warn!("Change channel error: {e}");
                                    break;
                                }
                            }
                        }
                        debug!("Change channel closed");
                    }
                    Err(e) => warn!("Change channel connect failed: {e}"),
                }

                let jitter_ms = rand::thread_rng().gen_range(0..=backoff.as_millis() as u64 / 4);
                tokio::time::sleep(backoff + Duration::from_millis(jitter_ms)).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        });

        Self { supervisor }
    }

    /// Tear down the channel. Aborting the supervisor kills the connection
    /// and any pending reconnect timer; no signal is sent after this.
    pub fn close(&self) {
        self.supervisor.abort();
    }
}

impl Drop for ChangeNotifier {
    fn drop(&mut self) {
        self.supervisor.abort();
    }
}

/// Attach the session token as a query pair, percent-encoding it so tokens
/// with reserved characters survive intact.
fn channel_url(base: &Url, token: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("token", token);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_with_reserved_characters_survive_url_building() {
        let base = Url::parse("ws://127.0.0.1:9/announcements/ws").unwrap();
        let url = channel_url(&base, "a&b#c%d");
        assert_eq!(url.query(), Some("token=a%26b%23c%25d"));
    }
}
