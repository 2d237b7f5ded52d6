//! Network layer for Murmur - HTTP API client and realtime WebSocket feed

use crate::error::{Error, Result};
use crate::models::*;
use crate::ClientConfig;
use futures::{SinkExt, StreamExt};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// HTTP API Client
// ============================================================================

/// Client for the remote social API. Every call is a single attempt; callers
/// decide how to degrade on failure.
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = Url::parse(&config.http_url())
            .map_err(|e| Error::Network(format!("invalid server address: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: config.access_token.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Network(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    /// Attachment URLs may be absolute or relative to the server.
    pub fn resolve(&self, reference: &str) -> Result<Url> {
        self.base_url
            .join(reference)
            .map_err(|e| Error::Network(format!("invalid media URL {}: {}", reference, e)))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
            });
        }
        Ok(resp.json().await?)
    }

    async fn expect_success(resp: Response, operation: &str) -> Result<()> {
        let ack: ApiAck = Self::decode(resp).await?;
        if ack.success {
            Ok(())
        } else {
            Err(Error::Rejected(operation.to_string()))
        }
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let resp = self
            .authorized(self.client.get(self.endpoint(segments)?))
            .send()
            .await?;
        Self::decode(resp).await
    }

    fn unwrap_envelope<T>(envelope: ApiEnvelope<T>, operation: &str) -> Result<T> {
        if envelope.success {
            Ok(envelope.data)
        } else {
            Err(Error::Rejected(operation.to_string()))
        }
    }

    // ============= Peers =============

    pub async fn get_following_users(&self) -> Result<Vec<Peer>> {
        let envelope = self.get(&["users", "following"]).await?;
        Self::unwrap_envelope(envelope, "getFollowingUsers")
    }

    pub async fn follow_user(&self, current_user_id: &str, target_user_id: &str) -> Result<()> {
        let resp = self
            .authorized(
                self.client
                    .post(self.endpoint(&["users", current_user_id, "follow", target_user_id])?),
            )
            .send()
            .await?;
        Self::expect_success(resp, "followUser").await
    }

    // ============= Search =============

    pub async fn get_search_results(&self, query: &str) -> Result<Vec<Peer>> {
        let resp = self
            .authorized(self.client.get(self.endpoint(&["search"])?))
            .query(&[("q", query)])
            .send()
            .await?;
        let envelope: ApiEnvelope<SearchResults> = Self::decode(resp).await?;
        Ok(envelope.data.users)
    }

    pub async fn get_search_history(&self) -> Result<Vec<HistoryEntry>> {
        let envelope: ApiEnvelope<Vec<HistoryEntry>> = self.get(&["search", "history"]).await?;
        Ok(envelope.data)
    }

    pub async fn add_to_search_history(&self, user_id: &str) -> Result<()> {
        let resp = self
            .authorized(self.client.post(self.endpoint(&["search", "history"])?))
            .json(&json!({ "userId": user_id }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Api {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }

    pub async fn delete_search_history_item(&self, history_id: &str) -> Result<()> {
        let resp = self
            .authorized(
                self.client
                    .delete(self.endpoint(&["search", "history", history_id])?),
            )
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Api {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }

    // ============= Notifications =============

    pub async fn get_notifications(&self) -> Result<Vec<Notification>> {
        let envelope: ApiEnvelope<Vec<Notification>> = self.get(&["notifications"]).await?;
        Ok(envelope.data)
    }

    pub async fn respond_to_follow_request(
        &self,
        request_id: &str,
        decision: FollowDecision,
    ) -> Result<()> {
        let resp = self
            .authorized(
                self.client
                    .post(self.endpoint(&["follow-requests", request_id])?),
            )
            .json(&json!({ "status": decision }))
            .send()
            .await?;
        Self::expect_success(resp, "respondToFollowRequest").await
    }

    // ============= Messages =============

    pub async fn get_messages(&self, peer_id: &str) -> Result<Vec<Message>> {
        let envelope = self.get(&["messages", peer_id]).await?;
        Self::unwrap_envelope(envelope, "getMessages")
    }

    pub async fn send_message(&self, peer_id: &str, text: &str) -> Result<Message> {
        let resp = self
            .authorized(self.client.post(self.endpoint(&["messages", peer_id])?))
            .json(&json!({ "text": text }))
            .send()
            .await?;
        let envelope: ApiEnvelope<Message> = Self::decode(resp).await?;
        Self::unwrap_envelope(envelope, "sendMessage")
    }

    // ============= Media =============

    pub async fn fetch_bytes(&self, reference: &str) -> Result<Vec<u8>> {
        let resp = self
            .authorized(self.client.get(self.resolve(reference)?))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Error::Api {
                status: resp.status().as_u16(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

/// Run a non-critical call in the background.
///
/// Best effort: the task is detached, nobody awaits it, and a failure is
/// only logged. Used for refreshes that must not hold up navigation, such as
/// recording a search history entry.
pub fn spawn_best_effort<F>(label: &'static str, task: F) -> JoinHandle<()>
where
    F: Future<Output = Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = task.await {
            log::warn!("Background {} failed: {}", label, e);
        }
    })
}

// ============================================================================
// Realtime feed
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    Connected,
    Disconnected,
    Presence { user_id: String, online: bool },
    Message { peer_id: String, message: Message },
    Receipt(ReceiptUpdate),
    Notification(Notification),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresencePayload {
    user_id: String,
    online: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePayload {
    peer_id: String,
    message: Message,
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
enum Frame {
    Presence(PresencePayload),
    Message(MessagePayload),
    Receipt(ReceiptUpdate),
    Notification(Notification),
}

/// Decode one text frame. Unknown or malformed frames are skipped.
pub fn decode_frame(text: &str) -> Option<RealtimeEvent> {
    let frame = match serde_json::from_str::<Frame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            log::debug!("Skipping realtime frame: {}", e);
            return None;
        }
    };

    Some(match frame {
        Frame::Presence(p) => RealtimeEvent::Presence {
            user_id: p.user_id,
            online: p.online,
        },
        Frame::Message(m) => RealtimeEvent::Message {
            peer_id: m.peer_id,
            message: m.message,
        },
        Frame::Receipt(r) => RealtimeEvent::Receipt(r),
        Frame::Notification(n) => RealtimeEvent::Notification(n),
    })
}

/// Live connection to the realtime feed. Dropping it closes the feed.
pub struct RealtimeClient {
    reader: JoinHandle<()>,
}

impl RealtimeClient {
    pub async fn connect(
        config: &ClientConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RealtimeEvent>)> {
        let (ws_stream, _) = connect_async(config.ws_url()).await?;
        let (mut write, mut read) = ws_stream.split();

        if let Some(token) = &config.access_token {
            let auth_msg = json!({
                "type": "authenticate",
                "payload": { "token": token }
            });
            write.send(WsMessage::Text(auth_msg.to_string())).await?;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(RealtimeEvent::Connected);

        let reader = tokio::spawn(async move {
            // Keep the write half alive for the lifetime of the connection.
            let _write = write;
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(WsMessage::Text(text)) => {
                        if let Some(event) = decode_frame(&text) {
                            if tx.send(event).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(WsMessage::Close(_)) => break,
                    Err(e) => {
                        log::warn!("Realtime connection error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
            let _ = tx.send(RealtimeEvent::Disconnected);
        });

        Ok((Self { reader }, rx))
    }
}

impl Drop for RealtimeClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&ClientConfig::new("api.example.org", 8443, true)).unwrap()
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let url = client().endpoint(&["search", "history", "a/b c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.org:8443/api/v1/search/history/a%2Fb%20c"
        );
    }

    #[test]
    fn test_resolve_relative_and_absolute_media() {
        let api = client();
        assert_eq!(
            api.resolve("/uploads/cat.png").unwrap().as_str(),
            "https://api.example.org:8443/uploads/cat.png"
        );
        assert_eq!(
            api.resolve("https://cdn.example.org/x.pdf").unwrap().as_str(),
            "https://cdn.example.org/x.pdf"
        );
    }

    #[test]
    fn test_decode_frames() {
        let presence = decode_frame(r#"{"type":"presence","payload":{"userId":"u2","online":true}}"#);
        assert_eq!(
            presence,
            Some(RealtimeEvent::Presence {
                user_id: "u2".into(),
                online: true
            })
        );

        let message = decode_frame(
            r#"{"type":"message","payload":{"peerId":"u2","message":{"id":"m1","senderId":"u2","text":"yo","sentAt":"2024-01-01T00:00:00Z"}}}"#,
        );
        match message {
            Some(RealtimeEvent::Message { peer_id, message }) => {
                assert_eq!(peer_id, "u2");
                assert_eq!(message.text, "yo");
            }
            other => panic!("unexpected {:?}", other),
        }

        let receipt = decode_frame(
            r#"{"type":"receipt","payload":{"peerId":"u2","messageId":"m1","readAt":"2024-01-01T00:01:00Z"}}"#,
        );
        assert!(matches!(receipt, Some(RealtimeEvent::Receipt(r)) if r.read_at.is_some()));

        assert_eq!(decode_frame(r#"{"type":"typing","payload":{}}"#), None);
        assert_eq!(decode_frame("not json"), None);
    }

    #[test]
    fn test_envelope_failure_is_rejected() {
        let envelope = ApiEnvelope {
            success: false,
            data: Vec::<Peer>::new(),
        };
        let err = ApiClient::unwrap_envelope(envelope, "getFollowingUsers").unwrap_err();
        assert!(err.is_network_failure());
    }

    #[tokio::test]
    async fn test_best_effort_swallows_errors() {
        let handle = spawn_best_effort("history update", async {
            Err(Error::Api { status: 500 })
        });
        assert!(handle.await.is_ok());
    }
}
