//! Event-stream sessions.
//!
//! A session is created when a client opens the event stream and destroyed
//! when that stream goes away. It owns one inbound channel (messages POSTed
//! by the client) and one outbound channel (events pushed to the stream).
//! The [`SessionPump`] between them feeds the MCP service one message at a
//! time and, for requests, waits for the matching response before taking the
//! next message, so a session's responses arrive in submission order.
//! Requests the service could not decode are answered by the pump itself
//! with a JSON-RPC error instead of being forwarded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rmcp::model::{
    ClientJsonRpcMessage, ErrorCode, ErrorData, JsonRpcError, JsonRpcVersion2_0, RequestId,
};
use serde_json::Value;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines, ReadHalf,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::{TransportError, TransportResult};

/// Identifier carried in the message path's `sessionId` parameter.
pub type SessionId = String;

/// Pending inbound messages per session.
pub const INBOUND_CAPACITY: usize = 32;

/// Pending outbound events per session.
pub const OUTBOUND_CAPACITY: usize = 32;

// ============================================================================
// Routing table
// ============================================================================

/// Maps open session ids to their inbound channel.
///
/// This is the only structure shared between sessions; it carries no
/// per-call state.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, mpsc::Sender<String>>>,
    closed: AtomicBool,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<SessionId, mpsc::Sender<String>>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new session. Returns `None` once [`close_all`](Self::close_all)
    /// has been called.
    pub fn open(&self) -> Option<(SessionId, mpsc::Receiver<String>)> {
        let mut table = self.table();
        if self.closed.load(Ordering::SeqCst) {
            return None;
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        let (tx, rx) = mpsc::channel(INBOUND_CAPACITY);
        table.insert(id.clone(), tx);
        Some((id, rx))
    }

    /// Inbound sender of an open session.
    pub fn sender(&self, id: &str) -> Option<mpsc::Sender<String>> {
        self.table().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> bool {
        self.table().remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    pub fn is_accepting(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    /// Stop accepting sessions and close every inbound channel.
    ///
    /// Pumps finish the request they are waiting on, then end their stream.
    /// Returns the number of sessions closed.
    pub fn close_all(&self) -> usize {
        let mut table = self.table();
        self.closed.store(true, Ordering::SeqCst);
        let count = table.len();
        table.clear();
        count
    }
}

/// Removes its session from the registry when dropped.
///
/// Owned by the event stream, so the session lives exactly as long as the
/// client's connection.
#[derive(Debug)]
pub struct SessionGuard {
    id: SessionId,
    registry: Arc<SessionRegistry>,
}

impl SessionGuard {
    pub fn new(id: SessionId, registry: Arc<SessionRegistry>) -> Self {
        Self { id, registry }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.registry.remove(&self.id) {
            info!(session = %self.id, "SSE session closed");
        }
    }
}

// ============================================================================
// Pump
// ============================================================================

/// Id of a JSON-RPC request, or `None` for notifications, responses and
/// anything unparseable.
pub fn request_id(message: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(message).ok()?;
    let object = value.as_object()?;
    object.get("method")?;
    object.get("id").filter(|id| !id.is_null()).cloned()
}

/// Whether `line` is the response to request `id`.
pub fn is_response_to(line: &str, id: &Value) -> bool {
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return false;
    };
    let Some(object) = value.as_object() else {
        return false;
    };

    object.get("method").is_none()
        && object.get("id") == Some(id)
        && (object.contains_key("result") || object.contains_key("error"))
}

/// How the pump treats one inbound message.
#[derive(Debug, PartialEq)]
pub enum Inbound {
    /// Hand it to the service, waiting for the response when it carries a
    /// request id.
    Forward(Option<Value>),
    /// Keep it from the service. Holds the error reply when the message
    /// had an id to answer.
    Reject(Option<String>),
}

/// Request methods a client may send to this server.
fn is_client_request_method(method: &str) -> bool {
    matches!(
        method,
        "initialize"
            | "ping"
            | "completion/complete"
            | "logging/setLevel"
            | "prompts/get"
            | "prompts/list"
            | "resources/list"
            | "resources/templates/list"
            | "resources/read"
            | "resources/subscribe"
            | "resources/unsubscribe"
            | "tools/call"
            | "tools/list"
    )
}

/// Decode `message` the way the MCP service will.
///
/// rmcp reads anything with a method it cannot type as a notification and
/// drops the id, so a request either decodes as a request or is rejected.
pub fn classify(message: &str) -> Inbound {
    let decoded = serde_json::from_str::<ClientJsonRpcMessage>(message);
    match (decoded, request_id(message)) {
        (Ok(ClientJsonRpcMessage::Request(_)), Some(id)) => Inbound::Forward(Some(id)),
        (Ok(_), None) => Inbound::Forward(None),
        (_, Some(id)) => Inbound::Reject(error_reply(message, id)),
        (Err(_), None) => Inbound::Reject(None),
    }
}

fn error_reply(message: &str, id: Value) -> Option<String> {
    let id: RequestId = serde_json::from_value(id).ok()?;
    let method = serde_json::from_str::<Value>(message)
        .ok()
        .and_then(|v| v.get("method").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_default();

    let error = if is_client_request_method(&method) {
        ErrorData::invalid_params(format!("Invalid params for {}", method), None)
    } else {
        ErrorData::new(
            ErrorCode::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
            None,
        )
    };

    serde_json::to_string(&JsonRpcError {
        jsonrpc: JsonRpcVersion2_0,
        id,
        error,
    })
    .ok()
}

enum Wait {
    Answered,
    ServiceClosed,
}

/// Moves messages between a session's channels and its MCP service.
pub struct SessionPump<T> {
    id: SessionId,
    io: T,
    inbound: mpsc::Receiver<String>,
    outbound: mpsc::Sender<String>,
    response_timeout: Duration,
    _done: oneshot::Sender<()>,
}

impl<T> SessionPump<T>
where
    T: AsyncRead + AsyncWrite + Send + 'static,
{
    /// `io` is the session end of the pipe the MCP service is served over.
    /// `done` resolves on the other side when the pump exits.
    pub fn new(
        id: SessionId,
        io: T,
        inbound: mpsc::Receiver<String>,
        outbound: mpsc::Sender<String>,
        response_timeout: Duration,
        done: oneshot::Sender<()>,
    ) -> Self {
        Self {
            id,
            io,
            inbound,
            outbound,
            response_timeout,
            _done: done,
        }
    }

    /// Run until the client disconnects, the inbound channel closes, or the
    /// service ends.
    pub async fn run(self) -> TransportResult<()> {
        let Self {
            id,
            io,
            mut inbound,
            outbound,
            response_timeout,
            _done,
        } = self;

        let (reader, mut writer) = tokio::io::split(io);
        let mut lines = BufReader::new(reader).lines();

        loop {
            tokio::select! {
                message = inbound.recv() => {
                    let Some(message) = message else {
                        debug!(session = %id, "Inbound channel closed");
                        break;
                    };

                    let request = match classify(&message) {
                        Inbound::Forward(request) => request,
                        Inbound::Reject(reply) => {
                            warn!(session = %id, "Rejected undecodable message");
                            let Some(reply) = reply else {
                                continue;
                            };
                            if outbound.send(reply).await.is_err() {
                                break;
                            }
                            continue;
                        }
                    };

                    writer.write_all(message.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                    writer.flush().await?;

                    let Some(request) = request else {
                        continue;
                    };

                    let wait = await_response(&mut lines, &outbound, &request);
                    match tokio::time::timeout(response_timeout, wait).await {
                        Ok(Ok(Wait::Answered)) => {}
                        Ok(Ok(Wait::ServiceClosed)) => break,
                        Ok(Err(e)) => {
                            debug!(session = %id, "Stopping pump: {}", e);
                            break;
                        }
                        Err(_) => warn!(
                            session = %id,
                            "No response to request {} within {:?}",
                            request, response_timeout
                        ),
                    }
                }
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            if outbound.send(line).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = outbound.closed() => {
                    debug!(session = %id, "Client disconnected");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Forward service output until the response to `id` has been forwarded.
async fn await_response<R>(
    lines: &mut Lines<BufReader<ReadHalf<R>>>,
    outbound: &mpsc::Sender<String>,
    id: &Value,
) -> TransportResult<Wait>
where
    R: AsyncRead,
{
    loop {
        let Some(line) = lines.next_line().await? else {
            return Ok(Wait::ServiceClosed);
        };
        let answered = is_response_to(&line, id);
        outbound
            .send(line)
            .await
            .map_err(|_| TransportError::session_closed("event stream dropped"))?;
        if answered {
            return Ok(Wait::Answered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_id() {
        assert_eq!(
            request_id(r#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#),
            Some(json!(7))
        );
        assert_eq!(
            request_id(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#),
            None
        );
        assert_eq!(request_id(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#), None);
        assert_eq!(request_id("not json"), None);
    }

    #[test]
    fn test_is_response_to() {
        let id = json!("abc");
        assert!(is_response_to(r#"{"jsonrpc":"2.0","id":"abc","result":{}}"#, &id));
        assert!(is_response_to(
            r#"{"jsonrpc":"2.0","id":"abc","error":{"code":-32602,"message":"x"}}"#,
            &id
        ));
        assert!(!is_response_to(r#"{"jsonrpc":"2.0","id":"xyz","result":{}}"#, &id));
        assert!(!is_response_to(
            r#"{"jsonrpc":"2.0","id":"abc","method":"ping"}"#,
            &id
        ));
    }

    #[test]
    fn test_classify_forwards_client_messages() {
        assert_eq!(
            classify(r#"{"jsonrpc":"2.0","id":4,"method":"tools/list"}"#),
            Inbound::Forward(Some(json!(4)))
        );
        assert_eq!(
            classify(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#),
            Inbound::Forward(None)
        );
    }

    fn rejection(message: &str) -> Value {
        match classify(message) {
            Inbound::Reject(Some(reply)) => serde_json::from_str(&reply).unwrap(),
            other => panic!("expected an error reply, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_answers_undecodable_requests() {
        let unknown = rejection(r#"{"jsonrpc":"2.0","id":2,"method":"bogus/method"}"#);
        assert_eq!(unknown["id"], 2);
        assert_eq!(unknown["error"]["code"], -32601);

        let nameless = rejection(
            r#"{"jsonrpc":"2.0","id":"x","method":"tools/call","params":{"arguments":{}}}"#,
        );
        assert_eq!(nameless["id"], "x");
        assert_eq!(nameless["error"]["code"], -32602);

        assert_eq!(classify(r#"{"jsonrpc":"2.0","id":5}"#), Inbound::Reject(None));
    }

    #[test]
    fn test_registry_lifecycle() {
        let registry = Arc::new(SessionRegistry::new());
        let (id, _rx) = registry.open().unwrap();
        assert!(registry.sender(&id).is_some());
        assert_eq!(registry.len(), 1);

        drop(SessionGuard::new(id.clone(), registry.clone()));
        assert!(registry.sender(&id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_close_all_stops_accepting() {
        let registry = SessionRegistry::new();
        let (_a, mut rx_a) = registry.open().unwrap();
        let (_b, _rx_b) = registry.open().unwrap();

        assert_eq!(registry.close_all(), 2);
        assert!(!registry.is_accepting());
        assert!(registry.open().is_none());
        // Sender dropped, so the receiver observes the close.
        assert!(rx_a.try_recv().is_err());
    }

    /// Answers every request on `service` concurrently, later requests
    /// faster than earlier ones, so replies come back reversed unless the
    /// caller waits for each one.
    async fn echo_service(service: tokio::io::DuplexStream) {
        let (reader, mut writer) = tokio::io::split(service);
        let (reply_tx, mut reply_rx) = mpsc::channel::<String>(8);
        tokio::spawn(async move {
            while let Some(reply) = reply_rx.recv().await {
                if writer.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
            }
        });

        let mut lines = BufReader::new(reader).lines();
        let mut delay = 60u64;
        while let Ok(Some(line)) = lines.next_line().await {
            let Some(id) = request_id(&line) else {
                continue;
            };
            let reply_tx = reply_tx.clone();
            let wait = Duration::from_millis(delay);
            delay = delay.saturating_sub(20);
            tokio::spawn(async move {
                tokio::time::sleep(wait).await;
                let response = json!({"jsonrpc": "2.0", "id": id, "result": {}});
                let _ = reply_tx.send(format!("{}\n", response)).await;
            });
        }
    }

    #[tokio::test]
    async fn test_pump_preserves_submission_order() {
        let (service_io, session_io) = tokio::io::duplex(4096);
        tokio::spawn(echo_service(service_io));

        let (in_tx, in_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let (done_tx, done_rx) = oneshot::channel();
        let pump = SessionPump::new(
            "s".to_string(),
            session_io,
            in_rx,
            out_tx,
            Duration::from_secs(5),
            done_tx,
        );
        let handle = tokio::spawn(pump.run());

        for id in 1..=3 {
            let msg = json!({"jsonrpc": "2.0", "id": id, "method": "tools/list"});
            in_tx.send(msg.to_string()).await.unwrap();
        }

        for expected in 1..=3 {
            let line = out_rx.recv().await.unwrap();
            let value: Value = serde_json::from_str(&line).unwrap();
            assert_eq!(value["id"], json!(expected));
        }

        drop(in_tx);
        handle.await.unwrap().unwrap();
        assert!(done_rx.await.is_err());
    }

    #[tokio::test]
    async fn test_pump_answers_rejected_request_without_waiting() {
        let (service_io, session_io) = tokio::io::duplex(4096);
        tokio::spawn(echo_service(service_io));

        let (in_tx, in_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let (done_tx, _done_rx) = oneshot::channel();
        let pump = SessionPump::new(
            "s".to_string(),
            session_io,
            in_rx,
            out_tx,
            Duration::from_secs(30),
            done_tx,
        );
        tokio::spawn(pump.run());

        let bogus = json!({"jsonrpc": "2.0", "id": 2, "method": "bogus/method"});
        let list = json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list"});
        in_tx.send(bogus.to_string()).await.unwrap();
        in_tx.send(list.to_string()).await.unwrap();

        let replies = async {
            let first: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
            let second: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
            (first, second)
        };
        let (first, second) = tokio::time::timeout(Duration::from_secs(2), replies)
            .await
            .expect("rejected request held up the session");
        assert_eq!(first["id"], 2);
        assert_eq!(first["error"]["code"], -32601);
        assert_eq!(second["id"], 3);
        assert!(second.get("result").is_some());
    }

    #[tokio::test]
    async fn test_pump_stops_when_client_disconnects() {
        let (service_io, session_io) = tokio::io::duplex(4096);
        tokio::spawn(echo_service(service_io));

        let (_in_tx, in_rx) = mpsc::channel(8);
        let (out_tx, out_rx) = mpsc::channel(8);
        let (done_tx, _done_rx) = oneshot::channel();
        let pump = SessionPump::new(
            "s".to_string(),
            session_io,
            in_rx,
            out_tx,
            Duration::from_secs(5),
            done_tx,
        );
        let handle = tokio::spawn(pump.run());

        drop(out_rx);
        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.is_ok(), "pump should exit after disconnect");
    }
}
