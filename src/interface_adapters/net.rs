use crate::domain::ClientId;
use crate::interface_adapters::protocol;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{
    ConnectionHandle, InMemoryRegistry, MessageRouter, close_session, open_session,
};

use axum::{
    Error,
    extract::{
        State,
        ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, trace, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

#[derive(Debug, Default)]
struct ConnStats {
    msgs_in: u64,
    bytes_in: u64,
    // Frames dropped because they did not decode into a known envelope.
    invalid_json: u64,
    // Total recipients reached by this connection's messages.
    relayed: u64,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let span = info_span!("conn", client_id = tracing::field::Empty);
    serve_connection(socket, state, span.clone())
        .instrument(span)
        .await;
}

async fn serve_connection(socket: WebSocket, state: Arc<AppState>, span: tracing::Span) {
    let (handle, outbound_rx) = ConnectionHandle::channel(state.outbound_capacity);
    let (sink, mut stream) = socket.split();

    // The writer owns the socket's send half; the handle stays writable while it runs.
    let mut writer = tokio::spawn(forward_outbound(sink, outbound_rx).in_current_span());

    let client_id = open_session(&state.router, handle).await;
    span.record("client_id", tracing::field::display(client_id));

    let mut stats = ConnStats::default();
    let result = tokio::select! {
        result = run_client_loop(&mut stream, &state.router, client_id, &mut stats) => result,
        written = &mut writer => {
            match written {
                Ok(Err(e)) => debug!(error = ?e, "outbound writer stopped"),
                Err(e) => warn!(error = ?e, "outbound writer task failed"),
                Ok(Ok(())) => {}
            }
            Ok(())
        }
    };
    if let Err(e) = result {
        warn!(error = ?e, "client loop exited with error");
    }

    // Unregister and notify before the writer goes away.
    close_session(&state.router, client_id).await;
    writer.abort();

    debug!(
        msgs_in = stats.msgs_in,
        bytes_in = stats.bytes_in,
        invalid_json = stats.invalid_json,
        relayed = stats.relayed,
        "connection stats"
    );
}

async fn forward_outbound(
    mut sink: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<Utf8Bytes>,
) -> Result<(), NetError> {
    while let Some(frame) = outbound_rx.recv().await {
        sink.send(Message::Text(frame)).await?;
    }
    sink.close().await?;
    Ok(())
}

async fn run_client_loop(
    stream: &mut SplitStream<WebSocket>,
    router: &MessageRouter<InMemoryRegistry>,
    client_id: ClientId,
    stats: &mut ConnStats,
) -> Result<(), NetError> {
    loop {
        let incoming = stream.next().await;
        match handle_incoming_ws(incoming, router, client_id, stats).await? {
            LoopControl::Continue => {}
            LoopControl::Disconnect => return Ok(()),
        }
    }
}

async fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    router: &MessageRouter<InMemoryRegistry>,
    client_id: ClientId,
    stats: &mut ConnStats,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                relay_frame(router, client_id, text.as_str(), stats).await;
                Ok(LoopControl::Continue)
            }
            Message::Binary(bytes) => {
                // Some clients send JSON as binary frames; anything else is malformed.
                match std::str::from_utf8(&bytes) {
                    Ok(text) => relay_frame(router, client_id, text, stats).await,
                    Err(_) => {
                        stats.msgs_in += 1;
                        stats.bytes_in += bytes.len() as u64;
                        stats.invalid_json += 1;
                        trace!(bytes = bytes.len(), "dropping non-utf8 binary frame");
                    }
                }
                Ok(LoopControl::Continue)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => Err(NetError::from(e)),
        None => {
            info!("websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn relay_frame(
    router: &MessageRouter<InMemoryRegistry>,
    client_id: ClientId,
    text: &str,
    stats: &mut ConnStats,
) {
    stats.msgs_in += 1;
    stats.bytes_in += text.len() as u64;

    match protocol::decode(text) {
        Ok(inbound) => {
            let outcome = router.route(client_id, inbound).await;
            stats.relayed += outcome.delivered as u64;
        }
        Err(e) => {
            // Malformed input is dropped silently; nothing goes back to the sender.
            stats.invalid_json += 1;
            trace!(bytes = text.len(), error = %e, "dropping malformed message");
        }
    }
}
