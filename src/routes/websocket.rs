use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{error, info};

use crate::{services::events::BOARD_CHANNEL, AppState};

/// GET /ws — public; the display view is unauthenticated. Every board event
/// is forwarded verbatim so clients know which resource to re-fetch.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        info!("Display client connected");
        handle_socket(socket, state).await;
    })
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Dedicated pub/sub connection per client
    let mut pubsub = match state.redis_client.get_async_pubsub().await {
        Ok(c) => c,
        Err(e) => {
            error!("Redis pubsub error: {}", e);
            return;
        }
    };

    if let Err(e) = pubsub.subscribe(BOARD_CHANNEL).await {
        error!("Redis subscribe error: {}", e);
        return;
    }

    // Redis Pub/Sub → WebSocket
    let mut redis_task = tokio::spawn(async move {
        let mut pubsub_stream = pubsub.on_message();
        while let Some(msg) = pubsub_stream.next().await {
            let payload: String = match msg.get_payload() {
                Ok(p) => p,
                Err(_) => continue,
            };
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // Drain the client side; displays only listen, but pings keep it alive.
    let mut client_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = (&mut redis_task) => client_task.abort(),
        _ = (&mut client_task) => redis_task.abort(),
    }

    info!("Display client disconnected");
}
