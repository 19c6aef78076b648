//! Deals Stream Integration Tests
//!
//! Spins up an in-process websocket server and drives the client through
//! subscribe, push, malformed frames, close, and reconnect.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rust_decimal::Decimal;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use mexc_stream_recorder::{
    DealsClient, DealsClientConfig, DealsClientError, DealsEvent, ReconnectConfig, Side,
};

const DEAL_FRAME: &str =
    r#"{"s":"BTC_USDT","d":{"deals":[{"t":1700000000000,"S":1,"p":"65000.5","v":"0.01"}]}}"#;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

async fn bind_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    (listener, url)
}

async fn accept_ws(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = timeout(TEST_TIMEOUT, listener.accept()).await.unwrap().unwrap();
    tokio_tungstenite::accept_async(stream).await.unwrap()
}

fn client_config(url: String, channel: &str, reconnect: ReconnectConfig) -> DealsClientConfig {
    DealsClientConfig {
        url,
        channels: vec![channel.to_string()],
        reconnect,
    }
}

fn no_reconnect() -> ReconnectConfig {
    ReconnectConfig {
        enabled: false,
        ..Default::default()
    }
}

fn fast_reconnect() -> ReconnectConfig {
    ReconnectConfig {
        enabled: true,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        multiplier: 2.0,
        jitter_factor: 0.0,
        max_attempts: 0,
    }
}

async fn next_event(rx: &mut mpsc::Receiver<DealsEvent>) -> DealsEvent {
    timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap()
}

// =============================================================================
// Subscription Handshake
// =============================================================================

#[tokio::test]
async fn subscription_request_sent_on_open() {
    let (listener, url) = bind_server().await;
    let cancel = CancellationToken::new();
    let (event_tx, _event_rx) = mpsc::channel(16);

    let client = DealsClient::new(
        client_config(url, "spot@public.deals.v3.api@ETH_USDT", no_reconnect()),
        event_tx,
        cancel.clone(),
    );
    let client_task = tokio::spawn(client.run());

    let mut server = accept_ws(&listener).await;
    let handshake = timeout(TEST_TIMEOUT, server.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();

    let request: serde_json::Value =
        serde_json::from_str(handshake.to_text().unwrap()).unwrap();
    assert_eq!(
        request,
        serde_json::json!({
            "method": "SUBSCRIPTION",
            "params": ["spot@public.deals.v3.api@ETH_USDT"],
        })
    );

    cancel.cancel();
    timeout(TEST_TIMEOUT, client_task).await.unwrap().unwrap().unwrap();
}

// =============================================================================
// Frame Decoding
// =============================================================================

#[tokio::test]
async fn deal_frames_become_deal_events() {
    let (listener, url) = bind_server().await;
    let cancel = CancellationToken::new();
    let (event_tx, mut event_rx) = mpsc::channel(16);

    let client = DealsClient::new(
        client_config(url, "spot@public.deals.v3.api@BTC_USDT", no_reconnect()),
        event_tx,
        cancel.clone(),
    );
    let client_task = tokio::spawn(client.run());

    let mut server = accept_ws(&listener).await;
    let _handshake = server.next().await;
    server.send(Message::Text(DEAL_FRAME.into())).await.unwrap();

    assert!(matches!(next_event(&mut event_rx).await, DealsEvent::Connected));

    match next_event(&mut event_rx).await {
        DealsEvent::Deal(record) => {
            assert_eq!(record.symbol, "btcusdt");
            assert_eq!(record.executed_at_str(), "2023-11-14 22:13:20");
            assert_eq!(record.side, Side::Buy);
            assert_eq!(record.price, Decimal::new(650_005, 1));
            assert_eq!(record.quantity, Decimal::new(1, 2));
        }
        other => panic!("expected Deal event, got {other:?}"),
    }

    cancel.cancel();
    timeout(TEST_TIMEOUT, client_task).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn malformed_frame_is_skipped_not_fatal() {
    let (listener, url) = bind_server().await;
    let cancel = CancellationToken::new();
    let (event_tx, mut event_rx) = mpsc::channel(16);

    let client = DealsClient::new(
        client_config(url, "spot@public.deals.v3.api@BTC_USDT", no_reconnect()),
        event_tx,
        cancel.clone(),
    );
    let client_task = tokio::spawn(client.run());

    let mut server = accept_ws(&listener).await;
    let _handshake = server.next().await;

    // A bad frame followed by a good one: the good one must still arrive.
    server
        .send(Message::Text("this is not json".into()))
        .await
        .unwrap();
    server.send(Message::Text(DEAL_FRAME.into())).await.unwrap();

    assert!(matches!(next_event(&mut event_rx).await, DealsEvent::Connected));
    assert!(matches!(
        next_event(&mut event_rx).await,
        DealsEvent::Deal(_)
    ));

    cancel.cancel();
    timeout(TEST_TIMEOUT, client_task).await.unwrap().unwrap().unwrap();
}

// =============================================================================
// Disconnect Behavior
// =============================================================================

#[tokio::test]
async fn no_auto_reconnect_when_policy_disabled() {
    let (listener, url) = bind_server().await;
    let cancel = CancellationToken::new();
    let (event_tx, mut event_rx) = mpsc::channel(16);

    let client = DealsClient::new(
        client_config(url, "spot@public.deals.v3.api@BTC_USDT", no_reconnect()),
        event_tx,
        cancel,
    );
    let client_task = tokio::spawn(client.run());

    let mut server = accept_ws(&listener).await;
    let _handshake = server.next().await;
    server.close(None).await.unwrap();

    // The first drop is terminal: the client returns instead of retrying.
    let result = timeout(TEST_TIMEOUT, client_task).await.unwrap().unwrap();
    assert!(matches!(result, Err(DealsClientError::ConnectionClosed)));

    let mut events = Vec::new();
    while let Some(event) = event_rx.recv().await {
        events.push(event);
    }

    assert!(matches!(events.first(), Some(DealsEvent::Connected)));
    assert!(
        events
            .iter()
            .any(|e| matches!(e, DealsEvent::Disconnected))
    );
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, DealsEvent::Reconnecting { .. })),
        "client must not attempt to reconnect with the policy disabled"
    );
}

#[tokio::test]
async fn resubscribes_after_reconnect() {
    let (listener, url) = bind_server().await;
    let cancel = CancellationToken::new();
    let (event_tx, mut event_rx) = mpsc::channel(16);

    let client = DealsClient::new(
        client_config(url, "spot@public.deals.v3.api@BTC_USDT", fast_reconnect()),
        event_tx,
        cancel.clone(),
    );
    let client_task = tokio::spawn(client.run());

    // First connection: consume the handshake, then drop the socket.
    let mut first = accept_ws(&listener).await;
    let first_handshake = timeout(TEST_TIMEOUT, first.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    drop(first);

    // Second connection: the subscription request must be sent again.
    let mut second = accept_ws(&listener).await;
    let second_handshake = timeout(TEST_TIMEOUT, second.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(
        first_handshake.to_text().unwrap(),
        second_handshake.to_text().unwrap()
    );

    cancel.cancel();
    timeout(TEST_TIMEOUT, client_task).await.unwrap().unwrap().unwrap();

    let mut events = Vec::new();
    while let Some(event) = event_rx.recv().await {
        events.push(event);
    }
    assert!(
        events
            .iter()
            .any(|e| matches!(e, DealsEvent::Reconnecting { attempt: 1 }))
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, DealsEvent::Connected))
            .count(),
        2
    );
}
