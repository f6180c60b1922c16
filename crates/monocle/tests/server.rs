//! Integration tests for the Monocle server, handler, and full connection flow.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use monocle::prelude::*;
use serde_json::{json, Value};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Test provider
// =========================================================================

const ALICE_ID: &str = "76561198000000001";
const BOB_ID: &str = "76561198000000002";

fn player(id: &str, name: &str) -> PlayerModel {
    PlayerModel {
        id: id.into(),
        name: name.into(),
        character_name: name.to_uppercase(),
        position: Vector3::new(1.0, 2.0, 3.0),
        rotation: 90.0,
        health: 100,
        is_admin: false,
        ping: 0.05,
    }
}

/// A fixed two-player world.
struct TestWorld;

impl GameStateProvider for TestWorld {
    fn players(&self) -> Result<Vec<PlayerModel>, ApiError> {
        Ok(vec![player(ALICE_ID, "alice"), player(BOB_ID, "bob")])
    }

    fn player_details(&self, user_id: &str) -> Result<PlayerModel, ApiError> {
        self.players()?
            .into_iter()
            .find(|p| p.id == user_id)
            .ok_or_else(|| ApiError::new(ErrorType::PlayerNotFound, "Player not found"))
    }

    fn structures(&self) -> Result<Vec<StructureModel>, ApiError> {
        Ok(vec![StructureModel {
            instance_id: 7,
            asset_id: 31,
            name: "Wooden Wall".into(),
            owner_id: ALICE_ID.into(),
            group_id: "0".into(),
            position: Vector3::default(),
            health: 300,
        }])
    }

    fn barricades(&self) -> Result<Vec<BarricadeModel>, ApiError> {
        Ok(vec![BarricadeModel {
            instance_id: 9,
            asset_id: 328,
            name: "Locker".into(),
            owner_id: BOB_ID.into(),
            group_id: "0".into(),
            position: Vector3::default(),
            health: 150,
            vehicle_instance_id: None,
        }])
    }

    fn vehicles(&self) -> Result<Vec<VehicleModel>, ApiError> {
        Ok(vec![])
    }

    fn server_info(&self) -> Result<ServerInfoModel, ApiError> {
        Ok(ServerInfoModel {
            name: "Test Server".into(),
            map: "Washington".into(),
            map_size: 4096,
            player_count: 2,
            max_players: 16,
            pvp: false,
        })
    }
}

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const LOGIN: &str = r#"{"type":"Login","username":"admin","password":"changeme"}"#;

/// A server running on a random port. Dropping it stops the server.
struct TestServer {
    addr: String,
    events: EventHandle,
    stop: oneshot::Sender<()>,
}

async fn start_server() -> TestServer {
    let server = MonocleServer::builder()
        .bind("127.0.0.1:0")
        .build(
            TestWorld,
            CredentialStore::new([Credential::new("admin", "changeme")]),
        )
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();
    let events = server.events();
    let (stop, stopped) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = server
            .run_until(async {
                let _ = stopped.await;
            })
            .await;
    });

    TestServer { addr, events, stop }
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, text: &str) {
    ws.send(Message::text(text.to_string())).await.expect("send");
}

/// Waits for the next text frame and parses it.
async fn recv_json(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for a message")
            .expect("stream ended")
            .expect("websocket error");
        match msg {
            Message::Text(text) => return serde_json::from_str(text.as_str()).expect("json"),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("expected text, got {other:?}"),
        }
    }
}

/// Asserts the server closes the socket without sending anything first.
async fn expect_closed(ws: &mut ClientWs) {
    let next = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for close");
    match next {
        None | Some(Ok(Message::Close(_))) | Some(Err(_)) => {}
        Some(Ok(other)) => panic!("expected close, got {other:?}"),
    }
}

/// Asserts nothing arrives for a short while.
async fn expect_silent(ws: &mut ClientWs) {
    let next = tokio::time::timeout(Duration::from_millis(150), ws.next()).await;
    assert!(next.is_err(), "expected no message, got {next:?}");
}

async fn login(ws: &mut ClientWs) {
    send(ws, LOGIN).await;
    let reply = recv_json(ws).await;
    assert_eq!(
        reply,
        json!({"type": "SuccessfulLogin", "data": "Authentication succeeded"})
    );
}

fn joined(name: &str) -> DomainEvent {
    DomainEvent::PlayerJoined(PlayerConnectionEvent {
        player: player(BOB_ID, name),
    })
}

// =========================================================================
// Gate: before login
// =========================================================================

#[tokio::test]
async fn test_unknown_type_before_login_returns_invalid_request_type() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    send(&mut ws, r#"{"type":"Teleport"}"#).await;

    let reply = recv_json(&mut ws).await;
    assert_eq!(
        reply,
        json!({
            "type": "InvalidRequestType",
            "message": "The request type was not provided or invalid"
        })
    );
}

#[tokio::test]
async fn test_non_json_message_returns_invalid_request_type_and_stays_open() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    send(&mut ws, "hello there").await;
    assert_eq!(recv_json(&mut ws).await["type"], "InvalidRequestType");

    login(&mut ws).await;
}

#[tokio::test]
async fn test_login_without_type_returns_error_then_login_succeeds() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    send(&mut ws, r#"{"username":"admin","password":"changeme"}"#).await;
    assert_eq!(recv_json(&mut ws).await["type"], "InvalidRequestType");

    login(&mut ws).await;
}

#[tokio::test]
async fn test_wrong_password_closes_without_reply() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    send(
        &mut ws,
        r#"{"type":"Login","username":"admin","password":"nope"}"#,
    )
    .await;

    expect_closed(&mut ws).await;
}

#[tokio::test]
async fn test_query_before_login_closes_without_reply() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    send(&mut ws, r#"{"type":"Players"}"#).await;

    expect_closed(&mut ws).await;
}

#[tokio::test]
async fn test_any_valid_type_carrying_credentials_logs_in() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    send(
        &mut ws,
        r#"{"type":"Players","username":"admin","password":"changeme"}"#,
    )
    .await;

    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "SuccessfulLogin");

    // The credentials were consumed as a login, not answered as a query.
    send(&mut ws, r#"{"type":"Players"}"#).await;
    assert_eq!(recv_json(&mut ws).await["type"], "Players");
}

// =========================================================================
// Routing: after login
// =========================================================================

#[tokio::test]
async fn test_every_query_after_login_returns_matching_response() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;
    login(&mut ws).await;

    send(&mut ws, r#"{"type":"Players"}"#).await;
    let players = recv_json(&mut ws).await;
    assert_eq!(players["type"], "Players");
    assert_eq!(players["data"].as_array().unwrap().len(), 2);
    assert_eq!(players["data"][0]["characterName"], "ALICE");

    send(&mut ws, r#"{"type":"Structures"}"#).await;
    let structures = recv_json(&mut ws).await;
    assert_eq!(structures["type"], "Structures");
    assert_eq!(structures["data"][0]["instanceId"], 7);

    send(&mut ws, r#"{"type":"Barricades"}"#).await;
    let barricades = recv_json(&mut ws).await;
    assert_eq!(barricades["type"], "Barricades");
    assert_eq!(barricades["data"][0]["name"], "Locker");

    send(&mut ws, r#"{"type":"Vehicles"}"#).await;
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"type": "Vehicles", "data": []})
    );

    send(&mut ws, r#"{"type":"ServerInfo"}"#).await;
    let info = recv_json(&mut ws).await;
    assert_eq!(info["type"], "ServerInfo");
    assert_eq!(info["data"]["map"], "Washington");
    assert_eq!(info["data"]["maxPlayers"], 16);
}

#[tokio::test]
async fn test_player_details_returns_player_info() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;
    login(&mut ws).await;

    send(
        &mut ws,
        &format!(r#"{{"type":"PlayerDetails","userId":"{BOB_ID}"}}"#),
    )
    .await;

    let reply = recv_json(&mut ws).await;
    assert_eq!(reply["type"], "PlayerInfo");
    assert_eq!(reply["data"]["id"], BOB_ID);
    assert_eq!(reply["data"]["name"], "bob");
}

#[tokio::test]
async fn test_player_details_errors_keep_connection_open() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;
    login(&mut ws).await;

    send(&mut ws, r#"{"type":"PlayerDetails","userId":"42"}"#).await;
    assert_eq!(
        recv_json(&mut ws).await,
        json!({"type": "PlayerNotFound", "message": "Player not found"})
    );

    send(&mut ws, r#"{"type":"PlayerDetails"}"#).await;
    assert_eq!(recv_json(&mut ws).await["type"], "InvalidUserId");

    send(&mut ws, r#"{"type":"ServerInfo"}"#).await;
    assert_eq!(recv_json(&mut ws).await["type"], "ServerInfo");
}

#[tokio::test]
async fn test_login_after_login_drops_only_that_connection() {
    let server = start_server().await;
    let mut bystander = connect(&server.addr).await;
    login(&mut bystander).await;
    let mut ws = connect(&server.addr).await;
    login(&mut ws).await;

    // Login has no route once authenticated; the connection is dropped
    // with no reply.
    send(&mut ws, LOGIN).await;
    expect_closed(&mut ws).await;

    // Other connections and the server carry on.
    send(&mut bystander, r#"{"type":"Players"}"#).await;
    assert_eq!(recv_json(&mut bystander).await["type"], "Players");
    server.events.on_domain_event(joined("bob"));
    assert_eq!(recv_json(&mut bystander).await["type"], "PlayerJoined");

    let mut newcomer = connect(&server.addr).await;
    login(&mut newcomer).await;
}

#[tokio::test]
async fn test_unknown_type_after_login_returns_invalid_request_type() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;
    login(&mut ws).await;

    send(&mut ws, r#"{"type":"players"}"#).await;
    assert_eq!(recv_json(&mut ws).await["type"], "InvalidRequestType");
}

// =========================================================================
// Events
// =========================================================================

#[tokio::test]
async fn test_event_reaches_authenticated_clients_only() {
    let server = start_server().await;

    let mut authed = Vec::new();
    for _ in 0..3 {
        let mut ws = connect(&server.addr).await;
        login(&mut ws).await;
        authed.push(ws);
    }
    let mut anonymous = Vec::new();
    for _ in 0..2 {
        anonymous.push(connect(&server.addr).await);
    }

    server.events.on_domain_event(joined("bob"));

    for ws in &mut authed {
        let event = recv_json(ws).await;
        assert_eq!(event["type"], "PlayerJoined");
        assert_eq!(event["data"]["player"]["name"], "bob");
    }
    for ws in &mut anonymous {
        expect_silent(ws).await;
    }
}

#[tokio::test]
async fn test_events_before_login_are_not_delivered() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;

    server.events.on_domain_event(joined("early"));
    tokio::time::sleep(Duration::from_millis(50)).await;

    login(&mut ws).await;
    server.events.on_domain_event(joined("late"));

    let event = recv_json(&mut ws).await;
    assert_eq!(event["data"]["player"]["name"], "late");
}

#[tokio::test]
async fn test_death_event_wire_shape() {
    let server = start_server().await;
    let mut ws = connect(&server.addr).await;
    login(&mut ws).await;

    server
        .events
        .on_domain_event(DomainEvent::PlayerDeath(PlayerDeathEvent {
            dead_player: player(ALICE_ID, "alice"),
            murderer_id: Some(BOB_ID.into()),
            cause: "GUN".into(),
        }));

    let event = recv_json(&mut ws).await;
    assert_eq!(event["type"], "PlayerDeath");
    assert_eq!(event["data"]["deadPlayer"]["id"], ALICE_ID);
    assert_eq!(event["data"]["murdererId"], BOB_ID);
    assert_eq!(event["data"]["cause"], "GUN");
}

#[tokio::test]
async fn test_disconnected_client_does_not_block_broadcast() {
    let server = start_server().await;

    let mut leaver = connect(&server.addr).await;
    login(&mut leaver).await;
    let mut stayer = connect(&server.addr).await;
    login(&mut stayer).await;

    leaver.close(None).await.expect("close");
    drop(leaver);
    server.events.on_domain_event(joined("bob"));

    assert_eq!(recv_json(&mut stayer).await["type"], "PlayerJoined");
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test]
async fn test_shutdown_closes_open_connections() {
    let server = start_server().await;
    let mut authed = connect(&server.addr).await;
    login(&mut authed).await;
    let mut anonymous = connect(&server.addr).await;
    // Make sure the anonymous connection is registered before stopping.
    send(&mut anonymous, "{}").await;
    assert_eq!(recv_json(&mut anonymous).await["type"], "InvalidRequestType");

    server.stop.send(()).expect("server still running");

    expect_closed(&mut authed).await;
    expect_closed(&mut anonymous).await;
}
