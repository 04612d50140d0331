#![allow(non_snake_case)]

use actix_web::{
    App,
    HttpResponse,
    HttpServer,
    dev::ServerHandle,
    web::{
        self,
        Bytes,
        Data,
        Path,
    },
};
use roulette_client::{
    SessionError,
    session::{
        Action,
        ActionResult,
        AdminCommand,
        SessionId,
    },
    session_client::{
        SessionApi,
        SessionClient,
    },
};
use serde_json::{
    Value,
    json,
};
use std::{
    net::TcpListener,
    sync::Mutex,
};

type Recorded = Data<Mutex<Vec<(String, Value)>>>;

/// Stand-in game server on an ephemeral port. Stopped on drop.
struct MockServer {
    url: String,
    recorded: Recorded,
    handle: ServerHandle,
}

impl MockServer {
    fn start() -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let address = listener.local_addr().unwrap();
        let recorded: Recorded = Data::new(Mutex::new(Vec::new()));

        let app_recorded = recorded.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_recorded.clone())
                .route("/api/games", web::get().to(list_games))
                .route("/api/game/{id}/state", web::get().to(state))
                .route("/api/game/{id}/action", web::post().to(action))
                .route("/api/game/{id}/undo", web::post().to(undo))
                .route("/api/game/{id}/{command}", web::post().to(admin))
        })
        .workers(1)
        .listen(listener)
        .unwrap()
        .run();
        let handle = server.handle();
        std::thread::spawn(move || {
            let sys = actix_web::rt::System::new();
            let _ = sys.block_on(server);
        });

        Self {
            url: format!("http://{address}"),
            recorded,
            handle,
        }
    }

    fn client(&self) -> SessionClient {
        SessionClient::new(format!("{}/", self.url)).unwrap()
    }

    fn recorded(&self) -> Vec<(String, Value)> {
        self.recorded.lock().unwrap().clone()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        let _ = self.handle.stop(false);
    }
}

fn record(recorded: &Recorded, endpoint: &str, body: &[u8]) {
    let value = serde_json::from_slice(body).unwrap_or(Value::Null);
    recorded
        .lock()
        .unwrap()
        .push((endpoint.to_string(), value));
}

async fn state(id: Path<String>) -> HttpResponse {
    match id.as_str() {
        "missing" => HttpResponse::NotFound().body("Game not found"),
        "garbled" => HttpResponse::Ok()
            .content_type("application/json")
            .body("{not json"),
        _ => HttpResponse::Ok().json(json!({
            "round": 4,
            "phase": "betting",
            "shotgun": { "live_shells": 2, "blank_shells": 3, "is_sawed_off": false },
            "players": [
                { "id": 7, "name": "Ada", "lives": 3, "items": ["Beer"], "is_skipped": false, "seat": 1 },
                { "id": 9, "name": "Bob", "lives": 0, "items": [], "is_skipped": true }
            ],
            "current_player_id": 7,
            "logs": [{ "timestamp": "12:00:01", "message": "Ada drank a Beer" }],
            "is_terminated": false
        })),
    }
}

async fn action(recorded: Recorded, body: Bytes) -> HttpResponse {
    record(&recorded, "action", &body);
    let target = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|v| v.get("target_id").and_then(Value::as_i64));
    match target {
        Some(99) => HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Invalid target"
        })),
        Some(500) => HttpResponse::InternalServerError().body("Internal Server Error"),
        _ => HttpResponse::Ok().json(json!({ "success": true })),
    }
}

async fn undo(recorded: Recorded) -> HttpResponse {
    record(&recorded, "undo", b"");
    HttpResponse::Ok().json(json!({ "success": false, "message": "Nothing to undo" }))
}

async fn admin(path: Path<(String, String)>, recorded: Recorded, body: Bytes) -> HttpResponse {
    let (id, command) = path.into_inner();
    record(&recorded, &command, &body);
    if id == "missing" {
        return HttpResponse::NotFound().body("Game not found");
    }
    HttpResponse::Ok().json(json!({ "success": true }))
}

async fn list_games() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "games": [{
            "id": "abc123",
            "round": 2,
            "players": 3,
            "is_over": false,
            "is_terminated": true,
            "shell_counts": { "live": 1, "blank": 4 },
            "current_turn": 1,
            "created_at": "2026-01-01T00:00:00Z"
        }]
    }))
}

#[tokio::test]
async fn fetch_state__decodes_snapshot_and_ignores_unknown_fields() {
    // given
    let server = MockServer::start();
    let client = server.client();

    // when
    let snapshot = client.fetch_state(&SessionId::new("g1")).await.unwrap();

    // then
    assert_eq!(snapshot.round, 4);
    assert_eq!(snapshot.shotgun.blank_shells, 3);
    assert_eq!(snapshot.players.len(), 2);
    assert_eq!(snapshot.current_player().map(|p| p.name.as_str()), Some("Ada"));
    assert!(snapshot.players[1].is_skipped);
    assert_eq!(snapshot.logs[0].message, "Ada drank a Beer");
}

#[tokio::test]
async fn fetch_state__error_status_surfaces_status_and_body() {
    // given
    let server = MockServer::start();
    let client = server.client();

    // when
    let err = client
        .fetch_state(&SessionId::new("missing"))
        .await
        .unwrap_err();

    // then
    match err {
        SessionError::Status { status, body } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(body, "Game not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_state__undecodable_body_is_a_decode_error() {
    // given
    let server = MockServer::start();
    let client = server.client();

    // when
    let err = client
        .fetch_state(&SessionId::new("garbled"))
        .await
        .unwrap_err();

    // then
    assert!(matches!(err, SessionError::Decode(_)));
}

#[tokio::test]
async fn send_action__posts_action_name_merged_with_payload() {
    // given
    let server = MockServer::start();
    let client = server.client();
    let session = SessionId::new("g1");

    // when
    let shot = client
        .send_action(&session, &Action::Shoot { target_id: 2 })
        .await
        .unwrap();
    let used = client
        .send_action(
            &session,
            &Action::UseItem {
                item_name: "Beer".into(),
                target_id: None,
            },
        )
        .await
        .unwrap();

    // then
    assert!(shot.success);
    assert!(used.success);
    assert_eq!(
        server.recorded(),
        vec![
            ("action".to_string(), json!({ "action": "shoot", "target_id": 2 })),
            ("action".to_string(), json!({ "action": "use", "item_name": "Beer" })),
        ]
    );
}

#[tokio::test]
async fn send_action__rejection_body_is_read_on_error_status() {
    // given
    let server = MockServer::start();
    let client = server.client();

    // when
    let result = client
        .send_action(&SessionId::new("g1"), &Action::Shoot { target_id: 99 })
        .await
        .unwrap();

    // then
    assert_eq!(
        result,
        ActionResult {
            success: false,
            message: Some("Invalid target".into()),
        }
    );
}

#[tokio::test]
async fn send_action__unstructured_error_is_a_status_error() {
    // given
    let server = MockServer::start();
    let client = server.client();

    // when
    let err = client
        .send_action(&SessionId::new("g1"), &Action::Shoot { target_id: 500 })
        .await
        .unwrap_err();

    // then
    assert!(matches!(err, SessionError::Status { status, .. } if status.as_u16() == 500));
}

#[tokio::test]
async fn send_admin__posts_to_command_endpoint() {
    // given
    let server = MockServer::start();
    let client = server.client();
    let session = SessionId::new("g1");

    // when
    client
        .send_admin(&session, &AdminCommand::Message("hello table".into()))
        .await
        .unwrap();
    client
        .send_admin(&session, &AdminCommand::Terminate)
        .await
        .unwrap();
    client.send_admin(&session, &AdminCommand::Reset).await.unwrap();

    // then
    assert_eq!(
        server.recorded(),
        vec![
            ("message".to_string(), json!({ "message": "hello table" })),
            ("terminate".to_string(), Value::Null),
            ("reset".to_string(), Value::Null),
        ]
    );
}

#[tokio::test]
async fn send_admin__error_status_is_not_an_error() {
    // given
    let server = MockServer::start();
    let client = server.client();

    // when
    let result = client
        .send_admin(&SessionId::new("missing"), &AdminCommand::Reset)
        .await;

    // then
    assert!(result.is_ok());
}

#[tokio::test]
async fn undo__returns_server_verdict() {
    // given
    let server = MockServer::start();
    let client = server.client();

    // when
    let result = client.undo(&SessionId::new("g1")).await.unwrap();

    // then
    assert!(!result.success);
    assert_eq!(result.message.as_deref(), Some("Nothing to undo"));
    assert_eq!(server.recorded().len(), 1);
}

#[tokio::test]
async fn list_games__decodes_summaries() {
    // given
    let server = MockServer::start();
    let client = server.client();

    // when
    let games = client.list_games().await.unwrap();

    // then
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].id, "abc123");
    assert!(games[0].is_terminated);
    assert_eq!(games[0].shell_counts.blank, 4);
}

#[tokio::test]
async fn unreachable_server_is_a_request_error() {
    // given
    let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let client = SessionClient::new(format!("http://{address}")).unwrap();

    // when
    let err = client.fetch_state(&SessionId::new("g1")).await.unwrap_err();

    // then
    assert!(matches!(err, SessionError::Request(_)));
}
