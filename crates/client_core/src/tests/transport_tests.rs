use super::*;

use std::sync::Arc;

use anyhow::Result;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use shared::{
    domain::{Cell, GameState},
    error::ErrorCode,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: String,
    received: Arc<Mutex<Vec<Value>>>,
}

async fn handle_play(State(state): State<MockState>, Json(payload): Json<Value>) -> (StatusCode, String) {
    state.received.lock().await.push(payload);
    (state.status, state.body.clone())
}

async fn spawn_game_server(
    status: StatusCode,
    body: impl Into<String>,
) -> Result<(HttpGameServer, Arc<Mutex<Vec<Value>>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        status,
        body: body.into(),
        received: received.clone(),
    };
    let app = Router::new()
        .route("/game/play", post(handle_play))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let endpoint = Url::parse(&format!("http://{addr}/game/play"))?;
    Ok((HttpGameServer::new(endpoint), received))
}

fn board_with(col: usize, row: usize, disc: Disc) -> Board {
    let mut board = Board::default();
    board.rows[row][col] = Cell::Occupied(disc);
    board
}

#[tokio::test]
async fn next_posts_wire_request_and_decodes_reply() {
    let player_board = board_with(6, 0, Disc::Yellow);
    let mut ai_board = player_board.clone();
    ai_board.rows[0][3] = Cell::Occupied(Disc::Red);
    let reply = json!({
        "gameState": 1,
        "playerBoard": player_board,
        "playerRow": 0,
        "aiBoard": ai_board,
        "aiCol": 3,
        "aiRow": 0,
        "exception": null,
    });
    let (server, received) = spawn_game_server(StatusCode::OK, reply.to_string())
        .await
        .expect("spawn server");

    let response = server
        .next(Disc::Yellow, &Board::default(), 6)
        .await
        .expect("next");

    assert_eq!(response.game_state, GameState::YellowTurn);
    assert_eq!(response.player_board, player_board);
    assert_eq!(response.ai_move(), Some((3, 0, &ai_board)));

    let received = received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["action"], "next");
    assert_eq!(received[0]["currentPlayer"], "y");
    assert_eq!(received[0]["column"], 6);
    assert_eq!(received[0]["board"]["rows"][0][6], ".");
}

#[tokio::test]
async fn recommend_omits_column() {
    let reply = json!({
        "gameState": "1",
        "board": board_with(3, 0, Disc::Red),
        "recommendColumn": 3,
        "recommendRow": 0,
    });
    let (server, received) = spawn_game_server(StatusCode::OK, reply.to_string())
        .await
        .expect("spawn server");

    let response = server
        .recommend(Disc::Red, &Board::default())
        .await
        .expect("recommend");
    assert_eq!(response.recommend_column, 3);
    assert_eq!(response.game_state, GameState::YellowTurn);

    let received = received.lock().await;
    assert_eq!(received[0]["action"], "recommend");
    assert_eq!(received[0]["currentPlayer"], "r");
    assert!(received[0].get("column").is_none());
}

#[tokio::test]
async fn embedded_exception_becomes_server_error() {
    let reply = json!({
        "exception": {
            "message": "Column 2 is full",
            "code": "COLUMN_FULL",
            "column": 2,
        }
    });
    let (server, _) = spawn_game_server(StatusCode::OK, reply.to_string())
        .await
        .expect("spawn server");

    let err = server
        .next(Disc::Yellow, &Board::default(), 2)
        .await
        .expect_err("must fail");
    assert_eq!(err.exception_code(), Some(&ErrorCode::ColumnFull));
    assert_eq!(err.class(), crate::error::ErrorClass::InputRejected);
}

#[tokio::test]
async fn non_success_status_keeps_body_text() {
    let (server, _) = spawn_game_server(StatusCode::BAD_GATEWAY, "upstream timed out")
        .await
        .expect("spawn server");

    let err = server
        .next(Disc::Yellow, &Board::default(), 0)
        .await
        .expect_err("must fail");
    match err {
        ClientError::Status { status, body } => {
            assert_eq!(status, 502);
            assert_eq!(body, "upstream timed out");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreadable_body_is_malformed() {
    let (server, _) = spawn_game_server(StatusCode::OK, "<html>oops</html>")
        .await
        .expect("spawn server");

    let err = server
        .recommend(Disc::Red, &Board::default())
        .await
        .expect_err("must fail");
    assert!(matches!(err, ClientError::Malformed(_)));
}

#[tokio::test]
async fn warm_sends_action_only_and_ignores_body() {
    let (server, received) = spawn_game_server(StatusCode::OK, "not even json")
        .await
        .expect("spawn server");

    server.warm().await.expect("warm");

    let received = received.lock().await;
    assert_eq!(received.as_slice(), &[json!({ "action": "warm" })]);
}

#[tokio::test]
async fn dispatch_routes_by_action() {
    let reply = json!({
        "gameState": 0,
        "board": board_with(0, 0, Disc::Red),
        "recommendColumn": 0,
        "recommendRow": 0,
    });
    let (server, _) = spawn_game_server(StatusCode::OK, reply.to_string())
        .await
        .expect("spawn server");

    let reply = dispatch(
        &server,
        GameRequest::Recommend {
            current_player: Disc::Red,
            board: Board::default(),
        },
    )
    .await
    .expect("dispatch");
    assert!(matches!(reply, MoveReply::Recommend(_)));

    let err = dispatch(&server, GameRequest::Warm).await.expect_err("warm");
    assert!(matches!(err, ClientError::Unexpected(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let server = HttpGameServer::new(Url::parse(&format!("http://{addr}/game/play")).expect("url"));
    let err = server.warm().await.expect_err("must fail");
    assert!(matches!(err, ClientError::Transport(_)));
}
