mod common;

use common::*;
use gameday::game::core::Symbol;
use gameday::messages::ServerMessage;

// ============ Lobby REST API tests ============

#[tokio::test]
async fn health_check() {
    let server = spawn_test_server().await;

    let response = reqwest::get(&server.http_url("/health")).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn rooms_empty_when_nobody_joined() {
    let server = spawn_test_server().await;

    let response = reqwest::get(&server.http_url("/rooms")).await.unwrap();
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["rooms"], serde_json::json!([]));
}

#[tokio::test]
async fn rooms_lists_half_full_room() {
    let server = spawn_test_server().await;
    let mut ws = connect(&server).await;
    join(&mut ws, "ab12").await;

    let body: serde_json::Value = reqwest::get(&server.http_url("/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let rooms = body["rooms"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["gameId"], "ab12");
    assert_eq!(rooms[0]["occupancy"], 1);
    assert_eq!(rooms[0]["betAmount"], serde_json::Value::Null);
}

#[tokio::test]
async fn rooms_excludes_full_room() {
    let server = spawn_test_server().await;
    let mut a = connect(&server).await;
    let mut b = connect(&server).await;
    join(&mut a, "ab12").await;
    join(&mut b, "ab12").await;
    assert_eq!(recv(&mut a).await, ServerMessage::PlayerJoined { symbol: Symbol::O });

    let body: serde_json::Value = reqwest::get(&server.http_url("/rooms"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(body["rooms"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn new_game_id_can_be_joined() {
    let server = spawn_test_server().await;

    let body: serde_json::Value = reqwest::get(&server.http_url("/games/new"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let game_id = body["gameId"].as_str().unwrap().to_string();

    let mut ws = connect(&server).await;
    assert_eq!(join(&mut ws, &game_id).await, Symbol::X);
}
