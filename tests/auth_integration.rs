use std::net::TcpListener;
use std::sync::Arc;
use oz_backend::auth::{current_timestamp, encode_token, TokenPayload};
use oz_backend::configuration::JwtSettings;
use oz_backend::repository::{InMemoryProductRepository, InMemoryUserRepository};
use oz_backend::startup::{run, AppState};
use serde_json::{json, Value};

const SECRET: &str = "integration-test-secret";
const ACCESS_MAX_AGE: f64 = 86_400.0;
const REFRESH_MAX_AGE: f64 = 2_592_000.0;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn sign_up(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/users/sign-up", self.address))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/users/sign-in", self.address))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Sign up and sign in, returning `(access_token, refresh_token)`
    pub async fn login(&self, username: &str, password: &str) -> (String, String) {
        assert_eq!(201, self.sign_up(username, password).await.status().as_u16());
        let body: Value = self.sign_in(username, password).await.json().await.unwrap();
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    pub fn me(&self) -> reqwest::RequestBuilder {
        self.client.get(&format!("{}/users/me", self.address))
    }
}

fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let state = AppState {
        users: Arc::new(InMemoryUserRepository::new()),
        products: Arc::new(InMemoryProductRepository::new()),
        jwt: JwtSettings::new(SECRET),
    };
    let server = run(listener, state).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

fn token_issued_at(username: &str, issued_at: f64) -> String {
    encode_token(&TokenPayload::issued_at(username, issued_at), SECRET).unwrap()
}

fn expired_access_token(username: &str) -> String {
    token_issued_at(username, current_timestamp() - ACCESS_MAX_AGE - 60.0)
}

#[tokio::test]
async fn sign_up_returns_201_for_valid_data() {
    let app = spawn_app();

    let response = app.sign_up("alice", "password123").await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert!(body["id"].as_i64().is_some());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn sign_up_returns_409_for_taken_username() {
    let app = spawn_app();

    app.sign_up("alice", "password123").await;
    let response = app.sign_up("alice", "another-password").await;

    assert_eq!(409, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "DUPLICATE_ENTRY");
}

#[tokio::test]
async fn sign_up_returns_400_for_invalid_data() {
    let app = spawn_app();

    let test_cases = vec![
        ("", "password123", "empty username"),
        ("a-name-longer-than-16", "password123", "username too long"),
        ("bob", "", "empty password"),
    ];

    for (username, password, description) in test_cases {
        let response = app.sign_up(username, password).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "API did not fail with 400 when payload was {}",
            description
        );
    }
}

#[tokio::test]
async fn malformed_json_body_returns_400() {
    let app = spawn_app();

    let response = app
        .client
        .post(&format!("{}/users/sign-up", app.address))
        .header("Content-Type", "application/json")
        .body("{\"username\": \"alice\"")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn sign_in_returns_token_pair() {
    let app = spawn_app();
    app.sign_up("alice", "password123").await;

    let response = app.sign_in("alice", "password123").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["access_token"].as_str().is_some());
    assert!(body["refresh_token"].as_str().is_some());
}

#[tokio::test]
async fn padded_username_signs_in_after_sign_up() {
    let app = spawn_app();

    let response = app.sign_up(" alice ", "password123").await;
    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "alice");

    assert_eq!(200, app.sign_in(" alice ", "password123").await.status().as_u16());
    assert_eq!(200, app.sign_in("alice", "password123").await.status().as_u16());
}

#[tokio::test]
async fn sign_in_with_unknown_user_returns_404() {
    let app = spawn_app();

    let response = app.sign_in("ghost", "password123").await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn sign_in_with_wrong_password_returns_401() {
    let app = spawn_app();
    app.sign_up("alice", "password123").await;

    let response = app.sign_in("alice", "wrong-password").await;

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_PASSWORD");
}

#[tokio::test]
async fn me_without_token_returns_401() {
    let app = spawn_app();

    let response = app.me().send().await.expect("Failed to execute request");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "MISSING_TOKEN");
}

#[tokio::test]
async fn me_with_fresh_access_token_returns_profile() {
    let app = spawn_app();
    let (access, _) = app.login("alice", "password123").await;

    let response = app
        .me()
        .bearer_auth(&access)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    assert!(response.headers().get("x-access-token").is_none());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn tampered_access_token_returns_401() {
    let app = spawn_app();
    let (access, _) = app.login("alice", "password123").await;

    let response = app
        .me()
        .bearer_auth(format!("{}x", access))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn expired_access_token_without_refresh_returns_403() {
    let app = spawn_app();
    app.login("alice", "password123").await;

    let response = app
        .me()
        .bearer_auth(expired_access_token("alice"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(403, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "REFRESH_TOKEN_INVALID");
}

#[tokio::test]
async fn expired_access_token_with_valid_refresh_is_reissued() {
    let app = spawn_app();
    let (_, refresh) = app.login("alice", "password123").await;

    let response = app
        .me()
        .bearer_auth(expired_access_token("alice"))
        .header("X-Refresh-Token", &refresh)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    let reissued = response
        .headers()
        .get("x-access-token")
        .expect("No reissued access token")
        .to_str()
        .unwrap()
        .to_string();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["username"], "alice");

    // The reissued token works on its own
    let response = app
        .me()
        .bearer_auth(&reissued)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());
    assert!(response.headers().get("x-access-token").is_none());
}

#[tokio::test]
async fn expired_refresh_token_returns_403() {
    let app = spawn_app();
    app.login("alice", "password123").await;
    let stale_refresh = token_issued_at("alice", current_timestamp() - REFRESH_MAX_AGE - 60.0);

    let response = app
        .me()
        .bearer_auth(expired_access_token("alice"))
        .header("X-Refresh-Token", stale_refresh)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn garbage_refresh_token_returns_403() {
    let app = spawn_app();
    app.login("alice", "password123").await;

    let response = app
        .me()
        .bearer_auth(expired_access_token("alice"))
        .header("X-Refresh-Token", "definitely.not.a-token")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn refresh_token_of_another_user_returns_403() {
    let app = spawn_app();
    app.login("alice", "password123").await;
    let (_, bob_refresh) = app.login("bob", "password123").await;

    let response = app
        .me()
        .bearer_auth(expired_access_token("alice"))
        .header("X-Refresh-Token", bob_refresh)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(403, response.status().as_u16());
}

#[tokio::test]
async fn get_user_by_id_requires_a_caller() {
    let app = spawn_app();
    let (access, _) = app.login("alice", "password123").await;
    let me: Value = app.me().bearer_auth(&access).send().await.unwrap().json().await.unwrap();
    let id = me["id"].as_i64().unwrap();

    let anonymous = app
        .client
        .get(&format!("{}/users/{}", app.address, id))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(401, anonymous.status().as_u16());

    let authenticated = app
        .client
        .get(&format!("{}/users/{}", app.address, id))
        .bearer_auth(&access)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, authenticated.status().as_u16());

    let missing = app
        .client
        .get(&format!("{}/users/{}", app.address, id + 100))
        .bearer_auth(&access)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(404, missing.status().as_u16());
}

#[tokio::test]
async fn list_users_shows_every_account() {
    let app = spawn_app();
    app.sign_up("alice", "password123").await;
    app.sign_up("bob", "password123").await;

    let response = app
        .client
        .get(&format!("{}/users", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alice", "bob"]);
}

#[tokio::test]
async fn patch_me_changes_the_password() {
    let app = spawn_app();
    let (access, _) = app.login("alice", "password123").await;

    let response = app
        .client
        .patch(&format!("{}/users/me", app.address))
        .bearer_auth(&access)
        .json(&json!({ "password": "new-password" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(200, response.status().as_u16());

    assert_eq!(401, app.sign_in("alice", "password123").await.status().as_u16());
    assert_eq!(200, app.sign_in("alice", "new-password").await.status().as_u16());
}

#[tokio::test]
async fn delete_me_removes_the_account() {
    let app = spawn_app();
    let (access, _) = app.login("alice", "password123").await;

    let response = app
        .client
        .delete(&format!("{}/users/me", app.address))
        .bearer_auth(&access)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(204, response.status().as_u16());

    assert_eq!(404, app.sign_in("alice", "password123").await.status().as_u16());

    // The token is still well-formed, but nobody owns it anymore
    let response = app.me().bearer_auth(&access).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}
