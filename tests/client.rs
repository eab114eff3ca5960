//! Blocking client against a live server on an ephemeral port.

use chrono::Duration;
use jsonwebtoken::Algorithm;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use hena_auth::auth::{PasswordHasher, TokenService, MIN_BCRYPT_COST};
use hena_auth::client::{AuthClient, ClientError, LoginBackend, LoginOutcome};
use hena_auth::rest::{create_router, AppState};
use hena_auth::service::AuthService;
use hena_auth::storage::Storage;

async fn spawn_server(dir: &tempfile::TempDir) -> SocketAddr {
    let storage = Storage::open(dir.path().join("users")).unwrap();
    let tokens = TokenService::new(b"client-secret", Algorithm::HS256, Duration::minutes(30)).unwrap();
    let auth = AuthService::new(Arc::new(storage), tokens, PasswordHasher::new(MIN_BCRYPT_COST));
    let app = create_router(AppState::new(auth, true));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    addr
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_client_account_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn_server(&dir).await;

    tokio::task::spawn_blocking(move || {
        let client = AuthClient::new(format!("http://{addr}/"));
        assert_eq!(client.base_url(), format!("http://{addr}"));

        let health = client.health().unwrap();
        assert_eq!(health.status, "ok");
        assert!(health.database_url_set);

        let registered = client.register("alice", "secret123").unwrap();
        assert_eq!(registered.token_type, "bearer");
        assert_eq!(client.me(&registered.access_token).unwrap().username, "alice");

        let err = client.register("alice", "again").unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert!(matches!(err, ClientError::Rejected { ref detail, .. } if detail == "username already taken"));

        assert_eq!(
            LoginBackend::login(&client, "alice", "wrong"),
            LoginOutcome::Rejected(401)
        );
        let LoginOutcome::Success(token) = LoginBackend::login(&client, "alice", "secret123") else {
            panic!("login should succeed");
        };

        let message = client.delete_profile(&token, "alice").unwrap();
        assert_eq!(message.message, "User alice profile deleted successfully");
        assert_eq!(client.me(&token).unwrap_err().status(), Some(401));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_server_reports_error() {
    // bind then drop to get a port nothing listens on
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let outcome = tokio::task::spawn_blocking(move || {
        AuthClient::new(format!("http://{addr}")).login("alice", "secret123")
    })
    .await
    .unwrap();

    assert!(matches!(outcome, Err(ClientError::Http(_))));
}
