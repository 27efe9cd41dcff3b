
use courier::auth::authenticate_request;
use courier::auth_service::{self, LoginRequest};
use courier::error::AppError;
use courier::users::UserStore;
use test_utils::{new_user, register_identity, test_context};

#[tokio::test]
async fn register_then_login_round_trip() {
    let ctx = test_context();

    let registered = auth_service::register(&ctx, &new_user("alice", "pw1"))
        .await
        .unwrap();
    assert!(!registered.token.is_empty());

    let logged_in = auth_service::login(
        &ctx,
        &LoginRequest {
            username: "alice".to_string(),
            password: "pw1".to_string(),
        },
    )
    .await
    .unwrap();

    let identity = authenticate_request(&ctx.auth, Some(&logged_in.token)).unwrap();
    assert_eq!(identity.username, "alice");
}

#[tokio::test]
async fn login_refreshes_last_login() {
    let ctx = test_context();
    register_identity(&ctx, "alice", "pw1").await;

    let before = ctx.store.get("alice").await.unwrap().last_login_at;

    auth_service::login(
        &ctx,
        &LoginRequest {
            username: "alice".to_string(),
            password: "pw1".to_string(),
        },
    )
    .await
    .unwrap();

    let after = ctx.store.get("alice").await.unwrap().last_login_at;
    assert!(after >= before);
}

#[tokio::test]
async fn unknown_user_cannot_login() {
    let ctx = test_context();

    let err = auth_service::login(
        &ctx,
        &LoginRequest {
            username: "nobody".to_string(),
            password: "pw".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Auth(_)));
}

#[tokio::test]
async fn wrong_password_is_rejected_without_touching_last_login() {
    let ctx = test_context();
    register_identity(&ctx, "alice", "pw1").await;

    let before = ctx.store.get("alice").await.unwrap().last_login_at;

    let err = auth_service::login(
        &ctx,
        &LoginRequest {
            username: "alice".to_string(),
            password: "wrong".to_string(),
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::Auth(_)));

    let after = ctx.store.get("alice").await.unwrap().last_login_at;
    assert_eq!(after, before);
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let ctx = test_context();

    auth_service::register(&ctx, &new_user("alice", "pw1"))
        .await
        .unwrap();
    let err = auth_service::register(&ctx, &new_user("alice", "pw2"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn registration_sets_both_timestamps() {
    let ctx = test_context();
    register_identity(&ctx, "alice", "pw1").await;

    let user = ctx.store.get("alice").await.unwrap();
    assert!(user.last_login_at >= user.join_at);
}
