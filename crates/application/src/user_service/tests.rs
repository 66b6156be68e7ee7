use std::sync::Arc;

use gatehouse_core::AppError;
use gatehouse_domain::{AuditAction, UserId};

use crate::test_support::{FakePasswordHasher, Harness, PLAIN_USER_ID};

use super::{AuthOutcome, CreateUserParams, UpdateUserParams, UserService};

fn service(harness: &Harness) -> UserService {
    UserService::new(
        harness.authorization.clone(),
        harness.storage.clone(),
        Arc::new(FakePasswordHasher),
        harness.audit.clone(),
    )
}

fn new_user_params() -> CreateUserParams {
    CreateUserParams {
        name: "  Dana  ".to_owned(),
        email: "Dana@Example.com".to_owned(),
        password: "long enough passphrase".to_owned(),
    }
}

#[tokio::test]
async fn create_user_bumps_version_and_audits() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let created = service
        .create_user(&Harness::admin(), new_user_params())
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(created.value.name(), "Dana");
    assert_eq!(created.value.email().as_str(), "dana@example.com");
    assert_eq!(harness.version().await, 2);

    let events = harness.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::UserCreated);
    assert_eq!(events[0].resource_id, created.value.id().to_string());
}

#[tokio::test]
async fn create_user_rejects_weak_password() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    let params = CreateUserParams {
        password: "password".to_owned(),
        ..new_user_params()
    };

    let result = service.create_user(&Harness::admin(), params).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(harness.version().await, 1);
}

#[tokio::test]
async fn plain_user_cannot_create_users() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let result = service.create_user(&Harness::plain(), new_user_params()).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn update_user_replaces_password_hash() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let updated = service
        .update_user(
            &Harness::admin(),
            UserId::new(PLAIN_USER_ID),
            UpdateUserParams {
                name: "Plain Renamed".to_owned(),
                email: "plain@example.com".to_owned(),
                password: Some("another long passphrase".to_owned()),
            },
        )
        .await;
    assert!(updated.is_ok_and(|outcome| outcome.value.name() == "Plain Renamed"));

    let login = service
        .login("plain@example.com", "another long passphrase")
        .await;
    assert!(matches!(login, Ok(AuthOutcome::Authenticated(_))));
}

#[tokio::test]
async fn delete_user_removes_user_and_bumps() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let result = service
        .delete_user(&Harness::admin(), UserId::new(PLAIN_USER_ID))
        .await;

    assert!(result.is_ok());
    assert_eq!(harness.version().await, 2);
    assert!(matches!(
        service
            .find_user(&Harness::admin(), UserId::new(PLAIN_USER_ID))
            .await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn users_cannot_delete_themselves() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    let admin = Harness::admin();

    let result = service
        .delete_user(&admin, UserId::from(&admin))
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn login_fails_generically() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let ok = service
        .login(" ADMIN@example.com ", "correct horse battery")
        .await;
    let wrong_password = service.login("admin@example.com", "nope").await;
    let unknown = service.login("ghost@example.com", "nope").await;

    assert!(matches!(ok, Ok(AuthOutcome::Authenticated(user)) if user.name() == "Admin"));
    assert!(matches!(wrong_password, Ok(AuthOutcome::Failed)));
    assert!(matches!(unknown, Ok(AuthOutcome::Failed)));
}

#[tokio::test]
async fn create_user_succeeds_when_audit_store_fails() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    harness.audit.set_unavailable(true).await;

    let created = service
        .create_user(&Harness::admin(), new_user_params())
        .await;

    assert!(created.is_ok_and(|outcome| outcome.value.name() == "Dana"));
    assert_eq!(harness.version().await, 2);
    assert!(harness.audit.events.lock().await.is_empty());
}
