use gatehouse_core::AppError;
use gatehouse_domain::{AdminAbility, AuditAction, PermissionId, PermissionName, RoleId, RoleName, UserId};

use crate::test_support::{
    ADMIN_ROLE_ID, EDITOR_ROLE_ID, Harness, MEMBER_USER_ID, PLAIN_USER_ID, USER_ROLE_ID,
};
use crate::{CacheInvalidation, SavePermissionInput, SaveRoleInput};

use super::SecurityAdminService;

fn service(harness: &Harness) -> SecurityAdminService {
    SecurityAdminService::new(
        harness.authorization.clone(),
        harness.storage.clone(),
        harness.audit.clone(),
    )
}

fn member() -> UserId {
    UserId::new(MEMBER_USER_ID)
}

fn permission_id(name: &str) -> PermissionId {
    let index = AdminAbility::all()
        .iter()
        .position(|ability| ability.as_str() == name)
        .unwrap_or_default();
    PermissionId::new(i64::try_from(index).unwrap_or_default() + 1)
}

#[tokio::test]
async fn sync_removes_permission_from_cached_users_immediately() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    assert!(
        harness
            .authorization
            .check_permission(member(), "user_create")
            .await
    );

    let result = service
        .sync_role_permissions(
            &Harness::admin(),
            RoleId::new(ADMIN_ROLE_ID),
            vec![permission_id("user_view"), permission_id("role_edit")],
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(result.value.attached, Vec::<PermissionId>::new());
    assert_eq!(result.value.detached.len(), 10);
    assert!(matches!(result.cache, CacheInvalidation::Bumped { .. }));
    assert!(
        !harness
            .authorization
            .check_permission(member(), "user_create")
            .await
    );
    assert!(
        harness
            .authorization
            .check_permission(member(), "user_view")
            .await
    );

    let resolution = harness.authorization.resolve(member()).await;
    assert!(resolution.is_ok_and(|resolution| resolution.permissions.len() == 2));
}

#[tokio::test]
async fn sync_rejects_unknown_permissions_before_writing() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let result = service
        .sync_role_permissions(
            &Harness::admin(),
            RoleId::new(ADMIN_ROLE_ID),
            vec![PermissionId::new(9_999)],
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(harness.version().await, 1);
    assert!(harness.audit.events.lock().await.is_empty());
}

#[tokio::test]
async fn change_role_leaves_exactly_one_role() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    let target = UserId::new(PLAIN_USER_ID);

    let assigned = service
        .assign_role(&Harness::admin(), target, RoleId::new(ADMIN_ROLE_ID))
        .await;
    assert!(assigned.is_ok());

    let changed = service
        .change_role(&Harness::admin(), target, RoleId::new(EDITOR_ROLE_ID))
        .await;
    assert!(changed.is_ok());

    let held: Vec<(i64, i64)> = harness
        .storage
        .state
        .lock()
        .await
        .user_roles
        .iter()
        .filter(|(user, _)| *user == PLAIN_USER_ID)
        .copied()
        .collect();
    assert_eq!(held, vec![(PLAIN_USER_ID, EDITOR_ROLE_ID)]);

    let resolution = harness
        .authorization
        .resolve(target)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(resolution.role.as_deref(), Some("editor"));
    assert!(resolution.has_permission("post_publish"));
    assert!(!resolution.has_permission("user_view"));
}

#[tokio::test]
async fn every_mutation_advances_the_version() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    let admin = Harness::admin();
    let target = UserId::new(PLAIN_USER_ID);
    let mut last = harness.version().await;

    let _ = service
        .assign_role(&admin, target, RoleId::new(EDITOR_ROLE_ID))
        .await;
    let after_assign = harness.version().await;
    assert!(after_assign > last);
    last = after_assign;

    let _ = service
        .remove_role(&admin, target, RoleId::new(EDITOR_ROLE_ID))
        .await;
    let after_remove = harness.version().await;
    assert!(after_remove > last);
    last = after_remove;

    let created = service
        .create_permission(
            &admin,
            SavePermissionInput {
                name: PermissionName::new("post_archive").unwrap_or_else(|_| unreachable!()),
                module: "posts".to_owned(),
                display_name: "Archive posts".to_owned(),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());
    let after_permission = harness.version().await;
    assert!(after_permission > last);
    last = after_permission;

    let _ = service
        .delete_permission(&admin, created.value.id())
        .await;
    let after_delete = harness.version().await;
    assert!(after_delete > last);
    last = after_delete;

    let _ = service
        .create_role(
            &admin,
            SaveRoleInput {
                name: RoleName::new("auditor").unwrap_or_else(|_| unreachable!()),
                display_name: None,
                description: None,
            },
        )
        .await;
    assert!(harness.version().await > last);
}

#[tokio::test]
async fn unknown_role_is_rejected_without_side_effects() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let result = service
        .change_role(&Harness::admin(), member(), RoleId::new(404))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(harness.version().await, 1);
    assert!(
        harness
            .storage
            .state
            .lock()
            .await
            .user_roles
            .contains(&(MEMBER_USER_ID, ADMIN_ROLE_ID))
    );
}

#[tokio::test]
async fn failed_transaction_does_not_bump_the_version() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    harness.storage.set_fail_writes(true).await;

    let result = service
        .assign_role(&Harness::admin(), member(), RoleId::new(USER_ROLE_ID))
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert_eq!(harness.version().await, 1);
    assert_eq!(*harness.cache_store.increments.lock().await, 0);
}

#[tokio::test]
async fn committed_write_survives_unreachable_cache() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    harness.cache_store.set_unavailable(true).await;

    let result = service
        .assign_role(&Harness::admin(), member(), RoleId::new(EDITOR_ROLE_ID))
        .await;

    assert!(result.is_ok_and(|outcome| outcome.cache == CacheInvalidation::Failed));
    assert!(
        harness
            .storage
            .state
            .lock()
            .await
            .user_roles
            .contains(&(MEMBER_USER_ID, EDITOR_ROLE_ID))
    );
}

#[tokio::test]
async fn non_admin_cannot_mutate_or_clear() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    let plain = Harness::plain();

    let assign = service
        .assign_role(&plain, member(), RoleId::new(USER_ROLE_ID))
        .await;
    let clear = service.clear_permission_cache(&plain).await;

    assert!(matches!(assign, Err(AppError::Forbidden(_))));
    assert!(matches!(clear, Err(AppError::Forbidden(_))));
    assert_eq!(harness.version().await, 1);
}

#[tokio::test]
async fn admin_clear_bumps_and_audits() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let version = service.clear_permission_cache(&Harness::admin()).await;

    assert_eq!(version.ok(), Some(2));
    let events = harness.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::PermissionCacheCleared);
    assert_eq!(events[0].subject, "1");
}

#[tokio::test]
async fn role_lifecycle_drops_the_global_snapshot() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    let admin = Harness::admin();

    let before = harness
        .permission_cache
        .global_snapshot()
        .await
        .unwrap_or_default();
    assert!(before.grant("auditor").is_none());

    let created = service
        .create_role(
            &admin,
            SaveRoleInput {
                name: RoleName::new("auditor").unwrap_or_else(|_| unreachable!()),
                display_name: Some("Auditor".to_owned()),
                description: None,
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    let after = harness
        .permission_cache
        .global_snapshot()
        .await
        .unwrap_or_default();
    assert!(after.grant("auditor").is_some());

    let deleted = service.delete_role(&admin, created.value.id()).await;
    assert!(deleted.is_ok());
    let remaining = harness
        .permission_cache
        .global_snapshot()
        .await
        .unwrap_or_default();
    assert!(remaining.grant("auditor").is_none());
}

#[tokio::test]
async fn permission_editor_groups_by_module() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let editor = service
        .role_permission_editor(&Harness::admin(), RoleId::new(EDITOR_ROLE_ID))
        .await
        .unwrap_or_else(|_| unreachable!());

    let modules: Vec<&str> = editor
        .modules
        .iter()
        .map(|group| group.module.as_str())
        .collect();
    assert_eq!(modules, ["permissions", "posts", "roles", "users"]);

    let posts = &editor.modules[1];
    assert_eq!(posts.permissions.len(), 1);
    assert!(posts.permissions[0].granted);
    assert!(
        editor.modules[3]
            .permissions
            .iter()
            .all(|toggle| !toggle.granted)
    );
}

#[tokio::test]
async fn permission_editor_requires_admin_role() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let result = service
        .role_permission_editor(&Harness::plain(), RoleId::new(ADMIN_ROLE_ID))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn cache_metrics_are_admin_only() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    assert!(service.permission_cache_metrics(&Harness::admin()).await.is_ok());
    assert!(matches!(
        service.permission_cache_metrics(&Harness::plain()).await,
        Err(AppError::Forbidden(_))
    ));
}

#[tokio::test]
async fn committed_role_survives_unreachable_audit_store() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    harness.audit.set_unavailable(true).await;

    let created = service
        .create_role(
            &Harness::admin(),
            SaveRoleInput {
                name: RoleName::new("auditor").unwrap_or_else(|_| unreachable!()),
                display_name: None,
                description: None,
            },
        )
        .await;

    assert!(created.is_ok_and(|outcome| matches!(outcome.cache, CacheInvalidation::Bumped { .. })));
    assert_eq!(harness.version().await, 2);
    assert!(harness.audit.events.lock().await.is_empty());
    let stored = harness
        .storage
        .state
        .lock()
        .await
        .roles
        .values()
        .filter(|role| role.name().as_str() == "auditor")
        .count();
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn assignment_succeeds_when_audit_store_fails() {
    let harness = Harness::seeded().await;
    let service = service(&harness);
    harness.audit.set_unavailable(true).await;

    let result = service
        .change_role(&Harness::admin(), member(), RoleId::new(EDITOR_ROLE_ID))
        .await;

    assert!(result.is_ok());
    assert_eq!(harness.version().await, 2);
    assert!(
        harness
            .authorization
            .check_permission(member(), "post_publish")
            .await
    );
}

#[tokio::test]
async fn case_variant_of_existing_role_is_a_conflict() {
    let harness = Harness::seeded().await;
    let service = service(&harness);

    let created = service
        .create_role(
            &Harness::admin(),
            SaveRoleInput {
                name: RoleName::new("ADMIN").unwrap_or_else(|_| unreachable!()),
                display_name: None,
                description: None,
            },
        )
        .await;

    assert!(matches!(created, Err(AppError::Conflict(_))));
    assert_eq!(harness.version().await, 1);
    assert_eq!(harness.storage.state.lock().await.roles.len(), 3);
}
