//! In-memory fakes shared by the service tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use gatehouse_core::{AppError, AppResult, UserIdentity};
use gatehouse_domain::{
    AdminAbility, EmailAddress, Permission, PermissionId, PermissionName, Role, RoleId, RoleName,
    User, UserId,
};

use crate::{
    AuditEvent, AuditRepository, AuthorizationRepository, AuthorizationService, CacheStore,
    CreateUserInput, PasswordHasher, PermissionCacheService, PermissionSyncOutcome, RoleGrantRow,
    RoleRepository, SavePermissionInput, SaveRoleInput, UpdateUserInput, UserCredentials,
    UserRepository,
};

pub const ADMIN_ROLE_ID: i64 = 1;
pub const USER_ROLE_ID: i64 = 2;
pub const EDITOR_ROLE_ID: i64 = 3;
pub const ADMIN_USER_ID: i64 = 1;
pub const MEMBER_USER_ID: i64 = 10;
pub const PLAIN_USER_ID: i64 = 20;

#[derive(Default)]
pub struct FakeCacheStore {
    pub entries: Mutex<HashMap<String, String>>,
    pub unavailable: Mutex<bool>,
    pub failing_increments: Mutex<usize>,
    pub increments: Mutex<usize>,
}

impl FakeCacheStore {
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().await = unavailable;
    }

    async fn ensure_available(&self) -> AppResult<()> {
        if *self.unavailable.lock().await {
            return Err(AppError::Internal("cache store unreachable".to_owned()));
        }

        Ok(())
    }
}

#[async_trait]
impl CacheStore for FakeCacheStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.ensure_available().await?;
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl_minutes: u32) -> AppResult<()> {
        self.ensure_available().await?;
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.ensure_available().await?;
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn has(&self, key: &str) -> AppResult<bool> {
        self.ensure_available().await?;
        Ok(self.entries.lock().await.contains_key(key))
    }

    async fn increment(&self, key: &str) -> AppResult<i64> {
        self.ensure_available().await?;

        let mut failing = self.failing_increments.lock().await;
        if *failing > 0 {
            *failing -= 1;
            return Err(AppError::Internal("increment timed out".to_owned()));
        }
        drop(failing);

        *self.increments.lock().await += 1;

        let mut entries = self.entries.lock().await;
        let next = entries
            .get(key)
            .and_then(|value| value.parse::<i64>().ok())
            .unwrap_or(0)
            + 1;
        entries.insert(key.to_owned(), next.to_string());
        Ok(next)
    }
}

#[derive(Default)]
pub struct RbacState {
    pub roles: BTreeMap<i64, Role>,
    pub permissions: BTreeMap<i64, Permission>,
    pub role_permissions: BTreeSet<(i64, i64)>,
    pub user_roles: BTreeSet<(i64, i64)>,
    pub users: BTreeMap<i64, UserCredentials>,
    pub next_id: i64,
}

/// Relational storage fake backing every repository port.
#[derive(Default)]
pub struct FakeStorage {
    pub state: Mutex<RbacState>,
    pub fail_writes: Mutex<bool>,
    pub fail_reads: Mutex<bool>,
    pub role_grant_reads: Mutex<usize>,
}

impl FakeStorage {
    pub async fn add_role(&self, id: i64, name: &str) {
        let role = Role::new(
            RoleId::new(id),
            role_name(name),
            Some(name.to_owned()),
            None,
        );
        self.state.lock().await.roles.insert(id, role);
    }

    pub async fn add_permission(&self, id: i64, name: &str, module: &str) {
        let permission = Permission::new(PermissionId::new(id), permission_name(name), module, name);
        self.state.lock().await.permissions.insert(id, permission);
    }

    pub async fn grant(&self, role_id: i64, permission_id: i64) {
        self.state
            .lock()
            .await
            .role_permissions
            .insert((role_id, permission_id));
    }

    pub async fn add_user(&self, id: i64, name: &str, email: &str, role_id: Option<i64>) {
        let email = EmailAddress::new(email).unwrap_or_else(|_| unreachable!());
        let user = User::new(UserId::new(id), name, email).unwrap_or_else(|_| unreachable!());
        let mut state = self.state.lock().await;
        state.users.insert(
            id,
            UserCredentials {
                user,
                password_hash: "hashed:correct horse battery".to_owned(),
            },
        );
        if let Some(role_id) = role_id {
            state.user_roles.insert((id, role_id));
        }
    }

    pub async fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().await = fail;
    }

    async fn begin_read(&self) -> AppResult<()> {
        if *self.fail_reads.lock().await {
            return Err(AppError::Internal("database unavailable".to_owned()));
        }

        Ok(())
    }

    async fn begin_write(&self) -> AppResult<()> {
        if *self.fail_writes.lock().await {
            return Err(AppError::Internal(
                "transaction rolled back: connection reset".to_owned(),
            ));
        }

        Ok(())
    }
}

fn role_name(value: &str) -> RoleName {
    RoleName::new(value).unwrap_or_else(|_| unreachable!())
}

fn permission_name(value: &str) -> PermissionName {
    PermissionName::new(value).unwrap_or_else(|_| unreachable!())
}

fn next_id(state: &mut RbacState) -> i64 {
    state.next_id += 1;
    100 + state.next_id
}

#[async_trait]
impl AuthorizationRepository for FakeStorage {
    async fn list_role_grant_rows(&self) -> AppResult<Vec<RoleGrantRow>> {
        self.begin_read().await?;
        *self.role_grant_reads.lock().await += 1;

        let state = self.state.lock().await;
        let mut rows = Vec::new();
        for (role_id, role) in &state.roles {
            let mut granted = false;
            for (_, permission_id) in state
                .role_permissions
                .iter()
                .filter(|(granted_role, _)| granted_role == role_id)
            {
                if let Some(permission) = state.permissions.get(permission_id) {
                    granted = true;
                    rows.push(RoleGrantRow {
                        role_id: role.id(),
                        role_name: role.name().as_str().to_owned(),
                        permission_name: Some(permission.name().as_str().to_owned()),
                    });
                }
            }

            if !granted {
                rows.push(RoleGrantRow {
                    role_id: role.id(),
                    role_name: role.name().as_str().to_owned(),
                    permission_name: None,
                });
            }
        }

        Ok(rows)
    }

    async fn find_primary_role_name(&self, user_id: UserId) -> AppResult<Option<String>> {
        self.begin_read().await?;
        let state = self.state.lock().await;
        Ok(state
            .user_roles
            .iter()
            .filter(|(user, _)| *user == user_id.as_i64())
            .filter_map(|(_, role_id)| state.roles.get(role_id))
            .map(|role| role.name().as_str().to_owned())
            .next())
    }
}

#[async_trait]
impl RoleRepository for FakeStorage {
    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.state.lock().await.roles.values().cloned().collect())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.state.lock().await.roles.get(&role_id.as_i64()).cloned())
    }

    async fn create_role(&self, input: SaveRoleInput) -> AppResult<Role> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        ensure_role_name_free(&state, &input.name, None)?;
        let id = next_id(&mut state);
        let role = Role::new(RoleId::new(id), input.name, input.display_name, input.description);
        state.roles.insert(id, role.clone());
        Ok(role)
    }

    async fn update_role(&self, role_id: RoleId, input: SaveRoleInput) -> AppResult<Role> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        ensure_role_name_free(&state, &input.name, Some(role_id))?;
        let Some(stored) = state.roles.get_mut(&role_id.as_i64()) else {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        };
        *stored = Role::new(role_id, input.name, input.display_name, input.description);
        Ok(stored.clone())
    }

    async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        let id = role_id.as_i64();
        state.roles.remove(&id);
        state.role_permissions.retain(|(role, _)| *role != id);
        state.user_roles.retain(|(_, role)| *role != id);
        Ok(())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        Ok(self
            .state
            .lock()
            .await
            .permissions
            .values()
            .cloned()
            .collect())
    }

    async fn list_role_permission_ids(&self, role_id: RoleId) -> AppResult<Vec<PermissionId>> {
        Ok(self
            .state
            .lock()
            .await
            .role_permissions
            .iter()
            .filter(|(role, _)| *role == role_id.as_i64())
            .map(|(_, permission)| PermissionId::new(*permission))
            .collect())
    }

    async fn create_permission(&self, input: SavePermissionInput) -> AppResult<Permission> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        let id = next_id(&mut state);
        let permission = Permission::new(
            PermissionId::new(id),
            input.name,
            input.module,
            input.display_name,
        );
        state.permissions.insert(id, permission.clone());
        Ok(permission)
    }

    async fn update_permission(
        &self,
        permission_id: PermissionId,
        input: SavePermissionInput,
    ) -> AppResult<Permission> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        let Some(stored) = state.permissions.get_mut(&permission_id.as_i64()) else {
            return Err(AppError::NotFound(format!(
                "permission '{permission_id}' does not exist"
            )));
        };
        *stored = Permission::new(permission_id, input.name, input.module, input.display_name);
        Ok(stored.clone())
    }

    async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        let id = permission_id.as_i64();
        state.permissions.remove(&id);
        state.role_permissions.retain(|(_, permission)| *permission != id);
        Ok(())
    }

    async fn sync_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<PermissionSyncOutcome> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        let role = role_id.as_i64();
        let wanted: BTreeSet<i64> = permission_ids.iter().map(PermissionId::as_i64).collect();
        let current: BTreeSet<i64> = state
            .role_permissions
            .iter()
            .filter(|(stored_role, _)| *stored_role == role)
            .map(|(_, permission)| *permission)
            .collect();

        let attached: Vec<i64> = wanted.difference(&current).copied().collect();
        let detached: Vec<i64> = current.difference(&wanted).copied().collect();
        for permission in &attached {
            state.role_permissions.insert((role, *permission));
        }
        for permission in &detached {
            state.role_permissions.remove(&(role, *permission));
        }

        Ok(PermissionSyncOutcome {
            attached: attached.into_iter().map(PermissionId::new).collect(),
            detached: detached.into_iter().map(PermissionId::new).collect(),
        })
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.begin_write().await?;
        self.state
            .lock()
            .await
            .user_roles
            .insert((user_id.as_i64(), role_id.as_i64()));
        Ok(())
    }

    async fn remove_role_from_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.begin_write().await?;
        self.state
            .lock()
            .await
            .user_roles
            .remove(&(user_id.as_i64(), role_id.as_i64()));
        Ok(())
    }

    async fn replace_user_roles(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        let user = user_id.as_i64();
        state.user_roles.retain(|(stored_user, _)| *stored_user != user);
        state.user_roles.insert((user, role_id.as_i64()));
        Ok(())
    }
}

#[async_trait]
impl UserRepository for FakeStorage {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .map(|credentials| credentials.user.clone())
            .collect())
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .get(&user_id.as_i64())
            .map(|credentials| credentials.user.clone()))
    }

    async fn find_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let email = email.to_lowercase();
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|credentials| credentials.user.email().as_str() == email)
            .cloned())
    }

    async fn create_user(&self, input: CreateUserInput) -> AppResult<User> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        if state
            .users
            .values()
            .any(|credentials| credentials.user.email() == &input.email)
        {
            return Err(AppError::Conflict("email is already in use".to_owned()));
        }

        let id = next_id(&mut state);
        let user = User::new(UserId::new(id), input.name, input.email)?;
        state.users.insert(
            id,
            UserCredentials {
                user: user.clone(),
                password_hash: input.password_hash,
            },
        );
        Ok(user)
    }

    async fn update_user(&self, user_id: UserId, input: UpdateUserInput) -> AppResult<User> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        let Some(stored) = state.users.get_mut(&user_id.as_i64()) else {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        };

        stored.user = User::new(user_id, input.name, input.email)?;
        if let Some(password_hash) = input.password_hash {
            stored.password_hash = password_hash;
        }
        Ok(stored.user.clone())
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        self.begin_write().await?;
        let mut state = self.state.lock().await;
        let id = user_id.as_i64();
        if state.users.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }
        state.user_roles.retain(|(user, _)| *user != id);
        Ok(())
    }
}

fn ensure_role_name_free(state: &RbacState, name: &RoleName, except: Option<RoleId>) -> AppResult<()> {
    let taken = state
        .roles
        .values()
        .any(|role| Some(role.id()) != except && role.name().eq_ignore_case(name));
    if taken {
        return Err(AppError::Conflict(format!(
            "role '{}' already exists",
            name.as_str()
        )));
    }

    Ok(())
}

#[derive(Default)]
pub struct FakeAuditRepository {
    pub events: Mutex<Vec<AuditEvent>>,
    pub unavailable: Mutex<bool>,
}

impl FakeAuditRepository {
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().await = unavailable;
    }
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        if *self.unavailable.lock().await {
            return Err(AppError::Internal("audit store unreachable".to_owned()));
        }

        self.events.lock().await.push(event);
        Ok(())
    }
}

pub struct FakePasswordHasher;

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("hashed:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("hashed:{password}"))
    }
}

/// Wired fakes with roles `admin`, `user` and `editor`, every admin ability
/// granted to `admin`, `post_publish` granted to `editor`, and three users:
/// an admin actor, a member holding `admin` and a plain `user`.
pub struct Harness {
    pub cache_store: Arc<FakeCacheStore>,
    pub storage: Arc<FakeStorage>,
    pub audit: Arc<FakeAuditRepository>,
    pub permission_cache: PermissionCacheService,
    pub authorization: AuthorizationService,
}

impl Harness {
    pub async fn seeded() -> Self {
        let cache_store = Arc::new(FakeCacheStore::default());
        let storage = Arc::new(FakeStorage::default());
        let audit = Arc::new(FakeAuditRepository::default());

        storage.add_role(ADMIN_ROLE_ID, "admin").await;
        storage.add_role(USER_ROLE_ID, "user").await;
        storage.add_role(EDITOR_ROLE_ID, "editor").await;

        for (index, ability) in AdminAbility::all().iter().enumerate() {
            let permission_id = i64::try_from(index).unwrap_or_default() + 1;
            storage
                .add_permission(permission_id, ability.as_str(), ability.module())
                .await;
            storage.grant(ADMIN_ROLE_ID, permission_id).await;
        }
        storage.add_permission(50, "post_publish", "posts").await;
        storage.grant(EDITOR_ROLE_ID, 50).await;

        storage
            .add_user(ADMIN_USER_ID, "Admin", "admin@example.com", Some(ADMIN_ROLE_ID))
            .await;
        storage
            .add_user(MEMBER_USER_ID, "Member", "member@example.com", Some(ADMIN_ROLE_ID))
            .await;
        storage
            .add_user(PLAIN_USER_ID, "Plain", "plain@example.com", Some(USER_ROLE_ID))
            .await;

        let permission_cache = PermissionCacheService::new(cache_store.clone(), storage.clone());
        let authorization = AuthorizationService::new(permission_cache.clone());

        Self {
            cache_store,
            storage,
            audit,
            permission_cache,
            authorization,
        }
    }

    pub fn admin() -> UserIdentity {
        UserIdentity::new(ADMIN_USER_ID, "Admin", Some("admin@example.com".to_owned()))
    }

    pub fn member() -> UserIdentity {
        UserIdentity::new(MEMBER_USER_ID, "Member", Some("member@example.com".to_owned()))
    }

    pub fn plain() -> UserIdentity {
        UserIdentity::new(PLAIN_USER_ID, "Plain", Some("plain@example.com".to_owned()))
    }

    pub async fn version(&self) -> u64 {
        self.permission_cache
            .generation()
            .current()
            .await
            .unwrap_or_default()
    }
}
