#![allow(dead_code)]

use async_trait::async_trait;
use augment_portal::{
    AppConfig, AppState,
    auth::Claims,
    models::User,
    repository::{RepoResult, Repository, RepositoryError},
};
use axum::{body::Body, http::Response};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::SystemTime,
};
use uuid::Uuid;

// --- Mock Repository ---

/// In-memory stand-in for Postgres. `failing` turns every call into a database error.
#[derive(Default)]
pub struct MockRepo {
    pub users: HashMap<Uuid, User>,
    pub projects: HashSet<Uuid>,
    pub hearts: Mutex<HashSet<(Uuid, Uuid)>>,
    pub guest_hearts: HashSet<(Uuid, String)>,
    pub failing: bool,
}

impl MockRepo {
    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id, user);
        self
    }

    pub fn with_project(mut self, id: Uuid) -> Self {
        self.projects.insert(id);
        self
    }

    pub fn with_heart(self, project_id: Uuid, user_id: Uuid) -> Self {
        self.hearts.lock().unwrap().insert((project_id, user_id));
        self
    }

    pub fn with_guest_heart(mut self, project_id: Uuid, guest_id: &str) -> Self {
        self.guest_hearts.insert((project_id, guest_id.to_string()));
        self
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    fn check(&self) -> RepoResult<()> {
        if self.failing {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        self.check()?;
        Ok(self.users.get(&id).cloned())
    }

    async fn project_exists(&self, id: Uuid) -> RepoResult<bool> {
        self.check()?;
        Ok(self.projects.contains(&id))
    }

    async fn has_heart(&self, project_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        self.check()?;
        Ok(self.hearts.lock().unwrap().contains(&(project_id, user_id)))
    }

    async fn has_guest_heart(&self, project_id: Uuid, guest_id: &str) -> RepoResult<bool> {
        self.check()?;
        Ok(self
            .guest_hearts
            .contains(&(project_id, guest_id.to_string())))
    }

    async fn heart_count(&self, project_id: Uuid) -> RepoResult<i64> {
        self.check()?;
        let users = self
            .hearts
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == project_id)
            .count();
        let guests = self
            .guest_hearts
            .iter()
            .filter(|(p, _)| *p == project_id)
            .count();
        Ok((users + guests) as i64)
    }

    async fn add_heart(&self, project_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        self.check()?;
        Ok(self.hearts.lock().unwrap().insert((project_id, user_id)))
    }

    async fn remove_heart(&self, project_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        self.check()?;
        Ok(self.hearts.lock().unwrap().remove(&(project_id, user_id)))
    }
}

// --- Fixtures ---

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
pub const TEST_USER_ID: Uuid = Uuid::from_u128(1);
pub const TEST_PROJECT_ID: Uuid = Uuid::from_u128(42);

pub fn test_user() -> User {
    User {
        id: TEST_USER_ID,
        name: "Ada Lovelace".to_string(),
        avatar_url: Some("https://cdn.example.com/avatars/ada.png".to_string()),
        is_admin: false,
        ..User::default()
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub fn test_state(repo: MockRepo) -> AppState {
    AppState {
        repo: Arc::new(repo),
        config: test_config(),
    }
}

/// Signs a session token for `user_id`. A negative offset yields an already-expired token.
pub fn create_token(user_id: Uuid, exp_offset: i64, secret: &str) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
