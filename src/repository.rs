use crate::models::User;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// RepositoryError
///
/// Failure of the persistence layer. Callers map it to a generic 500; the
/// message is for logs only.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// Abstract contract for every persistence operation the handlers and the identity
/// resolver need. Handlers only see `Arc<dyn Repository>`, so tests swap in mocks.
///
/// **Send + Sync + async_trait** keep the trait object usable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    // Profile lookup for identity resolution. `Ok(None)` means no such user.
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;

    // --- Projects ---
    async fn project_exists(&self, id: Uuid) -> RepoResult<bool>;

    // --- Hearts ---
    async fn has_heart(&self, project_id: Uuid, user_id: Uuid) -> RepoResult<bool>;
    async fn has_guest_heart(&self, project_id: Uuid, guest_id: &str) -> RepoResult<bool>;
    // Total of user and guest hearts for a project.
    async fn heart_count(&self, project_id: Uuid) -> RepoResult<i64>;
    // Idempotent: returns true only if a new row was inserted.
    async fn add_heart(&self, project_id: Uuid, user_id: Uuid) -> RepoResult<bool>;
    // Returns true only if a row was removed.
    async fn remove_heart(&self, project_id: Uuid, user_id: Uuid) -> RepoResult<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL through a shared `PgPool`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, avatar_url, is_admin, created_at FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn project_exists(&self, id: Uuid) -> RepoResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM projects WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn has_heart(&self, project_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM project_hearts WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn has_guest_heart(&self, project_id: Uuid, guest_id: &str) -> RepoResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM project_guest_hearts WHERE project_id = $1 AND guest_id = $2)",
        )
        .bind(project_id)
        .bind(guest_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// heart_count
    ///
    /// Counts both tables in one round trip.
    async fn heart_count(&self, project_id: Uuid) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT
                (SELECT COUNT(*) FROM project_hearts WHERE project_id = $1)
              + (SELECT COUNT(*) FROM project_guest_hearts WHERE project_id = $1)
            "#,
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// add_heart
    ///
    /// `ON CONFLICT DO NOTHING` on the composite key makes repeated hearts a no-op.
    async fn add_heart(&self, project_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            "INSERT INTO project_hearts (project_id, user_id, created_at) VALUES ($1, $2, NOW()) ON CONFLICT DO NOTHING",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_heart(&self, project_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let result =
            sqlx::query("DELETE FROM project_hearts WHERE project_id = $1 AND user_id = $2")
                .bind(project_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
