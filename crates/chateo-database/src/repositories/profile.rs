//! Profile repository implementation.
//!
//! Relationship sets are `TEXT[]` columns. Add-if-absent, conditional
//! remove, and move are each one `UPDATE`, so PostgreSQL's row lock makes
//! them atomic per profile.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use chateo_core::error::{AppError, ErrorKind};
use chateo_core::{AppResult, Identity};
use chateo_entity::{PresenceStatus, Profile, RelationSet};

use crate::store::ProfileStore;

const PROFILE_COLUMNS: &str = "identity, first_name, last_name, profile_image, \
     friend_requests_sent, friend_requests_received, friends, status, last_seen, \
     created_at, updated_at";

/// Raw `profiles` row.
#[derive(Debug, FromRow)]
struct ProfileRow {
    identity: String,
    first_name: String,
    last_name: String,
    profile_image: String,
    friend_requests_sent: Vec<String>,
    friend_requests_received: Vec<String>,
    friends: Vec<String>,
    status: String,
    last_seen: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Profile {
            identity: Identity::new(row.identity),
            first_name: row.first_name,
            last_name: row.last_name,
            profile_image: row.profile_image,
            friend_requests_sent: row.friend_requests_sent.into_iter().map(Identity::new).collect(),
            friend_requests_received: row
                .friend_requests_received
                .into_iter()
                .map(Identity::new)
                .collect(),
            friends: row.friends.into_iter().map(Identity::new).collect(),
            status: row.status.parse()?,
            last_seen: row.last_seen,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for profile reads and relationship-set mutations.
#[derive(Debug, Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new profile repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, identity: &Identity) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM profiles WHERE identity = $1)")
            .bind(identity.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check profile", e))
    }
}

fn not_found(identity: &Identity) -> AppError {
    AppError::not_found(format!("User '{identity}' not found"))
}

#[async_trait]
impl ProfileStore for PgProfileRepository {
    async fn find_profile(&self, identity: &Identity) -> AppResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE identity = $1"
        ))
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find profile", e))?;

        row.map(Profile::try_from).transpose()
    }

    async fn set_presence(
        &self,
        identity: &Identity,
        status: PresenceStatus,
        last_seen: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE profiles SET status = $2, last_seen = $3, updated_at = NOW() \
             WHERE identity = $1",
        )
        .bind(identity.as_str())
        .bind(status.as_str())
        .bind(last_seen)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update presence", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(identity));
        }
        Ok(())
    }

    async fn add_to_set(
        &self,
        identity: &Identity,
        set: RelationSet,
        member: &Identity,
    ) -> AppResult<bool> {
        let col = set.column();
        let result = sqlx::query(&format!(
            "UPDATE profiles SET {col} = array_append({col}, $2), updated_at = NOW() \
             WHERE identity = $1 AND NOT ($2 = ANY({col}))"
        ))
        .bind(identity.as_str())
        .bind(member.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add set member", e))?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }
        if self.exists(identity).await? {
            Ok(false)
        } else {
            Err(not_found(identity))
        }
    }

    async fn remove_from_set(
        &self,
        identity: &Identity,
        set: RelationSet,
        member: &Identity,
    ) -> AppResult<bool> {
        let col = set.column();
        let result = sqlx::query(&format!(
            "UPDATE profiles SET {col} = array_remove({col}, $2), updated_at = NOW() \
             WHERE identity = $1 AND $2 = ANY({col})"
        ))
        .bind(identity.as_str())
        .bind(member.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to remove set member", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn move_between_sets(
        &self,
        identity: &Identity,
        from: RelationSet,
        to: RelationSet,
        member: &Identity,
    ) -> AppResult<()> {
        let (from, to) = (from.column(), to.column());
        let result = sqlx::query(&format!(
            "UPDATE profiles SET {from} = array_remove({from}, $2), \
             {to} = CASE WHEN $2 = ANY({to}) THEN {to} ELSE array_append({to}, $2) END, \
             updated_at = NOW() \
             WHERE identity = $1"
        ))
        .bind(identity.as_str())
        .bind(member.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move set member", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(identity));
        }
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
