//! PostgreSQL implementation of the repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::post::{Post, PostRepository};
use crate::profile::{Education, Experience, Profile, ProfileFields, ProfileRepository, Social};
use crate::user::{User, UserId, UserRepository};

const PROFILE_COLUMNS: &str = r#"id, user_id, company, website, location, bio, status,
    github_username, skills, social, experience, education, created_at, updated_at"#;

/// PostgreSQL store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new [`PgStore`].
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// User record as stored in the database.
#[derive(Debug, Clone, FromRow)]
struct UserRecord {
    id: String,
    name: String,
    avatar: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn try_into_user(self) -> Result<User> {
        Ok(User {
            id: parse_owner(self.id)?,
            name: self.name,
            avatar: self.avatar,
            created_at: self.created_at,
        })
    }
}

/// Profile record as stored in the database.
#[derive(Debug, Clone, FromRow)]
struct ProfileRecord {
    id: Uuid,
    user_id: String,
    company: Option<String>,
    website: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    status: String,
    github_username: Option<String>,
    skills: Vec<String>,
    #[sqlx(json)]
    social: Social,
    #[sqlx(json)]
    experience: Vec<Experience>,
    #[sqlx(json)]
    education: Vec<Education>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    fn try_into_profile(self) -> Result<Profile> {
        Ok(Profile {
            id: self.id,
            user: parse_owner(self.user_id)?,
            company: self.company,
            website: self.website,
            location: self.location,
            bio: self.bio,
            status: self.status,
            github_username: self.github_username,
            skills: self.skills,
            social: self.social,
            experience: self.experience,
            education: self.education,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Post record as stored in the database.
#[derive(Debug, Clone, FromRow)]
struct PostRecord {
    id: Uuid,
    user_id: String,
    text: String,
    name: String,
    avatar: Option<String>,
    created_at: DateTime<Utc>,
}

impl PostRecord {
    fn try_into_post(self) -> Result<Post> {
        Ok(Post {
            id: self.id,
            user: parse_owner(self.user_id)?,
            text: self.text,
            name: self.name,
            avatar: self.avatar,
            created_at: self.created_at,
        })
    }
}

fn parse_owner(id: String) -> Result<UserId> {
    UserId::parse(id).map_err(|err| ServerError::internal("invalid user id in database", err))
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRecord>(
            r#"SELECT id, name, avatar, created_at FROM users WHERE id = $1"#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(UserRecord::try_into_user)
        .transpose()
    }

    async fn find_many(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let ids = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();

        sqlx::query_as::<_, UserRecord>(
            r#"SELECT id, name, avatar, created_at FROM users WHERE id = ANY($1)"#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(UserRecord::try_into_user)
        .collect()
    }
}

#[async_trait]
impl ProfileRepository for PgStore {
    async fn find_by_user(&self, user: &UserId) -> Result<Option<Profile>> {
        sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(ProfileRecord::try_into_profile)
        .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Profile>> {
        sqlx::query_as::<_, ProfileRecord>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(ProfileRecord::try_into_profile)
        .collect()
    }

    async fn upsert(&self, user: &UserId, fields: ProfileFields) -> Result<Profile> {
        // `user_id` is UNIQUE: concurrent first submissions resolve to one
        // insert and N-1 updates. `social` only carries supplied keys, so
        // `||` keeps the others.
        let record = sqlx::query_as::<_, ProfileRecord>(&format!(
            r#"INSERT INTO profiles (
                id, user_id, company, website, location, bio, status,
                github_username, skills, social
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id) DO UPDATE SET
                company = COALESCE(EXCLUDED.company, profiles.company),
                website = COALESCE(EXCLUDED.website, profiles.website),
                location = COALESCE(EXCLUDED.location, profiles.location),
                bio = COALESCE(EXCLUDED.bio, profiles.bio),
                status = EXCLUDED.status,
                github_username = COALESCE(EXCLUDED.github_username, profiles.github_username),
                skills = EXCLUDED.skills,
                social = profiles.social || EXCLUDED.social,
                updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(user.as_str())
        .bind(&fields.company)
        .bind(&fields.website)
        .bind(&fields.location)
        .bind(&fields.bio)
        .bind(&fields.status)
        .bind(&fields.github_username)
        .bind(&fields.skills)
        .bind(Json(&fields.social))
        .fetch_one(&self.pool)
        .await?;

        record.try_into_profile()
    }

    async fn save(&self, profile: &Profile) -> Result<()> {
        let result = sqlx::query(
            r#"UPDATE profiles
            SET
                company = $2,
                website = $3,
                location = $4,
                bio = $5,
                status = $6,
                github_username = $7,
                skills = $8,
                social = $9,
                experience = $10,
                education = $11,
                updated_at = $12
            WHERE user_id = $1"#,
        )
        .bind(profile.user.as_str())
        .bind(&profile.company)
        .bind(&profile.website)
        .bind(&profile.location)
        .bind(&profile.bio)
        .bind(&profile.status)
        .bind(&profile.github_username)
        .bind(&profile.skills)
        .bind(Json(&profile.social))
        .bind(Json(&profile.experience))
        .bind(Json(&profile.education))
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound("profile"));
        }

        Ok(())
    }

    async fn delete_with_owner(&self, user: &UserId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(r#"DELETE FROM profiles WHERE user_id = $1"#)
            .bind(user.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(user.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn insert(&self, post: &Post) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO posts (id, user_id, text, name, avatar, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(post.id)
        .bind(post.user.as_str())
        .bind(&post.text)
        .bind(&post.name)
        .bind(&post.avatar)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        sqlx::query_as::<_, PostRecord>(
            r#"SELECT id, user_id, text, name, avatar, created_at
                FROM posts ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(PostRecord::try_into_post)
        .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>> {
        sqlx::query_as::<_, PostRecord>(
            r#"SELECT id, user_id, text, name, avatar, created_at
                FROM posts WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(PostRecord::try_into_post)
        .transpose()
    }
}
