use sqlx::PgPool;

use crate::entity::{before_delete, before_insert, before_update};
use crate::users::model::User;

// Every persist path runs the entity hooks first, so timestamp bookkeeping
// and the soft-delete transform are applied uniformly at write time. Reads
// exclude soft-deleted records.
impl User {
    /// All users not flagged deleted.
    pub async fn find_all(db: &PgPool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password, first_name, last_name, role,
                   created_at, updated_at, is_deleted
            FROM users
            WHERE NOT is_deleted
            ORDER BY id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password, first_name, last_name, role,
                   created_at, updated_at, is_deleted
            FROM users
            WHERE id = $1 AND NOT is_deleted
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password, first_name, last_name, role,
                   created_at, updated_at, is_deleted
            FROM users
            WHERE email = $1 AND NOT is_deleted
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password, first_name, last_name, role,
                   created_at, updated_at, is_deleted
            FROM users
            WHERE username = $1 AND NOT is_deleted
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. The id comes back from the store; the unique
    /// constraints on email/username are the last word on uniqueness races.
    pub async fn insert(db: &PgPool, mut user: User) -> anyhow::Result<User> {
        before_insert(&mut user);
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, password, first_name, last_name,
                               role, created_at, updated_at, is_deleted)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, email, username, password, first_name, last_name, role,
                      created_at, updated_at, is_deleted
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.is_deleted)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Persist the current field values, refreshing the update timestamp.
    pub async fn update(&mut self, db: &PgPool) -> anyhow::Result<()> {
        before_update(self);
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, username = $3, password = $4, first_name = $5,
                last_name = $6, role = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(&self.email)
        .bind(&self.username)
        .bind(&self.password)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(self.role)
        .bind(self.updated_at)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Run the soft-delete transform and persist it in one statement.
    pub async fn soft_delete(&mut self, db: &PgPool) -> anyhow::Result<()> {
        before_delete(self);
        sqlx::query(
            r#"
            UPDATE users
            SET email = $2, username = $3, password = $4, updated_at = $5,
                is_deleted = $6
            WHERE id = $1
            "#,
        )
        .bind(self.id)
        .bind(&self.email)
        .bind(&self.username)
        .bind(&self.password)
        .bind(self.updated_at)
        .bind(self.is_deleted)
        .execute(db)
        .await?;
        Ok(())
    }
}
