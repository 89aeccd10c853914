use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::user::{NewPermission, NewUser, Permission, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn get_user(&self, id: Uuid) -> Result<User>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn list_users(&self) -> Result<Vec<User>>;

    /// Removes the user. Applicant stamps and comment authors pointing at
    /// the user are cleared, not deleted.
    async fn delete_user(&self, id: Uuid) -> Result<()>;

    /// Codenames granted to the user.
    async fn user_permissions(&self, user_id: Uuid) -> Result<Vec<String>>;

    /// Grants known permissions by codename. Unknown codenames fail the call.
    async fn grant_permissions(&self, user_id: Uuid, codenames: &[String]) -> Result<()>;

    /// Inserts missing permissions; existing codenames are left as they are.
    async fn seed_permissions(&self, permissions: &[NewPermission]) -> Result<()>;

    async fn list_permissions(&self) -> Result<Vec<Permission>>;
}

#[derive(Clone)]
pub struct PgUserService {
    pool: PgPool,
}

impl PgUserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserService for PgUserService {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Constraint(format!("User {} already exists", user.username))
            }
            other => other.into(),
        })?;
        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_active, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", id)))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_active, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_active, created_at FROM users ORDER BY username ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn delete_user(&self, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    async fn user_permissions(&self, user_id: Uuid) -> Result<Vec<String>> {
        let codenames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.codename
            FROM permissions p
            JOIN user_permissions up ON up.permission_id = p.id
            WHERE up.user_id = $1
            ORDER BY p.codename
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(codenames)
    }

    async fn grant_permissions(&self, user_id: Uuid, codenames: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for codename in codenames {
            let permission_id = sqlx::query_scalar::<_, i32>(
                "SELECT id FROM permissions WHERE codename = $1",
            )
            .bind(codename)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| Error::BadRequest(format!("Unknown permission: {}", codename)))?;

            sqlx::query(
                r#"
                INSERT INTO user_permissions (user_id, permission_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(permission_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn seed_permissions(&self, permissions: &[NewPermission]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for permission in permissions {
            sqlx::query(
                r#"
                INSERT INTO permissions (codename, name)
                VALUES ($1, $2)
                ON CONFLICT (codename) DO NOTHING
                "#,
            )
            .bind(&permission.codename)
            .bind(&permission.name)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_permissions(&self) -> Result<Vec<Permission>> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, codename, name FROM permissions ORDER BY codename",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(permissions)
    }
}
