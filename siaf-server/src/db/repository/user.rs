//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id, set_clause};
use crate::auth::hash_password;
use crate::auth::permissions::ROLE_USER;
use crate::db::models::{User, UserCreate, UserUpdate};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All users, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = parse_record_id(TABLE, id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let username_owned = username.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE username = $username LIMIT 1")
            .bind(("username", username_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_lowercase();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Login lookup: username or email, active accounts only
    pub async fn find_for_login(&self, login: &str) -> RepoResult<Option<User>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM user WHERE (username = $login OR email = $email) AND active = true LIMIT 1",
            )
            .bind(("login", login.to_string()))
            .bind(("email", login.to_lowercase()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a user; the password must already satisfy the policy
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        if self.find_by_username(&data.username).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Username '{}' already exists",
                data.username
            )));
        }
        let email = data.email.map(|e| e.trim().to_lowercase());
        if let Some(ref email) = email
            && self.find_by_email(email).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                email
            )));
        }

        let password_hash = hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;
        let now = now_millis();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    username = $username,
                    email = $email,
                    password_hash = $password_hash,
                    full_name = $full_name,
                    role = $role,
                    department = $department,
                    active = true,
                    last_login = NONE,
                    created_at = $now,
                    updated_at = $now
                RETURN AFTER"#,
            )
            .bind(("username", data.username))
            .bind(("email", email))
            .bind(("password_hash", password_hash))
            .bind(("full_name", data.full_name))
            .bind(("role", data.role.unwrap_or_else(|| ROLE_USER.to_string())))
            .bind(("department", data.department.unwrap_or_default()))
            .bind(("now", now))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Admin update of profile fields, role and active flag
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let thing = parse_record_id(TABLE, id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        let email = data.email.map(|e| e.trim().to_lowercase());
        if let Some(ref new_email) = email
            && existing.email.as_deref() != Some(new_email.as_str())
            && self.find_by_email(new_email).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Email '{}' already registered",
                new_email
            )));
        }

        let sets = set_clause(&[
            ("full_name", data.full_name.is_some()),
            ("email", email.is_some()),
            ("role", data.role.is_some()),
            ("department", data.department.is_some()),
            ("active", data.active.is_some()),
            ("updated_at", true),
        ]);

        let mut result = self
            .base
            .db()
            .query(format!("UPDATE $thing SET {sets} RETURN AFTER"))
            .bind(("thing", thing))
            .bind(("full_name", data.full_name))
            .bind(("email", email))
            .bind(("role", data.role))
            .bind(("department", data.department))
            .bind(("active", data.active))
            .bind(("updated_at", now_millis()))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Replace the password hash
    pub async fn update_password(&self, id: &str, new_password: &str) -> RepoResult<()> {
        let thing = parse_record_id(TABLE, id)?;
        let password_hash = hash_password(new_password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;
        let updated: Option<User> = self
            .base
            .db()
            .query("UPDATE $thing SET password_hash = $hash, updated_at = $now RETURN AFTER")
            .bind(("thing", thing))
            .bind(("hash", password_hash))
            .bind(("now", now_millis()))
            .await?
            .take(0)?;
        updated
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    pub async fn touch_last_login(&self, id: &str) -> RepoResult<()> {
        let thing = parse_record_id(TABLE, id)?;
        self.base
            .db()
            .query("UPDATE $thing SET last_login = $now")
            .bind(("thing", thing))
            .bind(("now", now_millis()))
            .await?
            .check()?;
        Ok(())
    }
}
