//! First-run seeding
//!
//! Creates the administrator account and the default asset categories.
//! Both steps are skipped when the data already exists.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::password::{generate_password, validate_password};
use crate::auth::permissions::ROLE_ADMIN;
use crate::core::Config;
use crate::db::models::{AssetCategoryCreate, DEFAULT_CATEGORIES, UserCreate};
use crate::db::repository::{CategoryRepository, UserRepository};
use crate::utils::{AppError, AppResult};

const GENERATED_PASSWORD_LENGTH: usize = 16;

pub async fn run(db: &Surreal<Db>, config: &Config) -> AppResult<()> {
    seed_admin(db, config).await?;
    seed_categories(db).await?;
    Ok(())
}

async fn seed_admin(db: &Surreal<Db>, config: &Config) -> AppResult<()> {
    let users = UserRepository::new(db.clone());
    let admin = &config.admin;
    if users.find_by_username(&admin.username).await?.is_some() {
        tracing::debug!(username = %admin.username, "Administrator account present");
        return Ok(());
    }

    let (password, generated) = match admin.password.clone() {
        Some(password) => {
            validate_password(&password).map_err(AppError::from)?;
            (password, false)
        }
        None => (generate_password(GENERATED_PASSWORD_LENGTH), true),
    };

    users
        .create(UserCreate {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password: password.clone(),
            full_name: "Administrador del Sistema".to_string(),
            role: Some(ROLE_ADMIN.to_string()),
            department: Some(config.requisition_department.clone()),
        })
        .await?;

    if generated {
        tracing::warn!(
            username = %admin.username,
            password = %password,
            "Administrator created with a generated password, change it after the first login"
        );
    } else {
        tracing::info!(username = %admin.username, "Administrator account created");
    }
    Ok(())
}

async fn seed_categories(db: &Surreal<Db>) -> AppResult<()> {
    let categories = CategoryRepository::new(db.clone());
    if categories.count().await? > 0 {
        return Ok(());
    }

    for (name, description) in DEFAULT_CATEGORIES {
        categories
            .create(AssetCategoryCreate {
                name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await?;
    }
    tracing::info!(count = DEFAULT_CATEGORIES.len(), "Default asset categories created");
    Ok(())
}
