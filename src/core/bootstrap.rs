use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Make sure a teacher account exists so a fresh deployment can author
/// content immediately.
pub(crate) async fn ensure_default_teacher(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.default_teacher_password.is_empty() {
        tracing::warn!("DEFAULT_TEACHER_PASSWORD not configured; skipping teacher creation");
        return Ok(());
    }

    let username = &admin.default_teacher_username;
    let user = repositories::users::find_by_username(state.db(), username).await?;

    let now = primitive_now_utc();

    if let Some(user) = user {
        let mut needs_update = false;
        let verified =
            security::verify_password(&admin.default_teacher_password, &user.hashed_password)
                .unwrap_or(false);

        let hashed_password = if verified {
            user.hashed_password.clone()
        } else {
            needs_update = true;
            security::hash_password(&admin.default_teacher_password)?
        };

        let role = if user.role != UserRole::Teacher {
            needs_update = true;
            UserRole::Teacher
        } else {
            user.role
        };

        let is_active = if !user.is_active {
            needs_update = true;
            true
        } else {
            user.is_active
        };

        if needs_update {
            sqlx::query(
                "UPDATE users
                 SET hashed_password = $1,
                     role = $2,
                     is_active = $3,
                     updated_at = $4
                 WHERE id = $5",
            )
            .bind(hashed_password)
            .bind(role)
            .bind(is_active)
            .bind(now)
            .bind(user.id)
            .execute(state.db())
            .await?;

            tracing::info!("Updated default teacher {username}");
        } else {
            tracing::info!("Default teacher already up to date");
        }

        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.default_teacher_password)?;

    sqlx::query(
        "INSERT INTO users (
            id, username, email, hashed_password, role, is_active, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(username)
    .bind(format!("{username}@orish.local"))
    .bind(hashed_password)
    .bind(UserRole::Teacher)
    .bind(true)
    .bind(now)
    .bind(now)
    .execute(state.db())
    .await?;

    tracing::info!("Created default teacher {username}");
    Ok(())
}
