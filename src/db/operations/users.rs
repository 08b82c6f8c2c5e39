use crate::db::{error::Result, types::User};
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tracing::info;
use uuid::Uuid;

fn parse_user_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
    }
}

/// Look up a user by email address
pub async fn get_user_by_email(pool: &Pool, email: &str) -> Result<Option<User>> {
    let conn = pool.get().await?;

    let row = conn
        .query_opt("SELECT id, username, email FROM users WHERE email = $1", &[&email])
        .await?;

    Ok(row.as_ref().map(parse_user_row))
}

/// Insert a new user with a fresh id
pub async fn create_user(pool: &Pool, email: &str, username: &str) -> Result<User> {
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "INSERT INTO users (id, username, email)
             VALUES ($1, $2, $3)
             RETURNING id, username, email",
            &[&Uuid::new_v4(), &username, &email],
        )
        .await?;

    let user = parse_user_row(&row);
    info!(user_id = %user.id, "Created user");
    Ok(user)
}

/// Return the user registered under `email`, creating it on first login
///
/// The upsert makes concurrent first logins for the same email converge on
/// one row. An existing user keeps their stored username.
pub async fn get_or_create_user(pool: &Pool, email: &str, username: &str) -> Result<User> {
    let conn = pool.get().await?;

    let row = conn
        .query_one(
            "INSERT INTO users (id, username, email)
             VALUES ($1, $2, $3)
             ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
             RETURNING id, username, email",
            &[&Uuid::new_v4(), &username, &email],
        )
        .await?;

    Ok(parse_user_row(&row))
}
