use sqlx::SqlitePool;

use crate::database::{self, user_repo};
use crate::models::Role;
use crate::services::attachment_service::AttachmentPolicy;

pub const CLIENT: &str = "client-c";
pub const OTHER_CLIENT: &str = "client-d";
pub const LAWYER: &str = "lawyer-l";
pub const OTHER_LAWYER: &str = "lawyer-m";

pub async fn pool() -> SqlitePool {
    let pool = database::connect("sqlite::memory:", 1).await.unwrap();
    seed_user(&pool, CLIENT, Role::Client, "Casey Client").await;
    seed_user(&pool, OTHER_CLIENT, Role::Client, "Dana Client").await;
    seed_user(&pool, LAWYER, Role::Lawyer, "Lee Lawyer").await;
    seed_user(&pool, OTHER_LAWYER, Role::Lawyer, "Morgan Lawyer").await;
    pool
}

pub async fn seed_user(pool: &SqlitePool, id: &str, role: Role, name: &str) {
    let email = format!("{}@example.test", id);
    user_repo::insert_user(
        pool,
        user_repo::NewUser {
            id,
            role,
            full_name: name,
            email: &email,
            specialization: None,
            city: None,
            bio: None,
            created_at: &database::now_timestamp(),
        },
    )
    .await
    .unwrap();
}

pub fn policy() -> AttachmentPolicy {
    AttachmentPolicy {
        storage_public_url: "https://files.example/chat".to_string(),
        max_bytes: 10 * 1024 * 1024,
    }
}

pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql).fetch_one(pool).await.unwrap()
}
