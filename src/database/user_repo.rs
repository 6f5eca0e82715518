use sqlx::{sqlite::SqliteArguments, Arguments, SqlitePool};

use crate::models::{LawyerRow, Role, UsersRow};

pub const SQL_LOAD_USER: &str = r#"
SELECT
    id,
    role,
    full_name,
    email,
    specialization,
    city,
    bio,
    created_at
FROM users
WHERE id = ?1
LIMIT 1
"#;

pub async fn load_user(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<UsersRow>> {
    sqlx::query_as::<_, UsersRow>(SQL_LOAD_USER)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub struct NewUser<'a> {
    pub id: &'a str,
    pub role: Role,
    pub full_name: &'a str,
    pub email: &'a str,
    pub specialization: Option<&'a str>,
    pub city: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub created_at: &'a str,
}

const SQL_INSERT_USER: &str = r#"
INSERT INTO users (
  id,
  role,
  full_name,
  email,
  specialization,
  city,
  bio,
  created_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
"#;

/// Users are provisioned by the auth collaborator's signup hook; the workflow
/// itself only reads them.
pub async fn insert_user(pool: &SqlitePool, user: NewUser<'_>) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_USER)
        .bind(user.id)
        .bind(user.role)
        .bind(user.full_name)
        .bind(user.email)
        .bind(user.specialization)
        .bind(user.city)
        .bind(user.bio)
        .bind(user.created_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub const SQL_SEARCH_LAWYERS_BASE: &str = r#"
SELECT
    id,
    full_name,
    specialization,
    city,
    bio
FROM users
WHERE role = 'lawyer'
"#;

pub struct LawyerSearch<'a> {
    pub text: Option<&'a str>,
    pub specialization: Option<&'a str>,
    pub city: Option<&'a str>,
    pub limit: i64,
}

pub async fn search_lawyers(
    pool: &SqlitePool,
    search: LawyerSearch<'_>,
) -> sqlx::Result<Vec<LawyerRow>> {
    let mut sql = String::from(SQL_SEARCH_LAWYERS_BASE);
    let mut args = SqliteArguments::default();

    if let Some(text) = search.text {
        let pattern = contains_pattern(text);
        sql.push_str(
            " AND (lower(full_name) LIKE ? ESCAPE '\\' \
             OR lower(coalesce(bio, '')) LIKE ? ESCAPE '\\')",
        );
        args.add(pattern.clone());
        args.add(pattern);
    }
    if let Some(specialization) = search.specialization {
        sql.push_str(" AND lower(coalesce(specialization, '')) LIKE ? ESCAPE '\\'");
        args.add(contains_pattern(specialization));
    }
    if let Some(city) = search.city {
        sql.push_str(" AND lower(coalesce(city, '')) = ?");
        args.add(city.to_lowercase());
    }

    sql.push_str(" ORDER BY full_name ASC, id ASC LIMIT ?");
    args.add(search.limit);

    sqlx::query_as_with::<_, LawyerRow, _>(&sql, args)
        .fetch_all(pool)
        .await
}

/// Lower-cased `%needle%` with LIKE wildcards in the needle taken literally.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
