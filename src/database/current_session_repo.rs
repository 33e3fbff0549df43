use sqlx::SqlitePool;

use crate::models::CurrentSessionRow;

pub const SQL_LOAD_CURRENT_SESSION_USER_ID: &str = r#"
SELECT user_id
FROM current_session
LIMIT 1
"#;

pub async fn load_current_session_user_id(pool: &SqlitePool) -> sqlx::Result<Option<String>> {
    let row = sqlx::query_as::<_, CurrentSessionRow>(SQL_LOAD_CURRENT_SESSION_USER_ID)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|r| r.user_id))
}
