use sqlx::SqlitePool;

use crate::models::RequestsRow;

// Ride requests are public while pending; accepted ones drop off the board.
pub const SQL_LIST_PENDING_REQUESTS: &str = r#"
SELECT
    id,
    rider_id,
    rider_name,
    rider_img,
    route,
    time,
    distance,
    status
FROM requests
WHERE status = 'pending'
ORDER BY created_at DESC
"#;

pub async fn list_pending_requests(pool: &SqlitePool) -> sqlx::Result<Vec<RequestsRow>> {
    sqlx::query_as::<_, RequestsRow>(SQL_LIST_PENDING_REQUESTS)
        .fetch_all(pool)
        .await
}

pub const SQL_LOAD_REQUEST: &str = r#"
SELECT
    id,
    rider_id,
    rider_name,
    rider_img,
    route,
    time,
    distance,
    status
FROM requests
WHERE id = ?1
LIMIT 1
"#;

pub async fn load_request(
    executor: impl sqlx::SqliteExecutor<'_>,
    request_id: &str,
) -> sqlx::Result<Option<RequestsRow>> {
    sqlx::query_as::<_, RequestsRow>(SQL_LOAD_REQUEST)
        .bind(request_id)
        .fetch_optional(executor)
        .await
}

const SQL_INSERT_REQUEST: &str = r#"
INSERT INTO requests (
  id,
  rider_id,
  rider_name,
  rider_img,
  route,
  time,
  distance,
  status
) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub struct NewRequest<'a> {
    pub id: &'a str,
    pub rider_id: &'a str,
    pub rider_name: &'a str,
    pub rider_img: &'a str,
    pub route: &'a str,
    pub time: &'a str,
    pub distance: &'a str,
    pub status: &'a str, // pending|accepted
}

pub async fn insert_request(
    pool: &SqlitePool,
    request: &NewRequest<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_REQUEST)
        .bind(request.id)
        .bind(request.rider_id)
        .bind(request.rider_name)
        .bind(request.rider_img)
        .bind(request.route)
        .bind(request.time)
        .bind(request.distance)
        .bind(request.status)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

// Status-guarded so a request can only be accepted once: the second accept
// affects 0 rows.
const SQL_MARK_REQUEST_ACCEPTED: &str = r#"
UPDATE requests
SET status = 'accepted'
WHERE id = ?1
  AND status = 'pending'
"#;

pub async fn mark_request_accepted(
    executor: impl sqlx::SqliteExecutor<'_>,
    request_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_MARK_REQUEST_ACCEPTED)
        .bind(request_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
