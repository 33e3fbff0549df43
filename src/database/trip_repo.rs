use sqlx::SqlitePool;

use crate::models::TripsRow;

// Trips are private per user: every query is scoped to the owning user_id.
pub const SQL_LIST_TRIPS_FOR_USER: &str = r#"
SELECT
    id,
    user_id,
    ride_id,
    partner_name,
    partner_img,
    route,
    time,
    cost,
    status,
    role,
    vehicle_type,
    vehicle_info
FROM trips
WHERE user_id = ?1
ORDER BY created_at DESC
"#;

pub async fn list_trips_for_user(
    pool: &SqlitePool,
    user_id: &str,
) -> sqlx::Result<Vec<TripsRow>> {
    sqlx::query_as::<_, TripsRow>(SQL_LIST_TRIPS_FOR_USER)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub const SQL_LOAD_TRIP_FOR_USER: &str = r#"
SELECT
    id,
    user_id,
    ride_id,
    partner_name,
    partner_img,
    route,
    time,
    cost,
    status,
    role,
    vehicle_type,
    vehicle_info
FROM trips
WHERE id = ?1
  AND user_id = ?2
LIMIT 1
"#;

pub async fn load_trip_for_user(
    pool: &SqlitePool,
    trip_id: &str,
    user_id: &str,
) -> sqlx::Result<Option<TripsRow>> {
    sqlx::query_as::<_, TripsRow>(SQL_LOAD_TRIP_FOR_USER)
        .bind(trip_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

const SQL_INSERT_TRIP: &str = r#"
INSERT INTO trips (
  id,
  user_id,
  ride_id,
  partner_name,
  partner_img,
  route,
  time,
  cost,
  status,
  role,
  vehicle_type,
  vehicle_info
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub struct NewTrip<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub ride_id: &'a str,
    pub partner_name: &'a str,
    pub partner_img: &'a str,
    pub route: &'a str,
    pub time: &'a str,
    pub cost: f64,
    pub status: &'a str,
    pub role: &'a str, // rider|driver
    pub vehicle_type: &'a str,
    pub vehicle_info: &'a str,
}

pub async fn insert_trip(
    executor: impl sqlx::SqliteExecutor<'_>,
    trip: &NewTrip<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_TRIP)
        .bind(trip.id)
        .bind(trip.user_id)
        .bind(trip.ride_id)
        .bind(trip.partner_name)
        .bind(trip.partner_img)
        .bind(trip.route)
        .bind(trip.time)
        .bind(trip.cost)
        .bind(trip.status)
        .bind(trip.role)
        .bind(trip.vehicle_type)
        .bind(trip.vehicle_info)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

const SQL_SET_TRIP_STATUS: &str = r#"
UPDATE trips
SET status = ?1
WHERE id = ?2
  AND user_id = ?3
"#;

pub async fn set_trip_status(
    pool: &SqlitePool,
    trip_id: &str,
    user_id: &str,
    status: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_SET_TRIP_STATUS)
        .bind(status)
        .bind(trip_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
