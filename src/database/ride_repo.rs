use sqlx::SqlitePool;

use crate::models::RidesRow;

pub const SQL_LIST_RIDES: &str = r#"
SELECT
    id,
    driver_id,
    driver_name,
    driver_gender,
    driver_rating,
    driver_img,
    car,
    vehicle_type,
    route,
    time,
    cost,
    seats_total,
    seats_left,
    circle_type,
    circle_name,
    is_women_only
FROM rides
ORDER BY created_at DESC
"#;

pub async fn list_rides(pool: &SqlitePool) -> sqlx::Result<Vec<RidesRow>> {
    sqlx::query_as::<_, RidesRow>(SQL_LIST_RIDES)
        .fetch_all(pool)
        .await
}

pub const SQL_LOAD_RIDE: &str = r#"
SELECT
    id,
    driver_id,
    driver_name,
    driver_gender,
    driver_rating,
    driver_img,
    car,
    vehicle_type,
    route,
    time,
    cost,
    seats_total,
    seats_left,
    circle_type,
    circle_name,
    is_women_only
FROM rides
WHERE id = ?1
LIMIT 1
"#;

pub async fn load_ride(
    executor: impl sqlx::SqliteExecutor<'_>,
    ride_id: &str,
) -> sqlx::Result<Option<RidesRow>> {
    sqlx::query_as::<_, RidesRow>(SQL_LOAD_RIDE)
        .bind(ride_id)
        .fetch_optional(executor)
        .await
}

const SQL_INSERT_RIDE: &str = r#"
INSERT INTO rides (
  id,
  driver_id,
  driver_name,
  driver_gender,
  driver_rating,
  driver_img,
  car,
  vehicle_type,
  route,
  time,
  cost,
  seats_total,
  seats_left,
  circle_type,
  circle_name,
  is_women_only
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub struct NewRide<'a> {
    pub id: &'a str,
    pub driver_id: &'a str,
    pub driver_name: &'a str,
    pub driver_gender: &'a str,
    pub driver_rating: f64,
    pub driver_img: &'a str,
    pub car: &'a str,
    pub vehicle_type: &'a str,
    pub route: &'a str,
    pub time: &'a str,
    pub cost: f64,
    pub seats_total: i64,
    pub seats_left: i64,
    pub circle_type: &'a str,
    pub circle_name: &'a str,
    pub is_women_only: bool,
}

pub async fn insert_ride(
    executor: impl sqlx::SqliteExecutor<'_>,
    ride: &NewRide<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_RIDE)
        .bind(ride.id)
        .bind(ride.driver_id)
        .bind(ride.driver_name)
        .bind(ride.driver_gender)
        .bind(ride.driver_rating)
        .bind(ride.driver_img)
        .bind(ride.car)
        .bind(ride.vehicle_type)
        .bind(ride.route)
        .bind(ride.time)
        .bind(ride.cost)
        .bind(ride.seats_total)
        .bind(ride.seats_left)
        .bind(ride.circle_type)
        .bind(ride.circle_name)
        .bind(ride.is_women_only as i64)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}

// Compare-and-swap on the seat count: affects 0 rows when the ride is gone
// or already full, which the booking flow treats as "seat taken".
const SQL_TAKE_SEAT: &str = r#"
UPDATE rides
SET seats_left = seats_left - 1
WHERE id = ?1
  AND seats_left > 0
"#;

pub async fn take_seat(
    executor: impl sqlx::SqliteExecutor<'_>,
    ride_id: &str,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_TAKE_SEAT)
        .bind(ride_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
