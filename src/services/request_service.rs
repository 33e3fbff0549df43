use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{request_repo, ride_repo, trip_repo};
use crate::models::RequestsRow;
use crate::services::profile_service::{self, SessionUser, UserRole};
use crate::services::ride_service::{self, CircleType, VehicleType, DEFAULT_DRIVER_RATING};
use crate::services::trip_service::TripStatus;

/// Fixed fuel share for a ride spun up from an accepted request.
pub const REQUEST_RIDE_COST: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Accepted,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
        }
    }

    pub fn parse(input: &str) -> RequestStatus {
        match input {
            "accepted" => RequestStatus::Accepted,
            _ => RequestStatus::Pending,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RideRequest {
    pub id: String,
    pub rider_id: String,
    pub rider_name: String,
    pub rider_img: String,
    pub route: String,
    pub time: String,
    pub distance: String,
    pub status: RequestStatus,
}

fn map_request_row(row: RequestsRow) -> RideRequest {
    RideRequest {
        id: row.id,
        rider_id: row.rider_id.unwrap_or_default(),
        rider_name: row.rider_name.unwrap_or_default(),
        rider_img: row.rider_img.unwrap_or_default(),
        route: row.route.unwrap_or_default(),
        time: row.time.unwrap_or_default(),
        distance: row.distance.unwrap_or_default(),
        status: RequestStatus::parse(row.status.as_deref().unwrap_or("")),
    }
}

/// Pending requests are a public board; accepted ones drop off it.
pub async fn list_pending_requests(pool: &SqlitePool) -> sqlx::Result<Vec<RideRequest>> {
    let rows = request_repo::list_pending_requests(pool).await?;
    Ok(rows.into_iter().map(map_request_row).collect())
}

#[derive(Debug, Clone)]
pub struct RequestDraft {
    pub route: String,
    pub time: String,
}

pub async fn post_ride_request(
    pool: &SqlitePool,
    session: SessionUser<'_>,
    draft: &RequestDraft,
) -> sqlx::Result<RideRequest> {
    let user = profile_service::current_profile(pool, Some(session)).await;
    let rider_img = ride_service::avatar_url(&user.name, "3b82f6", "fff");

    let request_id = Uuid::new_v4().to_string();
    let new_request = request_repo::NewRequest {
        id: &request_id,
        rider_id: &user.id,
        rider_name: &user.name,
        rider_img: &rider_img,
        route: &draft.route,
        time: &draft.time,
        distance: "Just posted",
        status: RequestStatus::Pending.as_str(),
    };
    request_repo::insert_request(pool, &new_request).await?;

    Ok(RideRequest {
        id: request_id,
        rider_id: user.id,
        rider_name: user.name,
        rider_img,
        route: draft.route.clone(),
        time: draft.time.clone(),
        distance: "Just posted".to_string(),
        status: RequestStatus::Pending,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted,
    RequestUnavailable,
}

/// Promote a pending request into a ride owned by the accepting driver. The
/// request flip, the new ride and both trip rows (driver side and the
/// requester's rider side) commit in one transaction. The flip is
/// status-guarded, so a request can only be accepted once.
pub async fn accept_ride_request(
    pool: &SqlitePool,
    session: SessionUser<'_>,
    request_id: &str,
) -> sqlx::Result<AcceptOutcome> {
    let driver = profile_service::current_profile(pool, Some(session)).await;
    let stamp = ride_service::driver_stamp(&driver);

    let mut tx = pool.begin().await?;

    let Some(request) = request_repo::load_request(&mut *tx, request_id).await? else {
        return Ok(AcceptOutcome::RequestUnavailable);
    };
    if request_repo::mark_request_accepted(&mut *tx, request_id).await? == 0 {
        return Ok(AcceptOutcome::RequestUnavailable);
    }

    let route = request.route.as_deref().unwrap_or("");
    let time = request.time.as_deref().unwrap_or("");

    // The requester is assumed aboard, so the single seat is already taken.
    let ride_id = Uuid::new_v4().to_string();
    let new_ride = ride_repo::NewRide {
        id: &ride_id,
        driver_id: &driver.id,
        driver_name: &driver.name,
        driver_gender: driver.gender.as_str(),
        driver_rating: DEFAULT_DRIVER_RATING,
        driver_img: &stamp.driver_img,
        car: &stamp.car_model,
        vehicle_type: VehicleType::Car.as_str(),
        route,
        time,
        cost: REQUEST_RIDE_COST,
        seats_total: 1,
        seats_left: 0,
        circle_type: CircleType::Neighbor.as_str(),
        circle_name: &stamp.circle_name,
        is_women_only: false,
    };
    ride_repo::insert_ride(&mut *tx, &new_ride).await?;

    let driver_trip_id = Uuid::new_v4().to_string();
    let driver_trip = trip_repo::NewTrip {
        id: &driver_trip_id,
        user_id: &driver.id,
        ride_id: &ride_id,
        partner_name: request.rider_name.as_deref().unwrap_or(""),
        partner_img: request.rider_img.as_deref().unwrap_or(""),
        route,
        time,
        cost: REQUEST_RIDE_COST,
        status: TripStatus::Confirmed.as_str(),
        role: UserRole::Driver.as_str(),
        vehicle_type: VehicleType::Car.as_str(),
        vehicle_info: &stamp.car_model,
    };
    trip_repo::insert_trip(&mut *tx, &driver_trip).await?;

    // Rider-side trip so the requester sees the accepted ride too.
    if let Some(rider_id) = request.rider_id.as_deref().filter(|id| !id.is_empty()) {
        let rider_trip_id = Uuid::new_v4().to_string();
        let rider_trip = trip_repo::NewTrip {
            id: &rider_trip_id,
            user_id: rider_id,
            ride_id: &ride_id,
            partner_name: &driver.name,
            partner_img: &stamp.driver_img,
            route,
            time,
            cost: REQUEST_RIDE_COST,
            status: TripStatus::Confirmed.as_str(),
            role: UserRole::Rider.as_str(),
            vehicle_type: VehicleType::Car.as_str(),
            vehicle_info: &stamp.car_model,
        };
        trip_repo::insert_trip(&mut *tx, &rider_trip).await?;
    }

    tx.commit().await?;
    Ok(AcceptOutcome::Accepted)
}
