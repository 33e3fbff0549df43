use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{ride_repo, trip_repo};
use crate::models::RidesRow;
use crate::services::profile_service::{self, Gender, Profile, SessionUser, UserRole};
use crate::services::trip_service::TripStatus;

pub const DEFAULT_DRIVER_RATING: f64 = 5.0;

const PASSENGERS_AVATAR: &str =
    "https://ui-avatars.com/api/?name=passengers&background=e2e8f0&color=64748b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleType {
    Bike,
    Auto,
    Car,
}

impl VehicleType {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleType::Bike => "bike",
            VehicleType::Auto => "auto",
            VehicleType::Car => "car",
        }
    }

    pub fn parse(input: &str) -> VehicleType {
        match input {
            "bike" => VehicleType::Bike,
            "auto" => VehicleType::Auto,
            _ => VehicleType::Car,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleType::Bike => "Bike",
            VehicleType::Auto => "Auto",
            VehicleType::Car => "Car",
        }
    }
}

/// Trust-context label attached to a ride for display, not independently
/// verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircleType {
    College,
    ItPark,
    Office,
    Neighbor,
}

impl CircleType {
    pub fn as_str(self) -> &'static str {
        match self {
            CircleType::College => "college",
            CircleType::ItPark => "it-park",
            CircleType::Office => "office",
            CircleType::Neighbor => "neighbor",
        }
    }

    pub fn parse(input: &str) -> CircleType {
        match input {
            "college" => CircleType::College,
            "it-park" => CircleType::ItPark,
            "office" => CircleType::Office,
            _ => CircleType::Neighbor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CircleType::College => "Same College",
            CircleType::ItPark => "IT Park Peer",
            CircleType::Office => "Office Corridor",
            CircleType::Neighbor => "Verified Neighbor",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ride {
    pub id: String,
    pub driver_id: String,
    pub driver_name: String,
    pub driver_gender: Gender,
    pub driver_rating: f64,
    pub driver_img: String,
    pub car: String,
    pub vehicle_type: VehicleType,
    pub route: String,
    pub time: String,
    pub cost: f64,
    pub seats_total: i64,
    pub seats_left: i64,
    pub circle_type: CircleType,
    pub circle_name: String,
    pub is_women_only: bool,
}

pub(crate) fn map_ride_row(row: RidesRow) -> Ride {
    Ride {
        id: row.id,
        driver_id: row.driver_id.unwrap_or_default(),
        driver_name: row.driver_name.unwrap_or_default(),
        driver_gender: Gender::parse(row.driver_gender.as_deref().unwrap_or("")),
        driver_rating: row.driver_rating.unwrap_or(DEFAULT_DRIVER_RATING),
        driver_img: row.driver_img.unwrap_or_default(),
        car: row.car.unwrap_or_default(),
        vehicle_type: VehicleType::parse(row.vehicle_type.as_deref().unwrap_or("")),
        route: row.route.unwrap_or_default(),
        time: row.time.unwrap_or_default(),
        cost: row.cost.unwrap_or(0.0),
        seats_total: row.seats_total.unwrap_or(0),
        seats_left: row.seats_left.unwrap_or(0),
        circle_type: CircleType::parse(row.circle_type.as_deref().unwrap_or("")),
        circle_name: row.circle_name.unwrap_or_default(),
        is_women_only: row.is_women_only.unwrap_or(0) == 1,
    }
}

/// Ride listings are public: no session required.
pub async fn list_rides(pool: &SqlitePool) -> sqlx::Result<Vec<Ride>> {
    let rows = ride_repo::list_rides(pool).await?;
    Ok(rows.into_iter().map(map_ride_row).collect())
}

#[derive(Debug, Clone)]
pub struct RideDraft {
    pub route: String,
    pub time: String,
    pub cost: f64,
    pub seats_total: i64,
    pub is_women_only: bool,
}

/// Denormalized driver fields stamped onto rides and trips at creation time.
pub(crate) struct DriverStamp {
    pub car_model: String,
    pub circle_name: String,
    pub driver_img: String,
}

pub(crate) fn driver_stamp(user: &Profile) -> DriverStamp {
    let car_model = user
        .car
        .as_ref()
        .map(|c| c.model.as_str())
        .filter(|m| !m.is_empty())
        .unwrap_or("Shared Vehicle")
        .to_string();
    let circle_name = user
        .home
        .split(',')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("Neighborhood")
        .to_string();
    DriverStamp {
        car_model,
        circle_name,
        driver_img: avatar_url(&user.name, "10b981", "fff"),
    }
}

/// Publish a ride and the driver's companion trip in one transaction, so a
/// ride never exists without being visible in its driver's active trips.
pub async fn create_ride(
    pool: &SqlitePool,
    session: SessionUser<'_>,
    draft: &RideDraft,
) -> sqlx::Result<Ride> {
    let user = profile_service::current_profile(pool, Some(session)).await;
    let stamp = driver_stamp(&user);

    let ride_id = Uuid::new_v4().to_string();
    let new_ride = ride_repo::NewRide {
        id: &ride_id,
        driver_id: &user.id,
        driver_name: &user.name,
        driver_gender: user.gender.as_str(),
        driver_rating: DEFAULT_DRIVER_RATING,
        driver_img: &stamp.driver_img,
        car: &stamp.car_model,
        vehicle_type: VehicleType::Car.as_str(),
        route: &draft.route,
        time: &draft.time,
        cost: draft.cost,
        seats_total: draft.seats_total,
        seats_left: draft.seats_total,
        circle_type: CircleType::Neighbor.as_str(),
        circle_name: &stamp.circle_name,
        is_women_only: draft.is_women_only,
    };

    let trip_id = Uuid::new_v4().to_string();
    let driver_trip = trip_repo::NewTrip {
        id: &trip_id,
        user_id: &user.id,
        ride_id: &ride_id,
        partner_name: "Waiting for Riders",
        partner_img: PASSENGERS_AVATAR,
        route: &draft.route,
        time: &draft.time,
        cost: draft.cost,
        status: TripStatus::Confirmed.as_str(),
        role: UserRole::Driver.as_str(),
        vehicle_type: VehicleType::Car.as_str(),
        vehicle_info: &stamp.car_model,
    };

    let mut tx = pool.begin().await?;
    ride_repo::insert_ride(&mut *tx, &new_ride).await?;
    trip_repo::insert_trip(&mut *tx, &driver_trip).await?;
    tx.commit().await?;

    Ok(Ride {
        id: ride_id,
        driver_id: user.id,
        driver_name: user.name,
        driver_gender: user.gender,
        driver_rating: DEFAULT_DRIVER_RATING,
        driver_img: stamp.driver_img,
        car: stamp.car_model,
        vehicle_type: VehicleType::Car,
        route: draft.route.clone(),
        time: draft.time.clone(),
        cost: draft.cost,
        seats_total: draft.seats_total,
        seats_left: draft.seats_total,
        circle_type: CircleType::Neighbor,
        circle_name: stamp.circle_name,
        is_women_only: draft.is_women_only,
    })
}

pub(crate) fn avatar_url(name: &str, background: &str, color: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background={}&color={}",
        urlencode(name),
        background,
        color
    )
}

fn urlencode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::profile_service::guest_profile;

    #[test]
    fn circle_name_is_first_comma_segment_of_home() {
        let mut user = guest_profile();
        user.home = "Anna Nagar, Chennai".to_string();
        assert_eq!(driver_stamp(&user).circle_name, "Anna Nagar");
    }

    #[test]
    fn empty_home_falls_back_to_neighborhood() {
        let user = guest_profile();
        assert_eq!(driver_stamp(&user).circle_name, "Neighborhood");
    }

    #[test]
    fn missing_car_falls_back_to_shared_vehicle() {
        let user = guest_profile();
        assert_eq!(driver_stamp(&user).car_model, "Shared Vehicle");
    }

    #[test]
    fn avatar_url_escapes_names() {
        let url = avatar_url("Priya S", "10b981", "fff");
        assert_eq!(
            url,
            "https://ui-avatars.com/api/?name=Priya%20S&background=10b981&color=fff"
        );
    }
}
