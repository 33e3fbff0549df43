use sqlx::SqlitePool;

use crate::database::trip_repo;
use crate::models::TripsRow;
use crate::services::profile_service::UserRole;
use crate::services::ride_service::VehicleType;

/// Trip lifecycle. Status only ever advances one step at a time:
/// confirmed → arriving → at-pickup → in-transit → completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripStatus {
    Confirmed,
    Arriving,
    AtPickup,
    InTransit,
    Completed,
}

impl TripStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TripStatus::Confirmed => "confirmed",
            TripStatus::Arriving => "arriving",
            TripStatus::AtPickup => "at-pickup",
            TripStatus::InTransit => "in-transit",
            TripStatus::Completed => "completed",
        }
    }

    pub fn parse(input: &str) -> TripStatus {
        match input {
            "arriving" => TripStatus::Arriving,
            "at-pickup" => TripStatus::AtPickup,
            "in-transit" => TripStatus::InTransit,
            "completed" => TripStatus::Completed,
            _ => TripStatus::Confirmed,
        }
    }

    /// The single legal successor. `completed` is terminal.
    pub fn successor(self) -> Option<TripStatus> {
        match self {
            TripStatus::Confirmed => Some(TripStatus::Arriving),
            TripStatus::Arriving => Some(TripStatus::AtPickup),
            TripStatus::AtPickup => Some(TripStatus::InTransit),
            TripStatus::InTransit => Some(TripStatus::Completed),
            TripStatus::Completed => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TripStatus::Confirmed => "Confirmed",
            TripStatus::Arriving => "Arriving",
            TripStatus::AtPickup => "At Pickup",
            TripStatus::InTransit => "In Transit",
            TripStatus::Completed => "Completed",
        }
    }

    pub fn progress_pct(self) -> u8 {
        match self {
            TripStatus::Confirmed => 20,
            TripStatus::Arriving => 40,
            TripStatus::AtPickup => 60,
            TripStatus::InTransit => 85,
            TripStatus::Completed => 100,
        }
    }

    pub fn is_completed(self) -> bool {
        self == TripStatus::Completed
    }
}

#[derive(Debug, Clone)]
pub struct Trip {
    pub id: String,
    pub ride_id: String,
    pub partner_name: String,
    pub partner_img: String,
    pub route: String,
    pub time: String,
    pub cost: f64,
    pub status: TripStatus,
    pub role: UserRole,
    pub vehicle_type: VehicleType,
    pub vehicle_info: String,
}

fn map_trip_row(row: TripsRow) -> Trip {
    Trip {
        id: row.id,
        ride_id: row.ride_id.unwrap_or_default(),
        partner_name: row.partner_name.unwrap_or_default(),
        partner_img: row.partner_img.unwrap_or_default(),
        route: row.route.unwrap_or_default(),
        time: row.time.unwrap_or_default(),
        cost: row.cost.unwrap_or(0.0),
        status: TripStatus::parse(row.status.as_deref().unwrap_or("")),
        role: UserRole::parse(row.role.as_deref().unwrap_or("")),
        vehicle_type: VehicleType::parse(row.vehicle_type.as_deref().unwrap_or("")),
        vehicle_info: row.vehicle_info.unwrap_or_default(),
    }
}

pub async fn list_trips(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Vec<Trip>> {
    let rows = trip_repo::list_trips_for_user(pool, user_id).await?;
    Ok(rows.into_iter().map(map_trip_row).collect())
}

/// Advance a trip one step along the lifecycle and return the caller's
/// refreshed trip list. The successor is computed here from the stored
/// status, so a caller can neither skip ahead nor move backwards; advancing
/// a completed trip is a no-op, as is advancing a trip the caller does not
/// own.
pub async fn advance_trip_status(
    pool: &SqlitePool,
    user_id: &str,
    trip_id: &str,
) -> sqlx::Result<Vec<Trip>> {
    if let Some(row) = trip_repo::load_trip_for_user(pool, trip_id, user_id).await? {
        let current = TripStatus::parse(row.status.as_deref().unwrap_or(""));
        if let Some(next) = current.successor() {
            trip_repo::set_trip_status(pool, trip_id, user_id, next.as_str()).await?;
        }
    }
    list_trips(pool, user_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_chain_walks_forward_one_step() {
        let chain = [
            TripStatus::Confirmed,
            TripStatus::Arriving,
            TripStatus::AtPickup,
            TripStatus::InTransit,
            TripStatus::Completed,
        ];
        for pair in chain.windows(2) {
            assert_eq!(pair[0].successor(), Some(pair[1]));
        }
    }

    #[test]
    fn completed_is_terminal() {
        assert_eq!(TripStatus::Completed.successor(), None);
    }

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [
            TripStatus::Confirmed,
            TripStatus::Arriving,
            TripStatus::AtPickup,
            TripStatus::InTransit,
            TripStatus::Completed,
        ] {
            assert_eq!(TripStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_defaults_to_confirmed() {
        assert_eq!(TripStatus::parse("teleporting"), TripStatus::Confirmed);
    }
}
