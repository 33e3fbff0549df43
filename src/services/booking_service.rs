use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::{profile_repo, ride_repo, trip_repo};
use crate::services::profile_service::{self, SessionUser, UserRole};
use crate::services::trip_service::TripStatus;

/// Outcome of the commute-credit settlement rule. Credits are applied before
/// cash: a ride fully covered by credits costs nothing, otherwise credits
/// are exhausted first and the remainder is billed against the wallet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub payable: f64,
    pub credits_after: f64,
}

pub fn resolve_settlement(cost: f64, credits: f64, use_credits: bool) -> Settlement {
    if !use_credits {
        return Settlement {
            payable: cost,
            credits_after: credits,
        };
    }
    if credits >= cost {
        Settlement {
            payable: 0.0,
            credits_after: credits - cost,
        }
    } else {
        Settlement {
            payable: cost - credits,
            credits_after: 0.0,
        }
    }
}

/// Routine booking failures are values, not errors: the dashboard handles
/// them inline (seat taken by someone else, wallet too low).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked,
    RideUnavailable,
    InsufficientBalance,
}

/// Book a seat on a ride. The wallet debit, the seat decrement and the trip
/// insert commit together or not at all; the seat decrement is a
/// compare-and-swap so two bookings racing for the last seat cannot both
/// succeed.
pub async fn book_ride(
    pool: &SqlitePool,
    session: SessionUser<'_>,
    ride_id: &str,
    use_credits: bool,
) -> sqlx::Result<BookingOutcome> {
    let user = profile_service::current_profile(pool, Some(session)).await;

    let mut tx = pool.begin().await?;

    let Some(ride) = ride_repo::load_ride(&mut *tx, ride_id).await? else {
        return Ok(BookingOutcome::RideUnavailable);
    };
    if ride.seats_left.unwrap_or(0) <= 0 {
        return Ok(BookingOutcome::RideUnavailable);
    }

    let cost = ride.cost.unwrap_or(0.0);
    let settlement = resolve_settlement(cost, user.commute_credits, use_credits);

    // Checked before any write: a failed booking must leave no trace.
    if user.balance < settlement.payable {
        return Ok(BookingOutcome::InsufficientBalance);
    }
    let new_balance = user.balance - settlement.payable;

    profile_repo::apply_settlement(&mut *tx, &user.id, new_balance, settlement.credits_after)
        .await?;

    if ride_repo::take_seat(&mut *tx, ride_id).await? == 0 {
        // Lost the last seat to a concurrent booking; the dropped
        // transaction rolls the debit back.
        return Ok(BookingOutcome::RideUnavailable);
    }

    let trip_id = Uuid::new_v4().to_string();
    let rider_trip = trip_repo::NewTrip {
        id: &trip_id,
        user_id: &user.id,
        ride_id: &ride.id,
        partner_name: ride.driver_name.as_deref().unwrap_or(""),
        partner_img: ride.driver_img.as_deref().unwrap_or(""),
        route: ride.route.as_deref().unwrap_or(""),
        time: ride.time.as_deref().unwrap_or(""),
        cost,
        status: TripStatus::Confirmed.as_str(),
        role: UserRole::Rider.as_str(),
        vehicle_type: ride.vehicle_type.as_deref().unwrap_or("car"),
        vehicle_info: ride.car.as_deref().unwrap_or(""),
    };
    trip_repo::insert_trip(&mut *tx, &rider_trip).await?;

    tx.commit().await?;
    Ok(BookingOutcome::Booked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_credits_are_exhausted_first() {
        let s = resolve_settlement(100.0, 40.0, true);
        assert_eq!(s.payable, 60.0);
        assert_eq!(s.credits_after, 0.0);
    }

    #[test]
    fn surplus_credits_cover_the_full_cost() {
        let s = resolve_settlement(100.0, 150.0, true);
        assert_eq!(s.payable, 0.0);
        assert_eq!(s.credits_after, 50.0);
    }

    #[test]
    fn credits_untouched_when_not_requested() {
        let s = resolve_settlement(100.0, 40.0, false);
        assert_eq!(s.payable, 100.0);
        assert_eq!(s.credits_after, 40.0);
    }

    #[test]
    fn exact_credit_match_leaves_zero() {
        let s = resolve_settlement(75.0, 75.0, true);
        assert_eq!(s.payable, 0.0);
        assert_eq!(s.credits_after, 0.0);
    }
}
