use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Executor, SqlitePool};

use humsafar::services::booking_service::{self, BookingOutcome};
use humsafar::services::profile_service::{
    self, CarInfo, ProfileError, ProfilePatch, SessionUser, UserRole,
};
use humsafar::services::request_service::{self, AcceptOutcome, RequestDraft};
use humsafar::services::ride_service::{self, Ride, RideDraft};
use humsafar::services::trip_service::{self, TripStatus};

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    pool.execute(include_str!("../schema.sql"))
        .await
        .expect("schema");
    pool
}

fn session<'a>(user_id: &'a str, name: &'a str) -> SessionUser<'a> {
    SessionUser {
        user_id,
        email: Some("commuter@example.com"),
        display_name: Some(name),
    }
}

async fn profile_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
        .fetch_one(pool)
        .await
        .expect("count")
}

async fn seats_left(pool: &SqlitePool, ride_id: &str) -> i64 {
    sqlx::query_scalar("SELECT seats_left FROM rides WHERE id = ?1")
        .bind(ride_id)
        .fetch_one(pool)
        .await
        .expect("seats_left")
}

async fn publish_ride(pool: &SqlitePool, driver_id: &str, cost: f64, seats: i64) -> Ride {
    let driver = session(driver_id, "Ravi");
    profile_service::current_profile(pool, Some(driver)).await;
    let patch = ProfilePatch {
        home: Some("Anna Nagar, Chennai".to_string()),
        car: Some(CarInfo {
            model: "Swift".to_string(),
            color: "Red".to_string(),
            seats: "4".to_string(),
            license_plate: "TN 01 AB 1234".to_string(),
        }),
        ..ProfilePatch::default()
    };
    profile_service::update_profile(pool, Some(driver), &patch)
        .await
        .expect("driver profile");

    let draft = RideDraft {
        route: "Anna Nagar → DLF IT Park".to_string(),
        time: "8:30 AM".to_string(),
        cost,
        seats_total: seats,
        is_women_only: false,
    };
    ride_service::create_ride(pool, driver, &draft)
        .await
        .expect("create ride")
}

#[tokio::test]
async fn no_session_yields_guest_profile() {
    let pool = test_pool().await;
    let profile = profile_service::current_profile(&pool, None).await;
    assert_eq!(profile.id, "guest");
    assert_eq!(profile.balance, 0.0);
    assert_eq!(profile.commute_credits, 0.0);
    assert_eq!(profile_count(&pool).await, 0);
}

#[tokio::test]
async fn first_login_bootstrap_is_idempotent() {
    let pool = test_pool().await;
    let s = session("user-1", "Asha");

    let first = profile_service::current_profile(&pool, Some(s)).await;
    let second = profile_service::current_profile(&pool, Some(s)).await;

    assert_eq!(first.id, "user-1");
    assert_eq!(second.id, "user-1");
    assert_eq!(first.name, "Asha");
    assert_eq!(first.balance, 1000.0);
    assert_eq!(first.commute_credits, 50.0);
    assert_eq!(second.balance, 1000.0);
    assert_eq!(second.commute_credits, 50.0);
    assert_eq!(profile_count(&pool).await, 1);
}

#[tokio::test]
async fn bootstrap_without_display_name_uses_placeholder() {
    let pool = test_pool().await;
    let s = SessionUser {
        user_id: "user-2",
        email: Some("anon@example.com"),
        display_name: None,
    };
    let profile = profile_service::current_profile(&pool, Some(s)).await;
    assert_eq!(profile.name, "New User");
    assert_eq!(profile.role, UserRole::Rider);
}

#[tokio::test]
async fn update_profile_requires_a_session() {
    let pool = test_pool().await;
    let patch = ProfilePatch {
        name: Some("Nobody".to_string()),
        ..ProfilePatch::default()
    };
    let err = profile_service::update_profile(&pool, None, &patch)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ProfileError::Unauthenticated));
}

#[tokio::test]
async fn profile_patch_is_sparse_and_maps_work_to_work_loc() {
    let pool = test_pool().await;
    let s = session("user-3", "Asha");
    profile_service::current_profile(&pool, Some(s)).await;

    let patch = ProfilePatch {
        workplace: Some("DLF IT Park".to_string()),
        work: Some("OMR".to_string()),
        ..ProfilePatch::default()
    };
    let updated = profile_service::update_profile(&pool, Some(s), &patch)
        .await
        .expect("update");

    // Untouched fields keep their bootstrap values.
    assert_eq!(updated.name, "Asha");
    assert_eq!(updated.balance, 1000.0);
    assert_eq!(updated.workplace, "DLF IT Park");
    assert_eq!(updated.work, "OMR");

    let stored: String = sqlx::query_scalar("SELECT work_loc FROM profiles WHERE id = ?1")
        .bind("user-3")
        .fetch_one(&pool)
        .await
        .expect("work_loc");
    assert_eq!(stored, "OMR");
}

#[tokio::test]
async fn created_ride_is_listed_with_all_seats_free() {
    let pool = test_pool().await;
    let ride = publish_ride(&pool, "driver-1", 60.0, 3).await;

    let rides = ride_service::list_rides(&pool).await.expect("list");
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].id, ride.id);
    assert_eq!(rides[0].seats_left, rides[0].seats_total);
    assert_eq!(rides[0].seats_left, 3);
    assert_eq!(rides[0].circle_name, "Anna Nagar");
    assert_eq!(rides[0].car, "Swift");

    // The driver's companion trip is created in the same transaction.
    let trips = trip_service::list_trips(&pool, "driver-1").await.expect("trips");
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].role, UserRole::Driver);
    assert_eq!(trips[0].partner_name, "Waiting for Riders");
    assert_eq!(trips[0].status, TripStatus::Confirmed);
}

#[tokio::test]
async fn booking_debits_wallet_after_credits() {
    let pool = test_pool().await;
    let ride = publish_ride(&pool, "driver-1", 100.0, 2).await;

    let rider = session("rider-1", "Meena");
    profile_service::current_profile(&pool, Some(rider)).await;

    // Signup bonus: balance 1000, credits 40 after adjusting for the test.
    let patch = ProfilePatch {
        commute_credits: Some(40.0),
        ..ProfilePatch::default()
    };
    profile_service::update_profile(&pool, Some(rider), &patch)
        .await
        .expect("set credits");

    let outcome = booking_service::book_ride(&pool, rider, &ride.id, true)
        .await
        .expect("book");
    assert_eq!(outcome, BookingOutcome::Booked);

    let profile = profile_service::current_profile(&pool, Some(rider)).await;
    assert_eq!(profile.balance, 940.0);
    assert_eq!(profile.commute_credits, 0.0);
    assert!(profile.balance >= 0.0);
    assert_eq!(seats_left(&pool, &ride.id).await, 1);

    let trips = trip_service::list_trips(&pool, "rider-1").await.expect("trips");
    assert_eq!(trips.len(), 1);
    assert_eq!(trips[0].role, UserRole::Rider);
    assert_eq!(trips[0].partner_name, "Ravi");
    assert_eq!(trips[0].cost, 100.0);
}

#[tokio::test]
async fn surplus_credits_cover_the_whole_fare() {
    let pool = test_pool().await;
    let ride = publish_ride(&pool, "driver-1", 100.0, 2).await;

    let rider = session("rider-1", "Meena");
    profile_service::current_profile(&pool, Some(rider)).await;
    let patch = ProfilePatch {
        commute_credits: Some(150.0),
        ..ProfilePatch::default()
    };
    profile_service::update_profile(&pool, Some(rider), &patch)
        .await
        .expect("set credits");

    let outcome = booking_service::book_ride(&pool, rider, &ride.id, true)
        .await
        .expect("book");
    assert_eq!(outcome, BookingOutcome::Booked);

    let profile = profile_service::current_profile(&pool, Some(rider)).await;
    assert_eq!(profile.balance, 1000.0);
    assert_eq!(profile.commute_credits, 50.0);
}

#[tokio::test]
async fn booking_a_full_ride_leaves_no_trace() {
    let pool = test_pool().await;
    let ride = publish_ride(&pool, "driver-1", 50.0, 1).await;

    let first = session("rider-1", "Meena");
    profile_service::current_profile(&pool, Some(first)).await;
    let outcome = booking_service::book_ride(&pool, first, &ride.id, false)
        .await
        .expect("book");
    assert_eq!(outcome, BookingOutcome::Booked);
    assert_eq!(seats_left(&pool, &ride.id).await, 0);

    let second = session("rider-2", "Kavya");
    profile_service::current_profile(&pool, Some(second)).await;
    let outcome = booking_service::book_ride(&pool, second, &ride.id, false)
        .await
        .expect("book");
    assert_eq!(outcome, BookingOutcome::RideUnavailable);

    let profile = profile_service::current_profile(&pool, Some(second)).await;
    assert_eq!(profile.balance, 1000.0);
    assert_eq!(profile.commute_credits, 50.0);
    assert_eq!(seats_left(&pool, &ride.id).await, 0);
    let trips = trip_service::list_trips(&pool, "rider-2").await.expect("trips");
    assert!(trips.is_empty());
}

#[tokio::test]
async fn missing_ride_is_unavailable() {
    let pool = test_pool().await;
    let rider = session("rider-1", "Meena");
    profile_service::current_profile(&pool, Some(rider)).await;
    let outcome = booking_service::book_ride(&pool, rider, "no-such-ride", false)
        .await
        .expect("book");
    assert_eq!(outcome, BookingOutcome::RideUnavailable);
}

#[tokio::test]
async fn insufficient_balance_blocks_before_any_write() {
    let pool = test_pool().await;
    let ride = publish_ride(&pool, "driver-1", 5000.0, 2).await;

    let rider = session("rider-1", "Meena");
    profile_service::current_profile(&pool, Some(rider)).await;
    let outcome = booking_service::book_ride(&pool, rider, &ride.id, false)
        .await
        .expect("book");
    assert_eq!(outcome, BookingOutcome::InsufficientBalance);

    let profile = profile_service::current_profile(&pool, Some(rider)).await;
    assert_eq!(profile.balance, 1000.0);
    assert_eq!(profile.commute_credits, 50.0);
    assert_eq!(seats_left(&pool, &ride.id).await, 2);
    let trips = trip_service::list_trips(&pool, "rider-1").await.expect("trips");
    assert!(trips.is_empty());
}

#[tokio::test]
async fn status_advances_one_step_per_call_and_stops_at_completed() {
    let pool = test_pool().await;
    publish_ride(&pool, "driver-1", 60.0, 3).await;

    let trips = trip_service::list_trips(&pool, "driver-1").await.expect("trips");
    let trip_id = trips[0].id.clone();

    let expected = [
        TripStatus::Arriving,
        TripStatus::AtPickup,
        TripStatus::InTransit,
        TripStatus::Completed,
    ];
    for status in expected {
        let trips = trip_service::advance_trip_status(&pool, "driver-1", &trip_id)
            .await
            .expect("advance");
        assert_eq!(trips[0].status, status);
    }

    // A completed trip is terminal: another advance is a no-op.
    let trips = trip_service::advance_trip_status(&pool, "driver-1", &trip_id)
        .await
        .expect("advance");
    assert_eq!(trips[0].status, TripStatus::Completed);
}

#[tokio::test]
async fn advancing_someone_elses_trip_changes_nothing() {
    let pool = test_pool().await;
    publish_ride(&pool, "driver-1", 60.0, 3).await;
    let trips = trip_service::list_trips(&pool, "driver-1").await.expect("trips");
    let trip_id = trips[0].id.clone();

    trip_service::advance_trip_status(&pool, "intruder", &trip_id)
        .await
        .expect("advance");

    let trips = trip_service::list_trips(&pool, "driver-1").await.expect("trips");
    assert_eq!(trips[0].status, TripStatus::Confirmed);
}

#[tokio::test]
async fn accepted_request_creates_ride_and_both_trips() {
    let pool = test_pool().await;

    let rider = session("rider-1", "Meena");
    profile_service::current_profile(&pool, Some(rider)).await;
    let draft = RequestDraft {
        route: "Velachery → SIPCOT".to_string(),
        time: "9:00 AM".to_string(),
    };
    let request = request_service::post_ride_request(&pool, rider, &draft)
        .await
        .expect("post request");
    assert_eq!(request.distance, "Just posted");

    let pending = request_service::list_pending_requests(&pool)
        .await
        .expect("pending");
    assert_eq!(pending.len(), 1);

    let driver = session("driver-1", "Ravi");
    profile_service::current_profile(&pool, Some(driver)).await;
    let outcome = request_service::accept_ride_request(&pool, driver, &request.id)
        .await
        .expect("accept");
    assert_eq!(outcome, AcceptOutcome::Accepted);

    // The board no longer shows the accepted request.
    let pending = request_service::list_pending_requests(&pool)
        .await
        .expect("pending");
    assert!(pending.is_empty());

    // The promoted ride has its single seat already filled.
    let rides = ride_service::list_rides(&pool).await.expect("rides");
    assert_eq!(rides.len(), 1);
    assert_eq!(rides[0].cost, 75.0);
    assert_eq!(rides[0].seats_total, 1);
    assert_eq!(rides[0].seats_left, 0);

    let driver_trips = trip_service::list_trips(&pool, "driver-1").await.expect("trips");
    assert_eq!(driver_trips.len(), 1);
    assert_eq!(driver_trips[0].role, UserRole::Driver);
    assert_eq!(driver_trips[0].partner_name, "Meena");

    let rider_trips = trip_service::list_trips(&pool, "rider-1").await.expect("trips");
    assert_eq!(rider_trips.len(), 1);
    assert_eq!(rider_trips[0].role, UserRole::Rider);
    assert_eq!(rider_trips[0].partner_name, "Ravi");
}

#[tokio::test]
async fn request_can_only_be_accepted_once() {
    let pool = test_pool().await;

    let rider = session("rider-1", "Meena");
    profile_service::current_profile(&pool, Some(rider)).await;
    let draft = RequestDraft {
        route: "Velachery → SIPCOT".to_string(),
        time: "9:00 AM".to_string(),
    };
    let request = request_service::post_ride_request(&pool, rider, &draft)
        .await
        .expect("post request");

    let driver = session("driver-1", "Ravi");
    profile_service::current_profile(&pool, Some(driver)).await;
    let first = request_service::accept_ride_request(&pool, driver, &request.id)
        .await
        .expect("accept");
    assert_eq!(first, AcceptOutcome::Accepted);

    let again = request_service::accept_ride_request(&pool, driver, &request.id)
        .await
        .expect("accept");
    assert_eq!(again, AcceptOutcome::RequestUnavailable);

    let rides = ride_service::list_rides(&pool).await.expect("rides");
    assert_eq!(rides.len(), 1);
}

#[tokio::test]
async fn accepting_a_missing_request_is_unavailable() {
    let pool = test_pool().await;
    let driver = session("driver-1", "Ravi");
    profile_service::current_profile(&pool, Some(driver)).await;
    let outcome = request_service::accept_ride_request(&pool, driver, "no-such-request")
        .await
        .expect("accept");
    assert_eq!(outcome, AcceptOutcome::RequestUnavailable);
}
