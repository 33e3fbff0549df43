use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::booking_service::{self, BookingOutcome};
use crate::services::matching::{self, RideFilters};
use crate::services::profile_service;
use crate::services::ride_service::{self, Ride, RideDraft, VehicleType};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::{notice_message, rupees, session_user};

#[derive(Debug, Deserialize, Default)]
pub struct RideBoardQuery {
    pub vehicle: Option<String>,
    pub women_only: Option<bool>,
    pub vicinity: Option<bool>,
    pub notice: Option<String>,
}

pub struct RideCardView {
    pub id: String,
    pub driver_name: String,
    pub driver_img: String,
    pub rating_label: String,
    pub car: String,
    pub vehicle_label: String,
    pub route: String,
    pub time: String,
    pub cost_label: String,
    pub seats_left: i64,
    pub seats_total: i64,
    pub circle_label: String,
    pub circle_name: String,
    pub is_women_only: bool,
    pub is_peak: bool,
    pub bookable: bool,
}

#[derive(Default)]
pub struct AppliedRideFilters {
    pub vehicle_value: String,
    pub women_only: bool,
    pub vicinity: bool,
    pub all_href: String,
    pub bike_href: String,
    pub auto_href: String,
    pub car_href: String,
    pub women_toggle_href: String,
    pub vicinity_toggle_href: String,
}

#[derive(Template)]
#[template(path = "rides.html")]
pub struct RidesTemplate {
    pub profile_name: String,
    pub balance_label: String,
    pub credits_label: String,
    pub workplace: String,
    pub rides: Vec<RideCardView>,
    pub filters: AppliedRideFilters,
    pub vicinity_match_count: usize,
    pub notice: String,
}

fn board_href(vehicle: &str, women_only: bool, vicinity: bool) -> String {
    let mut href = String::from("/rides");
    let mut params: Vec<String> = Vec::new();
    if !vehicle.is_empty() {
        params.push(format!("vehicle={}", vehicle));
    }
    if women_only {
        params.push("women_only=true".to_string());
    }
    if vicinity {
        params.push("vicinity=true".to_string());
    }
    if !params.is_empty() {
        href.push('?');
        href.push_str(&params.join("&"));
    }
    href
}

fn applied_filters(query: &RideBoardQuery) -> AppliedRideFilters {
    let vehicle = query.vehicle.clone().unwrap_or_default();
    let women_only = query.women_only.unwrap_or(false);
    let vicinity = query.vicinity.unwrap_or(false);
    AppliedRideFilters {
        all_href: board_href("", women_only, vicinity),
        bike_href: board_href("bike", women_only, vicinity),
        auto_href: board_href("auto", women_only, vicinity),
        car_href: board_href("car", women_only, vicinity),
        women_toggle_href: board_href(&vehicle, !women_only, vicinity),
        vicinity_toggle_href: board_href(&vehicle, women_only, !vicinity),
        vehicle_value: vehicle,
        women_only,
        vicinity,
    }
}

fn card_view(ride: Ride) -> RideCardView {
    RideCardView {
        rating_label: format!("{:.1}", ride.driver_rating),
        vehicle_label: ride.vehicle_type.label().to_string(),
        cost_label: rupees(ride.cost),
        circle_label: ride.circle_type.label().to_string(),
        is_peak: matching::is_peak_hour(&ride.time),
        bookable: ride.seats_left > 0,
        id: ride.id,
        driver_name: ride.driver_name,
        driver_img: ride.driver_img,
        car: ride.car,
        route: ride.route,
        time: ride.time,
        seats_left: ride.seats_left,
        seats_total: ride.seats_total,
        circle_name: ride.circle_name,
        is_women_only: ride.is_women_only,
    }
}

pub async fn rides_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<RideBoardQuery>,
    State(pool): State<SqlitePool>,
) -> Html<String> {
    let profile = profile_service::current_profile(&pool, Some(session_user(&auth_user))).await;

    // A failed read renders an empty board rather than an error page.
    let rides = ride_service::list_rides(&pool).await.unwrap_or_else(|e| {
        warn!("Ride listing failed: {}", e);
        vec![]
    });

    let filters = applied_filters(&query);
    let ride_filters = RideFilters {
        vehicle_type: (!filters.vehicle_value.is_empty())
            .then(|| VehicleType::parse(&filters.vehicle_value)),
        women_only: filters.women_only,
        same_vicinity: filters.vicinity,
    };
    let vicinity_match_count = matching::vicinity_match_count(&rides, &profile.workplace);
    let visible = matching::apply_ride_filters(&rides, &ride_filters, &profile.workplace);

    let template = RidesTemplate {
        profile_name: profile.name,
        balance_label: rupees(profile.balance),
        credits_label: rupees(profile.commute_credits),
        workplace: profile.workplace,
        rides: visible.into_iter().map(card_view).collect(),
        filters,
        vicinity_match_count,
        notice: notice_message(query.notice.as_deref().unwrap_or("")),
    };
    Html(template.render().unwrap())
}

#[derive(Debug, Deserialize)]
pub struct RideCreateForm {
    pub route: String,
    pub time: String,
    pub cost: f64,
    pub seats_total: i64,
    pub women_only: Option<String>,
}

pub async fn create_ride_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Form(form): Form<RideCreateForm>,
) -> impl IntoResponse {
    let draft = RideDraft {
        route: form.route,
        time: form.time,
        cost: form.cost,
        seats_total: form.seats_total.max(1),
        is_women_only: form.women_only.is_some(),
    };

    let notice = match ride_service::create_ride(&pool, session_user(&auth_user), &draft).await {
        Ok(_) => "ride_created",
        Err(e) => {
            warn!("Ride creation failed: {}", e);
            "ride_create_failed"
        }
    };
    Redirect::to(&format!("/offer?notice={}", notice))
}

#[derive(Debug, Deserialize, Default)]
pub struct BookRideForm {
    pub use_credits: Option<String>,
}

pub async fn book_ride_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(ride_id): Path<String>,
    State(pool): State<SqlitePool>,
    Form(form): Form<BookRideForm>,
) -> impl IntoResponse {
    let use_credits = form.use_credits.is_some();
    let notice = match booking_service::book_ride(
        &pool,
        session_user(&auth_user),
        &ride_id,
        use_credits,
    )
    .await
    {
        Ok(BookingOutcome::Booked) => "booked",
        Ok(BookingOutcome::RideUnavailable) => "ride_unavailable",
        Ok(BookingOutcome::InsufficientBalance) => "insufficient_balance",
        Err(e) => {
            warn!("Booking failed for ride {}: {}", ride_id, e);
            "booking_failed"
        }
    };
    Redirect::to(&format!("/rides?notice={}", notice))
}
