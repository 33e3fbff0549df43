use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::profile_service::UserRole;
use crate::services::trip_service::{self, Trip, TripStatus};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::{notice_message, rupees};

pub struct TripView {
    pub id: String,
    pub partner_name: String,
    pub partner_img: String,
    pub route: String,
    pub time: String,
    pub cost_label: String,
    pub status_label: String,
    pub progress_pct: u8,
    pub role_label: String,
    pub vehicle_info: String,
    pub advance_label: String,
}

#[derive(Template)]
#[template(path = "trips.html")]
pub struct TripsTemplate {
    pub active: Vec<TripView>,
    pub past: Vec<TripView>,
    pub notice: String,
    pub rate_trip_id: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct TripsQuery {
    pub notice: Option<String>,
    pub rate: Option<String>,
}

fn trip_view(trip: Trip) -> TripView {
    let advance_label = match trip.status.successor() {
        Some(TripStatus::Completed) => "End Trip",
        _ => "Update Status",
    };
    TripView {
        cost_label: rupees(trip.cost),
        status_label: trip.status.label().to_string(),
        progress_pct: trip.status.progress_pct(),
        role_label: match trip.role {
            UserRole::Driver => "Driving",
            UserRole::Rider => "Riding",
        }
        .to_string(),
        advance_label: advance_label.to_string(),
        id: trip.id,
        partner_name: trip.partner_name,
        partner_img: trip.partner_img,
        route: trip.route,
        time: trip.time,
        vehicle_info: trip.vehicle_info,
    }
}

pub async fn trips_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<TripsQuery>,
    State(pool): State<SqlitePool>,
) -> Html<String> {
    let trips = trip_service::list_trips(&pool, &auth_user.id)
        .await
        .unwrap_or_else(|e| {
            warn!("Trip listing failed for {}: {}", auth_user.id, e);
            vec![]
        });

    let (past, active): (Vec<Trip>, Vec<Trip>) =
        trips.into_iter().partition(|t| t.status.is_completed());

    let template = TripsTemplate {
        active: active.into_iter().map(trip_view).collect(),
        past: past.into_iter().map(trip_view).collect(),
        notice: notice_message(query.notice.as_deref().unwrap_or("")),
        rate_trip_id: query.rate.unwrap_or_default(),
    };
    Html(template.render().unwrap())
}

pub async fn advance_status_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(trip_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> impl IntoResponse {
    match trip_service::advance_trip_status(&pool, &auth_user.id, &trip_id).await {
        Ok(trips) => {
            // A trip that just completed opens the rating flow.
            let completed = trips
                .iter()
                .any(|t| t.id == trip_id && t.status.is_completed());
            if completed {
                Redirect::to(&format!("/trips?rate={}", trip_id))
            } else {
                Redirect::to("/trips")
            }
        }
        Err(e) => {
            warn!("Status advance failed for trip {}: {}", trip_id, e);
            Redirect::to("/trips")
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FeedbackForm {
    #[allow(dead_code)]
    pub rating: Option<u8>,
    #[allow(dead_code)]
    pub tags: Option<String>,
}

// Ratings are presentational: the flow acknowledges the submission without
// persisting it anywhere.
pub async fn feedback_handler(
    Extension(_auth_user): Extension<AuthenticatedUser>,
    Path(_trip_id): Path<String>,
    Form(_form): Form<FeedbackForm>,
) -> impl IntoResponse {
    Redirect::to("/trips?notice=feedback_thanks")
}
