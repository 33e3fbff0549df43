use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::profile_service;
use crate::services::request_service::{self, AcceptOutcome, RequestDraft, RideRequest};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::{notice_message, session_user};

pub struct RequestCardView {
    pub id: String,
    pub rider_name: String,
    pub rider_img: String,
    pub route: String,
    pub time: String,
    pub distance: String,
}

#[derive(Template)]
#[template(path = "offer.html")]
pub struct OfferTemplate {
    pub profile_name: String,
    pub requests: Vec<RequestCardView>,
    pub notice: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct OfferQuery {
    pub notice: Option<String>,
}

fn request_view(request: RideRequest) -> RequestCardView {
    RequestCardView {
        id: request.id,
        rider_name: request.rider_name,
        rider_img: request.rider_img,
        route: request.route,
        time: request.time,
        distance: request.distance,
    }
}

/// Driver view: the ride creator plus the board of pending rider requests.
pub async fn offer_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<OfferQuery>,
    State(pool): State<SqlitePool>,
) -> Html<String> {
    let profile = profile_service::current_profile(&pool, Some(session_user(&auth_user))).await;

    let requests = request_service::list_pending_requests(&pool)
        .await
        .unwrap_or_else(|e| {
            warn!("Request listing failed: {}", e);
            vec![]
        });

    let template = OfferTemplate {
        profile_name: profile.name,
        requests: requests.into_iter().map(request_view).collect(),
        notice: notice_message(query.notice.as_deref().unwrap_or("")),
    };
    Html(template.render().unwrap())
}

#[derive(Debug, Deserialize)]
pub struct RequestForm {
    pub route: String,
    pub time: String,
}

pub async fn post_request_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Form(form): Form<RequestForm>,
) -> impl IntoResponse {
    let draft = RequestDraft {
        route: form.route,
        time: form.time,
    };
    let notice =
        match request_service::post_ride_request(&pool, session_user(&auth_user), &draft).await {
            Ok(_) => "request_posted",
            Err(e) => {
                warn!("Request post failed: {}", e);
                "request_failed"
            }
        };
    Redirect::to(&format!("/rides?notice={}", notice))
}

pub async fn accept_request_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Path(request_id): Path<String>,
    State(pool): State<SqlitePool>,
) -> impl IntoResponse {
    let notice = match request_service::accept_ride_request(
        &pool,
        session_user(&auth_user),
        &request_id,
    )
    .await
    {
        Ok(AcceptOutcome::Accepted) => "request_accepted",
        Ok(AcceptOutcome::RequestUnavailable) => "request_unavailable",
        Err(e) => {
            warn!("Request accept failed for {}: {}", request_id, e);
            "request_failed"
        }
    };
    Redirect::to(&format!("/offer?notice={}", notice))
}
