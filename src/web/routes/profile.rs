use askama::Template;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect},
    Extension, Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::warn;

use crate::services::profile_service::{
    self, CarInfo, EmergencyContact, Gender, Profile, ProfilePatch, UserRole,
};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::routes::{notice_message, rupees, session_user};

pub struct ProfileFormView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_phone_verified: bool,
    pub gender_value: String,
    pub workplace: String,
    pub role_value: String,
    pub balance_label: String,
    pub credits_label: String,
    pub home: String,
    pub work: String,
    pub start_time: String,
    pub end_time: String,
    pub bio: String,
    pub emergency_name: String,
    pub emergency_phone: String,
    pub car_model: String,
    pub car_color: String,
    pub car_seats: String,
    pub car_plate: String,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub p: ProfileFormView,
    pub notice: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProfileQuery {
    pub notice: Option<String>,
}

fn form_view(profile: Profile) -> ProfileFormView {
    let contact = profile.emergency_contact.unwrap_or_default();
    let car = profile.car.unwrap_or_default();
    ProfileFormView {
        name: profile.name,
        email: profile.email,
        phone: profile.phone.unwrap_or_default(),
        is_phone_verified: profile.is_phone_verified,
        gender_value: profile.gender.as_str().to_string(),
        workplace: profile.workplace,
        role_value: profile.role.as_str().to_string(),
        balance_label: rupees(profile.balance),
        credits_label: rupees(profile.commute_credits),
        home: profile.home,
        work: profile.work,
        start_time: profile.start_time,
        end_time: profile.end_time,
        bio: profile.bio,
        emergency_name: contact.name,
        emergency_phone: contact.phone,
        car_model: car.model,
        car_color: car.color,
        car_seats: car.seats,
        car_plate: car.license_plate,
    }
}

pub async fn profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<ProfileQuery>,
    State(pool): State<SqlitePool>,
) -> Html<String> {
    let profile = profile_service::current_profile(&pool, Some(session_user(&auth_user))).await;
    let template = ProfileTemplate {
        p: form_view(profile),
        notice: notice_message(query.notice.as_deref().unwrap_or("")),
    };
    Html(template.render().unwrap())
}

#[derive(Debug, Deserialize, Default)]
pub struct ProfileForm {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub workplace: Option<String>,
    pub home: Option<String>,
    pub work: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub bio: Option<String>,
    pub emergency_name: Option<String>,
    pub emergency_phone: Option<String>,
    pub car_model: Option<String>,
    pub car_color: Option<String>,
    pub car_seats: Option<String>,
    pub car_plate: Option<String>,
}

// Sparse patch: only fields present in the submitted form are written.
fn build_patch(form: ProfileForm) -> ProfilePatch {
    let emergency_contact = if form.emergency_name.is_some() || form.emergency_phone.is_some() {
        Some(EmergencyContact {
            name: form.emergency_name.unwrap_or_default(),
            phone: form.emergency_phone.unwrap_or_default(),
        })
    } else {
        None
    };

    let car = if form.car_model.is_some()
        || form.car_color.is_some()
        || form.car_seats.is_some()
        || form.car_plate.is_some()
    {
        Some(CarInfo {
            model: form.car_model.unwrap_or_default(),
            color: form.car_color.unwrap_or_default(),
            seats: form.car_seats.unwrap_or_default(),
            license_plate: form.car_plate.unwrap_or_default(),
        })
    } else {
        None
    };

    ProfilePatch {
        name: form.name,
        gender: form.gender.as_deref().map(Gender::parse),
        phone: form.phone,
        workplace: form.workplace,
        home: form.home,
        work: form.work,
        start_time: form.start_time,
        end_time: form.end_time,
        bio: form.bio,
        emergency_contact,
        car,
        ..ProfilePatch::default()
    }
}

pub async fn update_profile_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Form(form): Form<ProfileForm>,
) -> impl IntoResponse {
    let patch = build_patch(form);
    let notice =
        match profile_service::update_profile(&pool, Some(session_user(&auth_user)), &patch).await
        {
            Ok(_) => "profile_saved",
            Err(e) => {
                warn!("Profile save failed for {}: {}", auth_user.id, e);
                "profile_save_failed"
            }
        };
    Redirect::to(&format!("/profile?notice={}", notice))
}

#[derive(Debug, Deserialize)]
pub struct SwitchRoleForm {
    pub role: String,
}

/// Rider/driver is a free toggle; switching lands the user on the matching
/// dashboard view.
pub async fn switch_role_handler(
    Extension(auth_user): Extension<AuthenticatedUser>,
    State(pool): State<SqlitePool>,
    Form(form): Form<SwitchRoleForm>,
) -> impl IntoResponse {
    let role = UserRole::parse(&form.role);
    let patch = ProfilePatch {
        role: Some(role),
        ..ProfilePatch::default()
    };

    if let Err(e) =
        profile_service::update_profile(&pool, Some(session_user(&auth_user)), &patch).await
    {
        warn!("Role switch failed for {}: {}", auth_user.id, e);
    }

    match role {
        UserRole::Driver => Redirect::to("/offer"),
        UserRole::Rider => Redirect::to("/rides"),
    }
}
