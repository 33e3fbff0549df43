use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::warn;

use crate::database::profile_repo::{self, NewProfile, ProfileColumnPatch};
use crate::models::ProfilesRow;

/// Signup bonus credited when a profile is bootstrapped on first login.
pub const SIGNUP_BALANCE: f64 = 1000.0;
pub const SIGNUP_COMMUTE_CREDITS: f64 = 50.0;

pub const GUEST_USER_ID: &str = "guest";

/// Identity extracted from the access token by the auth middleware, passed
/// explicitly into every data-access call that needs a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionUser<'a> {
    pub user_id: &'a str,
    pub email: Option<&'a str>,
    pub display_name: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer-not-to-say",
        }
    }

    pub fn parse(input: &str) -> Gender {
        match input {
            "male" => Gender::Male,
            "female" => Gender::Female,
            "other" => Gender::Other,
            _ => Gender::PreferNotToSay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Rider,
    Driver,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Rider => "rider",
            UserRole::Driver => "driver",
        }
    }

    pub fn parse(input: &str) -> UserRole {
        match input {
            "driver" => UserRole::Driver,
            _ => UserRole::Rider,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarInfo {
    pub model: String,
    pub color: String,
    pub seats: String,
    #[serde(rename = "licensePlate")]
    pub license_plate: String,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub phone: Option<String>,
    pub is_phone_verified: bool,
    pub workplace: String,
    pub role: UserRole,
    pub balance: f64,
    pub commute_credits: f64,
    pub home: String,
    pub work: String,
    pub start_time: String,
    pub end_time: String,
    pub bio: String,
    pub emergency_contact: Option<EmergencyContact>,
    pub car: Option<CarInfo>,
}

pub fn guest_profile() -> Profile {
    Profile {
        id: GUEST_USER_ID.to_string(),
        name: "Guest User".to_string(),
        email: "guest@humsafar.app".to_string(),
        gender: Gender::Other,
        phone: None,
        is_phone_verified: false,
        workplace: String::new(),
        role: UserRole::Rider,
        balance: 0.0,
        commute_credits: 0.0,
        home: String::new(),
        work: String::new(),
        start_time: String::new(),
        end_time: String::new(),
        bio: String::new(),
        emergency_contact: None,
        car: None,
    }
}

fn parse_json_column<T: DeserializeOwned>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|s| serde_json::from_str::<T>(s).ok())
}

// Domain `work` lives in the `work_loc` column; this mapping is the
// compatibility surface with the stored schema.
fn map_profile_row(row: ProfilesRow) -> Profile {
    Profile {
        id: row.id,
        name: row.name.unwrap_or_default(),
        email: row.email.unwrap_or_default(),
        gender: Gender::parse(row.gender.as_deref().unwrap_or("")),
        phone: row.phone.filter(|p| !p.is_empty()),
        is_phone_verified: row.is_phone_verified.unwrap_or(0) == 1,
        workplace: row.workplace.unwrap_or_default(),
        role: UserRole::parse(row.role.as_deref().unwrap_or("")),
        balance: row.balance.unwrap_or(0.0),
        commute_credits: row.commute_credits.unwrap_or(0.0),
        home: row.home.unwrap_or_default(),
        work: row.work_loc.unwrap_or_default(),
        start_time: row.start_time.unwrap_or_default(),
        end_time: row.end_time.unwrap_or_default(),
        bio: row.bio.unwrap_or_default(),
        emergency_contact: parse_json_column(row.emergency_contact.as_deref()),
        car: parse_json_column(row.car.as_deref()),
    }
}

/// Resolve the current profile. Never fails: no session yields the guest
/// record, a missing row triggers first-login bootstrap, and a store failure
/// during bootstrap degrades to a guest-shaped record that keeps the real
/// authenticated id so we never hand back another user's data.
pub async fn current_profile(pool: &SqlitePool, session: Option<SessionUser<'_>>) -> Profile {
    let Some(session) = session else {
        return guest_profile();
    };

    match profile_repo::load_profile(pool, session.user_id).await {
        Ok(Some(row)) => return map_profile_row(row),
        Ok(None) => {}
        Err(e) => warn!("Profile fetch failed for {}: {}", session.user_id, e),
    }

    bootstrap_profile(pool, session).await
}

async fn bootstrap_profile(pool: &SqlitePool, session: SessionUser<'_>) -> Profile {
    let name = session
        .display_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("New User");
    let email = session.email.unwrap_or("");

    let new_profile = NewProfile {
        id: session.user_id,
        name,
        email,
        gender: Gender::PreferNotToSay.as_str(),
        role: UserRole::Rider.as_str(),
        balance: SIGNUP_BALANCE,
        commute_credits: SIGNUP_COMMUTE_CREDITS,
        is_phone_verified: false,
        home: "Not Set",
        work_loc: "Not Set",
        bio: "New Commuter",
    };

    // ON CONFLICT DO NOTHING: a racing bootstrap for the same id leaves one
    // row behind; both callers re-select and observe it.
    if let Err(e) = profile_repo::insert_profile_if_absent(pool, new_profile).await {
        warn!("Profile bootstrap insert failed for {}: {}", session.user_id, e);
    }

    match profile_repo::load_profile(pool, session.user_id).await {
        Ok(Some(row)) => map_profile_row(row),
        Ok(None) => guest_shaped(session),
        Err(e) => {
            warn!("Profile recovery failed for {}: {}", session.user_id, e);
            guest_shaped(session)
        }
    }
}

fn guest_shaped(session: SessionUser<'_>) -> Profile {
    Profile {
        id: session.user_id.to_string(),
        email: session.email.unwrap_or("").to_string(),
        ..guest_profile()
    }
}

/// Sparse update: absent fields are left untouched, not nulled.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub is_phone_verified: Option<bool>,
    pub workplace: Option<String>,
    pub role: Option<UserRole>,
    pub balance: Option<f64>,
    pub commute_credits: Option<f64>,
    pub home: Option<String>,
    pub work: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub bio: Option<String>,
    pub emergency_contact: Option<EmergencyContact>,
    pub car: Option<CarInfo>,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

pub async fn update_profile(
    pool: &SqlitePool,
    session: Option<SessionUser<'_>>,
    patch: &ProfilePatch,
) -> Result<Profile, ProfileError> {
    let Some(session) = session else {
        return Err(ProfileError::Unauthenticated);
    };

    let emergency_json = patch
        .emergency_contact
        .as_ref()
        .map(|c| serde_json::to_string(c).unwrap_or_default());
    let car_json = patch
        .car
        .as_ref()
        .map(|c| serde_json::to_string(c).unwrap_or_default());

    let columns = ProfileColumnPatch {
        name: patch.name.as_deref(),
        email: patch.email.as_deref(),
        gender: patch.gender.map(Gender::as_str),
        phone: patch.phone.as_deref(),
        is_phone_verified: patch.is_phone_verified,
        workplace: patch.workplace.as_deref(),
        role: patch.role.map(UserRole::as_str),
        balance: patch.balance,
        commute_credits: patch.commute_credits,
        home: patch.home.as_deref(),
        work_loc: patch.work.as_deref(),
        start_time: patch.start_time.as_deref(),
        end_time: patch.end_time.as_deref(),
        bio: patch.bio.as_deref(),
        emergency_contact: emergency_json.as_deref(),
        car: car_json.as_deref(),
    };

    profile_repo::update_profile_fields(pool, session.user_id, &columns).await?;
    Ok(current_profile(pool, Some(session)).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str) -> ProfilesRow {
        ProfilesRow {
            id: id.to_string(),
            name: Some("Priya".to_string()),
            email: Some("priya@example.com".to_string()),
            gender: Some("female".to_string()),
            phone: None,
            is_phone_verified: Some(1),
            workplace: Some("DLF IT Park".to_string()),
            role: Some("driver".to_string()),
            balance: Some(940.0),
            commute_credits: Some(50.0),
            home: Some("Anna Nagar, Chennai".to_string()),
            work_loc: Some("OMR".to_string()),
            start_time: Some("9:00 AM".to_string()),
            end_time: Some("6:00 PM".to_string()),
            bio: Some("Daily commuter".to_string()),
            emergency_contact: Some(r#"{"name":"Amma","phone":"98400"}"#.to_string()),
            car: Some(r#"{"model":"Swift","color":"Red","seats":"4","licensePlate":"TN 01"}"#.to_string()),
        }
    }

    #[test]
    fn maps_work_loc_column_to_work_field() {
        let profile = map_profile_row(row("u1"));
        assert_eq!(profile.work, "OMR");
        assert_eq!(profile.role, UserRole::Driver);
        assert_eq!(profile.gender, Gender::Female);
        assert!(profile.is_phone_verified);
    }

    #[test]
    fn parses_structured_json_columns() {
        let profile = map_profile_row(row("u1"));
        let contact = profile.emergency_contact.expect("contact");
        assert_eq!(contact.name, "Amma");
        let car = profile.car.expect("car");
        assert_eq!(car.license_plate, "TN 01");
    }

    #[test]
    fn malformed_json_columns_map_to_none() {
        let mut r = row("u1");
        r.car = Some("not json".to_string());
        r.emergency_contact = Some("".to_string());
        let profile = map_profile_row(r);
        assert!(profile.car.is_none());
        assert!(profile.emergency_contact.is_none());
    }

    #[test]
    fn guest_profile_has_zero_balances() {
        let guest = guest_profile();
        assert_eq!(guest.id, GUEST_USER_ID);
        assert_eq!(guest.balance, 0.0);
        assert_eq!(guest.commute_credits, 0.0);
        assert_eq!(guest.role, UserRole::Rider);
    }

    #[test]
    fn unknown_enum_values_fall_back() {
        assert_eq!(Gender::parse("unknown"), Gender::PreferNotToSay);
        assert_eq!(UserRole::parse(""), UserRole::Rider);
    }
}
