use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::ProfilesRow;

pub const SQL_LOAD_PROFILE: &str = r#"
SELECT
    id,
    name,
    email,
    gender,
    phone,
    is_phone_verified,
    workplace,
    role,
    balance,
    commute_credits,
    home,
    work_loc,
    start_time,
    end_time,
    bio,
    emergency_contact,
    car
FROM profiles
WHERE id = ?1
LIMIT 1
"#;

pub async fn load_profile(pool: &SqlitePool, user_id: &str) -> sqlx::Result<Option<ProfilesRow>> {
    sqlx::query_as::<_, ProfilesRow>(SQL_LOAD_PROFILE)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

// ON CONFLICT DO NOTHING keeps first-login bootstrap idempotent: the losing
// writer of a race sees 0 rows affected and re-selects the winner's row.
const SQL_INSERT_PROFILE_IF_ABSENT: &str = r#"
INSERT INTO profiles (
  id,
  name,
  email,
  gender,
  role,
  balance,
  commute_credits,
  is_phone_verified,
  home,
  work_loc,
  bio
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
ON CONFLICT(id) DO NOTHING
"#;

pub struct NewProfile<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub gender: &'a str,
    pub role: &'a str, // rider|driver
    pub balance: f64,
    pub commute_credits: f64,
    pub is_phone_verified: bool,
    pub home: &'a str,
    pub work_loc: &'a str,
    pub bio: &'a str,
}

pub async fn insert_profile_if_absent(
    pool: &SqlitePool,
    profile: NewProfile<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_PROFILE_IF_ABSENT)
        .bind(profile.id)
        .bind(profile.name)
        .bind(profile.email)
        .bind(profile.gender)
        .bind(profile.role)
        .bind(profile.balance)
        .bind(profile.commute_credits)
        .bind(profile.is_phone_verified as i64)
        .bind(profile.home)
        .bind(profile.work_loc)
        .bind(profile.bio)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Sparse column-level patch. `None` fields are left untouched by the update.
/// Field names follow the storage schema; the service layer owns the mapping
/// from domain names (`work` lives in the `work_loc` column).
#[derive(Debug, Default)]
pub struct ProfileColumnPatch<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub is_phone_verified: Option<bool>,
    pub workplace: Option<&'a str>,
    pub role: Option<&'a str>,
    pub balance: Option<f64>,
    pub commute_credits: Option<f64>,
    pub home: Option<&'a str>,
    pub work_loc: Option<&'a str>,
    pub start_time: Option<&'a str>,
    pub end_time: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub emergency_contact: Option<&'a str>,
    pub car: Option<&'a str>,
}

pub async fn update_profile_fields(
    pool: &SqlitePool,
    user_id: &str,
    patch: &ProfileColumnPatch<'_>,
) -> sqlx::Result<u64> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE profiles SET ");
    let mut fields = builder.separated(", ");
    let mut any = false;

    macro_rules! set_col {
        ($field:ident, $col:literal) => {
            if let Some(value) = patch.$field {
                fields.push(concat!($col, " = "));
                fields.push_bind_unseparated(value);
                any = true;
            }
        };
    }

    set_col!(name, "name");
    set_col!(email, "email");
    set_col!(gender, "gender");
    set_col!(phone, "phone");
    set_col!(is_phone_verified, "is_phone_verified");
    set_col!(workplace, "workplace");
    set_col!(role, "role");
    set_col!(balance, "balance");
    set_col!(commute_credits, "commute_credits");
    set_col!(home, "home");
    set_col!(work_loc, "work_loc");
    set_col!(start_time, "start_time");
    set_col!(end_time, "end_time");
    set_col!(bio, "bio");
    set_col!(emergency_contact, "emergency_contact");
    set_col!(car, "car");

    if !any {
        return Ok(0);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(user_id);

    let res = builder.build().execute(pool).await?;
    Ok(res.rows_affected())
}

const SQL_APPLY_SETTLEMENT: &str = r#"
UPDATE profiles
SET balance = ?1, commute_credits = ?2
WHERE id = ?3
"#;

pub async fn apply_settlement(
    executor: impl sqlx::SqliteExecutor<'_>,
    user_id: &str,
    balance: f64,
    commute_credits: f64,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_APPLY_SETTLEMENT)
        .bind(balance)
        .bind(commute_credits)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(res.rows_affected())
}
