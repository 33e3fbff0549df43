#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfilesRow {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub is_phone_verified: Option<i64>,
    pub workplace: Option<String>,
    pub role: Option<String>,
    pub balance: Option<f64>,
    pub commute_credits: Option<f64>,
    pub home: Option<String>,
    pub work_loc: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub bio: Option<String>,
    pub emergency_contact: Option<String>,
    pub car: Option<String>,
}
