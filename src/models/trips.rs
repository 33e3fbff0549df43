#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TripsRow {
    pub id: String,
    pub user_id: Option<String>,
    pub ride_id: Option<String>,
    pub partner_name: Option<String>,
    pub partner_img: Option<String>,
    pub route: Option<String>,
    pub time: Option<String>,
    pub cost: Option<f64>,
    pub status: Option<String>,
    pub role: Option<String>,
    pub vehicle_type: Option<String>,
    pub vehicle_info: Option<String>,
}
