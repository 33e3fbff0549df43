#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RidesRow {
    pub id: String,
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
    pub driver_gender: Option<String>,
    pub driver_rating: Option<f64>,
    pub driver_img: Option<String>,
    pub car: Option<String>,
    pub vehicle_type: Option<String>,
    pub route: Option<String>,
    pub time: Option<String>,
    pub cost: Option<f64>,
    pub seats_total: Option<i64>,
    pub seats_left: Option<i64>,
    pub circle_type: Option<String>,
    pub circle_name: Option<String>,
    pub is_women_only: Option<i64>,
}
