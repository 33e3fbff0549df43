#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RequestsRow {
    pub id: String,
    pub rider_id: Option<String>,
    pub rider_name: Option<String>,
    pub rider_img: Option<String>,
    pub route: Option<String>,
    pub time: Option<String>,
    pub distance: Option<String>,
    pub status: Option<String>,
}
