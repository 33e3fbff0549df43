#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CurrentSessionRow {
    pub user_id: String,
}
