use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::costing::FeeSchedule;

#[derive(Debug, Clone, FromRow)]
pub struct Marketplace {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub fee_percent: f64,
    pub fee_fixed: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Marketplace {
    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule::new(self.fee_percent, self.fee_fixed)
    }
}
