use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::costing::stock::{self, SpoolStock};
use crate::costing::{FilamentCatalog, RollPricing};

#[derive(Debug, Clone, FromRow)]
pub struct Filament {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub filament_type: String,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub roll_weight_g: f64,
    pub roll_price: f64,
    pub min_stock_alert_g: f64,
    pub current_weight_g: Option<f64>,
    pub rolls: i32,
    pub grams_per_roll: f64,
    pub created_at: DateTime<Utc>,
}

impl Filament {
    pub fn pricing(&self) -> RollPricing {
        RollPricing {
            roll_price: self.roll_price,
            roll_weight_g: self.roll_weight_g,
        }
    }

    pub fn stock(&self) -> SpoolStock {
        SpoolStock {
            current_weight_g: self.current_weight_g,
            rolls: self.rolls,
            grams_per_roll: self.grams_per_roll,
        }
    }

    pub fn is_low_stock(&self) -> bool {
        stock::is_low_stock(self.current_weight_g, self.min_stock_alert_g)
    }
}

pub const FILAMENT_COLUMNS: &str = "id, user_id, name, filament_type, color, brand, roll_weight_g, roll_price, \
     min_stock_alert_g, current_weight_g, rolls, grams_per_roll, created_at";

impl FilamentCatalog for HashMap<Uuid, Filament> {
    fn pricing(&self, filament_id: &Uuid) -> Option<RollPricing> {
        self.get(filament_id).map(Filament::pricing)
    }
}
