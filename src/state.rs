// src/state.rs
use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::JwtKeys;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(db_pool: PgPool, jwt: JwtKeys) -> Self {
        Self {
            db_pool,
            jwt: Arc::new(jwt),
        }
    }
}
