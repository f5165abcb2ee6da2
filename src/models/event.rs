//! Modelo de Event (solo los campos usados al enviar rutas)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventInfo {
    pub id: Uuid,
    pub title: String,
    pub start_datetime: Option<DateTime<Utc>>,
    pub location: Option<String>,
}
