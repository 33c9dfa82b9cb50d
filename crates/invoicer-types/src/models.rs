use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An invoice as returned by `GET /invoice/{id}`, charges included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_paid: bool,
    pub amount: i64,
    pub payment_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub charges: Vec<Charge>,
}

/// A line item. `charge_type` and `description` are HTML-escaped on the way out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub invoice_id: i64,
    #[serde(rename = "type")]
    pub charge_type: String,
    pub amount: f64,
    pub description: String,
}
