//! Database row types. These map directly to SQLite rows and are kept
//! distinct from the invoicer-types API models.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct InvoiceRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_paid: bool,
    pub amount: i64,
    pub payment_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ChargeRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub invoice_id: i64,
    pub charge_type: String,
    pub amount: f64,
    pub description: String,
}

/// Insert payload for an invoice. Identity is always assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct NewInvoice {
    pub is_paid: bool,
    pub amount: i64,
    pub payment_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub charges: Vec<NewCharge>,
}

/// Insert payload for a charge; its `invoice_id` comes from the parent insert.
#[derive(Debug, Clone, Default)]
pub struct NewCharge {
    pub charge_type: String,
    pub amount: f64,
    pub description: String,
}

/// What a cascading delete touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub charges_deleted: usize,
    pub invoice_deleted: bool,
}
