use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

// -- Create --

/// Body of `POST /invoice`.
///
/// `id` is accepted so clients can post back a record they fetched, but it
/// is never used: the store assigns identity.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateInvoiceRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub charges: Vec<CreateChargeRequest>,
}

/// A charge nested in [`CreateInvoiceRequest`]. `id` and `invoice_id` are
/// discarded on insert.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChargeRequest {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub invoice_id: Option<i64>,
    #[serde(default, rename = "type")]
    pub charge_type: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub description: String,
}

// -- Update --

/// Body of `PUT /invoice/{id}`.
///
/// Every writable field is optional: omitted fields keep their stored value.
/// Dates distinguish "omitted" (`None`) from an explicit `null`
/// (`Some(None)`), which clears the date. Charges cannot be changed here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateInvoiceRequest {
    #[serde(default)]
    pub is_paid: Option<bool>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub payment_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "present")]
    pub due_date: Option<Option<DateTime<Utc>>>,

    // Read-only echoes of a fetched record, tolerated and ignored.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Maps a present field (even `null`) to `Some`, leaving `None` for absent.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
