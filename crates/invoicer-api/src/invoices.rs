use anyhow::{Context, anyhow};
use askama_escape::{Html, escape};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, StatusCode, header},
    response::IntoResponse,
};
use tracing::{debug, error};

use invoicer_db::Database;
use invoicer_db::models::{ChargeRow, InvoiceRow, NewCharge, NewInvoice};
use invoicer_types::api::{CreateInvoiceRequest, UpdateInvoiceRequest};
use invoicer_types::models::{Charge, Invoice};

use crate::applog::{AppLog, Audited, RequestContext};
use crate::auth::AppState;
use crate::error::ApiError;

pub const CSRF_HEADER: &str = "x-csrf-token";

/// GET /invoice/{id}
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    fetch_invoice(&state, id, &ctx).await.audited("get-invoice", &ctx)
}

async fn fetch_invoice(
    state: &AppState,
    id: i64,
    ctx: &RequestContext,
) -> Result<(StatusCode, [(HeaderName, &'static str); 2], Vec<u8>), ApiError> {
    debug!("getting invoice id {}", id);

    let (row, charges) = run_db(state, move |db| db.get_invoice_with_charges(id))
        .await
        .with_context(|| format!("failed to retrieve invoice id {}", id))?
        .ok_or_else(|| ApiError::NotFound(format!("No invoice id {}", id)))?;

    let invoice = to_response(row, charges);
    let body = serde_json::to_vec(&invoice)
        .with_context(|| format!("failed to retrieve invoice id {}", id))?;

    AppLog::new(
        "get-invoice",
        StatusCode::OK,
        format!("retrieved invoice {}", invoice.id),
    )
    .emit(ctx);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        ],
        body,
    ))
}

/// POST /invoice
pub async fn post_invoice(
    State(state): State<AppState>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    create_invoice(&state, &body, &ctx)
        .await
        .audited("post-invoice", &ctx)
}

async fn create_invoice(
    state: &AppState,
    body: &[u8],
    ctx: &RequestContext,
) -> Result<(StatusCode, String), ApiError> {
    debug!("posting new invoice");

    let req: CreateInvoiceRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("failed to parse request body: {}", e)))?;
    let new_invoice = to_new_invoice(req);

    let id = run_db(state, move |db| db.insert_invoice(&new_invoice))
        .await
        .context("failed to create invoice")?;

    let message = format!("created invoice {}", id);
    AppLog::new("post-invoice", StatusCode::CREATED, message.clone()).emit(ctx);
    Ok((StatusCode::CREATED, message))
}

/// PUT /invoice/{id} — fields present in the body overwrite the stored
/// record, omitted fields are left alone.
pub async fn put_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ctx: RequestContext,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    update_invoice(&state, id, &body, &ctx)
        .await
        .audited("put-invoice", &ctx)
}

async fn update_invoice(
    state: &AppState,
    id: i64,
    body: &[u8],
    ctx: &RequestContext,
) -> Result<(StatusCode, String), ApiError> {
    debug!("updating invoice {}", id);

    let not_found = || ApiError::NotFound(format!("No invoice id {}", id));

    let mut row = run_db(state, move |db| db.get_invoice(id))
        .await
        .with_context(|| format!("failed to load invoice id {}", id))?
        .ok_or_else(not_found)?;

    let req: UpdateInvoiceRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("failed to parse request body: {}", e)))?;
    apply_update(&mut row, req);

    let updated = run_db(state, move |db| {
        if !db.update_invoice(&row)? {
            return Ok(None);
        }
        db.get_invoice(id)
    })
    .await
    .with_context(|| format!("failed to update invoice id {}", id))?
    .ok_or_else(not_found)?;

    let message = format!("updated invoice {}", updated.id);
    AppLog::new("put-invoice", StatusCode::ACCEPTED, message.clone()).emit(ctx);
    Ok((StatusCode::ACCEPTED, message))
}

/// DELETE /invoice/{id} and GET /invoice/delete/{id}. Requires a valid
/// token in the `X-CSRF-Token` header; the charges and the invoice are
/// removed together.
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ctx: RequestContext,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    remove_invoice(&state, id, &headers, &ctx)
        .await
        .audited("delete-invoice", &ctx)
}

async fn remove_invoice(
    state: &AppState,
    id: i64,
    headers: &HeaderMap,
    ctx: &RequestContext,
) -> Result<(StatusCode, String), ApiError> {
    let token = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !state.csrf.verify(token) {
        return Err(ApiError::CsrfRejected);
    }

    debug!("deleting invoice {}", id);
    let outcome = run_db(state, move |db| db.delete_invoice(id))
        .await
        .with_context(|| format!("failed to delete invoice id {}", id))?;
    debug!(
        "invoice {}: removed {} charges, invoice row removed: {}",
        id, outcome.charges_deleted, outcome.invoice_deleted
    );

    let message = format!("deleted invoice {}", id);
    AppLog::new("delete-invoice", StatusCode::ACCEPTED, message.clone()).emit(ctx);
    Ok((StatusCode::ACCEPTED, message))
}

/// Runs a blocking store call off the async runtime.
async fn run_db<F, T>(state: &AppState, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow!("store task failed: {}", e)
        })?
}

/// Client-supplied ids on the invoice and its charges are dropped here;
/// the store assigns every identity and links charges to the new invoice.
fn to_new_invoice(req: CreateInvoiceRequest) -> NewInvoice {
    NewInvoice {
        is_paid: req.is_paid,
        amount: req.amount,
        payment_date: req.payment_date,
        due_date: req.due_date,
        charges: req
            .charges
            .into_iter()
            .map(|c| NewCharge {
                charge_type: c.charge_type,
                amount: c.amount,
                description: c.description,
            })
            .collect(),
    }
}

fn apply_update(row: &mut InvoiceRow, req: UpdateInvoiceRequest) {
    if let Some(is_paid) = req.is_paid {
        row.is_paid = is_paid;
    }
    if let Some(amount) = req.amount {
        row.amount = amount;
    }
    if let Some(payment_date) = req.payment_date {
        row.payment_date = payment_date;
    }
    if let Some(due_date) = req.due_date {
        row.due_date = due_date;
    }
}

fn to_response(row: InvoiceRow, charges: Vec<ChargeRow>) -> Invoice {
    Invoice {
        id: row.id,
        created_at: row.created_at,
        updated_at: row.updated_at,
        is_paid: row.is_paid,
        amount: row.amount,
        payment_date: row.payment_date,
        due_date: row.due_date,
        charges: charges
            .into_iter()
            .map(|c| Charge {
                id: c.id,
                created_at: c.created_at,
                updated_at: c.updated_at,
                invoice_id: c.invoice_id,
                charge_type: escape_html(&c.charge_type),
                amount: c.amount,
                description: escape_html(&c.description),
            })
            .collect(),
    }
}

fn escape_html(s: &str) -> String {
    escape(s, Html).to_string()
}
