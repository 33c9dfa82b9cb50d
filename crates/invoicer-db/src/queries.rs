use crate::Database;
use crate::models::{ChargeRow, DeleteOutcome, InvoiceRow, NewInvoice};
use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};

const INVOICE_COLUMNS: &str =
    "id, created_at, updated_at, is_paid, amount, payment_date, due_date";

const CHARGE_COLUMNS: &str =
    "id, created_at, updated_at, invoice_id, type, amount, description";

impl Database {
    // -- Invoices --

    /// Inserts an invoice and all of its charges in one transaction and
    /// returns the id the store assigned to the invoice.
    pub fn insert_invoice(&self, invoice: &NewInvoice) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let now = Utc::now();
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO invoices (created_at, updated_at, is_paid, amount, payment_date, due_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    now,
                    now,
                    invoice.is_paid,
                    invoice.amount,
                    invoice.payment_date,
                    invoice.due_date,
                ],
            )?;
            let invoice_id = tx.last_insert_rowid();

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO charges (created_at, updated_at, invoice_id, type, amount, description)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for charge in &invoice.charges {
                    stmt.execute(rusqlite::params![
                        now,
                        now,
                        invoice_id,
                        charge.charge_type,
                        charge.amount,
                        charge.description,
                    ])?;
                }
            }

            tx.commit()?;
            Ok(invoice_id)
        })
    }

    pub fn get_invoice(&self, id: i64) -> Result<Option<InvoiceRow>> {
        self.with_conn(|conn| query_invoice(conn, id))
    }

    /// Loads a live invoice and its live charges under one lock, so a
    /// concurrent delete cannot split the two reads.
    pub fn get_invoice_with_charges(&self, id: i64) -> Result<Option<(InvoiceRow, Vec<ChargeRow>)>> {
        self.with_conn(|conn| {
            let Some(row) = query_invoice(conn, id)? else {
                return Ok(None);
            };
            let charges = query_charges(conn, row.id)?;
            Ok(Some((row, charges)))
        })
    }

    /// Overwrites the mutable columns of a live invoice and bumps
    /// `updated_at`. Returns false when no live row has that id.
    pub fn update_invoice(&self, invoice: &InvoiceRow) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE invoices
                 SET updated_at = ?2, is_paid = ?3, amount = ?4, payment_date = ?5, due_date = ?6
                 WHERE id = ?1 AND deleted_at IS NULL",
                rusqlite::params![
                    invoice.id,
                    Utc::now(),
                    invoice.is_paid,
                    invoice.amount,
                    invoice.payment_date,
                    invoice.due_date,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Soft-deletes every charge of the invoice, then the invoice, in one
    /// transaction. Deleting an id that does not exist is not an error.
    pub fn delete_invoice(&self, id: i64) -> Result<DeleteOutcome> {
        self.with_conn_mut(|conn| {
            let now = Utc::now();
            let tx = conn.transaction()?;

            let charges_deleted = tx.execute(
                "UPDATE charges SET deleted_at = ?2 WHERE invoice_id = ?1 AND deleted_at IS NULL",
                rusqlite::params![id, now],
            )?;
            let invoices_deleted = tx.execute(
                "UPDATE invoices SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
                rusqlite::params![id, now],
            )?;

            tx.commit()?;
            Ok(DeleteOutcome {
                charges_deleted,
                invoice_deleted: invoices_deleted > 0,
            })
        })
    }

    // -- Charges --

    pub fn get_charges_for_invoice(&self, invoice_id: i64) -> Result<Vec<ChargeRow>> {
        self.with_conn(|conn| query_charges(conn, invoice_id))
    }
}

fn query_invoice(conn: &Connection, id: i64) -> Result<Option<InvoiceRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1 AND deleted_at IS NULL"
    ))?;

    let row = stmt.query_row([id], invoice_from_row).optional()?;
    Ok(row)
}

fn query_charges(conn: &Connection, invoice_id: i64) -> Result<Vec<ChargeRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CHARGE_COLUMNS} FROM charges
         WHERE invoice_id = ?1 AND deleted_at IS NULL
         ORDER BY id"
    ))?;

    let rows = stmt
        .query_map([invoice_id], charge_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn invoice_from_row(row: &Row<'_>) -> rusqlite::Result<InvoiceRow> {
    Ok(InvoiceRow {
        id: row.get(0)?,
        created_at: row.get(1)?,
        updated_at: row.get(2)?,
        is_paid: row.get(3)?,
        amount: row.get(4)?,
        payment_date: row.get(5)?,
        due_date: row.get(6)?,
    })
}

fn charge_from_row(row: &Row<'_>) -> rusqlite::Result<ChargeRow> {
    Ok(ChargeRow {
        id: row.get(0)?,
        created_at: row.get(1)?,
        updated_at: row.get(2)?,
        invoice_id: row.get(3)?,
        charge_type: row.get(4)?,
        amount: row.get(5)?,
        description: row.get(6)?,
    })
}
