use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (invoices, charges)");
        conn.execute_batch(
            "
            CREATE TABLE invoices (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at    TEXT NOT NULL,
                updated_at    TEXT NOT NULL,
                deleted_at    TEXT,
                is_paid       INTEGER NOT NULL DEFAULT 0,
                amount        INTEGER NOT NULL DEFAULT 0,
                payment_date  TEXT,
                due_date      TEXT
            );

            CREATE INDEX idx_invoices_deleted_at ON invoices(deleted_at);

            CREATE TABLE charges (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at    TEXT NOT NULL,
                updated_at    TEXT NOT NULL,
                deleted_at    TEXT,
                invoice_id    INTEGER NOT NULL,
                type          TEXT NOT NULL DEFAULT '',
                amount        REAL NOT NULL DEFAULT 0,
                description   TEXT NOT NULL DEFAULT ''
            );

            CREATE INDEX idx_charges_invoice_id ON charges(invoice_id);
            CREATE INDEX idx_charges_deleted_at ON charges(deleted_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
