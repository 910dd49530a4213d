use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Columns shared by every sheet-linked table
const LINK_COLUMNS: &str = r#"
    id TEXT PRIMARY KEY NOT NULL,
    sheet_id TEXT,
    sheet_id_pending INTEGER NOT NULL DEFAULT 0,
    synced INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
"#;

/// (table, business columns)
const TABLES: &[(&str, &str)] = &[
    (
        "a101_financial_survey",
        r#"
        credit_application_id TEXT,
        borrower_id TEXT,
        business_name TEXT,
        survey_date TEXT,
        monthly_revenue REAL,
        cost_of_goods_sold REAL,
        operating_expenses REAL,
        household_expenses REAL,
        existing_loan_repayments REAL,
        number_of_employees INTEGER,
        owns_premises INTEGER,
        has_bank_account INTEGER,
        surveyor_notes TEXT,
        gross_profit REAL,
        net_disposable_income REAL,
        debt_service_ratio REAL,
        max_affordable_installment REAL
        "#,
    ),
    (
        "a102_payroll",
        r#"
        staff_id TEXT,
        staff_name TEXT,
        role TEXT,
        pay_period TEXT,
        basic_salary REAL,
        allowances REAL,
        deductions REAL,
        net_pay REAL,
        days_worked INTEGER,
        paid INTEGER,
        payment_date TEXT
        "#,
    ),
    (
        "a103_loan",
        r#"
        borrower_id TEXT,
        borrower_name TEXT,
        credit_application_id TEXT,
        principal_amount REAL,
        interest_rate REAL,
        term_months INTEGER,
        disbursement_date TEXT,
        maturity_date TEXT,
        outstanding_balance REAL,
        status TEXT,
        is_restructured INTEGER
        "#,
    ),
    (
        "a104_write_off",
        r#"
        loan_id TEXT,
        borrower_id TEXT,
        write_off_date TEXT,
        amount_written_off REAL,
        recovered_amount REAL,
        reason TEXT,
        approved_by TEXT,
        board_approved INTEGER
        "#,
    ),
];

pub async fn initialize_database(db_path: Option<&str>) -> anyhow::Result<()> {
    let db_file = db_path.unwrap_or("target/db/jf.db");
    if let Some(parent) = std::path::Path::new(db_file).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if std::path::Path::new(db_file).is_absolute() {
        std::path::PathBuf::from(db_file)
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Create the sheet-linked tables if missing.
///
/// `sheet_id` is unique when present: at most one record may point at a sheet row.
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (table, columns) in TABLES {
        let create_sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({},{});",
            table, LINK_COLUMNS, columns
        );
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, create_sql))
            .await?;

        let index_sql = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS ux_{table}_sheet_id ON {table}(sheet_id) WHERE sheet_id IS NOT NULL;",
            table = table
        );
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, index_sql))
            .await?;

        let synced_index_sql = format!(
            "CREATE INDEX IF NOT EXISTS ix_{table}_synced ON {table}(synced);",
            table = table
        );
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            synced_index_sql,
        ))
        .await?;

        tracing::debug!("Table {} ready", table);
    }
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// In-memory database with the full schema, for tests.
/// A single pooled connection, since every sqlite memory connection is its own database.
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite");
    bootstrap_schema(&conn).await.expect("schema bootstrap");
    conn
}
