//! SQL queries for different databases.
//!
//! Dates are bound and read as `YYYY-MM-DD` text because the `Any` driver
//! has no date type.

/// Atomic upsert-and-increment (PostgreSQL).
pub const INCREMENT_PG: &str = r#"
INSERT INTO usage_records (user_id, request_date, request_count, updated_at)
VALUES ($1, $2::date, 1, NOW())
ON CONFLICT (user_id, request_date)
DO UPDATE SET request_count = usage_records.request_count + 1, updated_at = NOW()
RETURNING request_count
"#;

/// Atomic upsert-and-increment (SQLite 3.35+).
pub const INCREMENT_SQLITE: &str = r#"
INSERT INTO usage_records (user_id, request_date, request_count, updated_at)
VALUES (?, ?, 1, CURRENT_TIMESTAMP)
ON CONFLICT (user_id, request_date)
DO UPDATE SET request_count = usage_records.request_count + 1, updated_at = CURRENT_TIMESTAMP
RETURNING request_count
"#;

/// Upsert-and-increment (MySQL). No `RETURNING`; read back in the same
/// transaction with [`SELECT_COUNT_MYSQL`].
pub const INCREMENT_MYSQL: &str = r#"
INSERT INTO usage_records (user_id, request_date, request_count, updated_at)
VALUES (?, ?, 1, CURRENT_TIMESTAMP)
ON DUPLICATE KEY UPDATE request_count = request_count + 1, updated_at = CURRENT_TIMESTAMP
"#;

/// Read-back of the counter just written (MySQL).
pub const SELECT_COUNT_MYSQL: &str = r#"
SELECT request_count FROM usage_records
WHERE user_id = ? AND request_date = ?
"#;

/// Point read (PostgreSQL).
pub const FIND_PG: &str = r#"
SELECT user_id, request_date::text AS request_date, request_count
FROM usage_records
WHERE user_id = $1 AND request_date = $2::date
"#;

/// Point read (MySQL/SQLite).
pub const FIND_MYSQL: &str = r#"
SELECT user_id, CAST(request_date AS CHAR) AS request_date, request_count
FROM usage_records
WHERE user_id = ? AND request_date = ?
"#;

/// All counters for one day (PostgreSQL).
pub const LIST_BY_DATE_PG: &str = r#"
SELECT user_id, request_date::text AS request_date, request_count
FROM usage_records
WHERE request_date = $1::date
ORDER BY user_id
"#;

/// All counters for one day (MySQL/SQLite).
pub const LIST_BY_DATE_MYSQL: &str = r#"
SELECT user_id, CAST(request_date AS CHAR) AS request_date, request_count
FROM usage_records
WHERE request_date = ?
ORDER BY user_id
"#;

/// Schema (PostgreSQL).
pub const SCHEMA_PG: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS usage_records (
    user_id VARCHAR(255) NOT NULL,
    request_date DATE NOT NULL,
    request_count BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (user_id, request_date)
)
"#,
    "CREATE INDEX IF NOT EXISTS idx_usage_records_date ON usage_records(request_date)",
];

/// Schema (MySQL).
pub const SCHEMA_MYSQL: &[&str] = &[r#"
CREATE TABLE IF NOT EXISTS usage_records (
    user_id VARCHAR(255) NOT NULL,
    request_date DATE NOT NULL,
    request_count BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (user_id, request_date),
    INDEX idx_usage_records_date (request_date)
)
"#];

/// Schema (SQLite).
pub const SCHEMA_SQLITE: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS usage_records (
    user_id TEXT NOT NULL,
    request_date TEXT NOT NULL,
    request_count INTEGER NOT NULL DEFAULT 0,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (user_id, request_date)
)
"#,
    "CREATE INDEX IF NOT EXISTS idx_usage_records_date ON usage_records(request_date)",
];
