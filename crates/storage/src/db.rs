use std::path::Path;
use std::str::FromStr;

use bahi_core::{Category, CategoryKind, EnrichedTransaction, Taxonomy};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            bank_name TEXT,
            account_number TEXT,
            currency TEXT NOT NULL DEFAULT 'INR',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            icon TEXT,
            color TEXT,
            keywords TEXT NOT NULL DEFAULT '',
            patterns TEXT NOT NULL DEFAULT '',
            kind TEXT NOT NULL DEFAULT 'expense',
            position INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            remarks TEXT NOT NULL DEFAULT '',
            amount_paise INTEGER NOT NULL,
            direction TEXT NOT NULL,
            balance_paise INTEGER,
            reference TEXT NOT NULL DEFAULT '',
            mode TEXT NOT NULL DEFAULT 'Other',
            merchant TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL DEFAULT 'Other',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    // The duplicate key is an exact 4-way match; keep it indexed.
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_transactions_dup_key
        ON transactions(account_id, date, amount_paise, direction)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS statement_imports (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            account_id INTEGER NOT NULL,
            file_hash TEXT NOT NULL,
            file_name TEXT NOT NULL,
            imported_count INTEGER NOT NULL,
            duplicate_count INTEGER NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

// ── Money conversion ──────────────────────────────────────────────────────────
// Amounts are stored as integer paise; rupee decimals only exist in memory.

pub fn to_paise(amount: Decimal) -> i64 {
    (amount * Decimal::from(100)).round().to_i64().unwrap_or(0)
}

pub fn from_paise(paise: i64) -> Decimal {
    Decimal::from(paise) / Decimal::from(100)
}

// ── Accounts ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub id: i64,
    pub name: String,
    pub bank_name: Option<String>,
}

pub async fn create_account(
    pool: &DbPool,
    name: &str,
    bank_name: Option<&str>,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO accounts (name, bank_name) VALUES (?, ?)")
        .bind(name)
        .bind(bank_name)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn get_account_by_name(
    pool: &DbPool,
    name: &str,
) -> Result<Option<AccountRecord>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, String, Option<String>)>(
        "SELECT id, name, bank_name FROM accounts WHERE name = ?",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, name, bank_name)| AccountRecord { id, name, bank_name }))
}

pub async fn list_accounts(pool: &DbPool) -> Result<Vec<AccountRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, Option<String>)>(
        "SELECT id, name, bank_name FROM accounts ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, name, bank_name)| AccountRecord { id, name, bank_name })
        .collect())
}

// ── Category table ────────────────────────────────────────────────────────────
// The taxonomy is data: seeded once from the built-in table, then loaded
// back (with any user edits) so custom categories run through the same
// matching path as the defaults. Keywords are comma-separated, patterns
// newline-separated, since regexes may themselves contain commas.

pub async fn seed_default_categories(
    pool: &DbPool,
    taxonomy: &Taxonomy,
) -> Result<(), sqlx::Error> {
    for (position, category) in taxonomy.categories.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO categories (name, icon, color, keywords, patterns, kind, position)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&category.name)
        .bind(&category.icon)
        .bind(&category.color)
        .bind(category.keywords.join(","))
        .bind(category.patterns.join("\n"))
        .bind(category.kind.to_string())
        .bind(position as i64)
        .execute(pool)
        .await?;
    }
    Ok(())
}

pub async fn load_taxonomy(pool: &DbPool) -> Result<Taxonomy, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, Option<String>, Option<String>, String, String, String)>(
        "SELECT name, icon, color, keywords, patterns, kind FROM categories ORDER BY position, id",
    )
    .fetch_all(pool)
    .await?;

    let categories = rows
        .into_iter()
        .map(|(name, icon, color, keywords, patterns, kind)| Category {
            name,
            keywords: keywords
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
            patterns: patterns
                .split('\n')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            kind: CategoryKind::from_str(&kind).unwrap_or_default(),
            icon: icon.unwrap_or_default(),
            color: color.unwrap_or_default(),
        })
        .collect();

    Ok(Taxonomy { categories })
}

// ── Transactions ──────────────────────────────────────────────────────────────

pub async fn insert_transaction(
    pool: &DbPool,
    account_id: i64,
    t: &EnrichedTransaction,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO transactions
            (account_id, date, description, remarks, amount_paise, direction,
             balance_paise, reference, mode, merchant, category)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(account_id)
    .bind(t.date)
    .bind(&t.description)
    .bind(&t.remarks)
    .bind(to_paise(t.amount))
    .bind(t.direction.to_string())
    .bind(t.balance.map(to_paise))
    .bind(&t.reference)
    .bind(t.mode.to_string())
    .bind(&t.merchant)
    .bind(&t.category)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Exact 4-way duplicate key: (account, date, amount, direction).
/// Description is deliberately excluded: the same transaction's narration
/// differs between a bank's PDF and CSV renditions.
pub async fn exists_by_key(
    pool: &DbPool,
    account_id: i64,
    date: NaiveDate,
    amount_paise: i64,
    direction: &str,
) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64,)>(
        r#"
        SELECT id FROM transactions
        WHERE account_id = ? AND date = ? AND amount_paise = ? AND direction = ?
        "#,
    )
    .bind(account_id)
    .bind(date)
    .bind(amount_paise)
    .bind(direction)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id,)| id))
}

/// A candidate that matched an already-persisted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateHit {
    /// Index into the candidate slice passed to `check_duplicates`.
    pub index: usize,
    pub existing_id: i64,
}

/// Check every candidate against the duplicate key and return the subset
/// that already exists, annotated with the existing row id.
pub async fn check_duplicates(
    pool: &DbPool,
    account_id: i64,
    candidates: &[EnrichedTransaction],
) -> Result<Vec<DuplicateHit>, sqlx::Error> {
    let mut hits = Vec::new();
    for (index, t) in candidates.iter().enumerate() {
        let existing = exists_by_key(
            pool,
            account_id,
            t.date,
            to_paise(t.amount),
            &t.direction.to_string(),
        )
        .await?;
        if let Some(existing_id) = existing {
            hits.push(DuplicateHit { index, existing_id });
        }
    }
    Ok(hits)
}

/// Insert a statement's transactions as one database transaction: either
/// the whole batch lands or none of it does.
pub async fn insert_batch(
    pool: &DbPool,
    account_id: i64,
    transactions: &[EnrichedTransaction],
) -> Result<Vec<i64>, sqlx::Error> {
    let mut dbtx = pool.begin().await?;
    let mut ids = Vec::with_capacity(transactions.len());

    for t in transactions {
        let result = sqlx::query(
            r#"
            INSERT INTO transactions
                (account_id, date, description, remarks, amount_paise, direction,
                 balance_paise, reference, mode, merchant, category)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account_id)
        .bind(t.date)
        .bind(&t.description)
        .bind(&t.remarks)
        .bind(to_paise(t.amount))
        .bind(t.direction.to_string())
        .bind(t.balance.map(to_paise))
        .bind(&t.reference)
        .bind(t.mode.to_string())
        .bind(&t.merchant)
        .bind(&t.category)
        .execute(&mut *dbtx)
        .await?;
        ids.push(result.last_insert_rowid());
    }

    dbtx.commit().await?;
    Ok(ids)
}

// ── Statement imports ─────────────────────────────────────────────────────────

pub async fn record_import(
    pool: &DbPool,
    account_id: i64,
    file_hash: &str,
    file_name: &str,
    imported_count: usize,
    duplicate_count: usize,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO statement_imports (account_id, file_hash, file_name, imported_count, duplicate_count)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(account_id)
    .bind(file_hash)
    .bind(file_name)
    .bind(imported_count as i64)
    .bind(duplicate_count as i64)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn find_import_by_hash(
    pool: &DbPool,
    account_id: i64,
    file_hash: &str,
) -> Result<Option<i64>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64,)>(
        "SELECT id FROM statement_imports WHERE account_id = ? AND file_hash = ?",
    )
    .bind(account_id)
    .bind(file_hash)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id,)| id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bahi_core::{Direction, TxnMode};

    async fn test_pool() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn tx(date: (i32, u32, u32), amount: &str, direction: Direction) -> EnrichedTransaction {
        EnrichedTransaction {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            description: "UPI/TEST MERCHANT/1234".to_string(),
            remarks: String::new(),
            amount: amount.parse().unwrap(),
            direction,
            balance: Some("12000.00".parse().unwrap()),
            reference: "1234".to_string(),
            mode: TxnMode::Upi,
            merchant: "Test Merchant".to_string(),
            category: "Other".to_string(),
        }
    }

    #[test]
    fn paise_conversion_roundtrip() {
        assert_eq!(to_paise("450.00".parse().unwrap()), 45000);
        assert_eq!(to_paise("0.01".parse().unwrap()), 1);
        assert_eq!(from_paise(45000), "450.00".parse::<Decimal>().unwrap());
    }

    #[tokio::test]
    async fn account_create_and_lookup() {
        let pool = test_pool().await;
        let id = create_account(&pool, "Salary SBI", Some("SBI")).await.unwrap();
        let account = get_account_by_name(&pool, "Salary SBI").await.unwrap().unwrap();
        assert_eq!(account.id, id);
        assert_eq!(account.bank_name.as_deref(), Some("SBI"));
        assert!(get_account_by_name(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn taxonomy_seed_and_load_preserves_order() {
        let pool = test_pool().await;
        let builtin = Taxonomy::builtin();
        seed_default_categories(&pool, &builtin).await.unwrap();

        let loaded = load_taxonomy(&pool).await.unwrap();
        assert_eq!(loaded.len(), builtin.len());
        for (a, b) in loaded.categories.iter().zip(builtin.categories.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.keywords, b.keywords);
            assert_eq!(a.patterns, b.patterns);
            assert_eq!(a.kind, b.kind);
        }
    }

    #[tokio::test]
    async fn seeding_twice_does_not_duplicate() {
        let pool = test_pool().await;
        let builtin = Taxonomy::builtin();
        seed_default_categories(&pool, &builtin).await.unwrap();
        seed_default_categories(&pool, &builtin).await.unwrap();
        assert_eq!(load_taxonomy(&pool).await.unwrap().len(), builtin.len());
    }

    #[tokio::test]
    async fn duplicate_key_matches_exact_tuple_only() {
        let pool = test_pool().await;
        let account = create_account(&pool, "main", None).await.unwrap();
        let t = tx((2024, 1, 5), "500.00", Direction::Debit);
        let id = insert_transaction(&pool, account, &t).await.unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(
            exists_by_key(&pool, account, date, 50000, "debit").await.unwrap(),
            Some(id)
        );
        // Any element of the key differing means no match.
        assert!(exists_by_key(&pool, account, date, 50000, "credit").await.unwrap().is_none());
        assert!(exists_by_key(&pool, account, date, 50001, "debit").await.unwrap().is_none());
        assert!(exists_by_key(&pool, account + 1, date, 50000, "debit").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn second_import_is_fully_flagged_as_duplicate() {
        let pool = test_pool().await;
        let account = create_account(&pool, "main", None).await.unwrap();
        let batch = vec![
            tx((2024, 1, 5), "500.00", Direction::Debit),
            tx((2024, 1, 6), "1200.00", Direction::Credit),
        ];

        // First import: nothing flagged, everything inserted.
        assert!(check_duplicates(&pool, account, &batch).await.unwrap().is_empty());
        insert_batch(&pool, account, &batch).await.unwrap();

        // Second import of the same file: every candidate flagged.
        let hits = check_duplicates(&pool, account, &batch).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].index, 0);
        assert_eq!(hits[1].index, 1);
    }

    #[tokio::test]
    async fn insert_batch_returns_ids_in_order() {
        let pool = test_pool().await;
        let account = create_account(&pool, "main", None).await.unwrap();
        let batch = vec![
            tx((2024, 1, 5), "1.00", Direction::Debit),
            tx((2024, 1, 6), "2.00", Direction::Debit),
            tx((2024, 1, 7), "3.00", Direction::Debit),
        ];
        let ids = insert_batch(&pool, account, &batch).await.unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids[0] < ids[1] && ids[1] < ids[2]);
    }

    #[tokio::test]
    async fn import_record_roundtrip() {
        let pool = test_pool().await;
        let account = create_account(&pool, "main", None).await.unwrap();
        assert!(find_import_by_hash(&pool, account, "abc123").await.unwrap().is_none());
        record_import(&pool, account, "abc123", "jan.csv", 10, 2).await.unwrap();
        assert!(find_import_by_hash(&pool, account, "abc123").await.unwrap().is_some());
    }
}
