//! The import pipeline: read → hash → parse → enrich → duplicate-check →
//! persist. The parse result lives entirely in memory; a storage failure
//! mid-batch never leaves a partially applied import because persistence
//! is a single all-or-nothing batch.

use std::path::Path;

use bahi_core::{EnrichedTransaction, Taxonomy};
use bahi_parse::{CardParser, Categorizer};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use bahi_storage::DbPool;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF text extraction failed: {0}")]
    Pdf(#[from] pdf_extract::OutputError),
    #[error("CSV parse failed: {0}")]
    Csv(#[from] bahi_parse::CsvError),
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// How a source file should be routed through the parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Csv,
    Bank,
    Card,
}

impl StatementKind {
    /// CSV routes by extension; everything else is flattened text. The
    /// card path is opt-in via flag since card and bank PDFs share shapes.
    pub fn for_path(path: &Path, force_card: bool) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext == "csv" {
            StatementKind::Csv
        } else if force_card {
            StatementKind::Card
        } else {
            StatementKind::Bank
        }
    }
}

/// One import's outcome, printed to the user. Row-level skips stay
/// invisible; only the aggregate counts surface.
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub source: String,
    pub parsed: usize,
    pub imported: usize,
    pub duplicates: usize,
    /// Non-empty document, zero extracted rows: suggest a CSV export.
    pub low_confidence: bool,
    pub file_hash: String,
}

/// Read a statement file into the flattened text the parsers consume.
/// PDFs go through the text-extraction layer; everything else is already
/// line-oriented text.
pub async fn read_statement_text(path: &Path) -> Result<String, PipelineError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if ext == "pdf" {
        Ok(pdf_extract::extract_text(path)?)
    } else {
        let bytes = tokio::fs::read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Run the full import for one file into one account.
pub async fn import_statement(
    pool: &DbPool,
    account_id: i64,
    path: &Path,
    force_card: bool,
) -> Result<ImportReport, PipelineError> {
    let bytes = tokio::fs::read(path).await?;
    let file_hash = sha256_hex(&bytes);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("statement")
        .to_string();

    if bahi_storage::find_import_by_hash(pool, account_id, &file_hash)
        .await?
        .is_some()
    {
        tracing::warn!(file = %file_name, "identical file imported before; relying on row-level duplicate check");
    }

    let text = read_statement_text(path).await?;
    let kind = StatementKind::for_path(path, force_card);

    // User-edited categories participate identically to the built-ins.
    let taxonomy = match bahi_storage::load_taxonomy(pool).await {
        Ok(t) if !t.is_empty() => t,
        _ => Taxonomy::builtin(),
    };

    let (source, enriched, low_confidence) = match kind {
        StatementKind::Csv => {
            let raw = bahi_parse::parse_csv(text.as_bytes())?;
            let empty = raw.is_empty() && !text.trim().is_empty();
            let categorizer = Categorizer::new(&taxonomy);
            ("CSV".to_string(), bahi_parse::enrich_all(raw, &categorizer), empty)
        }
        StatementKind::Bank => {
            let statement = bahi_parse::parse_statement(&text);
            let low = statement.low_confidence();
            let categorizer = Categorizer::new(&taxonomy);
            (
                statement.issuer.to_string(),
                bahi_parse::enrich_all(statement.transactions, &categorizer),
                low,
            )
        }
        StatementKind::Card => {
            let parser = CardParser::new(&taxonomy);
            let statement = parser.parse(&text);
            let low = statement.low_confidence();
            let enriched = statement
                .transactions
                .into_iter()
                .map(card_to_enriched)
                .collect();
            (statement.issuer.to_string(), enriched, low)
        }
    };

    let parsed = enriched.len();
    let hits = bahi_storage::check_duplicates(pool, account_id, &enriched).await?;
    let duplicate_indices: std::collections::HashSet<usize> =
        hits.iter().map(|h| h.index).collect();
    let fresh: Vec<EnrichedTransaction> = enriched
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !duplicate_indices.contains(i))
        .map(|(_, t)| t)
        .collect();

    bahi_storage::insert_batch(pool, account_id, &fresh).await?;
    bahi_storage::record_import(pool, account_id, &file_hash, &file_name, fresh.len(), hits.len())
        .await?;

    Ok(ImportReport {
        source,
        parsed,
        imported: fresh.len(),
        duplicates: hits.len(),
        low_confidence,
        file_hash,
    })
}

fn card_to_enriched(t: bahi_parse::CardTransaction) -> EnrichedTransaction {
    EnrichedTransaction {
        date: t.date,
        mode: bahi_parse::detect_mode(&t.description),
        description: t.description,
        remarks: String::new(),
        amount: t.amount,
        direction: t.direction,
        balance: None,
        reference: t.reference,
        merchant: t.merchant,
        category: t.category,
    }
}
