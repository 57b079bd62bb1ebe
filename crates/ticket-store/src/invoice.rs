//! Invoice queries. The ledger is read-only from the engine's perspective;
//! inserts exist for seeding and tests.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use triage_core::Invoice;

use crate::error::{Result, StoreError};

#[derive(Debug, FromRow)]
struct InvoiceRow {
    invoice_number: String,
    invoice_date: Option<String>,
    amount: Option<f64>,
    vendor_id: Option<String>,
    vendor_name: Option<String>,
    customer_id: Option<String>,
    customer_name: Option<String>,
    po_number: Option<String>,
    po_status: Option<String>,
    payment_status: Option<String>,
    payment_term: Option<String>,
    due_date: Option<String>,
    clearing_date: Option<String>,
    country: Option<String>,
}

impl From<InvoiceRow> for Invoice {
    fn from(row: InvoiceRow) -> Invoice {
        Invoice {
            invoice_number: row.invoice_number,
            invoice_date: row.invoice_date,
            amount: row.amount,
            vendor_id: row.vendor_id,
            vendor_name: row.vendor_name,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            po_number: row.po_number,
            po_status: row.po_status,
            payment_status: row.payment_status,
            payment_term: row.payment_term,
            due_date: row.due_date,
            clearing_date: row.clearing_date,
            country: row.country,
        }
    }
}

const INVOICE_COLUMNS: &str = "invoice_number, invoice_date, amount, vendor_id, vendor_name, \
     customer_id, customer_name, po_number, po_status, payment_status, payment_term, \
     due_date, clearing_date, country";

/// A sparse invoice filter. Text fields match by case-insensitive
/// substring; numeric fields match exactly. Unset fields do not constrain
/// the query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceFilter {
    pub invoice_number: Option<String>,
    pub vendor_name: Option<String>,
    pub vendor_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_id: Option<String>,
    pub po_number: Option<String>,
    pub payment_status: Option<String>,
    pub country: Option<String>,
    pub amount: Option<f64>,
}

impl InvoiceFilter {
    /// Whether any field constrains the query.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Insert an invoice (seeding/tests).
pub async fn insert_invoice(pool: &SqlitePool, invoice: &Invoice) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO invoices (invoice_number, invoice_date, amount, vendor_id, vendor_name,
                              customer_id, customer_name, po_number, po_status, payment_status,
                              payment_term, due_date, clearing_date, country)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&invoice.invoice_number)
    .bind(&invoice.invoice_date)
    .bind(invoice.amount)
    .bind(&invoice.vendor_id)
    .bind(&invoice.vendor_name)
    .bind(&invoice.customer_id)
    .bind(&invoice.customer_name)
    .bind(&invoice.po_number)
    .bind(&invoice.po_status)
    .bind(&invoice.payment_status)
    .bind(&invoice.payment_term)
    .bind(&invoice.due_date)
    .bind(&invoice.clearing_date)
    .bind(&invoice.country)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return StoreError::AlreadyExists {
                    entity: "Invoice",
                    id: invoice.invoice_number.clone(),
                };
            }
        }
        StoreError::Sqlx(e)
    })?;

    Ok(())
}

/// Look up one invoice by number. Exact, case-insensitive; a loose
/// reference ("9", "inv 9") falls back to its canonical `INV-9` form.
pub async fn invoice_by_number(pool: &SqlitePool, number: &str) -> Result<Option<Invoice>> {
    if let Some(found) = lookup_exact(pool, number.trim()).await? {
        return Ok(Some(found));
    }

    match triage_core::invoice_ref::normalize(number) {
        Some(canonical) if canonical != number.trim() => lookup_exact(pool, &canonical).await,
        _ => Ok(None),
    }
}

async fn lookup_exact(pool: &SqlitePool, number: &str) -> Result<Option<Invoice>> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE LOWER(invoice_number) = LOWER(?)"
    ))
    .bind(number)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Invoice::from))
}

/// Run a structured filter query over the ledger.
pub async fn search_invoices(pool: &SqlitePool, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE 1 = 1"));

    let text_fields = [
        ("invoice_number", &filter.invoice_number),
        ("vendor_name", &filter.vendor_name),
        ("vendor_id", &filter.vendor_id),
        ("customer_name", &filter.customer_name),
        ("customer_id", &filter.customer_id),
        ("po_number", &filter.po_number),
        ("payment_status", &filter.payment_status),
        ("country", &filter.country),
    ];
    for (column, value) in text_fields {
        if let Some(value) = value {
            qb.push(format!(" AND LOWER({column}) LIKE "))
                .push_bind(format!("%{}%", value.trim().to_lowercase()));
        }
    }
    if let Some(amount) = filter.amount {
        qb.push(" AND amount = ").push_bind(amount);
    }
    qb.push(" ORDER BY invoice_number");

    let rows: Vec<InvoiceRow> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(Invoice::from).collect())
}

/// Aggregate ledger figures for the read-only stats view.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub total_invoices: i64,
    pub paid: i64,
    pub unpaid: i64,
    pub total_amount: f64,
    pub unpaid_amount: f64,
    /// Unpaid invoices whose due date has passed.
    pub overdue: i64,
}

/// Compute ledger aggregates. `today` is an ISO date used for the overdue
/// comparison (ISO strings order lexicographically).
pub async fn ledger_stats(pool: &SqlitePool, today: &str) -> Result<LedgerStats> {
    let (total_invoices, paid, unpaid, total_amount, unpaid_amount, overdue): (
        i64,
        i64,
        i64,
        f64,
        f64,
        i64,
    ) = sqlx::query_as(
        "SELECT COUNT(*), \
                COALESCE(SUM(CASE WHEN payment_status = 'Paid' THEN 1 ELSE 0 END), 0), \
                COALESCE(SUM(CASE WHEN payment_status = 'Unpaid' THEN 1 ELSE 0 END), 0), \
                COALESCE(SUM(amount), 0.0), \
                COALESCE(SUM(CASE WHEN payment_status = 'Unpaid' THEN amount ELSE 0.0 END), 0.0), \
                COALESCE(SUM(CASE WHEN payment_status = 'Unpaid' AND due_date IS NOT NULL \
                                   AND due_date < ? THEN 1 ELSE 0 END), 0) \
         FROM invoices",
    )
    .bind(today)
    .fetch_one(pool)
    .await?;

    Ok(LedgerStats {
        total_invoices,
        paid,
        unpaid,
        total_amount,
        unpaid_amount,
        overdue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;

    async fn test_store() -> Store {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn invoice(number: &str, vendor: &str, status: &str, amount: f64) -> Invoice {
        Invoice {
            invoice_number: number.to_string(),
            invoice_date: Some("2026-01-10".to_string()),
            amount: Some(amount),
            vendor_id: Some("V-1".to_string()),
            vendor_name: Some(vendor.to_string()),
            customer_id: None,
            customer_name: None,
            po_number: Some("PO-77".to_string()),
            po_status: Some("Approved".to_string()),
            payment_status: Some(status.to_string()),
            payment_term: Some("Net 30".to_string()),
            due_date: Some("2026-02-09".to_string()),
            clearing_date: None,
            country: Some("DE".to_string()),
        }
    }

    #[tokio::test]
    async fn test_lookup_by_number_case_insensitive() {
        let store = test_store().await;
        insert_invoice(store.pool(), &invoice("INV-9", "ACME Corp", "Paid", 500.0))
            .await
            .unwrap();

        let found = invoice_by_number(store.pool(), "inv-9").await.unwrap();
        assert_eq!(found.unwrap().amount, Some(500.0));

        let missing = invoice_by_number(store.pool(), "INV-999").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_loose_reference_normalizes_to_canonical() {
        let store = test_store().await;
        insert_invoice(store.pool(), &invoice("INV-9", "ACME Corp", "Paid", 500.0))
            .await
            .unwrap();

        for loose in ["9", "inv 9", "INV#9"] {
            let found = invoice_by_number(store.pool(), loose).await.unwrap();
            assert!(found.is_some(), "expected {loose:?} to resolve");
        }
    }

    #[tokio::test]
    async fn test_search_substring_and_exact() {
        let store = test_store().await;
        let pool = store.pool();
        insert_invoice(pool, &invoice("INV-1", "ACME Corp", "Paid", 100.0)).await.unwrap();
        insert_invoice(pool, &invoice("INV-2", "Acme Subsidiary", "Unpaid", 250.0)).await.unwrap();
        insert_invoice(pool, &invoice("INV-3", "Globex", "Unpaid", 250.0)).await.unwrap();

        // Substring, case-insensitive on vendor name.
        let filter = InvoiceFilter {
            vendor_name: Some("acme".to_string()),
            ..Default::default()
        };
        let hits = search_invoices(pool, &filter).await.unwrap();
        assert_eq!(hits.len(), 2);

        // Combined filters narrow the result.
        let filter = InvoiceFilter {
            vendor_name: Some("acme".to_string()),
            payment_status: Some("unpaid".to_string()),
            ..Default::default()
        };
        let hits = search_invoices(pool, &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].invoice_number, "INV-2");

        // Exact numeric match.
        let filter = InvoiceFilter {
            amount: Some(250.0),
            ..Default::default()
        };
        let hits = search_invoices(pool, &filter).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_filter_returns_everything() {
        let store = test_store().await;
        insert_invoice(store.pool(), &invoice("INV-1", "ACME", "Paid", 1.0)).await.unwrap();
        insert_invoice(store.pool(), &invoice("INV-2", "Globex", "Paid", 2.0)).await.unwrap();

        let hits = search_invoices(store.pool(), &InvoiceFilter::default()).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_ledger_stats() {
        let store = test_store().await;
        let pool = store.pool();
        insert_invoice(pool, &invoice("INV-1", "ACME", "Paid", 100.0)).await.unwrap();
        insert_invoice(pool, &invoice("INV-2", "Globex", "Unpaid", 50.0)).await.unwrap();

        let stats = ledger_stats(pool, "2026-03-01").await.unwrap();
        assert_eq!(stats.total_invoices, 2);
        assert_eq!(stats.paid, 1);
        assert_eq!(stats.unpaid, 1);
        assert_eq!(stats.total_amount, 150.0);
        assert_eq!(stats.unpaid_amount, 50.0);
        assert_eq!(stats.overdue, 1);
    }
}
