//! Summary document renderer.
//!
//! Renders one of three invoice summary kinds to a file for email
//! attachment: an invoice copy, a payment confirmation, or the full invoice
//! details. Documents are plain-text snapshots of the ledger row; the
//! renderer returns the generated path, or `None` on any failure, and the
//! caller degrades to a body-only notification.
//!
//! Files land in a configurable output directory and are deleted by the
//! caller after the send attempt.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use triage_core::{DocumentKind, DocumentRenderer, Invoice, RenderError};

/// Renders invoice summaries into an output directory.
#[derive(Debug, Clone)]
pub struct DocRenderer {
    output_dir: PathBuf,
}

impl DocRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Create a renderer from `DOC_OUTPUT_DIR` (default: `temp_docs`).
    pub fn from_env() -> Self {
        let dir = std::env::var("DOC_OUTPUT_DIR").unwrap_or_else(|_| "temp_docs".to_string());
        Self::new(dir)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn render_to_file(
        &self,
        kind: DocumentKind,
        invoice: &Invoice,
        context: &str,
    ) -> Result<PathBuf, RenderError> {
        fs::create_dir_all(&self.output_dir)?;

        let prefix = match kind {
            DocumentKind::InvoiceCopy => "Invoice_Copy",
            DocumentKind::PaymentConfirmation => "Payment_Confirmation",
            DocumentKind::InvoiceDetails => "Invoice_Details",
        };
        let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!(
            "{}_{}_{}.txt",
            prefix,
            sanitize_invoice_number(&invoice.invoice_number),
            stamp
        );
        let path = self.output_dir.join(filename);

        let body = match kind {
            DocumentKind::InvoiceCopy => invoice_copy_document(invoice, context),
            DocumentKind::PaymentConfirmation => payment_confirmation_document(invoice, context),
            DocumentKind::InvoiceDetails => invoice_details_document(invoice, context),
        };

        fs::write(&path, body)?;
        Ok(path)
    }
}

impl DocumentRenderer for DocRenderer {
    fn render(&self, kind: DocumentKind, invoice: &Invoice, context: &str) -> Option<PathBuf> {
        match self.render_to_file(kind, invoice, context) {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(
                    kind = kind.as_str(),
                    invoice = %invoice.invoice_number,
                    error = %err,
                    "Document rendering failed"
                );
                None
            }
        }
    }
}

fn sanitize_invoice_number(number: &str) -> String {
    let cleaned: String = number
        .trim()
        .chars()
        .map(|c| match c {
            '/' => '-',
            ' ' => '_',
            other => other,
        })
        .collect();
    if cleaned.is_empty() {
        "UNKNOWN".to_string()
    } else {
        cleaned
    }
}

fn format_currency(value: Option<f64>) -> String {
    match value {
        Some(amount) => format!("${:.2}", amount),
        None => "N/A".to_string(),
    }
}

fn safe_text(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

fn truncate(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        value.to_string()
    } else {
        let kept: String = value.chars().take(limit.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn document(title: &str, subtitle: &str, rows: &[(&str, String)], notes: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Querydesk Query Management System");
    let _ = writeln!(out, "Automated Invoice Snapshot");
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.len()));
    let _ = writeln!(out, "{}", subtitle);
    let _ = writeln!(out);
    for (label, value) in rows {
        let _ = writeln!(out, "{}: {}", label, value);
    }
    if !notes.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", notes);
    }
    out
}

fn invoice_copy_document(invoice: &Invoice, context: &str) -> String {
    let rows = vec![
        ("Invoice Number", safe_text(Some(&invoice.invoice_number), "N/A")),
        ("Invoice Date", safe_text(invoice.invoice_date.as_deref(), "Unknown")),
        ("Due Date", safe_text(invoice.due_date.as_deref(), "Unknown")),
        ("Invoice Amount", format_currency(invoice.amount)),
        ("Party", safe_text(invoice.counterpart(), "Not provided")),
        ("Payment Status", safe_text(invoice.payment_status.as_deref(), "Unknown")),
        ("PO Number", safe_text(invoice.po_number.as_deref(), "Not available")),
    ];

    let subtitle = if context.trim().is_empty() {
        "Invoice copy requested by user.".to_string()
    } else {
        truncate(context, 160)
    };
    document(
        "Invoice Copy Summary",
        &subtitle,
        &rows,
        "Summary generated directly from the invoice ledger.",
    )
}

fn payment_confirmation_document(invoice: &Invoice, context: &str) -> String {
    let payment_status = safe_text(invoice.payment_status.as_deref(), "Unknown");
    let status_note = match payment_status.to_lowercase().as_str() {
        "paid" => "Payment recorded as PAID in the ledger.",
        "unpaid" => "Payment is still pending according to the ledger.",
        _ => "Payment status reflects the latest ledger update.",
    };

    let rows = vec![
        ("Invoice Number", safe_text(Some(&invoice.invoice_number), "N/A")),
        ("Invoice Amount", format_currency(invoice.amount)),
        ("Payment Status", payment_status),
        ("Due Date", safe_text(invoice.due_date.as_deref(), "Unknown")),
        ("Clearing Date", safe_text(invoice.clearing_date.as_deref(), "Not available")),
        ("Requester", safe_text(invoice.counterpart(), "Not provided")),
    ];

    let subtitle = if context.trim().is_empty() {
        "Payment confirmation shared with requester.".to_string()
    } else {
        truncate(context, 160)
    };
    document("Payment Confirmation", &subtitle, &rows, status_note)
}

fn invoice_details_document(invoice: &Invoice, context: &str) -> String {
    let fields: [(&str, Option<&str>); 13] = [
        ("Invoice Number", Some(invoice.invoice_number.as_str())),
        ("Invoice Date", invoice.invoice_date.as_deref()),
        ("Vendor Name", invoice.vendor_name.as_deref()),
        ("Vendor ID", invoice.vendor_id.as_deref()),
        ("Customer Name", invoice.customer_name.as_deref()),
        ("Customer ID", invoice.customer_id.as_deref()),
        ("Payment Status", invoice.payment_status.as_deref()),
        ("Due Date", invoice.due_date.as_deref()),
        ("Clearing Date", invoice.clearing_date.as_deref()),
        ("PO Number", invoice.po_number.as_deref()),
        ("PO Status", invoice.po_status.as_deref()),
        ("Payment Term", invoice.payment_term.as_deref()),
        ("Country", invoice.country.as_deref()),
    ];

    let mut rows: Vec<(&str, String)> = Vec::new();
    for (label, value) in fields {
        match value.map(str::trim) {
            Some(text) if !text.is_empty() => rows.push((label, text.to_string())),
            _ => {}
        }
    }
    if invoice.amount.is_some() {
        rows.insert(
            rows.len().min(2),
            ("Invoice Amount", format_currency(invoice.amount)),
        );
    }
    if rows.is_empty() {
        rows.push((
            "Notice",
            "No additional invoice attributes were available in the data source.".to_string(),
        ));
    }

    let subtitle = if context.trim().is_empty() {
        "Comprehensive invoice details requested.".to_string()
    } else {
        truncate(context, 160)
    };
    document(
        "Invoice Details",
        &subtitle,
        &rows,
        "Values come directly from the latest invoice record in the ledger.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_invoice() -> Invoice {
        Invoice {
            invoice_number: "INV-1001".to_string(),
            invoice_date: Some("2026-02-10".to_string()),
            amount: Some(1234.56),
            vendor_id: Some("V-9".to_string()),
            vendor_name: Some("ACME Corp".to_string()),
            customer_id: None,
            customer_name: None,
            po_number: Some("PO-5".to_string()),
            po_status: Some("Approved".to_string()),
            payment_status: Some("Paid".to_string()),
            payment_term: Some("Net 30".to_string()),
            due_date: Some("2026-02-20".to_string()),
            clearing_date: None,
            country: Some("US".to_string()),
        }
    }

    #[test]
    fn test_all_kinds_render_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = DocRenderer::new(dir.path());
        let invoice = sample_invoice();

        for kind in [
            DocumentKind::InvoiceCopy,
            DocumentKind::PaymentConfirmation,
            DocumentKind::InvoiceDetails,
        ] {
            let path = renderer.render(kind, &invoice, "Need a copy").unwrap();
            let body = fs::read_to_string(&path).unwrap();
            assert!(body.contains("INV-1001"));
            assert!(path.file_name().unwrap().to_str().unwrap().ends_with(".txt"));
        }
    }

    #[test]
    fn test_payment_confirmation_states_ledger_status() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = DocRenderer::new(dir.path());

        let path = renderer
            .render(DocumentKind::PaymentConfirmation, &sample_invoice(), "")
            .unwrap();
        let body = fs::read_to_string(path).unwrap();
        assert!(body.contains("Payment recorded as PAID"));
        assert!(body.contains("$1234.56"));
    }

    #[test]
    fn test_details_skips_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = DocRenderer::new(dir.path());
        let mut invoice = sample_invoice();
        invoice.clearing_date = None;
        invoice.customer_name = Some("  ".to_string());

        let path = renderer
            .render(DocumentKind::InvoiceDetails, &invoice, "details please")
            .unwrap();
        let body = fs::read_to_string(path).unwrap();
        assert!(!body.contains("Clearing Date"));
        assert!(!body.contains("Customer Name"));
    }

    #[test]
    fn test_unwritable_output_dir_returns_none() {
        let renderer = DocRenderer::new("/proc/definitely/not/writable");
        let result = renderer.render(DocumentKind::InvoiceCopy, &sample_invoice(), "ctx");
        assert!(result.is_none());
    }

    #[test]
    fn test_sanitize_invoice_number() {
        assert_eq!(sanitize_invoice_number("INV/2026 01"), "INV-2026_01");
        assert_eq!(sanitize_invoice_number("  "), "UNKNOWN");
    }
}
