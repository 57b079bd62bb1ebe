//! Invoice-number extraction and normalization.
//!
//! Ticket descriptions reference invoices loosely ("INV-5", "invoice 5",
//! "Invoice #0042"). The ledger keys rows by the canonical `INV-<digits>`
//! form. These heuristics are approximate by design: candidates are looked
//! up one by one and misses simply fall through to the no-document path.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches an explicit "INV" style reference: INV-5, inv 5, INV#0042.
static INV_PREFIXED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\binv[\s#:._-]*(\d{1,12})\b").expect("invalid invoice regex"));

/// Matches a spelled-out reference: invoice 5, invoice no. 5, invoice #5.
static INV_SPELLED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\binvoice\b[\s#:._-]*(?:n(?:o|um(?:ber)?)\.?[\s#:._-]*)?(\d{1,12})\b")
        .expect("invalid invoice regex")
});

/// Normalize a raw invoice reference to the canonical `INV-<digits>` form.
///
/// Returns `None` when the input carries no digits at all.
pub fn normalize(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || digits.len() > 12 {
        return None;
    }
    Some(format!("INV-{}", digits))
}

/// Extract normalized invoice-number candidates from free text.
///
/// Candidates are returned in order of appearance, deduplicated.
pub fn extract_candidates(text: &str) -> Vec<String> {
    let mut hits: Vec<(usize, String)> = Vec::new();
    for regex in [&*INV_PREFIXED, &*INV_SPELLED] {
        for caps in regex.captures_iter(text) {
            if let Some(num) = caps.get(1) {
                hits.push((num.start(), format!("INV-{}", num.as_str())));
            }
        }
    }
    hits.sort_by_key(|(pos, _)| *pos);

    let mut seen = Vec::new();
    for (_, candidate) in hits {
        if !seen.contains(&candidate) {
            seen.push(candidate);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_common_forms() {
        assert_eq!(normalize("INV-5").as_deref(), Some("INV-5"));
        assert_eq!(normalize("inv 0042").as_deref(), Some("INV-0042"));
        assert_eq!(normalize("9").as_deref(), Some("INV-9"));
        assert_eq!(normalize("INV#17").as_deref(), Some("INV-17"));
    }

    #[test]
    fn test_normalize_rejects_digitless_input() {
        assert_eq!(normalize("INV-"), None);
        assert_eq!(normalize("invoice"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn test_extract_prefixed_and_spelled() {
        let found = extract_candidates("Send me a copy of invoice INV-9 please");
        assert_eq!(found, vec!["INV-9"]);

        let found = extract_candidates("What is the status of invoice 5?");
        assert_eq!(found, vec!["INV-5"]);

        let found = extract_candidates("invoices INV-1 and inv 2, also invoice no. 3");
        assert_eq!(found, vec!["INV-1", "INV-2", "INV-3"]);
    }

    #[test]
    fn test_extract_dedupes() {
        let found = extract_candidates("invoice INV-7, I repeat, invoice 7");
        assert_eq!(found, vec!["INV-7"]);
    }

    #[test]
    fn test_extract_ignores_unrelated_numbers() {
        assert!(extract_candidates("call me at 555-1234 about the PO").is_empty());
        assert!(extract_candidates("no reference here").is_empty());
    }

    #[test]
    fn test_extract_malformed_references() {
        // Dangling prefixes and absurdly long digit runs must not match.
        assert!(extract_candidates("INV- is missing its number").is_empty());
        assert!(extract_candidates("invoice 12345678901234567890").is_empty());
        assert!(extract_candidates("INVALID text about invalidation").is_empty());
    }
}
