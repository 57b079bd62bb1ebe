//! Tool schema offered to the model on every turn.

use serde_json::json;
use triage_core::ToolDefinition;

/// The fixed tool set: one searcher and two terminal decisions.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::function(
            "search_invoices",
            "Search the invoice ledger for matching records. Any subset of fields may be given; \
             text fields match by case-insensitive substring, numeric fields exactly.",
            json!({
                "type": "object",
                "properties": {
                    "invoice_number": {"type": "string"},
                    "vendor_name": {"type": "string"},
                    "vendor_id": {"type": "string"},
                    "customer_name": {"type": "string"},
                    "customer_id": {"type": "string"},
                    "po_number": {"type": "string"},
                    "payment_status": {"type": "string"},
                    "country": {"type": "string"},
                    "amount": {"type": "number"}
                }
            }),
        ),
        ToolDefinition::function(
            "resolve_ticket",
            "Resolve the ticket using the correct closure type.",
            json!({
                "type": "object",
                "properties": {
                    "ticket_id": {"type": "string"},
                    "ai_response": {"type": "string"},
                    "auto_solved": {"type": "boolean"},
                    "closure_type": {
                        "type": "string",
                        "enum": ["without_document", "with_document", "needs_approval"],
                        "description": "Required. Choose based on the system prompt rules."
                    },
                    "document_kind": {
                        "type": ["string", "null"],
                        "enum": ["invoice_copy", "payment_confirmation", "invoice_details", null],
                        "description": "Only for with_document: which summary to attach."
                    }
                },
                "required": ["ticket_id", "ai_response", "auto_solved", "closure_type"]
            }),
        ),
        ToolDefinition::function(
            "reassign_ticket",
            "Hand the ticket to a specialist queue when it cannot be resolved automatically.",
            json!({
                "type": "object",
                "properties": {
                    "team": {
                        "type": "string",
                        "enum": ["AP", "AR"],
                        "description": "Target specialist team."
                    },
                    "reason": {"type": "string"}
                },
                "required": ["team", "reason"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_set_is_fixed() {
        let tools = tool_definitions();
        let names: Vec<&str> = tools.iter().map(|t| t.function.name.as_str()).collect();
        assert_eq!(names, vec!["search_invoices", "resolve_ticket", "reassign_ticket"]);
        assert!(tools.iter().all(|t| t.tool_type == "function"));
    }

    #[test]
    fn test_resolve_ticket_requires_closure_type() {
        let tools = tool_definitions();
        let resolve = &tools[1];
        let required = resolve.function.parameters["required"].as_array().unwrap();
        assert!(required.iter().any(|v| v == "closure_type"));
    }
}
