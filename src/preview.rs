//! # On-Screen Preview
//!
//! Plain-text rendering of a record for terminals and the HTTP preview
//! endpoint. Amounts are locale-grouped with [`grouped`], unlike the
//! thermal ticket.

use std::fmt::Write;

use rust_decimal::Decimal;

use crate::format::grouped;
use crate::model::ReceiptRecord;

/// Width of the label column.
const LABEL_WIDTH: usize = 18;

/// Render `record` as a labelled text block.
pub fn render_text(record: &ReceiptRecord) -> String {
    let op = &record.details;
    let symbol = op.currency.symbol();
    let money = |amount: Decimal| format!("{} {}", symbol, grouped(amount));

    let mut rows: Vec<(&str, String)> = vec![
        ("Nro. operación", record.operation_number.to_string()),
        (
            "Fecha",
            record.created_at.format("%d/%m/%Y %H:%M:%S").to_string(),
        ),
        ("Sucursal", op.branch.clone()),
        ("Cliente", op.client_name.clone()),
        (
            "Documento",
            format!("{} {}", op.document_type, op.document_number),
        ),
        ("Cuenta", op.account_number.clone()),
        ("Operación", op.operation_type.label().to_string()),
        ("Importe", money(op.amount)),
        ("Forma de pago", op.payment_method.label().to_string()),
        ("Efectivo", money(op.cash_received)),
        ("Monto depósito", money(op.deposit_amount)),
    ];
    if op.tax_withheld > Decimal::ZERO {
        rows.push(("Impuesto retenido", money(op.tax_withheld)));
    }
    if let Some(notes) = op.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        rows.push(("Observaciones", notes.to_string()));
    }

    let mut out = String::new();
    for (label, value) in rows {
        let pad = LABEL_WIDTH.saturating_sub(label.chars().count());
        let _ = writeln!(out, "{}{} {}", label, " ".repeat(pad), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Currency, OperationInput, OperationNumber, OperationType, PaymentMethod,
    };
    use chrono::DateTime;
    use uuid::Uuid;

    fn record() -> ReceiptRecord {
        ReceiptRecord {
            id: Uuid::nil(),
            operation_number: OperationNumber::new(12),
            created_at: DateTime::parse_from_rfc3339("2026-10-19T16:40:00-05:00").unwrap(),
            details: OperationInput {
                branch: "SURCO".to_string(),
                account_number: "2003004005006".to_string(),
                client_name: "Carlos Ñique".to_string(),
                document_type: "DNI".to_string(),
                document_number: "40404040".to_string(),
                operation_type: OperationType::Withdrawal,
                currency: Currency::Usd,
                amount: Decimal::new(1250000, 2),
                payment_method: PaymentMethod::Check,
                cash_received: Decimal::ZERO,
                deposit_amount: Decimal::ZERO,
                tax_withheld: Decimal::ZERO,
                notes: None,
            },
        }
    }

    #[test]
    fn test_grouped_amounts_and_number() {
        let text = render_text(&record());
        assert!(text.contains("216-000012"));
        assert!(text.contains("US$ 12,500.00"));
        assert!(text.contains("19/10/2026 16:40:00"));
        assert!(text.contains("Carlos Ñique"));
    }

    #[test]
    fn test_optional_rows() {
        let text = render_text(&record());
        assert!(!text.contains("Impuesto retenido"));
        assert!(!text.contains("Observaciones"));

        let mut rec = record();
        rec.details.tax_withheld = Decimal::new(1230, 2);
        rec.details.notes = Some("Ventanilla 3".to_string());
        let text = render_text(&rec);
        assert!(text.contains("Impuesto retenido  US$ 12.30"));
        assert!(text.contains("Ventanilla 3"));
    }
}
