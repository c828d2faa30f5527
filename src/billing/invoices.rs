//! Invoice list helpers for the billing page

use crate::core::model::Invoice;
use std::collections::BTreeSet;

/// Invoices that can still be paid
pub fn unpaid(invoices: &[Invoice]) -> Vec<&Invoice> {
    invoices.iter().filter(|inv| !inv.is_paid()).collect()
}

/// Sum of the selected invoices that are not paid yet
pub fn total_selected(invoices: &[Invoice], selected: &BTreeSet<String>) -> f64 {
    invoices
        .iter()
        .filter(|inv| !inv.is_paid() && selected.contains(&inv.id))
        .map(|inv| inv.total_amount)
        .sum()
}

/// Invoice number shown to the user
///
/// Falls back to `INV-` and the last six characters of the id, uppercased.
pub fn display_number(invoice: &Invoice) -> String {
    if let Some(number) = invoice
        .invoice_number
        .as_deref()
        .filter(|n| !n.trim().is_empty())
    {
        return number.to_string();
    }

    let chars: Vec<char> = invoice.id.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
    format!("INV-{}", tail.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{InvoiceStatus, LineItem};
    use chrono::NaiveDate;

    fn invoice(id: &str, amount: f64, status: InvoiceStatus) -> Invoice {
        let mut inv = Invoice::issue(
            "p1",
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            vec![LineItem::new("Visit", amount, 1)],
        );
        inv.id = id.to_string();
        inv.status = status;
        inv
    }

    #[test]
    fn test_unpaid_keeps_unpaid_and_partial() {
        let list = vec![
            invoice("a", 10.0, InvoiceStatus::Unpaid),
            invoice("b", 20.0, InvoiceStatus::Paid),
            invoice("c", 30.0, InvoiceStatus::Partial),
        ];
        let ids: Vec<&str> = unpaid(&list).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_total_ignores_paid_and_unselected() {
        let list = vec![
            invoice("a", 150.0, InvoiceStatus::Unpaid),
            invoice("b", 20.0, InvoiceStatus::Paid),
            invoice("c", 49.5, InvoiceStatus::Unpaid),
        ];
        let selected: BTreeSet<String> = ["a", "b"].into_iter().map(String::from).collect();
        assert_eq!(total_selected(&list, &selected), 150.0);
        assert_eq!(total_selected(&list, &BTreeSet::new()), 0.0);
    }

    #[test]
    fn test_display_number() {
        let mut inv = invoice("65f1c0ab93de4a1b", 1.0, InvoiceStatus::Unpaid);
        assert_eq!(display_number(&inv), "INV-DE4A1B");
        inv.invoice_number = Some("2026/03/001".to_string());
        assert_eq!(display_number(&inv), "2026/03/001");
        inv.invoice_number = None;
        inv.id = "ab1".to_string();
        assert_eq!(display_number(&inv), "INV-AB1");
    }
}
