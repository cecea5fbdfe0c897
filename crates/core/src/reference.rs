//! Human-readable document reference formatting.
//!
//! References follow `{PREFIX}-{YYYY}-{zero-padded number}` with a
//! per-kind default pad width. The sequence numbers themselves come from
//! the locked counter in the persistence layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The document kinds that carry their own reference sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Customer inquiry.
    Inquiry,
    /// Quotation.
    Quotation,
    /// Proforma invoice.
    ProformaInvoice,
    /// Purchase order.
    PurchaseOrder,
    /// Shipment.
    Shipment,
    /// Payment.
    Payment,
}

impl ReferenceKind {
    /// Returns the storage representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Inquiry => "inquiry",
            Self::Quotation => "quotation",
            Self::ProformaInvoice => "proforma_invoice",
            Self::PurchaseOrder => "purchase_order",
            Self::Shipment => "shipment",
            Self::Payment => "payment",
        }
    }

    /// Parses a kind from its storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "inquiry" => Some(Self::Inquiry),
            "quotation" => Some(Self::Quotation),
            "proforma_invoice" => Some(Self::ProformaInvoice),
            "purchase_order" => Some(Self::PurchaseOrder),
            "shipment" => Some(Self::Shipment),
            "payment" => Some(Self::Payment),
            _ => None,
        }
    }

    /// Reference prefix for this kind.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Inquiry => "INQ",
            Self::Quotation => "QUO",
            Self::ProformaInvoice => "PI",
            Self::PurchaseOrder => "PO",
            Self::Shipment => "SHP",
            Self::Payment => "PAY",
        }
    }

    /// Default zero-pad width for this kind.
    #[must_use]
    pub const fn pad_width(&self) -> usize {
        match self {
            Self::Inquiry | Self::Quotation => 4,
            Self::ProformaInvoice | Self::PurchaseOrder | Self::Shipment => 5,
            Self::Payment => 6,
        }
    }

    /// Formats a reference with the kind's default pad width.
    #[must_use]
    pub fn format(&self, year: i32, number: i64) -> String {
        self.format_with_pad(year, number, self.pad_width())
    }

    /// Formats a reference with a caller-supplied pad width.
    ///
    /// Numbers wider than the pad are never truncated.
    #[must_use]
    pub fn format_with_pad(&self, year: i32, number: i64, pad: usize) -> String {
        format!("{}-{year}-{number:0pad$}", self.prefix())
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ReferenceKind::Inquiry, "INQ", 4)]
    #[case(ReferenceKind::Quotation, "QUO", 4)]
    #[case(ReferenceKind::ProformaInvoice, "PI", 5)]
    #[case(ReferenceKind::PurchaseOrder, "PO", 5)]
    #[case(ReferenceKind::Shipment, "SHP", 5)]
    #[case(ReferenceKind::Payment, "PAY", 6)]
    fn test_prefixes_and_pads(
        #[case] kind: ReferenceKind,
        #[case] prefix: &str,
        #[case] pad: usize,
    ) {
        assert_eq!(kind.prefix(), prefix);
        assert_eq!(kind.pad_width(), pad);
    }

    #[test]
    fn test_format() {
        assert_eq!(
            ReferenceKind::ProformaInvoice.format(2026, 42),
            "PI-2026-00042"
        );
        assert_eq!(ReferenceKind::Payment.format(2026, 1), "PAY-2026-000001");
        assert_eq!(ReferenceKind::Inquiry.format(2026, 7), "INQ-2026-0007");
    }

    #[test]
    fn test_format_with_custom_pad() {
        assert_eq!(
            ReferenceKind::PurchaseOrder.format_with_pad(2026, 9, 3),
            "PO-2026-009"
        );
    }

    #[test]
    fn test_wide_numbers_are_not_truncated() {
        assert_eq!(
            ReferenceKind::Inquiry.format(2026, 123_456),
            "INQ-2026-123456"
        );
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            ReferenceKind::Inquiry,
            ReferenceKind::Quotation,
            ReferenceKind::ProformaInvoice,
            ReferenceKind::PurchaseOrder,
            ReferenceKind::Shipment,
            ReferenceKind::Payment,
        ] {
            assert_eq!(ReferenceKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ReferenceKind::parse("credit_note"), None);
    }
}
