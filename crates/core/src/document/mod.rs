//! Trade document types, statuses, and the payable role.
//!
//! A payable document (proforma invoice, purchase order, shipment) owns a
//! payment schedule and moves through a per-type status graph. The
//! polymorphic "payable" relation of the source system is expressed as the
//! [`Payable`] trait plus the [`DocumentType`] enum, giving compile-time
//! exhaustiveness instead of runtime type strings.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use tradewind_shared::types::{Currency, DocumentId, Money};

use crate::payment::PaymentDirection;
use crate::statemachine::{State, StateMachine};

/// The concrete kinds of payable trade documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Proforma invoice issued to a customer.
    ProformaInvoice,
    /// Purchase order placed with a supplier.
    PurchaseOrder,
    /// Shipment of goods under an order.
    Shipment,
}

impl DocumentType {
    /// Returns the storage representation of the document type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProformaInvoice => "proforma_invoice",
            Self::PurchaseOrder => "purchase_order",
            Self::Shipment => "shipment",
        }
    }

    /// Parses a document type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "proforma_invoice" => Some(Self::ProformaInvoice),
            "purchase_order" => Some(Self::PurchaseOrder),
            "shipment" => Some(Self::Shipment),
            _ => None,
        }
    }

    /// Returns the status graph for this document type.
    #[must_use]
    pub fn state_machine(&self) -> &'static StateMachine<TradeStatus> {
        match self {
            Self::ProformaInvoice => &PROFORMA_INVOICE_MACHINE,
            Self::PurchaseOrder => &PURCHASE_ORDER_MACHINE,
            Self::Shipment => &SHIPMENT_MACHINE,
        }
    }

    /// Default payment direction for documents of this type.
    #[must_use]
    pub const fn default_direction(&self) -> PaymentDirection {
        match self {
            Self::ProformaInvoice => PaymentDirection::Inbound,
            Self::PurchaseOrder | Self::Shipment => PaymentDirection::Outbound,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a trade document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    /// Document is being drafted and can be modified.
    Draft,
    /// Document has been sent to the counterparty.
    Sent,
    /// Counterparty has confirmed the document.
    Confirmed,
    /// Goods are in production.
    InProduction,
    /// Goods have been shipped.
    Shipped,
    /// Document is fully settled and closed.
    Completed,
    /// Document was cancelled.
    Cancelled,
}

impl TradeStatus {
    /// Parses a status from its storage string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "confirmed" => Some(Self::Confirmed),
            "in_production" => Some(Self::InProduction),
            "shipped" => Some(Self::Shipped),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl State for TradeStatus {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Confirmed => "confirmed",
            Self::InProduction => "in_production",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status graph for proforma invoices.
pub static PROFORMA_INVOICE_MACHINE: StateMachine<TradeStatus> = StateMachine {
    edges: &[
        (
            TradeStatus::Draft,
            &[TradeStatus::Sent, TradeStatus::Cancelled],
        ),
        (
            TradeStatus::Sent,
            &[TradeStatus::Confirmed, TradeStatus::Cancelled],
        ),
        (
            TradeStatus::Confirmed,
            &[TradeStatus::InProduction, TradeStatus::Cancelled],
        ),
        (TradeStatus::InProduction, &[TradeStatus::Shipped]),
        (TradeStatus::Shipped, &[TradeStatus::Completed]),
    ],
};

/// Status graph for purchase orders (no "sent" stage).
pub static PURCHASE_ORDER_MACHINE: StateMachine<TradeStatus> = StateMachine {
    edges: &[
        (
            TradeStatus::Draft,
            &[TradeStatus::Confirmed, TradeStatus::Cancelled],
        ),
        (
            TradeStatus::Confirmed,
            &[TradeStatus::InProduction, TradeStatus::Cancelled],
        ),
        (TradeStatus::InProduction, &[TradeStatus::Shipped]),
        (TradeStatus::Shipped, &[TradeStatus::Completed]),
    ],
};

/// Status graph for shipments (no production stage).
pub static SHIPMENT_MACHINE: StateMachine<TradeStatus> = StateMachine {
    edges: &[
        (
            TradeStatus::Draft,
            &[TradeStatus::Confirmed, TradeStatus::Cancelled],
        ),
        (
            TradeStatus::Confirmed,
            &[TradeStatus::Shipped, TradeStatus::Cancelled],
        ),
        (TradeStatus::Shipped, &[TradeStatus::Completed]),
    ],
};

/// The payable role: any entity with a total, a currency, and a payment
/// direction. The schedule and allocation engines operate on this trait
/// rather than on concrete document rows.
pub trait Payable {
    /// Identity of the payable document.
    fn id(&self) -> DocumentId;
    /// The concrete document type.
    fn document_type(&self) -> DocumentType;
    /// Human-readable document reference.
    fn reference(&self) -> &str;
    /// Total amount owed, in minor units. Never negative.
    fn total(&self) -> Money;
    /// Whether money flows in or out.
    fn direction(&self) -> PaymentDirection;
    /// The document's issue date, if issued.
    fn issue_date(&self) -> Option<NaiveDate>;
    /// The date the document was created.
    fn created_on(&self) -> NaiveDate;
}

/// A plain snapshot of a payable, detached from its storage row.
#[derive(Debug, Clone)]
pub struct PayableSnapshot {
    /// Document identity.
    pub id: DocumentId,
    /// Concrete document type.
    pub document_type: DocumentType,
    /// Document reference.
    pub reference: String,
    /// Total amount in minor units.
    pub total_minor: i64,
    /// Document currency.
    pub currency: Currency,
    /// Payment direction.
    pub direction: PaymentDirection,
    /// Issue date, if issued.
    pub issue_date: Option<NaiveDate>,
    /// Creation date.
    pub created_on: NaiveDate,
}

impl Payable for PayableSnapshot {
    fn id(&self) -> DocumentId {
        self.id
    }

    fn document_type(&self) -> DocumentType {
        self.document_type
    }

    fn reference(&self) -> &str {
        &self.reference
    }

    fn total(&self) -> Money {
        Money::new(self.total_minor, self.currency)
    }

    fn direction(&self) -> PaymentDirection {
        self.direction
    }

    fn issue_date(&self) -> Option<NaiveDate> {
        self.issue_date
    }

    fn created_on(&self) -> NaiveDate {
        self.created_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_round_trip() {
        for ty in [
            DocumentType::ProformaInvoice,
            DocumentType::PurchaseOrder,
            DocumentType::Shipment,
        ] {
            assert_eq!(DocumentType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(DocumentType::parse("invoice"), None);
    }

    #[test]
    fn test_trade_status_round_trip() {
        for status in [
            TradeStatus::Draft,
            TradeStatus::Sent,
            TradeStatus::Confirmed,
            TradeStatus::InProduction,
            TradeStatus::Shipped,
            TradeStatus::Completed,
            TradeStatus::Cancelled,
        ] {
            assert_eq!(TradeStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TradeStatus::parse("posted"), None);
    }

    #[test]
    fn test_proforma_invoice_graph() {
        let machine = DocumentType::ProformaInvoice.state_machine();
        assert!(machine.can_transition(TradeStatus::Draft, TradeStatus::Sent));
        assert!(machine.can_transition(TradeStatus::Sent, TradeStatus::Confirmed));
        assert!(machine.can_transition(TradeStatus::Confirmed, TradeStatus::InProduction));
        assert!(!machine.can_transition(TradeStatus::Draft, TradeStatus::Shipped));
        assert!(!machine.can_transition(TradeStatus::Shipped, TradeStatus::Draft));
    }

    #[test]
    fn test_purchase_order_skips_sent() {
        let machine = DocumentType::PurchaseOrder.state_machine();
        assert!(machine.can_transition(TradeStatus::Draft, TradeStatus::Confirmed));
        assert!(!machine.can_transition(TradeStatus::Draft, TradeStatus::Sent));
    }

    #[test]
    fn test_shipment_has_no_production_stage() {
        let machine = DocumentType::Shipment.state_machine();
        assert!(machine.can_transition(TradeStatus::Confirmed, TradeStatus::Shipped));
        assert!(!machine.can_transition(TradeStatus::Confirmed, TradeStatus::InProduction));
    }

    #[test]
    fn test_terminal_statuses() {
        for ty in [
            DocumentType::ProformaInvoice,
            DocumentType::PurchaseOrder,
            DocumentType::Shipment,
        ] {
            let machine = ty.state_machine();
            assert!(machine.is_terminal(TradeStatus::Completed));
            assert!(machine.is_terminal(TradeStatus::Cancelled));
        }
    }

    #[test]
    fn test_default_directions() {
        assert_eq!(
            DocumentType::ProformaInvoice.default_direction(),
            PaymentDirection::Inbound
        );
        assert_eq!(
            DocumentType::PurchaseOrder.default_direction(),
            PaymentDirection::Outbound
        );
    }

    #[test]
    fn test_payable_snapshot_total() {
        let snapshot = PayableSnapshot {
            id: DocumentId::new(),
            document_type: DocumentType::ProformaInvoice,
            reference: "PI-2026-00001".to_string(),
            total_minor: 100_000,
            currency: Currency::Usd,
            direction: PaymentDirection::Inbound,
            issue_date: None,
            created_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        };
        assert_eq!(snapshot.total(), Money::new(100_000, Currency::Usd));
        assert_eq!(snapshot.reference(), "PI-2026-00001");
    }
}
