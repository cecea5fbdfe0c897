//! `SeaORM` active enums mapped to Postgres enum types.
//!
//! Each enum mirrors a core domain enum; the `From` conversions keep the
//! storage and domain representations in lockstep.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Trade document type.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_type")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Proforma invoice.
    #[sea_orm(string_value = "proforma_invoice")]
    ProformaInvoice,
    /// Purchase order.
    #[sea_orm(string_value = "purchase_order")]
    PurchaseOrder,
    /// Shipment.
    #[sea_orm(string_value = "shipment")]
    Shipment,
}

/// Trade document lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "trade_status")]
#[serde(rename_all = "snake_case")]
pub enum TradeStatus {
    /// Draft.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Sent to counterparty.
    #[sea_orm(string_value = "sent")]
    Sent,
    /// Confirmed by counterparty.
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// In production.
    #[sea_orm(string_value = "in_production")]
    InProduction,
    /// Shipped.
    #[sea_orm(string_value = "shipped")]
    Shipped,
    /// Completed.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Payment direction.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_direction")]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    /// Money received.
    #[sea_orm(string_value = "inbound")]
    Inbound,
    /// Money paid out.
    #[sea_orm(string_value = "outbound")]
    Outbound,
}

/// Payment approval status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting approval.
    #[sea_orm(string_value = "pending_approval")]
    PendingApproval,
    /// Approved.
    #[sea_orm(string_value = "approved")]
    Approved,
    /// Rejected.
    #[sea_orm(string_value = "rejected")]
    Rejected,
    /// Cancelled.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Schedule item status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "schedule_item_status")]
#[serde(rename_all = "snake_case")]
pub enum ScheduleItemStatus {
    /// Generated, not yet due.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Due date arrived.
    #[sea_orm(string_value = "due")]
    Due,
    /// Fully paid.
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Past due without full payment.
    #[sea_orm(string_value = "overdue")]
    Overdue,
    /// Waived.
    #[sea_orm(string_value = "waived")]
    Waived,
}

/// Schedule stage calculation base.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "calculation_base")]
#[serde(rename_all = "snake_case")]
pub enum CalculationBase {
    /// Relative to the order date.
    #[sea_orm(string_value = "order_date")]
    OrderDate,
    /// Relative to the purchase-order date.
    #[sea_orm(string_value = "po_date")]
    PoDate,
    /// Relative to the invoice date.
    #[sea_orm(string_value = "invoice_date")]
    InvoiceDate,
    /// Before production starts.
    #[sea_orm(string_value = "before_production")]
    BeforeProduction,
    /// Before goods ship.
    #[sea_orm(string_value = "before_shipment")]
    BeforeShipment,
    /// After shipment.
    #[sea_orm(string_value = "after_shipment")]
    AfterShipment,
}

/// Reference sequence kind.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reference_kind")]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// Inquiry.
    #[sea_orm(string_value = "inquiry")]
    Inquiry,
    /// Quotation.
    #[sea_orm(string_value = "quotation")]
    Quotation,
    /// Proforma invoice.
    #[sea_orm(string_value = "proforma_invoice")]
    ProformaInvoice,
    /// Purchase order.
    #[sea_orm(string_value = "purchase_order")]
    PurchaseOrder,
    /// Shipment.
    #[sea_orm(string_value = "shipment")]
    Shipment,
    /// Payment.
    #[sea_orm(string_value = "payment")]
    Payment,
}

/// Exchange-rate approval status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rate_status")]
#[serde(rename_all = "snake_case")]
pub enum RateStatus {
    /// Awaiting approval; invisible to conversion.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Approved; consulted by conversion.
    #[sea_orm(string_value = "approved")]
    Approved,
}

/// Exchange-rate source.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "rate_source")]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Entered by hand.
    #[sea_orm(string_value = "manual")]
    Manual,
    /// Ingested from the external rate feed.
    #[sea_orm(string_value = "api")]
    Api,
}

// ---------------------------------------------------------------------------
// Conversions between storage enums and core domain enums
// ---------------------------------------------------------------------------

impl From<tradewind_core::document::DocumentType> for DocumentType {
    fn from(value: tradewind_core::document::DocumentType) -> Self {
        match value {
            tradewind_core::document::DocumentType::ProformaInvoice => Self::ProformaInvoice,
            tradewind_core::document::DocumentType::PurchaseOrder => Self::PurchaseOrder,
            tradewind_core::document::DocumentType::Shipment => Self::Shipment,
        }
    }
}

impl From<DocumentType> for tradewind_core::document::DocumentType {
    fn from(value: DocumentType) -> Self {
        match value {
            DocumentType::ProformaInvoice => Self::ProformaInvoice,
            DocumentType::PurchaseOrder => Self::PurchaseOrder,
            DocumentType::Shipment => Self::Shipment,
        }
    }
}

impl From<tradewind_core::document::TradeStatus> for TradeStatus {
    fn from(value: tradewind_core::document::TradeStatus) -> Self {
        use tradewind_core::document::TradeStatus as Core;
        match value {
            Core::Draft => Self::Draft,
            Core::Sent => Self::Sent,
            Core::Confirmed => Self::Confirmed,
            Core::InProduction => Self::InProduction,
            Core::Shipped => Self::Shipped,
            Core::Completed => Self::Completed,
            Core::Cancelled => Self::Cancelled,
        }
    }
}

impl From<TradeStatus> for tradewind_core::document::TradeStatus {
    fn from(value: TradeStatus) -> Self {
        match value {
            TradeStatus::Draft => Self::Draft,
            TradeStatus::Sent => Self::Sent,
            TradeStatus::Confirmed => Self::Confirmed,
            TradeStatus::InProduction => Self::InProduction,
            TradeStatus::Shipped => Self::Shipped,
            TradeStatus::Completed => Self::Completed,
            TradeStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<tradewind_core::payment::PaymentDirection> for PaymentDirection {
    fn from(value: tradewind_core::payment::PaymentDirection) -> Self {
        match value {
            tradewind_core::payment::PaymentDirection::Inbound => Self::Inbound,
            tradewind_core::payment::PaymentDirection::Outbound => Self::Outbound,
        }
    }
}

impl From<PaymentDirection> for tradewind_core::payment::PaymentDirection {
    fn from(value: PaymentDirection) -> Self {
        match value {
            PaymentDirection::Inbound => Self::Inbound,
            PaymentDirection::Outbound => Self::Outbound,
        }
    }
}

impl From<tradewind_core::payment::PaymentStatus> for PaymentStatus {
    fn from(value: tradewind_core::payment::PaymentStatus) -> Self {
        use tradewind_core::payment::PaymentStatus as Core;
        match value {
            Core::PendingApproval => Self::PendingApproval,
            Core::Approved => Self::Approved,
            Core::Rejected => Self::Rejected,
            Core::Cancelled => Self::Cancelled,
        }
    }
}

impl From<PaymentStatus> for tradewind_core::payment::PaymentStatus {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::PendingApproval => Self::PendingApproval,
            PaymentStatus::Approved => Self::Approved,
            PaymentStatus::Rejected => Self::Rejected,
            PaymentStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<tradewind_core::schedule::ScheduleItemStatus> for ScheduleItemStatus {
    fn from(value: tradewind_core::schedule::ScheduleItemStatus) -> Self {
        use tradewind_core::schedule::ScheduleItemStatus as Core;
        match value {
            Core::Pending => Self::Pending,
            Core::Due => Self::Due,
            Core::Paid => Self::Paid,
            Core::Overdue => Self::Overdue,
            Core::Waived => Self::Waived,
        }
    }
}

impl From<ScheduleItemStatus> for tradewind_core::schedule::ScheduleItemStatus {
    fn from(value: ScheduleItemStatus) -> Self {
        match value {
            ScheduleItemStatus::Pending => Self::Pending,
            ScheduleItemStatus::Due => Self::Due,
            ScheduleItemStatus::Paid => Self::Paid,
            ScheduleItemStatus::Overdue => Self::Overdue,
            ScheduleItemStatus::Waived => Self::Waived,
        }
    }
}

impl From<tradewind_core::schedule::CalculationBase> for CalculationBase {
    fn from(value: tradewind_core::schedule::CalculationBase) -> Self {
        use tradewind_core::schedule::CalculationBase as Core;
        match value {
            Core::OrderDate => Self::OrderDate,
            Core::PoDate => Self::PoDate,
            Core::InvoiceDate => Self::InvoiceDate,
            Core::BeforeProduction => Self::BeforeProduction,
            Core::BeforeShipment => Self::BeforeShipment,
            Core::AfterShipment => Self::AfterShipment,
        }
    }
}

impl From<CalculationBase> for tradewind_core::schedule::CalculationBase {
    fn from(value: CalculationBase) -> Self {
        match value {
            CalculationBase::OrderDate => Self::OrderDate,
            CalculationBase::PoDate => Self::PoDate,
            CalculationBase::InvoiceDate => Self::InvoiceDate,
            CalculationBase::BeforeProduction => Self::BeforeProduction,
            CalculationBase::BeforeShipment => Self::BeforeShipment,
            CalculationBase::AfterShipment => Self::AfterShipment,
        }
    }
}

impl From<tradewind_core::reference::ReferenceKind> for ReferenceKind {
    fn from(value: tradewind_core::reference::ReferenceKind) -> Self {
        use tradewind_core::reference::ReferenceKind as Core;
        match value {
            Core::Inquiry => Self::Inquiry,
            Core::Quotation => Self::Quotation,
            Core::ProformaInvoice => Self::ProformaInvoice,
            Core::PurchaseOrder => Self::PurchaseOrder,
            Core::Shipment => Self::Shipment,
            Core::Payment => Self::Payment,
        }
    }
}

impl From<ReferenceKind> for tradewind_core::reference::ReferenceKind {
    fn from(value: ReferenceKind) -> Self {
        match value {
            ReferenceKind::Inquiry => Self::Inquiry,
            ReferenceKind::Quotation => Self::Quotation,
            ReferenceKind::ProformaInvoice => Self::ProformaInvoice,
            ReferenceKind::PurchaseOrder => Self::PurchaseOrder,
            ReferenceKind::Shipment => Self::Shipment,
            ReferenceKind::Payment => Self::Payment,
        }
    }
}
