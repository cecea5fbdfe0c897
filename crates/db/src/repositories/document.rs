//! Trade document repository.
//!
//! Creates payable documents with generated references and implements
//! purchase order generation from a confirmed proforma invoice, gated by
//! the stricter blocking predicate.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use tradewind_core::blocking::{
    blocking_items_for, blocks_purchase_order_generation, BlockingItemView,
};
use tradewind_core::document::{DocumentType, TradeStatus};
use tradewind_core::payment::PaymentDirection;
use tradewind_core::reference::ReferenceKind;
use tradewind_shared::types::Currency;

use crate::entities::sea_orm_active_enums::TradeStatus as DbTradeStatus;
use crate::entities::trade_documents;
use crate::repositories::sequence::{SequenceError, SequenceRepository};
use crate::repositories::transition::load_blocking_views;

/// Error types for document operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Document not found.
    #[error("Document not found: {0}")]
    NotFound(Uuid),

    /// Total must not be negative.
    #[error("Document total must not be negative, got {0}")]
    NegativeTotal(i64),

    /// Purchase orders can only be generated from proforma invoices.
    #[error("Purchase orders are generated from proforma invoices, not {0}")]
    NotAProformaInvoice(DocumentType),

    /// Purchase order generation gated by unresolved blocking items.
    #[error("Purchase order generation is blocked by {} unresolved schedule item(s)", items.len())]
    PurchaseOrderBlocked {
        /// The items gating generation, for the caller to surface.
        items: Vec<BlockingItemView>,
    },

    /// Reference generation failed.
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a trade document.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Concrete document type.
    pub document_type: DocumentType,
    /// Counterparty name.
    pub counterparty: String,
    /// Total amount in minor units. Never negative.
    pub total_amount: i64,
    /// Document currency.
    pub currency: Currency,
    /// Payment direction; defaults per document type when omitted.
    pub direction: Option<PaymentDirection>,
    /// Issue date, if already issued.
    pub issue_date: Option<NaiveDate>,
    /// Payment term template, if assigned.
    pub payment_term_id: Option<Uuid>,
}

/// Trade document repository.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
    sequences: SequenceRepository,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            sequences: SequenceRepository::new(db.clone()),
            db,
        }
    }

    /// Creates a draft document with a fresh reference.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative total.
    pub async fn create_document(
        &self,
        input: CreateDocumentInput,
    ) -> Result<trade_documents::Model, DocumentError> {
        if input.total_amount < 0 {
            return Err(DocumentError::NegativeTotal(input.total_amount));
        }

        let kind = reference_kind(input.document_type);
        let reference = self.sequences.next_reference(kind, None).await?;

        let now = Utc::now().into();
        let document = trade_documents::ActiveModel {
            id: Set(Uuid::now_v7()),
            document_type: Set(input.document_type.into()),
            reference: Set(reference),
            counterparty: Set(input.counterparty),
            total_amount: Set(input.total_amount),
            currency: Set(input.currency.as_str().to_string()),
            direction: Set(input
                .direction
                .unwrap_or_else(|| input.document_type.default_direction())
                .into()),
            status: Set(DbTradeStatus::Draft),
            issue_date: Set(input.issue_date),
            payment_term_id: Set(input.payment_term_id),
            paid_amount: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(reference = %document.reference, "created trade document");
        Ok(document)
    }

    /// Fetches one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist.
    pub async fn get(&self, document_id: Uuid) -> Result<trade_documents::Model, DocumentError> {
        trade_documents::Entity::find_by_id(document_id)
            .one(&self.db)
            .await?
            .ok_or(DocumentError::NotFound(document_id))
    }

    /// Lists documents, optionally filtered by type and status.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        document_type: Option<DocumentType>,
        status: Option<TradeStatus>,
    ) -> Result<Vec<trade_documents::Model>, DocumentError> {
        let mut query = trade_documents::Entity::find();
        if let Some(ty) = document_type {
            query = query.filter(
                trade_documents::Column::DocumentType
                    .eq(crate::entities::sea_orm_active_enums::DocumentType::from(ty)),
            );
        }
        if let Some(status) = status {
            query = query.filter(trade_documents::Column::Status.eq(DbTradeStatus::from(status)));
        }
        Ok(query
            .order_by_desc(trade_documents::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// The schedule items currently gating a transition to `target`,
    /// without attempting the transition. Preview for the UI; the
    /// transition path re-runs the same check under its lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist.
    pub async fn blocking_items(
        &self,
        document_id: Uuid,
        target: TradeStatus,
    ) -> Result<Vec<BlockingItemView>, DocumentError> {
        self.get(document_id).await?;
        let views = load_blocking_views(&self.db, document_id).await?;
        Ok(blocking_items_for(&views, target)
            .into_iter()
            .cloned()
            .collect())
    }

    /// The schedule items currently gating PO generation for a document.
    ///
    /// Stricter than the transition hook: shipment-gating items do not
    /// block PO creation.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not exist.
    pub async fn purchase_order_blockers(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<BlockingItemView>, DocumentError> {
        // Existence check keeps "no such document" distinct from "no blockers".
        self.get(document_id).await?;
        let views = load_blocking_views(&self.db, document_id).await?;
        Ok(blocks_purchase_order_generation(&views)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Generates a purchase order from a proforma invoice.
    ///
    /// Refuses while unresolved blocking items (production/order/PO
    /// bases) exist on the invoice. The new PO copies the counterparty,
    /// total, currency, and payment term, and starts in draft.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::PurchaseOrderBlocked`] listing the
    /// gating items.
    pub async fn generate_purchase_order(
        &self,
        proforma_invoice_id: Uuid,
    ) -> Result<trade_documents::Model, DocumentError> {
        let txn = self.db.begin().await?;

        let invoice = trade_documents::Entity::find_by_id(proforma_invoice_id)
            .one(&txn)
            .await?
            .ok_or(DocumentError::NotFound(proforma_invoice_id))?;

        let invoice_type = DocumentType::from(invoice.document_type.clone());
        if invoice_type != DocumentType::ProformaInvoice {
            return Err(DocumentError::NotAProformaInvoice(invoice_type));
        }

        let views = load_blocking_views(&txn, proforma_invoice_id).await?;
        let blockers = blocks_purchase_order_generation(&views);
        if !blockers.is_empty() {
            return Err(DocumentError::PurchaseOrderBlocked {
                items: blockers.into_iter().cloned().collect(),
            });
        }

        let reference = self
            .sequences
            .next_reference(ReferenceKind::PurchaseOrder, None)
            .await?;

        let now = Utc::now().into();
        let purchase_order = trade_documents::ActiveModel {
            id: Set(Uuid::now_v7()),
            document_type: Set(DocumentType::PurchaseOrder.into()),
            reference: Set(reference),
            counterparty: Set(invoice.counterparty.clone()),
            total_amount: Set(invoice.total_amount),
            currency: Set(invoice.currency.clone()),
            direction: Set(PaymentDirection::Outbound.into()),
            status: Set(DbTradeStatus::Draft),
            issue_date: Set(None),
            payment_term_id: Set(invoice.payment_term_id),
            paid_amount: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(
            invoice = %invoice.reference,
            purchase_order = %purchase_order.reference,
            "generated purchase order"
        );
        Ok(purchase_order)
    }
}

/// The reference sequence a document type draws from.
const fn reference_kind(document_type: DocumentType) -> ReferenceKind {
    match document_type {
        DocumentType::ProformaInvoice => ReferenceKind::ProformaInvoice,
        DocumentType::PurchaseOrder => ReferenceKind::PurchaseOrder,
        DocumentType::Shipment => ReferenceKind::Shipment,
    }
}
