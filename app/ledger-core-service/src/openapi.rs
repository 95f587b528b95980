//! Aggregates every route module's `#[utoipa::path]` into one document,
//! served nowhere by the running process — only `bin/openapi_dump.rs`
//! renders it, for checking into a gateway or a docs site.

use crate::dto::{
    ApplyPaymentRequest, ApplySettlementRequest, DocumentLineRequest, DocumentResponse,
    EmptyRequest, JournalEntryResponse, SettlementResponse, VoidRequest,
};
use crate::routes::{advance, invoice, journal, period, purchase_bill, vendor_credit};

#[derive(utoipa::OpenApi)]
#[openapi(
    paths(
        journal::post_journal_entry_route,
        journal::reverse_journal_entry_route,
        invoice::create,
        invoice::update,
        invoice::approve,
        invoice::post_invoice,
        invoice::adjust,
        invoice::void,
        invoice::delete_invoice,
        invoice::apply_payment,
        invoice::apply_customer_advance,
        invoice::apply_credit_note,
        purchase_bill::create,
        purchase_bill::approve,
        purchase_bill::post_bill,
        purchase_bill::adjust,
        purchase_bill::void,
        purchase_bill::delete_bill,
        purchase_bill::apply_payment,
        purchase_bill::apply_vendor_credit,
        purchase_bill::apply_vendor_advance,
        vendor_credit::create,
        vendor_credit::post_credit,
        vendor_credit::void,
        advance::create_customer_advance,
        advance::create_vendor_advance,
        advance::post_advance,
        advance::void_advance,
        advance::delete_advance,
        period::close,
    ),
    components(schemas(
        DocumentResponse,
        JournalEntryResponse,
        SettlementResponse,
        DocumentLineRequest,
        VoidRequest,
        EmptyRequest,
        ApplySettlementRequest,
        ApplyPaymentRequest,
        journal::JournalLineRequest,
        journal::PostJournalEntryRequest,
        journal::ReverseJournalEntryRequest,
        invoice::CreateInvoiceRequest,
        invoice::UpdateInvoiceRequest,
        invoice::AdjustInvoiceRequest,
        purchase_bill::CreatePurchaseBillRequest,
        purchase_bill::AdjustPurchaseBillRequest,
        vendor_credit::CreateVendorCreditRequest,
        advance::CreateCustomerAdvanceRequest,
        advance::CreateVendorAdvanceRequest,
        period::ClosePeriodRequest,
    )),
    tags(
        (name = "journal", description = "direct journal entry posting and reversal"),
        (name = "invoice", description = "customer invoice lifecycle"),
        (name = "purchase-bill", description = "vendor bill lifecycle, including GRNI/PPV settlement"),
        (name = "vendor-credit", description = "vendor credit note lifecycle"),
        (name = "advance", description = "customer and vendor advance payments"),
        (name = "period", description = "accounting period close"),
    ),
    info(
        title = "ledger-core-service",
        description = "Transactional posting and idempotent command core for the accounting ledger",
        version = "1.0.0",
    )
)]
pub struct ApiDoc;
