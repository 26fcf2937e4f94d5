//! Company-scoped billing documents guarded by ability policies

use serde::{Deserialize, Serialize};

use super::{CompanyId, CompanyResource};

/// Invoice status as stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Viewed,
    Overdue,
    Completed,
}

/// An invoice; the only document whose update also depends on its own state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: u64,
    pub company_id: CompanyId,
    pub invoice_number: String,
    pub status: InvoiceStatus,

    /// False once the invoice has been (partially) paid
    pub allow_edit: bool,
}

impl Invoice {
    pub fn new(id: u64, company_id: CompanyId, invoice_number: impl Into<String>) -> Self {
        Self {
            id,
            company_id,
            invoice_number: invoice_number.into(),
            status: InvoiceStatus::Draft,
            allow_edit: true,
        }
    }

    pub fn locked(mut self) -> Self {
        self.allow_edit = false;
        self
    }
}

impl CompanyResource for Invoice {
    fn ability_noun() -> &'static str {
        "invoice"
    }

    fn company_id(&self) -> CompanyId {
        self.company_id
    }

    fn allows_edit(&self) -> bool {
        self.allow_edit
    }
}

impl_company_resource!(Estimate, "estimate", {
    estimate_number: String,
});

impl_company_resource!(Payment, "payment", {
    payment_number: String,
    amount: i64,
});

impl_company_resource!(Customer, "customer", {
    name: String,
});

impl_company_resource!(Item, "item", {
    name: String,
    price: i64,
});

impl_company_resource!(Expense, "expense", {
    amount: i64,
});

impl_company_resource!(ExpenseCategory, "expense-category", guarded_by = "view-expense", {
    name: String,
});

impl_company_resource!(TaxType, "tax-type", {
    name: String,
    percent: f64,
});

impl_company_resource!(CustomField, "custom-field", {
    label: String,
});

impl_company_resource!(RecurringInvoice, "recurring-invoice", {
    frequency: String,
});

impl_company_resource!(ExchangeRateProvider, "exchange-rate-provider", {
    driver: String,
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_resources_expose_company() {
        let estimate = Estimate::new(1, 7, "EST-000001".to_string());
        assert_eq!(estimate.company_id(), 7);
        assert_eq!(Estimate::ability_noun(), "estimate");
        assert_eq!(
            ExchangeRateProvider::ability("create"),
            "create-exchange-rate-provider"
        );
        assert_eq!(ExpenseCategory::ability("edit"), "view-expense");
        assert!(estimate.allows_edit());
    }

    #[test]
    fn test_invoice_lock() {
        let invoice = Invoice::new(1, 7, "INV-000001");
        assert!(invoice.allow_edit);
        assert!(invoice.allows_edit());
        assert!(!invoice.locked().allows_edit());
    }
}
