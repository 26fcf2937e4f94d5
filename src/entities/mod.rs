//! Typed records of the billing domain
//!
//! Plain structs with named fields. Persistence is the stores' business;
//! nothing here talks to a database.

#[macro_use]
pub mod macros;
pub mod catalog;
pub mod company;
pub mod currency;
pub mod documents;
pub mod file_disk;
pub mod user;

pub use catalog::{PaymentMethod, Unit};
pub use company::Company;
pub use currency::{Currency, CurrencyPatch, NewCurrency};
pub use documents::{
    Customer, CustomField, Estimate, ExchangeRateProvider, Expense, ExpenseCategory, Invoice,
    Item, Payment, RecurringInvoice, TaxType,
};
pub use file_disk::{DiskType, FileDisk, NewFileDisk};
pub use user::{Role, User};

/// Tenant identifier
pub type CompanyId = u64;

/// User identifier
pub type UserId = u64;

/// A record that belongs to exactly one company
///
/// `ability_noun` is the suffix of the abilities guarding the record,
/// e.g. `"invoice"` for `view-invoice`, `edit-invoice`, ...
pub trait CompanyResource {
    fn ability_noun() -> &'static str;

    /// Ability checked for `verb` (`view`, `create`, `edit`, `delete`, `send`)
    fn ability(verb: &str) -> String {
        format!("{}-{}", verb, Self::ability_noun())
    }

    fn company_id(&self) -> CompanyId;

    /// Whether the record's own state still permits updates
    fn allows_edit(&self) -> bool {
        true
    }
}
