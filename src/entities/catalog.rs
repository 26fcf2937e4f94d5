//! Per-company catalog records seeded by upgrades
//!
//! Units are managed from the items screen and payment methods from the
//! payments screen, so both borrow the parent's view ability.

impl_company_resource!(Unit, "unit", guarded_by = "view-item", {
    name: String,
});

impl_company_resource!(PaymentMethod, "payment-method", guarded_by = "view-payment", {
    name: String,
});
