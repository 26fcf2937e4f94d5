//! Macros for reducing boilerplate when defining company-scoped records
//!
//! Most billing records only matter to the authorization layer through
//! two facts: which company owns them and which ability guards them.
//! `impl_company_resource!` generates the struct, its constructor and the
//! [`CompanyResource`](crate::entities::CompanyResource) impl.

/// Define a company-scoped record
///
/// Abilities default to `<verb>-<noun>`. Records managed through a parent
/// screen pass `guarded_by = "<ability>"` and every action on them checks
/// that one ability instead.
///
/// # Example
/// ```rust,ignore
/// impl_company_resource!(Customer, "customer", {
///     name: String,
///     email: Option<String>,
/// });
///
/// impl_company_resource!(Unit, "unit", guarded_by = "view-item", {
///     name: String,
/// });
///
/// let customer = Customer::new(1, 42, "Acme".into(), None);
/// assert_eq!(Customer::ability("edit"), "edit-customer");
/// assert_eq!(Unit::ability("delete"), "view-item");
/// assert_eq!(customer.company_id(), 42);
/// ```
#[macro_export]
macro_rules! impl_company_resource {
    (
        @define $type:ident,
        {
            $( $field:ident : $ftype:ty ),* $(,)?
        }
    ) => {
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $type {
            /// Record identifier
            pub id: u64,

            /// Company the record belongs to
            pub company_id: $crate::entities::CompanyId,

            $( pub $field: $ftype, )*
        }

        impl $type {
            #[allow(clippy::too_many_arguments)]
            pub fn new(id: u64, company_id: $crate::entities::CompanyId $(, $field: $ftype )*) -> Self {
                Self {
                    id,
                    company_id,
                    $( $field, )*
                }
            }
        }
    };

    (
        $type:ident,
        $noun:expr,
        guarded_by = $ability:expr,
        {
            $( $field:ident : $ftype:ty ),* $(,)?
        }
    ) => {
        $crate::impl_company_resource!(@define $type, { $( $field : $ftype ),* });

        impl $crate::entities::CompanyResource for $type {
            fn ability_noun() -> &'static str {
                $noun
            }

            fn ability(_verb: &str) -> String {
                $ability.to_string()
            }

            fn company_id(&self) -> $crate::entities::CompanyId {
                self.company_id
            }
        }
    };

    (
        $type:ident,
        $noun:expr,
        {
            $( $field:ident : $ftype:ty ),* $(,)?
        }
    ) => {
        $crate::impl_company_resource!(@define $type, { $( $field : $ftype ),* });

        impl $crate::entities::CompanyResource for $type {
            fn ability_noun() -> &'static str {
                $noun
            }

            fn company_id(&self) -> $crate::entities::CompanyId {
                self.company_id
            }
        }
    };
}
