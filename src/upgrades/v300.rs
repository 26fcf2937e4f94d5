//! 3.0.0: default units, payment methods and the Serbian Dinar

use async_trait::async_trait;

use super::{UpgradeContext, UpgradeError, UpgradeStep, store_error};
use crate::entities::NewCurrency;

const VERSION: &str = "3.0.0";

pub const UNITS: &[&str] = &[
    "box", "cm", "dz", "ft", "g", "in", "kg", "km", "lb", "mg", "pc",
];

pub const PAYMENT_METHODS: &[&str] = &["Cash", "Check", "Credit Card", "Bank Transfer"];

pub struct Version300;

fn serbian_dinar() -> NewCurrency {
    NewCurrency {
        name: "Serbian Dinar".to_string(),
        code: "RSD".to_string(),
        symbol: "RSD".to_string(),
        precision: 2,
        thousand_separator: ".".to_string(),
        decimal_separator: ",".to_string(),
    }
}

#[async_trait]
impl UpgradeStep for Version300 {
    fn version(&self) -> &'static str {
        VERSION
    }

    async fn apply(&self, ctx: &UpgradeContext) -> Result<(), UpgradeError> {
        let company_id = ctx.admin_company(VERSION).await?;

        for unit in UNITS {
            ctx.catalog
                .first_or_create_unit(company_id, unit)
                .await
                .map_err(|e| store_error(VERSION, e))?;
        }

        for method in PAYMENT_METHODS {
            ctx.catalog
                .first_or_create_payment_method(company_id, method)
                .await
                .map_err(|e| store_error(VERSION, e))?;
        }

        let existing = ctx
            .currencies
            .find_by_code("RSD")
            .await
            .map_err(|e| store_error(VERSION, e))?;
        if existing.is_none() {
            ctx.currencies
                .create(serbian_dinar())
                .await
                .map_err(|e| store_error(VERSION, e))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CatalogStore, CurrencyStore, Scope, SettingsStore};
    use crate::entities::{Role, User};
    use crate::storage::InMemoryDirectory;
    use crate::upgrades::UpdateFinished;
    use crate::upgrades::test_support::{fixture, fixture_with};

    #[tokio::test]
    async fn test_seeds_catalog_and_currency() {
        let f = fixture();

        let applied = Version300
            .handle(&f.ctx, &UpdateFinished::new("2.1.0", "3.0.0"))
            .await
            .unwrap();
        assert!(applied);

        let units: Vec<String> = f
            .catalog
            .units(1)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(units, UNITS.iter().map(|u| u.to_string()).collect::<Vec<_>>());

        let methods = f.catalog.payment_methods(1).await.unwrap();
        assert_eq!(methods.len(), 4);
        assert_eq!(methods[2].name, "Credit Card");

        let rsd = f.currencies.find_by_code("RSD").await.unwrap().unwrap();
        assert_eq!(rsd.thousand_separator, ".");
        assert_eq!(rsd.decimal_separator, ",");
        assert_eq!(rsd.precision, 2);
    }

    #[tokio::test]
    async fn test_repeat_is_idempotent() {
        let f = fixture();

        Version300.apply(&f.ctx).await.unwrap();
        Version300.apply(&f.ctx).await.unwrap();

        assert_eq!(f.catalog.units(1).await.unwrap().len(), UNITS.len());
        assert_eq!(f.catalog.payment_methods(1).await.unwrap().len(), 4);
        assert_eq!(f.currencies.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_admin_without_company_is_an_error() {
        let directory = InMemoryDirectory::new();
        directory
            .insert_user(User::new(9, "Ada", "ada@example.com", Role::Admin), None)
            .unwrap();
        let f = fixture_with(directory);

        let err = Version300
            .handle(&f.ctx, &UpdateFinished::new("2.1.0", "3.0.0"))
            .await
            .unwrap_err();

        assert!(matches!(err, UpgradeError::AdminWithoutCompany { user_id: 9, .. }));
        assert_eq!(f.settings.get_setting("version", Scope::Global).await.unwrap(), None);
    }
}
