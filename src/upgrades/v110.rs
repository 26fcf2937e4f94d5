//! 1.1.0: corrected currency symbols and the Kuwaiti Dinar

use async_trait::async_trait;

use super::{UpgradeContext, UpgradeError, UpgradeStep, store_error};
use crate::entities::{CurrencyPatch, NewCurrency};

const VERSION: &str = "1.1.0";

/// `(currency id, symbol)`
pub const SYMBOL_UPDATES: &[(u64, &str)] = &[
    (13, "S$"),
    (16, "₫"),
    (17, "Fr."),
    (21, "฿"),
    (22, "₦"),
    (26, "HK$"),
    (35, "NAƒ"),
    (38, "GH₵"),
    (39, "Лв."),
    (42, "RON"),
    (44, "SِAR"),
    (46, "Rf"),
    (47, "₡"),
    (54, "‎د.ت"),
    (55, "₽"),
    (57, "ر.ع."),
    (58, "₴"),
];

pub struct Version110;

fn kuwaiti_dinar() -> NewCurrency {
    NewCurrency {
        name: "Kuwaiti Dinar".to_string(),
        code: "KWD".to_string(),
        symbol: "KWD ".to_string(),
        precision: 3,
        thousand_separator: ",".to_string(),
        decimal_separator: ".".to_string(),
    }
}

#[async_trait]
impl UpgradeStep for Version110 {
    fn version(&self) -> &'static str {
        VERSION
    }

    async fn apply(&self, ctx: &UpgradeContext) -> Result<(), UpgradeError> {
        for (id, symbol) in SYMBOL_UPDATES {
            ctx.currencies
                .update_or_create(*id, CurrencyPatch::symbol(*symbol))
                .await
                .map_err(|e| store_error(VERSION, e))?;
        }

        let existing = ctx
            .currencies
            .find_by_code("KWD")
            .await
            .map_err(|e| store_error(VERSION, e))?;
        if existing.is_none() {
            ctx.currencies
                .create(kuwaiti_dinar())
                .await
                .map_err(|e| store_error(VERSION, e))?;
        }

        Ok(())
    }
}
