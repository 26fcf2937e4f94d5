//! 2.1.0: document numbering settings for the admin's company

use async_trait::async_trait;
use indexmap::IndexMap;

use super::{UpgradeContext, UpgradeError, UpgradeStep, store_error};
use crate::core::Scope;

const VERSION: &str = "2.1.0";

pub const NUMBERING_SETTINGS: &[(&str, &str)] = &[
    ("invoice_auto_generate", "YES"),
    ("invoice_prefix", "INV"),
    ("estimate_prefix", "EST"),
    ("estimate_auto_generate", "YES"),
    ("payment_prefix", "PAY"),
    ("payment_auto_generate", "YES"),
];

pub struct Version210;

#[async_trait]
impl UpgradeStep for Version210 {
    fn version(&self) -> &'static str {
        VERSION
    }

    async fn apply(&self, ctx: &UpgradeContext) -> Result<(), UpgradeError> {
        let company_id = ctx.admin_company(VERSION).await?;

        let settings: IndexMap<String, String> = NUMBERING_SETTINGS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        ctx.settings
            .set_settings(&settings, Scope::Company(company_id))
            .await
            .map_err(|e| store_error(VERSION, e))
    }
}
