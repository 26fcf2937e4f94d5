use async_trait::async_trait;

use super::{UpgradeContext, UpgradeError, UpgradeStep};

/// Release with schema or file changes only; the step just records the version
pub struct StampVersion {
    version: &'static str,
}

impl StampVersion {
    pub const fn new(version: &'static str) -> Self {
        Self { version }
    }
}

#[async_trait]
impl UpgradeStep for StampVersion {
    fn version(&self) -> &'static str {
        self.version
    }

    async fn apply(&self, _ctx: &UpgradeContext) -> Result<(), UpgradeError> {
        Ok(())
    }
}
