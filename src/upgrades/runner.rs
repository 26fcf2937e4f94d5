use std::sync::Arc;

use super::{
    StampVersion, UpdateFinished, UpgradeContext, UpgradeError, UpgradeStep, Version110,
    Version210, Version300,
};
use crate::core::version;

/// Ordered set of upgrade steps
#[derive(Clone)]
pub struct UpgradeRunner {
    steps: Vec<Arc<dyn UpgradeStep>>,
}

impl UpgradeRunner {
    /// Runner over arbitrary steps, sorted by version
    pub fn new(mut steps: Vec<Arc<dyn UpgradeStep>>) -> Self {
        steps.sort_by(|a, b| version::compare(a.version(), b.version()));
        Self { steps }
    }

    /// Every release upgrade shipped with the application
    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(Version110),
            Arc::new(StampVersion::new("2.0.0")),
            Arc::new(StampVersion::new("2.0.1")),
            Arc::new(Version210),
            Arc::new(Version300),
        ])
    }

    pub fn versions(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.version()).collect()
    }

    /// Run every pending step; stops at the first failure
    ///
    /// Returns the versions that were applied.
    pub async fn run(
        &self,
        ctx: &UpgradeContext,
        event: &UpdateFinished,
    ) -> Result<Vec<&'static str>, UpgradeError> {
        tracing::info!(old = %event.old, new = %event.new, "running upgrade steps");

        let mut applied = Vec::new();
        for step in &self.steps {
            if step.handle(ctx, event).await? {
                applied.push(step.version());
            }
        }
        Ok(applied)
    }
}

impl Default for UpgradeRunner {
    fn default() -> Self {
        Self::standard()
    }
}
