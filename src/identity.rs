/// Supplies the acting judge for audit display.
///
/// Never consulted for authorization.
pub trait IdentityProvider: Send + Sync {
    fn acting_judge(&self) -> Option<String>;
}

/// Identity fixed at startup, e.g. the judge logged into a console
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    judge_id: Option<String>,
}

impl StaticIdentityProvider {
    pub fn new(judge_id: Option<String>) -> Self {
        Self { judge_id }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn acting_judge(&self) -> Option<String> {
        self.judge_id.clone()
    }
}
