use serde::{Deserialize, Serialize};

/// Account plan attached to an authenticated identity. Controls how many
/// projects the account may own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountPlan {
    #[default]
    Free,
    Pro,
}

impl AccountPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountPlan::Free => "free",
            AccountPlan::Pro => "pro",
        }
    }

    /// Maximum number of owned projects for the plan.
    pub fn max_projects(&self) -> usize {
        match self {
            AccountPlan::Free => 3,
            AccountPlan::Pro => 10,
        }
    }
}

impl std::fmt::Display for AccountPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
