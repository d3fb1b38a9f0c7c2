//! Result document in the shape Ansible reads from a binary module.

use crate::processing::{Aborted, BastionSummary, Outcome};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ModuleResult {
    pub changed: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<BastionSummary>,
}

impl ModuleResult {
    pub fn failure(changed: bool, msg: impl Into<String>) -> ModuleResult {
        ModuleResult {
            changed,
            failed: true,
            msg: Some(msg.into()),
            state: None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"changed": {}, "failed": true, "msg": "Error serializing result: {}"}}"#,
                self.changed,
                e.to_string().replace('"', "'")
            )
        })
    }
}

impl From<Outcome> for ModuleResult {
    fn from(outcome: Outcome) -> Self {
        ModuleResult {
            changed: outcome.changed,
            state: outcome.state,
            ..Default::default()
        }
    }
}

impl From<Aborted> for ModuleResult {
    fn from(aborted: Aborted) -> Self {
        ModuleResult::failure(aborted.changed, aborted.error.to_string())
    }
}
