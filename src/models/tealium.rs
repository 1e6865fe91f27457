// Tealium iQ profile patch payloads
//
// The iQ save endpoint takes a JSON-Patch-style operation list; only the
// load-rule replace operation is used here.

use serde::Serialize;
use serde_json::Value;

/// Body of a `PATCH .../profiles/{profile}?tps=4` save request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub save_type: String,
    pub notes: String,
    pub operation_list: Vec<PatchOperation>,
}

/// One entry of the patch operation list
#[derive(Debug, Serialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    pub value: LoadRuleDefinition,
}

/// Replacement definition for a load rule
///
/// `conditions` is an opaque, caller-validated condition tree passed through
/// verbatim.
#[derive(Debug, Serialize)]
pub struct LoadRuleDefinition {
    pub object: String,
    pub name: String,
    pub status: String,
    pub conditions: Value,
}

impl ProfilePatch {
    /// Build the save request replacing one load rule wholesale
    pub fn replace_load_rule(
        notes: &str,
        load_rule_id: &str,
        name: &str,
        status: &str,
        conditions: Value,
    ) -> Self {
        Self {
            save_type: "save".to_string(),
            notes: notes.to_string(),
            operation_list: vec![PatchOperation {
                op: "replace".to_string(),
                path: format!("/loadRules/{}", load_rule_id),
                value: LoadRuleDefinition {
                    object: "loadRule".to_string(),
                    name: name.to_string(),
                    status: status.to_string(),
                    conditions,
                },
            }],
        }
    }
}
