// Operation façade: the four Tealium iQ operations as request descriptors

use serde_json::Value;

use crate::client::{RequestDescriptor, TealiumClient};
use crate::error::Result;
use crate::models::tealium::ProfilePatch;

/// Parameters of a load-rule update. All fields are required; the route
/// layer rejects incomplete requests before they reach this façade.
#[derive(Debug, Clone)]
pub struct UpdateLoadRule {
    pub notes: String,
    pub load_rule_id: String,
    pub name: String,
    pub state: String,
    pub conditions: Value,
}

impl TealiumClient {
    /// List the version identifiers of a profile
    pub async fn list_versions(&self, profile: &str) -> Result<Value> {
        let descriptor = RequestDescriptor::get(self.profile_path(profile))
            .with_query("includes", "versionIds");
        self.execute(profile, descriptor).await
    }

    /// Get the metadata of one profile version
    pub async fn get_version(&self, profile: &str, version_id: &str) -> Result<Value> {
        let path = format!("{}/versions/{}", self.profile_path(profile), version_id);
        self.execute(profile, RequestDescriptor::get(path)).await
    }

    /// List the load rules of a profile, including condition trees and the
    /// tags that reference each rule
    pub async fn list_load_rules(&self, profile: &str) -> Result<Value> {
        let descriptor = RequestDescriptor::get(self.profile_path(profile))
            .with_query("includes", "loadRules");
        self.execute(profile, descriptor).await
    }

    /// Replace one load rule's definition via the iQ save endpoint
    pub async fn update_load_rule(&self, profile: &str, update: UpdateLoadRule) -> Result<Value> {
        let patch = ProfilePatch::replace_load_rule(
            &update.notes,
            &update.load_rule_id,
            &update.name,
            &update.state,
            update.conditions,
        );
        let body = serde_json::to_value(patch)
            .map_err(|e| anyhow::anyhow!("Failed to serialize patch body: {}", e))?;

        let descriptor =
            RequestDescriptor::patch(self.profile_path(profile), body).with_query("tps", "4");
        self.execute(profile, descriptor).await
    }
}
