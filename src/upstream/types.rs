//! Records exchanged with the upstream conversation API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named, typed value attached to a conversation by the upstream service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationVariable {
    /// Variable identifier.
    pub id: String,
    /// Variable name.
    #[serde(default)]
    pub name: String,
    /// Upstream type label (e.g. "string", "number").
    #[serde(default)]
    pub value_type: String,
    /// Current value, as sent by the upstream.
    #[serde(default)]
    pub value: Value,
    /// Optional human description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Creation timestamp (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Last update timestamp (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// One page of conversation variables.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VariablesPage {
    /// Page size echoed by the upstream.
    #[serde(default)]
    pub limit: Option<u32>,
    /// Whether more variables follow `data`.
    #[serde(default)]
    pub has_more: bool,
    /// Variables in this page.
    #[serde(default)]
    pub data: Vec<ConversationVariable>,
}

/// Query forwarded to the upstream variables endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariablesQuery {
    /// End-user identifier, required by the upstream.
    pub user: String,
    /// Page size.
    pub limit: Option<u32>,
    /// Cursor: id of the last variable of the previous page.
    pub last_id: Option<String>,
}

impl VariablesQuery {
    /// Create a query for `user` with no paging options.
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            limit: None,
            last_id: None,
        }
    }

    /// Set the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the paging cursor. Empty cursors are dropped.
    #[must_use]
    pub fn with_last_id(mut self, last_id: impl Into<String>) -> Self {
        let last_id = last_id.into();
        self.last_id = (!last_id.is_empty()).then_some(last_id);
        self
    }
}
