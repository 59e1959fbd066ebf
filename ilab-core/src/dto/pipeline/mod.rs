//! Pipeline DTOs

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::Pipeline;

/// One page of `GET /apis/v2beta1/pipelines`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPipelinesResponse {
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
    /// Empty or absent on the last page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<i64>,
}

impl ListPipelinesResponse {
    pub fn next_page(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Server-side filter expression
///
/// Sent JSON-encoded in the `filter` query parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predicate {
    pub key: String,
    pub operation: String,
    pub string_value: String,
}

impl Filter {
    /// Exact match on `display_name`
    pub fn display_name_equals(name: &str) -> Self {
        Self {
            predicates: vec![Predicate {
                key: "display_name".to_string(),
                operation: "EQUALS".to_string(),
                string_value: name.to_string(),
            }],
        }
    }
}
