//! Video DTOs for the remote API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::job::Job;

/// Largest page size the list endpoint accepts
pub const MAX_LIST_LIMIT: u32 = 100;

/// Request to generate a new video
///
/// Sent as a multipart form. Empty `model` and `size` and an absent
/// `seconds` are omitted from the form rather than sent empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateVideo {
    pub prompt: String,
    pub model: String,
    pub seconds: Option<u32>,
    /// Output size as "WxH"
    pub size: String,
    /// Local image or video used as the first frame / reference
    pub input_reference: Option<PathBuf>,
}

impl CreateVideo {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_seconds(mut self, seconds: u32) -> Self {
        self.seconds = Some(seconds);
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    pub fn with_input_reference(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_reference = Some(path.into());
        self
    }
}

/// Request to remix an existing video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemixVideo {
    pub prompt: String,
}

/// Sort order for listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListOrder {
    Asc,
    #[default]
    Desc,
}

impl ListOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListOrder::Asc => "asc",
            ListOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for ListOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(ListOrder::Asc),
            "desc" => Ok(ListOrder::Desc),
            other => Err(format!("invalid sort order '{}', expected asc or desc", other)),
        }
    }
}

/// Pagination parameters for listing videos
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Page size; zero leaves it to the service
    pub limit: u32,
    /// Cursor from a previous page
    pub after: Option<String>,
    pub order: Option<ListOrder>,
}

impl ListQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn order(mut self, order: ListOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Query string pairs, omitting every unset parameter
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if self.limit > 0 {
            pairs.push(("limit", self.limit.to_string()));
        }
        if let Some(after) = self.after.as_deref().filter(|a| !a.is_empty()) {
            pairs.push(("after", after.to_string()));
        }
        if let Some(order) = self.order {
            pairs.push(("order", order.as_str().to_string()));
        }
        pairs
    }
}

/// One page of the video listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoPage {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub data: Vec<Job>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

impl VideoPage {
    /// Continuation cursor; the service has used both `next` and `next_cursor`
    pub fn cursor(&self) -> Option<&str> {
        self.next
            .as_deref()
            .filter(|c| !c.is_empty())
            .or_else(|| self.next_cursor.as_deref().filter(|c| !c.is_empty()))
    }

    pub fn has_next_page(&self) -> bool {
        self.has_more || self.cursor().is_some()
    }
}
