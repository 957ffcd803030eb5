//! Gated pipeline actions and their admission rules.
//!
//! Both rule tables are total over [`PipelineAction`], so adding an action
//! without deciding its limits is a compile error.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// An operation the rate limiter and quota enforcer gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineAction {
    Publish,
    Unpublish,
    Rollback,
}

impl PipelineAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineAction::Publish => "publish",
            PipelineAction::Unpublish => "unpublish",
            PipelineAction::Rollback => "rollback",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "publish" => Some(PipelineAction::Publish),
            "unpublish" => Some(PipelineAction::Unpublish),
            "rollback" => Some(PipelineAction::Rollback),
            _ => None,
        }
    }
}

impl fmt::Display for PipelineAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user sliding-window rule for one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub limit: u32,
    pub window: Duration,
}

/// Sliding-window rate limit applied per (workspace, user, action).
pub fn rate_limit_rule(action: PipelineAction) -> RateLimitRule {
    let minute = Duration::from_secs(60);
    match action {
        PipelineAction::Publish => RateLimitRule {
            limit: 10,
            window: minute,
        },
        PipelineAction::Unpublish => RateLimitRule {
            limit: 10,
            window: minute,
        },
        PipelineAction::Rollback => RateLimitRule {
            limit: 6,
            window: minute,
        },
    }
}

/// Workspace-wide daily ceiling for an action. `None` is a deliberate
/// exemption, not a missing entry.
pub fn daily_quota(action: PipelineAction) -> Option<u32> {
    match action {
        PipelineAction::Publish => Some(500),
        PipelineAction::Rollback => Some(100),
        // Unpublishing only removes content; it carries no fan-out cost.
        PipelineAction::Unpublish => None,
    }
}
