//! Caller identity, as produced by the external authentication layer.
//!
//! The HTTP front attaches at most one [`Identity`] per request; operations
//! that record an actor or filter rows by ownership take it as an argument.
//! Nothing in this workspace parses or verifies credentials.

use serde::{Deserialize, Serialize};

/// Permission tier of a member account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
  Admin,
  Staff,
  /// A prisoner's relative; sees and edits only their own visitations.
  Relative,
}

impl Rank {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Staff => "staff",
      Self::Relative => "relative",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "admin" => Some(Self::Admin),
      "staff" => Some(Self::Staff),
      "relative" => Some(Self::Relative),
      _ => None,
    }
  }
}

/// The typed claims attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub member_id:  i64,
  pub rank:       Rank,
  pub citizen_id: String,
}
