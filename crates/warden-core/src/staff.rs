//! Staff members referenced by schedules and visitations.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
  pub staff_id:   i64,
  pub first_name: String,
  pub last_name:  String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffInput {
  pub first_name: String,
  pub last_name:  String,
}
