//! Parcels (inventory) and the operation ledger.
//!
//! Quantity changes follow the same audited-mutation pattern as scores: the
//! live `Parcel` row and an [`OperationEntry`] are written in one
//! transaction. The derived stock status is recomputed from the new quantity
//! on every write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quantity at or below this is reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
  InStock,
  Low,
  OutOfStock,
}

impl StockStatus {
  pub fn for_quantity(quantity: i64) -> Self {
    if quantity == 0 {
      Self::OutOfStock
    } else if quantity <= LOW_STOCK_THRESHOLD {
      Self::Low
    } else {
      Self::InStock
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::InStock => "in_stock",
      Self::Low => "low",
      Self::OutOfStock => "out_of_stock",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "in_stock" => Some(Self::InStock),
      "low" => Some(Self::Low),
      "out_of_stock" => Some(Self::OutOfStock),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parcel {
  pub parcel_id: i64,
  /// Unique across the inventory.
  pub name:      String,
  pub quantity:  i64,
  /// Free-text category ("food", "clothing", ...).
  pub kind:      String,
  pub status:    StockStatus,
}

/// Input to parcel create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelInput {
  pub name:     String,
  pub quantity: i64,
  pub kind:     String,
}

// ─── Operation ledger ────────────────────────────────────────────────────────

/// Which mutation path produced a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKind {
  Added,
  Reduced,
  Edited,
  Created,
}

impl OperatorKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Added => "added",
      Self::Reduced => "reduced",
      Self::Edited => "edited",
      Self::Created => "created",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "added" => Some(Self::Added),
      "reduced" => Some(Self::Reduced),
      "edited" => Some(Self::Edited),
      "created" => Some(Self::Created),
      _ => None,
    }
  }
}

/// An immutable audit row recording one parcel mutation.
///
/// For reductions that clamp at zero, `change_amount` records the requested
/// delta, not the applied one; see the store's `reduce_stock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationEntry {
  pub operation_id:    i64,
  pub recorded_at:     DateTime<Utc>,
  pub parcel_id:       i64,
  pub old_quantity:    i64,
  pub new_quantity:    i64,
  pub change_amount:   i64,
  pub operator:        OperatorKind,
  pub actor_member_id: Option<i64>,
  /// Name/kind snapshots, present only on `Edited` entries.
  pub old_name:        Option<String>,
  pub new_name:        Option<String>,
  pub old_kind:        Option<String>,
  pub new_kind:        Option<String>,
}

/// A ledger entry joined with its parcel, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationView {
  #[serde(flatten)]
  pub entry:       OperationEntry,
  pub parcel_name: String,
}
