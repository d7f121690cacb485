//! Visitation bookings against fixed daily time slots.
//!
//! Unlike activity schedules, a visitation reserves a whole predefined slot
//! on one date, so the conflict rule is equality on (visit_date,
//! time_slot_id) rather than interval intersection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A fixed daily visiting window (seeded lookup row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
  pub slot_id:    i64,
  pub name:       String,
  pub start_time: String,
  pub end_time:   String,
}

/// A visiting relative, deduplicated by citizen id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitor {
  pub visitor_id: i64,
  pub citizen_id: String,
  pub first_name: String,
  pub last_name:  String,
}

/// One booked visit.
///
/// Invariant: (visit_date, time_slot_id) is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitation {
  pub visitation_id: i64,
  pub visit_date:    NaiveDate,
  pub time_slot_id:  i64,
  pub prisoner_id:   i64,
  pub visitor_id:    i64,
  pub staff_id:      i64,
  pub relationship:  String,
  pub status:        String,
}

/// Input to visitation book/update. The visitor is found or created by
/// citizen id inside the booking transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitationInput {
  pub visit_date:         NaiveDate,
  pub time_slot_id:       i64,
  pub prisoner_id:        i64,
  pub staff_id:           i64,
  pub relationship:       String,
  pub status:             String,
  pub visitor_first_name: String,
  pub visitor_last_name:  String,
  pub visitor_citizen_id: String,
}

/// A visitation preloaded with its slot, visitor, and prisoner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitationView {
  #[serde(flatten)]
  pub visitation:    Visitation,
  pub slot:          TimeSlot,
  pub visitor:       Visitor,
  pub inmate_code:   String,
  pub prisoner_name: String,
}
