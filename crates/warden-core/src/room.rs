//! Rooms and the derived occupancy status.
//!
//! `Room.status` is not free-form state: it must always equal
//! [`RoomStatus::for_occupancy`] applied to the count of non-released
//! prisoners assigned to the room. The store recomputes it inside every
//! transaction that moves a prisoner in or out.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, prisoner::Gender};

/// A room is full once this many non-released prisoners occupy it.
pub const ROOM_CAPACITY: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
  Vacant,
  Full,
}

impl RoomStatus {
  pub fn for_occupancy(count: i64) -> Self {
    if count >= ROOM_CAPACITY { Self::Full } else { Self::Vacant }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Vacant => "vacant",
      Self::Full => "full",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "vacant" => Some(Self::Vacant),
      "full" => Some(Self::Full),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
  pub room_id: i64,
  /// Room names carry a leading letter encoding the permitted gender
  /// (`M` or `F`).
  pub name:    String,
  pub status:  RoomStatus,
}

/// The gender prefix rule: male prisoners only in `M…` rooms, female
/// prisoners only in `F…` rooms.
pub fn room_admits(room_name: &str, gender: Gender) -> bool {
  room_name.starts_with(gender.room_prefix())
}

/// Fail with a validation error when a prisoner's gender is incompatible
/// with the room they are being assigned to.
pub fn check_room_gender(room_name: &str, gender: Gender) -> Result<()> {
  if room_admits(room_name, gender) {
    Ok(())
  } else {
    Err(Error::GenderRoomMismatch {
      gender,
      room_name: room_name.to_owned(),
    })
  }
}
