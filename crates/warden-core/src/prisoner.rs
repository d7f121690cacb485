//! Prisoner records and the inmate-code sequence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result, room::Room};

// ─── Gender ──────────────────────────────────────────────────────────────────

/// Prisoner gender. Determines which rooms a prisoner may be assigned to;
/// see [`crate::room::room_admits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
}

impl Gender {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Male => "male",
      Self::Female => "female",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "male" => Some(Self::Male),
      "female" => Some(Self::Female),
      _ => None,
    }
  }

  /// Leading letter of room names this gender may occupy.
  pub fn room_prefix(self) -> char {
    match self {
      Self::Male => 'M',
      Self::Female => 'F',
    }
  }
}

impl std::fmt::Display for Gender {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Prisoner ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prisoner {
  pub prisoner_id:  i64,
  /// Facility-assigned code, `P-NNNN`, unique.
  pub inmate_code:  String,
  pub citizen_id:   String,
  pub first_name:   String,
  pub last_name:    String,
  pub gender:       Gender,
  pub birthday:     NaiveDate,
  pub case_code:    String,
  pub entry_date:   NaiveDate,
  /// `None` while the prisoner is still held; released prisoners no longer
  /// count toward room occupancy.
  pub release_date: Option<NaiveDate>,
  pub room_id:      Option<i64>,
}

/// Input to prisoner create/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrisonerInput {
  /// Empty on intake means "assign the next code in sequence"; ignored on
  /// update, where the stored code is immutable.
  #[serde(default)]
  pub inmate_code:  String,
  pub citizen_id:   String,
  pub first_name:   String,
  pub last_name:    String,
  pub gender:       Gender,
  pub birthday:     NaiveDate,
  pub case_code:    String,
  pub entry_date:   NaiveDate,
  pub release_date: Option<NaiveDate>,
  pub room_id:      Option<i64>,
}

impl PrisonerInput {
  /// A release date before the entry date is a contradiction, and a
  /// client-supplied inmate code must fit the sequence format; reject both
  /// before any row is touched.
  pub fn validate(&self) -> Result<()> {
    if !self.inmate_code.is_empty() {
      validate_inmate_code(&self.inmate_code)?;
    }
    if let Some(release) = self.release_date
      && release < self.entry_date
    {
      return Err(Error::InvalidDateRange {
        start: self.entry_date,
        end:   release,
      });
    }
    Ok(())
  }
}

/// A prisoner preloaded with the room they occupy, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrisonerView {
  #[serde(flatten)]
  pub prisoner: Prisoner,
  pub room:     Option<Room>,
}

// ─── Inmate code sequence ────────────────────────────────────────────────────

/// Accept exactly the form [`next_inmate_code`] produces: `P-` followed by
/// a number zero-padded to at least four digits. A stored code outside this
/// form would break the sequence lookup, so it never gets stored.
pub fn validate_inmate_code(code: &str) -> Result<()> {
  let digits = code.strip_prefix("P-").unwrap_or("");
  let well_formed = digits.len() >= 4
    && digits.bytes().all(|b| b.is_ascii_digit())
    && digits.parse::<u32>().is_ok();
  if !well_formed {
    return Err(Error::InvalidInmateCode(code.to_owned()));
  }
  Ok(())
}

/// Derive the next `P-NNNN` code from the current maximum, starting at
/// `P-0001` for an empty facility.
pub fn next_inmate_code(latest: Option<&str>) -> Result<String> {
  let Some(latest) = latest else {
    return Ok("P-0001".to_owned());
  };
  let number = latest
    .strip_prefix("P-")
    .and_then(|n| n.parse::<u32>().ok())
    .ok_or_else(|| Error::InvalidInmateCode(latest.to_owned()))?;
  Ok(format!("P-{:04}", number + 1))
}
