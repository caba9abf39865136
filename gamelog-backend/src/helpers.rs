use chrono::{DateTime, SecondsFormat, Utc};
use gamelog_db::{GamePatch, NewGame};

use crate::validation::{GameDraft, GamePatchDraft};

/// Clamp to [0, 5] and round half away from zero to one decimal.
/// NaN is passed through untouched so the store can reject it.
pub fn normalize_rating(value: f64) -> f64 {
  if value.is_nan() {
    return value;
  }
  (value.clamp(0.0, 5.0) * 10.0).round() / 10.0
}

/// Clamp to >= 0 and drop any fractional part.
pub fn normalize_hours(value: f64) -> i64 {
  value.max(0.0).trunc() as i64
}

pub fn normalize_game(draft: GameDraft) -> NewGame {
  NewGame {
    name: draft.name,
    genre: draft.genre,
    cover: draft.cover,
    rating: normalize_rating(draft.rating),
    status: draft.status,
    hours_played: normalize_hours(draft.hours_played),
  }
}

pub fn normalize_game_patch(draft: GamePatchDraft) -> GamePatch {
  GamePatch {
    name: draft.name,
    genre: draft.genre,
    cover: draft.cover,
    rating: draft.rating.map(normalize_rating),
    status: draft.status,
    hours_played: draft.hours_played.map(normalize_hours),
  }
}

/// Unix milliseconds as an RFC 3339 UTC string, e.g. `2024-01-01T00:00:00.000Z`.
pub fn format_timestamp(millis: i64) -> String {
  DateTime::<Utc>::from_timestamp_millis(millis)
    .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_normalize_rating_rounds_to_one_decimal() {
    assert_eq!(normalize_rating(3.678), 3.7);
    assert_eq!(normalize_rating(4.5), 4.5);
    assert_eq!(normalize_rating(2.25), 2.3);
    assert_eq!(normalize_rating(1.04), 1.0);
    assert_eq!(normalize_rating(0.05), 0.1);
  }

  #[test]
  fn test_normalize_rating_clamps() {
    assert_eq!(normalize_rating(7.2), 5.0);
    assert_eq!(normalize_rating(-1.0), 0.0);
    assert!(normalize_rating(f64::NAN).is_nan());
  }

  #[test]
  fn test_normalize_hours_truncates() {
    assert_eq!(normalize_hours(45.0), 45);
    assert_eq!(normalize_hours(12.9), 12);
    assert_eq!(normalize_hours(-3.5), 0);
    assert_eq!(normalize_hours(0.0), 0);
  }

  #[test]
  fn test_normalize_patch_only_touches_present_fields() {
    let patch = normalize_game_patch(GamePatchDraft {
      rating: Some(3.678),
      status: Some("Completado".to_string()),
      ..Default::default()
    });
    assert_eq!(patch.rating, Some(3.7));
    assert_eq!(patch.status.as_deref(), Some("Completado"));
    assert_eq!(patch.hours_played, None);
    assert_eq!(patch.name, None);
  }

  #[test]
  fn test_format_timestamp() {
    assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000Z");
    assert_eq!(format_timestamp(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
  }
}
