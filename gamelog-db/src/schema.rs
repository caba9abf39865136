//! Document rules enforced on every write, regardless of the caller.
//!
//! The SQL `CHECK` constraints cover ranges and lengths; the cover URL
//! pattern can only be checked here.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::DbError;
use crate::models::{NewGame, NewReview};

static COVER_URL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?i)^(https?://)([A-Za-z0-9_-]+\.)+[A-Za-z0-9_-]+(?:/[A-Za-z0-9_\-.~:?#@!$&'()*+,;=%]*)*$",
  )
  .expect("invalid cover url regex")
});

pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 5.0;
pub const REVIEW_MIN_CHARS: usize = 10;
pub const REVIEW_MAX_CHARS: usize = 2000;
/// Largest integer a JSON client can represent exactly (2^53 - 1).
pub const HOURS_PLAYED_MAX: i64 = 9_007_199_254_740_991;

/// `http(s)://host(.host)+(/path)?`
pub fn is_cover_url(value: &str) -> bool {
  COVER_URL.is_match(value)
}

pub fn is_rating(value: f64) -> bool {
  (RATING_MIN..=RATING_MAX).contains(&value)
}

/// Trim string fields in place, then check the whole document.
pub(crate) fn check_game(game: &mut NewGame) -> Result<(), DbError> {
  trim(&mut game.name);
  trim(&mut game.genre);
  trim(&mut game.cover);
  trim(&mut game.status);

  let mut problems = Vec::new();
  required(&mut problems, "name", &game.name);
  required(&mut problems, "genre", &game.genre);
  if game.cover.is_empty() {
    problems.push("cover: is required".to_string());
  } else if !is_cover_url(&game.cover) {
    problems.push(format!("cover: `{}` is not a valid URL", game.cover));
  }
  if !is_rating(game.rating) {
    problems.push(format!(
      "rating: {} is outside the range [{RATING_MIN}, {RATING_MAX}]",
      game.rating
    ));
  }
  required(&mut problems, "status", &game.status);
  if game.hours_played < 0 {
    problems.push(format!(
      "hoursPlayed: {} is less than minimum allowed value (0)",
      game.hours_played
    ));
  } else if game.hours_played > HOURS_PLAYED_MAX {
    problems.push(format!(
      "hoursPlayed: {} is more than maximum allowed value ({HOURS_PLAYED_MAX})",
      game.hours_played
    ));
  }

  finish("Game", problems)
}

pub(crate) fn check_review(review: &mut NewReview) -> Result<(), DbError> {
  trim(&mut review.game_name);
  trim(&mut review.review);
  if let Some(cover) = review.cover.as_mut() {
    trim(cover);
  }

  let mut problems = Vec::new();
  required(&mut problems, "gameName", &review.game_name);
  let chars = review.review.chars().count();
  if chars < REVIEW_MIN_CHARS {
    problems.push(format!(
      "review: is shorter than the minimum allowed length ({REVIEW_MIN_CHARS})"
    ));
  } else if chars > REVIEW_MAX_CHARS {
    problems.push(format!(
      "review: is longer than the maximum allowed length ({REVIEW_MAX_CHARS})"
    ));
  }
  if !is_rating(review.rating) {
    problems.push(format!(
      "rating: {} is outside the range [{RATING_MIN}, {RATING_MAX}]",
      review.rating
    ));
  }
  if let Some(cover) = review.cover.as_deref() {
    if !is_cover_url(cover) {
      problems.push(format!("cover: `{cover}` is not a valid URL"));
    }
  }

  finish("Review", problems)
}

fn trim(value: &mut String) {
  let trimmed = value.trim();
  if trimmed.len() != value.len() {
    *value = trimmed.to_string();
  }
}

fn required(problems: &mut Vec<String>, field: &str, value: &str) {
  if value.is_empty() {
    problems.push(format!("{field}: is required"));
  }
}

fn finish(kind: &str, problems: Vec<String>) -> Result<(), DbError> {
  if problems.is_empty() {
    Ok(())
  } else {
    Err(DbError::Constraint(format!(
      "{kind} validation failed: {}",
      problems.join(", ")
    )))
  }
}
