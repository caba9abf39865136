use crate::id::ObjectId;

/// A game in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
  pub id: ObjectId,
  pub name: String,
  pub genre: String,
  /// Cover art URL
  pub cover: String,
  /// 0.0 to 5.0, one decimal
  pub rating: f64,
  /// Free-form playback status label ("Jugando", "Completado", ...)
  pub status: String,
  pub hours_played: i64,
  /// Unix milliseconds
  pub created_at: i64,
  /// Unix milliseconds
  pub updated_at: i64,
}

/// Field values for inserting or fully replacing a game.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
  pub name: String,
  pub genre: String,
  pub cover: String,
  pub rating: f64,
  pub status: String,
  pub hours_played: i64,
}

/// Merge-patch for a game. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamePatch {
  pub name: Option<String>,
  pub genre: Option<String>,
  pub cover: Option<String>,
  pub rating: Option<f64>,
  pub status: Option<String>,
  pub hours_played: Option<i64>,
}

impl GamePatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.genre.is_none()
      && self.cover.is_none()
      && self.rating.is_none()
      && self.status.is_none()
      && self.hours_played.is_none()
  }

  /// Apply the patch on top of an existing game's fields.
  pub fn apply_to(self, game: &Game) -> NewGame {
    NewGame {
      name: self.name.unwrap_or_else(|| game.name.clone()),
      genre: self.genre.unwrap_or_else(|| game.genre.clone()),
      cover: self.cover.unwrap_or_else(|| game.cover.clone()),
      rating: self.rating.unwrap_or(game.rating),
      status: self.status.unwrap_or_else(|| game.status.clone()),
      hours_played: self.hours_played.unwrap_or(game.hours_played),
    }
  }
}

/// Timestamp column used to order game listings (always ascending).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GameSort {
  #[default]
  CreatedAt,
  UpdatedAt,
}

impl GameSort {
  pub fn from_field(field: &str) -> Option<Self> {
    match field {
      "createdAt" => Some(Self::CreatedAt),
      "updatedAt" => Some(Self::UpdatedAt),
      _ => None,
    }
  }
}

/// Per-status aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusBreakdown {
  pub status: String,
  pub count: u64,
  pub hours_played: i64,
}

/// Totals over every game. All zero when the catalog is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameTotals {
  pub total_games: u64,
  pub total_hours_played: i64,
  pub rating_average: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
  pub breakdown: Vec<StatusBreakdown>,
  pub totals: GameTotals,
}

/// A user review of a game.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
  pub id: ObjectId,
  /// Weak reference; the game may since have been deleted.
  pub game_id: ObjectId,
  /// Snapshot of the game's name at creation time
  pub game_name: String,
  pub review: String,
  pub rating: f64,
  pub cover: Option<String>,
  pub created_at: i64,
  pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
  pub game_id: ObjectId,
  pub game_name: String,
  pub review: String,
  pub rating: f64,
  pub cover: Option<String>,
}

/// Which reviews a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFilter {
  All,
  ByGame(ObjectId),
}

/// One-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page: u64,
  pub limit: u64,
}

impl PageRequest {
  pub const DEFAULT_PAGE: u64 = 1;
  pub const DEFAULT_LIMIT: u64 = 20;
  pub const MAX_LIMIT: u64 = 100;

  pub fn new(page: u64, limit: u64) -> Self {
    Self {
      page: page.max(1),
      limit: limit.clamp(1, Self::MAX_LIMIT),
    }
  }

  /// Number of rows skipped before this page.
  pub fn offset(&self) -> u64 {
    (self.page - 1).saturating_mul(self.limit)
  }

  /// `ceil(total / limit)`, never less than one.
  pub fn total_pages(&self, total: u64) -> u64 {
    total.div_ceil(self.limit).max(1)
  }
}

impl Default for PageRequest {
  fn default() -> Self {
    Self::new(Self::DEFAULT_PAGE, Self::DEFAULT_LIMIT)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_page_request_bounds() {
    assert_eq!(PageRequest::new(0, 0), PageRequest { page: 1, limit: 1 });
    assert_eq!(PageRequest::new(3, 500).limit, 100);
    assert_eq!(PageRequest::default(), PageRequest { page: 1, limit: 20 });
  }

  #[test]
  fn test_page_offset() {
    assert_eq!(PageRequest::new(1, 20).offset(), 0);
    assert_eq!(PageRequest::new(3, 10).offset(), 20);
    assert_eq!(PageRequest::new(u64::MAX, 100).offset(), u64::MAX);
  }

  #[test]
  fn test_total_pages() {
    let page = PageRequest::new(1, 20);
    assert_eq!(page.total_pages(0), 1);
    assert_eq!(page.total_pages(1), 1);
    assert_eq!(page.total_pages(20), 1);
    assert_eq!(page.total_pages(21), 2);
    assert_eq!(PageRequest::new(1, 7).total_pages(50), 8);
  }

  #[test]
  fn test_sort_fields() {
    assert_eq!(GameSort::from_field("createdAt"), Some(GameSort::CreatedAt));
    assert_eq!(GameSort::from_field("updatedAt"), Some(GameSort::UpdatedAt));
    assert_eq!(GameSort::from_field("name"), None);
    assert_eq!(GameSort::default(), GameSort::CreatedAt);
  }
}
