mod error;
mod id;
mod models;
pub mod schema;

pub use error::{DbError, Result};
pub use id::ObjectId;
pub use models::{
  Game, GamePatch, GameSort, GameSummary, GameTotals, NewGame, NewReview, PageRequest, Review,
  ReviewFilter, StatusBreakdown,
};

use std::path::Path;
use chrono::Utc;
use tokio_rusqlite::Connection;
use tokio_rusqlite::rusqlite::{self, ErrorCode, OptionalExtension, Row, params};
use tracing::{debug, info};

/// Database wrapper for the game catalog and its reviews.
#[derive(Clone)]
pub struct Database {
  conn: Connection,
}

const GAME_COLUMNS: &str =
  "id, name, genre, cover, rating, status, hours_played, created_at, updated_at";
const REVIEW_COLUMNS: &str =
  "id, game_id, game_name, review, rating, cover, created_at, updated_at";

impl Database {
  /// Open or create a database at the given path.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = Connection::open(path).await?;
    let db = Self { conn };
    db.initialize().await?;
    Ok(db)
  }

  /// Create an in-memory database (useful for testing).
  pub async fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory().await?;
    let db = Self { conn };
    db.initialize().await?;
    Ok(db)
  }

  /// Close the underlying connection, waiting for queued calls to finish.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    info!("database closed");
    Ok(())
  }

  /// Create both collections and the per-game review index.
  async fn initialize(&self) -> Result<()> {
    self.conn
            .call(|conn| -> rusqlite::Result<()> {
                conn.pragma_update(None, "journal_mode", "WAL")?;

                conn.execute_batch(
                    r#"
                    CREATE TABLE IF NOT EXISTS games (
                        id TEXT PRIMARY KEY CHECK (length(id) = 24),
                        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
                        genre TEXT NOT NULL CHECK (length(trim(genre)) > 0),
                        cover TEXT NOT NULL CHECK (cover LIKE 'http://%' OR cover LIKE 'https://%'),
                        rating REAL NOT NULL CHECK (rating >= 0 AND rating <= 5),
                        status TEXT NOT NULL CHECK (length(trim(status)) > 0),
                        hours_played INTEGER NOT NULL CHECK (hours_played BETWEEN 0 AND 9007199254740991),
                        created_at INTEGER NOT NULL,
                        updated_at INTEGER NOT NULL
                    );

                    -- No foreign key: deleting a game leaves its reviews in place
                    CREATE TABLE IF NOT EXISTS reviews (
                        id TEXT PRIMARY KEY CHECK (length(id) = 24),
                        game_id TEXT NOT NULL CHECK (length(game_id) = 24),
                        game_name TEXT NOT NULL CHECK (length(trim(game_name)) > 0),
                        review TEXT NOT NULL CHECK (length(review) BETWEEN 10 AND 2000),
                        rating REAL NOT NULL CHECK (rating >= 0 AND rating <= 5),
                        cover TEXT CHECK (cover IS NULL OR cover LIKE 'http://%' OR cover LIKE 'https://%'),
                        created_at INTEGER NOT NULL,
                        updated_at INTEGER NOT NULL
                    );

                    CREATE INDEX IF NOT EXISTS idx_reviews_game_created
                        ON reviews(game_id, created_at DESC);
                    "#,
                )?;
                Ok(())
            })
            .await?;

    info!("database initialized");
    Ok(())
  }

  // ========================================================================
  // Games
  // ========================================================================

  /// Insert a game. Fails with `Constraint` if the document breaks the schema.
  pub async fn create_game(&self, mut game: NewGame) -> Result<Game> {
    schema::check_game(&mut game)?;
    let id = ObjectId::new();
    let now = now();

    let created = self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<Game>> {
        let inserted = conn
          .prepare_cached(
            "INSERT INTO games (id, name, genre, cover, rating, status, hours_played, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          )?
          .execute(params![
            id,
            &game.name,
            &game.genre,
            &game.cover,
            game.rating,
            &game.status,
            game.hours_played,
            now
          ]);
        if let Err(err) = inserted {
          return Ok(Err(constraint_violation(err)?));
        }

        Ok(Ok(Game {
          id,
          name: game.name,
          genre: game.genre,
          cover: game.cover,
          rating: game.rating,
          status: game.status,
          hours_played: game.hours_played,
          created_at: now,
          updated_at: now,
        }))
      })
      .await??;

    debug!(id = %created.id, name = %created.name, "created game");
    Ok(created)
  }

  /// Get a game by id. Returns None if not found.
  pub async fn get_game(&self, id: &str) -> Result<Option<Game>> {
    let id = ObjectId::parse(id)?;
    let game = self
      .conn
      .call(move |conn| -> rusqlite::Result<Option<Game>> {
        conn
          .prepare_cached(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1"))?
          .query_row(params![id], game_from_row)
          .optional()
      })
      .await?;

    Ok(game)
  }

  /// List every game, oldest first by the chosen timestamp.
  pub async fn list_games(&self, sort: GameSort) -> Result<Vec<Game>> {
    let order = match sort {
      GameSort::CreatedAt => "created_at ASC, rowid ASC",
      GameSort::UpdatedAt => "updated_at ASC, rowid ASC",
    };
    let sql = format!("SELECT {GAME_COLUMNS} FROM games ORDER BY {order}");

    let games = self
      .conn
      .call(move |conn| -> rusqlite::Result<Vec<Game>> {
        let mut stmt = conn.prepare_cached(&sql)?;
        let games = stmt
          .query_map([], game_from_row)?
          .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(games)
      })
      .await?;

    Ok(games)
  }

  /// Overwrite every field of an existing game. `created_at` is preserved.
  pub async fn replace_game(&self, id: &str, mut game: NewGame) -> Result<Game> {
    let id = ObjectId::parse(id)?;
    schema::check_game(&mut game)?;
    let now = now();

    let replaced = self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<Game>> {
        let created_at: Option<i64> = match conn
          .prepare_cached(
            "UPDATE games
             SET name = ?2, genre = ?3, cover = ?4, rating = ?5, status = ?6, hours_played = ?7, updated_at = ?8
             WHERE id = ?1
             RETURNING created_at",
          )?
          .query_row(
            params![
              id,
              &game.name,
              &game.genre,
              &game.cover,
              game.rating,
              &game.status,
              game.hours_played,
              now
            ],
            |row| row.get(0),
          )
          .optional()
        {
          Ok(created_at) => created_at,
          Err(err) => return Ok(Err(constraint_violation(err)?)),
        };

        let Some(created_at) = created_at else {
          return Ok(Err(DbError::GameNotFound));
        };

        Ok(Ok(Game {
          id,
          name: game.name,
          genre: game.genre,
          cover: game.cover,
          rating: game.rating,
          status: game.status,
          hours_played: game.hours_played,
          created_at,
          updated_at: now,
        }))
      })
      .await??;

    debug!(id = %replaced.id, "replaced game");
    Ok(replaced)
  }

  /// Merge a patch into an existing game, re-checking the merged document.
  /// An empty patch is rejected without touching the row.
  pub async fn update_game(&self, id: &str, patch: GamePatch) -> Result<Game> {
    let id = ObjectId::parse(id)?;
    if patch.is_empty() {
      return Err(DbError::Constraint(
        "Game validation failed: at least one field must be provided".to_string(),
      ));
    }
    let now = now();

    let updated = self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<Game>> {
        let tx = conn.transaction()?;

        let existing = tx
          .prepare_cached(&format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1"))?
          .query_row(params![id], game_from_row)
          .optional()?;

        let existing = match existing {
          Some(g) => g,
          None => return Ok(Err(DbError::GameNotFound)),
        };

        let mut merged = patch.apply_to(&existing);
        if let Err(err) = schema::check_game(&mut merged) {
          return Ok(Err(err));
        }

        let written = tx
          .prepare_cached(
            "UPDATE games
             SET name = ?2, genre = ?3, cover = ?4, rating = ?5, status = ?6, hours_played = ?7, updated_at = ?8
             WHERE id = ?1",
          )?
          .execute(params![
            id,
            &merged.name,
            &merged.genre,
            &merged.cover,
            merged.rating,
            &merged.status,
            merged.hours_played,
            now
          ]);
        if let Err(err) = written {
          return Ok(Err(constraint_violation(err)?));
        }

        tx.commit()?;
        Ok(Ok(Game {
          id,
          name: merged.name,
          genre: merged.genre,
          cover: merged.cover,
          rating: merged.rating,
          status: merged.status,
          hours_played: merged.hours_played,
          created_at: existing.created_at,
          updated_at: now,
        }))
      })
      .await??;

    debug!(id = %updated.id, "updated game");
    Ok(updated)
  }

  /// Delete a game. Its reviews are left untouched.
  pub async fn delete_game(&self, id: &str) -> Result<()> {
    let id = ObjectId::parse(id)?;
    self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<()>> {
        let deleted = conn
          .prepare_cached("DELETE FROM games WHERE id = ?1")?
          .execute(params![id])?;

        if deleted == 0 {
          return Ok(Err(DbError::GameNotFound));
        }

        Ok(Ok(()))
      })
      .await??;

    debug!(%id, "deleted game");
    Ok(())
  }

  /// Per-status breakdown plus overall totals across every game.
  ///
  /// Hours are summed with `TOTAL()`, which never overflows.
  pub async fn game_summary(&self) -> Result<GameSummary> {
    let summary = self
      .conn
      .call(|conn| -> rusqlite::Result<GameSummary> {
        let breakdown = conn
          .prepare_cached(
            r#"
                    SELECT status, COUNT(*), TOTAL(hours_played)
                    FROM games
                    GROUP BY status
                    ORDER BY status
                    "#,
          )?
          .query_map([], |row| {
            Ok(StatusBreakdown {
              status: row.get(0)?,
              count: row.get::<_, i64>(1)? as u64,
              hours_played: row.get::<_, f64>(2)? as i64,
            })
          })?
          .collect::<std::result::Result<Vec<_>, _>>()?;

        let totals = conn
          .prepare_cached(
            r#"
                    SELECT COUNT(*), TOTAL(hours_played), COALESCE(AVG(rating), 0.0)
                    FROM games
                    "#,
          )?
          .query_row([], |row| {
            Ok(GameTotals {
              total_games: row.get::<_, i64>(0)? as u64,
              total_hours_played: row.get::<_, f64>(1)? as i64,
              rating_average: row.get(2)?,
            })
          })?;

        Ok(GameSummary { breakdown, totals })
      })
      .await?;

    Ok(summary)
  }

  // ========================================================================
  // Reviews
  // ========================================================================

  /// Insert a review. The referenced game is not looked up here.
  pub async fn create_review(&self, mut review: NewReview) -> Result<Review> {
    schema::check_review(&mut review)?;
    let id = ObjectId::new();
    let now = now();

    let created = self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<Review>> {
        let inserted = conn
          .prepare_cached(
            "INSERT INTO reviews (id, game_id, game_name, review, rating, cover, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
          )?
          .execute(params![
            id,
            review.game_id,
            &review.game_name,
            &review.review,
            review.rating,
            &review.cover,
            now
          ]);
        if let Err(err) = inserted {
          return Ok(Err(constraint_violation(err)?));
        }

        Ok(Ok(Review {
          id,
          game_id: review.game_id,
          game_name: review.game_name,
          review: review.review,
          rating: review.rating,
          cover: review.cover,
          created_at: now,
          updated_at: now,
        }))
      })
      .await??;

    debug!(id = %created.id, game_id = %created.game_id, "created review");
    Ok(created)
  }

  /// Get a review by id. Returns None if not found.
  pub async fn get_review(&self, id: &str) -> Result<Option<Review>> {
    let id = ObjectId::parse(id)?;
    let review = self
      .conn
      .call(move |conn| -> rusqlite::Result<Option<Review>> {
        conn
          .prepare_cached(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1"))?
          .query_row(params![id], review_from_row)
          .optional()
      })
      .await?;

    Ok(review)
  }

  /// One page of reviews, newest first.
  pub async fn list_reviews(&self, filter: ReviewFilter, page: PageRequest) -> Result<Vec<Review>> {
    let limit = i64::try_from(page.limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

    let reviews = self
      .conn
      .call(move |conn| -> rusqlite::Result<Vec<Review>> {
        let reviews = match filter {
          ReviewFilter::All => {
            let mut stmt = conn.prepare_cached(&format!(
              "SELECT {REVIEW_COLUMNS} FROM reviews
               ORDER BY created_at DESC, rowid DESC
               LIMIT ?1 OFFSET ?2"
            ))?;
            stmt
              .query_map(params![limit, offset], review_from_row)?
              .collect::<std::result::Result<Vec<_>, _>>()?
          }
          ReviewFilter::ByGame(game_id) => {
            let mut stmt = conn.prepare_cached(&format!(
              "SELECT {REVIEW_COLUMNS} FROM reviews
               WHERE game_id = ?1
               ORDER BY created_at DESC, rowid DESC
               LIMIT ?2 OFFSET ?3"
            ))?;
            stmt
              .query_map(params![game_id, limit, offset], review_from_row)?
              .collect::<std::result::Result<Vec<_>, _>>()?
          }
        };

        Ok(reviews)
      })
      .await?;

    Ok(reviews)
  }

  /// Total reviews matching a filter.
  pub async fn count_reviews(&self, filter: ReviewFilter) -> Result<u64> {
    let total = self
      .conn
      .call(move |conn| -> rusqlite::Result<i64> {
        match filter {
          ReviewFilter::All => conn
            .prepare_cached("SELECT COUNT(*) FROM reviews")?
            .query_row([], |row| row.get(0)),
          ReviewFilter::ByGame(game_id) => conn
            .prepare_cached("SELECT COUNT(*) FROM reviews WHERE game_id = ?1")?
            .query_row(params![game_id], |row| row.get(0)),
        }
      })
      .await?;

    Ok(total.max(0) as u64)
  }

  /// Delete a review.
  pub async fn delete_review(&self, id: &str) -> Result<()> {
    let id = ObjectId::parse(id)?;
    self
      .conn
      .call(move |conn| -> rusqlite::Result<Result<()>> {
        let deleted = conn
          .prepare_cached("DELETE FROM reviews WHERE id = ?1")?
          .execute(params![id])?;

        if deleted == 0 {
          return Ok(Err(DbError::ReviewNotFound));
        }

        Ok(Ok(()))
      })
      .await??;

    debug!(%id, "deleted review");
    Ok(())
  }
}

fn now() -> i64 {
  Utc::now().timestamp_millis()
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<Game> {
  Ok(Game {
    id: row.get(0)?,
    name: row.get(1)?,
    genre: row.get(2)?,
    cover: row.get(3)?,
    rating: row.get(4)?,
    status: row.get(5)?,
    hours_played: row.get(6)?,
    created_at: row.get(7)?,
    updated_at: row.get(8)?,
  })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
  Ok(Review {
    id: row.get(0)?,
    game_id: row.get(1)?,
    game_name: row.get(2)?,
    review: row.get(3)?,
    rating: row.get(4)?,
    cover: row.get(5)?,
    created_at: row.get(6)?,
    updated_at: row.get(7)?,
  })
}

/// Turn a `CHECK` failure into a `Constraint` error; pass anything else through.
fn constraint_violation(err: rusqlite::Error) -> rusqlite::Result<DbError> {
  match err {
    rusqlite::Error::SqliteFailure(failure, message)
      if failure.code == ErrorCode::ConstraintViolation =>
    {
      Ok(DbError::Constraint(
        message.unwrap_or_else(|| failure.to_string()),
      ))
    }
    other => Err(other),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cyberpunk() -> NewGame {
    NewGame {
      name: "Cyberpunk 2077".to_string(),
      genre: "Acción".to_string(),
      cover: "https://cdn.example.com/cyberpunk.webp".to_string(),
      rating: 4.5,
      status: "Jugando".to_string(),
      hours_played: 45,
    }
  }

  fn review_of(game: &Game, text: &str) -> NewReview {
    NewReview {
      game_id: game.id,
      game_name: game.name.clone(),
      review: text.to_string(),
      rating: 4.0,
      cover: Some(game.cover.clone()),
    }
  }

  #[tokio::test]
  async fn test_game_lifecycle() {
    let db = Database::open_in_memory().await.unwrap();

    // Create
    let game = db.create_game(cyberpunk()).await.unwrap();
    assert_eq!(game.name, "Cyberpunk 2077");
    assert_eq!(game.created_at, game.updated_at);

    // Get it
    let fetched = db.get_game(&game.id.to_string()).await.unwrap().unwrap();
    assert_eq!(fetched, game);

    // Replace it
    let mut replacement = cyberpunk();
    replacement.name = "Cyberpunk 2077: Phantom Liberty".to_string();
    replacement.hours_played = 60;
    let replaced = db
      .replace_game(&game.id.to_string(), replacement)
      .await
      .unwrap();
    assert_eq!(replaced.name, "Cyberpunk 2077: Phantom Liberty");
    assert_eq!(replaced.hours_played, 60);
    assert_eq!(replaced.created_at, game.created_at);

    // Patch it
    let patched = db
      .update_game(
        &game.id.to_string(),
        GamePatch {
          status: Some("Completado".to_string()),
          ..Default::default()
        },
      )
      .await
      .unwrap();
    assert_eq!(patched.status, "Completado");
    assert_eq!(patched.name, "Cyberpunk 2077: Phantom Liberty");

    // Delete it
    db.delete_game(&game.id.to_string()).await.unwrap();
    assert!(db.get_game(&game.id.to_string()).await.unwrap().is_none());

    // Second delete reports not found
    assert!(matches!(
      db.delete_game(&game.id.to_string()).await,
      Err(DbError::GameNotFound)
    ));
  }

  #[tokio::test]
  async fn test_malformed_ids_never_reach_a_lookup() {
    let db = Database::open_in_memory().await.unwrap();

    assert!(matches!(
      db.get_game("123").await,
      Err(DbError::InvalidIdentifier(_))
    ));
    assert!(matches!(
      db.delete_review("zzzzzzzzzzzzzzzzzzzzzzzz").await,
      Err(DbError::InvalidIdentifier(_))
    ));
    assert!(matches!(
      db.update_game("nope", GamePatch::default()).await,
      Err(DbError::InvalidIdentifier(_))
    ));
  }

  #[tokio::test]
  async fn test_missing_games_report_not_found() {
    let db = Database::open_in_memory().await.unwrap();
    let absent = ObjectId::new().to_string();

    assert!(db.get_game(&absent).await.unwrap().is_none());
    assert!(matches!(
      db.replace_game(&absent, cyberpunk()).await,
      Err(DbError::GameNotFound)
    ));
    assert!(matches!(
      db.update_game(
        &absent,
        GamePatch {
          status: Some("Completado".to_string()),
          ..GamePatch::default()
        }
      )
      .await,
      Err(DbError::GameNotFound)
    ));
    assert!(matches!(
      db.delete_game(&absent).await,
      Err(DbError::GameNotFound)
    ));
  }

  #[tokio::test]
  async fn test_store_rejects_documents_that_break_the_schema() {
    let db = Database::open_in_memory().await.unwrap();

    let mut bad = cyberpunk();
    bad.rating = 9.0;
    assert!(matches!(
      db.create_game(bad).await,
      Err(DbError::Constraint(_))
    ));

    let mut bad = cyberpunk();
    bad.cover = "not-a-url".to_string();
    assert!(matches!(
      db.create_game(bad).await,
      Err(DbError::Constraint(_))
    ));

    // Patches are checked after merging
    let game = db.create_game(cyberpunk()).await.unwrap();
    let result = db
      .update_game(
        &game.id.to_string(),
        GamePatch {
          name: Some("   ".to_string()),
          ..Default::default()
        },
      )
      .await;
    assert!(matches!(result, Err(DbError::Constraint(_))));

    // Nothing was written
    assert_eq!(db.list_games(GameSort::CreatedAt).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_sql_checks_back_up_the_schema_layer() {
    let db = Database::open_in_memory().await.unwrap();

    // Bypass the document checks entirely
    let result = db
      .conn
      .call(|conn| -> rusqlite::Result<Result<()>> {
        let inserted = conn.execute(
          "INSERT INTO games (id, name, genre, cover, rating, status, hours_played, created_at, updated_at)
           VALUES ('65a1b2c3d4e5f60718293a4b', 'x', 'y', 'https://a.b', 3.0, 'z', -5, 0, 0)",
          [],
        );
        match inserted {
          Ok(_) => Ok(Ok(())),
          Err(err) => Ok(Err(constraint_violation(err)?)),
        }
      })
      .await
      .unwrap();
    assert!(matches!(result, Err(DbError::Constraint(_))));
  }

  #[tokio::test]
  async fn test_list_games_sorting() {
    let db = Database::open_in_memory().await.unwrap();

    let first = db.create_game(cyberpunk()).await.unwrap();
    let mut hades = cyberpunk();
    hades.name = "Hades".to_string();
    let second = db.create_game(hades).await.unwrap();

    let games = db.list_games(GameSort::CreatedAt).await.unwrap();
    let names: Vec<&str> = games.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Cyberpunk 2077", "Hades"]);

    // Touch the first game so it becomes the most recently updated
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    db.update_game(
      &first.id.to_string(),
      GamePatch {
        hours_played: Some(50),
        ..Default::default()
      },
    )
    .await
    .unwrap();

    let games = db.list_games(GameSort::UpdatedAt).await.unwrap();
    assert_eq!(games[0].id, second.id);
    assert_eq!(games[1].id, first.id);
  }

  #[tokio::test]
  async fn test_game_summary() {
    let db = Database::open_in_memory().await.unwrap();

    // Empty catalog
    let summary = db.game_summary().await.unwrap();
    assert!(summary.breakdown.is_empty());
    assert_eq!(summary.totals, GameTotals::default());

    db.create_game(cyberpunk()).await.unwrap();
    let mut hades = cyberpunk();
    hades.name = "Hades".to_string();
    hades.status = "Pendiente".to_string();
    hades.rating = 5.0;
    hades.hours_played = 0;
    db.create_game(hades).await.unwrap();
    let mut witcher = cyberpunk();
    witcher.name = "The Witcher 3".to_string();
    witcher.rating = 3.5;
    witcher.hours_played = 100;
    db.create_game(witcher).await.unwrap();

    let summary = db.game_summary().await.unwrap();
    assert_eq!(
      summary.breakdown,
      vec![
        StatusBreakdown {
          status: "Jugando".to_string(),
          count: 2,
          hours_played: 145,
        },
        StatusBreakdown {
          status: "Pendiente".to_string(),
          count: 1,
          hours_played: 0,
        },
      ]
    );
    assert_eq!(summary.totals.total_games, 3);
    assert_eq!(summary.totals.total_hours_played, 145);
    assert!((summary.totals.rating_average - 13.0 / 3.0).abs() < 1e-9);
  }

  #[tokio::test]
  async fn test_game_summary_with_huge_hour_counts() {
    let db = Database::open_in_memory().await.unwrap();

    let mut marathon = cyberpunk();
    marathon.hours_played = schema::HOURS_PLAYED_MAX;
    db.create_game(marathon.clone()).await.unwrap();
    db.create_game(marathon.clone()).await.unwrap();

    marathon.hours_played = schema::HOURS_PLAYED_MAX + 1;
    assert!(matches!(
      db.create_game(marathon).await,
      Err(DbError::Constraint(_))
    ));

    let summary = db.game_summary().await.unwrap();
    assert_eq!(summary.totals.total_games, 2);
    assert!(summary.totals.total_hours_played > schema::HOURS_PLAYED_MAX);
    assert_eq!(
      summary.breakdown[0].hours_played,
      summary.totals.total_hours_played
    );
  }

  #[tokio::test]
  async fn test_empty_patch_leaves_game_untouched() {
    let db = Database::open_in_memory().await.unwrap();
    let game = db.create_game(cyberpunk()).await.unwrap();

    assert!(matches!(
      db.update_game(&game.id.to_string(), GamePatch::default()).await,
      Err(DbError::Constraint(_))
    ));

    let stored = db.get_game(&game.id.to_string()).await.unwrap().unwrap();
    assert_eq!(stored, game);
  }

  #[tokio::test]
  async fn test_review_lifecycle() {
    let db = Database::open_in_memory().await.unwrap();
    let game = db.create_game(cyberpunk()).await.unwrap();

    let review = db
      .create_review(review_of(&game, "  Impresionante experiencia de juego  "))
      .await
      .unwrap();
    assert_eq!(review.review, "Impresionante experiencia de juego");
    assert_eq!(review.game_id, game.id);

    let fetched = db
      .get_review(&review.id.to_string())
      .await
      .unwrap()
      .unwrap();
    assert_eq!(fetched, review);

    db.delete_review(&review.id.to_string()).await.unwrap();
    assert!(matches!(
      db.delete_review(&review.id.to_string()).await,
      Err(DbError::ReviewNotFound)
    ));
  }

  #[tokio::test]
  async fn test_reviews_survive_game_deletion() {
    let db = Database::open_in_memory().await.unwrap();
    let game = db.create_game(cyberpunk()).await.unwrap();
    let review = db
      .create_review(review_of(&game, "Una historia que no se olvida"))
      .await
      .unwrap();

    db.delete_game(&game.id.to_string()).await.unwrap();

    assert!(
      db.get_review(&review.id.to_string())
        .await
        .unwrap()
        .is_some()
    );
  }

  #[tokio::test]
  async fn test_review_pagination_newest_first() {
    let db = Database::open_in_memory().await.unwrap();
    let game = db.create_game(cyberpunk()).await.unwrap();
    let mut other = cyberpunk();
    other.name = "Hades".to_string();
    let other = db.create_game(other).await.unwrap();

    for n in 0..5 {
      db.create_review(review_of(&game, &format!("Reseña número {n} del juego")))
        .await
        .unwrap();
    }
    db.create_review(review_of(&other, "Otra reseña distinta"))
      .await
      .unwrap();

    let filter = ReviewFilter::ByGame(game.id);
    assert_eq!(db.count_reviews(filter).await.unwrap(), 5);
    assert_eq!(db.count_reviews(ReviewFilter::All).await.unwrap(), 6);

    let first_page = db
      .list_reviews(filter, PageRequest::new(1, 2))
      .await
      .unwrap();
    let texts: Vec<&str> = first_page.iter().map(|r| r.review.as_str()).collect();
    assert_eq!(
      texts,
      vec!["Reseña número 4 del juego", "Reseña número 3 del juego"]
    );

    let last_page = db
      .list_reviews(filter, PageRequest::new(3, 2))
      .await
      .unwrap();
    assert_eq!(last_page.len(), 1);
    assert_eq!(last_page[0].review, "Reseña número 0 del juego");

    let beyond = db
      .list_reviews(filter, PageRequest::new(10, 2))
      .await
      .unwrap();
    assert!(beyond.is_empty());

    // Newest overall is the review of the other game
    let all = db
      .list_reviews(ReviewFilter::All, PageRequest::default())
      .await
      .unwrap();
    assert_eq!(all.len(), 6);
    assert_eq!(all[0].game_id, other.id);
    assert!(all.windows(2).all(|w| w[0].created_at >= w[1].created_at));
  }
}
