//! Store-generated document identifiers.
//!
//! Identifiers are 12 bytes rendered as 24 lowercase hex characters: a
//! big-endian seconds timestamp, five bytes of per-process randomness and a
//! three byte counter.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use rand::Rng;
use tokio_rusqlite::rusqlite::types::{
  FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef,
};

use crate::error::DbError;

static PROCESS_UNIQUE: LazyLock<[u8; 5]> = LazyLock::new(|| rand::rng().random());
static COUNTER: LazyLock<AtomicU32> = LazyLock::new(|| AtomicU32::new(rand::rng().random()));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
  /// Generate a fresh identifier.
  pub fn new() -> Self {
    let mut bytes = [0u8; 12];
    let seconds = Utc::now().timestamp() as u32;
    let count = COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
    bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
    Self(bytes)
  }

  /// Parse a 24 character hex string (either case).
  pub fn parse(value: &str) -> Result<Self, DbError> {
    let mut bytes = [0u8; 12];
    if value.len() != 24 {
      return Err(DbError::InvalidIdentifier(value.to_string()));
    }
    hex::decode_to_slice(value, &mut bytes)
      .map_err(|_| DbError::InvalidIdentifier(value.to_string()))?;
    Ok(Self(bytes))
  }

  /// Returns true when `value` has the identifier shape, without allocating.
  pub fn is_valid(value: &str) -> bool {
    value.len() == 24 && value.bytes().all(|b| b.is_ascii_hexdigit())
  }

  pub fn to_hex(&self) -> String {
    hex::encode(self.0)
  }
}

impl Default for ObjectId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.to_hex())
  }
}

impl FromStr for ObjectId {
  type Err = DbError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl ToSql for ObjectId {
  fn to_sql(&self) -> tokio_rusqlite::rusqlite::Result<ToSqlOutput<'_>> {
    Ok(ToSqlOutput::Owned(Value::Text(self.to_hex())))
  }
}

impl FromSql for ObjectId {
  fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
    Self::parse(value.as_str()?).map_err(|_| FromSqlError::InvalidType)
  }
}
