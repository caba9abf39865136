/// Input validation for every route.
///
/// Validators are pure: they take the raw params, query or body of a request
/// and return either a typed draft or every field problem they found. Routes
/// tag each result with the request part it came from and combine them before
/// the handler touches the database.
use gamelog_db::{GameSort, ObjectId, PageRequest, schema};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0} must be a string")]
    NotAString(&'static str),

    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("{0} must be an integer")]
    NotAnInteger(&'static str),

    #[error("{0} must be a valid ObjectId")]
    InvalidObjectId(&'static str),

    #[error("rating must be between 0 and 5")]
    RatingOutOfRange,

    #[error("hoursPlayed must be greater or equal to 0")]
    HoursPlayedNegative,

    #[error("hoursPlayed must be at most {}", schema::HOURS_PLAYED_MAX)]
    HoursPlayedTooLarge,

    #[error("cover must be a valid URL")]
    InvalidCover,

    #[error("review must be at least 10 characters")]
    ReviewTooShort,

    #[error("review must be at most 2000 characters")]
    ReviewTooLong,

    #[error("page must be greater or equal to 1")]
    PageTooSmall,

    #[error("limit must be between 1 and 100")]
    LimitOutOfRange,

    #[error("sort must be one of: createdAt, updatedAt")]
    InvalidSort,

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("At least one field must be provided")]
    EmptyPatch,
}

/// Problems found by one validator, keyed by field name ("" for the whole part).
pub type Issues = Vec<(&'static str, ValidationError)>;

/// A single offending field, as reported to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

/// Every field error of a request, in the order they were found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn merge(mut self, other: FieldErrors) -> Self {
        self.0.extend(other.0);
        self
    }
}

/// The request part an input came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Params,
    Query,
    Body,
}

impl Part {
    pub fn as_str(&self) -> &'static str {
        match self {
            Part::Params => "params",
            Part::Query => "query",
            Part::Body => "body",
        }
    }

    /// Attach this part's name to a validator's issues.
    pub fn check<T>(self, result: Result<T, Issues>) -> Result<T, FieldErrors> {
        result.map_err(|issues| {
            FieldErrors(
                issues
                    .into_iter()
                    .map(|(field, error)| FieldError {
                        path: if field.is_empty() {
                            self.as_str().to_string()
                        } else {
                            format!("{}.{}", self.as_str(), field)
                        },
                        message: error.to_string(),
                    })
                    .collect(),
            )
        })
    }
}

/// Combine two validated parts, keeping the errors of both.
pub fn both<A, B>(
    a: Result<A, FieldErrors>,
    b: Result<B, FieldErrors>,
) -> Result<(A, B), FieldErrors> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(a), Err(b)) => Err(a.merge(b)),
        (Err(errors), _) | (_, Err(errors)) => Err(errors),
    }
}

/// Query string pairs as a JSON object of strings.
pub fn query_object(query: HashMap<String, String>) -> Value {
    Value::Object(
        query
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect(),
    )
}

// ============================================================================
// Validated shapes
// ============================================================================

/// A complete game payload (POST and PUT). Numbers are not normalized yet.
#[derive(Debug, Clone, PartialEq)]
pub struct GameDraft {
    pub name: String,
    pub genre: String,
    pub cover: String,
    pub rating: f64,
    pub status: String,
    pub hours_played: f64,
}

/// A partial game payload (PATCH) with at least one field set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamePatchDraft {
    pub name: Option<String>,
    pub genre: Option<String>,
    pub cover: Option<String>,
    pub rating: Option<f64>,
    pub status: Option<String>,
    pub hours_played: Option<f64>,
}

impl GamePatchDraft {
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub game_id: String,
    /// Raw value; blank or missing falls back to the game's name.
    pub game_name: Option<String>,
    pub review: String,
    pub rating: f64,
    pub cover: Option<String>,
}

// ============================================================================
// Schemas
// ============================================================================

/// Full game shape: every field required.
pub fn game_payload(body: &Value) -> Result<GameDraft, Issues> {
    let mut fields = Fields::new(body)?;

    let name = fields.required("name", text);
    let genre = fields.required("genre", text);
    let cover = fields.required("cover", cover);
    let rating = fields.required("rating", rating);
    let status = fields.required("status", text);
    let hours_played = fields.required("hoursPlayed", hours_played);

    match (name, genre, cover, rating, status, hours_played) {
        (Some(name), Some(genre), Some(cover), Some(rating), Some(status), Some(hours_played)) => {
            Ok(GameDraft {
                name,
                genre,
                cover,
                rating,
                status,
                hours_played,
            })
        }
        _ => Err(fields.issues),
    }
}

/// Partial game shape: same rules, every field optional, at least one present.
pub fn game_patch(body: &Value) -> Result<GamePatchDraft, Issues> {
    let mut fields = Fields::new(body)?;

    let patch = GamePatchDraft {
        name: fields.optional("name", text),
        genre: fields.optional("genre", text),
        cover: fields.optional("cover", cover),
        rating: fields.optional("rating", rating),
        status: fields.optional("status", text),
        hours_played: fields.optional("hoursPlayed", hours_played),
    };

    if !fields.issues.is_empty() {
        return Err(fields.issues);
    }
    if patch.is_empty() {
        return Err(vec![("", ValidationError::EmptyPatch)]);
    }
    Ok(patch)
}

pub fn review_payload(body: &Value) -> Result<ReviewDraft, Issues> {
    let mut fields = Fields::new(body)?;

    let game_id = fields.required("gameId", object_id_value);
    let game_name = fields.optional("gameName", raw_text);
    let review = fields.required("review", review_text);
    let rating = fields.required("rating", rating);
    let cover = fields.optional("cover", cover);

    match (game_id, review, rating) {
        (Some(game_id), Some(review), Some(rating)) if fields.issues.is_empty() => {
            Ok(ReviewDraft {
                game_id,
                game_name,
                review,
                rating,
                cover,
            })
        }
        _ => Err(fields.issues),
    }
}

/// A path identifier that only has to be present. The store decides whether
/// it is well formed.
pub fn required_id(field: &'static str, value: &str) -> Result<String, Issues> {
    if value.trim().is_empty() {
        return Err(vec![(field, ValidationError::Required(field))]);
    }
    Ok(value.to_string())
}

/// A path identifier that must have the store's identifier format.
pub fn object_id(field: &'static str, value: &str) -> Result<String, Issues> {
    object_id_value(field, &Value::String(value.to_string())).map_err(|e| vec![(field, e)])
}

/// `?sort=` restricted to the timestamp fields. Defaults to `createdAt`.
pub fn sort_query(query: &Value) -> Result<GameSort, Issues> {
    let mut fields = Fields::new(query)?;
    let sort = fields.optional("sort", |field, value| {
        value
            .as_str()
            .and_then(GameSort::from_field)
            .ok_or(ValidationError::InvalidSort)
            .map_err(|e| if value.is_string() { e } else { ValidationError::NotAString(field) })
    });

    if !fields.issues.is_empty() {
        return Err(fields.issues);
    }
    Ok(sort.unwrap_or_default())
}

/// `?page=&limit=` with page >= 1 (default 1) and limit in [1, 100] (default 20).
pub fn pagination_query(query: &Value) -> Result<PageRequest, Issues> {
    let mut fields = Fields::new(query)?;

    let page = fields.optional("page", |field, value| {
        let page = integer(field, value)?;
        if page < 1.0 {
            return Err(ValidationError::PageTooSmall);
        }
        Ok(page)
    });
    let limit = fields.optional("limit", |field, value| {
        let limit = integer(field, value)?;
        if !(1.0..=PageRequest::MAX_LIMIT as f64).contains(&limit) {
            return Err(ValidationError::LimitOutOfRange);
        }
        Ok(limit)
    });

    if !fields.issues.is_empty() {
        return Err(fields.issues);
    }
    Ok(PageRequest::new(
        page.map_or(PageRequest::DEFAULT_PAGE, |p| p as u64),
        limit.map_or(PageRequest::DEFAULT_LIMIT, |l| l as u64),
    ))
}

// ============================================================================
// Field rules
// ============================================================================

/// Walks the keys of one object, collecting issues as it goes.
struct Fields<'a> {
    object: &'a Map<String, Value>,
    issues: Issues,
}

impl<'a> Fields<'a> {
    fn new(value: &'a Value) -> Result<Self, Issues> {
        match value {
            Value::Object(object) => Ok(Self {
                object,
                issues: Vec::new(),
            }),
            _ => Err(vec![("", ValidationError::NotAnObject)]),
        }
    }

    fn required<T>(
        &mut self,
        field: &'static str,
        rule: impl FnOnce(&'static str, &Value) -> Result<T, ValidationError>,
    ) -> Option<T> {
        match self.object.get(field) {
            Some(value) => self.apply(field, value, rule),
            None => {
                self.issues.push((field, ValidationError::Required(field)));
                None
            }
        }
    }

    fn optional<T>(
        &mut self,
        field: &'static str,
        rule: impl FnOnce(&'static str, &Value) -> Result<T, ValidationError>,
    ) -> Option<T> {
        let value = self.object.get(field)?;
        self.apply(field, value, rule)
    }

    fn apply<T>(
        &mut self,
        field: &'static str,
        value: &Value,
        rule: impl FnOnce(&'static str, &Value) -> Result<T, ValidationError>,
    ) -> Option<T> {
        match rule(field, value) {
            Ok(value) => Some(value),
            Err(error) => {
                self.issues.push((field, error));
                None
            }
        }
    }
}

fn raw_text(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or(ValidationError::NotAString(field))
}

/// Trimmed, non-empty string.
fn text(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    let trimmed = raw_text(field, value)?.trim().to_string();
    if trimmed.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(trimmed)
}

fn cover(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    let url = raw_text(field, value)?.trim().to_string();
    if !schema::is_cover_url(&url) {
        return Err(ValidationError::InvalidCover);
    }
    Ok(url)
}

fn rating(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let rating = coerce_number(value).ok_or(ValidationError::NotANumber(field))?;
    if !schema::is_rating(rating) {
        return Err(ValidationError::RatingOutOfRange);
    }
    Ok(rating)
}

fn hours_played(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let hours = integer(field, value)?;
    if hours < 0.0 {
        return Err(ValidationError::HoursPlayedNegative);
    }
    if hours > schema::HOURS_PLAYED_MAX as f64 {
        return Err(ValidationError::HoursPlayedTooLarge);
    }
    Ok(hours)
}

/// Length is counted in characters on the text as sent.
fn review_text(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    let review = raw_text(field, value)?;
    let chars = review.chars().count();
    if chars < schema::REVIEW_MIN_CHARS {
        return Err(ValidationError::ReviewTooShort);
    }
    if chars > schema::REVIEW_MAX_CHARS {
        return Err(ValidationError::ReviewTooLong);
    }
    Ok(review)
}

fn object_id_value(field: &'static str, value: &Value) -> Result<String, ValidationError> {
    let id = raw_text(field, value)?;
    if !ObjectId::is_valid(&id) {
        return Err(ValidationError::InvalidObjectId(field));
    }
    Ok(id)
}

fn integer(field: &'static str, value: &Value) -> Result<f64, ValidationError> {
    let number = coerce_number(value).ok_or(ValidationError::NotANumber(field))?;
    if number.fract() != 0.0 {
        return Err(ValidationError::NotAnInteger(field));
    }
    Ok(number)
}

/// Numbers arrive as JSON numbers or, from forms and query strings, as text.
/// Blank text, `null` and booleans coerce the way loosely typed clients expect.
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    };
    number.filter(|n| n.is_finite())
}
