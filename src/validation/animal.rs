//! Animal schema validation
//!
//! Validates an untrusted JSON value against the animal schema and, when it
//! passes, converts it into a typed `NewAnimal`.
//!
//! Checks run in a fixed order and stop at the first violation, so the same
//! input always reports the same message:
//!
//! 1. required fields exist (`name`, `sciName`, `description`, `images`, `events`)
//! 2. `name` and `sciName` are non-blank strings
//! 3. `description` has at least 2 items
//! 4. `images` and `events` are non-empty
//! 5. every event has a name, a `mm/dd/yyyy` date and a url

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{AnimalEvent, NewAnimal};

/// Top-level fields every animal must carry, in reporting order
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "sciName", "description", "images", "events"];

/// Minimum number of description paragraphs
pub const MIN_DESCRIPTION_ITEMS: usize = 2;

// Month and day ranges only; 02/30 and 04/31 are accepted.
static EVENT_DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/(0[1-9]|[12][0-9]|3[01])/[0-9]{4}$").unwrap()
});

/// First schema violation found in a candidate animal
///
/// `Display` is the exact message reported back to clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimalValidationError {
    #[error("invalid {0}: must exist")]
    MissingField(&'static str),
    #[error("invalid {0}: must have a length of at least 1")]
    BlankText(&'static str),
    #[error("invalid description: must contain at least 2 items")]
    DescriptionTooShort,
    #[error("invalid images: must not be empty")]
    NoImages,
    #[error("invalid events: must not be empty")]
    NoEvents,
    #[error("invalid event: must contain a name")]
    EventName { index: usize },
    #[error("invalid event: must contain a date in the format mm/dd/yyyy")]
    EventDate { index: usize },
    #[error("invalid event: must contain a url")]
    EventUrl { index: usize },
}

impl AnimalValidationError {
    /// Position of the offending event, for event-level violations
    pub fn event_index(&self) -> Option<usize> {
        match self {
            Self::EventName { index } | Self::EventDate { index } | Self::EventUrl { index } => {
                Some(*index)
            }
            _ => None,
        }
    }
}

/// Result type for animal validation
pub type AnimalValidationResult<T> = Result<T, AnimalValidationError>;

/// Check a candidate against the animal schema without building a record.
///
/// # Examples
///
/// ```
/// use animal_registry::validation::animal::validate_animal;
/// use serde_json::json;
///
/// let fox = json!({
///     "name": "Fox",
///     "sciName": "Vulpes vulpes",
///     "description": ["a", "b"],
///     "images": ["img1"],
///     "events": [{"name": "Sighting", "date": "05/01/2023", "url": "http://x"}]
/// });
/// assert!(validate_animal(&fox).is_ok());
///
/// let err = validate_animal(&json!({"name": "Fox"})).unwrap_err();
/// assert_eq!(err.to_string(), "invalid sciName: must exist");
/// ```
pub fn validate_animal(candidate: &Value) -> AnimalValidationResult<()> {
    check_schema(candidate).map(|_| ())
}

/// Validate a candidate and convert it into a typed `NewAnimal`.
///
/// Any `id` or `createdByUser` keys in the candidate are ignored. Items of
/// `description` and `images` must be strings; a non-string item is reported
/// with that field's message.
pub fn parse_animal(candidate: &Value) -> AnimalValidationResult<NewAnimal> {
    let checked = check_schema(candidate)?;

    let description = string_items(checked.description)
        .ok_or(AnimalValidationError::DescriptionTooShort)?;
    let images = string_items(checked.images).ok_or(AnimalValidationError::NoImages)?;

    Ok(NewAnimal {
        name: checked.name.to_string(),
        sci_name: checked.sci_name.to_string(),
        description,
        images,
        events: checked.events,
    })
}

/// Borrowed view of a candidate that passed every schema check
struct CheckedAnimal<'a> {
    name: &'a str,
    sci_name: &'a str,
    description: &'a [Value],
    images: &'a [Value],
    events: Vec<AnimalEvent>,
}

fn check_schema(candidate: &Value) -> AnimalValidationResult<CheckedAnimal<'_>> {
    // A non-object has none of the required fields.
    let Some(object) = candidate.as_object() else {
        return Err(AnimalValidationError::MissingField(REQUIRED_FIELDS[0]));
    };

    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            return Err(AnimalValidationError::MissingField(field));
        }
    }

    let name = non_blank_str(&object["name"]).ok_or(AnimalValidationError::BlankText("name"))?;
    let sci_name =
        non_blank_str(&object["sciName"]).ok_or(AnimalValidationError::BlankText("sciName"))?;

    let description = object["description"]
        .as_array()
        .filter(|items| items.len() >= MIN_DESCRIPTION_ITEMS)
        .ok_or(AnimalValidationError::DescriptionTooShort)?;

    let images = object["images"]
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or(AnimalValidationError::NoImages)?;

    let raw_events = object["events"]
        .as_array()
        .filter(|items| !items.is_empty())
        .ok_or(AnimalValidationError::NoEvents)?;

    let events = raw_events
        .iter()
        .enumerate()
        .map(|(index, event)| check_event(index, event))
        .collect::<AnimalValidationResult<Vec<_>>>()?;

    Ok(CheckedAnimal {
        name,
        sci_name,
        description,
        images,
        events,
    })
}

fn check_event(index: usize, event: &Value) -> AnimalValidationResult<AnimalEvent> {
    let name = event
        .get("name")
        .and_then(non_blank_str)
        .ok_or(AnimalValidationError::EventName { index })?;

    let date = event
        .get("date")
        .and_then(Value::as_str)
        .filter(|date| is_valid_event_date(date))
        .ok_or(AnimalValidationError::EventDate { index })?;

    let url = event
        .get("url")
        .and_then(non_blank_str)
        .ok_or(AnimalValidationError::EventUrl { index })?;

    Ok(AnimalEvent {
        name: name.to_string(),
        date: date.to_string(),
        url: url.to_string(),
    })
}

/// Whether `date` is shaped like `mm/dd/yyyy` with month 01-12 and day 01-31
pub fn is_valid_event_date(date: &str) -> bool {
    EVENT_DATE_REGEX.is_match(date)
}

fn non_blank_str(value: &Value) -> Option<&str> {
    value
        .as_str()
        .filter(|text| !text.trim_matches(is_blank_char).is_empty())
}

/// Characters that do not count as text in a required field
///
/// Unicode white space plus the byte order mark, except U+0085 (NEL), the
/// same set ECMAScript `String.prototype.trim` removes.
fn is_blank_char(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{0085}')
}

fn string_items(items: &[Value]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
