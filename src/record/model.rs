// src/record/model.rs

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::warn;

/// One task as stored on disk.
///
/// Mirrors files such as:
///
/// ```json
/// {
///   "task": "Clean data",
///   "description": "Normalise the raw exports",
///   "id": 1,
///   "group": "EEEE",
///   "owner": "Steven",
///   "depends_on": ["AAAA3", "Fetch data"],
///   "updates": []
/// }
/// ```
///
/// Every known field is read leniently: `null` or a value of the wrong type
/// falls back to the field's default instead of rejecting the document.
/// Fields this crate does not know about are kept in `extra` and written back
/// after the known ones, in their original order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task name; used as the node label.
    #[serde(default, deserialize_with = "lenient_string")]
    pub task: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    /// Id within `group`. Together they form the `group+id` reference.
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,

    #[serde(
        default,
        deserialize_with = "lenient_group",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<String>,

    #[serde(default = "default_owner", deserialize_with = "lenient_owner")]
    pub owner: String,

    /// Raw dependency references exactly as written by the user.
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub depends_on: Vec<String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub updates: Vec<Update>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub fn default_owner() -> String {
    "Steven".to_string()
}

impl Default for TaskRecord {
    fn default() -> Self {
        Self {
            task: String::new(),
            description: String::new(),
            id: None,
            group: None,
            owner: default_owner(),
            depends_on: Vec::new(),
            updates: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl TaskRecord {
    /// The `group+id` reference form (e.g. `"EEEE1"`), if both are set.
    pub fn group_id(&self) -> Option<String> {
        let id = self.id.as_ref().map(RecordId::to_string);
        group_id_reference(self.group.as_deref(), id.as_deref())
    }
}

pub(crate) fn group_id_reference(group: Option<&str>, id: Option<&str>) -> Option<String> {
    match (group, id) {
        (Some(group), Some(id)) => Some(format!("{group}{id}")),
        _ => None,
    }
}

/// A task id exactly as written: `1` and `"007"` both occur in the wild.
///
/// References are built from the written text, so `"007"` in group `G`
/// is referenced as `"G007"`, never `"G7"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(Number),
    Text(String),
}

impl RecordId {
    /// Numbers and strings are ids; anything else is not.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self::Number(Number::from(id))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Group names are strings; numbers and booleans are taken by their text.
pub fn group_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A progress note on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub author: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub note: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub attachments: Vec<Attachment>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Update {
    /// New update stamped with the current UTC time, second precision.
    pub fn new(author: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            timestamp: utc_timestamp_now(),
            author: author.into(),
            note: note.into(),
            attachments: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Named text attached to an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(
        rename = "type",
        default = "default_attachment_type",
        deserialize_with = "lenient_attachment_type"
    )]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_attachment_type() -> String {
    "text/plain".to_string()
}

impl Attachment {
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: default_attachment_type(),
            content: content.into(),
            extra: Map::new(),
        }
    }
}

fn utc_timestamp_now() -> String {
    let now = OffsetDateTime::now_utc();
    let now = now.replace_nanosecond(0).unwrap_or(now);
    now.format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// `null` and non-string values read as `None`.
fn string_or_none<'de, D>(deserializer: D, field: &str) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        Value::Null => Ok(None),
        other => {
            warn!(field, value = %other, "expected a string; ignoring value");
            Ok(None)
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_none(deserializer, "string")?.unwrap_or_default())
}

fn lenient_owner<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_none(deserializer, "owner")?.unwrap_or_else(default_owner))
}

fn lenient_attachment_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_none(deserializer, "type")?.unwrap_or_else(default_attachment_type))
}

fn lenient_group<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let group = group_from_value(&value);
    if group.is_none() && !value.is_null() {
        warn!(value = %value, "group is not a scalar; ignoring it");
    }
    Ok(group)
}

/// String entries of a `depends_on` value; anything but a list reads as empty.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => {
            let refs: Vec<String> = items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect();
            if refs.len() != items.len() {
                warn!(
                    dropped = items.len() - refs.len(),
                    "depends_on contains non-string entries; ignoring them"
                );
            }
            refs
        }
        Value::Null => Vec::new(),
        other => {
            warn!(value = %other, "depends_on is not a list; treating as empty");
            Vec::new()
        }
    }
}

/// `depends_on` that is not a list is read as empty; non-string entries are dropped.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_list(&value))
}

/// Accepts numbers and strings, keeping the written form.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let id = RecordId::from_value(&value);
    if id.is_none() && !value.is_null() {
        warn!(value = %value, "id is neither a number nor a string; ignoring it");
    }
    Ok(id)
}

/// List entries that do not deserialize (e.g. an update that is not an object)
/// are dropped rather than failing the whole record.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!(value = %other, "expected a list; treating as empty");
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "unreadable list entry; dropping it");
                None
            }
        })
        .collect())
}
