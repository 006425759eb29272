//! Core types shared across the protocol

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// FormDocument
// ---------------------------------------------------------------------------

/// Structured record extracted from an uploaded document.
///
/// Keys on the wire are the human-readable labels the backend emits
/// (`"First Name"`, `"SSN"`, ...). Missing keys deserialize as blank so the
/// struct always carries every scalar; keys the client does not know are kept
/// in `extra` and written back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormDocument {
    #[serde(rename = "First Name", deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(rename = "Last Name", deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(rename = "SSN", deserialize_with = "lenient_string")]
    pub ssn: String,
    #[serde(rename = "Address Line 1", deserialize_with = "lenient_string")]
    pub address_line_1: String,
    #[serde(rename = "Address Line 2", deserialize_with = "lenient_string")]
    pub address_line_2: String,
    #[serde(rename = "City", deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(rename = "State", deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(rename = "Zip", deserialize_with = "lenient_string")]
    pub zip: String,
    #[serde(rename = "Income", deserialize_with = "lenient_string")]
    pub income: String,
    #[serde(rename = "Deductions", deserialize_with = "lenient_string")]
    pub deductions: String,
    #[serde(rename = "Spouse", deserialize_with = "lenient_record")]
    pub spouse: Spouse,
    #[serde(rename = "Dependents", deserialize_with = "lenient_dependents")]
    pub dependents: Vec<Dependent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormDocument {
    /// Parse a backend upload body. Anything but a JSON object is rejected.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(serde_json::Error::custom(format!(
                "expected a JSON object, found {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value)
    }

    pub fn get(&self, field: PrimaryField) -> &str {
        match field {
            PrimaryField::FirstName => &self.first_name,
            PrimaryField::LastName => &self.last_name,
            PrimaryField::Ssn => &self.ssn,
            PrimaryField::AddressLine1 => &self.address_line_1,
            PrimaryField::AddressLine2 => &self.address_line_2,
            PrimaryField::City => &self.city,
            PrimaryField::State => &self.state,
            PrimaryField::Zip => &self.zip,
            PrimaryField::Income => &self.income,
            PrimaryField::Deductions => &self.deductions,
        }
    }

    pub fn field_mut(&mut self, field: PrimaryField) -> &mut String {
        match field {
            PrimaryField::FirstName => &mut self.first_name,
            PrimaryField::LastName => &mut self.last_name,
            PrimaryField::Ssn => &mut self.ssn,
            PrimaryField::AddressLine1 => &mut self.address_line_1,
            PrimaryField::AddressLine2 => &mut self.address_line_2,
            PrimaryField::City => &mut self.city,
            PrimaryField::State => &mut self.state,
            PrimaryField::Zip => &mut self.zip,
            PrimaryField::Income => &mut self.income,
            PrimaryField::Deductions => &mut self.deductions,
        }
    }
}

/// Spouse sub-record (subset of the primary person's fields)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spouse {
    #[serde(rename = "First Name", deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(rename = "Last Name", deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(rename = "SSN", deserialize_with = "lenient_string")]
    pub ssn: String,
}

impl Spouse {
    pub fn get(&self, field: SpouseField) -> &str {
        match field {
            SpouseField::FirstName => &self.first_name,
            SpouseField::LastName => &self.last_name,
            SpouseField::Ssn => &self.ssn,
        }
    }

    pub fn field_mut(&mut self, field: SpouseField) -> &mut String {
        match field {
            SpouseField::FirstName => &mut self.first_name,
            SpouseField::LastName => &mut self.last_name,
            SpouseField::Ssn => &mut self.ssn,
        }
    }
}

/// One row of the dependents table. `Default` is the blank record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependent {
    #[serde(rename = "First Name", deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(rename = "Last Name", deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(rename = "SSN", deserialize_with = "lenient_string")]
    pub ssn: String,
    #[serde(rename = "Relationship", deserialize_with = "lenient_string")]
    pub relationship: String,
    #[serde(rename = "Age", deserialize_with = "lenient_string")]
    pub age: String,
}

impl Dependent {
    pub fn get(&self, field: DependentField) -> &str {
        match field {
            DependentField::FirstName => &self.first_name,
            DependentField::LastName => &self.last_name,
            DependentField::Ssn => &self.ssn,
            DependentField::Relationship => &self.relationship,
            DependentField::Age => &self.age,
        }
    }

    pub fn field_mut(&mut self, field: DependentField) -> &mut String {
        match field {
            DependentField::FirstName => &mut self.first_name,
            DependentField::LastName => &mut self.last_name,
            DependentField::Ssn => &mut self.ssn,
            DependentField::Relationship => &mut self.relationship,
            DependentField::Age => &mut self.age,
        }
    }

    pub fn is_blank(&self) -> bool {
        DependentField::ALL
            .iter()
            .all(|field| self.get(*field).is_empty())
    }
}

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// Scalar keys of the primary person's record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimaryField {
    FirstName,
    LastName,
    Ssn,
    AddressLine1,
    AddressLine2,
    City,
    State,
    Zip,
    Income,
    Deductions,
}

impl PrimaryField {
    pub const ALL: [PrimaryField; 10] = [
        PrimaryField::FirstName,
        PrimaryField::LastName,
        PrimaryField::Ssn,
        PrimaryField::AddressLine1,
        PrimaryField::AddressLine2,
        PrimaryField::City,
        PrimaryField::State,
        PrimaryField::Zip,
        PrimaryField::Income,
        PrimaryField::Deductions,
    ];

    /// Wire/display key
    pub fn key(self) -> &'static str {
        match self {
            PrimaryField::FirstName => "First Name",
            PrimaryField::LastName => "Last Name",
            PrimaryField::Ssn => "SSN",
            PrimaryField::AddressLine1 => "Address Line 1",
            PrimaryField::AddressLine2 => "Address Line 2",
            PrimaryField::City => "City",
            PrimaryField::State => "State",
            PrimaryField::Zip => "Zip",
            PrimaryField::Income => "Income",
            PrimaryField::Deductions => "Deductions",
        }
    }

    /// Accepts the display key (`"First Name"`) or its snake-case form (`first_name`).
    pub fn from_key(key: &str) -> Option<Self> {
        let wanted = normalize_key(key);
        Self::ALL
            .into_iter()
            .find(|field| normalize_key(field.key()) == wanted)
    }
}

/// Scalar keys of the spouse record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpouseField {
    FirstName,
    LastName,
    Ssn,
}

impl SpouseField {
    pub const ALL: [SpouseField; 3] = [
        SpouseField::FirstName,
        SpouseField::LastName,
        SpouseField::Ssn,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SpouseField::FirstName => "First Name",
            SpouseField::LastName => "Last Name",
            SpouseField::Ssn => "SSN",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let wanted = normalize_key(key);
        Self::ALL
            .into_iter()
            .find(|field| normalize_key(field.key()) == wanted)
    }
}

/// Columns of a dependent row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependentField {
    FirstName,
    LastName,
    Ssn,
    Relationship,
    Age,
}

impl DependentField {
    pub const ALL: [DependentField; 5] = [
        DependentField::FirstName,
        DependentField::LastName,
        DependentField::Ssn,
        DependentField::Relationship,
        DependentField::Age,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DependentField::FirstName => "First Name",
            DependentField::LastName => "Last Name",
            DependentField::Ssn => "SSN",
            DependentField::Relationship => "Relationship",
            DependentField::Age => "Age",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let wanted = normalize_key(key);
        Self::ALL
            .into_iter()
            .find(|field| normalize_key(field.key()) == wanted)
    }
}

fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

/// Author of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One immutable message unit in the chat history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub id: String,
    pub role: TurnRole,
    pub content: String,
    /// User turn this assistant turn answers. `None` for user turns and
    /// for replies synthesized locally without a request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

impl TranscriptTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: crate::new_id(),
            role: TurnRole::User,
            content: content.into(),
            reply_to: None,
        }
    }

    pub fn assistant(content: impl Into<String>, reply_to: Option<String>) -> Self {
        Self {
            id: crate::new_id(),
            role: TurnRole::Assistant,
            content: content.into(),
            reply_to,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Scalars arrive as whatever the extraction model produced: strings, numbers,
/// booleans or `null`. All of them are kept as free text; an array or object
/// in a scalar slot is kept as its compact JSON text.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Ok(other.to_string()),
    }
}

/// A nested record that is anything but an object (`""`, `null`, `"none"`)
/// decodes as the blank record.
fn lenient_record<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(D::Error::custom),
        _ => Ok(T::default()),
    }
}

/// A dependents value that is not an array decodes as no dependents;
/// entries that are not objects are skipped.
fn lenient_dependents<'de, D>(deserializer: D) -> Result<Vec<Dependent>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
