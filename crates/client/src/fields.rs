//! Field editor
//!
//! In-memory edits of the form document. No validation of values and no
//! network traffic; the only rejected edits are the ones that name a field
//! or dependent that does not exist.

use std::fmt;
use std::str::FromStr;

use docintake_protocol::{Dependent, DependentField, PrimaryField, SpouseField};
use tracing::debug;

use crate::error::FieldError;
use crate::state::ClientState;

/// Logical tab of the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Primary,
    Spouse,
    Dependents,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Primary => "Primary",
            Section::Spouse => "Spouse",
            Section::Dependents => "Dependents",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(Section::Primary),
            "spouse" => Ok(Section::Spouse),
            "dependents" | "dependent" => Ok(Section::Dependents),
            _ => Err(FieldError::UnknownSection(s.to_string())),
        }
    }
}

/// One edit to the form document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Primary { field: PrimaryField, value: String },
    Spouse { field: SpouseField, value: String },
    /// Full replacement of the dependent at `index`
    Dependent { index: usize, record: Dependent },
}

impl FieldEdit {
    pub fn section(&self) -> Section {
        match self {
            FieldEdit::Primary { .. } => Section::Primary,
            FieldEdit::Spouse { .. } => Section::Spouse,
            FieldEdit::Dependent { .. } => Section::Dependents,
        }
    }

    /// Build an edit from untyped parts.
    ///
    /// For Primary and Spouse `key` is a field name. For Dependents `key` is
    /// the row index and `value` a JSON object with the full record.
    pub fn parse(section: &str, key: &str, value: &str) -> Result<Self, FieldError> {
        match section.parse::<Section>()? {
            Section::Primary => {
                let field =
                    PrimaryField::from_key(key).ok_or_else(|| FieldError::UnknownField {
                        section: Section::Primary.as_str(),
                        key: key.to_string(),
                    })?;
                Ok(FieldEdit::Primary {
                    field,
                    value: value.to_string(),
                })
            }
            Section::Spouse => {
                let field = SpouseField::from_key(key).ok_or_else(|| FieldError::UnknownField {
                    section: Section::Spouse.as_str(),
                    key: key.to_string(),
                })?;
                Ok(FieldEdit::Spouse {
                    field,
                    value: value.to_string(),
                })
            }
            Section::Dependents => {
                let index = parse_index(key)?;
                let record: Dependent = serde_json::from_str(value)
                    .map_err(|e| FieldError::InvalidRecord(e.to_string()))?;
                Ok(FieldEdit::Dependent { index, record })
            }
        }
    }
}

pub(crate) fn parse_index(key: &str) -> Result<usize, FieldError> {
    key.trim()
        .parse()
        .map_err(|_| FieldError::InvalidIndex(key.to_string()))
}

impl ClientState {
    /// Apply one edit. Out-of-range dependent indices are refused and leave
    /// the document untouched.
    pub fn set_field(&mut self, edit: FieldEdit) -> Result<(), FieldError> {
        let section = edit.section();
        match edit {
            FieldEdit::Primary { field, value } => {
                *self.document.field_mut(field) = value;
            }
            FieldEdit::Spouse { field, value } => {
                *self.document.spouse.field_mut(field) = value;
            }
            FieldEdit::Dependent { index, record } => {
                let len = self.document.dependents.len();
                let slot = self
                    .document
                    .dependents
                    .get_mut(index)
                    .ok_or(FieldError::DependentOutOfRange { index, len })?;
                *slot = record;
            }
        }

        debug!(
            component = "fields",
            event = "fields.edited",
            section = %section,
        );
        Ok(())
    }

    /// Append one blank dependent and return its index.
    pub fn add_dependent(&mut self) -> usize {
        self.document.dependents.push(Dependent::default());
        let index = self.document.dependents.len() - 1;
        debug!(
            component = "fields",
            event = "fields.dependent_added",
            index,
        );
        index
    }

    /// Edit a single column of a dependent: copy the row, change one field,
    /// write the whole row back.
    pub fn set_dependent_field(
        &mut self,
        index: usize,
        field: DependentField,
        value: impl Into<String>,
    ) -> Result<(), FieldError> {
        let mut record = self
            .document
            .dependents
            .get(index)
            .cloned()
            .ok_or(FieldError::DependentOutOfRange {
                index,
                len: self.document.dependents.len(),
            })?;
        *record.field_mut(field) = value.into();
        self.set_field(FieldEdit::Dependent { index, record })
    }
}
