//! Cell values.
//!
//! Source files disagree on how they encode the same attribute: a release
//! year is an integer in one file and a free-text date in another, a cast is
//! a comma separated string here and a single name there. [`CellValue`] is the
//! tagged union every stage works with so conflict resolution can match on
//! the kind of a value instead of guessing it.

use std::fmt::{self, Write as _};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The kind of a cell, used in logs and conflict prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Text,
    Number,
    Boolean,
    Date,
    MultiValue,
    Missing,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::MultiValue => "multi-value",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed calendar date together with its rendering in the target format.
///
/// Equality follows the rendering, so two dates normalized to a year-only
/// format compare equal when their years match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateValue {
    date: NaiveDate,
    rendered: String,
}

impl DateValue {
    /// Formats `date` with a strftime-style `format`.
    ///
    /// Returns `None` when the format string is invalid for a date.
    pub fn format(date: NaiveDate, format: &str) -> Option<Self> {
        let mut rendered = String::new();
        write!(rendered, "{}", date.format(format)).ok()?;
        Some(Self { date, rendered })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn as_str(&self) -> &str {
        &self.rendered
    }
}

impl PartialEq for DateValue {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(DateValue),
    List(Vec<String>),
    Missing,
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Number(_) => ValueKind::Number,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Date(_) => ValueKind::Date,
            Self::List(_) => ValueKind::MultiValue,
            Self::Missing => ValueKind::Missing,
        }
    }

    /// True for `Missing`, blank text, empty lists and NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Text(value) => value.trim().is_empty(),
            Self::List(values) => values.is_empty(),
            Self::Number(value) => value.is_nan(),
            Self::Boolean(_) | Self::Date(_) => false,
        }
    }

    /// Canonical text rendering used for keys, logs and export.
    pub fn render(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => format_numeric(*value),
            Self::Boolean(true) => "True".to_string(),
            Self::Boolean(false) => "False".to_string(),
            Self::Date(date) => date.as_str().to_string(),
            Self::List(values) => values.join(", "),
            Self::Missing => String::new(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<DateValue> for CellValue {
    fn from(value: DateValue) -> Self {
        Self::Date(value)
    }
}

/// Formats a floating-point number without a trailing fractional zero.
pub fn format_numeric(value: f64) -> String {
    let text = format!("{value}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
