//! Cell variants and their canonical (compatible) form.
//!
//! Cells travel as flat JSON objects with a `type` tag. Known tags map to the
//! typed variants below; any other tag becomes [`Cell::Custom`] and keeps its
//! fields as raw JSON for a caller-supplied template to interpret.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::{CellAccessError, FieldKind};

/// Optional visual metadata, passed through untouched
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding_left: Option<f32>,
}

/// Free-form text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

/// Read-only header text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Treat a missing/NaN value as 0
    #[serde(default, skip_serializing_if = "is_false")]
    pub nan_to_zero: bool,
    /// Render 0 as empty text
    #[serde(default, skip_serializing_if = "is_false")]
    pub hide_zero: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unchecked_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

/// Time of day, anchored to a calendar date
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeCell {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_time",
        deserialize_with = "deserialize_time"
    )]
    pub time: Option<NaiveDateTime>,
    /// chrono format pattern overriding the locale's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CellStyle>,
}

/// A cell whose type is only known to a caller-supplied template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomCell {
    pub type_tag: String,
    pub fields: Map<String, Value>,
}

/// A grid cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Cell {
    Text(TextCell),
    Header(HeaderCell),
    Number(NumberCell),
    Checkbox(CheckboxCell),
    Time(TimeCell),
    Custom(CustomCell),
}

/// Borrowed view of one cell field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Str(&'a str),
    Number(f64),
    Bool(bool),
    Time(NaiveDateTime),
    Json(&'a Value),
}

impl FieldValue<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Str(_) => FieldKind::String,
            Self::Number(_) => FieldKind::Number,
            Self::Bool(_) => FieldKind::Boolean,
            Self::Time(_) => FieldKind::Time,
            Self::Json(Value::String(_)) => FieldKind::String,
            Self::Json(Value::Number(_)) => FieldKind::Number,
            Self::Json(Value::Bool(_)) => FieldKind::Boolean,
            Self::Json(_) => FieldKind::Json,
        }
    }
}

/// Types a cell field can be read as.
pub trait CellProperty: Sized {
    const KIND: FieldKind;

    fn from_field(field: &FieldValue<'_>) -> Option<Self>;
}

impl CellProperty for String {
    const KIND: FieldKind = FieldKind::String;

    fn from_field(field: &FieldValue<'_>) -> Option<Self> {
        match field {
            FieldValue::Str(s) => Some((*s).to_string()),
            FieldValue::Json(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

impl CellProperty for f64 {
    const KIND: FieldKind = FieldKind::Number;

    fn from_field(field: &FieldValue<'_>) -> Option<Self> {
        match field {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Json(Value::Number(n)) => n.as_f64(),
            _ => None,
        }
    }
}

impl CellProperty for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn from_field(field: &FieldValue<'_>) -> Option<Self> {
        match field {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Json(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

impl CellProperty for NaiveDateTime {
    const KIND: FieldKind = FieldKind::Time;

    fn from_field(field: &FieldValue<'_>) -> Option<Self> {
        match field {
            FieldValue::Time(t) => Some(*t),
            FieldValue::Json(value) => time_from_json(value),
            _ => None,
        }
    }
}

impl CellProperty for Value {
    const KIND: FieldKind = FieldKind::Json;

    fn from_field(field: &FieldValue<'_>) -> Option<Self> {
        Some(match field {
            FieldValue::Str(s) => Value::String((*s).to_string()),
            FieldValue::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Time(t) => Value::String(format_time_json(t)),
            FieldValue::Json(v) => (*v).clone(),
        })
    }
}

impl Cell {
    pub const TEXT: &'static str = "text";
    pub const HEADER: &'static str = "header";
    pub const NUMBER: &'static str = "number";
    pub const CHECKBOX: &'static str = "checkbox";
    pub const TIME: &'static str = "time";

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextCell {
            text: Some(text.into()),
            ..TextCell::default()
        })
    }

    pub fn header(text: impl Into<String>) -> Self {
        Self::Header(HeaderCell {
            text: Some(text.into()),
            ..HeaderCell::default()
        })
    }

    pub fn number(value: f64) -> Self {
        Self::Number(NumberCell {
            value: Some(value),
            ..NumberCell::default()
        })
    }

    pub fn checkbox(checked: bool) -> Self {
        Self::Checkbox(CheckboxCell {
            checked: Some(checked),
            ..CheckboxCell::default()
        })
    }

    pub fn time(time: NaiveDateTime) -> Self {
        Self::Time(TimeCell {
            time: Some(time),
            ..TimeCell::default()
        })
    }

    pub fn custom(type_tag: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self::Custom(CustomCell {
            type_tag: type_tag.into(),
            fields,
        })
    }

    /// The `type` tag this cell is dispatched on
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Text(_) => Self::TEXT,
            Self::Header(_) => Self::HEADER,
            Self::Number(_) => Self::NUMBER,
            Self::Checkbox(_) => Self::CHECKBOX,
            Self::Time(_) => Self::TIME,
            Self::Custom(c) => &c.type_tag,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Text(c) => c.class_name.as_deref(),
            Self::Header(c) => c.class_name.as_deref(),
            Self::Number(c) => c.class_name.as_deref(),
            Self::Checkbox(c) => c.class_name.as_deref(),
            Self::Time(c) => c.class_name.as_deref(),
            Self::Custom(c) => c.fields.get("className").and_then(Value::as_str),
        }
    }

    pub fn style(&self) -> Option<&CellStyle> {
        match self {
            Self::Text(c) => c.style.as_ref(),
            Self::Header(c) => c.style.as_ref(),
            Self::Number(c) => c.style.as_ref(),
            Self::Checkbox(c) => c.style.as_ref(),
            Self::Time(c) => c.style.as_ref(),
            Self::Custom(_) => None,
        }
    }

    /// Look up a field by its JSON name. Unset optional fields read as absent.
    pub fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        if let Self::Custom(c) = self {
            return c.fields.get(name).filter(|v| !v.is_null()).map(FieldValue::Json);
        }
        if name == "className" {
            return self.class_name().map(FieldValue::Str);
        }
        match (self, name) {
            (Self::Text(c), "text") => c.text.as_deref().map(FieldValue::Str),
            (Self::Text(c), "placeholder") => c.placeholder.as_deref().map(FieldValue::Str),
            (Self::Header(c), "text") => c.text.as_deref().map(FieldValue::Str),
            (Self::Number(c), "value") => c.value.map(FieldValue::Number),
            (Self::Number(c), "nanToZero") => Some(FieldValue::Bool(c.nan_to_zero)),
            (Self::Number(c), "hideZero") => Some(FieldValue::Bool(c.hide_zero)),
            (Self::Checkbox(c), "checked") => c.checked.map(FieldValue::Bool),
            (Self::Checkbox(c), "checkedText") => c.checked_text.as_deref().map(FieldValue::Str),
            (Self::Checkbox(c), "uncheckedText") => {
                c.unchecked_text.as_deref().map(FieldValue::Str)
            }
            (Self::Time(c), "time") => c.time.map(FieldValue::Time),
            (Self::Time(c), "format") => c.format.as_deref().map(FieldValue::Str),
            _ => None,
        }
    }

    /// Typed field access.
    ///
    /// Fails with [`CellAccessError::Missing`] when the variant has no such
    /// field (or it is unset), and [`CellAccessError::WrongKind`] when the
    /// field holds a different kind of value.
    pub fn property<T: CellProperty>(&self, name: &str) -> Result<T, CellAccessError> {
        let field = self.field(name).ok_or_else(|| CellAccessError::Missing {
            field: name.to_string(),
            cell_type: self.type_tag().to_string(),
        })?;
        access(name, &field)
    }
}

fn access<T: CellProperty>(name: &str, field: &FieldValue<'_>) -> Result<T, CellAccessError> {
    T::from_field(field).ok_or_else(|| CellAccessError::WrongKind {
        field: name.to_string(),
        expected: T::KIND,
        found: field.kind(),
    })
}

impl TryFrom<Value> for Cell {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| <serde_json::Error as serde::de::Error>::missing_field("type"))?;

        Ok(match tag.as_str() {
            Self::TEXT => Self::Text(serde_json::from_value(value)?),
            Self::HEADER => Self::Header(serde_json::from_value(value)?),
            Self::NUMBER => Self::Number(serde_json::from_value(value)?),
            Self::CHECKBOX => Self::Checkbox(serde_json::from_value(value)?),
            Self::TIME => Self::Time(serde_json::from_value(value)?),
            _ => {
                let mut fields = match value {
                    Value::Object(map) => map,
                    _ => Map::new(),
                };
                fields.remove("type");
                Self::Custom(CustomCell {
                    type_tag: tag,
                    fields,
                })
            }
        })
    }
}

impl From<Cell> for Value {
    fn from(cell: Cell) -> Self {
        let tag = cell.type_tag().to_string();
        let serialized = match cell {
            Cell::Text(c) => serde_json::to_value(c),
            Cell::Header(c) => serde_json::to_value(c),
            Cell::Number(c) => serde_json::to_value(c),
            Cell::Checkbox(c) => serde_json::to_value(c),
            Cell::Time(c) => serde_json::to_value(c),
            Cell::Custom(c) => Ok(Value::Object(c.fields)),
        };
        let mut map = match serialized {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        map.insert("type".to_string(), Value::String(tag));
        Value::Object(map)
    }
}

/// A cell normalized by its template, carrying `text`/`value` projections
/// used by generic grid logic (sorting, export, comparison).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct CompatibleCell {
    pub cell: Cell,
    pub text: String,
    pub value: f64,
}

impl CompatibleCell {
    pub fn new(cell: Cell, text: impl Into<String>, value: f64) -> Self {
        Self {
            cell,
            text: text.into(),
            value,
        }
    }

    pub fn type_tag(&self) -> &str {
        self.cell.type_tag()
    }

    /// Typed field access that also sees the `text`/`value` projections.
    pub fn property<T: CellProperty>(&self, name: &str) -> Result<T, CellAccessError> {
        match name {
            "text" => access(name, &FieldValue::Str(&self.text)),
            "value" => access(name, &FieldValue::Number(self.value)),
            _ => self.cell.property(name),
        }
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl PartialEq for CompatibleCell {
    fn eq(&self, other: &Self) -> bool {
        self.cell == other.cell
            && self.text == other.text
            && (self.value.to_bits() == other.value.to_bits()
                || (self.value.is_nan() && other.value.is_nan()))
    }
}

impl TryFrom<Value> for CompatibleCell {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let text = value
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let number = value
            .get("value")
            .and_then(Value::as_f64)
            .unwrap_or(f64::NAN);
        let cell = Cell::try_from(value)?;
        Ok(Self {
            cell,
            text,
            value: number,
        })
    }
}

impl From<CompatibleCell> for Value {
    fn from(compatible: CompatibleCell) -> Self {
        let mut value = Value::from(compatible.cell);
        if let Value::Object(map) = &mut value {
            map.insert("text".to_string(), Value::String(compatible.text));
            map.insert(
                "value".to_string(),
                Number::from_f64(compatible.value).map_or(Value::Null, Value::Number),
            );
        }
        value
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

const TIME_JSON_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

fn format_time_json(time: &NaiveDateTime) -> String {
    time.format(TIME_JSON_FORMAT).to_string()
}

/// Accepts ISO-8601 with or without an offset, or epoch milliseconds.
fn time_from_json(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => s
            .parse::<NaiveDateTime>()
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

fn serialize_time<S: Serializer>(
    time: &Option<NaiveDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match time {
        Some(t) => serializer.serialize_str(&format_time_json(t)),
        None => serializer.serialize_none(),
    }
}

/// Malformed times deserialize as absent; normalization supplies the fallback.
fn deserialize_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(time_from_json))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn ten_thirty() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_known_tag_deserializes_to_variant() {
        let cell: Cell = serde_json::from_value(json!({"type": "text", "text": "hi"})).unwrap();
        assert_eq!(cell, Cell::text("hi"));
        assert_eq!(cell.type_tag(), "text");
    }

    #[test]
    fn test_unknown_tag_becomes_custom() {
        let cell: Cell =
            serde_json::from_value(json!({"type": "rating", "stars": 4, "className": "x"}))
                .unwrap();
        let Cell::Custom(custom) = &cell else {
            panic!("expected custom cell");
        };
        assert_eq!(custom.type_tag, "rating");
        assert!(!custom.fields.contains_key("type"));
        assert_eq!(cell.property::<f64>("stars").unwrap(), 4.0);
        assert_eq!(cell.class_name(), Some("x"));

        let back = serde_json::to_value(&cell).unwrap();
        assert_eq!(back["type"], "rating");
        assert_eq!(back["stars"], 4);
    }

    #[test]
    fn test_missing_type_tag_is_error() {
        let result: Result<Cell, _> = serde_json::from_value(json!({"text": "hi"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_property_missing_and_wrong_kind() {
        let cell = Cell::text("abc");
        assert_eq!(cell.property::<String>("text").unwrap(), "abc");

        let err = cell.property::<f64>("text").unwrap_err();
        assert_eq!(
            err,
            CellAccessError::WrongKind {
                field: "text".into(),
                expected: FieldKind::Number,
                found: FieldKind::String,
            }
        );

        let err = cell.property::<NaiveDateTime>("time").unwrap_err();
        assert!(matches!(err, CellAccessError::Missing { .. }));
    }

    #[test]
    fn test_time_field_accepts_offset_and_millis() {
        let cell: Cell =
            serde_json::from_value(json!({"type": "time", "time": "1970-01-01T10:30:00Z"}))
                .unwrap();
        assert_eq!(cell.property::<NaiveDateTime>("time").unwrap(), ten_thirty());

        let cell: Cell =
            serde_json::from_value(json!({"type": "time", "time": 37_800_000})).unwrap();
        assert_eq!(cell.property::<NaiveDateTime>("time").unwrap(), ten_thirty());

        let cell: Cell =
            serde_json::from_value(json!({"type": "time", "time": "garbage"})).unwrap();
        assert!(cell.property::<NaiveDateTime>("time").is_err());
    }

    #[test]
    fn test_compatible_nan_value_serializes_as_null() {
        let cell = CompatibleCell::new(Cell::text("abc"), "abc", f64::NAN);
        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["value"], Value::Null);
        assert_eq!(json["text"], "abc");

        let back: CompatibleCell = serde_json::from_value(json).unwrap();
        assert!(back.value.is_nan());
        assert_eq!(back, cell);
    }

    #[test]
    fn test_compatible_projection_access() {
        let cell = CompatibleCell::new(Cell::time(ten_thirty()), "10:30", 37_800_000.0);
        assert_eq!(cell.property::<String>("text").unwrap(), "10:30");
        assert_eq!(cell.property::<f64>("value").unwrap(), 37_800_000.0);
        assert_eq!(cell.property::<NaiveDateTime>("time").unwrap(), ten_thirty());
    }
}
