use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;

use crate::datatypes::DataType;

/// Runtime values produced by evaluation of constant expressions.
///
/// Two values are equal when their runtime representations are equal. Values of
/// `TimestampWithTimeZone` are equal when they denote the same instant. `Float64` values
/// are equal when they have the same bit pattern, so `-0.0` and `0.0` are different values
/// and all `NaN`s are the same value.
#[derive(Debug, Clone)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(OrderedFloat<f64>),
    String(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampWithTimeZone(DateTime<FixedOffset>),
}

impl ScalarValue {
    /// Returns `true` if this is SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// Checks whether this value is a value of the given type. `NULL` is a value of every type.
    pub fn conforms_to(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (ScalarValue::Null, _) => true,
            (ScalarValue::Bool(_), DataType::Bool) => true,
            (ScalarValue::Int32(_), DataType::Int32) => true,
            (ScalarValue::Int64(_), DataType::Int64) => true,
            (ScalarValue::Float64(_), DataType::Float64) => true,
            (ScalarValue::String(_), DataType::String) => true,
            (ScalarValue::Date(_), DataType::Date) => true,
            (ScalarValue::Timestamp(_), DataType::Timestamp(_)) => true,
            (ScalarValue::TimestampWithTimeZone(_), DataType::TimestampWithTimeZone(_)) => true,
            _ => false,
        }
    }

    /// Returns the name of the kind of this value. Used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ScalarValue::Null => "null",
            ScalarValue::Bool(_) => "bool",
            ScalarValue::Int32(_) => "int32",
            ScalarValue::Int64(_) => "int64",
            ScalarValue::Float64(_) => "float64",
            ScalarValue::String(_) => "string",
            ScalarValue::Date(_) => "date",
            ScalarValue::Timestamp(_) => "timestamp",
            ScalarValue::TimestampWithTimeZone(_) => "timestamp with time zone",
        }
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScalarValue::Null, ScalarValue::Null) => true,
            (ScalarValue::Bool(l), ScalarValue::Bool(r)) => l == r,
            (ScalarValue::Int32(l), ScalarValue::Int32(r)) => l == r,
            (ScalarValue::Int64(l), ScalarValue::Int64(r)) => l == r,
            (ScalarValue::Float64(l), ScalarValue::Float64(r)) => float_bits(l) == float_bits(r),
            (ScalarValue::String(l), ScalarValue::String(r)) => l == r,
            (ScalarValue::Date(l), ScalarValue::Date(r)) => l == r,
            (ScalarValue::Timestamp(l), ScalarValue::Timestamp(r)) => l == r,
            (ScalarValue::TimestampWithTimeZone(l), ScalarValue::TimestampWithTimeZone(r)) => l == r,
            _ => false,
        }
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ScalarValue::Null => {}
            ScalarValue::Bool(v) => v.hash(state),
            ScalarValue::Int32(v) => v.hash(state),
            ScalarValue::Int64(v) => v.hash(state),
            ScalarValue::Float64(v) => float_bits(v).hash(state),
            ScalarValue::String(v) => v.hash(state),
            ScalarValue::Date(v) => v.hash(state),
            ScalarValue::Timestamp(v) => v.hash(state),
            // hashes the UTC date-time
            ScalarValue::TimestampWithTimeZone(v) => v.hash(state),
        }
    }
}

fn float_bits(value: &OrderedFloat<f64>) -> u64 {
    if value.0.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.0.to_bits()
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(OrderedFloat(value))
    }
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Bool(value) => write!(f, "{}", value),
            ScalarValue::Int32(value) => write!(f, "{}", value),
            ScalarValue::Int64(value) => write!(f, "{}", value),
            ScalarValue::Float64(value) => write!(f, "{}", value),
            ScalarValue::String(value) => write!(f, "'{}'", value),
            ScalarValue::Date(value) => write!(f, "DATE '{}'", value.format("%Y-%m-%d")),
            ScalarValue::Timestamp(value) => write!(f, "TIMESTAMP '{}'", value.format("%Y-%m-%d %H:%M:%S%.f")),
            ScalarValue::TimestampWithTimeZone(value) => {
                write!(f, "TIMESTAMP '{}'", value.format("%Y-%m-%d %H:%M:%S%.f %:z"))
            }
        }
    }
}
