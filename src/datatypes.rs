use std::fmt::{Display, Formatter};

/// Logical types of columns and scalar values.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DataType {
    /// The type of an untyped `NULL` literal. Values of this type have no literal representation.
    Unknown,
    Bool,
    Int32,
    Int64,
    Float64,
    String,
    /// Calendar date without a time zone.
    Date,
    /// Date and time without a time zone.
    Timestamp(TimestampPrecision),
    /// An instant in time with the time zone offset it has been specified in.
    TimestampWithTimeZone(TimestampPrecision),
}

/// The number of fractional digits of a timestamp.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TimestampPrecision {
    Millis,
    Micros,
}

impl TimestampPrecision {
    /// Returns the number of fractional digits of seconds.
    pub fn digits(&self) -> u8 {
        match self {
            TimestampPrecision::Millis => 3,
            TimestampPrecision::Micros => 6,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Unknown => write!(f, "unknown"),
            DataType::Bool => write!(f, "bool"),
            DataType::Int32 => write!(f, "int32"),
            DataType::Int64 => write!(f, "int64"),
            DataType::Float64 => write!(f, "float64"),
            DataType::String => write!(f, "string"),
            DataType::Date => write!(f, "date"),
            DataType::Timestamp(p) => write!(f, "timestamp({})", p.digits()),
            DataType::TimestampWithTimeZone(p) => write!(f, "timestamp({}) with time zone", p.digits()),
        }
    }
}
