//! Projection of typed values onto an ordered numeric domain.

use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

use chrono::{NaiveDate, TimeZone};

use crate::datatypes::{DataType, TimestampPrecision};
use crate::operators::scalar::ScalarValue;
use crate::session::Session;

/// A function that projects a non-`NULL` value of some type to a double.
/// Returns `None` if the value has no projection.
pub type ToDoubleFn = fn(&ScalarValue, &Session) -> Option<f64>;

/// Stores functions that project values of the registered types to doubles.
///
/// A registry is immutable once built and can be shared between threads.
#[derive(Clone)]
pub struct ConversionRegistry {
    conversions: HashMap<DataType, ToDoubleFn>,
}

impl ConversionRegistry {
    /// Creates a builder of an empty registry.
    pub fn builder() -> ConversionRegistryBuilder {
        ConversionRegistryBuilder {
            conversions: HashMap::new(),
        }
    }

    /// Returns the conversion function registered for the given type.
    pub fn get(&self, data_type: &DataType) -> Option<ToDoubleFn> {
        self.conversions.get(data_type).copied()
    }

    /// Returns `true` if this registry has a conversion function for the given type.
    pub fn supports(&self, data_type: &DataType) -> bool {
        self.conversions.contains_key(data_type)
    }
}

/// Conversions of the built-in orderable types.
///
/// * `bool` - `0.0` and `1.0`.
/// * integer types and `float64` - the value itself (`NaN` has no projection).
/// * `date` - the number of days since `1970-01-01`.
/// * `timestamp` - microseconds since the epoch of the date-time taken in the session time zone.
/// * `timestamp with time zone` - microseconds since the epoch.
///
/// Strings and values of the unknown type have no projection.
impl Default for ConversionRegistry {
    fn default() -> Self {
        let mut builder = ConversionRegistry::builder()
            .add(DataType::Bool, bool_to_double)
            .add(DataType::Int32, int32_to_double)
            .add(DataType::Int64, int64_to_double)
            .add(DataType::Float64, float64_to_double)
            .add(DataType::Date, date_to_double);

        for precision in [TimestampPrecision::Millis, TimestampPrecision::Micros].iter() {
            builder = builder
                .add(DataType::Timestamp(*precision), timestamp_to_double)
                .add(DataType::TimestampWithTimeZone(*precision), timestamp_tz_to_double);
        }

        builder.build()
    }
}

impl Debug for ConversionRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<String> = self.conversions.keys().map(|t| t.to_string()).collect();
        types.sort();
        f.debug_struct("ConversionRegistry").field("types", &types).finish()
    }
}

/// A builder of a [ConversionRegistry].
pub struct ConversionRegistryBuilder {
    conversions: HashMap<DataType, ToDoubleFn>,
}

impl ConversionRegistryBuilder {
    /// Registers a conversion function for the given type. Replaces a previously registered function.
    pub fn add(mut self, data_type: DataType, f: ToDoubleFn) -> Self {
        self.conversions.insert(data_type, f);
        self
    }

    /// Creates a registry.
    pub fn build(self) -> ConversionRegistry {
        ConversionRegistry {
            conversions: self.conversions,
        }
    }
}

/// Projects values of a column onto an ordered numeric domain.
#[derive(Debug)]
pub struct DomainConverter<'a> {
    data_type: DataType,
    registry: &'a ConversionRegistry,
    session: &'a Session,
}

impl<'a> DomainConverter<'a> {
    /// Creates a converter of values of the given type.
    pub fn new(data_type: DataType, registry: &'a ConversionRegistry, session: &'a Session) -> Self {
        DomainConverter {
            data_type,
            registry,
            session,
        }
    }

    /// Projects the given value to a double.
    ///
    /// Returns `None` when the type has no numeric projection, the value is `NULL`
    /// or the value is not a value of the converter's type.
    pub fn translate_to_double(&self, value: &ScalarValue) -> Option<f64> {
        if value.is_null() || !value.conforms_to(&self.data_type) {
            return None;
        }
        let f = self.registry.get(&self.data_type)?;
        f(value, self.session)
    }
}

fn bool_to_double(value: &ScalarValue, _session: &Session) -> Option<f64> {
    match value {
        ScalarValue::Bool(true) => Some(1.0),
        ScalarValue::Bool(false) => Some(0.0),
        _ => None,
    }
}

fn int32_to_double(value: &ScalarValue, _session: &Session) -> Option<f64> {
    match value {
        ScalarValue::Int32(v) => Some(*v as f64),
        _ => None,
    }
}

fn int64_to_double(value: &ScalarValue, _session: &Session) -> Option<f64> {
    match value {
        // lossy beyond 2^53
        ScalarValue::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

fn float64_to_double(value: &ScalarValue, _session: &Session) -> Option<f64> {
    match value {
        ScalarValue::Float64(v) if !v.0.is_nan() => Some(v.0),
        _ => None,
    }
}

fn date_to_double(value: &ScalarValue, _session: &Session) -> Option<f64> {
    match value {
        ScalarValue::Date(date) => {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
            Some(date.signed_duration_since(epoch).num_days() as f64)
        }
        _ => None,
    }
}

fn timestamp_to_double(value: &ScalarValue, session: &Session) -> Option<f64> {
    match value {
        ScalarValue::Timestamp(local) => {
            let instant = session.time_zone().from_local_datetime(local).single()?;
            Some(instant.timestamp_micros() as f64)
        }
        _ => None,
    }
}

fn timestamp_tz_to_double(value: &ScalarValue, _session: &Session) -> Option<f64> {
    match value {
        ScalarValue::TimestampWithTimeZone(instant) => Some(instant.timestamp_micros() as f64),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{FixedOffset, NaiveDateTime};

    fn translate(data_type: DataType, value: ScalarValue) -> Option<f64> {
        let registry = ConversionRegistry::default();
        let session = Session::default();
        let converter = DomainConverter::new(data_type, &registry, &session);
        converter.translate_to_double(&value)
    }

    fn timestamp(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap()
    }

    #[test]
    fn test_numeric_types() {
        assert_eq!(translate(DataType::Int32, ScalarValue::Int32(-7)), Some(-7.0));
        assert_eq!(translate(DataType::Int64, ScalarValue::Int64(1 << 40)), Some((1i64 << 40) as f64));
        assert_eq!(translate(DataType::Float64, ScalarValue::from(2.5)), Some(2.5));
        assert_eq!(translate(DataType::Float64, ScalarValue::from(f64::INFINITY)), Some(f64::INFINITY));
        assert_eq!(translate(DataType::Float64, ScalarValue::from(f64::NAN)), None);
        assert_eq!(translate(DataType::Bool, ScalarValue::Bool(true)), Some(1.0));
        assert_eq!(translate(DataType::Bool, ScalarValue::Bool(false)), Some(0.0));
    }

    #[test]
    fn test_lossy_int64() {
        let a = translate(DataType::Int64, ScalarValue::Int64(1 << 53));
        let b = translate(DataType::Int64, ScalarValue::Int64((1 << 53) + 1));
        assert_eq!(a, b, "both values project to the same double");
    }

    #[test]
    fn test_no_projection() {
        assert_eq!(translate(DataType::String, ScalarValue::String("a".into())), None);
        assert_eq!(translate(DataType::Unknown, ScalarValue::Null), None);
        assert_eq!(translate(DataType::Int32, ScalarValue::Null), None);
        assert_eq!(translate(DataType::Int64, ScalarValue::Int32(1)), None, "type mismatch");
    }

    #[test]
    fn test_date() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 11).unwrap();
        assert_eq!(translate(DataType::Date, ScalarValue::Date(date)), Some(10.0));

        let date = NaiveDate::from_ymd_opt(1969, 12, 31).unwrap();
        assert_eq!(translate(DataType::Date, ScalarValue::Date(date)), Some(-1.0));
    }

    #[test]
    fn test_timestamp_depends_on_session_time_zone() {
        let registry = ConversionRegistry::default();
        let data_type = DataType::Timestamp(TimestampPrecision::Millis);
        let value = ScalarValue::Timestamp(timestamp("1970-01-01 01:00:00.5"));

        let utc = Session::default();
        let converter = DomainConverter::new(data_type, &registry, &utc);
        assert_eq!(converter.translate_to_double(&value), Some(3_600_500_000.0));

        let plus_one = Session::builder().time_zone(FixedOffset::east_opt(3600).unwrap()).build();
        let converter = DomainConverter::new(data_type, &registry, &plus_one);
        assert_eq!(converter.translate_to_double(&value), Some(500_000.0));
    }

    #[test]
    fn test_timestamp_with_time_zone() {
        let offset = FixedOffset::east_opt(7200).unwrap();
        let instant = offset.from_local_datetime(&timestamp("1970-01-01 02:00:00.000001")).unwrap();
        let value = ScalarValue::TimestampWithTimeZone(instant);

        let data_type = DataType::TimestampWithTimeZone(TimestampPrecision::Micros);
        assert_eq!(translate(data_type, value), Some(1.0));
    }

    #[test]
    fn test_custom_registry() {
        fn string_len(value: &ScalarValue, _session: &Session) -> Option<f64> {
            match value {
                ScalarValue::String(s) => Some(s.len() as f64),
                _ => None,
            }
        }

        let registry = ConversionRegistry::builder().add(DataType::String, string_len).build();
        let session = Session::default();

        assert!(registry.supports(&DataType::String));
        assert!(!registry.supports(&DataType::Int32));

        let converter = DomainConverter::new(DataType::String, &registry, &session);
        assert_eq!(converter.translate_to_double(&ScalarValue::String("abc".into())), Some(3.0));

        let converter = DomainConverter::new(DataType::Int32, &registry, &session);
        assert_eq!(converter.translate_to_double(&ScalarValue::Int32(1)), None);
    }
}
