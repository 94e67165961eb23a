//! Session properties.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};

use crate::error::OptimizerError;

/// Session of a query. A session provides the time zone and the properties
/// the expressions of the query are evaluated with.
#[derive(Debug, Clone)]
pub struct Session {
    time_zone: FixedOffset,
    system_properties: HashMap<String, String>,
}

impl Session {
    /// Creates a builder for a session.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// The time zone of the session.
    pub fn time_zone(&self) -> &FixedOffset {
        &self.time_zone
    }

    /// Returns a raw value of the given system property.
    pub fn raw_system_property(&self, name: &str) -> Option<&str> {
        self.system_properties.get(name).map(|s| s.as_str())
    }

    /// Returns a value of the given system property converted to the type `T`.
    /// Returns `Ok(None)` if the property has not been set and an error if the value can not be converted.
    pub fn system_property<T>(&self, name: &str) -> Result<Option<T>, OptimizerError>
    where
        T: FromStr,
    {
        match self.system_properties.get(name) {
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|_| OptimizerError::argument(format!("Invalid value of system property {}: {}", name, value))),
            None => Ok(None),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        SessionBuilder::new().build()
    }
}

/// Builds a [Session].
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    time_zone: FixedOffset,
    system_properties: HashMap<String, String>,
}

impl SessionBuilder {
    /// Creates a builder of a session in UTC time zone.
    pub fn new() -> Self {
        SessionBuilder {
            time_zone: utc_offset(),
            system_properties: HashMap::new(),
        }
    }

    /// Sets the time zone of the session.
    pub fn time_zone(mut self, time_zone: FixedOffset) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Sets the time zone of the session as an offset from UTC in seconds.
    /// Returns an error if the offset is out of bounds.
    pub fn time_zone_offset_seconds(self, seconds: i32) -> Result<Self, OptimizerError> {
        match FixedOffset::east_opt(seconds) {
            Some(offset) => Ok(self.time_zone(offset)),
            None => Err(OptimizerError::argument(format!("Invalid time zone offset: {}s", seconds))),
        }
    }

    /// Sets a system property.
    pub fn set_system_property(mut self, name: &str, value: &str) -> Self {
        self.system_properties.insert(name.into(), value.into());
        self
    }

    /// Creates a session.
    pub fn build(self) -> Session {
        Session {
            time_zone: self.time_zone,
            system_properties: self.system_properties,
        }
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        SessionBuilder::new()
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
