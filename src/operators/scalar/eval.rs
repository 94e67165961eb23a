//! Evaluation of constant expressions.

use std::convert::TryFrom;
use std::fmt::Debug;

use chrono::{DateTime, Duration, DurationRound, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use ordered_float::OrderedFloat;

use crate::datatypes::{DataType, TimestampPrecision};
use crate::error::OptimizerError;
use crate::operators::scalar::expr::{BinaryOp, ScalarExpr};
use crate::operators::scalar::value::ScalarValue;
use crate::session::Session;

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];
const TIMESTAMP_TZ_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f %:z",
    "%Y-%m-%d %H:%M:%S %:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Evaluates constant expressions.
pub trait ConstantExpressionEvaluator: Debug + Send + Sync {
    /// Evaluates the given constant expression `expr` to a value of the type `data_type`.
    ///
    /// Returns an error if the expression is not constant, if it can not be evaluated or
    /// if its value does not conform to the given type.
    fn evaluate(&self, expr: &ScalarExpr, data_type: &DataType, session: &Session) -> Result<ScalarValue, OptimizerError>;
}

/// [ConstantExpressionEvaluator] that folds literals, casts and arithmetic expressions.
///
/// Values are implicitly coerced to the expected type only when the conversion is lossless
/// (`int32 -> int64`, integer types to `float64` and `NULL` to any type).
#[derive(Debug, Default)]
pub struct SimpleConstantEvaluator;

impl SimpleConstantEvaluator {
    pub fn new() -> Self {
        SimpleConstantEvaluator
    }
}

impl ConstantExpressionEvaluator for SimpleConstantEvaluator {
    fn evaluate(&self, expr: &ScalarExpr, data_type: &DataType, session: &Session) -> Result<ScalarValue, OptimizerError> {
        if let DataType::Unknown = data_type {
            let message = format!("Expr {}: type {} has no literal representation", expr, data_type);
            return Err(OptimizerError::internal(message));
        }
        if !expr.is_constant() {
            return Err(OptimizerError::internal(format!("Expr {} is not a constant expression", expr)));
        }
        let value = eval_expr(expr, session)?;
        coerce(value, data_type).map_err(|value| {
            let message = format!(
                "Expr {}: value {} of type {} does not conform to type {}",
                expr,
                value,
                value.kind(),
                data_type
            );
            OptimizerError::internal(message)
        })
    }
}

fn eval_expr(expr: &ScalarExpr, session: &Session) -> Result<ScalarValue, OptimizerError> {
    match expr {
        ScalarExpr::Literal(value) => Ok(value.clone()),
        ScalarExpr::Column(symbol) => Err(OptimizerError::internal(format!("Unexpected column reference: {}", symbol))),
        ScalarExpr::Cast { expr, data_type } => {
            let value = eval_expr(expr, session)?;
            cast(value, data_type, session)
        }
        ScalarExpr::Negation(expr) => {
            let value = eval_expr(expr, session)?;
            negate(value)
        }
        ScalarExpr::BinaryExpr { lhs, op, rhs } => {
            let lhs = eval_expr(lhs, session)?;
            let rhs = eval_expr(rhs, session)?;
            eval_arithmetic(lhs, *op, rhs)
        }
    }
}

/// Converts the given value to a value of the given type if the conversion does not lose information.
/// Returns the value back if such conversion does not exist.
fn coerce(value: ScalarValue, data_type: &DataType) -> Result<ScalarValue, ScalarValue> {
    match (value, data_type) {
        (ScalarValue::Null, _) => Ok(ScalarValue::Null),
        (ScalarValue::Int32(v), DataType::Int64) => Ok(ScalarValue::Int64(v.into())),
        (ScalarValue::Int32(v), DataType::Float64) => Ok(ScalarValue::from(f64::from(v))),
        (ScalarValue::Int64(v), DataType::Float64) => Ok(ScalarValue::from(v as f64)),
        (ScalarValue::Timestamp(v), DataType::Timestamp(p)) => match round_timestamp(v, *p) {
            Ok(v) => Ok(ScalarValue::Timestamp(v)),
            Err(_) => Err(ScalarValue::Timestamp(v)),
        },
        (ScalarValue::TimestampWithTimeZone(v), DataType::TimestampWithTimeZone(p)) => {
            match round_timestamp_tz(v, *p) {
                Ok(v) => Ok(ScalarValue::TimestampWithTimeZone(v)),
                Err(_) => Err(ScalarValue::TimestampWithTimeZone(v)),
            }
        }
        (value, data_type) if value.conforms_to(data_type) => Ok(value),
        (value, _) => Err(value),
    }
}

fn negate(value: ScalarValue) -> Result<ScalarValue, OptimizerError> {
    match value {
        ScalarValue::Null => Ok(ScalarValue::Null),
        ScalarValue::Int32(v) => v.checked_neg().map(ScalarValue::Int32).ok_or_else(|| overflow("-", &v)),
        ScalarValue::Int64(v) => v.checked_neg().map(ScalarValue::Int64).ok_or_else(|| overflow("-", &v)),
        ScalarValue::Float64(v) => Ok(ScalarValue::Float64(-v)),
        _ => Err(OptimizerError::internal(format!("Unable to negate a value of type {}: {}", value.kind(), value))),
    }
}

fn eval_arithmetic(lhs: ScalarValue, op: BinaryOp, rhs: ScalarValue) -> Result<ScalarValue, OptimizerError> {
    match (lhs, rhs) {
        (ScalarValue::Null, _) | (_, ScalarValue::Null) => Ok(ScalarValue::Null),
        (ScalarValue::Int32(l), ScalarValue::Int32(r)) => {
            let result = match op {
                BinaryOp::Plus => l.checked_add(r),
                BinaryOp::Minus => l.checked_sub(r),
                BinaryOp::Multiply => l.checked_mul(r),
                BinaryOp::Divide => return int_div(l.into(), r.into(), op).and_then(to_int32),
                BinaryOp::Modulo => return int_div(l.into(), r.into(), op).and_then(to_int32),
            };
            result.map(ScalarValue::Int32).ok_or_else(|| overflow(op, &(l, r)))
        }
        (l @ ScalarValue::Int32(_), r @ ScalarValue::Int64(_))
        | (l @ ScalarValue::Int64(_), r @ ScalarValue::Int32(_))
        | (l @ ScalarValue::Int64(_), r @ ScalarValue::Int64(_)) => {
            let l = as_i64(&l)?;
            let r = as_i64(&r)?;
            let result = match op {
                BinaryOp::Plus => l.checked_add(r),
                BinaryOp::Minus => l.checked_sub(r),
                BinaryOp::Multiply => l.checked_mul(r),
                BinaryOp::Divide | BinaryOp::Modulo => return int_div(l, r, op),
            };
            result.map(ScalarValue::Int64).ok_or_else(|| overflow(op, &(l, r)))
        }
        (l, r) if is_numeric(&l) && is_numeric(&r) => {
            let l = as_f64(&l)?;
            let r = as_f64(&r)?;
            let result = match op {
                BinaryOp::Plus => l + r,
                BinaryOp::Minus => l - r,
                BinaryOp::Multiply => l * r,
                BinaryOp::Divide => l / r,
                BinaryOp::Modulo => l % r,
            };
            Ok(ScalarValue::from(result))
        }
        (l, r) => {
            let message = format!("No operator {} for {} {} {}", op, l.kind(), op, r.kind());
            Err(OptimizerError::internal(message))
        }
    }
}

fn int_div(l: i64, r: i64, op: BinaryOp) -> Result<ScalarValue, OptimizerError> {
    if r == 0 {
        return Err(OptimizerError::internal(format!("Division by zero: {} {} {}", l, op, r)));
    }
    let result = match op {
        BinaryOp::Modulo => l.checked_rem(r),
        _ => l.checked_div(r),
    };
    result.map(ScalarValue::Int64).ok_or_else(|| overflow(op, &(l, r)))
}

fn to_int32(value: ScalarValue) -> Result<ScalarValue, OptimizerError> {
    match value {
        ScalarValue::Int64(v) => i32::try_from(v).map(ScalarValue::Int32).map_err(|_| overflow("int32", &v)),
        _ => Ok(value),
    }
}

fn cast(value: ScalarValue, data_type: &DataType, session: &Session) -> Result<ScalarValue, OptimizerError> {
    if value.is_null() {
        return Ok(ScalarValue::Null);
    }
    let invalid_cast = |value: &ScalarValue| {
        OptimizerError::internal(format!("Unable to cast {} of type {} to {}", value, value.kind(), data_type))
    };

    match data_type {
        DataType::Unknown => Err(invalid_cast(&value)),
        DataType::Bool => match &value {
            ScalarValue::Bool(_) => Ok(value),
            ScalarValue::Int32(_) | ScalarValue::Int64(_) => Ok(ScalarValue::Bool(as_i64(&value)? != 0)),
            ScalarValue::String(s) => match s.trim().to_lowercase().as_str() {
                "true" => Ok(ScalarValue::Bool(true)),
                "false" => Ok(ScalarValue::Bool(false)),
                _ => Err(invalid_cast(&value)),
            },
            _ => Err(invalid_cast(&value)),
        },
        DataType::Int32 | DataType::Int64 => {
            let result = match &value {
                ScalarValue::Bool(v) => Some(i64::from(*v)),
                ScalarValue::Int32(_) | ScalarValue::Int64(_) => Some(as_i64(&value)?),
                ScalarValue::Float64(v) => float_to_i64(v.0),
                ScalarValue::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            match (result, data_type) {
                (Some(v), DataType::Int32) => i32::try_from(v).map(ScalarValue::Int32).map_err(|_| invalid_cast(&value)),
                (Some(v), _) => Ok(ScalarValue::Int64(v)),
                (None, _) => Err(invalid_cast(&value)),
            }
        }
        DataType::Float64 => match &value {
            ScalarValue::Bool(v) => Ok(ScalarValue::from(if *v { 1.0 } else { 0.0 })),
            ScalarValue::Int32(_) | ScalarValue::Int64(_) | ScalarValue::Float64(_) => {
                Ok(ScalarValue::from(as_f64(&value)?))
            }
            ScalarValue::String(s) => match s.trim().parse::<f64>() {
                Ok(v) => Ok(ScalarValue::from(v)),
                Err(_) => Err(invalid_cast(&value)),
            },
            _ => Err(invalid_cast(&value)),
        },
        DataType::String => {
            let s = match &value {
                ScalarValue::String(s) => s.clone(),
                ScalarValue::Date(v) => v.format(DATE_FORMAT).to_string(),
                ScalarValue::Timestamp(v) => v.format(TIMESTAMP_FORMATS[0]).to_string(),
                ScalarValue::TimestampWithTimeZone(v) => v.format(TIMESTAMP_TZ_FORMATS[0]).to_string(),
                ScalarValue::Float64(v) => v.to_string(),
                ScalarValue::Bool(v) => v.to_string(),
                ScalarValue::Int32(v) => v.to_string(),
                ScalarValue::Int64(v) => v.to_string(),
                ScalarValue::Null => unreachable!("null values are handled above"),
            };
            Ok(ScalarValue::String(s))
        }
        DataType::Date => match &value {
            ScalarValue::Date(_) => Ok(value),
            ScalarValue::Timestamp(v) => Ok(ScalarValue::Date(v.date())),
            ScalarValue::TimestampWithTimeZone(v) => Ok(ScalarValue::Date(v.naive_local().date())),
            ScalarValue::String(s) => match NaiveDate::parse_from_str(s.trim(), DATE_FORMAT) {
                Ok(v) => Ok(ScalarValue::Date(v)),
                Err(_) => Err(invalid_cast(&value)),
            },
            _ => Err(invalid_cast(&value)),
        },
        DataType::Timestamp(precision) => {
            let result = match &value {
                ScalarValue::Timestamp(v) => Some(*v),
                ScalarValue::Date(v) => v.and_hms_opt(0, 0, 0),
                ScalarValue::TimestampWithTimeZone(v) => Some(v.naive_local()),
                ScalarValue::String(s) => parse_timestamp(s.trim()),
                _ => None,
            };
            match result {
                Some(v) => round_timestamp(v, *precision).map(ScalarValue::Timestamp),
                None => Err(invalid_cast(&value)),
            }
        }
        DataType::TimestampWithTimeZone(precision) => {
            let time_zone = session.time_zone();
            let result = match &value {
                ScalarValue::TimestampWithTimeZone(v) => Some(*v),
                ScalarValue::Timestamp(v) => in_time_zone(v, time_zone),
                ScalarValue::Date(v) => v.and_hms_opt(0, 0, 0).and_then(|v| in_time_zone(&v, time_zone)),
                ScalarValue::String(s) => {
                    let s = s.trim();
                    match parse_timestamp_tz(s) {
                        Some(v) => Some(v),
                        None => parse_timestamp(s).and_then(|v| in_time_zone(&v, time_zone)),
                    }
                }
                _ => None,
            };
            match result {
                Some(v) => round_timestamp_tz(v, *precision).map(ScalarValue::TimestampWithTimeZone),
                None => Err(invalid_cast(&value)),
            }
        }
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| NaiveDate::parse_from_str(s, DATE_FORMAT).ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn parse_timestamp_tz(s: &str) -> Option<DateTime<FixedOffset>> {
    TIMESTAMP_TZ_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(s, format).ok())
}

fn in_time_zone(value: &NaiveDateTime, time_zone: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    // A fixed offset maps every local time to exactly one instant.
    time_zone.from_local_datetime(value).single()
}

fn precision_unit(precision: TimestampPrecision) -> Duration {
    match precision {
        TimestampPrecision::Millis => Duration::microseconds(1000),
        TimestampPrecision::Micros => Duration::microseconds(1),
    }
}

/// Rounds the given timestamp to the given precision. Ties are rounded up.
fn round_timestamp(value: NaiveDateTime, precision: TimestampPrecision) -> Result<NaiveDateTime, OptimizerError> {
    value
        .duration_round(precision_unit(precision))
        .map_err(|e| OptimizerError::internal(format!("Unable to round timestamp {}: {}", value, e)))
}

fn round_timestamp_tz(
    value: DateTime<FixedOffset>,
    precision: TimestampPrecision,
) -> Result<DateTime<FixedOffset>, OptimizerError> {
    value
        .duration_round(precision_unit(precision))
        .map_err(|e| OptimizerError::internal(format!("Unable to round timestamp {}: {}", value, e)))
}

fn float_to_i64(value: f64) -> Option<i64> {
    let rounded = value.round();
    // i64::MAX as f64 is 2^63 which is out of range.
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

fn is_numeric(value: &ScalarValue) -> bool {
    matches!(value, ScalarValue::Int32(_) | ScalarValue::Int64(_) | ScalarValue::Float64(_))
}

fn as_i64(value: &ScalarValue) -> Result<i64, OptimizerError> {
    match value {
        ScalarValue::Int32(v) => Ok((*v).into()),
        ScalarValue::Int64(v) => Ok(*v),
        _ => Err(OptimizerError::internal(format!("Expected an integer value but got {}", value))),
    }
}

fn as_f64(value: &ScalarValue) -> Result<f64, OptimizerError> {
    match value {
        ScalarValue::Int32(v) => Ok((*v).into()),
        ScalarValue::Int64(v) => Ok(*v as f64),
        ScalarValue::Float64(OrderedFloat(v)) => Ok(*v),
        _ => Err(OptimizerError::internal(format!("Expected a numeric value but got {}", value))),
    }
}

fn overflow<O, T>(op: O, args: &T) -> OptimizerError
where
    O: std::fmt::Display,
    T: Debug,
{
    OptimizerError::internal(format!("Numeric overflow: {} {:?}", op, args))
}
