//! Simple scalar transformers.

use weft_literal::{Literal, Primitive, Scalar, SimpleType};

use crate::error::{InterchangeError, InterchangeResult};
use crate::native::{NativeType, NativeValue};
use crate::transformer::SimpleTransformer;

fn primitive(literal: &Literal) -> InterchangeResult<&Primitive> {
    literal
        .as_primitive()
        .ok_or_else(|| InterchangeError::conversion("primitive", "literal is not a primitive scalar"))
}

fn encode_int(value: &NativeValue) -> InterchangeResult<Literal> {
    match value {
        NativeValue::Int(i) => Ok(Literal::integer(*i)),
        _ => Err(InterchangeError::conversion(NativeType::Int, "expected an int value")),
    }
}

fn decode_int(literal: &Literal) -> InterchangeResult<NativeValue> {
    match primitive(literal)? {
        Primitive::Integer(i) => Ok(NativeValue::Int(*i)),
        other => Err(InterchangeError::conversion(
            NativeType::Int,
            format!("cannot convert {other:?} to int"),
        )),
    }
}

fn encode_float(value: &NativeValue) -> InterchangeResult<Literal> {
    match value {
        NativeValue::Float(f) => Ok(Literal::float(*f)),
        _ => Err(InterchangeError::conversion(NativeType::Float, "expected a float value")),
    }
}

/// Floats additionally accept integer literals, widening on decode.
fn decode_float(literal: &Literal) -> InterchangeResult<NativeValue> {
    match primitive(literal)? {
        Primitive::Float(f) => Ok(NativeValue::Float(*f)),
        Primitive::Integer(i) => Ok(NativeValue::Float(*i as f64)),
        other => Err(InterchangeError::conversion(
            NativeType::Float,
            format!("cannot convert {other:?} to float"),
        )),
    }
}

fn encode_bool(value: &NativeValue) -> InterchangeResult<Literal> {
    match value {
        NativeValue::Bool(b) => Ok(Literal::boolean(*b)),
        _ => Err(InterchangeError::conversion(NativeType::Bool, "expected a bool value")),
    }
}

fn decode_bool(literal: &Literal) -> InterchangeResult<NativeValue> {
    match primitive(literal)? {
        Primitive::Boolean(b) => Ok(NativeValue::Bool(*b)),
        other => Err(InterchangeError::conversion(
            NativeType::Bool,
            format!("cannot convert {other:?} to bool"),
        )),
    }
}

fn encode_str(value: &NativeValue) -> InterchangeResult<Literal> {
    match value {
        NativeValue::Str(s) => Ok(Literal::string(s.clone())),
        _ => Err(InterchangeError::conversion(NativeType::Str, "expected a str value")),
    }
}

fn decode_str(literal: &Literal) -> InterchangeResult<NativeValue> {
    match primitive(literal)? {
        Primitive::String(s) => Ok(NativeValue::Str(s.clone())),
        other => Err(InterchangeError::conversion(
            NativeType::Str,
            format!("cannot convert {other:?} to str"),
        )),
    }
}

fn encode_datetime(value: &NativeValue) -> InterchangeResult<Literal> {
    match value {
        NativeValue::Datetime(ts) => Ok(Literal::scalar(Scalar::Primitive(Primitive::Datetime(*ts)))),
        _ => Err(InterchangeError::conversion(NativeType::Datetime, "expected a datetime value")),
    }
}

fn decode_datetime(literal: &Literal) -> InterchangeResult<NativeValue> {
    match primitive(literal)? {
        Primitive::Datetime(ts) => Ok(NativeValue::Datetime(*ts)),
        other => Err(InterchangeError::conversion(
            NativeType::Datetime,
            format!("cannot convert {other:?} to datetime"),
        )),
    }
}

fn encode_duration(value: &NativeValue) -> InterchangeResult<Literal> {
    match value {
        NativeValue::Duration(d) => Ok(Literal::scalar(Scalar::Primitive(Primitive::Duration(*d)))),
        _ => Err(InterchangeError::conversion(NativeType::Duration, "expected a duration value")),
    }
}

fn decode_duration(literal: &Literal) -> InterchangeResult<NativeValue> {
    match primitive(literal)? {
        Primitive::Duration(d) => Ok(NativeValue::Duration(*d)),
        other => Err(InterchangeError::conversion(
            NativeType::Duration,
            format!("cannot convert {other:?} to duration"),
        )),
    }
}

fn encode_none(value: &NativeValue) -> InterchangeResult<Literal> {
    match value {
        NativeValue::None => Ok(Literal::none()),
        _ => Err(InterchangeError::conversion(NativeType::None, "expected the none value")),
    }
}

fn decode_none(literal: &Literal) -> InterchangeResult<NativeValue> {
    match literal.as_scalar() {
        Some(Scalar::None) => Ok(NativeValue::None),
        _ => Err(InterchangeError::conversion(
            NativeType::None,
            "literal is not the none scalar",
        )),
    }
}

/// The simple scalar transformers, in registration order.
pub(super) fn transformers() -> Vec<SimpleTransformer> {
    vec![
        SimpleTransformer::new("int", NativeType::Int, SimpleType::Integer, encode_int, decode_int),
        SimpleTransformer::new("float", NativeType::Float, SimpleType::Float, encode_float, decode_float),
        SimpleTransformer::new("bool", NativeType::Bool, SimpleType::Boolean, encode_bool, decode_bool),
        SimpleTransformer::new("str", NativeType::Str, SimpleType::String, encode_str, decode_str),
        SimpleTransformer::new(
            "datetime",
            NativeType::Datetime,
            SimpleType::Datetime,
            encode_datetime,
            decode_datetime,
        ),
        SimpleTransformer::new(
            "duration",
            NativeType::Duration,
            SimpleType::Duration,
            encode_duration,
            decode_duration,
        ),
        SimpleTransformer::new("none", NativeType::None, SimpleType::None, encode_none, decode_none),
    ]
}
