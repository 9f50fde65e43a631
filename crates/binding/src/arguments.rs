//! Call-time argument resolution shared by the URL and body builders.

use std::borrow::Cow;

use crate::{Arg, Args, InvocationError, MethodDescriptor, ParameterBinding};

/// An argument after defaults and nullability have been applied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Effective<'a> {
    Null,
    Text(Cow<'a, str>),
    List(&'a [Option<String>]),
    Map(&'a [(String, String)]),
    Json(&'a serde_json::Value),
}

impl<'a> Effective<'a> {
    /// Scalar string form, or `None` for null. Lists and maps are rejected.
    pub(crate) fn scalar(
        self,
        d: &MethodDescriptor,
        p: &ParameterBinding,
    ) -> Result<Option<Cow<'a, str>>, InvocationError> {
        match self {
            Self::Null => Ok(None),
            Self::Text(s) => Ok(Some(s)),
            Self::Json(v) => json_scalar(v).ok_or_else(|| kind(d, p, "a single value")),
            Self::List(_) | Self::Map(_) => Err(kind(d, p, "a single value")),
        }
    }

    /// One entry per non-null value; a scalar yields a single entry.
    pub(crate) fn values(
        self,
        d: &MethodDescriptor,
        p: &ParameterBinding,
    ) -> Result<Vec<Cow<'a, str>>, InvocationError> {
        match self {
            Self::List(items) => Ok(items
                .iter()
                .flatten()
                .map(|s| Cow::Borrowed(s.as_str()))
                .collect()),
            Self::Json(serde_json::Value::Array(items)) => items
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| json_scalar(v).flatten().ok_or_else(|| kind(d, p, "scalar values")))
                .collect(),
            other => Ok(other.scalar(d, p)?.into_iter().collect()),
        }
    }
}

fn json_scalar(v: &serde_json::Value) -> Option<Option<Cow<'_, str>>> {
    match v {
        serde_json::Value::Null => Some(None),
        serde_json::Value::String(s) => Some(Some(Cow::Borrowed(s.as_str()))),
        serde_json::Value::Bool(b) => Some(Some(Cow::Owned(b.to_string()))),
        serde_json::Value::Number(n) => Some(Some(Cow::Owned(n.to_string()))),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}

pub(crate) fn kind(
    d: &MethodDescriptor,
    p: &ParameterBinding,
    expected: &'static str,
) -> InvocationError {
    InvocationError::ArgumentKind {
        method: d.name.clone(),
        position: p.position,
        role: p.role,
        expected,
    }
}

pub(crate) fn null(d: &MethodDescriptor, p: &ParameterBinding) -> InvocationError {
    InvocationError::NullArgument {
        method: d.name.clone(),
        position: p.position,
        role: p.role,
    }
}

/// Rejects argument lists longer than the method's parameter list.
pub(crate) fn check_count(d: &MethodDescriptor, args: &Args) -> Result<(), InvocationError> {
    if args.len() > d.params.len() {
        return Err(InvocationError::ArgumentCount {
            method: d.name.clone(),
            expected: d.params.len(),
            found: args.len(),
        });
    }
    Ok(())
}

/// Reads the argument for `p`, substituting its default when omitted and
/// enforcing nullability.
pub(crate) fn effective<'a>(
    d: &MethodDescriptor,
    p: &'a ParameterBinding,
    args: &'a Args,
) -> Result<Effective<'a>, InvocationError> {
    let value = match args.get(p.position) {
        Arg::Omitted => p
            .default
            .as_deref()
            .map_or(Effective::Null, |s| Effective::Text(Cow::Borrowed(s))),
        Arg::Null => Effective::Null,
        Arg::Text(s) => Effective::Text(Cow::Borrowed(s)),
        Arg::List(items) => Effective::List(items),
        Arg::Map(pairs) => Effective::Map(pairs),
        Arg::Json(serde_json::Value::Null) => Effective::Null,
        Arg::Json(v) => Effective::Json(v),
    };
    if value == Effective::Null && !p.nullable {
        return Err(null(d, p));
    }
    Ok(value)
}
