//! The Binding Parser: turns [`MethodMetadata`] into a validated, immutable
//! [`MethodDescriptor`].
//!
//! Every consistency rule between the path template, the parameter roles,
//! and the body encoding is checked here, once. Nothing downstream
//! re-validates; request construction trusts the descriptor.

use std::collections::BTreeSet;

use crate::config::is_valid_header_name;
use crate::{
    BodyEncoding, DescriptorError, HttpMethod, MethodMetadata, MethodName, ParamName, ParamRole,
    ReturnShape,
};

// ---------------------------------------------------------------------------
// Path templates
// ---------------------------------------------------------------------------

/// One piece of a parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied to the URL as-is.
    Literal(String),
    /// A `{name}` placeholder.
    Placeholder(String),
}

/// A path template split into literal text and `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses `raw`, returning `None` if a placeholder is empty, nested, or
    /// unterminated, or if a `}` appears outside a placeholder.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next()? {
                            '}' => break,
                            '{' => return None,
                            other => name.push(other),
                        }
                    }
                    if name.is_empty() {
                        return None;
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => return None,
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Some(Self {
            raw: raw.to_owned(),
            segments,
        })
    }

    /// The template exactly as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if the template has no text at all.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Placeholder names in order of appearance (duplicates included).
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// A validated parameter declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterBinding {
    /// How the argument participates in the request.
    pub role: ParamRole,
    /// Declared name; always present for roles that require one.
    pub name: Option<ParamName>,
    /// Whether an explicit null is accepted.
    pub nullable: bool,
    /// Value used when the argument is omitted.
    pub default: Option<String>,
    /// Index into the call's argument list.
    pub position: usize,
}

impl ParameterBinding {
    /// The declared name, or `""` for unnamed roles.
    pub fn name_str(&self) -> &str {
        self.name.as_ref().map_or("", ParamName::as_str)
    }
}

/// The parsed, validated endpoint contract of one method.
///
/// Immutable once constructed and safe to share between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: MethodName,
    pub verb: HttpMethod,
    /// `None` when the target comes from a `url` parameter.
    pub path: Option<PathTemplate>,
    pub params: Vec<ParameterBinding>,
    pub encoding: BodyEncoding,
    pub returns: ReturnShape,
    pub headers: Vec<(String, String)>,
    pub empty_body: bool,
}

impl MethodDescriptor {
    /// Parameters carrying `role`, in declared order.
    pub fn params_with(&self, role: ParamRole) -> impl Iterator<Item = &ParameterBinding> {
        self.params.iter().filter(move |p| p.role == role)
    }

    /// The `url` parameter, if declared.
    pub fn url_param(&self) -> Option<&ParameterBinding> {
        self.params_with(ParamRole::UrlOverride).next()
    }

    /// The `body` parameter, if declared.
    pub fn body_param(&self) -> Option<&ParameterBinding> {
        self.params_with(ParamRole::Body).next()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolves one method's metadata into a [`MethodDescriptor`].
///
/// Pure: the same metadata always yields the same result. Callers memoise
/// the outcome so that each method is resolved at most once.
///
/// # Errors
///
/// Returns a [`DescriptorError`] describing the first inconsistency found.
pub fn resolve(meta: &MethodMetadata) -> Result<MethodDescriptor, DescriptorError> {
    if meta.name.as_str().is_empty() {
        return Err(DescriptorError::EmptyMethodName);
    }
    let method = meta.name.clone();

    let mut params = Vec::with_capacity(meta.params.len());
    for (position, spec) in meta.params.iter().enumerate() {
        let name = spec.name.clone().and_then(ParamName::new);
        if spec.role.requires_name() && name.is_none() {
            return Err(DescriptorError::MissingParameterName {
                method,
                position,
                role: spec.role,
            });
        }
        params.push(ParameterBinding {
            role: spec.role,
            name,
            nullable: spec.nullable,
            default: spec.default.clone(),
            position,
        });
    }

    let header_names = meta
        .headers
        .iter()
        .map(|(name, _)| name.as_str())
        .chain(
            params
                .iter()
                .filter(|p| p.role == ParamRole::Header)
                .map(ParameterBinding::name_str),
        );
    for name in header_names {
        if !is_valid_header_name(name) {
            return Err(DescriptorError::InvalidHeaderName {
                method,
                name: name.to_owned(),
            });
        }
    }

    let count = |role: ParamRole| params.iter().filter(|p| p.role == role).count();
    let bodies = count(ParamRole::Body);
    let urls = count(ParamRole::UrlOverride);
    let fields = count(ParamRole::Field) + count(ParamRole::FieldMap);

    if bodies > 1 {
        return Err(DescriptorError::MultipleBodyParameters { method });
    }
    if urls > 1 {
        return Err(DescriptorError::MultipleUrlParameters { method });
    }

    let has_path = meta.path.as_deref().is_some_and(|p| !p.is_empty());
    if urls == 1 && has_path {
        return Err(DescriptorError::UrlWithPathTemplate { method });
    }
    if urls == 0 && meta.path.is_none() {
        return Err(DescriptorError::MissingTarget { method });
    }

    match meta.encoding {
        BodyEncoding::None | BodyEncoding::Form if bodies > 0 => {
            return Err(DescriptorError::BodyWithoutStructuredEncoding { method });
        }
        BodyEncoding::StructuredBody if bodies != 1 => {
            return Err(DescriptorError::BodyCount {
                method,
                found: bodies,
            });
        }
        _ => {}
    }
    if fields > 0 && meta.encoding != BodyEncoding::Form {
        return Err(DescriptorError::FieldWithoutFormEncoding { method });
    }
    let carries_body = meta.encoding != BodyEncoding::None || meta.empty_body;
    if carries_body && !meta.verb.permits_body() {
        return Err(DescriptorError::BodyNotAllowed {
            method,
            verb: meta.verb,
        });
    }

    let path = match meta.path.as_deref() {
        Some(raw) => {
            let template =
                PathTemplate::parse(raw).ok_or_else(|| DescriptorError::MalformedTemplate {
                    method: method.clone(),
                    template: raw.to_owned(),
                })?;
            check_placeholders(&method, &template, &params)?;
            Some(template)
        }
        None => {
            if let Some(p) = params.iter().find(|p| p.role == ParamRole::Path) {
                return Err(DescriptorError::UnknownPathParameter {
                    method,
                    name: p.name_str().to_owned(),
                });
            }
            None
        }
    };

    Ok(MethodDescriptor {
        name: method,
        verb: meta.verb,
        path,
        params,
        encoding: meta.encoding,
        returns: meta.returns,
        headers: meta.headers.clone(),
        empty_body: meta.empty_body,
    })
}

/// Every placeholder must have exactly one `path` parameter and every `path`
/// parameter must name a placeholder.
fn check_placeholders(
    method: &MethodName,
    template: &PathTemplate,
    params: &[ParameterBinding],
) -> Result<(), DescriptorError> {
    let placeholders: BTreeSet<&str> = template.placeholders().collect();

    let mut seen = BTreeSet::new();
    for p in params.iter().filter(|p| p.role == ParamRole::Path) {
        let name = p.name_str();
        if !seen.insert(name) {
            return Err(DescriptorError::DuplicatePathParameter {
                method: method.clone(),
                name: name.to_owned(),
            });
        }
        if !placeholders.contains(name) {
            return Err(DescriptorError::UnknownPathParameter {
                method: method.clone(),
                name: name.to_owned(),
            });
        }
    }

    if let Some(missing) = placeholders.iter().find(|ph| !seen.contains(*ph)) {
        return Err(DescriptorError::UnmatchedPlaceholder {
            method: method.clone(),
            placeholder: (*missing).to_owned(),
        });
    }
    Ok(())
}
