//! Typed values of Sigma detection items.
//!
//! Beyond wildcard strings ([`SigmaString`]), detection items carry numbers,
//! booleans, null, and modifier-produced values: regular expressions (`re`),
//! CIDR networks (`cidr`), numeric comparisons (`gt`/`gte`/`lt`/`lte`),
//! field references (`fieldref`), backend query fragments, and expansion
//! groups. [`SigmaValue`] is the sum type over all of them.

use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::cidr::SigmaCidrExpression;
use crate::error::{Result, SigmaValueError};
use crate::string::SigmaString;

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// A numeric value. Floats with an integral value normalize to `Int`, so
/// `5.0` and `5` compare and render identically.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum SigmaNumber {
    Int(i64),
    Float(f64),
}

impl SigmaNumber {
    /// Build from a float, normalizing integral values down to `Int`.
    pub fn from_f64(v: f64) -> Self {
        if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
            SigmaNumber::Int(v as i64)
        } else {
            SigmaNumber::Float(v)
        }
    }

    /// Parse a decimal integer or float literal.
    pub fn parse(s: &str) -> Result<Self> {
        if let Ok(i) = s.parse::<i64>() {
            return Ok(SigmaNumber::Int(i));
        }
        s.parse::<f64>()
            .map(SigmaNumber::from_f64)
            .map_err(|_| SigmaValueError::InvalidValue(format!("invalid number '{s}'")))
    }

    pub fn as_f64(self) -> f64 {
        match self {
            SigmaNumber::Int(i) => i as f64,
            SigmaNumber::Float(f) => f,
        }
    }
}

impl From<i64> for SigmaNumber {
    fn from(v: i64) -> Self {
        SigmaNumber::Int(v)
    }
}

impl From<f64> for SigmaNumber {
    fn from(v: f64) -> Self {
        SigmaNumber::from_f64(v)
    }
}

/// Numbers compare by numeric value across the `Int`/`Float` variants.
impl PartialEq for SigmaNumber {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SigmaNumber::Int(a), SigmaNumber::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl fmt::Display for SigmaNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigmaNumber::Int(i) => write!(f, "{i}"),
            SigmaNumber::Float(v) => write!(f, "{v}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Regular expressions
// ---------------------------------------------------------------------------

/// Flags of a [`SigmaRegularExpression`], mapped to inline regex flags at
/// compile time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RegexFlags {
    pub ignore_case: bool,
    pub multiline: bool,
    pub dot_all: bool,
}

impl RegexFlags {
    /// The inline flag group (`(?ims)`), empty when no flag is set.
    fn inline_prefix(self) -> String {
        if self == RegexFlags::default() {
            return String::new();
        }
        let mut prefix = String::from("(?");
        if self.ignore_case {
            prefix.push('i');
        }
        if self.multiline {
            prefix.push('m');
        }
        if self.dot_all {
            prefix.push('s');
        }
        prefix.push(')');
        prefix
    }
}

/// A regular expression value from a `|re`-modified detection item.
///
/// The pattern is compiled at construction so invalid expressions fail
/// immediately, not at first use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SigmaRegularExpression {
    pub pattern: String,
    pub flags: RegexFlags,
}

impl SigmaRegularExpression {
    pub fn new(pattern: impl Into<String>, flags: RegexFlags) -> Result<Self> {
        let re = SigmaRegularExpression {
            pattern: pattern.into(),
            flags,
        };
        re.compile()?;
        Ok(re)
    }

    /// Compile the pattern with its flags as an inline prefix.
    pub fn compile(&self) -> Result<Regex> {
        let full = format!("{}{}", self.flags.inline_prefix(), self.pattern);
        Regex::new(&full).map_err(|source| SigmaValueError::InvalidRegex {
            pattern: self.pattern.clone(),
            source,
        })
    }

    /// Escape occurrences of the given substrings for embedding into a
    /// target regex dialect, e.g. escaping `/` delimiters. Each occurrence
    /// is prefixed with `escape_char`; with `escape_escape_char` set, bare
    /// occurrences of `escape_char` itself are doubled as well.
    pub fn escape(&self, escaped: &[&str], escape_char: char, escape_escape_char: bool) -> String {
        let mut positions: Vec<usize> = Vec::new();
        let escape_str = if escape_escape_char {
            Some(escape_char.to_string())
        } else {
            None
        };
        for needle in escaped.iter().copied().chain(escape_str.as_deref()) {
            if needle.is_empty() {
                continue;
            }
            positions.extend(self.pattern.match_indices(needle).map(|(i, _)| i));
        }
        positions.sort_unstable();
        positions.dedup();

        let mut out = String::with_capacity(self.pattern.len() + positions.len());
        let mut last = 0;
        for pos in positions {
            out.push_str(&self.pattern[last..pos]);
            out.push(escape_char);
            last = pos;
        }
        out.push_str(&self.pattern[last..]);
        out
    }
}

impl fmt::Display for SigmaRegularExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

// ---------------------------------------------------------------------------
// Comparisons
// ---------------------------------------------------------------------------

/// Comparison operator of a [`SigmaCompareExpression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompareOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
        }
    }
}

/// A numeric comparison from `|lt`/`|lte`/`|gt`/`|gte` modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SigmaCompareExpression {
    pub number: SigmaNumber,
    pub op: CompareOp,
}

impl fmt::Display for SigmaCompareExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.number)
    }
}

// ---------------------------------------------------------------------------
// Field references and query expressions
// ---------------------------------------------------------------------------

/// A reference to another event field (`|fieldref` modifier).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SigmaFieldReference {
    pub field: String,
}

impl SigmaFieldReference {
    pub fn new(field: impl Into<String>) -> Self {
        SigmaFieldReference {
            field: field.into(),
        }
    }
}

impl fmt::Display for SigmaFieldReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)
    }
}

/// An opaque backend query fragment with an optional field substitution
/// point, produced by processing pipelines that inject backend-native
/// expressions.
///
/// The substitution token defaults to `{field}` but is configurable per
/// fragment, since backends disagree on what a safe marker looks like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SigmaQueryExpression {
    pub query: String,
    pub field_placeholder: String,
}

impl SigmaQueryExpression {
    const DEFAULT_FIELD_SLOT: &'static str = "{field}";

    pub fn new(query: impl Into<String>) -> Self {
        Self::with_field_placeholder(query, Self::DEFAULT_FIELD_SLOT)
    }

    pub fn with_field_placeholder(
        query: impl Into<String>,
        field_placeholder: impl Into<String>,
    ) -> Self {
        SigmaQueryExpression {
            query: query.into(),
            field_placeholder: field_placeholder.into(),
        }
    }

    /// Whether the fragment expects a field name to be substituted.
    pub fn has_field_placeholder(&self) -> bool {
        !self.field_placeholder.is_empty() && self.query.contains(&self.field_placeholder)
    }

    /// Substitute the field name into the fragment. Fails when the fragment
    /// expects a field but none is available.
    pub fn finalize(&self, field: Option<&str>) -> Result<String> {
        if !self.has_field_placeholder() {
            return Ok(self.query.clone());
        }
        match field {
            Some(field) => Ok(self.query.replace(&self.field_placeholder, field)),
            None => Err(SigmaValueError::InvalidValue(format!(
                "query expression '{}' requires a field name",
                self.query
            ))),
        }
    }
}

impl fmt::Display for SigmaQueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)
    }
}

/// Sibling values produced by a value expansion (e.g. windash or placeholder
/// list lookups); they are OR-combined by the consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SigmaExpansion {
    pub values: Vec<SigmaValue>,
}

// ---------------------------------------------------------------------------
// The value sum type
// ---------------------------------------------------------------------------

/// A typed value of a Sigma detection item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SigmaValue {
    /// String value, possibly with wildcards and placeholders.
    String(SigmaString),
    Number(SigmaNumber),
    Bool(bool),
    Null,
    /// Field existence check (`|exists` modifier).
    Exists(bool),
    Regex(SigmaRegularExpression),
    Cidr(SigmaCidrExpression),
    Compare(SigmaCompareExpression),
    FieldRef(SigmaFieldReference),
    QueryExpr(SigmaQueryExpression),
    Expansion(SigmaExpansion),
}

impl SigmaValue {
    /// Convert a YAML scalar into a value. Mappings and sequences have no
    /// scalar value interpretation and are rejected.
    pub fn from_yaml(v: &serde_yaml::Value) -> Result<Self> {
        match v {
            serde_yaml::Value::String(s) => Ok(SigmaValue::String(SigmaString::new(s))),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(SigmaValue::Number(SigmaNumber::Int(i)))
                } else if let Some(f) = n.as_f64() {
                    Ok(SigmaValue::Number(SigmaNumber::from_f64(f)))
                } else {
                    Err(SigmaValueError::InvalidValue(format!(
                        "number '{n}' does not fit a 64-bit representation"
                    )))
                }
            }
            serde_yaml::Value::Bool(b) => Ok(SigmaValue::Bool(*b)),
            serde_yaml::Value::Null => Ok(SigmaValue::Null),
            serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
                Err(SigmaValueError::InvalidType(
                    "detection values must be scalars, not sequences or mappings".to_string(),
                ))
            }
            serde_yaml::Value::Tagged(tagged) => SigmaValue::from_yaml(&tagged.value),
        }
    }

    /// The plain string representation.
    ///
    /// CIDR, comparison, field-reference, query-expression and expansion
    /// values have none and fail with
    /// [`SigmaValueError::NoPlainConversion`]; the rule pipeline must keep
    /// them typed until a backend consumes them.
    pub fn to_plain(&self) -> Result<String> {
        match self {
            SigmaValue::String(s) => Ok(s.to_plain()),
            SigmaValue::Number(n) => Ok(n.to_string()),
            SigmaValue::Bool(b) => Ok(b.to_string()),
            SigmaValue::Null => Ok("null".to_string()),
            SigmaValue::Exists(b) => Ok(b.to_string()),
            SigmaValue::Regex(re) => Ok(re.pattern.clone()),
            SigmaValue::Cidr(_) => Err(SigmaValueError::NoPlainConversion("CIDR expression")),
            SigmaValue::Compare(_) => Err(SigmaValueError::NoPlainConversion("comparison")),
            SigmaValue::FieldRef(_) => {
                Err(SigmaValueError::NoPlainConversion("field reference"))
            }
            SigmaValue::QueryExpr(_) => {
                Err(SigmaValueError::NoPlainConversion("query expression"))
            }
            SigmaValue::Expansion(_) => Err(SigmaValueError::NoPlainConversion("expansion")),
        }
    }
}

impl fmt::Display for SigmaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigmaValue::String(s) => write!(f, "{s}"),
            SigmaValue::Number(n) => write!(f, "{n}"),
            SigmaValue::Bool(b) => write!(f, "{b}"),
            SigmaValue::Null => write!(f, "null"),
            SigmaValue::Exists(b) => write!(f, "{b}"),
            SigmaValue::Regex(re) => write!(f, "{re}"),
            SigmaValue::Cidr(c) => write!(f, "{c}"),
            SigmaValue::Compare(c) => write!(f, "{c}"),
            SigmaValue::FieldRef(r) => write!(f, "{r}"),
            SigmaValue::QueryExpr(q) => write!(f, "{q}"),
            SigmaValue::Expansion(e) => {
                let rendered: Vec<String> = e.values.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", rendered.join("|"))
            }
        }
    }
}
