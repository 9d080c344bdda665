//! Sigma string values: wildcard-aware strings with placeholder support.
//!
//! Sigma rule values use `*` for multi-character wildcards and `?` for
//! single-character wildcards; backslash `\` escapes the next character.
//! Rule repositories additionally use `%name%` placeholders that are resolved
//! against deployment-specific lists before a rule is converted for a backend.
//!
//! [`SigmaString`] preserves this structure as a sequence of [`StringPart`]
//! segments so downstream consumers (evaluators, backend converters) can
//! handle wildcards and placeholders without re-parsing.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Add;

use serde::Serialize;

use crate::error::{Result, SigmaValueError};

/// Special characters that can appear in a Sigma string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SpecialChar {
    /// Multi-character wildcard (`*`), matches zero or more characters.
    WildcardMulti,
    /// Single-character wildcard (`?`), matches exactly one character.
    WildcardSingle,
}

impl SpecialChar {
    /// The canonical wildcard symbol.
    pub fn as_char(self) -> char {
        match self {
            SpecialChar::WildcardMulti => '*',
            SpecialChar::WildcardSingle => '?',
        }
    }
}

impl fmt::Display for SpecialChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A named placeholder (`%name%`) that has not yet been resolved to a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Placeholder {
    pub name: String,
}

impl Placeholder {
    pub fn new(name: impl Into<String>) -> Self {
        Placeholder { name: name.into() }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}%", self.name)
    }
}

/// A segment of a [`SigmaString`]: plain text, a wildcard, or a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum StringPart {
    Plain(String),
    Special(SpecialChar),
    Placeholder(Placeholder),
}

impl StringPart {
    /// Number of character positions this segment occupies when the string is
    /// aligned against a matched value. Wildcards and placeholders count as
    /// one position; plain text by its character count.
    fn width(&self) -> usize {
        match self {
            StringPart::Plain(t) => t.chars().count(),
            StringPart::Special(_) | StringPart::Placeholder(_) => 1,
        }
    }
}

/// Prefix or suffix to test with [`SigmaString::starts_with`] /
/// [`SigmaString::ends_with`]: either literal text or a wildcard kind.
#[derive(Debug, Clone, Copy)]
pub enum Affix<'a> {
    Text(&'a str),
    Special(SpecialChar),
}

impl<'a> From<&'a str> for Affix<'a> {
    fn from(s: &'a str) -> Self {
        Affix::Text(s)
    }
}

impl From<SpecialChar> for Affix<'static> {
    fn from(c: SpecialChar) -> Self {
        Affix::Special(c)
    }
}

/// A Sigma string value that may contain wildcards and placeholders.
///
/// ## Escape semantics
///
/// Backslash (`\`) is the escape character. Its effect depends on the
/// following character:
///
/// | Input | Parsed as | Note |
/// |-------|-----------|------|
/// | `\*`  | literal `*` | backslash consumed |
/// | `\?`  | literal `?` | backslash consumed |
/// | `\\`  | literal `\` | backslash consumed |
/// | `\W`  | literal `\W` | backslash kept, `W` is not special |
///
/// A backslash before a non-special character keeps both characters, which
/// lets Windows paths like `C:\Windows\cmd.exe` survive round-tripping
/// without doubling every separator.
///
/// ## Segment invariants
///
/// Adjacent plain-text segments are always merged, so a segment sequence
/// never contains two `Plain` parts in a row. Rendering the segments back to
/// text ([`fmt::Display`]) re-escapes `*`, `?` and `\` in plain text, so
/// parsing the rendered form reproduces the same segment sequence.
#[derive(Debug, Clone, Eq, Serialize)]
pub struct SigmaString {
    /// Parsed segments, maximally merged.
    pub parts: Vec<StringPart>,
    /// The raw input exactly as given at construction.
    pub original: String,
}

/// Append a part, merging adjacent plain-text runs and dropping empty text.
fn push_part(parts: &mut Vec<StringPart>, part: StringPart) {
    match part {
        StringPart::Plain(t) => {
            if t.is_empty() {
                return;
            }
            if let Some(StringPart::Plain(last)) = parts.last_mut() {
                last.push_str(&t);
            } else {
                parts.push(StringPart::Plain(t));
            }
        }
        other => parts.push(other),
    }
}

impl SigmaString {
    /// Parse a string, interpreting `*` and `?` as wildcards and `\` as escape.
    pub fn new(s: &str) -> Self {
        let mut parts: Vec<StringPart> = Vec::new();
        let mut acc = String::new();
        let mut escaped = false;

        for c in s.chars() {
            if escaped {
                if c == '*' || c == '?' || c == '\\' {
                    acc.push(c);
                } else {
                    // backslash before non-special char: keep both
                    acc.push('\\');
                    acc.push(c);
                }
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '*' {
                if !acc.is_empty() {
                    parts.push(StringPart::Plain(std::mem::take(&mut acc)));
                }
                parts.push(StringPart::Special(SpecialChar::WildcardMulti));
            } else if c == '?' {
                if !acc.is_empty() {
                    parts.push(StringPart::Plain(std::mem::take(&mut acc)));
                }
                parts.push(StringPart::Special(SpecialChar::WildcardSingle));
            } else {
                acc.push(c);
            }
        }

        // trailing lone backslash is kept literally
        if escaped {
            acc.push('\\');
        }
        if !acc.is_empty() {
            parts.push(StringPart::Plain(acc));
        }

        SigmaString {
            parts,
            original: s.to_string(),
        }
    }

    /// Create from a raw string with no wildcard parsing (e.g. for values
    /// that were already validated as regular expressions).
    pub fn from_plain(s: &str) -> Self {
        SigmaString {
            parts: if s.is_empty() {
                Vec::new()
            } else {
                vec![StringPart::Plain(s.to_string())]
            },
            original: s.to_string(),
        }
    }

    /// Build from an already-parsed segment sequence. The `original` field is
    /// set to the canonical rendering so that parsing it back reproduces the
    /// same segments for derived values as well.
    fn from_parts(parts: Vec<StringPart>) -> Self {
        let mut merged = Vec::with_capacity(parts.len());
        for p in parts {
            push_part(&mut merged, p);
        }
        let original = render(&merged);
        SigmaString {
            parts: merged,
            original,
        }
    }

    /// Number of character positions: plain text counts by characters,
    /// wildcards and placeholders count as one position each.
    pub fn len(&self) -> usize {
        self.parts.iter().map(StringPart::width).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns `true` if every segment is plain text.
    pub fn is_plain(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, StringPart::Plain(_)))
    }

    /// Returns `true` if any segment is a wildcard. Placeholders do not count.
    pub fn contains_wildcards(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, StringPart::Special(_)))
    }

    /// The unescaped plain content, or `None` if the string contains
    /// wildcards or placeholders.
    pub fn as_plain(&self) -> Option<String> {
        if !self.is_plain() {
            return None;
        }
        Some(
            self.parts
                .iter()
                .filter_map(|p| match p {
                    StringPart::Plain(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
        )
    }

    /// The canonical escaped rendering. Always succeeds for strings; the
    /// `Result`-returning counterpart on [`crate::SigmaValue`] fails for
    /// value kinds without a plain representation.
    pub fn to_plain(&self) -> String {
        self.to_string()
    }

    // -----------------------------------------------------------------------
    // Indexing and slicing
    // -----------------------------------------------------------------------

    /// The single character position `i` as a new `SigmaString`.
    ///
    /// Negative indices count from the end. A past-the-end index yields an
    /// empty string, following the same rules as
    /// [`slice`](SigmaString::slice) for `[i, i+1)`; an index that
    /// normalizes below zero fails with
    /// [`SigmaValueError::IndexOutOfRange`].
    pub fn index(&self, i: isize) -> Result<SigmaString> {
        let len = self.len();
        let norm = if i < 0 { i + len as isize } else { i };
        if norm < 0 {
            return Err(SigmaValueError::IndexOutOfRange { index: i, len });
        }
        if norm as usize >= len {
            return Ok(SigmaString::from_parts(Vec::new()));
        }
        Ok(self.window(norm as usize, norm as usize + 1))
    }

    /// The character range `[start, stop)` as a new `SigmaString`.
    ///
    /// `None` bounds mean "from the beginning" / "to the end"; negative
    /// bounds count from the end. An inverted range or a past-the-end start
    /// yields an empty string, and that rule is checked before any bounds
    /// validation; only a range surviving it can fail with
    /// [`SigmaValueError::IndexOutOfRange`], which happens when a bound
    /// normalizes below zero or the stop lies beyond the length.
    pub fn slice(&self, start: Option<isize>, stop: Option<isize>) -> Result<SigmaString> {
        let len = self.len() as isize;

        let raw_start = start.unwrap_or(0);
        let mut s = raw_start;
        if s < 0 {
            s += len;
        }
        let raw_stop = stop.unwrap_or(len);
        let mut e = raw_stop;
        if e < 0 {
            e += len;
        }

        if s > e || s >= len {
            return Ok(SigmaString::from_parts(Vec::new()));
        }
        if s < 0 {
            return Err(SigmaValueError::IndexOutOfRange {
                index: raw_start,
                len: len as usize,
            });
        }
        if e < 0 || e > len {
            return Err(SigmaValueError::IndexOutOfRange {
                index: raw_stop,
                len: len as usize,
            });
        }
        Ok(self.window(s as usize, e as usize))
    }

    /// Collect the segments overlapping the character window `[start, stop)`.
    /// Plain segments straddling a boundary are trimmed at character level.
    fn window(&self, start: usize, stop: usize) -> SigmaString {
        let mut collected: Vec<StringPart> = Vec::new();
        let mut pos = 0usize;

        for part in &self.parts {
            let width = part.width();
            let (part_start, part_end) = (pos, pos + width);
            pos = part_end;

            if part_end <= start {
                continue;
            }
            if part_start >= stop {
                break;
            }
            match part {
                StringPart::Plain(t) => {
                    let from = start.saturating_sub(part_start);
                    let to = stop.min(part_end) - part_start;
                    let text: String = t.chars().skip(from).take(to - from).collect();
                    push_part(&mut collected, StringPart::Plain(text));
                }
                other => push_part(&mut collected, other.clone()),
            }
        }

        SigmaString::from_parts(collected)
    }

    // -----------------------------------------------------------------------
    // Affix and content checks
    // -----------------------------------------------------------------------

    /// Structurally check the first segment against a literal prefix or a
    /// wildcard kind. A string whose first segment is a wildcard never starts
    /// with literal text, even though the wildcard could match it.
    pub fn starts_with<'a>(&self, affix: impl Into<Affix<'a>>) -> bool {
        match (self.parts.first(), affix.into()) {
            (Some(StringPart::Plain(t)), Affix::Text(s)) => t.starts_with(s),
            (Some(StringPart::Special(c)), Affix::Special(s)) => *c == s,
            _ => false,
        }
    }

    /// Structural check of the last segment, symmetric to [`starts_with`].
    ///
    /// [`starts_with`]: SigmaString::starts_with
    pub fn ends_with<'a>(&self, affix: impl Into<Affix<'a>>) -> bool {
        match (self.parts.last(), affix.into()) {
            (Some(StringPart::Plain(t)), Affix::Text(s)) => t.ends_with(s),
            (Some(StringPart::Special(c)), Affix::Special(s)) => *c == s,
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Placeholders
    // -----------------------------------------------------------------------

    /// Replace every unescaped `%name%` occurrence (name = word characters)
    /// in plain text with a [`Placeholder`] segment. An escaped `\%` becomes
    /// a literal `%`. Returns the rewritten string; this is an explicit
    /// opt-in step, never applied during parsing.
    pub fn insert_placeholders(&self) -> SigmaString {
        let mut parts: Vec<StringPart> = Vec::new();
        for part in &self.parts {
            match part {
                StringPart::Plain(t) => scan_placeholders(t, &mut parts),
                other => push_part(&mut parts, other.clone()),
            }
        }
        SigmaString::from_parts(parts)
    }

    /// Returns `true` if any placeholder segment passes the optional name
    /// filters: `include` is an allow-list, `exclude` a reject-list. Always
    /// `false` for a string without placeholder segments.
    pub fn contains_placeholder(
        &self,
        include: Option<&[&str]>,
        exclude: Option<&[&str]>,
    ) -> bool {
        self.parts.iter().any(|p| match p {
            StringPart::Placeholder(ph) => {
                include.map_or(true, |names| names.contains(&ph.name.as_str()))
                    && exclude.map_or(true, |names| !names.contains(&ph.name.as_str()))
            }
            _ => false,
        })
    }

    /// Replace every match of `pattern` inside plain text with a placeholder
    /// named `name`. Used by pipeline transformations that turn concrete
    /// values back into list references.
    pub fn replace_with_placeholder(&self, pattern: &regex::Regex, name: &str) -> SigmaString {
        let mut parts: Vec<StringPart> = Vec::new();
        for part in &self.parts {
            match part {
                StringPart::Plain(t) => {
                    let mut last = 0;
                    for m in pattern.find_iter(t) {
                        push_part(&mut parts, StringPart::Plain(t[last..m.start()].to_string()));
                        push_part(
                            &mut parts,
                            StringPart::Placeholder(Placeholder::new(name)),
                        );
                        last = m.end();
                    }
                    push_part(&mut parts, StringPart::Plain(t[last..].to_string()));
                }
                other => push_part(&mut parts, other.clone()),
            }
        }
        SigmaString::from_parts(parts)
    }

    /// Resolve placeholders into all alternative concrete strings.
    ///
    /// The callback maps a placeholder to its alternative replacements, each
    /// a single segment (plain text, a wildcard, or another placeholder to
    /// defer). Placeholders are resolved left to right and the result is the
    /// cross-product over all of them; a string without placeholders resolves
    /// to a one-element list containing itself.
    ///
    /// The callback may be invoked more than once for the same placeholder
    /// across branches, so it must be deterministic; results are not cached.
    pub fn replace_placeholders<F>(&self, callback: &F) -> Vec<SigmaString>
    where
        F: Fn(&Placeholder) -> Vec<StringPart>,
    {
        resolve_placeholders(&self.parts, callback)
            .into_iter()
            .map(SigmaString::from_parts)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Conversion
    // -----------------------------------------------------------------------

    /// Render into a concrete pattern string for a target matching dialect.
    ///
    /// Literal characters in `filter_chars` are dropped (checked before any
    /// escaping); characters of the target wildcard strings and of
    /// `add_escaped` are prefixed with `escape_char`. Wildcard segments emit
    /// the target wildcard verbatim, or fail with
    /// [`SigmaValueError::UnsupportedWildcard`] when the target defines none.
    /// Reaching a placeholder segment fails with
    /// [`SigmaValueError::UnresolvedPlaceholder`]; placeholders must be
    /// resolved via [`replace_placeholders`](SigmaString::replace_placeholders)
    /// first.
    pub fn convert(&self, opts: &ConvertOptions<'_>) -> Result<String> {
        let wildcard_chars = |c: char| {
            opts.wildcard_multi.is_some_and(|w| w.contains(c))
                || opts.wildcard_single.is_some_and(|w| w.contains(c))
        };

        let mut out = String::with_capacity(self.original.len());
        for part in &self.parts {
            match part {
                StringPart::Plain(t) => {
                    for c in t.chars() {
                        if opts.filter_chars.contains(c) {
                            continue;
                        }
                        if wildcard_chars(c) || opts.add_escaped.contains(c) {
                            out.push(opts.escape_char);
                        }
                        out.push(c);
                    }
                }
                StringPart::Special(SpecialChar::WildcardMulti) => match opts.wildcard_multi {
                    Some(w) => out.push_str(w),
                    None => {
                        return Err(SigmaValueError::UnsupportedWildcard("multi-character"));
                    }
                },
                StringPart::Special(SpecialChar::WildcardSingle) => match opts.wildcard_single {
                    Some(w) => out.push_str(w),
                    None => {
                        return Err(SigmaValueError::UnsupportedWildcard("single-character"));
                    }
                },
                StringPart::Placeholder(ph) => {
                    return Err(SigmaValueError::UnresolvedPlaceholder(ph.name.clone()));
                }
            }
        }
        Ok(out)
    }
}

/// Conversion parameters for [`SigmaString::convert`]. The default mirrors
/// the Sigma source dialect: `\` escape, `*`/`?` wildcards, nothing extra
/// escaped or filtered.
#[derive(Debug, Clone)]
pub struct ConvertOptions<'a> {
    pub escape_char: char,
    /// Target multi-character wildcard, `None` if the target has none.
    pub wildcard_multi: Option<&'a str>,
    /// Target single-character wildcard, `None` if the target has none.
    pub wildcard_single: Option<&'a str>,
    /// Additional characters to escape.
    pub add_escaped: &'a str,
    /// Characters to drop from plain text entirely (never escaped).
    pub filter_chars: &'a str,
}

impl Default for ConvertOptions<'static> {
    fn default() -> Self {
        ConvertOptions {
            escape_char: '\\',
            wildcard_multi: Some("*"),
            wildcard_single: Some("?"),
            add_escaped: "",
            filter_chars: "",
        }
    }
}

/// Canonical escaped rendering of a segment sequence: plain text with `*`,
/// `?` and `\` backslash-escaped, wildcards as their symbol, placeholders as
/// `%name%`. Parsing the rendered form reproduces the same segments.
fn render(parts: &[StringPart]) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            StringPart::Plain(t) => {
                for c in t.chars() {
                    if c == '*' || c == '?' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
            }
            StringPart::Special(c) => out.push(c.as_char()),
            StringPart::Placeholder(ph) => {
                out.push('%');
                out.push_str(&ph.name);
                out.push('%');
            }
        }
    }
    out
}

/// Scan plain text for `%name%` placeholders, honoring `\%` escapes.
fn scan_placeholders(text: &str, parts: &mut Vec<StringPart>) {
    let chars: Vec<char> = text.chars().collect();
    let mut acc = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && chars.get(i + 1) == Some(&'%') {
            acc.push('%');
            i += 2;
            continue;
        }
        if c == '%' {
            // look for a closing % with at least one word character between
            let name_end = chars[i + 1..]
                .iter()
                .position(|&c| !is_word_char(c))
                .map(|off| i + 1 + off);
            if let Some(j) = name_end {
                if chars[j] == '%' && j > i + 1 {
                    push_part(parts, StringPart::Plain(std::mem::take(&mut acc)));
                    let name: String = chars[i + 1..j].iter().collect();
                    push_part(parts, StringPart::Placeholder(Placeholder::new(name)));
                    i = j + 1;
                    continue;
                }
            }
        }
        acc.push(c);
        i += 1;
    }
    push_part(parts, StringPart::Plain(acc));
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Resolve the first placeholder in `parts` against the callback and recurse
/// on the remainder, producing the cross-product of all alternatives.
fn resolve_placeholders<F>(parts: &[StringPart], callback: &F) -> Vec<Vec<StringPart>>
where
    F: Fn(&Placeholder) -> Vec<StringPart>,
{
    let Some((i, ph)) = parts.iter().enumerate().find_map(|(i, p)| match p {
        StringPart::Placeholder(ph) => Some((i, ph)),
        _ => None,
    }) else {
        return vec![parts.to_vec()];
    };

    let tails = resolve_placeholders(&parts[i + 1..], callback);
    let replacements = callback(ph);

    let mut out = Vec::with_capacity(replacements.len() * tails.len());
    for replacement in &replacements {
        for tail in &tails {
            let mut resolved: Vec<StringPart> = Vec::with_capacity(i + 1 + tail.len());
            for p in &parts[..i] {
                push_part(&mut resolved, p.clone());
            }
            push_part(&mut resolved, replacement.clone());
            for p in tail {
                push_part(&mut resolved, p.clone());
            }
            out.push(resolved);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Equality, hashing, rendering
// ---------------------------------------------------------------------------

/// Equality compares the segment sequence only; two strings parsed from
/// different raw spellings of the same value are equal.
impl PartialEq for SigmaString {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl PartialEq<str> for SigmaString {
    fn eq(&self, other: &str) -> bool {
        self.parts == SigmaString::new(other).parts
    }
}

impl PartialEq<&str> for SigmaString {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Hash for SigmaString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

impl fmt::Display for SigmaString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", render(&self.parts))
    }
}

impl From<&str> for SigmaString {
    fn from(s: &str) -> Self {
        SigmaString::new(s)
    }
}

impl Default for SigmaString {
    fn default() -> Self {
        SigmaString {
            parts: Vec::new(),
            original: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Concatenation
// ---------------------------------------------------------------------------

impl Add for SigmaString {
    type Output = SigmaString;

    fn add(self, rhs: SigmaString) -> SigmaString {
        let mut parts = Vec::with_capacity(self.parts.len() + rhs.parts.len());
        for p in self.parts {
            push_part(&mut parts, p);
        }
        for p in rhs.parts {
            push_part(&mut parts, p);
        }
        SigmaString::from_parts(parts)
    }
}

/// Appends the text as a plain segment, without wildcard interpretation.
impl Add<&str> for SigmaString {
    type Output = SigmaString;

    fn add(self, rhs: &str) -> SigmaString {
        let mut parts = self.parts;
        push_part(&mut parts, StringPart::Plain(rhs.to_string()));
        SigmaString::from_parts(parts)
    }
}

impl Add<SpecialChar> for SigmaString {
    type Output = SigmaString;

    fn add(self, rhs: SpecialChar) -> SigmaString {
        let mut parts = self.parts;
        push_part(&mut parts, StringPart::Special(rhs));
        SigmaString::from_parts(parts)
    }
}

impl Add<Placeholder> for SigmaString {
    type Output = SigmaString;

    fn add(self, rhs: Placeholder) -> SigmaString {
        let mut parts = self.parts;
        push_part(&mut parts, StringPart::Placeholder(rhs));
        SigmaString::from_parts(parts)
    }
}

/// Prepends the text as a plain segment, without wildcard interpretation.
impl Add<SigmaString> for &str {
    type Output = SigmaString;

    fn add(self, rhs: SigmaString) -> SigmaString {
        let mut parts = Vec::with_capacity(rhs.parts.len() + 1);
        push_part(&mut parts, StringPart::Plain(self.to_string()));
        for p in rhs.parts {
            push_part(&mut parts, p);
        }
        SigmaString::from_parts(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> StringPart {
        StringPart::Plain(s.to_string())
    }

    fn multi() -> StringPart {
        StringPart::Special(SpecialChar::WildcardMulti)
    }

    fn single() -> StringPart {
        StringPart::Special(SpecialChar::WildcardSingle)
    }

    fn ph(name: &str) -> StringPart {
        StringPart::Placeholder(Placeholder::new(name))
    }

    #[test]
    fn parse_plain() {
        let s = SigmaString::new("hello world");
        assert!(s.is_plain());
        assert!(!s.contains_wildcards());
        assert_eq!(s.as_plain(), Some("hello world".to_string()));
        assert_eq!(s.len(), 11);
    }

    #[test]
    fn parse_wildcards() {
        let s = SigmaString::new("*admin*");
        assert_eq!(s.parts, vec![multi(), plain("admin"), multi()]);
        assert_eq!(s.len(), 7);
    }

    #[test]
    fn parse_mixed_wildcards() {
        let s = SigmaString::new("a*b");
        assert_eq!(s.parts, vec![plain("a"), multi(), plain("b")]);

        let s = SigmaString::new("user?admin");
        assert_eq!(s.parts, vec![plain("user"), single(), plain("admin")]);
    }

    #[test]
    fn parse_escaped_wildcard_is_literal() {
        let s = SigmaString::new(r"a\*b");
        assert_eq!(s.parts, vec![plain("a*b")]);
        assert!(s.is_plain());
    }

    #[test]
    fn parse_backslash_before_nonspecial_keeps_both() {
        let s = SigmaString::new(r"C:\Windows\cmd.exe");
        assert_eq!(s.as_plain(), Some(r"C:\Windows\cmd.exe".to_string()));
    }

    #[test]
    fn parse_trailing_backslash() {
        let s = SigmaString::new(r"path\");
        assert_eq!(s.as_plain(), Some(r"path\".to_string()));
    }

    #[test]
    fn parse_empty() {
        let s = SigmaString::new("");
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn display_reescapes_literals() {
        let s = SigmaString::new(r"a\*b");
        assert_eq!(s.to_string(), r"a\*b");
        // parsing the rendering reproduces the same segments
        assert_eq!(SigmaString::new(&s.to_string()), s);
    }

    #[test]
    fn display_roundtrip_backslash() {
        let s = SigmaString::new(r"a\xb");
        assert_eq!(s.as_plain(), Some(r"a\xb".to_string()));
        assert_eq!(SigmaString::new(&s.to_string()), s);
    }

    #[test]
    fn eq_against_str_tokenizes() {
        assert_eq!(SigmaString::new("a*b"), "a*b");
        assert_ne!(SigmaString::new(r"a\*b"), "a*b");
    }

    #[test]
    fn index_positions() {
        let s = SigmaString::new("a*bc");
        assert_eq!(s.index(0).unwrap(), SigmaString::new("a"));
        assert_eq!(s.index(1).unwrap(), SigmaString::new("*"));
        assert_eq!(s.index(-1).unwrap(), SigmaString::new("c"));
        assert!(s.index(4).unwrap().is_empty());
        assert!(s.index(-5).is_err());
    }

    #[test]
    fn slice_whole_is_identity() {
        let s = SigmaString::new("foo*bar?baz");
        assert_eq!(s.slice(None, None).unwrap(), s);
        assert_eq!(s.slice(Some(0), Some(s.len() as isize)).unwrap(), s);
    }

    #[test]
    fn slice_trims_plain_segments() {
        let s = SigmaString::new("foo*bar");
        assert_eq!(s.slice(Some(1), Some(5)).unwrap(), SigmaString::new("oo*b"));
        assert_eq!(s.slice(Some(3), Some(4)).unwrap(), SigmaString::new("*"));
    }

    #[test]
    fn slice_negative_bounds() {
        let s = SigmaString::new("foo*bar");
        assert_eq!(s.slice(Some(-3), None).unwrap(), SigmaString::new("bar"));
        assert_eq!(s.slice(None, Some(-4)).unwrap(), SigmaString::new("foo"));
    }

    #[test]
    fn slice_empty_results() {
        let s = SigmaString::new("abc");
        assert!(s.slice(Some(2), Some(1)).unwrap().is_empty());
        assert!(s.slice(Some(3), Some(3)).unwrap().is_empty());
    }

    #[test]
    fn slice_empty_rule_wins_over_bounds_errors() {
        // An inverted or past-the-end range is empty even when one of its
        // bounds would be rejected on its own.
        let s = SigmaString::new("abc");
        assert!(s.slice(Some(5), Some(7)).unwrap().is_empty());
        assert!(s.slice(Some(2), Some(-10)).unwrap().is_empty());
        assert!(s.index(5).unwrap().is_empty());
    }

    #[test]
    fn slice_out_of_bounds() {
        let s = SigmaString::new("abc");
        assert!(s.slice(None, Some(4)).is_err());
        assert!(s.slice(Some(-7), None).is_err());
    }

    #[test]
    fn slice_composition_reconstructs() {
        let s = SigmaString::new("foo*bar?baz");
        for i in 0..=s.len() {
            let head = s.slice(None, Some(i as isize)).unwrap();
            let tail = s.slice(Some(i as isize), None).unwrap();
            assert_eq!(head + tail, s, "split at {i}");
        }
    }

    #[test]
    fn concat_merges_plain_runs() {
        let s = SigmaString::new("foo") + SigmaString::new("bar");
        assert_eq!(s.parts, vec![plain("foobar")]);

        let s = SigmaString::new("foo*") + "bar";
        assert_eq!(s.parts, vec![plain("foo"), multi(), plain("bar")]);

        let s = "pre" + SigmaString::new("fix");
        assert_eq!(s.parts, vec![plain("prefix")]);
    }

    #[test]
    fn concat_str_is_not_tokenized() {
        let s = SigmaString::new("a") + "*";
        assert_eq!(s.parts, vec![plain("a*")]);
    }

    #[test]
    fn concat_special_and_placeholder() {
        let s = SigmaString::new("a") + SpecialChar::WildcardMulti;
        assert_eq!(s.parts, vec![plain("a"), multi()]);

        let s = SigmaString::new("a") + Placeholder::new("list");
        assert_eq!(s.parts, vec![plain("a"), ph("list")]);
    }

    #[test]
    fn length_additivity() {
        let a = SigmaString::new("foo*");
        let b = SigmaString::new("?bar");
        assert_eq!((a.clone() + b.clone()).len(), a.len() + b.len());
    }

    #[test]
    fn starts_and_ends_with() {
        let s = SigmaString::new("foo*");
        assert!(s.starts_with("fo"));
        assert!(!s.starts_with("oo"));
        assert!(s.ends_with(SpecialChar::WildcardMulti));
        assert!(!s.ends_with("foo"));

        let w = SigmaString::new("*foo");
        assert!(w.starts_with(SpecialChar::WildcardMulti));
        // a leading wildcard never starts with literal text
        assert!(!w.starts_with("f"));
    }

    #[test]
    fn insert_placeholders_basic() {
        let s = SigmaString::new("%foo%bar");
        assert!(!s.contains_placeholder(None, None));

        let s = s.insert_placeholders();
        assert_eq!(s.parts, vec![ph("foo"), plain("bar")]);
        assert!(s.contains_placeholder(None, None));
    }

    #[test]
    fn insert_placeholders_escaped_percent() {
        let s = SigmaString::new(r"100\%foo").insert_placeholders();
        assert_eq!(s.parts, vec![plain("100%foo")]);
        assert!(!s.contains_placeholder(None, None));
    }

    #[test]
    fn insert_placeholders_unterminated_percent_stays_plain() {
        let s = SigmaString::new("50% of %hosts%").insert_placeholders();
        assert_eq!(s.parts, vec![plain("50% of "), ph("hosts")]);
    }

    #[test]
    fn contains_placeholder_filters() {
        let s = SigmaString::new("%foo%-%bar%").insert_placeholders();
        assert!(s.contains_placeholder(Some(&["foo"]), None));
        assert!(!s.contains_placeholder(Some(&["baz"]), None));
        assert!(s.contains_placeholder(None, Some(&["foo"])));
        assert!(!s.contains_placeholder(None, Some(&["foo", "bar"])));
        assert!(!s.contains_placeholder(Some(&["foo"]), Some(&["foo"])));
    }

    #[test]
    fn replace_with_placeholder() {
        let re = regex::Regex::new(r"\d+\.\d+\.\d+\.\d+").unwrap();
        let s = SigmaString::new("src=10.0.0.1 dst=10.0.0.2");
        let replaced = s.replace_with_placeholder(&re, "ip");
        assert_eq!(
            replaced.parts,
            vec![plain("src="), ph("ip"), plain(" dst="), ph("ip")]
        );
    }

    #[test]
    fn replace_placeholders_cross_product() {
        let s = SigmaString::new("%a%-%b%").insert_placeholders();
        let resolved = s.replace_placeholders(&|p: &Placeholder| match p.name.as_str() {
            "a" => vec![plain("x"), plain("y")],
            "b" => vec![plain("1"), plain("2")],
            _ => vec![],
        });
        let rendered: Vec<String> = resolved.iter().map(|s| s.to_string()).collect();
        assert_eq!(rendered, vec!["x-1", "x-2", "y-1", "y-2"]);
    }

    #[test]
    fn replace_placeholders_with_wildcard_replacement() {
        let s = SigmaString::new("a%list%b").insert_placeholders();
        let resolved = s.replace_placeholders(&|_: &Placeholder| vec![multi()]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].parts, vec![plain("a"), multi(), plain("b")]);
    }

    #[test]
    fn replace_placeholders_none_returns_self() {
        let s = SigmaString::new("plain*value");
        let resolved = s.replace_placeholders(&|_: &Placeholder| vec![]);
        assert_eq!(resolved, vec![s]);
    }

    #[test]
    fn replace_placeholders_can_defer() {
        let s = SigmaString::new("%outer%").insert_placeholders();
        let resolved = s.replace_placeholders(&|p: &Placeholder| {
            if p.name == "outer" {
                vec![ph("inner")]
            } else {
                vec![]
            }
        });
        // a deferred placeholder is kept as-is, not recursed into
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].parts, vec![ph("inner")]);
    }

    #[test]
    fn convert_default_roundtrips() {
        let s = SigmaString::new(r"foo*bar\*baz?");
        let converted = s.convert(&ConvertOptions::default()).unwrap();
        assert_eq!(SigmaString::new(&converted), s);
    }

    #[test]
    fn convert_custom_wildcards() {
        let s = SigmaString::new("foo*bar?");
        let opts = ConvertOptions {
            wildcard_multi: Some("%"),
            wildcard_single: Some("_"),
            add_escaped: "%_",
            ..ConvertOptions::default()
        };
        assert_eq!(s.convert(&opts).unwrap(), "foo%bar_");

        let s = SigmaString::new("100%");
        assert_eq!(s.convert(&opts).unwrap(), r"100\%");
    }

    #[test]
    fn convert_filters_before_escaping() {
        let s = SigmaString::new("a'b");
        let opts = ConvertOptions {
            add_escaped: "'",
            filter_chars: "'",
            ..ConvertOptions::default()
        };
        // filtered characters are dropped, never escaped
        assert_eq!(s.convert(&opts).unwrap(), "ab");
    }

    #[test]
    fn convert_without_wildcard_support_fails() {
        let s = SigmaString::new("foo*");
        let opts = ConvertOptions {
            wildcard_multi: None,
            ..ConvertOptions::default()
        };
        let err = s.convert(&opts).unwrap_err();
        assert!(
            matches!(err, SigmaValueError::UnsupportedWildcard(_)),
            "expected UnsupportedWildcard, got: {err}"
        );

        // plain strings convert fine even when the target has no wildcards
        let plain = SigmaString::new("foo");
        let opts = ConvertOptions {
            wildcard_multi: None,
            wildcard_single: None,
            ..ConvertOptions::default()
        };
        assert_eq!(plain.convert(&opts).unwrap(), "foo");
    }

    #[test]
    fn convert_unresolved_placeholder_fails() {
        let s = SigmaString::new("%foo%").insert_placeholders();
        let err = s.convert(&ConvertOptions::default()).unwrap_err();
        assert!(
            matches!(err, SigmaValueError::UnresolvedPlaceholder(ref n) if n == "foo"),
            "expected UnresolvedPlaceholder, got: {err}"
        );
    }
}
