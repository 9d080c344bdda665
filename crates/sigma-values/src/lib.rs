//! # sigma-values
//!
//! Typed values for Sigma detection rules: the lexical/structural model a
//! rule-conversion pipeline works with between parsing a rule and emitting a
//! backend query.
//!
//! The core type is [`SigmaString`], a wildcard-aware string parsed into
//! segments of plain text, `*`/`?` wildcards, and `%name%` placeholders:
//!
//! - **Parsing**: escape-aware tokenization (`\` escapes `*`, `?`, itself)
//! - **Structure**: length, indexing and slicing over character positions,
//!   concatenation with plain-run merging
//! - **Placeholders**: opt-in `%name%` detection, combinatorial resolution
//!   against deployment-specific lists
//! - **Conversion**: escaping and serialization into a target pattern
//!   dialect with configurable wildcard symbols
//!
//! Around it, [`SigmaValue`] is the sum type over everything a detection
//! item can carry: numbers, booleans, null, regular expressions, CIDR
//! networks (with prefix-wildcard expansion), numeric comparisons, field
//! references, backend query fragments, and expansion groups.
//!
//! ## Quick start
//!
//! ```rust
//! use sigma_values::{ConvertOptions, SigmaString};
//!
//! let value = SigmaString::new(r"C:\Windows\\*\cmd.exe");
//!
//! // `*` parses as a wildcard, the escaped backslash before it stays literal
//! assert!(value.contains_wildcards());
//!
//! // render for a target dialect that uses `%` and `_` wildcards
//! let rendered = value
//!     .convert(&ConvertOptions {
//!         wildcard_multi: Some("%"),
//!         wildcard_single: Some("_"),
//!         add_escaped: "%_",
//!         ..ConvertOptions::default()
//!     })
//!     .unwrap();
//! assert_eq!(rendered, r"C:\Windows\%\cmd.exe");
//! ```
//!
//! ## Placeholders
//!
//! ```rust
//! use sigma_values::{Placeholder, SigmaString, StringPart};
//!
//! let value = SigmaString::new("%admin_users%-login").insert_placeholders();
//! assert!(value.contains_placeholder(None, None));
//!
//! let resolved = value.replace_placeholders(&|_p: &Placeholder| {
//!     vec![
//!         StringPart::Plain("alice".to_string()),
//!         StringPart::Plain("bob".to_string()),
//!     ]
//! });
//! let rendered: Vec<String> = resolved.iter().map(|s| s.to_string()).collect();
//! assert_eq!(rendered, vec!["alice-login", "bob-login"]);
//! ```

pub mod cidr;
pub mod error;
pub mod string;
pub mod value;

// Re-export the most commonly used types at crate root
pub use cidr::SigmaCidrExpression;
pub use error::{Result, SigmaValueError};
pub use string::{Affix, ConvertOptions, Placeholder, SigmaString, SpecialChar, StringPart};
pub use value::{
    CompareOp, RegexFlags, SigmaCompareExpression, SigmaExpansion, SigmaFieldReference,
    SigmaNumber, SigmaQueryExpression, SigmaRegularExpression, SigmaValue,
};
