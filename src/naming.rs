//! Identifier case transforms.
//!
//! Native entry points rarely share the casing of the Rust methods that bind
//! them. The transforms here recover the tokens of an identifier (from either
//! underscore or capitalization boundaries) and re-join them in one of four
//! conventions. [`NameTransform`] wraps one of them (or a user closure) so it
//! can be stored per architecture in a binding configuration.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Splits an identifier into its tokens.
///
/// Underscore-delimited input keeps each segment as written. A single segment
/// is split again at every position followed by an upper-case character.
pub fn tokenize(name: &str) -> VecDeque<&str> {
    let mut tokens: VecDeque<&str> = name.split('_').filter(|s| !s.is_empty()).collect();
    if tokens.len() != 1 {
        return tokens;
    }

    // Leading/trailing underscores are already gone; split the residue by case.
    let working = tokens.pop_front().unwrap_or_default();
    let mut start = 0;
    let mut chars = working.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let boundary = match chars.peek() {
            None => true,
            Some((_, next)) => next.is_uppercase(),
        };
        if boundary {
            let end = i + c.len_utf8();
            tokens.push_back(&working[start..end]);
            start = end;
        }
    }
    tokens
}

fn tokens_of(name: &str) -> Result<VecDeque<&str>> {
    let tokens = tokenize(name);
    if tokens.is_empty() {
        return Err(Error::Naming(format!("identifier {:?} has no tokens", name)));
    }
    Ok(tokens)
}

/// Upper-cases the first character and lower-cases the rest.
///
/// Case-split tokens never carry an upper-case letter past their first
/// character, so the lower-casing only affects underscore-split tokens
/// such as the `IT` in `TEST_IT`.
pub fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Returns the input unchanged.
pub fn identity(name: &str) -> Result<String> {
    Ok(name.to_string())
}

/// `funcCall`
pub fn camel(name: &str) -> Result<String> {
    let mut tokens = tokens_of(name)?;
    let mut result = tokens.pop_front().unwrap_or_default().to_lowercase();
    for token in tokens {
        result.push_str(&capitalize(token));
    }
    Ok(result)
}

/// `func_call`
pub fn snake(name: &str) -> Result<String> {
    let tokens = tokens_of(name)?;
    Ok(tokens.iter().map(|t| t.to_lowercase()).collect::<Vec<_>>().join("_"))
}

/// `FuncCall`
pub fn pascal(name: &str) -> Result<String> {
    let tokens = tokens_of(name)?;
    Ok(tokens.iter().map(|t| capitalize(t)).collect())
}

/// `FUNC_CALL`
pub fn screaming_snake(name: &str) -> Result<String> {
    let tokens = tokens_of(name)?;
    Ok(tokens.iter().map(|t| t.to_uppercase()).collect::<Vec<_>>().join("_"))
}

type TransformFn = dyn Fn(&str) -> Result<String> + Send + Sync;

/// A named, shareable entry-name transform.
#[derive(Clone)]
pub struct NameTransform {
    label: &'static str,
    func: Arc<TransformFn>,
}

impl NameTransform {
    /// Wraps an arbitrary transform. `label` only shows up in diagnostics.
    pub fn custom<F>(label: &'static str, func: F) -> Self
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        Self { label, func: Arc::new(func) }
    }

    pub fn identity() -> Self {
        Self::custom("identity", identity)
    }

    pub fn camel() -> Self {
        Self::custom("camel", camel)
    }

    pub fn snake() -> Self {
        Self::custom("snake", snake)
    }

    pub fn pascal() -> Self {
        Self::custom("pascal", pascal)
    }

    pub fn screaming_snake() -> Self {
        Self::custom("screaming_snake", screaming_snake)
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn apply(&self, name: &str) -> Result<String> {
        (self.func)(name)
    }
}

impl Default for NameTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for NameTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NameTransform").field(&self.label).finish()
    }
}

impl FromStr for NameTransform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "identity" | "noop" => Ok(Self::identity()),
            "camel" => Ok(Self::camel()),
            "snake" => Ok(Self::snake()),
            "pascal" => Ok(Self::pascal()),
            "screaming_snake" | "cap_snake" => Ok(Self::screaming_snake()),
            other => Err(format!("unknown name transform: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUTS: [&str; 9] = [
        "test",
        "Test",
        "TestIt",
        "testIt",
        "test_it",
        "TEST_IT",
        "__test",
        "__testIt",
        "ManyTokenTestWithAVariety",
    ];

    fn check(transform: fn(&str) -> Result<String>, expected: [&str; 9]) {
        for (input, want) in INPUTS.iter().zip(expected) {
            assert_eq!(transform(input).unwrap(), want, "input {:?}", input);
        }
    }

    #[test]
    fn identity_keeps_input() {
        check(identity, INPUTS);
    }

    #[test]
    fn camel_case() {
        check(
            camel,
            ["test", "test", "testIt", "testIt", "testIt", "testIt", "test", "testIt", "manyTokenTestWithAVariety"],
        );
    }

    #[test]
    fn snake_case() {
        check(
            snake,
            [
                "test",
                "test",
                "test_it",
                "test_it",
                "test_it",
                "test_it",
                "test",
                "test_it",
                "many_token_test_with_a_variety",
            ],
        );
    }

    #[test]
    fn pascal_case() {
        check(
            pascal,
            ["Test", "Test", "TestIt", "TestIt", "TestIt", "TestIt", "Test", "TestIt", "ManyTokenTestWithAVariety"],
        );
    }

    #[test]
    fn screaming_snake_case() {
        check(
            screaming_snake,
            [
                "TEST",
                "TEST",
                "TEST_IT",
                "TEST_IT",
                "TEST_IT",
                "TEST_IT",
                "TEST",
                "TEST_IT",
                "MANY_TOKEN_TEST_WITH_A_VARIETY",
            ],
        );
    }

    #[test]
    fn all_caps_is_one_token_per_letter_boundary() {
        // Every upper-case successor starts a new token.
        assert_eq!(tokenize("ABC"), ["A", "B", "C"]);
        assert_eq!(tokenize("get_ID"), ["get", "ID"]);
    }

    #[test]
    fn capitalize_folds_tail() {
        assert_eq!(capitalize("wITH"), "With");
        assert_eq!(capitalize("variety"), "Variety");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn transforms_are_idempotent() {
        for input in INPUTS {
            let s = snake(input).unwrap();
            assert_eq!(snake(&s).unwrap(), s);
            let p = pascal(input).unwrap();
            assert_eq!(pascal(&p).unwrap(), p);
        }
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        for input in ["", "_", "___"] {
            assert!(matches!(camel(input), Err(Error::Naming(_))));
            assert!(matches!(snake(input), Err(Error::Naming(_))));
            assert!(matches!(pascal(input), Err(Error::Naming(_))));
            assert!(matches!(screaming_snake(input), Err(Error::Naming(_))));
        }
        assert_eq!(identity("").unwrap(), "");
    }

    #[test]
    fn name_transform_parses_and_applies() {
        let t: NameTransform = "cap_snake".parse().unwrap();
        assert_eq!(t.label(), "screaming_snake");
        assert_eq!(t.apply("GetValue").unwrap(), "GET_VALUE");
        assert!("kebab".parse::<NameTransform>().is_err());

        let custom = NameTransform::custom("fixed", |_| Ok("X86".to_string()));
        assert_eq!(custom.apply("Test").unwrap(), "X86");
        assert_eq!(format!("{:?}", custom), "NameTransform(\"fixed\")");
    }
}
