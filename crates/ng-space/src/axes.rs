//! Axis naming: alias canonicalization and compact names.

use ng_types::{DisplayDimensions, ModelError};

use crate::error::AxisError;

/// Lookup from user tokens to canonical axis names.
pub trait AxisAliases {
    /// Canonical name for a lower-cased token, if it is a known alias.
    fn canonical(&self, token: &str) -> Option<&str>;
}

/// Anatomical axes: right/left, anterior/posterior, superior/inferior.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeuroAxes;

const NEURO_ALIASES: &[(&str, &str)] = &[
    ("r", "right"),
    ("right", "right"),
    ("l", "left"),
    ("left", "left"),
    ("a", "anterior"),
    ("ant", "anterior"),
    ("anterior", "anterior"),
    ("p", "posterior"),
    ("pos", "posterior"),
    ("post", "posterior"),
    ("posterior", "posterior"),
    ("s", "superior"),
    ("sup", "superior"),
    ("superior", "superior"),
    ("i", "inferior"),
    ("inf", "inferior"),
    ("inferior", "inferior"),
];

impl AxisAliases for NeuroAxes {
    fn canonical(&self, token: &str) -> Option<&str> {
        NEURO_ALIASES
            .iter()
            .find(|(alias, _)| *alias == token)
            .map(|(_, name)| *name)
    }
}

/// Resolve user tokens to three display axis names.
///
/// A single token is read letter by letter (`"RAS"`, `"zyx"`). Tokens
/// without an alias are kept as native axis names.
pub fn canonicalize<S: AsRef<str>>(
    tokens: &[S],
    aliases: &dyn AxisAliases,
) -> Result<DisplayDimensions, AxisError> {
    let tokens: Vec<String> = match tokens {
        [single] => single.as_ref().chars().map(String::from).collect(),
        many => many.iter().map(|t| t.as_ref().to_string()).collect(),
    };
    if tokens.len() != 3 {
        return Err(AxisError::Arity(tokens.len()));
    }

    let names: Vec<String> = tokens
        .into_iter()
        .map(|token| match aliases.canonical(&token.to_lowercase()) {
            Some(name) => name.to_string(),
            None => token,
        })
        .collect();

    DisplayDimensions::new(names).map_err(|err| match err {
        ModelError::DuplicateDisplayAxis(name) => AxisError::Repeated(name),
        _ => AxisError::Arity(3),
    })
}

/// Channel and time axes are never reoriented.
pub fn is_spatial(name: &str) -> bool {
    match name.chars().next() {
        Some(first) => !matches!(first.to_ascii_lowercase(), 'c' | 't'),
        None => false,
    }
}

/// First letter of each spatial axis, lower-cased: `["right", "anterior", "superior"]` is `"ras"`.
pub fn compact_name<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| is_spatial(name))
        .filter_map(|name| name.chars().next())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
