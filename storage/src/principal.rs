//! Principal names and their textual form.

use std::fmt;
use std::str::FromStr;

/// Name type for ordinary user and service principals.
pub const NT_PRINCIPAL: i32 = 1;

/// A Kerberos principal name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrincipalName {
    pub name_type: i32,
    pub realm: String,
    pub components: Vec<String>,
}

impl PrincipalName {
    /// Creates a principal of type [`NT_PRINCIPAL`].
    #[must_use]
    pub fn new<I, S>(realm: impl Into<String>, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name_type: NT_PRINCIPAL,
            realm: realm.into(),
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses `comp[/comp...][@REALM]`.
    ///
    /// A backslash escapes the following `/`, `@` or `\`. Inside the realm a
    /// `/` is literal.
    pub fn parse(text: &str) -> Result<Self, ParsePrincipalError> {
        if text.is_empty() {
            return Err(ParsePrincipalError::Empty);
        }

        let mut components = Vec::new();
        let mut current = String::new();
        let mut realm: Option<String> = None;
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = chars.next().ok_or(ParsePrincipalError::TrailingEscape)?;
                    current.push(escaped);
                }
                '@' if realm.is_none() => {
                    components.push(std::mem::take(&mut current));
                    realm = Some(String::new());
                }
                '@' => return Err(ParsePrincipalError::MultipleRealms),
                '/' if realm.is_none() => components.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }

        let realm = match realm {
            Some(_) => current,
            None => {
                components.push(current);
                String::new()
            }
        };
        if components.iter().all(String::is_empty) {
            return Err(ParsePrincipalError::Empty);
        }

        Ok(Self {
            name_type: NT_PRINCIPAL,
            realm,
            components,
        })
    }
}

impl FromStr for PrincipalName {
    type Err = ParsePrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PrincipalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write_escaped(f, component, &['/', '@', '\\'])?;
        }
        if !self.realm.is_empty() {
            f.write_str("@")?;
            write_escaped(f, &self.realm, &['@', '\\'])?;
        }
        Ok(())
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str, special: &[char]) -> fmt::Result {
    for c in text.chars() {
        if special.contains(&c) {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    Ok(())
}

/// Errors from [`PrincipalName::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePrincipalError {
    /// No name components were given.
    Empty,
    /// The text ended with an unpaired backslash.
    TrailingEscape,
    /// More than one unescaped `@` was present.
    MultipleRealms,
}

impl fmt::Display for ParsePrincipalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "principal name is empty"),
            Self::TrailingEscape => write!(f, "principal name ends with an escape"),
            Self::MultipleRealms => write!(f, "principal name has more than one realm"),
        }
    }
}

impl std::error::Error for ParsePrincipalError {}
