//! # Prefix Resolution
//!
//! The first configured prefix that literally starts the message wins.
//! There is no longest-match tie-break: list longer prefixes first when one
//! prefix starts another.

pub fn resolve<'a, S: AsRef<str>>(text: &str, prefixes: &'a [S]) -> Option<&'a str> {
    prefixes
        .iter()
        .map(|prefix| prefix.as_ref())
        .find(|prefix| !prefix.is_empty() && text.starts_with(*prefix))
}
