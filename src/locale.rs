//! Locale fallback resolution for localized override lookups
//!
//! Follows the resource-bundle candidate ordering, most specific first:
//! language+region+variant, language+region, language, root.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::core::errors::{ContextError, Result};

/// A parsed locale tag such as `de_DE` or `en-US`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    language: String,
    region: String,
    variant: String,
}

impl Locale {
    /// The root locale, last candidate of every chain
    pub fn root() -> Self {
        Self {
            language: String::new(),
            region: String::new(),
            variant: String::new(),
        }
    }

    pub fn new(language: &str, region: &str, variant: &str) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            region: region.to_ascii_uppercase(),
            variant: variant.to_string(),
        }
    }

    /// Parse `lang[_REGION[_VARIANT...]]`, accepting `-` as separator too
    pub fn parse(tag: &str) -> Result<Self> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(ContextError::invalid_locale(tag, "empty tag"));
        }

        let mut parts = trimmed.split(|c| c == '_' || c == '-');
        let language = parts.next().unwrap_or_default();
        let region = parts.next().unwrap_or_default();
        let variant = parts.collect::<Vec<_>>().join("_");

        if language.is_empty() {
            return Err(ContextError::invalid_locale(tag, "missing language"));
        }
        if !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ContextError::invalid_locale(tag, "language must be alphabetic"));
        }
        if !region.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ContextError::invalid_locale(tag, "region must be alphanumeric"));
        }
        if !variant.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ContextError::invalid_locale(tag, "variant must be alphanumeric"));
        }

        Ok(Self::new(language, region, &variant))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn is_root(&self) -> bool {
        self.language.is_empty() && self.region.is_empty() && self.variant.is_empty()
    }

    /// Underscore form: `de`, `de_DE`, `en__POSIX`, empty for root
    pub fn tag(&self) -> String {
        let mut tag = self.language.clone();
        if !self.region.is_empty() || !self.variant.is_empty() {
            tag.push('_');
            tag.push_str(&self.region);
        }
        if !self.variant.is_empty() {
            tag.push('_');
            tag.push_str(&self.variant);
        }
        tag
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Locale {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Fallback chain for one locale, most to least specific, ending in root.
///
/// Multi-segment variants are shortened one segment at a time.
pub fn candidate_locales(locale: &Locale) -> Vec<Locale> {
    let mut candidates = Vec::new();

    if !locale.variant.is_empty() {
        let segments: Vec<&str> = locale.variant.split('_').collect();
        for len in (1..=segments.len()).rev() {
            candidates.push(Locale::new(
                &locale.language,
                &locale.region,
                &segments[..len].join("_"),
            ));
        }
    }
    if !locale.region.is_empty() {
        candidates.push(Locale::new(&locale.language, &locale.region, ""));
    }
    if !locale.language.is_empty() {
        candidates.push(Locale::new(&locale.language, "", ""));
    }
    candidates.push(Locale::root());

    candidates
}

/// Requested chain followed by the default chain, deduplicated in first
/// occurrence order. Root is dropped: no override is keyed by an empty tag.
pub fn combine(requested: &Locale, default: &Locale) -> Vec<String> {
    let mut seen = HashSet::new();
    candidate_locales(requested)
        .into_iter()
        .chain(candidate_locales(default))
        .filter(|locale| !locale.is_root())
        .map(|locale| locale.tag())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Lookup order for a caller-supplied tag: the tag exactly as given, then
/// its normalized chain when it parses, then the default chain. Tags that do
/// not parse still get the default chain. Empty tags and duplicates are
/// skipped.
pub fn fallback_tags(requested: &str, default: &Locale) -> Vec<String> {
    let requested_chain = match Locale::parse(requested) {
        Ok(locale) => candidate_locales(&locale),
        Err(_) => Vec::new(),
    };

    let mut seen = HashSet::new();
    std::iter::once(requested.to_string())
        .chain(
            requested_chain
                .into_iter()
                .chain(candidate_locales(default))
                .filter(|locale| !locale.is_root())
                .map(|locale| locale.tag()),
        )
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// [`combine`] over raw tags
pub fn combine_tags(requested: &str, default: &str) -> Result<Vec<String>> {
    Ok(combine(&Locale::parse(requested)?, &Locale::parse(default)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tags(locales: &[Locale]) -> Vec<String> {
        locales.iter().map(Locale::tag).collect()
    }

    #[test]
    fn test_parse_normalizes_case() {
        let locale = Locale::parse("DE-de").unwrap();
        assert_eq!(locale.language(), "de");
        assert_eq!(locale.region(), "DE");
        assert_eq!(locale.tag(), "de_DE");
        assert_eq!("en".parse::<Locale>().unwrap().tag(), "en");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Locale::parse("").is_err());
        assert!(Locale::parse("_US").is_err());
        assert!(Locale::parse("e1").is_err());
        assert!(Locale::parse("en_U$").is_err());
    }

    #[test]
    fn test_candidates_language_region() {
        let candidates = candidate_locales(&Locale::parse("de_DE").unwrap());
        assert_eq!(tags(&candidates), vec!["de_DE", "de", ""]);
        assert!(candidates.last().unwrap().is_root());
    }

    #[test]
    fn test_candidates_with_variant() {
        let candidates = candidate_locales(&Locale::parse("ja_JP_JP_UNIX").unwrap());
        assert_eq!(
            tags(&candidates),
            vec!["ja_JP_JP_UNIX", "ja_JP_JP", "ja_JP", "ja", ""]
        );

        let no_region = candidate_locales(&Locale::new("en", "", "POSIX"));
        assert_eq!(tags(&no_region), vec!["en__POSIX", "en", ""]);
    }

    #[test]
    fn test_combine_orders_and_deduplicates() {
        assert_eq!(
            combine_tags("de_DE", "en_US").unwrap(),
            vec!["de_DE", "de", "en_US", "en"]
        );
        assert_eq!(combine_tags("en", "en_US").unwrap(), vec!["en", "en_US"]);
        assert_eq!(combine_tags("en_US", "en_US").unwrap(), vec!["en_US", "en"]);
    }

    #[test]
    fn test_fallback_tags_tolerate_unparseable_requests() {
        let default = Locale::parse("en_US").unwrap();

        assert_eq!(
            fallback_tags("de_DE", &default),
            vec!["de_DE", "de", "en_US", "en"]
        );
        assert_eq!(
            fallback_tags("EN_us", &default),
            vec!["EN_us", "en_US", "en"]
        );
        assert_eq!(
            fallback_tags("en_US.UTF-8", &default),
            vec!["en_US.UTF-8", "en_US", "en"]
        );
        assert_eq!(fallback_tags("", &default), vec!["en_US", "en"]);
        assert_eq!(fallback_tags("??", &default), vec!["??", "en_US", "en"]);
    }
}
