//! Filename patterns: regular expressions or shell globs

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

/// Characters that only make sense in a regular expression
const REGEX_MARKERS: &[char] = &['^', '$', '(', ')', '{', '}', '+', '|', '\\'];

/// A compiled filename pattern
#[derive(Debug, Clone)]
pub enum FilePattern {
    /// Matched from the start of the file name
    Regex(Regex),
    /// Matched against the whole file name
    Glob(glob::Pattern),
}

/// Pattern text that failed to compile
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid regular expression '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl FilePattern {
    /// Compile a pattern, choosing regex or glob syntax from its content
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if Self::looks_like_regex(pattern) {
            Regex::new(pattern)
                .map(FilePattern::Regex)
                .map_err(|source| PatternError::Regex {
                    pattern: pattern.to_string(),
                    source,
                })
        } else {
            glob::Pattern::new(pattern)
                .map(FilePattern::Glob)
                .map_err(|source| PatternError::Glob {
                    pattern: pattern.to_string(),
                    source,
                })
        }
    }

    /// Whether `pattern` would be compiled as a regular expression
    pub fn looks_like_regex(pattern: &str) -> bool {
        pattern.contains(REGEX_MARKERS)
    }

    /// Test a bare file name (no directory part)
    pub fn is_match(&self, file_name: &str) -> bool {
        match self {
            // leftmost match starts at 0 whenever any match does
            FilePattern::Regex(re) => re.find(file_name).is_some_and(|m| m.start() == 0),
            FilePattern::Glob(glob) => glob.matches(file_name),
        }
    }

    /// Named capture groups of a regex match; empty for globs or no match
    pub fn captures(&self, file_name: &str) -> BTreeMap<String, String> {
        let FilePattern::Regex(re) = self else {
            return BTreeMap::new();
        };
        let Some(caps) = re.captures(file_name).filter(|c| c.get(0).is_some_and(|m| m.start() == 0))
        else {
            return BTreeMap::new();
        };
        re.capture_names()
            .flatten()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| (name.to_string(), m.as_str().to_string()))
            })
            .collect()
    }

    /// Pattern text as written
    pub fn as_str(&self) -> &str {
        match self {
            FilePattern::Regex(re) => re.as_str(),
            FilePattern::Glob(glob) => glob.as_str(),
        }
    }
}

impl fmt::Display for FilePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_detection() {
        assert!(matches!(
            FilePattern::parse("vhi_*.tif").unwrap(),
            FilePattern::Glob(_)
        ));
        assert!(matches!(
            FilePattern::parse("MOD13A3.2016.0?.tif").unwrap(),
            FilePattern::Glob(_)
        ));
        assert!(matches!(
            FilePattern::parse(r"^chirps-v2\.0\.(\d{4})").unwrap(),
            FilePattern::Regex(_)
        ));
    }

    #[test]
    fn test_glob_matches_whole_name() {
        let pattern = FilePattern::parse("vhi_*.tif").unwrap();
        assert!(pattern.is_match("vhi_2016_01.tif"));
        assert!(!pattern.is_match("vhi_2016_01.tif.aux.xml"));
        assert!(!pattern.is_match("old_vhi_2016.tif"));
    }

    #[test]
    fn test_regex_anchored_at_start_only() {
        let pattern = FilePattern::parse(r"chirps-v2\.0\.\d{4}").unwrap();
        assert!(pattern.is_match("chirps-v2.0.2016.01.tif"));
        assert!(!pattern.is_match("old-chirps-v2.0.2016.01.tif"));
    }

    #[test]
    fn test_named_captures() {
        let pattern =
            FilePattern::parse(r"^(?P<product>MOD\d{2}A\d)\.(?P<year>\d{4})\.(?P<month>\d{2})")
                .unwrap();
        let caps = pattern.captures("MOD13A3.2016.03.NDVI.tif");
        assert_eq!(caps.get("product").map(String::as_str), Some("MOD13A3"));
        assert_eq!(caps.get("year").map(String::as_str), Some("2016"));
        assert_eq!(caps.get("month").map(String::as_str), Some("03"));

        assert!(pattern.captures("readme.txt").is_empty());
    }

    #[test]
    fn test_invalid_regex() {
        let err = FilePattern::parse("^(unclosed").unwrap_err();
        assert!(matches!(err, PatternError::Regex { .. }));
        assert!(err.to_string().contains("^(unclosed"));
    }
}
