// Glob patterns for selecting files by their relative path.
//
// Supported syntax: `**` (any run of characters, separators included), `**/`
// (zero or more leading directories), `*` (anything but `/`), `?` (one
// character other than `/`). Everything else matches literally.

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern must not be empty")]
    Empty,

    #[error("invalid pattern {pattern:?}: {source}")]
    Compile {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
pub struct FilePattern {
    glob: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(glob: &str) -> Result<Self, PatternError> {
        if glob.is_empty() {
            return Err(PatternError::Empty);
        }
        let source = glob_to_regex(glob);
        let regex = Regex::new(&source)
            .map_err(|source| PatternError::Compile { pattern: glob.to_string(), source })?;
        Ok(Self { glob: glob.to_string(), regex })
    }

    /// Whether `path` matches. Backslashes are treated as `/`.
    pub fn matches(&self, path: &str) -> bool {
        if path.contains('\\') {
            self.regex.is_match(&path.replace('\\', "/"))
        } else {
            self.regex.is_match(path)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.glob
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');

    let chars: Vec<char> = glob.chars().collect();
    let mut index = 0;
    while index < chars.len() {
        match chars[index] {
            '*' if chars.get(index + 1) == Some(&'*') => {
                if chars.get(index + 2) == Some(&'/') {
                    out.push_str("(?:.*/)?");
                    index += 3;
                } else {
                    out.push_str(".*");
                    index += 2;
                }
                continue;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
        index += 1;
    }

    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(glob: &str) -> FilePattern {
        FilePattern::new(glob).unwrap()
    }

    #[test]
    fn keeps_the_source_glob() {
        assert_eq!(pattern("docs/**/*.html").as_str(), "docs/**/*.html");
    }

    #[test]
    fn double_star_matches_everything() {
        let all = pattern("**");
        assert!(all.matches("index.html"));
        assert!(all.matches("docs/api/intro.html"));
    }

    #[test]
    fn single_star_stays_within_a_segment() {
        let top = pattern("*.html");
        assert!(top.matches("index.html"));
        assert!(!top.matches("docs/index.html"));
    }

    #[test]
    fn double_star_slash_matches_zero_or_more_directories() {
        let nested = pattern("**/*.html");
        assert!(nested.matches("index.html"));
        assert!(nested.matches("a/b/c.html"));
        assert!(!nested.matches("a/b/c.md"));
    }

    #[test]
    fn question_mark_is_one_character() {
        let chapter = pattern("ch?.html");
        assert!(chapter.matches("ch1.html"));
        assert!(!chapter.matches("ch10.html"));
        assert!(!chapter.matches("ch/.html"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let literal = pattern("a+b(1).html");
        assert!(literal.matches("a+b(1).html"));
        assert!(!literal.matches("aab1.html"));
        assert!(!literal.matches("a+b(1)xhtml"));
    }

    #[test]
    fn backslash_paths_are_normalized() {
        assert!(pattern("docs/*.html").matches(r"docs\intro.html"));
    }

    #[test]
    fn empty_pattern_is_rejected() {
        assert!(matches!(FilePattern::new(""), Err(PatternError::Empty)));
    }
}
