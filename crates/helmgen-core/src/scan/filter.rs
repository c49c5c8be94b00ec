//! Exclusion matching for scanned paths.
//!
//! A path is excluded when it matches any pattern as a shell-style glob, or
//! when it starts with any pattern taken as a literal string. Both checks run
//! for every pattern, so `vendor` excludes `vendor/x.go` through the prefix
//! rule even though the glob alone would not match.
//!
//! The glob dialect is the classic `fnmatch` one: `*` crosses `/`, `?` matches
//! a single character and `[...]` / `[!...]` are character classes. Nothing
//! else is special: braces, backslashes and `**` are plain text or a plain
//! `*`, and a `[` without a closing `]` is literal. Matching is case-sensitive
//! and anchored at both ends. Patterns are rewritten into `globset` syntax
//! before compiling, see [`translate`].

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use super::ScanError;

/// Compiled exclusion pattern set.
#[derive(Debug, Clone)]
pub struct PathFilter {
    patterns: Vec<String>,
    globs: GlobSet,
}

impl PathFilter {
    /// Compile a pattern set.
    pub fn new<I, S>(patterns: I) -> Result<Self, ScanError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let Some(translated) = translate(pattern) else {
                debug!(pattern, "glob can never match; prefix check only");
                continue;
            };
            let glob = GlobBuilder::new(&translated)
                .literal_separator(false)
                .backslash_escape(false)
                .case_insensitive(false)
                .build()
                .map_err(|source| ScanError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })?;
            builder.add(glob);
        }
        let globs = builder.build().map_err(|source| ScanError::Pattern {
            pattern: patterns.join(", "),
            source,
        })?;

        Ok(Self { patterns, globs })
    }

    /// A filter that excludes nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            globs: GlobSet::empty(),
        }
    }

    /// Whether `path` matches any pattern as a glob or as a literal prefix.
    pub fn is_excluded(&self, path: &str) -> bool {
        let excluded = self.globs.is_match(path)
            || self
                .patterns
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()));
        debug!(path, patterns = ?self.patterns, excluded, "exclusion check");
        excluded
    }

    /// The patterns in the order they were supplied.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::empty()
    }
}

/// Rewrite an `fnmatch` pattern as an equivalent `globset` glob.
///
/// Returns `None` when the pattern can never match as a glob (empty, or a
/// class left empty once reversed ranges are dropped).
pub fn translate(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    if chars.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while chars.get(i) == Some(&'*') {
                    i += 1;
                }
                out.push('*');
            }
            '?' => out.push('?'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    let class = translate_class(&chars[i..end])?;
                    out.push_str(&class);
                    i = end + 1;
                }
                None => out.push_str("[[]"),
            },
            '{' | '}' | ']' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    Some(out)
}

/// Index of the `]` closing a class whose body starts at `start`. A `]`
/// directly after `[` or `[!` belongs to the body.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    (j..chars.len()).find(|&k| chars[k] == ']')
}

/// Translate a class body (without the brackets).
fn translate_class(body: &[char]) -> Option<String> {
    let (negated, body) = match body.split_first() {
        Some(('!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut literals: Vec<char> = Vec::new();
    let mut ranges: Vec<(char, char)> = Vec::new();
    let mut k = 0;
    while k < body.len() {
        if k + 2 < body.len() && body[k + 1] == '-' {
            let (lo, hi) = (body[k], body[k + 2]);
            k += 3;
            // Reversed ranges match nothing.
            if lo > hi {
                continue;
            }
            let position_sensitive = matches!(lo, ']' | '-' | '!' | '^') || matches!(hi, ']' | '-');
            if position_sensitive && (hi as u32) - (lo as u32) <= 0xff {
                literals.extend(lo..=hi);
            } else {
                ranges.push((lo, hi));
            }
        } else {
            literals.push(body[k]);
            k += 1;
        }
    }

    if literals.is_empty() && ranges.is_empty() {
        return negated.then(|| "?".to_string());
    }
    if !negated && ranges.is_empty() && literals.len() == 1 {
        let c = literals[0];
        return Some(match c {
            '*' | '?' | '[' | ']' | '{' | '}' => format!("[{c}]"),
            _ => c.to_string(),
        });
    }

    // In globset syntax `]` and `-` are members only when leading, a
    // trailing `-` is a member, and a leading `!` or `^` negates.
    let plain: String = literals
        .iter()
        .filter(|c| !matches!(c, ']' | '-' | '!' | '^'))
        .collect();
    let bangs: String = literals.iter().filter(|c| matches!(c, '!' | '^')).collect();
    let has_bracket = literals.contains(&']');
    let has_dash = literals.contains(&'-');

    if !negated && !has_bracket && !has_dash && plain.is_empty() && ranges.is_empty() {
        let alternates: Vec<String> = bangs.chars().map(String::from).collect();
        return Some(format!("{{{}}}", alternates.join(",")));
    }

    let mut class = String::from("[");
    if negated {
        class.push('!');
    }
    if has_bracket {
        class.push(']');
    } else if has_dash {
        class.push('-');
    }
    class.push_str(&plain);
    for (lo, hi) in &ranges {
        class.push(*lo);
        class.push('-');
        class.push(*hi);
    }
    class.push_str(&bangs);
    if has_bracket && has_dash {
        class.push('-');
    }
    class.push(']');
    Some(class)
}
