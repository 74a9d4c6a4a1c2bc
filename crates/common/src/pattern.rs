use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ordered include/exclude selection over live object names.
///
/// Each token is a case-sensitive glob where `*` matches any run of
/// characters. A leading `!` marks an exclude. Tokens apply left to right:
/// includes union names in, excludes subtract them, so the last matching
/// token wins for any given name. An empty list selects nothing —
/// monitoring is explicit opt-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectPattern {
    tokens: Vec<String>,
}

impl ObjectPattern {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Filters `names` down to the selected subset, preserving nothing but
    /// membership (callers keep their own ordering of the live inventory).
    pub fn filter<'a, I>(&self, names: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let candidates: Vec<&str> = names.into_iter().collect();
        let mut selected: BTreeSet<String> = BTreeSet::new();

        for token in &self.tokens {
            let (negated, glob) = match token.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, token.as_str()),
            };
            for name in &candidates {
                if glob_match(glob, name) {
                    if negated {
                        selected.remove(*name);
                    } else {
                        selected.insert((*name).to_string());
                    }
                }
            }
        }

        selected
    }

    /// True if `name` survives the token list end to end.
    pub fn matches(&self, name: &str) -> bool {
        let mut included = false;
        for token in &self.tokens {
            match token.strip_prefix('!') {
                Some(glob) => {
                    if glob_match(glob, name) {
                        included = false;
                    }
                }
                None => {
                    if glob_match(token, name) {
                        included = true;
                    }
                }
            }
        }
        included
    }
}

/// `*` matches any run of characters, everything else is literal.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();

    // Iterative star-backtracking match.
    let (mut pi, mut ni) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ni));
            pi += 1;
        } else if let Some((sp, sn)) = star {
            pi = sp + 1;
            ni = sn + 1;
            star = Some((sp, sn + 1));
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<&'static str> {
        vec!["APP.A", "APP.B", "SYSTEM.X", "SYSTEM.ADMIN.Y"]
    }

    #[test]
    fn glob_exact() {
        assert!(glob_match("APP.A", "APP.A"));
        assert!(!glob_match("APP.A", "APP.B"));
    }

    #[test]
    fn glob_star_positions() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("APP.*", "APP.ORDERS"));
        assert!(glob_match("*.QUEUE", "APP.BATCH.QUEUE"));
        assert!(glob_match("APP.*.QUEUE", "APP.BATCH.QUEUE"));
        assert!(!glob_match("APP.*.QUEUE", "APP.BATCH"));
    }

    #[test]
    fn glob_is_case_sensitive() {
        assert!(!glob_match("app.*", "APP.A"));
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        let p = ObjectPattern::default();
        assert!(p.filter(names()).is_empty());
        assert!(!p.matches("APP.A"));
    }

    #[test]
    fn exclude_after_include_wins() {
        let p = ObjectPattern::new(["*", "!SYSTEM.*"]);
        let got = p.filter(["APP.A", "SYSTEM.X"]);
        assert_eq!(got.into_iter().collect::<Vec<_>>(), vec!["APP.A"]);
    }

    #[test]
    fn include_after_exclude_wins() {
        let p = ObjectPattern::new(["!SYSTEM.*", "*"]);
        let got = p.filter(["APP.A", "SYSTEM.X"]);
        assert_eq!(
            got.into_iter().collect::<Vec<_>>(),
            vec!["APP.A", "SYSTEM.X"]
        );
    }

    #[test]
    fn re_include_of_narrower_glob() {
        let p = ObjectPattern::new(["*", "!SYSTEM.*", "SYSTEM.ADMIN.*"]);
        let got = p.filter(names());
        assert!(got.contains("APP.A"));
        assert!(got.contains("SYSTEM.ADMIN.Y"));
        assert!(!got.contains("SYSTEM.X"));
    }

    #[test]
    fn matches_agrees_with_filter() {
        let p = ObjectPattern::new(["APP.*", "!APP.B"]);
        assert!(p.matches("APP.A"));
        assert!(!p.matches("APP.B"));
        assert!(!p.matches("OTHER"));
    }

    #[test]
    fn deserializes_from_plain_list() {
        let p: ObjectPattern = serde_yaml::from_str("- 'APP.*'\n- '!APP.TMP'").unwrap();
        assert_eq!(p.tokens(), ["APP.*", "!APP.TMP"]);
    }
}
