use once_cell::sync::Lazy;
use regex::Regex;

/// `type(scope)!: description` — type required, scope optional, `!` marks
/// a breaking change, description required.
static CONVENTIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<type>[A-Za-z]+)(?:\((?P<scope>[^)]*)\))?(?P<breaking>!)?:\s+(?P<description>.+)$")
        .expect("conventional commit pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    pub commit_type: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub description: String,
}

/// Parse the first line of a commit message against the Conventional
/// Commits grammar. Returns `None` for anything that does not conform;
/// callers decide whether to skip or bucket those as `"other"`.
pub fn parse(message: &str) -> Option<ConventionalCommit> {
    let subject = message.lines().next()?.trim();
    let captures = CONVENTIONAL.captures(subject)?;

    let scope = captures
        .name("scope")
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    Some(ConventionalCommit {
        commit_type: captures["type"].to_lowercase(),
        scope,
        breaking: captures.name("breaking").is_some(),
        description: captures["description"].trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_scope_and_description() {
        let parsed = parse("feat(api): add endpoint").unwrap();
        assert_eq!(parsed.commit_type, "feat");
        assert_eq!(parsed.scope.as_deref(), Some("api"));
        assert!(!parsed.breaking);
        assert_eq!(parsed.description, "add endpoint");
    }

    #[test]
    fn breaking_marker_after_scope() {
        let parsed = parse("fix(auth)!: change flow").unwrap();
        assert_eq!(parsed.commit_type, "fix");
        assert_eq!(parsed.scope.as_deref(), Some("auth"));
        assert!(parsed.breaking);
    }

    #[test]
    fn scope_is_optional() {
        let parsed = parse("chore: bump deps").unwrap();
        assert_eq!(parsed.commit_type, "chore");
        assert_eq!(parsed.scope, None);
    }

    #[test]
    fn type_is_lowercased() {
        assert_eq!(parse("Feat: shout").unwrap().commit_type, "feat");
    }

    #[test]
    fn only_the_subject_line_is_parsed() {
        let parsed = parse("feat: subject\n\nlong body: with colons").unwrap();
        assert_eq!(parsed.description, "subject");
    }

    #[test]
    fn rejects_nonconforming_messages() {
        assert!(parse("updated some stuff").is_none());
        assert!(parse("feat:no space").is_none());
        assert!(parse("(api): missing type").is_none());
        assert!(parse("feat(api):   ").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn empty_scope_parens_normalize_to_none() {
        let parsed = parse("fix(): patch").unwrap();
        assert_eq!(parsed.scope, None);
    }
}
