//! Field validation for identities and projects.
//!
//! Validators collect every violated rule instead of stopping at the first
//! one, so a client gets the complete list in a single `400` response.
//! Absent fields (`None`) are skipped; callers decide which fields are
//! required for a given operation.

use std::sync::LazyLock;

use regex::Regex;

/// Maximum display-name length, in characters.
pub const NAME_MAX_CHARS: usize = 50;

/// Minimum password length, in characters.
pub const PASSWORD_MIN_CHARS: usize = 6;

const TITLE_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 1000;
const SHORT_DESCRIPTION_MAX_CHARS: usize = 200;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("static email pattern")
});

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)",
    )
    .expect("static url pattern")
});

/// Canonical form used for storage and lookup: trimmed and lower-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Identity fields to check. Each is validated only when present.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityFields<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
}

/// Returns one message per violated rule (empty = valid).
pub fn identity_errors(fields: IdentityFields<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(name) = fields.name {
        let name = name.trim();
        if name.is_empty() {
            errors.push("Please provide a name".to_string());
        } else if name.chars().count() > NAME_MAX_CHARS {
            errors.push(format!(
                "Name cannot be more than {NAME_MAX_CHARS} characters"
            ));
        }
    }

    if let Some(email) = fields.email {
        let email = normalize_email(email);
        if email.is_empty() {
            errors.push("Please provide an email".to_string());
        } else if !is_valid_email(&email) {
            errors.push("Please provide a valid email".to_string());
        }
    }

    if let Some(password) = fields.password {
        if password.is_empty() {
            errors.push("Please provide a password".to_string());
        } else if password.chars().count() < PASSWORD_MIN_CHARS {
            errors.push(format!(
                "Password must be at least {PASSWORD_MIN_CHARS} characters"
            ));
        }
    }

    errors
}

/// Project fields to check. Each is validated only when present.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProjectFields<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub short_description: Option<&'a str>,
    pub live_url: Option<&'a str>,
    pub github_url: Option<&'a str>,
}

/// Returns one message per violated rule (empty = valid).
pub fn project_errors(fields: ProjectFields<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    check_text(
        &mut errors,
        fields.title,
        TITLE_MAX_CHARS,
        "Please provide a project title",
        "Title",
    );
    check_text(
        &mut errors,
        fields.description,
        DESCRIPTION_MAX_CHARS,
        "Please provide a project description",
        "Description",
    );
    check_text(
        &mut errors,
        fields.short_description,
        SHORT_DESCRIPTION_MAX_CHARS,
        "Please provide a short description",
        "Short description",
    );

    for url in [fields.live_url, fields.github_url].into_iter().flatten() {
        if !url.is_empty() && !URL_RE.is_match(url) {
            errors.push("Please provide a valid URL".to_string());
        }
    }

    errors
}

fn check_text(
    errors: &mut Vec<String>,
    value: Option<&str>,
    max: usize,
    missing: &str,
    label: &str,
) {
    let Some(value) = value else {
        return;
    };
    let value = value.trim();
    if value.is_empty() {
        errors.push(missing.to_string());
    } else if value.chars().count() > max {
        errors.push(format!("{label} cannot be more than {max} characters"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(is_valid_email("dev-ops@quantum-dev.io"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@x.toolong"));
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn collects_every_identity_violation() {
        let long_name = "n".repeat(NAME_MAX_CHARS + 1);
        let errors = identity_errors(IdentityFields {
            name: Some(&long_name),
            email: Some("nope"),
            password: Some("123"),
        });
        assert_eq!(
            errors,
            vec![
                "Name cannot be more than 50 characters",
                "Please provide a valid email",
                "Password must be at least 6 characters",
            ]
        );
    }

    #[test]
    fn absent_fields_are_not_checked() {
        assert!(identity_errors(IdentityFields::default()).is_empty());
        let errors = identity_errors(IdentityFields {
            name: Some("Ada"),
            ..Default::default()
        });
        assert!(errors.is_empty());
    }

    #[test]
    fn name_limit_counts_characters_not_bytes() {
        let name = "é".repeat(NAME_MAX_CHARS);
        assert!(
            identity_errors(IdentityFields {
                name: Some(&name),
                ..Default::default()
            })
            .is_empty()
        );
    }

    #[test]
    fn project_rules_cover_lengths_and_urls() {
        let errors = project_errors(ProjectFields {
            title: Some(""),
            description: Some("fine"),
            short_description: Some(&"s".repeat(201)),
            live_url: Some("not a url"),
            github_url: Some("https://github.com/folio/folio"),
        });
        assert_eq!(
            errors,
            vec![
                "Please provide a project title",
                "Short description cannot be more than 200 characters",
                "Please provide a valid URL",
            ]
        );
    }
}
