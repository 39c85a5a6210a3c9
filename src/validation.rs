//! Format and policy validators for registration input. Violations are
//! collected and reported together, not one at a time.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::PasswordPolicy;
use crate::error::ApiError;

/// Structural email check: an `@`, at least one dot in the domain, no
/// trailing dot, no whitespace.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    if EMAIL_RE.is_match(email) && !email.ends_with('.') {
        Ok(())
    } else {
        Err(ApiError::Validation(vec!["Invalid email address.".to_string()]))
    }
}

pub fn validate_username(username: &str) -> Result<(), ApiError> {
    let mut violations = Vec::new();
    let length = username.chars().count();

    if username.chars().any(char::is_whitespace) {
        violations.push("Username cannot contain whitespaces.".to_string());
    }
    if length > 40 {
        violations.push("Username cannot exceed 40 characters.".to_string());
    }
    if length < 6 {
        violations.push("Username must be at least 6 characters long.".to_string());
    }
    if username
        .chars()
        .any(|c| !c.is_ascii_alphanumeric() && c != '_' && c != '-' && !c.is_whitespace())
    {
        violations
            .push("The only allowed special characters are the following: -, _".to_string());
    }
    if username.chars().any(|c| c.is_uppercase()) {
        violations.push("Username must be lowercase.".to_string());
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(violations))
    }
}

/// Checks the candidate against every configured rule and reports all
/// violated rules together.
pub fn validate_password(password: &str, policy: &PasswordPolicy) -> Result<(), ApiError> {
    let mut violations = Vec::new();
    let length = password.chars().count();

    if password.chars().any(char::is_whitespace) {
        violations.push("Password cannot contain whitespaces.".to_string());
    }
    if policy.max_length > 0 && length > policy.max_length {
        violations.push(format!(
            "Password cannot exceed {} characters.",
            policy.max_length
        ));
    }
    if policy.min_length > 0 && length < policy.min_length {
        violations.push(format!(
            "Password must be at least {} characters long.",
            policy.min_length
        ));
    }
    if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        violations.push("Password must contain at least one digit.".to_string());
    }
    if policy.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
        violations.push("Password must contain at least one lowercase letter.".to_string());
    }
    if policy.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
        violations.push("Password must contain at least one uppercase letter.".to_string());
    }
    if policy.require_non_alphanumeric && !password.chars().any(|c| !c.is_alphanumeric()) {
        violations.push(format!(
            "Password must contain at least one of the following characters: {}",
            spell_out(&policy.allowed_non_alphanumeric)
        ));
    }
    if !policy.allowed_non_alphanumeric.is_empty()
        && password.chars().any(|c| {
            !c.is_alphanumeric() && !c.is_whitespace() && !policy.allowed_non_alphanumeric.contains(c)
        })
    {
        violations.push(format!(
            "The only allowed special characters are the following: {}",
            spell_out(&policy.allowed_non_alphanumeric)
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(violations))
    }
}

fn spell_out(characters: &str) -> String {
    characters
        .chars()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violations(result: Result<(), ApiError>) -> Vec<String> {
        match result {
            Err(ApiError::Validation(v)) => v,
            Err(other) => panic!("expected validation error, got {other:?}"),
            Ok(()) => Vec::new(),
        }
    }

    mod email {
        use super::*;

        #[test]
        fn accepts_plain_addresses() {
            assert!(validate_email("jane.doe@example.com").is_ok());
            assert!(validate_email("a@b.co").is_ok());
        }

        #[test]
        fn rejects_missing_at_sign() {
            assert!(validate_email("janedoe.example.com").is_err());
        }

        #[test]
        fn rejects_missing_domain_dot() {
            assert!(validate_email("jane@example").is_err());
        }

        #[test]
        fn rejects_trailing_dot() {
            assert!(validate_email("jane@example.com.").is_err());
        }

        #[test]
        fn rejects_whitespace() {
            assert!(validate_email("jane doe@example.com").is_err());
            assert!(validate_email("jane@exam ple.com").is_err());
        }
    }

    mod username {
        use super::*;

        #[test]
        fn accepts_lowercase_with_separators() {
            assert!(validate_username("jane_doe-99").is_ok());
            assert!(validate_username("abcdef").is_ok());
        }

        #[test]
        fn rejects_too_short() {
            let v = violations(validate_username("jane"));
            assert_eq!(v, vec!["Username must be at least 6 characters long."]);
        }

        #[test]
        fn rejects_too_long() {
            let name = "a".repeat(41);
            let v = violations(validate_username(&name));
            assert_eq!(v, vec!["Username cannot exceed 40 characters."]);
        }

        #[test]
        fn rejects_uppercase() {
            let v = violations(validate_username("JaneDoe"));
            assert_eq!(v, vec!["Username must be lowercase."]);
        }

        #[test]
        fn rejects_disallowed_specials() {
            let v = violations(validate_username("jane.doe"));
            assert_eq!(
                v,
                vec!["The only allowed special characters are the following: -, _"]
            );
        }

        #[test]
        fn aggregates_every_violation() {
            // whitespace + too short + uppercase
            let v = violations(validate_username("J an"));
            assert_eq!(v.len(), 3);
            assert!(v.iter().any(|m| m.contains("whitespaces")));
            assert!(v.iter().any(|m| m.contains("at least 6")));
            assert!(v.iter().any(|m| m.contains("lowercase")));
        }
    }

    mod password {
        use super::*;

        fn policy() -> PasswordPolicy {
            PasswordPolicy::default()
        }

        #[test]
        fn accepts_conforming_password() {
            assert!(validate_password("Aa1!aaaa", &policy()).is_ok());
        }

        #[test]
        fn rejects_whitespace_unconditionally() {
            let lax = PasswordPolicy {
                min_length: 0,
                max_length: 0,
                require_digit: false,
                require_uppercase: false,
                require_lowercase: false,
                require_non_alphanumeric: false,
                allowed_non_alphanumeric: String::new(),
            };
            let v = violations(validate_password("has space", &lax));
            assert_eq!(v, vec!["Password cannot contain whitespaces."]);
        }

        #[test]
        fn lists_every_violated_rule() {
            // too short, no digit, no uppercase, no special character
            let v = violations(validate_password("aaa", &policy()));
            assert_eq!(v.len(), 4);
            assert!(v.iter().any(|m| m.contains("at least 8")));
            assert!(v.iter().any(|m| m.contains("digit")));
            assert!(v.iter().any(|m| m.contains("uppercase")));
            assert!(v.iter().any(|m| m.contains("at least one of the following")));
        }

        #[test]
        fn enforces_max_length_when_configured() {
            let capped = PasswordPolicy {
                max_length: 12,
                ..policy()
            };
            let v = violations(validate_password("Aa1!aaaaaaaaaaaa", &capped));
            assert_eq!(v, vec!["Password cannot exceed 12 characters."]);
        }

        #[test]
        fn rejects_specials_outside_the_allowed_set() {
            let v = violations(validate_password("Aa1!aaa~", &policy()));
            assert_eq!(v.len(), 1);
            assert!(v[0].starts_with("The only allowed special characters"));
        }

        #[test]
        fn missing_rules_are_not_enforced() {
            let lax = PasswordPolicy {
                min_length: 0,
                max_length: 0,
                require_digit: false,
                require_uppercase: false,
                require_lowercase: false,
                require_non_alphanumeric: false,
                allowed_non_alphanumeric: String::new(),
            };
            assert!(validate_password("x", &lax).is_ok());
        }
    }
}
