//! Instance name validation.
//!
//! Names end up as orchestrator service names, so the default rules are
//! those of a DNS label: ASCII letters, digits and inner single hyphens,
//! at most 63 characters. Uniqueness is per user and case-insensitive.

use serde::Deserialize;

use super::error::{InvalidNameReason, NameError};

/// Configurable naming rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NameRules {
    /// Maximum name length in characters.
    pub max_length: usize,
    /// Allow `-` between alphanumeric runs.
    pub allow_hyphen: bool,
    /// Allow uppercase ASCII letters.
    pub allow_uppercase: bool,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            max_length: 63,
            allow_hyphen: true,
            allow_uppercase: true,
        }
    }
}

impl NameRules {
    /// Check `name` against the syntax rules only.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::Invalid`] describing the first broken rule.
    pub fn validate_syntax(&self, name: &str) -> Result<(), NameError> {
        let invalid = |reason| NameError::Invalid {
            name: name.to_string(),
            reason,
        };

        if name.trim().is_empty() {
            return Err(invalid(InvalidNameReason::Empty));
        }
        if name.chars().count() > self.max_length {
            return Err(invalid(InvalidNameReason::TooLong {
                max: self.max_length,
            }));
        }

        let mut previous_hyphen = false;
        for ch in name.chars() {
            let allowed = ch.is_ascii_lowercase()
                || ch.is_ascii_digit()
                || (self.allow_uppercase && ch.is_ascii_uppercase())
                || (self.allow_hyphen && ch == '-');
            if !allowed {
                return Err(invalid(InvalidNameReason::IllegalCharacter { ch }));
            }
            if ch == '-' && previous_hyphen {
                return Err(invalid(InvalidNameReason::MisplacedHyphen));
            }
            previous_hyphen = ch == '-';
        }

        if name.starts_with('-') || name.ends_with('-') {
            return Err(invalid(InvalidNameReason::MisplacedHyphen));
        }

        Ok(())
    }

    /// Check syntax, then uniqueness against the user's active names.
    ///
    /// # Errors
    ///
    /// Returns [`NameError::Invalid`] for a syntax violation, or
    /// [`NameError::Duplicate`] when a case-insensitive match exists.
    pub fn validate<'a, I>(&self, name: &str, existing: I) -> Result<(), NameError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.validate_syntax(name)?;

        let key = name_key(name);
        if existing.into_iter().any(|other| name_key(other) == key) {
            return Err(NameError::Duplicate {
                name: name.to_string(),
            });
        }

        Ok(())
    }
}

/// Case-folded form used for uniqueness comparisons.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> NameRules {
        NameRules::default()
    }

    #[test]
    fn accepts_simple_names() {
        for name in ["myapp", "myapp2", "MyApp", "blog-1", "a"] {
            assert!(rules().validate_syntax(name).is_ok(), "{name} should pass");
        }
    }

    #[test]
    fn rejects_dotted_name() {
        let err = rules().validate_syntax("Bad.Name").unwrap_err();
        assert_eq!(
            err,
            NameError::Invalid {
                name: "Bad.Name".into(),
                reason: InvalidNameReason::IllegalCharacter { ch: '.' },
            }
        );
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        for name in ["", "   ", "\t"] {
            assert!(matches!(
                rules().validate_syntax(name),
                Err(NameError::Invalid {
                    reason: InvalidNameReason::Empty,
                    ..
                })
            ));
        }
    }

    #[test]
    fn rejects_embedded_whitespace_and_separators() {
        for name in [" myapp", "my app", "my_app", "my/app", "my:app", "é"] {
            assert!(
                matches!(
                    rules().validate_syntax(name),
                    Err(NameError::Invalid {
                        reason: InvalidNameReason::IllegalCharacter { .. },
                        ..
                    })
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_misplaced_hyphens() {
        for name in ["-app", "app-", "my--app"] {
            assert!(matches!(
                rules().validate_syntax(name),
                Err(NameError::Invalid {
                    reason: InvalidNameReason::MisplacedHyphen,
                    ..
                })
            ));
        }
    }

    #[test]
    fn enforces_max_length() {
        let rules = NameRules {
            max_length: 5,
            ..NameRules::default()
        };
        assert!(rules.validate_syntax("abcde").is_ok());
        assert!(matches!(
            rules.validate_syntax("abcdef"),
            Err(NameError::Invalid {
                reason: InvalidNameReason::TooLong { max: 5 },
                ..
            })
        ));
    }

    #[test]
    fn hyphen_and_uppercase_can_be_disabled() {
        let strict = NameRules {
            allow_hyphen: false,
            allow_uppercase: false,
            ..NameRules::default()
        };
        assert!(strict.validate_syntax("my-app").is_err());
        assert!(strict.validate_syntax("MyApp").is_err());
        assert!(strict.validate_syntax("myapp").is_ok());
    }

    #[test]
    fn duplicate_detection_is_case_insensitive() {
        let existing = ["myapp", "blog"];
        assert_eq!(
            rules().validate("MyApp", existing),
            Err(NameError::Duplicate {
                name: "MyApp".into()
            })
        );
        assert!(rules().validate("myapp2", existing).is_ok());
    }

    #[test]
    fn syntax_is_checked_before_uniqueness() {
        let existing = ["bad.name"];
        assert!(matches!(
            rules().validate("Bad.Name", existing),
            Err(NameError::Invalid { .. })
        ));
    }
}
