//! Field rules as pure functions over text snapshots. Nothing here does
//! I/O or stores state, so the same checks run identically from render
//! paths, submit paths, and tests.

use crate::components::fields::FieldKind;
use crate::messages;

const ID_MAX: usize = 16;
const PASSWORD_MAX: usize = 12;
const NICKNAME_MAX: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: FieldKind,
    pub message: &'static str,
}

pub fn check_id(text: &str) -> Option<&'static str> {
    if text.is_empty() {
        Some(messages::ID_REQUIRED)
    } else if text.chars().count() > ID_MAX {
        Some(messages::ID_TOO_LONG)
    } else {
        None
    }
}

pub fn check_password(text: &str) -> Option<&'static str> {
    if text.is_empty() {
        Some(messages::PASSWORD_REQUIRED)
    } else if text.chars().count() > PASSWORD_MAX {
        Some(messages::PASSWORD_TOO_LONG)
    } else {
        None
    }
}

pub fn check_password_confirm(password: &str, confirm: &str) -> Option<&'static str> {
    if confirm.is_empty() {
        Some(messages::PASSWORD_REQUIRED)
    } else if confirm != password {
        Some(messages::PASSWORD_MISMATCH)
    } else {
        None
    }
}

pub fn check_nickname(text: &str) -> Option<&'static str> {
    if text.is_empty() {
        Some(messages::NICKNAME_REQUIRED)
    } else if text.chars().count() > NICKNAME_MAX {
        Some(messages::NICKNAME_TOO_LONG)
    } else {
        None
    }
}

pub fn check_title(text: &str) -> Option<&'static str> {
    if text.trim().is_empty() {
        Some(messages::TITLE_REQUIRED)
    } else {
        None
    }
}

pub fn check_deadline(text: &str) -> Option<&'static str> {
    if api::dates::is_valid_text(text) {
        None
    } else {
        Some(messages::DATE_SHAPE)
    }
}

/// All registration violations in field order.
pub fn validate_registration(
    id: &str,
    password: &str,
    confirm: &str,
    nickname: &str,
) -> Vec<Violation> {
    let checks = [
        (FieldKind::Id, check_id(id)),
        (FieldKind::Password, check_password(password)),
        (
            FieldKind::PasswordConfirm,
            check_password_confirm(password, confirm),
        ),
        (FieldKind::Nickname, check_nickname(nickname)),
    ];
    collect(checks)
}

/// All milestone editor violations in field order.
pub fn validate_milestone(title: &str, deadline: &str) -> Vec<Violation> {
    let checks = [
        (FieldKind::Title, check_title(title)),
        (FieldKind::Deadline, check_deadline(deadline)),
    ];
    collect(checks)
}

fn collect<const N: usize>(checks: [(FieldKind, Option<&'static str>); N]) -> Vec<Violation> {
    checks
        .into_iter()
        .filter_map(|(field, message)| message.map(|message| Violation { field, message }))
        .collect()
}

/// Whether the registration submit is reachable. A pure snapshot question:
/// every rule passes and the uniqueness verdict is positive for exactly the
/// current Id text (`verdict` as derived for that text).
pub fn registration_gate(
    id: &str,
    password: &str,
    confirm: &str,
    nickname: &str,
    verdict: Option<bool>,
) -> bool {
    validate_registration(id, password, confirm, nickname).is_empty() && verdict == Some(true)
}

/// Whether the milestone editor submit is reachable.
pub fn milestone_gate(title: &str, deadline: &str) -> bool {
    validate_milestone(title, deadline).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn id_boundary_sits_at_sixteen() {
        assert_eq!(check_id(&"a".repeat(16)), None);
        assert_eq!(check_id(&"a".repeat(17)), Some(messages::ID_TOO_LONG));
        assert_eq!(check_id(""), Some(messages::ID_REQUIRED));
    }

    #[test]
    fn password_boundary_sits_at_twelve() {
        assert_eq!(check_password(&"p".repeat(12)), None);
        assert_eq!(
            check_password(&"p".repeat(13)),
            Some(messages::PASSWORD_TOO_LONG)
        );
        assert_eq!(check_password(""), Some(messages::PASSWORD_REQUIRED));
    }

    #[test]
    fn confirm_must_match_exactly() {
        assert_eq!(check_password_confirm("abc", "abc"), None);
        assert_eq!(
            check_password_confirm("abc", "abd"),
            Some(messages::PASSWORD_MISMATCH)
        );
        assert_eq!(
            check_password_confirm("abc", "ABC"),
            Some(messages::PASSWORD_MISMATCH)
        );
        assert_eq!(
            check_password_confirm("abc", ""),
            Some(messages::PASSWORD_REQUIRED)
        );
    }

    #[test]
    fn title_rejects_blank_text() {
        assert_eq!(check_title("release"), None);
        assert_eq!(check_title("   "), Some(messages::TITLE_REQUIRED));
        assert_eq!(check_title(""), Some(messages::TITLE_REQUIRED));
    }

    #[test]
    fn deadline_uses_canonical_date_text() {
        assert_eq!(check_deadline("2024. 03. 05"), None);
        assert_eq!(check_deadline("2024-03-05"), Some(messages::DATE_SHAPE));
        assert_eq!(check_deadline(""), Some(messages::DATE_SHAPE));
    }

    #[test]
    fn violations_come_back_in_field_order() {
        let violations = validate_registration("", "pw", "other", "");
        let fields: Vec<_> = violations.iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec![
                FieldKind::Id,
                FieldKind::PasswordConfirm,
                FieldKind::Nickname
            ]
        );
    }

    #[test]
    fn gate_needs_rules_and_a_positive_verdict() {
        assert!(registration_gate(
            "mossy",
            "secret",
            "secret",
            "Moss",
            Some(true)
        ));
        assert!(!registration_gate(
            "mossy",
            "secret",
            "secret",
            "Moss",
            None
        ));
        assert!(!registration_gate(
            "mossy",
            "secret",
            "secret",
            "Moss",
            Some(false)
        ));
        assert!(!registration_gate("", "secret", "secret", "Moss", Some(true)));
    }

    #[test]
    fn milestone_gate_needs_title_and_date() {
        assert!(milestone_gate("beta", "2024. 06. 01"));
        assert!(!milestone_gate("", "2024. 06. 01"));
        assert!(!milestone_gate("beta", "june"));
    }
}
