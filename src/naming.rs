//! Resource-safe naming for inference profiles and caller echoes.

/// Longest caller-supplied value echoed back in a message.
const ECHO_MAX_LEN: usize = 100;

/// Build an inference profile name from a team, model type and version.
///
/// Dots in the version become underscores, every character outside
/// `[0-9a-zA-Z _-]` becomes `_`, and trailing `_`/`-` are trimmed.
#[must_use]
pub fn sanitize_profile_name(team: &str, model_type: &str, version: &str) -> String {
    let version = version.replace('.', "_");
    let joined = format!("{team}_{model_type}_{version}");

    let mut name: String = joined
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '_' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect();

    while name.ends_with(['_', '-']) {
        name.pop();
    }
    name
}

/// Reduce a caller-supplied value to characters safe to echo in a message.
///
/// Keeps the characters found in model ids (`[A-Za-z0-9-_.:/]`), truncates
/// to 100 characters, and yields `"unknown"` when nothing survives.
#[must_use]
pub fn sanitize_user_input(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | ':' | '/'))
        .take(ECHO_MAX_LEN)
        .collect();

    if kept.is_empty() {
        "unknown".to_string()
    } else {
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_version() {
        assert_eq!(sanitize_profile_name("team-a", "claude", "3.5"), "team-a_claude_3_5");
    }

    #[test]
    fn disallowed_characters_replaced_one_for_one() {
        assert_eq!(sanitize_profile_name("team@a", "cl/aude", "v1:0"), "team_a_cl_aude_v1_0");
        assert_eq!(sanitize_profile_name("é", "x", "1").chars().count(), "é_x_1".chars().count());
        assert_eq!(sanitize_profile_name("team a", "claude", "3"), "team a_claude_3");
    }

    #[test]
    fn trailing_separators_trimmed() {
        assert_eq!(sanitize_profile_name("teama", "claude", "3.5."), "teama_claude_3_5");
        assert_eq!(sanitize_profile_name("teama", "claude", "3-"), "teama_claude_3");
        assert_eq!(sanitize_profile_name("teama", "claude", "-_-"), "teama_claude");
    }

    #[test]
    fn output_never_ends_with_separator() {
        for version in ["", ".", "!!", "3.5-", "__"] {
            let name = sanitize_profile_name("t", "m", version);
            assert!(!name.ends_with('_') && !name.ends_with('-'), "got {name:?}");
        }
    }

    #[test]
    fn echo_keeps_model_id_characters() {
        assert_eq!(
            sanitize_user_input("us.anthropic.claude-3:0/x_y"),
            "us.anthropic.claude-3:0/x_y"
        );
        assert_eq!(sanitize_user_input("<script>alert(1)</script>"), "scriptalert1/script");
    }

    #[test]
    fn echo_truncates_and_defaults() {
        assert_eq!(sanitize_user_input(&"a".repeat(250)).len(), 100);
        assert_eq!(sanitize_user_input("   "), "unknown");
        assert_eq!(sanitize_user_input(""), "unknown");
    }
}
