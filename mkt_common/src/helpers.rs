/// Interpret an environment flag such as `1`, `true` or `off`, returning `default` for unset or
/// unrecognized values.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some(v) if ["1", "true", "yes", "on"].iter().any(|t| v.eq_ignore_ascii_case(t)) => true,
        Some(v) if ["0", "false", "no", "off"].iter().any(|t| v.eq_ignore_ascii_case(t)) => false,
        _ => default,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn recognized_flags_override_the_default() {
        assert!(parse_boolean_flag(Some("1".to_string()), false));
        assert!(parse_boolean_flag(Some("TRUE".to_string()), false));
        assert!(!parse_boolean_flag(Some("off".to_string()), true));
        assert!(!parse_boolean_flag(Some(" no ".to_string()), true));
    }

    #[test]
    fn unset_or_garbage_falls_back_to_the_default() {
        assert!(parse_boolean_flag(None, true));
        assert!(!parse_boolean_flag(None, false));
        assert!(parse_boolean_flag(Some("maybe".to_string()), true));
    }
}
