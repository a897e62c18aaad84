use log::warn;

/// Reads the environment flag `name`. Unset means `default`; a value that is neither truthy nor falsy is reported
/// and also falls back to `default`, so a typo in a proxy setting never silently flips it.
pub fn parse_boolean_flag(name: &str, value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        "" => default,
        other => {
            warn!("🪛️ {name} should be true or false, not '{other}'. Using {default}.");
            default
        },
    }
}

#[cfg(test)]
mod test {
    use super::parse_boolean_flag;

    #[test]
    fn recognised_values() {
        assert!(parse_boolean_flag("FLAG", Some("1".into()), false));
        assert!(parse_boolean_flag("FLAG", Some(" TRUE ".into()), false));
        assert!(parse_boolean_flag("FLAG", Some("On".into()), false));
        assert!(!parse_boolean_flag("FLAG", Some("0".into()), true));
        assert!(!parse_boolean_flag("FLAG", Some("no".into()), true));
    }

    #[test]
    fn unknown_values_fall_back_to_default() {
        assert!(parse_boolean_flag("FLAG", None, true));
        assert!(!parse_boolean_flag("FLAG", None, false));
        assert!(parse_boolean_flag("FLAG", Some("maybe".into()), true));
        assert!(!parse_boolean_flag("FLAG", Some("".into()), false));
    }
}
