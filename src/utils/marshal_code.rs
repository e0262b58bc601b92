use chrono::{DateTime, Utc};

fn initial(name: &str) -> char {
    name.trim()
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('X')
}

/// `MR-{first initial}{last initial}-{yyMMddHHmmssSSS}`.
///
/// Millisecond resolution keeps codes distinct for any two marshals created
/// apart; the unique column catches the rest.
pub fn generate_marshal_code(first_name: &str, last_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "MR-{}{}-{}",
        initial(first_name),
        initial(last_name),
        at.format("%y%m%d%H%M%S%3f")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_718_000_000_000 + ms).unwrap()
    }

    #[test]
    fn test_code_format() {
        let code = generate_marshal_code("thabo", "Mokoena", at(0));
        assert!(code.starts_with("MR-TM-"));
        assert_eq!(code.len(), "MR-TM-".len() + 15);
    }

    #[test]
    fn test_same_inputs_same_code() {
        assert_eq!(
            generate_marshal_code("Thabo", "Mokoena", at(5)),
            generate_marshal_code("Thabo", "Mokoena", at(5))
        );
    }

    #[test]
    fn test_distinct_tuples_distinct_codes() {
        let base = generate_marshal_code("Thabo", "Mokoena", at(0));
        assert_ne!(base, generate_marshal_code("Thabo", "Mokoena", at(1)));
        assert_ne!(base, generate_marshal_code("Sipho", "Mokoena", at(0)));
        assert_ne!(base, generate_marshal_code("Thabo", "Ndlovu", at(0)));
    }

    #[test]
    fn test_blank_names_fall_back() {
        let code = generate_marshal_code("  ", "", at(0));
        assert!(code.starts_with("MR-XX-"));
    }
}
