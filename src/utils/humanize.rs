//! Field key humanization
//!
//! Turns machine-style identifiers into section and pair labels:
//! - camelCase: a space goes in front of every internal ASCII uppercase letter
//! - snake_case / kebab-case: `_` and `-` become spaces
//! - the first character is uppercased, nothing else changes case
//!
//! "extraInfo" -> "Extra Info", "check_in" -> "Check in".

/// Humanize a raw field key for display.
///
/// Total and pure. Not idempotent: humanizing an already humanized label
/// can add further spaces.
pub fn humanize(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);

    for (i, c) in key.chars().enumerate() {
        match c {
            '_' | '-' => spaced.push(' '),
            c if c.is_ascii_uppercase() && i > 0 => {
                spaced.push(' ');
                spaced.push(c);
            }
            c => spaced.push(c),
        }
    }

    capitalize_first(&spaced)
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(humanize("scheduledTime"), "Scheduled Time");
        assert_eq!(humanize("extraInfo"), "Extra Info");
        assert_eq!(humanize("weatherTempC"), "Weather Temp C");
    }

    #[test]
    fn test_snake_and_kebab_case() {
        assert_eq!(humanize("check_in"), "Check in");
        assert_eq!(humanize("check-out"), "Check out");
        assert_eq!(humanize("parking_fee_EUR"), "Parking fee  E U R");
    }

    #[test]
    fn test_plain_key_only_capitalized() {
        assert_eq!(humanize("tips"), "Tips");
        assert_eq!(humanize("a"), "A");
        assert_eq!(humanize(""), "");
    }

    #[test]
    fn test_leading_uppercase_gets_no_space() {
        assert_eq!(humanize("ExtraInfo"), "Extra Info");
    }

    #[test]
    fn test_not_idempotent() {
        let once = humanize("checkIn");
        assert_eq!(once, "Check In");
        assert_eq!(humanize(&once), "Check  In");
    }
}
