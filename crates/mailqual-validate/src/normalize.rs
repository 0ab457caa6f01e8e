//! Address normalization, in the exact order given by §4.A.

/// Normalize a raw address token. Does not validate; callers run
/// [`crate::validate::validate`] on the result.
///
/// Order: strip surrounding whitespace; strip a leading `//` or literal `20`
/// prefix; strip leading punctuation in `{. - + _}`; lower-case; drop a
/// trailing `.` on the local part.
pub fn normalize(raw: &str) -> String {
    let mut s = raw.trim().to_string();

    // Loop rather than strip once: stripping the "20"/"//" prefix can
    // expose leading punctuation, and stripping punctuation can expose a
    // fresh "20"/"//" prefix. Iterating both to a fixed point in one call
    // is what keeps a second normalize() pass a no-op.
    loop {
        let before = s.clone();
        if let Some(rest) = s.strip_prefix("//") {
            s = rest.to_string();
        } else if let Some(rest) = s.strip_prefix("20") {
            s = rest.to_string();
        }
        s = s.trim_start_matches(['.', '-', '+', '_']).to_string();
        if s == before {
            break;
        }
    }

    s = s.to_ascii_lowercase();

    if let Some((local, domain)) = s.split_once('@') {
        let local = local.trim_end_matches('.');
        s = format!("{local}@{domain}");
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_whitespace() {
        assert_eq!(normalize("  alice@example.com  "), "alice@example.com");
    }

    #[test]
    fn strips_double_slash_prefix() {
        assert_eq!(normalize("//CAROL@Example.com"), "carol@example.com");
    }

    #[test]
    fn strips_literal_20_prefix() {
        assert_eq!(normalize("20dave@example.com"), "dave@example.com");
    }

    #[test]
    fn strips_leading_punctuation() {
        assert_eq!(normalize("._-+erin@example.com"), "erin@example.com");
    }

    #[test]
    fn drops_trailing_dot_on_local_part() {
        assert_eq!(normalize("frank.@example.com"), "frank@example.com");
    }

    #[test]
    fn lower_cases() {
        assert_eq!(normalize("ALICE@EXAMPLE.COM"), "alice@example.com");
    }

    #[test]
    fn is_idempotent() {
        let once = normalize("  //CAROL@Example.com.  ");
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    proptest::proptest! {
        #[test]
        fn normalize_is_idempotent_on_arbitrary_ascii(s in "[a-zA-Z0-9@._+/ -]{0,40}") {
            let once = normalize(&s);
            let twice = normalize(&once);
            proptest::prop_assert_eq!(once, twice);
        }
    }
}
