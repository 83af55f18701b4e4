//! Spintax expansion: `[a/b/c]` becomes one randomly chosen alternative.
//!
//! Groups are rewritten left to right. The first `]` after a `[` closes the
//! group regardless of nesting, so `[a/[b]/c]` reads the group `a/[b` and
//! leaves `/c]` behind. Existing templates are written against that reading,
//! so it is kept as is.

use rand::Rng;

/// Expand every spintax group in `text`.
///
/// Stops at the first `[` that has no `]` after it and returns the rest
/// unchanged. Each pass removes at least the bracket pair, so this always
/// terminates.
pub fn expand_spintax<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut text = text.to_string();

    while let Some(start) = text.find('[') {
        let end = match text[start..].find(']') {
            Some(offset) => start + offset,
            None => break,
        };

        let options: Vec<&str> = text[start + 1..end].split('/').collect();
        let replacement = options[rng.gen_range(0..options.len())];

        text = format!("{}{}{}", &text[..start], replacement, &text[end + 1..]);
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_plain_text_unchanged() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(expand_spintax("Hi Jo at 1 Main St", &mut rng), "Hi Jo at 1 Main St");
        assert_eq!(expand_spintax("", &mut rng), "");
    }

    #[test]
    fn test_single_group() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let out = expand_spintax("[a/b]", &mut rng);
            assert!(out == "a" || out == "b", "unexpected {}", out);
        }
    }

    #[test]
    fn test_two_groups() {
        let mut rng = StdRng::seed_from_u64(42);
        let allowed = ["a-c", "a-d", "b-c", "b-d"];
        for _ in 0..50 {
            let out = expand_spintax("[a/b]-[c/d]", &mut rng);
            assert!(allowed.contains(&out.as_str()), "unexpected {}", out);
        }
    }

    #[test]
    fn test_all_alternatives_reachable() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(expand_spintax("[Hi/Hello/Hey] there", &mut rng));
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_unmatched_bracket_stops() {
        let mut rng = StdRng::seed_from_u64(5);
        assert!(expand_spintax("[x/y] and [open", &mut rng).ends_with(" and [open"));
        assert_eq!(expand_spintax("no close [here", &mut rng), "no close [here");
    }

    #[test]
    fn test_first_close_bracket_wins() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let out = expand_spintax("[a/[b]/c]", &mut rng);
            // group is "a/[b": yields "a" or "[b", then "[b/c]" resolves to "b" or "c"
            assert!(["a/c]", "b", "c"].contains(&out.as_str()), "unexpected {}", out);
        }
    }

    #[test]
    fn test_empty_alternatives() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..20 {
            let out = expand_spintax("x[/!]", &mut rng);
            assert!(out == "x" || out == "x!");
        }
        assert_eq!(expand_spintax("[]", &mut rng), "");
    }

    #[test]
    fn test_same_seed_same_output() {
        let template = "[Hi/Hello] {name}, [quick/short] [question/note] about [your home/the property]";
        let a = expand_spintax(template, &mut StdRng::seed_from_u64(99));
        let b = expand_spintax(template, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
