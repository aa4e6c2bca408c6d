use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// `"<word>'s <word>"` and nothing else, e.g. "animal's pets".
static POSSESSIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9_]+)['\u{2018}\u{2019}]s\s+([a-z0-9_]+)$")
        .expect("possessive pattern is valid")
});

/// Combining Diacritical Marks block. Other combining marks are left for the
/// punctuation pass, after the possessive rule has seen them.
const COMBINING_DIACRITICS: std::ops::RangeInclusive<char> = '\u{300}'..='\u{36f}';

const APOSTROPHES: [char; 4] = ['\'', '\u{2018}', '\u{2019}', '`'];

/// Top-level paths served by the site itself. A unit slug equal to one of
/// these would be shadowed by the static route, so they are never handed out.
pub const RESERVED_SLUGS: &[&str] = &[
    "admin",
    "administracao",
    "api",
    "assets",
    "clientes",
    "configuracoes",
    "formularios",
    "guias",
    "health",
    "login",
    "logout",
    "perguntas-frequentes",
    "pets",
    "planos",
    "public",
    "rede",
    "src",
];

/// Convert a name into a URL-safe slug.
///
/// Lowercases, folds accented letters to their base letter, collapses the
/// single `"word's word"` possessive into one token, drops apostrophes and
/// any other punctuation, turns whitespace into hyphens, collapses
/// consecutive hyphens and trims leading/trailing hyphens.
///
/// Never fails. Input without any ASCII letter or digit yields `""`.
pub fn normalize_to_slug(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !COMBINING_DIACRITICS.contains(c))
        .collect();

    let collapsed = POSSESSIVE.replace(&folded, "${1}s${2}");

    let mut result = String::with_capacity(collapsed.len());
    let mut prev_hyphen = false;
    for c in collapsed.chars() {
        if APOSTROPHES.contains(&c) {
            continue;
        }
        let out = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else if c.is_whitespace() || c == '-' {
            '-'
        } else {
            continue;
        };
        if out == '-' {
            if !prev_hyphen {
                result.push('-');
            }
            prev_hyphen = true;
        } else {
            result.push(out);
            prev_hyphen = false;
        }
    }

    result.trim_matches('-').to_string()
}

/// True iff `slug` is non-empty and made of `[a-z0-9]` blocks joined by
/// single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('-').all(|block| {
            !block.is_empty()
                && block
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

pub fn is_reserved(slug: &str) -> bool {
    RESERVED_SLUGS.contains(&slug)
}

/// Validate a user-provided slug.
///
/// Rules: non-empty, only `[a-z0-9-]`, no leading/trailing hyphens, no
/// consecutive hyphens, not a reserved site path.
pub fn validate_slug(slug: &str) -> Result<(), &'static str> {
    if slug.is_empty() {
        return Err("slug must not be empty");
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("slug may only contain lowercase letters, digits, and hyphens");
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Err("slug must not start or end with a hyphen");
    }
    if slug.contains("--") {
        return Err("slug must not contain consecutive hyphens");
    }
    if is_reserved(slug) {
        return Err("slug is reserved");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accents() {
        assert_eq!(
            normalize_to_slug("Centro Veterinário São José"),
            "centro-veterinario-sao-jose"
        );
    }

    #[test]
    fn test_normalize_punctuation() {
        assert_eq!(
            normalize_to_slug("Clínica & Pets - Unidade Norte!"),
            "clinica-pets-unidade-norte"
        );
    }

    #[test]
    fn test_normalize_possessive_literal() {
        assert_eq!(normalize_to_slug("ANIMAL'S PETS"), "animalspets");
        assert_eq!(normalize_to_slug("animal\u{2019}s   pets"), "animalspets");
    }

    #[test]
    fn test_normalize_possessive_only_whole_string() {
        // Anything beyond one word on each side falls through to plain
        // apostrophe stripping.
        assert_eq!(normalize_to_slug("The Animal's Pets"), "the-animals-pets");
        assert_eq!(normalize_to_slug("animal's pets clinic"), "animals-pets-clinic");
        assert_eq!(normalize_to_slug("dogs' home"), "dogs-home");
    }

    #[test]
    fn test_normalize_backtick_and_curly_quotes() {
        assert_eq!(normalize_to_slug("d`oro \u{2018}pet\u{2019}"), "doro-pet");
    }

    #[test]
    fn test_normalize_strips_only_diacritical_block() {
        // U+20DD is a combining mark outside U+0300..U+036F; it blocks the
        // possessive rule and is dropped later as punctuation.
        assert_eq!(normalize_to_slug("e\u{20DD}'s x"), "es-x");
        assert_eq!(normalize_to_slug("Sa\u{0303}o"), "sao");
    }

    #[test]
    fn test_normalize_degenerate() {
        assert_eq!(normalize_to_slug("!!!"), "");
        assert_eq!(normalize_to_slug(""), "");
        assert_eq!(normalize_to_slug("   "), "");
        assert_eq!(normalize_to_slug("🐶🐱"), "");
    }

    #[test]
    fn test_normalize_whitespace_and_hyphens() {
        assert_eq!(normalize_to_slug("  --spaced-- "), "spaced");
        assert_eq!(normalize_to_slug("a - - b\t\nc"), "a-b-c");
        assert_eq!(normalize_to_slug("Unidade_Sul"), "unidadesul");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "Centro Veterinário São José",
            "Clínica & Pets - Unidade Norte!",
            "ANIMAL'S PETS",
            "  --x--y--  ",
            "Ünïcödé Çãfé 24h",
            "!!!",
            "",
        ];
        for input in inputs {
            let once = normalize_to_slug(input);
            assert_eq!(normalize_to_slug(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_normalize_output_is_valid() {
        for input in ["Pet Shop 24h", "São Paulo - Zona Leste", "x", "ÀÉÎÕÜ 9"] {
            assert!(is_valid_slug(&normalize_to_slug(input)), "input: {input:?}");
        }
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("clinica-pets"));
        assert!(is_valid_slug("a"));
        assert!(is_valid_slug("unidade-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("-abc"));
        assert!(!is_valid_slug("abc-"));
        assert!(!is_valid_slug("a--b"));
        assert!(!is_valid_slug("Hello"));
        assert!(!is_valid_slug("hello world"));
        assert!(!is_valid_slug("são"));
    }

    #[test]
    fn test_validate_slug_valid() {
        assert!(validate_slug("my-clinic").is_ok());
        assert!(validate_slug("abc123").is_ok());
    }

    #[test]
    fn test_validate_slug_rejections() {
        assert_eq!(validate_slug(""), Err("slug must not be empty"));
        assert!(validate_slug("Hello").is_err());
        assert!(validate_slug("-abc").is_err());
        assert!(validate_slug("a--b").is_err());
        assert!(validate_slug("hello_world").is_err());
        assert_eq!(validate_slug("admin"), Err("slug is reserved"));
    }

    #[test]
    fn test_reserved_slugs_are_canonical() {
        for slug in RESERVED_SLUGS {
            assert!(is_valid_slug(slug), "{slug}");
            assert!(is_reserved(slug));
        }
        assert!(!is_reserved("admin-2"));
    }
}
