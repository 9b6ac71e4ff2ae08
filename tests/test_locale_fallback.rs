use pretty_assertions::assert_eq;
use process_context::locale::{candidate_locales, combine, combine_tags, Locale};

#[test]
fn test_requested_then_default_chain() {
    assert_eq!(
        combine_tags("de_DE", "en_US").unwrap(),
        vec!["de_DE", "de", "en_US", "en"]
    );
}

#[test]
fn test_shared_language_is_not_repeated() {
    let requested = Locale::parse("en_GB").unwrap();
    let default = Locale::parse("en_US").unwrap();
    assert_eq!(combine(&requested, &default), vec!["en_GB", "en", "en_US"]);
}

#[test]
fn test_deterministic() {
    let locale = Locale::parse("pt-BR").unwrap();
    assert_eq!(candidate_locales(&locale), candidate_locales(&locale));
    assert_eq!(combine(&locale, &locale), vec!["pt_BR", "pt"]);
}
