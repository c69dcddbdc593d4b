/*!
 * Tests for locale utility functions
 */

use catalog_translator::locale_utils::{
    get_locale_name, locales_match, parse_locale, to_service_code, validate_language_code, LanguageCodeType,
};

/// Test validation of language codes
#[test]
fn test_validateLanguageCode_withValidCodes_shouldReturnCorrectType() {
    assert_eq!(validate_language_code("nl").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("nld").unwrap(), LanguageCodeType::Part3);

    assert!(validate_language_code("xx").is_err());
    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
}

#[test]
fn test_parseLocale_withVariousForms_shouldNormalizeCase() {
    let parts = parse_locale("EN-us").unwrap();
    assert_eq!(parts.language, "en");
    assert_eq!(parts.region.as_deref(), Some("US"));

    let parts = parse_locale("es_419").unwrap();
    assert_eq!(parts.region.as_deref(), Some("419"));

    assert!(parse_locale("").is_err());
    assert!(parse_locale("   ").is_err());
    assert!(parse_locale("zz_BE").is_err());
}

#[test]
fn test_toServiceCode_shouldUseBcp47Separator() {
    assert_eq!(to_service_code("nl").unwrap(), "nl");
    assert_eq!(to_service_code("pt_BR").unwrap(), "pt-BR");
    assert_eq!(to_service_code("fr-ca").unwrap(), "fr-CA");
    assert!(to_service_code("fr_CAN").is_err());
}

#[test]
fn test_localesMatch_shouldIgnoreSeparatorAndCase() {
    assert!(locales_match("pt_BR", "pt-br"));
    assert!(locales_match("NL", "nl"));
    assert!(!locales_match("pt_BR", "pt_PT"));
    assert!(!locales_match("en", "en_GB"));
    assert!(!locales_match("bogus", "bogus"));
}

#[test]
fn test_getLocaleName_shouldIncludeRegion() {
    assert_eq!(get_locale_name("nl").unwrap(), "Dutch");
    assert_eq!(get_locale_name("fr_BE").unwrap(), "French (BE)");
    assert!(get_locale_name("qq").is_err());
}
