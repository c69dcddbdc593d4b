use anyhow::{Result, anyhow};
use isolang::Language;

/// Locale utilities for catalog locale codes
///
/// Catalog locales are an ISO 639 language code with an optional region,
/// written either `pt_BR` (as stored in the catalog) or `pt-BR` (BCP 47,
/// as expected by the translation service).
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-3 (3-letter) code
    Part3,
}

/// A parsed locale code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleParts {
    /// Lowercase language subtag
    pub language: String,
    /// Uppercase region subtag, if any
    pub region: Option<String>,
    /// Kind of language code used
    pub code_type: LanguageCodeType,
}

/// Validate a language subtag against ISO 639
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 && Language::from_639_1(&normalized_code).is_some() {
        return Ok(LanguageCodeType::Part1);
    }

    if normalized_code.len() == 3 && Language::from_639_3(&normalized_code).is_some() {
        return Ok(LanguageCodeType::Part3);
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Split and validate a locale code such as `nl`, `en_US` or `pt-BR`
pub fn parse_locale(code: &str) -> Result<LocaleParts> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("Locale code cannot be empty"));
    }

    let mut parts = trimmed.splitn(2, ['_', '-']);
    let language = parts.next().unwrap_or_default();
    let code_type = validate_language_code(language)
        .map_err(|_| anyhow!("Invalid locale code: {}", code))?;

    let region = match parts.next() {
        None => None,
        Some(region) => {
            let is_alpha = region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic());
            let is_numeric = region.len() == 3 && region.chars().all(|c| c.is_ascii_digit());
            if !is_alpha && !is_numeric {
                return Err(anyhow!("Invalid region in locale code: {}", code));
            }
            Some(region.to_uppercase())
        }
    };

    Ok(LocaleParts {
        language: language.to_lowercase(),
        region,
        code_type,
    })
}

/// Convert a catalog locale into the BCP 47 code the translation service expects
pub fn to_service_code(code: &str) -> Result<String> {
    let parts = parse_locale(code)?;
    Ok(match parts.region {
        Some(region) => format!("{}-{}", parts.language, region),
        None => parts.language,
    })
}

/// Check if two locale codes denote the same locale
pub fn locales_match(code1: &str, code2: &str) -> bool {
    match (to_service_code(code1), to_service_code(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get a human readable name for a locale, used in log lines
pub fn get_locale_name(code: &str) -> Result<String> {
    let parts = parse_locale(code)?;
    let lang = match parts.code_type {
        LanguageCodeType::Part1 => Language::from_639_1(&parts.language),
        LanguageCodeType::Part3 => Language::from_639_3(&parts.language),
    }
    .ok_or_else(|| anyhow!("Failed to get language from code: {}", parts.language))?;

    Ok(match parts.region {
        Some(region) => format!("{} ({})", lang.to_name(), region),
        None => lang.to_name().to_string(),
    })
}
