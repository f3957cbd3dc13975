/// Directory name of the language every other translation is derived from.
pub const SOURCE_LANGUAGE: &str = "en";

/// Placeholder directory some repositories keep next to real languages.
pub const TEMPLATE_DIRECTORY: &str = "template";

/// Convert a locale directory name to the code the translation project expects.
///
/// Some repositories name their directories `pt-br` while the project wants
/// `pt-BR`. Codes with exactly one hyphen get their region upper-cased;
/// everything else is returned as-is.
pub fn normalize_language_code(code: &str) -> String {
    let mut parts = code.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(language), Some(region), None) => {
            format!("{language}-{}", region.to_uppercase())
        }
        _ => code.to_owned(),
    }
}

/// True if the directory name denotes an actual language.
pub fn is_language_directory(name: &str) -> bool {
    name != TEMPLATE_DIRECTORY && !name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_region() {
        assert_eq!(normalize_language_code("pt-br"), "pt-BR");
        assert_eq!(normalize_language_code("zh-cn"), "zh-CN");
        assert_eq!(normalize_language_code("es-ES"), "es-ES");
    }

    #[test]
    fn plain_codes_pass_through() {
        assert_eq!(normalize_language_code("de"), "de");
        assert_eq!(normalize_language_code("FR"), "FR");
        assert_eq!(normalize_language_code(""), "");
    }

    #[test]
    fn ambiguous_codes_pass_through() {
        assert_eq!(normalize_language_code("zh-cn-extra"), "zh-cn-extra");
        assert_eq!(normalize_language_code("a-b-c-d"), "a-b-c-d");
    }

    #[test]
    fn normalization_is_idempotent() {
        for code in ["pt-br", "de", "zh-cn-extra", "sr-latn", "-x", "x-", "", "es-ES"] {
            let once = normalize_language_code(code);
            assert_eq!(normalize_language_code(&once), once, "not idempotent for {code:?}");
        }
    }

    #[test]
    fn template_is_not_a_language() {
        assert!(!is_language_directory("template"));
        assert!(!is_language_directory(".git"));
        assert!(is_language_directory("fr"));
    }
}
