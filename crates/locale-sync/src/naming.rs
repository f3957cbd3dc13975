//! Name mapping between repository files and translation-project files.

/// Extension of translatable files inside a repository's locale tree.
pub const SOURCE_EXTENSION: &str = "cfg";

/// Extension the translation project uses for the same files.
pub const PROJECT_EXTENSION: &str = "ini";

/// True if a file name carries the repository-side translatable extension.
pub fn is_translatable_file(file_name: &str) -> bool {
    file_name
        .strip_suffix(SOURCE_EXTENSION)
        .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
}

/// `locale.cfg` -> `locale.ini`. Names with any other extension are unchanged.
pub fn to_project_file_name(file_name: &str) -> String {
    replace_extension(file_name, SOURCE_EXTENSION, PROJECT_EXTENSION)
}

/// `locale.ini` -> `locale.cfg`. Names with any other extension are unchanged.
pub fn to_repository_file_name(file_name: &str) -> String {
    replace_extension(file_name, PROJECT_EXTENSION, SOURCE_EXTENSION)
}

fn replace_extension(file_name: &str, from: &str, to: &str) -> String {
    match file_name.strip_suffix(from) {
        Some(stem) if stem.ends_with('.') => format!("{stem}{to}"),
        _ => file_name.to_owned(),
    }
}

/// Directory name for a repository inside the translation project:
/// the repository name in title case followed by the owner in parentheses,
/// e.g. `Factorio Mod Example (dima74)`. Each mod of a multi-mod repository
/// adds its own name, e.g. `Bob Mods - Bob Plates (KiwiHawk)`.
pub fn project_directory_name(owner: &str, repo: &str, subpath: Option<&str>) -> String {
    match subpath {
        Some(subpath) => format!("{} - {} ({})", to_title_case(repo), to_title_case(subpath), owner),
        None => format!("{} ({})", to_title_case(repo), owner),
    }
}

/// Owner recorded in a project directory name, if the name has the
/// `Title (owner)` shape.
pub fn directory_owner(directory_name: &str) -> Option<&str> {
    let inner = directory_name.strip_suffix(')')?;
    let start = inner.rfind(" (")?;
    let owner = &inner[start + 2..];
    (!owner.is_empty()).then_some(owner)
}

/// Split an identifier into words and capitalize each one.
///
/// Word boundaries are any non-alphanumeric character and lower-to-upper
/// case transitions: `fooBar`, `foo-bar` and `foo_bar` all become `Foo Bar`.
/// Existing upper-case runs are kept (`LTN-Language-Pack` -> `LTN Language Pack`).
pub fn to_title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev = ' ';
    let mut first = true;

    for c in s.chars() {
        if c.is_alphanumeric() {
            let boundary = !prev.is_alphanumeric() || (prev.is_lowercase() && c.is_uppercase());
            if boundary {
                if !first {
                    result.push(' ');
                }
                result.push(c.to_ascii_uppercase());
            } else {
                result.push(c);
            }
            first = false;
        }
        prev = c;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- extensions --

    #[test]
    fn cfg_file_is_translatable() {
        assert!(is_translatable_file("locale.cfg"));
        assert!(is_translatable_file("a.b.cfg"));
    }

    #[test]
    fn other_files_are_not_translatable() {
        assert!(!is_translatable_file("readme.txt"));
        assert!(!is_translatable_file("locale.ini"));
        assert!(!is_translatable_file("mycfg"));
        assert!(!is_translatable_file(".cfg"));
    }

    #[test]
    fn maps_cfg_to_ini_and_back() {
        assert_eq!(to_project_file_name("locale.cfg"), "locale.ini");
        assert_eq!(to_repository_file_name("locale.ini"), "locale.cfg");
    }

    #[test]
    fn only_the_final_extension_is_rewritten() {
        assert_eq!(to_project_file_name("cfg.cfg"), "cfg.ini");
        assert_eq!(to_project_file_name("xcfg"), "xcfg");
        assert_eq!(to_repository_file_name("ini.ini"), "ini.cfg");
    }

    #[test]
    fn extension_round_trip() {
        for name in ["a.cfg", "locale.cfg", "settings.with.dots.cfg", "UPPER.cfg", "ini.cfg"] {
            assert_eq!(to_repository_file_name(&to_project_file_name(name)), name);
        }
        for name in ["a.ini", "locale.ini", "cfg.ini"] {
            assert_eq!(to_project_file_name(&to_repository_file_name(name)), name);
        }
    }

    // -- project directory names --

    #[test]
    fn directory_name_from_owner_and_repo() {
        assert_eq!(
            project_directory_name("dima74", "factorio-mod-example", None),
            "Factorio Mod Example (dima74)"
        );
    }

    #[test]
    fn directory_name_of_one_mod_in_a_repository() {
        assert_eq!(
            project_directory_name("KiwiHawk", "bobsmods", Some("bobplates")),
            "Bobsmods - Bobplates (KiwiHawk)"
        );
        assert_eq!(
            project_directory_name("o", "mod-pack", Some("SpaceMod")),
            "Mod Pack - Space Mod (o)"
        );
        assert_eq!(directory_owner("Mod Pack - Space Mod (o)"), Some("o"));
    }

    #[test]
    fn directory_names_are_distinct_for_distinct_repositories() {
        let pairs = [
            ("dima74", "factorio-mod-example"),
            ("other", "factorio-mod-example"),
            ("dima74", "factorio-todo-list"),
            ("Karosieben", "boblocale"),
            ("raiguard", "FactorySearch"),
            ("raiguard", "Factorio-Sniper-Rifle"),
        ];
        let names: std::collections::HashSet<String> = pairs
            .iter()
            .map(|(owner, repo)| project_directory_name(owner, repo, None))
            .collect();
        assert_eq!(names.len(), pairs.len());
    }

    #[test]
    fn directory_name_is_stable() {
        assert_eq!(
            project_directory_name("o", "Noxys_StackSizeMultiplier", None),
            project_directory_name("o", "Noxys_StackSizeMultiplier", None)
        );
    }

    #[test]
    fn extracts_owner_from_directory_name() {
        assert_eq!(directory_owner("Factorio Mod Example (dima74)"), Some("dima74"));
        assert_eq!(directory_owner("Odd (Name) (owner)"), Some("owner"));
        assert_eq!(directory_owner("No Owner"), None);
        assert_eq!(directory_owner("Empty ()"), None);
    }

    // -- title case --

    #[test]
    fn title_case_simple() {
        assert_eq!(to_title_case("fooBar"), "Foo Bar");
        assert_eq!(to_title_case("FooBar"), "Foo Bar");
        assert_eq!(to_title_case("foo-bar"), "Foo Bar");
        assert_eq!(to_title_case("foo_bar"), "Foo Bar");
        assert_eq!(to_title_case("FOO-BAR"), "FOO BAR");
    }

    #[test]
    fn title_case_separators() {
        assert_eq!(to_title_case("foo    bar"), "Foo Bar");
        assert_eq!(to_title_case("-_.foo-_.bar-_."), "Foo Bar");
        assert_eq!(to_title_case("Factorio.LongWarehouses"), "Factorio Long Warehouses");
    }

    #[test]
    fn title_case_only_capitalizes_ascii() {
        assert_eq!(to_title_case("ßig-mod"), "ßig Mod");
        assert_eq!(to_title_case("élan"), "élan");
    }

    #[test]
    fn title_case_keeps_acronyms_and_digits() {
        assert_eq!(to_title_case("LTN-Language-Pack"), "LTN Language Pack");
        assert_eq!(to_title_case("factorio-money-UI"), "Factorio Money UI");
        assert_eq!(to_title_case("Factorissimo2"), "Factorissimo2");
        assert_eq!(to_title_case("Factorio-Modules-T4"), "Factorio Modules T4");
        assert_eq!(
            to_title_case("factorio-AutoPauseForAFKplayers"),
            "Factorio Auto Pause For AFKplayers"
        );
    }
}
