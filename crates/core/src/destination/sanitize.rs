/// Characters rejected by DSM shared folders and common filesystems.
const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a string safe to use as a single folder name.
///
/// Replaces forbidden characters and control characters (U+0000..U+001F)
/// with `_`, then strips leading and trailing dots. May return an empty
/// string.
pub fn sanitize_folder_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || (c as u32) < 0x20 {
                '_'
            } else {
                c
            }
        })
        .collect();

    replaced.trim_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_each_forbidden_character() {
        assert_eq!(sanitize_folder_name("Movie: Part 1/2*?"), "Movie_ Part 1_2__");
        assert_eq!(sanitize_folder_name(r#"a<b>c"d\e|f"#), "a_b_c_d_e_f");
    }

    #[test]
    fn test_replaces_control_characters() {
        assert_eq!(sanitize_folder_name("tab\there\nnul\0"), "tab_here_nul_");
    }

    #[test]
    fn test_strips_outer_dots_only() {
        assert_eq!(sanitize_folder_name("..hidden.name..."), "hidden.name");
    }

    #[test]
    fn test_only_dots_becomes_empty() {
        assert_eq!(sanitize_folder_name("...."), "");
    }

    #[test]
    fn test_keeps_unicode_and_spaces() {
        assert_eq!(sanitize_folder_name("Начало 2010"), "Начало 2010");
    }
}
