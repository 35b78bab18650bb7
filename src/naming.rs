//! Resource name pluralization
//!
//! Known limitation: this is a simplified heuristic, not an English
//! pluralizer. Names ending in a vowel get `s`, everything else gets `es`,
//! so `"Person"` becomes `"Persones"`. Declare `resource_name` explicitly
//! for irregular nouns.

/// Convert a singular resource name to its plural form
///
/// # Examples
///
/// ```
/// use hyperres::naming::pluralize;
///
/// assert_eq!(pluralize("movie"), "movies");
/// assert_eq!(pluralize("planet"), "planetes");
/// ```
pub fn pluralize(name: &str) -> String {
    match name.chars().last() {
        None => String::new(),
        Some(c) if is_vowel(c) => format!("{}s", name),
        Some(_) => format!("{}es", name),
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize_vowel_ending() {
        assert_eq!(pluralize("movie"), "movies");
        assert_eq!(pluralize("photo"), "photos");
        assert_eq!(pluralize("FILE"), "FILEs");
    }

    #[test]
    fn test_pluralize_consonant_ending() {
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("designer"), "designeres");
        assert_eq!(pluralize("Person"), "Persones");
    }

    #[test]
    fn test_pluralize_empty_string() {
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn test_pluralize_non_ascii() {
        assert_eq!(pluralize("café"), "cafées");
    }
}
