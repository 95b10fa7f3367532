//! Suffix assignment for repeated class occurrences
//!
//! Every time a class code reappears in the walk it receives a fresh
//! alphabetic suffix (`a`, `b`, ... `z`, then two-character codes drawn
//! from a wider alphabet). Property codes reuse the suffix of the class
//! occurrence they belong to.

use indexmap::IndexMap;

const BASE_MAP: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const EXTENDED_MAP: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn int_to_custom_alpha(index: u32) -> String {
    if index < 26 {
        return (BASE_MAP[index as usize] as char).to_string();
    }
    let mut suffix = int_to_custom_alpha(index / 26 - 1);
    suffix.push(EXTENDED_MAP[(index % 62) as usize] as char);
    suffix
}

/// Assigns occurrence suffixes to class and property codes.
///
/// Codes without an underscore are class codes and open a new
/// occurrence; codes of the form `<class>_<ext>` are property codes and
/// inherit the suffix of the current class occurrence, starting a new
/// one only when their base differs from the last class seen.
#[derive(Debug, Default)]
pub struct IndexManager {
    counters: IndexMap<String, u32>,
    current_suffix: String,
    last_base: String,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_suffix(&mut self, class_code: &str) -> String {
        let counter = self.counters.entry(class_code.to_string()).or_insert(0);
        *counter += 1;
        int_to_custom_alpha(*counter - 1)
    }

    /// Rewrite `code` with the occurrence suffix spliced in after the
    /// class part.
    pub fn indexed_code(&mut self, code: &str) -> String {
        match code.split_once('_') {
            None => {
                self.current_suffix = self.next_suffix(code);
                self.last_base = code.to_string();
                format!("{}{}", code, self.current_suffix)
            }
            Some((base, extension)) => {
                if base != self.last_base {
                    self.current_suffix = self.next_suffix(base);
                }
                format!("{}{}_{}", base, self.current_suffix, extension)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_sequence() {
        assert_eq!(int_to_custom_alpha(0), "a");
        assert_eq!(int_to_custom_alpha(25), "z");
        assert_eq!(int_to_custom_alpha(26), "aa");
        assert_eq!(int_to_custom_alpha(27), "ab");
    }

    #[test]
    fn test_class_occurrences_get_fresh_suffixes() {
        let mut index = IndexManager::new();
        assert_eq!(index.indexed_code("GE01"), "GE01a");
        assert_eq!(index.indexed_code("GE01"), "GE01b");
        assert_eq!(index.indexed_code("GE02"), "GE02a");
    }

    #[test]
    fn test_properties_reuse_class_suffix() {
        let mut index = IndexManager::new();
        assert_eq!(index.indexed_code("GE01"), "GE01a");
        assert_eq!(index.indexed_code("GE01_02"), "GE01a_02");
        assert_eq!(index.indexed_code("GE01"), "GE01b");
        assert_eq!(index.indexed_code("GE01_02"), "GE01b_02");
    }

    #[test]
    fn test_property_with_unseen_base_opens_occurrence() {
        let mut index = IndexManager::new();
        index.indexed_code("GE01");
        assert_eq!(index.indexed_code("GE02_01"), "GE02a_01");
    }
}
