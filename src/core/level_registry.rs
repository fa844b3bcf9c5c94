//! Severity level registry
//!
//! Maps uppercase level names to integer ranks (0 = least severe) and to the
//! single display character written at the start of every log line. The
//! registry can be rebuilt at runtime from any ordered list of names.

use std::collections::HashMap;
use std::fmt;

/// Level names used until the registry is reconfigured
pub const DEFAULT_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARN", "ERROR", "FATAL"];

/// Ordered set of severity names with their ranks and display characters
///
/// Duplicate names collapse onto the rank of their first occurrence, so the
/// number of ranks can be smaller than the number of configured names.
///
/// # Example
///
/// ```
/// use level_file_logger::LevelRegistry;
///
/// let mut registry = LevelRegistry::default();
/// assert_eq!(registry.rank("warn"), Some(2));
/// assert_eq!(registry.rank("TRACE"), None);
///
/// registry.configure(["trace", "info", "info", "alert"]);
/// assert_eq!(registry.len(), 3);
/// assert_eq!(registry.rank_char(2), Some('A'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRegistry {
    ordered_names: Vec<String>,
    name_to_rank: HashMap<String, usize>,
    rank_names: Vec<String>,
    rank_chars: Vec<char>,
}

impl LevelRegistry {
    /// Build a registry from an ordered list of names
    ///
    /// Falls back to [`DEFAULT_LEVELS`] when `names` holds no usable name.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::default();
        registry.configure(names);
        registry
    }

    /// Replace the level list
    ///
    /// Names are uppercased; blank names are ignored. Returns `false` and keeps
    /// the current configuration when nothing usable was supplied.
    pub fn configure<I, S>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ordered: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_uppercase())
            .filter(|name| !name.is_empty())
            .collect();

        if ordered.is_empty() {
            return false;
        }

        self.ordered_names = ordered;
        self.reindex();
        true
    }

    fn reindex(&mut self) {
        self.name_to_rank.clear();
        self.rank_names.clear();
        self.rank_chars.clear();

        for name in &self.ordered_names {
            if self.name_to_rank.contains_key(name) {
                continue;
            }
            let rank = self.rank_names.len();
            self.name_to_rank.insert(name.clone(), rank);
            self.rank_names.push(name.clone());
            // non-empty by construction
            self.rank_chars.push(name.chars().next().unwrap_or('?'));
        }
    }

    /// Resolve a level name (case-insensitive) to its rank
    pub fn rank(&self, name: &str) -> Option<usize> {
        if let Some(rank) = self.name_to_rank.get(name) {
            return Some(*rank);
        }
        self.name_to_rank.get(&name.to_uppercase()).copied()
    }

    /// Display character for a rank
    #[inline]
    pub fn rank_char(&self, rank: usize) -> Option<char> {
        self.rank_chars.get(rank).copied()
    }

    /// Canonical (first-seen) name for a rank
    #[inline]
    pub fn rank_name(&self, rank: usize) -> Option<&str> {
        self.rank_names.get(rank).map(String::as_str)
    }

    /// Number of distinct ranks
    #[inline]
    pub fn len(&self) -> usize {
        self.rank_names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rank_names.is_empty()
    }

    /// Names exactly as configured, duplicates included
    pub fn ordered_names(&self) -> &[String] {
        &self.ordered_names
    }

    /// One `(rank, name)` pair per distinct rank
    pub fn ranks(&self) -> impl Iterator<Item = (usize, &str)> {
        self.rank_names
            .iter()
            .enumerate()
            .map(|(rank, name)| (rank, name.as_str()))
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        let mut registry = Self {
            ordered_names: DEFAULT_LEVELS.iter().map(|s| s.to_string()).collect(),
            name_to_rank: HashMap::new(),
            rank_names: Vec::new(),
            rank_chars: Vec::new(),
        };
        registry.reindex();
        registry
    }
}

impl fmt::Display for LevelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rank_names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_levels() {
        let registry = LevelRegistry::default();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.rank("DEBUG"), Some(0));
        assert_eq!(registry.rank("info"), Some(1));
        assert_eq!(registry.rank("Warn"), Some(2));
        assert_eq!(registry.rank("error"), Some(3));
        assert_eq!(registry.rank("FATAL"), Some(4));
        let chars: String = (0..5).filter_map(|r| registry.rank_char(r)).collect();
        assert_eq!(chars, "DIWEF");
        assert_eq!(registry.to_string(), "DEBUG,INFO,WARN,ERROR,FATAL");
    }

    #[test]
    fn test_unknown_level() {
        let registry = LevelRegistry::default();
        assert_eq!(registry.rank("TRACE"), None);
        assert_eq!(registry.rank(""), None);
        assert_eq!(registry.rank_char(5), None);
        assert_eq!(registry.rank_name(5), None);
    }

    #[test]
    fn test_empty_configure_is_noop() {
        let mut registry = LevelRegistry::default();
        let empty: Vec<&str> = Vec::new();
        assert!(!registry.configure(empty));
        assert!(!registry.configure(["", "  "]));
        assert_eq!(registry, LevelRegistry::default());
    }

    #[test]
    fn test_duplicates_collapse_to_first_rank() {
        let mut registry = LevelRegistry::default();
        assert!(registry.configure(["info", "warn", "INFO", "error"]));

        assert_eq!(registry.ordered_names().len(), 4);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.rank("INFO"), Some(0));
        assert_eq!(registry.rank("ERROR"), Some(2));
        assert_eq!(registry.rank_char(2), Some('E'));
        assert_eq!(registry.rank_name(1), Some("WARN"));
    }

    #[test]
    fn test_rank_chars_track_distinct_ranks() {
        let registry = LevelRegistry::new(["a", "b", "a", "c", "b"]);
        let ranks: Vec<(usize, &str)> = registry.ranks().collect();
        assert_eq!(ranks, vec![(0, "A"), (1, "B"), (2, "C")]);
        assert_eq!(registry.rank_char(2), Some('C'));
    }
}
