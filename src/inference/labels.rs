//! Class label table

use std::path::Path;

use crate::error::{AgriError, Result};

/// Ordered labels; index `i` names the classifier's i-th score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassLabelTable {
    labels: Vec<String>,
}

impl ClassLabelTable {
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(AgriError::Configuration("label table is empty".to_string()));
        }
        Ok(Self { labels })
    }

    /// Parse one label per line. Surrounding whitespace is trimmed and blank
    /// lines are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty()),
        )
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AgriError::Configuration(format!("cannot read labels {}: {}", path.display(), e))
        })?;
        Self::parse(&text)
    }

    /// Fail unless the table has exactly one label per classifier output.
    pub fn ensure_matches(&self, num_classes: usize) -> Result<()> {
        if self.labels.len() != num_classes {
            return Err(AgriError::Configuration(format!(
                "label table has {} entries but classifier outputs {} scores",
                self.labels.len(),
                num_classes
            )));
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_blank_lines() {
        let table = ClassLabelTable::parse("Leaf Blast\n\n  Brown Spot  \nHealthy\n").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1), Some("Brown Spot"));
        assert_eq!(table.get(3), None);
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(
            ClassLabelTable::parse("\n  \n"),
            Err(AgriError::Configuration(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let table = ClassLabelTable::new(["A", "B", "C"]).unwrap();
        assert!(table.ensure_matches(3).is_ok());
        assert!(matches!(
            table.ensure_matches(4),
            Err(AgriError::Configuration(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ClassLabelTable::from_file("/nonexistent/labels.txt"),
            Err(AgriError::Configuration(_))
        ));
    }
}
