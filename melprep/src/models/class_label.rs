//! Filename-derived class labels

use std::fmt;

/// Recording class, chosen by case-insensitive filename prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassLabel {
    Dog,
    Cat,
    Other,
}

impl ClassLabel {
    /// Classify a file stem; `"dog"` is checked before `"cat"`
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.starts_with("dog") {
            ClassLabel::Dog
        } else if lower.starts_with("cat") {
            ClassLabel::Cat
        } else {
            ClassLabel::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLabel::Dog => "dog",
            ClassLabel::Cat => "cat",
            ClassLabel::Other => "other",
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
