//! Qualified names.

use std::fmt;

/// A namespace-qualified identifier, e.g. `Demo.Sub.Sample`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualifiedName {
    /// Dot-separated namespace (`Demo.Sub`).
    pub namespace: String,
    /// Unqualified name (`Sample`).
    pub name: String,
}

impl QualifiedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Symbol-safe form: namespace dots become `__`, joined to the name by `__`.
    ///
    /// `Demo.Sub` + `Sample` → `Demo__Sub__Sample`.
    pub fn flatten(&self) -> String {
        format!("{}__{}", self.namespace.replace('.', "__"), self.name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_replaces_namespace_dots() {
        let name = QualifiedName::new("Demo.Sub", "Sample");
        assert_eq!(name.flatten(), "Demo__Sub__Sample");
        assert_eq!(name.to_string(), "Demo.Sub.Sample");
    }

    #[test]
    fn flatten_single_segment_namespace() {
        assert_eq!(QualifiedName::new("Qrng", "RandomInts").flatten(), "Qrng__RandomInts");
    }
}
