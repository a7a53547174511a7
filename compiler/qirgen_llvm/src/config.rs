//! Generation configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// File name of the interop bridge module, written next to the primary output.
pub const BRIDGE_FILE_NAME: &str = "bridge.ll";

/// Options controlling one generation run.
///
/// Serializable so hosts can embed it in their own configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base name of the output files (`<base>.ll`, `<base>.log`).
    pub output_base_name: String,
    /// Emit native-friendly entry points and the bridge module.
    pub emit_interop: bool,
    /// Runtime handle name (`"Array"`, `"String"`, ...) to native type name.
    ///
    /// A native name that is an LLVM primitive (`i8`, `i16`, `i32`, `i64`,
    /// `double`) maps to that primitive; any other name is a pointer to a
    /// native struct of that name.
    pub interop_type_map: BTreeMap<String, String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            output_base_name: "program".to_string(),
            emit_interop: false,
            interop_type_map: BTreeMap::new(),
        }
    }
}

impl GenerationConfig {
    /// Create a configuration for the given output base name.
    #[must_use]
    pub fn new(output_base_name: impl Into<String>) -> Self {
        Self {
            output_base_name: output_base_name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_interop(mut self, enabled: bool) -> Self {
        self.emit_interop = enabled;
        self
    }

    /// Map a runtime handle name to a native type name.
    #[must_use]
    pub fn with_native_type(mut self, runtime: impl Into<String>, native: impl Into<String>) -> Self {
        self.interop_type_map.insert(runtime.into(), native.into());
        self
    }

    /// Configured native type name for a runtime handle name.
    pub fn native_type(&self, runtime: &str) -> Option<&str> {
        self.interop_type_map.get(runtime).map(String::as_str)
    }

    /// Primary IR file name.
    pub fn ir_file_name(&self) -> String {
        format!("{}.ll", self.output_base_name)
    }

    /// Verification log file name.
    pub fn log_file_name(&self) -> String {
        format!("{}.log", self.output_base_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_base_name() {
        let config = GenerationConfig::new("qrng");
        assert_eq!(config.ir_file_name(), "qrng.ll");
        assert_eq!(config.log_file_name(), "qrng.log");
        assert!(!config.emit_interop);
    }

    #[test]
    fn native_type_lookup() {
        let config = GenerationConfig::default()
            .with_interop(true)
            .with_native_type("Array", "QirArray")
            .with_native_type("Result", "i64");
        assert_eq!(config.native_type("Array"), Some("QirArray"));
        assert_eq!(config.native_type("Result"), Some("i64"));
        assert_eq!(config.native_type("String"), None);
    }
}
