//! Symbol naming for generated functions and globals.
//!
//! # Naming Scheme
//!
//! ```text
//! <flattened>__<suffix>            specialization
//! <flattened>__<suffix>__wrapper   uniform-signature wrapper
//! <flattened>                      dispatch table global
//! <ns_with_underscores>_<name>     native entry point
//! ```
//!
//! `<flattened>` is the namespace with `.` replaced by `__`, joined to the
//! callable name by `__`. Suffixes are `body`, `adj`, `ctl`, `ctladj`.
//!
//! | Source | Symbol |
//! |--------|--------|
//! | `Demo.Sub.Sample` body | `Demo__Sub__Sample__body` |
//! | `Demo.Sub.Sample` body wrapper | `Demo__Sub__Sample__body__wrapper` |
//! | `Demo.Sub.Sample` table | `Demo__Sub__Sample` |
//! | `Qrng.RandomInts` entry point | `Qrng_RandomInts` |

use qirgen_ir::{QualifiedName, SpecializationKind};

/// Suffix appended to a specialization name to form its wrapper name.
pub const WRAPPER_SUFFIX: &str = "__wrapper";

/// Runtime library symbol prefix.
pub const RUNTIME_PREFIX: &str = "__quantum__rt__";

/// Quantum instruction set symbol prefix.
pub const QIS_PREFIX: &str = "__quantum__qis__";

/// Name of a specialization function.
pub fn specialization_name(name: &QualifiedName, kind: SpecializationKind) -> String {
    format!("{}__{}", name.flatten(), kind.suffix())
}

/// Name of the wrapper of a specialization.
pub fn wrapper_name(name: &QualifiedName, kind: SpecializationKind) -> String {
    let mut out = specialization_name(name, kind);
    out.push_str(WRAPPER_SUFFIX);
    out
}

/// Name of a callable's dispatch table, also its wrapper-queue key.
pub fn dispatch_table_name(name: &QualifiedName) -> String {
    name.flatten()
}

/// Name of the native entry point exposed for an entry-point callable.
pub fn entry_point_name(name: &QualifiedName) -> String {
    format!("{}_{}", name.namespace.replace('.', "_"), name.name)
}

/// Name a natively compiled runtime exports for a library function:
/// the symbol without its leading underscores.
pub fn native_name(symbol: &str) -> &str {
    symbol.trim_start_matches('_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QualifiedName {
        QualifiedName::new("Demo.Sub", "Sample")
    }

    #[test]
    fn specialization_names() {
        let name = sample();
        assert_eq!(
            specialization_name(&name, SpecializationKind::Body),
            "Demo__Sub__Sample__body"
        );
        assert_eq!(
            specialization_name(&name, SpecializationKind::ControlledAdjoint),
            "Demo__Sub__Sample__ctladj"
        );
    }

    #[test]
    fn wrapper_appends_suffix() {
        assert_eq!(
            wrapper_name(&sample(), SpecializationKind::Body),
            "Demo__Sub__Sample__body__wrapper"
        );
    }

    #[test]
    fn table_and_entry_point_names() {
        assert_eq!(dispatch_table_name(&sample()), "Demo__Sub__Sample");
        assert_eq!(
            entry_point_name(&QualifiedName::new("Qrng", "RandomInts")),
            "Qrng_RandomInts"
        );
        assert_eq!(entry_point_name(&sample()), "Demo_Sub_Sample");
    }

    #[test]
    fn native_name_strips_leading_underscores() {
        assert_eq!(
            native_name("__quantum__rt__array_create_1d"),
            "quantum__rt__array_create_1d"
        );
    }
}
