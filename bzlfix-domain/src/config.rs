use crate::registry::KnownLoads;

/// Name of the library rule the generator emits for a package.
pub const DEFAULT_LIB_NAME: &str = "go_default_library";

/// Name legacy generators gave to the cgo half of a package.
pub const DEFAULT_CGO_LIB_NAME: &str = "cgo_default_library";

/// Comment directive that marks a rule as hand-maintained.
pub const KEEP_DIRECTIVE: &str = "keep";

/// Everything the fixers need to know about the generator's conventions.
///
/// Built once and passed explicitly to the fixers; nothing here is process-global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixConfig {
    pub library_name: String,
    pub cgo_library_name: String,
    pub keep_directive: String,
    pub known_loads: KnownLoads,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            library_name: DEFAULT_LIB_NAME.to_string(),
            cgo_library_name: DEFAULT_CGO_LIB_NAME.to_string(),
            keep_directive: KEEP_DIRECTIVE.to_string(),
            known_loads: KnownLoads::default(),
        }
    }
}
