//! Configuration for access control lists.

/// Configuration for ACL behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AclConfig {
    /// Verify each new entry's signature before appending it.
    pub verify_on_append: bool,
    /// Verify entry signatures when materializing a fetched list.
    ///
    /// Entries failing verification are dropped and logged.
    pub verify_on_materialize: bool,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            verify_on_append: true,
            verify_on_materialize: true,
        }
    }
}
