//! External collaborator traits: department directory and authorization.
//!
//! The review engine consumes these but does not implement them; the
//! surrounding application wires in whatever backs them (an org-chart
//! service, a session store). Both are synchronous from the engine's
//! perspective -- async orchestration wraps the engine, not the other
//! way around.

/// Lookup of departments referenced by review steps.
pub trait DepartmentDirectory {
    /// Whether the department exists at all.
    fn exists(&self, department: &str) -> bool;

    /// Whether the department is currently open for review work.
    fn is_open(&self, department: &str) -> bool;
}

/// Decides whether a principal may act for a department.
///
/// Elevated principals (administrators) are this oracle's concern: it
/// simply answers allow/deny for the pair it is given.
pub trait AuthorizationOracle {
    fn allows(&self, principal: &str, department: &str) -> bool;
}
