/// What to do when a merged name already exists in the target document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Fail the whole merge, leaving the target untouched
    #[default]
    Reject,
    /// Replace the existing entry with the one from the source
    Override,
}

impl CollisionPolicy {
    /// Map the `--override` flag onto a policy.
    #[must_use]
    pub const fn from_override_flag(override_existing: bool) -> Self {
        if override_existing {
            Self::Override
        } else {
            Self::Reject
        }
    }
}
