//! Deterministic instance naming.
//!
//! An instance is named after its owner and its image:
//! `undockit-<uid>-<image12>`. The same user invoking the same image always
//! targets the same name, which is what makes reuse possible without a
//! registry; scoping by uid keeps users on a shared host from exec-ing into
//! each other's sandboxes.

use std::fmt;

use crate::runtime::types::ImageId;

/// Prefix of every instance name managed by undockit.
pub const INSTANCE_PREFIX: &str = "undockit";

/// Name of a warm instance, as passed to the engine's `--name`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InstanceName(String);

impl InstanceName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for InstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceName({})", self.0)
    }
}

impl AsRef<str> for InstanceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name the instance for `image` owned by `uid`.
///
/// # Example
///
/// ```
/// use undockit::{ImageId, instance_name};
///
/// let name = instance_name(1000, &ImageId::new("abc123def4567890"));
/// assert_eq!(name.as_str(), "undockit-1000-abc123def456");
/// ```
pub fn instance_name(uid: u32, image: &ImageId) -> InstanceName {
    InstanceName(format!("{}-{}-{}", INSTANCE_PREFIX, uid, image.short()))
}

/// Numeric identity of the invoking user.
pub fn current_uid() -> u32 {
    nix::unistd::getuid().as_raw()
}
