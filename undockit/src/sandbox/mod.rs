//! Scripts executed inside the sandbox.
//!
//! The sandbox's entrypoint is replaced by a POSIX shell script that deploys
//! the exec helper and then runs the idle reaper loop as the main process.
//! Only `/bin/sh` and basic coreutils (`ls`, `wc`, `stat`, `date`, `sleep`)
//! are assumed to exist in the image.

mod script;

pub use script::StartupScript;
