//! Shebang argument repair.
//!
//! A tool installed with a shebang such as
//!
//! ```text
//! #!/usr/bin/env undockit run --timeout=300 --no-gpu
//! ```
//!
//! is started by the kernel as
//! `["undockit", "run --timeout=300 --no-gpu", "<tool path>"]`: everything
//! after the interpreter arrives as one argument. [`get_args`] splits that
//! argument back into words before clap sees it.

use std::ffi::OsString;

/// Repair smooshed shebang arguments.
///
/// Only the exact shape `[prog, "run ...", path]` is rewritten. If the
/// smooshed part is not UTF-8 or cannot be split (unbalanced quotes), or any
/// other shape is given, the arguments are returned unchanged. The tool path
/// and every other argument keep their original bytes.
pub fn get_args(args: Vec<OsString>) -> Vec<OsString> {
    let words = match args.as_slice() {
        [_, smooshed, _] => smooshed
            .to_str()
            .filter(|s| s.starts_with("run "))
            .and_then(shlex::split),
        _ => None,
    };

    match words {
        Some(words) => {
            let mut args = args.into_iter();
            let mut repaired = Vec::with_capacity(words.len() + 2);
            repaired.extend(args.next());
            repaired.extend(words.into_iter().map(OsString::from));
            repaired.extend(args.nth(1));
            repaired
        }
        None => args,
    }
}
