//! Permission label derivation.
//!
//! The label is a formatting contract: terms appear in the fixed order
//! readable → writable → deletable, joined by `", "`. No flags set yields
//! an empty string.

use crate::models::permission::CapabilityFlags;

pub const READABLE: &str = "Readable";
pub const WRITABLE: &str = "Writable";
pub const DELETABLE: &str = "Deletable";

const SEPARATOR: &str = ", ";

/// Derive the display label for a set of capability flags.
pub fn permission_label(flags: CapabilityFlags) -> String {
    [
        (flags.readable, READABLE),
        (flags.writable, WRITABLE),
        (flags.deletable, DELETABLE),
    ]
    .into_iter()
    .filter_map(|(set, term)| set.then_some(term))
    .collect::<Vec<_>>()
    .join(SEPARATOR)
}
