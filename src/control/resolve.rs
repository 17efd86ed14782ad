//! The priority chain used to pick a working value from a catalog.
//!
//! ```text
//! persisted (if listed verbatim)
//!   └─▶ preferred default (if listed verbatim)
//!         └─▶ first listed entry
//!               └─▶ nothing (empty catalog)
//! ```
//!
//! Devices use the OS default as the preferred default; voices have none.

use crate::catalog::{DeviceSet, VoiceSet};

/// Pick an entry of `available` by the priority chain above.
///
/// `key` extracts the identifier each candidate is compared against.
/// Comparison is exact.
///
/// ```
/// use parrot_control::control::resolve_with_fallback;
///
/// let available = ["Mic-A", "Mic-C"];
/// let chosen = resolve_with_fallback(Some("Mic-B"), Some("Mic-C"), &available, |d| *d);
/// assert_eq!(chosen, Some(&"Mic-C"));
/// ```
pub fn resolve_with_fallback<'a, T>(
    persisted: Option<&str>,
    preferred_default: Option<&str>,
    available: &'a [T],
    key: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    let listed = |wanted: &str| available.iter().find(|item| key(item) == wanted);

    persisted
        .and_then(|p| listed(p))
        .or_else(|| preferred_default.and_then(|d| listed(d)))
        .or_else(|| available.first())
}

/// Resolve a device name against `devices`, preferring the OS default over
/// the first entry.
pub fn resolve_device(persisted: Option<&str>, devices: &DeviceSet) -> Option<String> {
    resolve_with_fallback(
        persisted,
        devices.system_default.as_deref(),
        &devices.available,
        |d| d.as_str(),
    )
    .cloned()
}

/// Resolve a voice id against `voices`.
pub fn resolve_voice(persisted: Option<&str>, voices: &VoiceSet) -> Option<String> {
    resolve_with_fallback(persisted, None, &voices.available, |v| v.id.as_str())
        .map(|v| v.id.clone())
}
