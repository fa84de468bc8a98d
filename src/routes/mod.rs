/// Router Module Index
///
/// API routes split by what the handler needs from the caller. Both groups are
/// nested under the API prefix, which the admission gate always lets through:
/// these handlers decide for themselves whether a session is required.

/// Routes usable without a session (handlers may still look at one).
pub mod public;

/// Routes whose handlers require a signed-in user via the `CurrentUser` extractor.
pub mod authenticated;
