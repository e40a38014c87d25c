//! Scope negotiation and matching.
//!
//! Scope strings are whitespace-delimited sets of capability tokens.
//! Negotiation intersects a requested scope with a client's allowed set;
//! matching checks whether a granted scope covers a required one. Policy
//! decisions about empty results belong to the callers, not here.

/// Splits a scope string into its whitespace-delimited tokens.
#[must_use]
pub fn split(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_string).collect()
}

/// Intersects a requested scope with an allowed set of scope tokens.
///
/// The result preserves the order of the request, drops tokens not present
/// in `allowed`, and collapses duplicates. An empty result means no
/// requested token was allowed; whether that is an error is the caller's
/// decision.
#[must_use]
pub fn negotiate(requested: &str, allowed: &[String]) -> Vec<String> {
    let mut granted = Vec::new();
    for token in requested.split_whitespace() {
        if allowed.iter().any(|a| a == token) && !granted.iter().any(|g| g == token) {
            granted.push(token.to_string());
        }
    }
    granted
}

/// Returns `true` iff every token in `required` appears in `granted`.
///
/// An empty `required` scope is trivially satisfied.
#[must_use]
pub fn is_satisfied_by(granted: &str, required: &str) -> bool {
    let granted_tokens: Vec<&str> = granted.split_whitespace().collect();
    required
        .split_whitespace()
        .all(|req| granted_tokens.contains(&req))
}

/// Checks a token's scope against a required scope.
///
/// Fails closed: a token that carries no scope satisfies nothing, not
/// even an empty requirement.
#[must_use]
pub fn verify_scope(token_scope: Option<&str>, required: &str) -> bool {
    match token_scope {
        Some(granted) => is_satisfied_by(granted, required),
        None => false,
    }
}
