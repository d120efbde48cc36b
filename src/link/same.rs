//! Structural equivalence predicates
//!
//! These decide when two concrete controls (or two pages' link signatures) count
//! as the same thing for crawling purposes. Concrete URL and method never take
//! part in link identity.

use super::concrete::{ConcreteLink, ParamSet};

pub fn dom_path(a: &[String], b: &[String]) -> bool {
    a == b
}

pub fn action_element(a: &str, b: &str) -> bool {
    a == b
}

/// Positional comparison of two action paths
pub fn action_path(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| action_element(x, y))
}

/// Set equality on parameter names
pub fn param_keys(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().all(|key| b.contains(key))
}

/// Same key set and the same value under every key
pub fn params(a: &ParamSet, b: &ParamSet) -> bool {
    a.len() == b.len() && a.iter().all(|(key, value)| b.get(key) == Some(value))
}

/// Abstract identity of two links: DOM path, action path and params
pub fn link(a: &ConcreteLink, b: &ConcreteLink) -> bool {
    dom_path(&a.dom_path, &b.dom_path) && action_path(&a.action_path, &b.action_path) && params(&a.params, &b.params)
}

/// Size-and-coverage equality of two collections.
///
/// Equal sizes plus every element of `a` matching some element of `b`. This is
/// not a bijection check: `[x, x]` compares equal to `[x, y]` (but not the other
/// way round), while `[x, x]` against `[x]` fails on size. Collections built by
/// the classifier are deduplicated, so the approximation only shows up with
/// duplicate-heavy input.
pub fn collection<T, F>(a: &[T], b: &[T], same: F) -> bool
where
    F: Fn(&T, &T) -> bool,
{
    a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| same(x, y)))
}
