//! Concrete link model and structural equivalence
//!
//! This module describes the controls a page exposes to the crawler:
//! - ConcreteLink: one observed anchor or form, as reported by a browser driver
//! - same: equivalence predicates used to collapse concrete links and pages into
//!   their abstract counterparts

pub mod concrete;
pub mod same;

pub use concrete::{ActionPath, ConcreteLink, DomPath, LinkKind, ParamSet};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_link_export() {
        let link = ConcreteLink::navigate("https://example.com/");
        assert_eq!(link.kind, LinkKind::Navigate);
    }

    #[test]
    fn test_same_export() {
        let a = ConcreteLink::navigate("https://example.com/a").with_param("id", "1");
        let b = ConcreteLink::navigate("https://example.com/b").with_param("id", "1");
        assert!(same::link(&a, &b));
    }
}
