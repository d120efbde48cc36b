//! Abstract page classification
//!
//! Pages are classified by their link signature rather than by URL. The signature
//! of a page is the [`LinkVector`] of its links: distinct dom paths, distinct
//! action elements per path position, distinct parameter-name sets and distinct
//! parameter sets. Signatures are folded into one shared tree, strictly ordered
//! from root to leaf:
//!
//! ```text
//! DomPathCollection -> ActionElementCollection[0..n] -> ParamKeysCollection -> ParamsCollection
//! ```
//!
//! Two pages reach the same leaf, and therefore the same abstract page, iff their
//! collections are set-equal at every level. The tree only grows.

pub mod page_model;

pub use page_model::{LinkVector, PageModel};

use crate::link::{ConcreteLink, DomPath, ParamSet, same};
use crate::registry::{GiveUpBudget, LinkId, PageId, Registry};

/// Handle of a node in the shared classifier tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// What a classifier node holds
#[derive(Debug, Clone, PartialEq)]
pub enum AptNodeKind {
    Root,
    DomPathCollection(Vec<DomPath>),
    ActionElementCollection {
        index: usize,
        elements: Vec<String>,
    },
    ParamKeysCollection(Vec<Vec<String>>),
    /// Leaf level. Owns the abstract page of its class once one is created.
    ParamsCollection {
        params: Vec<ParamSet>,
        page: Option<PageId>,
    },
}

#[derive(Debug, Clone)]
pub struct AptNode {
    pub kind: AptNodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Shared, process-wide tree of page classes
#[derive(Debug, Clone)]
pub struct PageClassifier {
    nodes: Vec<AptNode>,
}

impl PageClassifier {
    /// Create a classifier holding only the root node
    pub fn new() -> Self {
        Self { nodes: vec![AptNode { kind: AptNodeKind::Root, parent: None, children: Vec::new() }] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &AptNode {
        &self.nodes[id.0]
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Fold the signature of `links` into the tree and return the leaf of its class
    pub fn grow(&mut self, links: &[ConcreteLink]) -> NodeId {
        let vector = PageModel::from_links(links).link_vector();

        let mut last = self.find_or_push(
            self.root(),
            |kind| {
                matches!(kind, AptNodeKind::DomPathCollection(c)
                    if same::collection(&vector.dom_paths, c, |a, b| same::dom_path(a, b)))
            },
            || AptNodeKind::DomPathCollection(vector.dom_paths.clone()),
        );

        for (index, elements) in vector.action_elements.iter().enumerate() {
            last = self.find_or_push(
                last,
                |kind| {
                    matches!(kind, AptNodeKind::ActionElementCollection { index: i, elements: c }
                        if *i == index && same::collection(elements, c, |a, b| same::action_element(a, b)))
                },
                || AptNodeKind::ActionElementCollection { index, elements: elements.clone() },
            );
        }

        last = self.find_or_push(
            last,
            |kind| {
                matches!(kind, AptNodeKind::ParamKeysCollection(c)
                    if same::collection(&vector.param_keys, c, |a, b| same::param_keys(a, b)))
            },
            || AptNodeKind::ParamKeysCollection(vector.param_keys.clone()),
        );

        self.find_or_push(
            last,
            |kind| {
                matches!(kind, AptNodeKind::ParamsCollection { params: c, .. }
                    if same::collection(&vector.params, c, same::params))
            },
            || AptNodeKind::ParamsCollection { params: vector.params.clone(), page: None },
        )
    }

    fn find_or_push<M, F>(&mut self, parent: NodeId, matches: M, make: F) -> NodeId
    where
        M: Fn(&AptNodeKind) -> bool,
        F: FnOnce() -> AptNodeKind,
    {
        if let Some(&child) = self.nodes[parent.0].children.iter().find(|c| matches(&self.nodes[c.0].kind)) {
            return child;
        }

        let child = NodeId(self.nodes.len());
        self.nodes.push(AptNode { kind: make(), parent: Some(parent), children: Vec::new() });
        self.nodes[parent.0].children.push(child);
        child
    }

    /// Abstract page owned by a leaf, if one was created
    pub fn page_at(&self, leaf: NodeId) -> Option<PageId> {
        match self.nodes[leaf.0].kind {
            AptNodeKind::ParamsCollection { page, .. } => page,
            _ => None,
        }
    }

    pub(crate) fn attach_page(&mut self, leaf: NodeId, page_id: PageId) {
        if let AptNodeKind::ParamsCollection { page, .. } = &mut self.nodes[leaf.0].kind {
            *page = Some(page_id);
        }
    }

    /// The DomPathCollection node above `node`
    pub fn dom_path_ancestor(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            if matches!(node.kind, AptNodeKind::DomPathCollection(_)) {
                return Some(id);
            }
            current = node.parent;
        }
        None
    }

    /// Coarse page similarity: both leaves hang below the same DomPathCollection
    pub fn similar(&self, a: NodeId, b: NodeId) -> bool {
        match (self.dom_path_ancestor(a), self.dom_path_ancestor(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }
}

impl Default for PageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve the abstract page for a page reporting `links`.
///
/// Returns the page and whether it was created by this call. A new page gets the
/// abstract links of `links` attached; new abstract links are only created when
/// the page does not look familiar given the step that led here (`arrival`).
pub fn classify(
    classifier: &mut PageClassifier,
    registry: &mut Registry,
    links: &[ConcreteLink],
    arrival: Option<(PageId, LinkId)>,
    budget: GiveUpBudget,
) -> (PageId, bool) {
    let leaf = classifier.grow(links);
    if let Some(page) = classifier.page_at(leaf) {
        log::debug!("Known page {:?} ({} links)", page, links.len());
        return (page, false);
    }

    let familiar = match arrival {
        Some((source, link)) => registry.looks_familiar(classifier, leaf, source, link),
        None => false,
    };
    let page = registry.add_page(leaf);
    classifier.attach_page(leaf, page);
    let created = registry.merge_links(page, links, !familiar, budget);

    log::info!(
        "New page {:?}: {} links, {} new abstract links{}",
        page,
        links.len(),
        created,
        if familiar { " (looks familiar, new links suppressed)" } else { "" }
    );

    (page, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> ConcreteLink {
        ConcreteLink::navigate(format!("https://app.test/item?id={}", id))
            .with_dom_path(["A", "B"])
            .with_action_path(["item"])
            .with_param("id", id)
    }

    fn nav(path: &str) -> ConcreteLink {
        ConcreteLink::from_url(crate::link::LinkKind::Navigate, &format!("https://app.test/{}", path))
            .unwrap()
            .with_dom_path(["NAV", "A"])
    }

    #[test]
    fn test_same_links_any_order_same_leaf() {
        let mut classifier = PageClassifier::new();
        let first = classifier.grow(&[item("1"), nav("home"), item("2")]);
        let second = classifier.grow(&[item("2"), item("1"), nav("home")]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_url_does_not_change_class() {
        let mut classifier = PageClassifier::new();
        let a = classifier.grow(&[item("1")]);
        let mut moved = item("1").with_element_index(3);
        moved.url = "https://app.test/item?id=1&csrf=zz".to_string();
        let b = classifier.grow(&[moved]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_params_different_leaf_shared_ancestors() {
        let mut classifier = PageClassifier::new();
        let one = classifier.grow(&[item("1")]);
        let two = classifier.grow(&[item("2")]);

        assert_ne!(one, two);
        assert_eq!(classifier.node(one).parent, classifier.node(two).parent);
        assert!(classifier.similar(one, two));
    }

    #[test]
    fn test_level_order_from_root() {
        let mut classifier = PageClassifier::new();
        let leaf = classifier.grow(&[nav("a/b")]);

        let mut kinds = Vec::new();
        let mut current = Some(leaf);
        while let Some(id) = current {
            kinds.push(classifier.node(id).kind.clone());
            current = classifier.node(id).parent;
        }
        kinds.reverse();

        assert!(matches!(kinds[0], AptNodeKind::Root));
        assert!(matches!(kinds[1], AptNodeKind::DomPathCollection(_)));
        assert!(matches!(kinds[2], AptNodeKind::ActionElementCollection { index: 0, .. }));
        assert!(matches!(kinds[3], AptNodeKind::ActionElementCollection { index: 1, .. }));
        assert!(matches!(kinds[4], AptNodeKind::ParamKeysCollection(_)));
        assert!(matches!(kinds[5], AptNodeKind::ParamsCollection { .. }));
        assert_eq!(kinds.len(), 6);
    }

    #[test]
    fn test_tree_only_grows() {
        let mut classifier = PageClassifier::new();
        classifier.grow(&[nav("a")]);
        let size = classifier.len();
        classifier.grow(&[nav("a")]);
        assert_eq!(classifier.len(), size);
        classifier.grow(&[nav("b")]);
        assert!(classifier.len() > size);
    }

    #[test]
    fn test_different_dom_paths_not_similar() {
        let mut classifier = PageClassifier::new();
        let a = classifier.grow(&[item("1")]);
        let b = classifier.grow(&[nav("home")]);
        assert!(!classifier.similar(a, b));
    }

    #[test]
    fn test_classify_creates_page_once() {
        let mut classifier = PageClassifier::new();
        let mut registry = Registry::new();
        let links = [item("1"), item("2"), nav("home")];

        let (page, created) = classify(&mut classifier, &mut registry, &links, None, GiveUpBudget::default());
        assert!(created);
        assert_eq!(registry.page(page).links.len(), 3);

        let reordered = [nav("home"), item("2"), item("1")];
        let (again, created) = classify(&mut classifier, &mut registry, &reordered, None, GiveUpBudget::default());
        assert!(!created);
        assert_eq!(page, again);
        assert_eq!(registry.links().len(), 3);
    }

    #[test]
    fn test_per_row_links_stay_distinct() {
        let mut classifier = PageClassifier::new();
        let mut registry = Registry::new();

        let (page, _) = classify(&mut classifier, &mut registry, &[item("1"), item("2")], None, GiveUpBudget::default());
        let leaf = registry.page(page).leaf;

        // One dom path collection and one action element collection, two params
        let AptNodeKind::ParamsCollection { params, .. } = &classifier.node(leaf).kind else {
            panic!("Expected a params leaf");
        };
        assert_eq!(params.len(), 2);
        let keys = classifier.node(leaf).parent.unwrap();
        let action = classifier.node(keys).parent.unwrap();
        let AptNodeKind::ActionElementCollection { elements, .. } = &classifier.node(action).kind else {
            panic!("Expected an action element collection");
        };
        assert_eq!(elements, &vec!["item".to_string()]);

        assert_eq!(registry.page(page).links.len(), 2);
        assert_eq!(registry.links().len(), 2);
    }
}
