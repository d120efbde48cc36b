use crate::link::{ConcreteLink, DomPath, ParamSet, same};
use std::collections::VecDeque;

/// Node payload of a single page's link trie
#[derive(Debug, Clone, PartialEq)]
enum ModelNodeKind {
    Root,
    DomPath(DomPath),
    ActionElement { index: usize, element: String },
    ParamKeys(Vec<String>),
    Params(ParamSet),
}

#[derive(Debug, Clone)]
struct ModelNode {
    kind: ModelNodeKind,
    children: Vec<usize>,
}

/// Trie of the links found on one page.
///
/// Every link is folded through dom path, each action segment (positionally),
/// parameter names and finally parameters, sharing prefixes with the links
/// inserted before it.
#[derive(Debug, Clone)]
pub struct PageModel {
    nodes: Vec<ModelNode>,
}

/// The distinct values seen at each level of a page model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkVector {
    pub dom_paths: Vec<DomPath>,
    /// One collection per action path position
    pub action_elements: Vec<Vec<String>>,
    pub param_keys: Vec<Vec<String>>,
    pub params: Vec<ParamSet>,
}

impl PageModel {
    /// Build the trie for the links of one page
    pub fn from_links(links: &[ConcreteLink]) -> Self {
        let mut model = Self { nodes: vec![ModelNode { kind: ModelNodeKind::Root, children: Vec::new() }] };

        for link in links {
            let mut last = model.find_or_push(
                0,
                |kind| matches!(kind, ModelNodeKind::DomPath(d) if same::dom_path(d, &link.dom_path)),
                || ModelNodeKind::DomPath(link.dom_path.clone()),
            );

            for (index, element) in link.action_path.iter().enumerate() {
                last = model.find_or_push(
                    last,
                    |kind| {
                        matches!(kind, ModelNodeKind::ActionElement { index: i, element: e }
                            if *i == index && same::action_element(e, element))
                    },
                    || ModelNodeKind::ActionElement { index, element: element.clone() },
                );
            }

            let keys = link.param_keys();
            last = model.find_or_push(
                last,
                |kind| matches!(kind, ModelNodeKind::ParamKeys(k) if same::param_keys(k, &keys)),
                || ModelNodeKind::ParamKeys(keys.clone()),
            );

            model.find_or_push(
                last,
                |kind| matches!(kind, ModelNodeKind::Params(p) if same::params(p, &link.params)),
                || ModelNodeKind::Params(link.params.clone()),
            );
        }

        model
    }

    fn find_or_push<M, F>(&mut self, parent: usize, matches: M, make: F) -> usize
    where
        M: Fn(&ModelNodeKind) -> bool,
        F: FnOnce() -> ModelNodeKind,
    {
        if let Some(&child) = self.nodes[parent].children.iter().find(|&&c| matches(&self.nodes[c].kind)) {
            return child;
        }

        let child = self.nodes.len();
        self.nodes.push(ModelNode { kind: make(), children: Vec::new() });
        self.nodes[parent].children.push(child);
        child
    }

    /// Number of nodes in the trie, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Walk the trie breadth first and collect the distinct values of each level
    pub fn link_vector(&self) -> LinkVector {
        let mut vector = LinkVector::default();
        let mut queue: VecDeque<usize> = self.nodes[0].children.iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id];
            queue.extend(node.children.iter().copied());

            match &node.kind {
                ModelNodeKind::Root => {}
                ModelNodeKind::DomPath(dom_path) => {
                    if !vector.dom_paths.iter().any(|d| same::dom_path(d, dom_path)) {
                        vector.dom_paths.push(dom_path.clone());
                    }
                }
                ModelNodeKind::ActionElement { index, element } => {
                    while vector.action_elements.len() <= *index {
                        vector.action_elements.push(Vec::new());
                    }
                    let collection = &mut vector.action_elements[*index];
                    if !collection.iter().any(|e| same::action_element(e, element)) {
                        collection.push(element.clone());
                    }
                }
                ModelNodeKind::ParamKeys(keys) => {
                    if !vector.param_keys.iter().any(|k| same::param_keys(k, keys)) {
                        vector.param_keys.push(keys.clone());
                    }
                }
                ModelNodeKind::Params(params) => {
                    if !vector.params.iter().any(|p| same::params(p, params)) {
                        vector.params.push(params.clone());
                    }
                }
            }
        }

        vector
    }
}
