//! Session-wide collections of abstract links and abstract pages
//!
//! Abstract links are deduplicated by structural identity (dom path, action path,
//! params), so the many concrete instances of a per-row or tokenised control
//! collapse into one traversable edge. Pages are the graph nodes; a page's links
//! are handles into the shared link list, never copies.

use crate::classifier::{NodeId, PageClassifier};
use crate::link::{ConcreteLink, same};
use serde::{Deserialize, Serialize};

/// Handle of an abstract link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub(crate) usize);

/// Handle of an abstract page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(pub(crate) usize);

impl LinkId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl PageId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Initial values of the two per-link give-up counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiveUpBudget {
    /// Skips tolerated when the link is picked directly
    pub direct: u32,
    /// Abandoned routes tolerated when the link is the last edge of a route
    pub path: u32,
}

impl Default for GiveUpBudget {
    fn default() -> Self {
        Self { direct: 3, path: 3 }
    }
}

/// A deduplicated control together with its crawl state
#[derive(Debug, Clone)]
pub struct AbstractLink {
    /// First concrete instance seen. Its dom path, action path and params are the
    /// link's identity; url and method are informational only.
    pub prototype: ConcreteLink,
    pub visitable: bool,
    pub visited: bool,
    pub visit_count: u32,
    pub destination: Option<PageId>,
    pub direct_give_up: u32,
    pub path_give_up: u32,
}

impl AbstractLink {
    fn new(prototype: ConcreteLink, budget: GiveUpBudget) -> Self {
        Self {
            prototype,
            visitable: true,
            visited: false,
            visit_count: 0,
            destination: None,
            direct_give_up: budget.direct,
            path_give_up: budget.path,
        }
    }

    /// Whether `concrete` is an instance of this link
    pub fn matches(&self, concrete: &ConcreteLink) -> bool {
        same::link(&self.prototype, concrete)
    }

    /// Still a candidate for selection
    pub fn is_unvisited(&self) -> bool {
        self.visitable && !self.visited
    }
}

/// A graph node: one structural page template
#[derive(Debug, Clone)]
pub struct AbstractPage {
    /// Classifier leaf of the page's class
    pub leaf: NodeId,
    pub links: Vec<LinkId>,
}

/// One processed transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visit {
    pub source: PageId,
    pub link: LinkId,
    pub destination: PageId,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    links: Vec<AbstractLink>,
    pages: Vec<AbstractPage>,
    history: Vec<Visit>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn links(&self) -> &[AbstractLink] {
        &self.links
    }

    pub fn pages(&self) -> &[AbstractPage] {
        &self.pages
    }

    pub fn history(&self) -> &[Visit] {
        &self.history
    }

    pub fn link(&self, id: LinkId) -> &AbstractLink {
        &self.links[id.0]
    }

    pub(crate) fn link_mut(&mut self, id: LinkId) -> &mut AbstractLink {
        &mut self.links[id.0]
    }

    pub fn page(&self, id: PageId) -> &AbstractPage {
        &self.pages[id.0]
    }

    pub fn page_ids(&self) -> impl Iterator<Item = PageId> + '_ {
        (0..self.pages.len()).map(PageId)
    }

    /// Abstract link whose identity matches `concrete`
    pub fn find_link(&self, concrete: &ConcreteLink) -> Option<LinkId> {
        self.links.iter().position(|l| l.matches(concrete)).map(LinkId)
    }

    pub(crate) fn add_page(&mut self, leaf: NodeId) -> PageId {
        self.pages.push(AbstractPage { leaf, links: Vec::new() });
        PageId(self.pages.len() - 1)
    }

    /// Attach the abstract links of `concrete` to `page`, creating missing ones
    /// when `allow_new` is set. Returns the number of links created.
    pub fn merge_links(&mut self, page: PageId, concrete: &[ConcreteLink], allow_new: bool, budget: GiveUpBudget) -> usize {
        let mut created = 0;

        for link in concrete {
            let id = match self.find_link(link) {
                Some(id) => id,
                None if allow_new => {
                    self.links.push(AbstractLink::new(link.clone(), budget));
                    created += 1;
                    LinkId(self.links.len() - 1)
                }
                None => continue,
            };

            let links = &mut self.pages[page.0].links;
            if !links.contains(&id) {
                links.push(id);
            }
        }

        created
    }

    /// Familiarity heuristic for a freshly classified page.
    ///
    /// The page at `leaf` was reached from `source` through `link`. It looks
    /// familiar when an earlier visit started from a page similar to `source`,
    /// followed a link with the same dom path, and ended on a page similar to the
    /// new one. Similarity is the classifier's DomPathCollection ancestry, which is
    /// coarser than page identity.
    pub fn looks_familiar(&self, classifier: &PageClassifier, leaf: NodeId, source: PageId, link: LinkId) -> bool {
        let source_leaf = self.page(source).leaf;
        let dom_path = &self.link(link).prototype.dom_path;

        self.history.iter().any(|visit| {
            let earlier_destination = self.page(visit.destination).leaf;
            earlier_destination != leaf
                && classifier.similar(self.page(visit.source).leaf, source_leaf)
                && same::dom_path(&self.link(visit.link).prototype.dom_path, dom_path)
                && classifier.similar(earlier_destination, leaf)
        })
    }

    pub(crate) fn record_visit(&mut self, visit: Visit) {
        self.history.push(visit);
    }

    /// Whether any link is still visitable and unvisited
    pub fn has_unvisited(&self) -> bool {
        self.links.iter().any(AbstractLink::is_unvisited)
    }

    pub fn unvisited_count(&self) -> usize {
        self.links.iter().filter(|l| l.is_unvisited()).count()
    }

    /// Whether `page` hosts a link that is still visitable and unvisited
    pub fn page_has_unvisited(&self, page: PageId) -> bool {
        self.pages[page.0].links.iter().any(|&id| self.links[id.0].is_unvisited())
    }

    pub(crate) fn mark_unvisitable(&mut self, id: LinkId) {
        let link = &mut self.links[id.0];
        if link.visitable {
            log::info!("Link {:?} ({}) is no longer visitable", id, link.prototype.url);
        }
        link.visitable = false;
    }

    /// Spend one unit of the direct budget. Returns true when it ran out.
    pub(crate) fn spend_direct(&mut self, id: LinkId) -> bool {
        let link = &mut self.links[id.0];
        link.direct_give_up = link.direct_give_up.saturating_sub(1);
        let exhausted = link.direct_give_up == 0;
        if exhausted {
            self.mark_unvisitable(id);
        }
        exhausted
    }

    /// Spend one unit of the path budget. Returns true when it ran out.
    pub(crate) fn spend_path(&mut self, id: LinkId) -> bool {
        let link = &mut self.links[id.0];
        link.path_give_up = link.path_give_up.saturating_sub(1);
        let exhausted = link.path_give_up == 0;
        if exhausted {
            self.mark_unvisitable(id);
        }
        exhausted
    }
}
