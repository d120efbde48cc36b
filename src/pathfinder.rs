//! Shortest routes over the observed page graph
//!
//! Only edges that were already traversed have a known destination, so the graph
//! is made of visited, still visitable links weighted by their visit count.
//! Labels live in a per-run table keyed by page handle and are discarded when the
//! search returns.

use crate::registry::{LinkId, PageId, Registry};

/// Route from a source page to the nearest page with unvisited links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub target: PageId,
    /// Edges to follow, in order, starting on the source page
    pub edges: Vec<LinkId>,
    /// Sum of the edges' visit counts
    pub distance: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Label {
    dist: Option<u32>,
    prev: Option<(PageId, LinkId)>,
    settled: bool,
}

/// Find the cheapest route from `source` to the closest other page that still
/// hosts an unvisited, visitable link. Edges listed in `excluded` are not used.
///
/// Ties go to the page found first in registry order.
pub fn find_route(registry: &Registry, source: PageId, excluded: &[LinkId]) -> Option<Route> {
    let mut labels = vec![Label::default(); registry.pages().len()];
    labels[source.index()].dist = Some(0);

    loop {
        let next = registry
            .page_ids()
            .filter(|p| !labels[p.index()].settled)
            .filter_map(|p| labels[p.index()].dist.map(|d| (p, d)))
            .fold(None, |best: Option<(PageId, u32)>, (p, d)| match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((p, d)),
            });

        let Some((page, dist)) = next else { break };
        labels[page.index()].settled = true;

        for &id in &registry.page(page).links {
            if excluded.contains(&id) {
                continue;
            }
            let link = registry.link(id);
            let Some(destination) = link.destination.filter(|_| link.visited && link.visitable) else {
                continue;
            };

            let alt = dist + link.visit_count;
            let label = &mut labels[destination.index()];
            if label.dist.is_none_or(|d| alt < d) {
                label.dist = Some(alt);
                label.prev = Some((page, id));
            }
        }
    }

    let (target, distance) = registry
        .page_ids()
        .filter_map(|p| labels[p.index()].dist.map(|d| (p, d)))
        .filter(|&(p, d)| d > 0 && registry.page_has_unvisited(p))
        .fold(None, |best: Option<(PageId, u32)>, (p, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((p, d)),
        })?;

    let mut edges = Vec::new();
    let mut current = target;
    while current != source {
        let (prev, link) = labels[current.index()].prev?;
        edges.push(link);
        current = prev;
    }
    edges.reverse();

    log::debug!("Route from {:?} to {:?}: {} edges, distance {}", source, target, edges.len(), distance);

    Some(Route { target, edges, distance })
}
