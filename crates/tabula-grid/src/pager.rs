//! Page-sized jumps over a list of focus targets, driven by host geometry.

use ratatui::layout::Rect;

use crate::grid::FocusTarget;

/// Which way a page key moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Up,
    Down,
}

impl PageDirection {
    fn step(self, index: usize) -> usize {
        match self {
            PageDirection::Up => index - 1,
            PageDirection::Down => index + 1,
        }
    }
}

/// Geometry of the nearest scrollable container around the grid body.
///
/// Rectangles are in the container's content coordinates; only their
/// vertical extent matters for paging.
pub trait ScrollGeometry {
    /// The visible part of the container.
    fn viewport(&self) -> Rect;
    /// Where `target` is laid out, or `None` if the host does not know.
    fn target_rect(&self, target: &FocusTarget) -> Option<Rect>;
}

/// Scan from `from` towards `index_bound` for the last item still within one page.
///
/// Returns the last index whose item satisfies `is_within_one_page`. If the
/// very first candidate already fails, that candidate is returned so a page
/// key always moves. If every remaining item passes, returns `index_bound`.
/// `from` and `index_bound` must be valid indices of `items`, with
/// `index_bound` lying in `direction` from `from`.
pub fn find_page_boundary<T>(
    items: &[T],
    from: usize,
    direction: PageDirection,
    index_bound: usize,
    mut is_within_one_page: impl FnMut(&T) -> bool,
) -> usize {
    let heads_away = match direction {
        PageDirection::Up => index_bound < from,
        PageDirection::Down => index_bound > from,
    };
    if items.len() <= 1 || !heads_away || index_bound >= items.len() {
        return from;
    }
    let mut index = from;
    while index != index_bound {
        let candidate = direction.step(index);
        if !is_within_one_page(&items[candidate]) {
            return if index == from { candidate } else { index };
        }
        index = candidate;
    }
    index_bound
}

fn bottom(rect: Rect) -> u32 {
    u32::from(rect.y) + u32::from(rect.height)
}

/// Page computations bound to one scroll container.
pub struct Pager<'a> {
    geometry: &'a dyn ScrollGeometry,
}

impl<'a> Pager<'a> {
    pub fn new(geometry: &'a dyn ScrollGeometry) -> Self {
        Self { geometry }
    }

    /// Index roughly one page away from `from` in `items`.
    pub fn page_index(&self, items: &[FocusTarget], from: usize, direction: PageDirection) -> usize {
        if from >= items.len() {
            return from;
        }
        let Some(start) = self.geometry.target_rect(&items[from]) else {
            return from;
        };
        let page = u32::from(self.geometry.viewport().height);
        let bound = match direction {
            PageDirection::Up => 0,
            PageDirection::Down => items.len() - 1,
        };
        find_page_boundary(items, from, direction, bound, |target| {
            let Some(rect) = self.geometry.target_rect(target) else {
                return false;
            };
            let extent = match direction {
                PageDirection::Down => bottom(rect).saturating_sub(u32::from(start.y)),
                PageDirection::Up => bottom(start).saturating_sub(u32::from(rect.y)),
            };
            extent <= page
        })
    }
}
