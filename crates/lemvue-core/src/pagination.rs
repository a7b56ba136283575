// ── Pagination ──
//
// Newer list endpoints hand out opaque cursors; the community directory
// still pages by number. Both expose the same forward/back affordances.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use lemvue_api::types::{PagedResponse, PaginationCursor};

/// Opaque server cursor as carried through route parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageCursor(pub String);

impl PageCursor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<PaginationCursor> for PageCursor {
    fn from(c: PaginationCursor) -> Self {
        Self(c.0)
    }
}

impl From<&PageCursor> for PaginationCursor {
    fn from(c: &PageCursor) -> Self {
        Self(c.0.clone())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum PageDirection {
    #[default]
    Forward,
    Backward,
}

/// Cursor + direction pair carried by cursor-paginated route parameters.
/// `cursor: None` is the first page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CursorPage {
    pub cursor: Option<PageCursor>,
    pub direction: PageDirection,
}

impl CursorPage {
    pub fn first() -> Self {
        Self::default()
    }

    pub fn is_first(&self) -> bool {
        self.cursor.is_none()
    }

    pub fn forward(cursor: PageCursor) -> Self {
        Self {
            cursor: Some(cursor),
            direction: PageDirection::Forward,
        }
    }

    pub fn backward(cursor: PageCursor) -> Self {
        Self {
            cursor: Some(cursor),
            direction: PageDirection::Backward,
        }
    }

    /// Wire cursor plus `page_back` flag for list requests.
    pub fn to_request(&self) -> (Option<PaginationCursor>, Option<bool>) {
        let back = (self.direction == PageDirection::Backward && self.cursor.is_some())
            .then_some(true);
        (self.cursor.as_ref().map(PaginationCursor::from), back)
    }
}

/// One page of a cursor-paginated resource.
///
/// Items are an `Arc` snapshot of `Arc`s so the reconciler can hand back
/// the same allocation when nothing changed.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Arc<Vec<Arc<T>>>,
    pub next: Option<PageCursor>,
    pub prev: Option<PageCursor>,
}

impl<T> Paged<T> {
    pub fn new(items: Vec<T>, next: Option<PageCursor>, prev: Option<PageCursor>) -> Self {
        Self {
            items: Arc::new(items.into_iter().map(Arc::new).collect()),
            next,
            prev,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Forward navigation is available only while a next cursor exists.
    pub fn can_go_forward(&self) -> bool {
        self.next.is_some()
    }

    /// Backward navigation is disabled on the first page, and whenever the
    /// server gave no previous cursor.
    pub fn can_go_back(&self, on_first_page: bool) -> bool {
        !on_first_page && self.prev.is_some()
    }

    pub fn next_page(&self) -> Option<CursorPage> {
        self.next.clone().map(CursorPage::forward)
    }

    pub fn prev_page(&self, on_first_page: bool) -> Option<CursorPage> {
        if on_first_page {
            return None;
        }
        self.prev.clone().map(CursorPage::backward)
    }

    /// Same cursors, new item snapshot.
    pub fn with_items(&self, items: Arc<Vec<Arc<T>>>) -> Self {
        Self {
            items,
            next: self.next.clone(),
            prev: self.prev.clone(),
        }
    }
}

impl<T> From<PagedResponse<T>> for Paged<T> {
    fn from(resp: PagedResponse<T>) -> Self {
        Self::new(
            resp.items,
            resp.next_page.map(PageCursor::from),
            resp.prev_page.map(PageCursor::from),
        )
    }
}

impl<T> PartialEq for Paged<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items) && self.next == other.next && self.prev == other.prev
    }
}

// ── Page-number pagination ───────────────────────────────────────────

/// Page-number pagination for endpoints without cursors. Pages start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetPage {
    pub page: u32,
    pub limit: u32,
}

impl OffsetPage {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.page > 1
    }

    /// A short page means there is nothing after it.
    pub fn can_go_forward(&self, returned: usize) -> bool {
        u32::try_from(returned).is_ok_and(|n| n >= self.limit)
    }

    pub fn next(&self) -> Self {
        Self::new(self.page.saturating_add(1), self.limit)
    }

    pub fn prev(&self) -> Self {
        Self::new(self.page.saturating_sub(1), self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(next: Option<&str>, prev: Option<&str>) -> Paged<u32> {
        Paged::new(
            vec![1, 2, 3],
            next.map(|c| PageCursor(c.into())),
            prev.map(|c| PageCursor(c.into())),
        )
    }

    #[test]
    fn missing_next_cursor_disables_forward() {
        assert!(!page(None, None).can_go_forward());
        assert!(page(Some("c1"), None).can_go_forward());
    }

    #[test]
    fn first_page_disables_backward() {
        let p = page(Some("c2"), Some("c0"));
        assert!(!p.can_go_back(true));
        assert!(p.prev_page(true).is_none());
        assert!(p.can_go_back(false));
        assert!(!page(Some("c2"), None).can_go_back(false));
    }

    #[test]
    fn next_carries_cursor_and_forward_direction() {
        let next = page(Some("c1"), None).next_page();
        assert_eq!(
            next,
            Some(CursorPage {
                cursor: Some(PageCursor("c1".into())),
                direction: PageDirection::Forward,
            })
        );
        let (cursor, back) = next.map(|p| p.to_request()).unwrap_or_default();
        assert_eq!(cursor.as_ref().map(PaginationCursor::as_str), Some("c1"));
        assert_eq!(back, None);
    }

    #[test]
    fn backward_request_sets_page_back() {
        let (_, back) = CursorPage::backward(PageCursor("c0".into())).to_request();
        assert_eq!(back, Some(true));
    }

    #[test]
    fn offset_page_boundaries() {
        let first = OffsetPage::new(1, 20);
        assert!(!first.can_go_back());
        assert!(first.can_go_forward(20));
        assert!(!first.can_go_forward(7));
        assert_eq!(first.next().page, 2);
        assert_eq!(first.prev().page, 1);
        assert_eq!(OffsetPage::new(0, 0), OffsetPage::new(1, 1));
    }
}
