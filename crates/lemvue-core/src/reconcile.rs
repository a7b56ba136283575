// ── Immutable list reconciler ──
//
// Pure functions over `Arc<Vec<Arc<T>>>` snapshots. Untouched elements
// keep their `Arc` (pointer identity), and when nothing matches the
// input snapshot itself is returned, so callers can detect "no change"
// with `Arc::ptr_eq`.

use std::sync::Arc;

/// Shared, immutable list snapshot.
pub type List<T> = Arc<Vec<Arc<T>>>;

/// Replace the element whose identity matches `updated`.
///
/// Order is preserved and every other element keeps its reference. With
/// no match, the original snapshot is returned.
pub fn replace_by_identity<T, K, F>(items: &List<T>, updated: &Arc<T>, identity: F) -> List<T>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let key = identity(updated.as_ref());
    let Some(pos) = items.iter().position(|item| identity(item.as_ref()) == key) else {
        return Arc::clone(items);
    };
    let mut next: Vec<Arc<T>> = Vec::clone(items);
    next[pos] = Arc::clone(updated);
    Arc::new(next)
}

/// Shallow-patch every element matching `predicate`.
///
/// `patch` receives a clone of the element to modify. Returns the original
/// snapshot when nothing matched.
pub fn patch_field<T, P, F>(items: &List<T>, predicate: P, patch: F) -> List<T>
where
    T: Clone,
    P: Fn(&T) -> bool,
    F: Fn(&mut T),
{
    if !items.iter().any(|item| predicate(item.as_ref())) {
        return Arc::clone(items);
    }
    let next = items
        .iter()
        .map(|item| {
            if predicate(item.as_ref()) {
                let mut patched = T::clone(item.as_ref());
                patch(&mut patched);
                Arc::new(patched)
            } else {
                Arc::clone(item)
            }
        })
        .collect();
    Arc::new(next)
}

/// `Some(next)` when `next` is a different snapshot than `prev`.
pub fn changed<T>(prev: &List<T>, next: List<T>) -> Option<List<T>> {
    (!Arc::ptr_eq(prev, &next)).then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        v: &'static str,
    }

    fn list(items: &[(u32, &'static str)]) -> List<Item> {
        Arc::new(
            items
                .iter()
                .map(|&(id, v)| Arc::new(Item { id, v }))
                .collect(),
        )
    }

    #[test]
    fn replace_keeps_untouched_references() {
        let items = list(&[(1, "a"), (2, "b")]);
        let updated = Arc::new(Item { id: 2, v: "c" });

        let next = replace_by_identity(&items, &updated, |x| x.id);

        assert_eq!(
            next.iter().map(|x| x.as_ref().clone()).collect::<Vec<_>>(),
            vec![Item { id: 1, v: "a" }, Item { id: 2, v: "c" }]
        );
        assert!(Arc::ptr_eq(&next[0], &items[0]));
        assert!(!Arc::ptr_eq(&next, &items));
    }

    #[test]
    fn replace_without_match_returns_same_snapshot() {
        let items = list(&[(1, "a"), (2, "b")]);
        let stranger = Arc::new(Item { id: 999, v: "z" });

        let next = replace_by_identity(&items, &stranger, |x| x.id);

        assert!(Arc::ptr_eq(&next, &items));
        assert!(changed(&items, next).is_none());
    }

    #[test]
    fn patch_touches_every_match_only() {
        let items = list(&[(1, "a"), (2, "b"), (1, "c")]);

        let next = patch_field(&items, |x| x.id == 1, |x| x.v = "banned");

        assert_eq!(next[0].v, "banned");
        assert_eq!(next[2].v, "banned");
        assert!(Arc::ptr_eq(&next[1], &items[1]));
        assert_eq!(items[0].v, "a");
    }

    #[test]
    fn patch_without_match_returns_same_snapshot() {
        let items = list(&[(1, "a")]);
        let next = patch_field(&items, |x| x.id == 5, |x| x.v = "x");
        assert!(Arc::ptr_eq(&next, &items));
    }
}
