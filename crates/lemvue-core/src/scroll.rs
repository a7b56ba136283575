// ── Scroll restoration ──
//
// Lifecycle delegate held by each scrollable view. The view forwards its
// mount/update/unmount events and early user input; the restorer decides
// whether the stored offset for this history entry is applied.
//
//   mount ──▶ Armed ──(input)──▶ Blocked ──(settled)──▶ Settled (record dropped)
//               │
//               └─(settled)──▶ Settled   (offset restored once, record deleted)

use tracing::debug;

use crate::route::HistoryKey;
use crate::storage::ScrollStore;

/// Something with a vertical scroll offset.
pub trait Viewport {
    fn offset(&self) -> usize;
    fn scroll_to(&mut self, offset: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPhase {
    /// Not mounted.
    #[default]
    Idle,
    /// Waiting for data to settle.
    Armed,
    /// The user moved first; never restore for this entry.
    Blocked,
    /// Restoration done (or nothing to restore).
    Settled,
}

#[derive(Debug, Default)]
pub struct ScrollRestorer {
    entry: Option<HistoryKey>,
    phase: ScrollPhase,
}

impl ScrollRestorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn entry(&self) -> Option<&HistoryKey> {
        self.entry.as_ref()
    }

    pub fn on_mount(&mut self, entry: HistoryKey) {
        self.entry = Some(entry);
        self.phase = ScrollPhase::Armed;
    }

    /// Any scroll, key press, or click before data settled.
    pub fn on_user_input(&mut self) {
        if self.phase == ScrollPhase::Armed {
            debug!("scroll restore blocked by user input");
            self.phase = ScrollPhase::Blocked;
        }
    }

    /// Call after every render with whether all tracked request states are
    /// terminal. Returns `true` when this call restored an offset.
    pub fn on_update(
        &mut self,
        settled: bool,
        store: &ScrollStore,
        viewport: &mut dyn Viewport,
    ) -> bool {
        if !settled {
            return false;
        }
        let Some(entry) = &self.entry else {
            return false;
        };
        match self.phase {
            ScrollPhase::Armed => {}
            ScrollPhase::Blocked => {
                store.forget(entry);
                self.phase = ScrollPhase::Settled;
                return false;
            }
            ScrollPhase::Idle | ScrollPhase::Settled => return false,
        }
        self.phase = ScrollPhase::Settled;
        match store.take(entry) {
            Some(offset) => {
                debug!(%entry, offset, "scroll restored");
                viewport.scroll_to(offset);
                true
            }
            None => false,
        }
    }

    /// Persist the current offset for this entry and reset to the top.
    pub fn on_unmount(&mut self, store: &ScrollStore, viewport: &mut dyn Viewport) {
        if let Some(entry) = self.entry.take() {
            store.save(&entry, viewport.offset());
        }
        viewport.scroll_to(0);
        self.phase = ScrollPhase::Idle;
    }

    /// Full program exit: nothing survives to a later run.
    pub fn on_unload(store: &ScrollStore) {
        store.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStorage;

    #[derive(Default)]
    struct FakeViewport(usize);

    impl Viewport for FakeViewport {
        fn offset(&self) -> usize {
            self.0
        }

        fn scroll_to(&mut self, offset: usize) {
            self.0 = offset;
        }
    }

    fn store() -> ScrollStore {
        ScrollStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn restores_once_after_settle() {
        let store = store();
        let entry = HistoryKey::from("e1");
        store.save(&entry, 37);
        let mut viewport = FakeViewport::default();
        let mut restorer = ScrollRestorer::new();

        restorer.on_mount(entry.clone());
        assert!(!restorer.on_update(false, &store, &mut viewport));
        assert_eq!(viewport.0, 0);

        assert!(restorer.on_update(true, &store, &mut viewport));
        assert_eq!(viewport.0, 37);
        assert_eq!(restorer.phase(), ScrollPhase::Settled);
        assert_eq!(store.peek(&entry), None);

        viewport.0 = 5;
        assert!(!restorer.on_update(true, &store, &mut viewport));
        assert_eq!(viewport.0, 5);
    }

    #[test]
    fn early_input_suppresses_restore() {
        let store = store();
        let entry = HistoryKey::from("e2");
        store.save(&entry, 50);
        let mut viewport = FakeViewport::default();
        let mut restorer = ScrollRestorer::new();

        restorer.on_mount(entry.clone());
        restorer.on_user_input();
        viewport.0 = 3;

        assert!(!restorer.on_update(false, &store, &mut viewport));
        assert_eq!(restorer.phase(), ScrollPhase::Blocked);
        assert_eq!(store.peek(&entry), Some(50));

        assert!(!restorer.on_update(true, &store, &mut viewport));
        assert_eq!(viewport.0, 3);
        assert_eq!(restorer.phase(), ScrollPhase::Settled);
        assert_eq!(store.peek(&entry), None);
    }

    #[test]
    fn input_after_settle_stays_settled() {
        let mut restorer = ScrollRestorer::new();
        let mut viewport = FakeViewport::default();
        restorer.on_mount(HistoryKey::from("e3"));
        restorer.on_update(true, &store(), &mut viewport);
        restorer.on_user_input();
        assert_eq!(restorer.phase(), ScrollPhase::Settled);
    }

    #[test]
    fn unmount_persists_offset_and_resets_to_top() {
        let store = store();
        let entry = HistoryKey::from("e4");
        let mut viewport = FakeViewport(12);
        let mut restorer = ScrollRestorer::new();
        restorer.on_mount(entry.clone());

        restorer.on_unmount(&store, &mut viewport);

        assert_eq!(viewport.0, 0);
        assert_eq!(store.peek(&entry), Some(12));
        assert_eq!(restorer.phase(), ScrollPhase::Idle);
    }

    #[test]
    fn unload_drops_offsets() {
        let store = store();
        let entry = HistoryKey::from("e5");
        store.save(&entry, 9);
        ScrollRestorer::on_unload(&store);
        assert_eq!(store.peek(&entry), None);
    }
}
