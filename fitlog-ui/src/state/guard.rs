//! Generation guard for page loads
//!
//! A page takes a ticket before each request and applies the response only
//! if the ticket is still current. Reloading or unmounting the page bumps
//! the generation, so responses that arrive late are dropped.

use leptos::on_cleanup;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub struct Generation {
    current: Rc<Cell<u64>>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard tied to the current owner: unmounting invalidates every ticket
    pub fn for_page() -> Self {
        let generation = Self::new();
        let on_unmount = generation.clone();
        on_cleanup(move || on_unmount.invalidate());
        generation
    }

    /// Start a new load, superseding earlier ones
    pub fn ticket(&self) -> u64 {
        self.invalidate();
        self.current.get()
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.current.get() == ticket
    }

    pub fn invalidate(&self) {
        self.current.set(self.current.get().wrapping_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Handler;

    #[test]
    fn test_newer_ticket_supersedes() {
        let guard = Generation::new();
        let first = guard.ticket();
        let second = guard.ticket();
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));
    }

    #[test]
    fn test_invalidate_drops_pending() {
        let guard = Generation::new();
        let ticket = guard.ticket();
        guard.clone().invalidate();
        assert!(!guard.is_current(ticket));
    }

    #[test]
    fn test_unmount_drops_pending_and_silences_reload() {
        let runtime = leptos::create_runtime();
        let reloads = Rc::new(Cell::new(0));

        let counter = reloads.clone();
        let mount = leptos::as_child_of_current_owner(move |_: ()| {
            let guard = Generation::for_page();
            let counter = counter.clone();
            let reload = Handler::new(move |_: ()| counter.set(counter.get() + 1));
            (guard, reload)
        });
        let ((guard, reload), page) = mount(());

        // A mutation is in flight when the page unmounts
        let ticket = guard.ticket();
        drop(page);

        assert!(!guard.is_current(ticket));
        reload.call(());
        assert_eq!(reloads.get(), 0);

        runtime.dispose();
    }
}
