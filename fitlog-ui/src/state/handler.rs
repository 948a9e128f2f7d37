//! Page handlers that outlive their page quietly
//!
//! Mutations await the network and then reload the page that started them.
//! By then the page may be gone. A `Callback` panics when called after its
//! owner is disposed; a [`Handler`] call does nothing instead.

use leptos::*;
use std::rc::Rc;

pub struct Handler<In: 'static = ()> {
    inner: StoredValue<Rc<dyn Fn(In)>>,
}

impl<In: 'static> Clone for Handler<In> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<In: 'static> Copy for Handler<In> {}

impl<In: 'static> Handler<In> {
    pub fn new(f: impl Fn(In) + 'static) -> Self {
        let f: Rc<dyn Fn(In)> = Rc::new(f);
        Self {
            inner: store_value(f),
        }
    }

    /// Run the handler, unless its owner has been disposed
    pub fn call(&self, input: In) {
        // The borrow on the stored value ends before `f` runs
        if let Some(f) = self.inner.try_with_value(|f| Rc::clone(f)) {
            f(input);
        }
    }

    /// Whether the owning page is still mounted
    pub fn is_live(&self) -> bool {
        self.inner.try_with_value(|_| ()).is_some()
    }
}

impl<In: 'static, F: Fn(In) + 'static> From<F> for Handler<In> {
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_call_runs_while_owner_lives() {
        let runtime = create_runtime();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let handler = Handler::new(move |n: i32| counter.set(counter.get() + n));

        handler.call(2);
        handler.call(3);
        assert_eq!(hits.get(), 5);
        assert!(handler.is_live());

        runtime.dispose();
    }

    #[test]
    fn test_call_after_dispose_is_a_no_op() {
        let runtime = create_runtime();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let reload = Handler::new(move |_: ()| counter.set(counter.get() + 1));

        reload.call(());
        assert_eq!(hits.get(), 1);

        // Page torn down while a request is in flight, then the response lands
        reload.inner.dispose();
        assert!(!reload.is_live());
        reload.call(());
        assert_eq!(hits.get(), 1);

        runtime.dispose();
    }
}
