//! Listener lists backing the state lifecycle notifications.

use std::cell::RefCell;
use std::rc::Rc;

/// Ordered list of 0..n listeners.
///
/// Dispatch works on a snapshot, so a listener may subscribe further
/// listeners (they fire from the next dispatch on) or inspect its state
/// without tripping a borrow.
pub(crate) struct Observers<F: ?Sized> {
    listeners: RefCell<Vec<Rc<F>>>,
}

impl<F: ?Sized> Observers<F> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn subscribe(&self, listener: Rc<F>) {
        self.listeners.borrow_mut().push(listener);
    }

    pub(crate) fn snapshot(&self) -> Vec<Rc<F>> {
        self.listeners.borrow().clone()
    }
}

pub(crate) type EnterListener = dyn Fn(Option<&crate::core::State>);
pub(crate) type ExitListener = dyn Fn(&crate::core::State);
pub(crate) type TickListener = dyn Fn(f32);
pub(crate) type FixedTickListener = dyn Fn();

/// The five notification points of a state.
pub(crate) struct StateObservers {
    pub(crate) enter: Observers<EnterListener>,
    pub(crate) exit: Observers<ExitListener>,
    pub(crate) update: Observers<TickListener>,
    pub(crate) late_update: Observers<TickListener>,
    pub(crate) fixed_update: Observers<FixedTickListener>,
}

impl StateObservers {
    pub(crate) fn new() -> Self {
        Self {
            enter: Observers::new(),
            exit: Observers::new(),
            update: Observers::new(),
            late_update: Observers::new(),
            fixed_update: Observers::new(),
        }
    }
}
