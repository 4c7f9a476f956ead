//! Change notification for store subscribers.
//!
//! Each store owns a `ChangeNotifier` and fires it after every committed
//! in-memory mutation, so UI components can re-read the slice of state they
//! care about instead of watching an ambient global. Listeners live for the
//! whole app session; there is no unsubscribe (a mobile session never tears
//! its stores down).

use std::sync::Mutex;

type Listener = Box<dyn Fn() + Send + Sync>;

/// Fan-out of store change events to registered listeners.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Mutex<Vec<Listener>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called after every committed mutation.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.lock().unwrap().push(Box::new(listener));
    }

    /// Invoke every registered listener.
    pub fn notify(&self) {
        for listener in self.listeners.lock().unwrap().iter() {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}
