//!
//! This module tracks the server-side resources a probe creates so they can all be freed, newest
//! first, before the connection goes away.
use x11rb::protocol::xproto::{Colormap, Cursor, Font, Gcontext, Pixmap, Window};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A resource id together with what kind of resource it names.
pub enum Resource {
    Window(Window),
    Gc(Gcontext),
    Pixmap(Pixmap),
    Colormap(Colormap),
    Font(Font),
    Cursor(Cursor),
}

/// Records created resources in creation order.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    created: Vec<Resource>,
}

impl ResourceLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            created: Vec::new(),
        }
    }

    /// Remembers a freshly created resource.
    pub fn track(&mut self, resource: Resource) {
        log::trace!("tracking {resource:?}");
        self.created.push(resource);
    }

    /// Forgets a resource that was already freed by hand.
    pub fn forget(&mut self, resource: Resource) {
        self.created.retain(|r| *r != resource);
    }

    /// Empties the ledger, returning the resources newest first.
    pub fn drain_release_order(&mut self) -> Vec<Resource> {
        let mut order = std::mem::take(&mut self.created);
        order.reverse();
        order
    }
}
