//! Atomic publication of routers.
//!
//! Request threads [`load`](SharedRouter::load) a snapshot and route against it;
//! a reload builds a complete new [`Router`] and [`publish`](SharedRouter::publish)es
//! it with a single pointer swap. In-flight requests keep the snapshot they loaded,
//! so nobody ever sees a half-built table.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use crate::error::RoutingError;
use crate::resolver::Resolution;
use crate::router::{RequestDescriptor, Router};

/// Lock-free holder of the current [`Router`].
pub struct SharedRouter {
    current: ArcSwap<Router>,
}

impl SharedRouter {
    #[must_use]
    pub fn new(router: Router) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Current router snapshot.
    #[must_use]
    pub fn load(&self) -> Arc<Router> {
        self.current.load_full()
    }

    /// Replace the current router. Returns the previous one.
    pub fn publish(&self, router: Router) -> Arc<Router> {
        info!(routes_count = router.table().len(), "Publishing routing table");
        self.current.swap(Arc::new(router))
    }

    /// Route against the current snapshot.
    ///
    /// # Errors
    ///
    /// Any [`RoutingError`].
    pub fn route(&self, request: &RequestDescriptor) -> Result<Resolution, RoutingError> {
        self.current.load().route(request)
    }
}

impl std::fmt::Debug for SharedRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRouter")
            .field("current", &*self.current.load())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{RouteDefinition, RouteTable};
    use std::thread;

    fn router(handler: &str) -> Router {
        Router::new(
            RouteTable::from_definitions([RouteDefinition::new("/ping", handler).method("GET")])
                .unwrap(),
        )
    }

    #[test]
    fn test_publish_swaps_router() {
        let shared = SharedRouter::new(router("v1"));
        let before = shared.load();
        let previous = shared.publish(router("v2"));

        assert!(Arc::ptr_eq(&before, &previous));
        // the old snapshot still routes to the old handler
        assert_eq!(before.route(&RequestDescriptor::get("/ping")).unwrap().handler(), "v1");
        assert_eq!(shared.route(&RequestDescriptor::get("/ping")).unwrap().handler(), "v2");
    }

    #[test]
    fn test_concurrent_readers_see_complete_routers() {
        let shared = Arc::new(SharedRouter::new(router("v0")));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let handler = shared
                            .route(&RequestDescriptor::get("/ping"))
                            .unwrap()
                            .handler()
                            .to_string();
                        assert!(handler.starts_with('v'));
                    }
                })
            })
            .collect();
        for i in 1..20 {
            shared.publish(router(&format!("v{i}")));
        }
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
