//! # Hot Reload Module
//!
//! Live reloading of route manifests without restarting the host.
//!
//! ## Overview
//!
//! [`watch_manifest`] watches a manifest file and, on every change:
//! - reloads and rebuilds the [`Router`] from the file
//! - publishes it through the [`SharedRouter`] with a single atomic swap
//! - calls the reload hook with the new router
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use resrouter::hot_reload::watch_manifest;
//! use resrouter::manifest::load_router;
//! use resrouter::shared::SharedRouter;
//!
//! let shared = Arc::new(SharedRouter::new(load_router("routes.yaml")?));
//! let _watcher = watch_manifest("routes.yaml", Arc::clone(&shared), |router| {
//!     println!("reloaded {} routes", router.table().len());
//! })?;
//! // keep `_watcher` alive for as long as reloads should happen
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! If the changed manifest fails to parse or register, the error is logged and
//! the previous router stays published. Requests keep being served from it
//! until a valid manifest is saved.
//!
//! Editors often write a file several times per save, so the hook may run more
//! than once for a single edit.

use crate::{manifest::load_router, router::Router, shared::SharedRouter};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Watch a route manifest and republish the [`Router`] when it changes.
///
/// The callback receives every successfully published router.
///
/// # Errors
///
/// Returns the watcher setup error if the path cannot be watched.
pub fn watch_manifest<P, F>(
    manifest_path: P,
    shared: Arc<SharedRouter>,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&Router) + Send + 'static,
{
    let path: PathBuf = manifest_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                // truncated mid-save; the write that follows raises another event
                if std::fs::metadata(&watch_path).is_ok_and(|m| m.len() == 0) {
                    debug!(manifest = %watch_path.display(), "hot-reload: manifest empty, skipping");
                    return;
                }
                match load_router(&watch_path) {
                    Ok(router) => {
                        info!(
                            manifest = %watch_path.display(),
                            routes_count = router.table().len(),
                            "hot-reload: applying route updates"
                        );
                        router.table().dump_routes();
                        shared.publish(router);
                        on_reload(&shared.load());
                    }
                    Err(e) => error!(
                        manifest = %watch_path.display(),
                        error = %format!("{e:#}"),
                        "hot-reload: manifest rejected, keeping previous routes"
                    ),
                }
            }
            Err(e) => warn!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    info!(manifest = %path.display(), "hot-reload: watching manifest");
    Ok(watcher)
}
