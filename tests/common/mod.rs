#![allow(dead_code)]

pub mod temp_files {
    use parking_lot::Mutex;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    // Global counter and lock for thread-safe temporary file creation
    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);
    static TEMP_LOCK: Mutex<()> = Mutex::new(());

    /// Creates a temporary file with guaranteed unique name to prevent race conditions
    pub fn create_temp_manifest(content: &str, ext: &str) -> PathBuf {
        let _lock = TEMP_LOCK.lock();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        let path = std::env::temp_dir().join(format!(
            "resrouter_test_{}_{}_{}.{}",
            std::process::id(),
            counter,
            nanos,
            ext
        ));

        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn create_temp_yaml(content: &str) -> PathBuf {
        create_temp_manifest(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> PathBuf {
        create_temp_manifest(content, "json")
    }

    pub fn create_temp_toml(content: &str) -> PathBuf {
        create_temp_manifest(content, "toml")
    }

    /// Cleanup temporary files (best effort)
    pub fn cleanup_temp_files(paths: &[PathBuf]) {
        for path in paths {
            let _ = std::fs::remove_file(path);
        }
    }
}

pub mod fixtures {
    /// Bank-style manifest: plain resources, a negotiated collection and a locator.
    pub const BANK_MANIFEST: &str = r"
routes:
  - path: /
    method: GET
    handler: index
  - path: /items
    method: GET
    produces: [application/json]
    handler: list_items_json
  - path: /items
    method: GET
    produces: [application/xml]
    handler: list_items_xml
  - path: /items
    method: POST
    consumes: [application/json]
    handler: create_item
  - path: '/{id: \d+}/test'
    method: GET
    handler: numeric_test
  - path: /widgets
    method: GET
    handler: list_widgets
  - path: /accounts/{id}
    handler: account
    locator: true
    resource: account
resources:
  account:
    - path: /
      method: GET
      handler: get_account
    - path: /transactions
      method: GET
      handler: list_transactions
    - path: /transactions/{tx}
      method: GET
      handler: get_transaction
";
}
