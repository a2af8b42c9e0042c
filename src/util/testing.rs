// src/util/testing.rs

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use tempfile::TempDir;
use tracing::{debug, info, instrument};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::repositories::sqlite::repository::SqliteEntryRepository;

/// Environment variables a test may change; restored by `EnvGuard`
const GUARDED_VARS: [&str; 5] = [
    "READSTASH_DB_URL",
    "READSTASH_IMPORT_MODE",
    "READSTASH_REDIS_URL",
    "READSTASH_AMQP_URL",
    "READSTASH_CONFIG",
];

/// Global test configuration, initialized exactly once via OnceLock.
#[derive(Debug)]
pub struct TestEnv {
    /// Directory holding test input files
    pub resources: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            resources: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/resources"),
        }
    }

    pub fn resource(&self, name: &str) -> PathBuf {
        self.resources.join(name)
    }
}

static TEST_ENV: OnceLock<TestEnv> = OnceLock::new();

/// Initializes logging and the global test configuration exactly once.
pub fn init_test_env() -> &'static TestEnv {
    TEST_ENV.get_or_init(|| {
        setup_test_logging();
        let data = TestEnv::new();
        info!("Test environment initialized: {:?}", data);
        data
    })
}

fn setup_test_logging() {
    debug!("Attempting logger init from testing.rs");
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
        return;
    }

    let noisy_modules = ["html5ever", "reqwest", "mio", "want", "hyper_util", "amiquip", "rustls"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    subscriber.try_init().unwrap_or_else(|e| {
        eprintln!("Error: Failed to set up logging: {}", e);
    });
}

/// Snapshot of the READSTASH_* environment, restored on drop
#[derive(Debug, Clone)]
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvGuard {
    pub fn new() -> Self {
        Self {
            saved: GUARDED_VARS
                .iter()
                .map(|name| (*name, env::var(name).ok()))
                .collect(),
        }
    }
}

impl Drop for EnvGuard {
    #[instrument(level = "trace")]
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(val) => env::set_var(name, val),
                None => env::remove_var(name),
            }
        }
    }
}

/// A migrated database in its own temporary directory, removed on drop
#[derive(Debug)]
pub struct TestDb {
    pub repository: SqliteEntryRepository,
    dir: TempDir,
}

impl TestDb {
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("readstash.db")
    }
}

/// Creates a repository backed by a fresh database for one test.
pub fn setup_test_db() -> TestDb {
    let _ = init_test_env();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("readstash.db");
    let repository = SqliteEntryRepository::from_url(&db_path.to_string_lossy())
        .expect("Failed to create SqliteEntryRepository");
    TestDb { repository, dir }
}
