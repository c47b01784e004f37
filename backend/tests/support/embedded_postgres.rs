//! Embedded PostgreSQL helpers for the Diesel adapter suites.
//!
//! One shared cluster per test binary; each test clones a fresh database
//! from a template that already carries every migration. Set
//! `SKIP_TEST_CLUSTER=1` where the cluster cannot start.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use nightlist::outbound::persistence::{DbPool, PoolConfig};
use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use tokio::runtime::Runtime;
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const TEMPLATE_PREFIX: &str = "nightlist_template";
const RETRIES: usize = 5;
const RETRY_DELAY: Duration = Duration::from_millis(500);

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

/// Template name keyed on the migration contents, so schema edits get a
/// fresh template.
fn template_name() -> Result<String, String> {
    let hash =
        hash_directory(migrations_dir()).map_err(|err| format!("hash migrations: {err:?}"))?;
    let short = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_PREFIX}_{short}"))
}

fn retry<T>(what: &str, mut attempt: impl FnMut() -> Result<T, String>) -> Result<T, String> {
    let mut last = String::new();
    for round in 1..=RETRIES {
        match attempt() {
            Ok(value) => return Ok(value),
            Err(error) => last = format!("{what}: attempt {round}/{RETRIES}: {error}"),
        }
        if round < RETRIES {
            std::thread::sleep(RETRY_DELAY);
        }
    }
    Err(last)
}

/// Cluster shared by every test in the binary.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    retry("start cluster", || {
        shared_cluster_handle().map_err(|err| format!("{err:?}"))
    })
}

fn migrate(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migrate: {err}"))?;
    Ok(())
}

fn ensure_template(cluster: &ClusterHandle) -> Result<String, String> {
    let name = template_name()?;
    let _guard = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let exists = cluster
        .database_exists(name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        migrate(&cluster.connection().database_url(&name))?;
    }
    Ok(name)
}

/// Fresh migrated database, dropped with the returned guard.
pub fn provision_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    retry("provision database", || {
        let template = ensure_template(cluster)?;
        let name = format!("test_{}", Uuid::new_v4().simple());
        cluster
            .temporary_database_from_template(name.as_str(), template.as_str())
            .map_err(|err| format!("{err:?}"))
    })
}

/// Whether `SKIP_TEST_CLUSTER` is `1`, `true` or `yes`.
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when allowed, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Runtime, pool and database owned by one test.
pub struct DieselContext {
    runtime: Runtime,
    pool: DbPool,
    database_url: String,
    _database: TemporaryDatabase,
}

impl DieselContext {
    /// Provision a database and a small pool over it.
    pub fn setup() -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|err| err.to_string())?;
        let database = provision_database(shared_cluster()?)?;
        let database_url = database.url().to_owned();
        let config = PoolConfig::new(&database_url).with_max_size(2);
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;
        Ok(Self {
            runtime,
            pool,
            database_url,
            _database: database,
        })
    }

    /// Drive `operation` to completion on the context runtime.
    pub fn run<F, Fut>(&self, operation: F) -> Fut::Output
    where
        F: FnOnce(DbPool) -> Fut,
        Fut: std::future::Future,
    {
        assert!(
            tokio::runtime::Handle::try_current().is_err(),
            "do not call DieselContext::run from inside a Tokio runtime"
        );
        self.runtime.block_on(operation(self.pool.clone()))
    }

    /// Blocking connection for assertions the ports do not expose.
    pub fn connect(&self) -> PgConnection {
        PgConnection::establish(&self.database_url).expect("direct connection")
    }
}

/// Context for one test, or `None` when the cluster is skipped.
pub fn diesel_context() -> Option<DieselContext> {
    match DieselContext::setup() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}
