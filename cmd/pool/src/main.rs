//! Connection pool simulation
//!
//! `POOL_CLIENTS` client threads share `POOL_SIZE` connections. Each
//! failure path runs at a different grade:
//!
//! - reading past the last row raises `FinishedCondition`, handled inline;
//! - asking for a shard that does not exist is an `IndexOutOfRangeError`,
//!   recovered by the caller;
//! - an empty pool is `PoolExhausted`, a critical error: only that client
//!   is dropped;
//! - a drain request is a `Notification`, absorbed at the client's thread
//!   entry;
//! - `POOL_CORRUPT=1` loses a connection, which the final audit reports as
//!   a Violation and the process aborts.
//!
//! # Environment Variables
//!
//! - `POOL_CLIENTS` - client threads (default 8)
//! - `POOL_SIZE` - connections (default 3)
//! - `POOL_SHARDS` - readable shards (default 2)
//! - `POOL_DRAIN_EVERY` - every n-th client is drained, 0 disables (default 5)
//! - `POOL_HOLD_MS` - how long a client keeps its connection (default 20)
//! - `POOL_CORRUPT=1` - drop a connection before the audit
//! - `RUST_LOG` - tracing filter (default `info`)

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use gfault::{
    build, ensure, match_fault, synthesize, thread, Condition, CriticalError, Error, Fault,
    FaultResult, IndexOutOfRangeError, IndexOutOfRangeException, NamedResourceException,
    NamedResourceNotification, NamedResourceViolation, OutOfRangeError, Violation,
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const ROWS_PER_SHARD: usize = 4;
const POOL_RESOURCE: &str = "db-conn";

synthesize! {
    /// No free connection for a client.
    pub struct PoolExhausted: CriticalError + NamedResourceException;
}

fn env_get<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_get_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[derive(Debug, Clone)]
struct Settings {
    clients:     usize,
    size:        usize,
    shards:      usize,
    drain_every: usize,
    hold:        Duration,
    corrupt:     bool,
}

impl Settings {
    fn from_env() -> Self {
        Self {
            clients:     env_get("POOL_CLIENTS", 8),
            size:        env_get("POOL_SIZE", 3),
            shards:      env_get("POOL_SHARDS", 2),
            drain_every: env_get("POOL_DRAIN_EVERY", 5),
            hold:        Duration::from_millis(env_get("POOL_HOLD_MS", 20)),
            corrupt:     env_get_bool("POOL_CORRUPT", false),
        }
    }

    fn validate(&self) -> FaultResult<()> {
        ensure!(self.size > 0, OutOfRangeError, "POOL_SIZE must be at least 1, got {}", self.size);
        ensure!(self.shards > 0, OutOfRangeError, "POOL_SHARDS must be at least 1, got {}", self.shards);
        Ok(())
    }
}

// ── Pool ──────────────────────────────────────────────────────────

struct Pool {
    free:   Mutex<Vec<usize>>,
    size:   usize,
    shards: usize,
}

struct Lease<'a> {
    pool: &'a Pool,
    slot: usize,
}

impl Pool {
    fn new(size: usize, shards: usize) -> Self {
        Self {
            free: Mutex::new((0..size).collect()),
            size,
            shards,
        }
    }

    fn free_list(&self) -> FaultResult<MutexGuard<'_, Vec<usize>>> {
        self.free.lock().map_err(|_| {
            build::<NamedResourceViolation>("free list mutex poisoned")
                .with_resource_name("pool.free")
                .into()
        })
    }

    fn checkout(&self, client: usize) -> FaultResult<Lease<'_>> {
        match self.free_list()?.pop() {
            Some(slot) => Ok(Lease { pool: self, slot }),
            None => Err(build::<PoolExhausted>(format!(
                "connection pool exhausted for client-{client}"
            ))
            .with_resource_name(POOL_RESOURCE)
            .into()),
        }
    }

    /// Read one row of a shard over a leased connection.
    fn read(&self, lease: &Lease<'_>, shard: usize, row: usize) -> FaultResult<u64> {
        if shard >= self.shards {
            return Err(build::<IndexOutOfRangeError>(format!("no shard {shard}"))
                .with_range(shard, 0, self.shards - 1)
                .into());
        }
        if row >= ROWS_PER_SHARD {
            return Err(build::<gfault::FinishedCondition>("no more rows").into());
        }
        Ok((lease.slot * 100 + shard * 10 + row) as u64)
    }

    /// Every connection must be back once all clients are done.
    fn audit(&self) -> FaultResult<()> {
        let free = self.free_list()?.len();
        if free != self.size {
            return Err(build::<NamedResourceViolation>(format!(
                "{} of {} connections missing after shutdown",
                self.size - free,
                self.size
            ))
            .with_resource_name("pool.free")
            .into());
        }
        Ok(())
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let mut free = self.pool.free.lock().unwrap_or_else(|poisoned| {
            warn!(slot = self.slot, "free list mutex poisoned, returning slot anyway");
            PoisonError::into_inner(poisoned)
        });
        free.push(self.slot);
    }
}

// ── Clients ───────────────────────────────────────────────────────

fn client(pool: &Pool, id: usize, settings: &Settings) -> FaultResult<u64> {
    if settings.drain_every > 0 && id % settings.drain_every == settings.drain_every - 1 {
        return Err(build::<NamedResourceNotification>("drain requested")
            .with_resource_name(format!("client-{id}"))
            .into());
    }

    let lease = pool.checkout(id)?;
    std::thread::sleep(settings.hold);

    let wanted = id % (pool.shards + 1);
    let shard = match pool.read(&lease, wanted, 0) {
        Ok(_) => wanted,
        Err(fault) if fault.is_a::<IndexOutOfRangeException>() => {
            debug!(client = id, range = ?fault.index_range(), "shard rejected, using shard 0");
            0
        }
        Err(fault) => return Err(fault),
    };

    let mut sum = 0;
    for row in 0.. {
        match pool.read(&lease, shard, row) {
            Ok(value) => sum += value,
            Err(fault) if fault.is_a::<Condition>() => break,
            Err(fault) => return Err(fault),
        }
    }
    Ok(sum)
}

fn run(settings: &Settings) -> FaultResult<()> {
    settings.validate()?;
    let pool = Arc::new(Pool::new(settings.size, settings.shards));

    let mut handles = Vec::with_capacity(settings.clients);
    for id in 0..settings.clients {
        let pool = Arc::clone(&pool);
        let settings = settings.clone();
        let handle = thread::spawn(format!("client-{id}"), move || client(&pool, id, &settings))?;
        handles.push((id, handle));
    }

    let (mut served, mut dropped, mut drained) = (0usize, 0usize, 0usize);
    for (id, handle) in handles {
        let outcome = handle
            .join()
            .map_err(|_| Fault::from(build::<CriticalError>(format!("client-{id} panicked"))))?;
        match outcome {
            Ok(Some(sum)) => {
                served += 1;
                info!(client = id, sum, "client served");
            }
            Ok(None) => drained += 1,
            Err(fault) => {
                let action = match_fault!(fault, {
                    PoolExhausted => "client dropped, pool exhausted",
                    CriticalError => "client dropped",
                    Error         => "client failed",
                    _             => "client ended",
                });
                warn!(
                    client = id,
                    kind = fault.kind_name(),
                    resource = fault.resource_name().unwrap_or("-"),
                    "{action}: {fault}"
                );
                dropped += 1;
            }
        }
    }
    info!(served, dropped, drained, "all clients finished");

    if settings.corrupt {
        if let Some(slot) = pool.free_list()?.pop() {
            warn!(slot, "losing a connection on purpose");
        }
    }
    pool.audit()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env();
    info!(?settings, "starting pool simulation");

    match run(&settings) {
        Ok(()) => info!("pool audit clean"),
        Err(fault) if fault.is_a::<Violation>() => {
            error!(
                kind = fault.kind_name(),
                resource = fault.resource_name().unwrap_or("-"),
                "{fault}; nothing persistent to flush"
            );
            fault.terminate();
        }
        Err(fault) => {
            error!(kind = fault.kind_name(), grade = %fault.grade(), "pool run failed: {fault}");
            std::process::exit(1);
        }
    }
}
