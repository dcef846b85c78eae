//! Counter stores backing object handle allocation.
//!
//! The counter must survive process restarts so handles are never reissued
//! for objects that still exist on the remote side; production uses the
//! `VIDCOUNTER` key of the ASIC database.

use crate::{debug_log, info_log};
use parking_lot::Mutex;
use sonic_sai::{SaiError, SaiResult};
use std::sync::atomic::{AtomicU64, Ordering};

/// Key of the persisted counter in the ASIC database.
pub const VID_COUNTER_KEY: &str = "VIDCOUNTER";

/// Monotonic counter store used to mint object handle counters.
pub trait VidIndexGenerator: Send + Sync {
    /// Advances the counter and returns the new value.
    fn increment(&self) -> SaiResult<u64>;

    /// Resets the counter. Only meaningful for a fresh store.
    fn reset(&self) -> SaiResult<()>;
}

/// Counter kept in the ASIC database (`INCR VIDCOUNTER`).
pub struct RedisVidIndexGenerator {
    conn: Mutex<redis::Connection>,
    key: String,
}

impl RedisVidIndexGenerator {
    /// Connects to the database at `url`.
    pub fn connect(url: &str) -> SaiResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| SaiError::transport(format!("invalid redis url {}: {}", url, e)))?;
        let conn = client
            .get_connection()
            .map_err(|e| SaiError::transport(format!("failed to connect to {}: {}", url, e)))?;
        info_log!("VidIndexGenerator", url = %url, "connected vid counter store");
        Ok(Self {
            conn: Mutex::new(conn),
            key: VID_COUNTER_KEY.to_string(),
        })
    }
}

impl VidIndexGenerator for RedisVidIndexGenerator {
    fn increment(&self) -> SaiResult<u64> {
        let mut conn = self.conn.lock();
        let value: u64 = redis::cmd("INCR")
            .arg(&self.key)
            .query(&mut *conn)
            .map_err(|e| SaiError::transport(format!("INCR {} failed: {}", self.key, e)))?;
        Ok(value)
    }

    fn reset(&self) -> SaiResult<()> {
        let mut conn = self.conn.lock();
        redis::cmd("DEL")
            .arg(&self.key)
            .query::<()>(&mut *conn)
            .map_err(|e| SaiError::transport(format!("DEL {} failed: {}", self.key, e)))?;
        debug_log!("VidIndexGenerator", key = %self.key, "counter reset");
        Ok(())
    }
}

/// In-process counter; values do not survive a restart.
#[derive(Debug, Default)]
pub struct SimpleVidIndexGenerator {
    counter: AtomicU64,
}

impl SimpleVidIndexGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A counter whose next value is `start + 1`.
    pub fn starting_at(start: u64) -> Self {
        Self {
            counter: AtomicU64::new(start),
        }
    }
}

impl VidIndexGenerator for SimpleVidIndexGenerator {
    fn increment(&self) -> SaiResult<u64> {
        Ok(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn reset(&self) -> SaiResult<()> {
        self.counter.store(0, Ordering::SeqCst);
        Ok(())
    }
}
