//! Redis transport.
//!
//! Requests are pushed onto `ASIC_STATE_KEY_VALUE_OP_QUEUE` and announced on
//! `ASIC_STATE_CHANNEL@<db>`; the remote agent answers on
//! `GETRESPONSE_KEY_VALUE_OP_QUEUE` and publishes notifications on the
//! `NOTIFICATIONS` channel. Every message is a JSON array
//! `[key, op, field, value, ...]`.

use super::{Channel, FieldValue, KeyOpFieldsValues, NotificationHandler, Response};
use super::{AsicStateTable, DEFAULT_RESPONSE_TIMEOUT};
use crate::config::ContextConfig;
use crate::{debug_log, error_log, info_log, warn_log};
use parking_lot::Mutex;
use sonic_sai::{SaiError, SaiResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const ASIC_STATE_TABLE: &str = "ASIC_STATE";
const REQUEST_QUEUE: &str = "ASIC_STATE_KEY_VALUE_OP_QUEUE";
const RESPONSE_QUEUE: &str = "GETRESPONSE_KEY_VALUE_OP_QUEUE";
const REQUEST_CHANNEL_PREFIX: &str = "ASIC_STATE_CHANNEL@";
const NOTIFICATIONS_CHANNEL: &str = "NOTIFICATIONS";

/// Buffered requests are transmitted once this many accumulate.
const PIPELINE_FLUSH_THRESHOLD: usize = 128;

/// How often the notification thread checks its stop flag.
const NOTIFICATION_POLL_INTERVAL: Duration = Duration::from_secs(1);

fn redis_err(what: &str, e: redis::RedisError) -> SaiError {
    SaiError::transport(format!("{}: {}", what, e))
}

struct Producer {
    conn: redis::Connection,
    pipeline: redis::Pipeline,
    pending: usize,
}

impl Producer {
    fn flush(&mut self, request_channel: &str) -> SaiResult<()> {
        if self.pending == 0 {
            return Ok(());
        }
        self.pipeline
            .cmd("PUBLISH")
            .arg(request_channel)
            .arg("G")
            .ignore();
        let result = self
            .pipeline
            .query::<()>(&mut self.conn)
            .map_err(|e| redis_err("pipeline flush failed", e));
        debug_log!("RedisChannel", requests = self.pending, "flushed pipeline");
        self.pipeline.clear();
        self.pending = 0;
        result
    }
}

/// Channel over the ASIC database queues.
pub struct RedisChannel {
    producer: Mutex<Producer>,
    request_channel: String,
    buffered: AtomicBool,
    response_timeout: Mutex<Duration>,
    running: Arc<AtomicBool>,
    notification_thread: Option<JoinHandle<()>>,
}

impl RedisChannel {
    /// Connects to the context's ASIC database and starts the notification
    /// thread. The channel starts unbuffered.
    pub fn connect(config: &ContextConfig, handler: NotificationHandler) -> SaiResult<Self> {
        let url = config.redis_url();
        let client = redis::Client::open(url.as_str())
            .map_err(|e| redis_err(&format!("invalid redis url {}", url), e))?;
        let conn = client
            .get_connection()
            .map_err(|e| redis_err(&format!("failed to connect to {}", url), e))?;

        let running = Arc::new(AtomicBool::new(true));
        let notification_thread =
            spawn_notification_thread(client, running.clone(), handler, config.guid)?;

        info_log!(
            "RedisChannel",
            guid = config.guid,
            url = %url,
            "redis channel connected"
        );

        Ok(Self {
            producer: Mutex::new(Producer {
                conn,
                pipeline: redis::pipe(),
                pending: 0,
            }),
            request_channel: format!("{}{}", REQUEST_CHANNEL_PREFIX, config.redis_db),
            buffered: AtomicBool::new(false),
            response_timeout: Mutex::new(DEFAULT_RESPONSE_TIMEOUT),
            running,
            notification_thread: Some(notification_thread),
        })
    }

    fn push(&self, msg: KeyOpFieldsValues) -> SaiResult<()> {
        let json = msg.to_json();
        let mut producer = self.producer.lock();

        if self.buffered.load(Ordering::Acquire) {
            producer
                .pipeline
                .cmd("LPUSH")
                .arg(REQUEST_QUEUE)
                .arg(&json)
                .ignore();
            producer.pending += 1;
            if producer.pending >= PIPELINE_FLUSH_THRESHOLD {
                producer.flush(&self.request_channel)?;
            }
            return Ok(());
        }

        redis::pipe()
            .atomic()
            .cmd("LPUSH")
            .arg(REQUEST_QUEUE)
            .arg(&json)
            .ignore()
            .cmd("PUBLISH")
            .arg(&self.request_channel)
            .arg("G")
            .ignore()
            .query::<()>(&mut producer.conn)
            .map_err(|e| redis_err("request push failed", e))
    }
}

impl Channel for RedisChannel {
    fn set(&self, key: &str, values: &[FieldValue], command: &str) -> SaiResult<()> {
        self.push(KeyOpFieldsValues::new(key, command, values.to_vec()))
    }

    fn del(&self, key: &str, command: &str) -> SaiResult<()> {
        self.push(KeyOpFieldsValues::new(key, command, Vec::new()))
    }

    fn flush(&self) -> SaiResult<()> {
        self.producer.lock().flush(&self.request_channel)
    }

    fn wait(&self, command: &str) -> SaiResult<Response> {
        let timeout = *self.response_timeout.lock();
        let deadline = Instant::now() + timeout;
        let timed_out = || SaiError::Timeout {
            command: command.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        };

        let mut producer = self.producer.lock();
        producer.flush(&self.request_channel)?;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(timed_out());
            }
            // BRPOP treats 0 as "forever"
            let secs = remaining.as_secs_f64().max(0.001);
            let popped: Option<(String, String)> = redis::cmd("BRPOP")
                .arg(RESPONSE_QUEUE)
                .arg(secs)
                .query(&mut producer.conn)
                .map_err(|e| redis_err("response pop failed", e))?;

            let Some((_, json)) = popped else {
                error_log!("RedisChannel", command = %command, "timed out waiting for response");
                return Err(timed_out());
            };

            let msg = KeyOpFieldsValues::from_json(&json)?;
            if msg.op != command {
                warn_log!(
                    "RedisChannel",
                    expected = %command,
                    got = %msg.op,
                    "skipping response for another command"
                );
                continue;
            }
            debug_log!("RedisChannel", command = %command, status = %msg.key, "response received");
            return Response::from_message(msg);
        }
    }

    fn set_buffered(&self, buffered: bool) {
        self.buffered.store(buffered, Ordering::Release);
    }

    fn is_buffered(&self) -> bool {
        self.buffered.load(Ordering::Acquire)
    }

    fn set_response_timeout(&self, timeout: Duration) {
        *self.response_timeout.lock() = timeout;
    }

    fn response_timeout(&self) -> Duration {
        *self.response_timeout.lock()
    }
}

impl Drop for RedisChannel {
    fn drop(&mut self) {
        if let Err(e) = self.producer.lock().flush(&self.request_channel) {
            warn_log!("RedisChannel", error = %e, "failed to flush pending requests on drop");
        }
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.notification_thread.take() {
            if handle.join().is_err() {
                error_log!("RedisChannel", "notification thread panicked");
            }
        }
        debug_log!("RedisChannel", "channel closed");
    }
}

fn spawn_notification_thread(
    client: redis::Client,
    running: Arc<AtomicBool>,
    handler: NotificationHandler,
    guid: u32,
) -> SaiResult<JoinHandle<()>> {
    let (ready_tx, ready_rx) = mpsc::channel::<SaiResult<()>>();

    let handle = thread::Builder::new()
        .name(format!("sairedis-ntf-{}", guid))
        .spawn(move || {
            let mut conn = match client.get_connection() {
                Ok(conn) => conn,
                Err(e) => {
                    let _ = ready_tx.send(Err(redis_err("notification connect failed", e)));
                    return;
                }
            };
            let mut pubsub = conn.as_pubsub();
            let setup = pubsub
                .subscribe(NOTIFICATIONS_CHANNEL)
                .and_then(|_| pubsub.set_read_timeout(Some(NOTIFICATION_POLL_INTERVAL)));
            if let Err(e) = setup {
                let _ = ready_tx.send(Err(redis_err("notification subscribe failed", e)));
                return;
            }
            let _ = ready_tx.send(Ok(()));

            while running.load(Ordering::Acquire) {
                let msg = match pubsub.get_message() {
                    Ok(msg) => msg,
                    Err(e) if e.is_timeout() => continue,
                    Err(e) if e.is_connection_dropped() => {
                        error_log!("RedisChannel", error = %e, "notification connection dropped");
                        break;
                    }
                    Err(e) => {
                        warn_log!("RedisChannel", error = %e, "notification receive failed");
                        continue;
                    }
                };
                let payload: String = match msg.get_payload() {
                    Ok(payload) => payload,
                    Err(e) => {
                        warn_log!("RedisChannel", error = %e, "notification payload is not a string");
                        continue;
                    }
                };
                dispatch_notification(&handler, &payload);
            }
            debug_log!("RedisChannel", "notification thread exiting");
        })
        .map_err(|e| SaiError::internal(format!("failed to spawn notification thread: {}", e)))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e)
        }
        Err(_) => {
            let _ = handle.join();
            Err(SaiError::internal("notification thread exited during setup"))
        }
    }
}

/// Decodes `[name, payload, field, value, ...]` and hands it to `handler`.
pub(crate) fn dispatch_notification(handler: &NotificationHandler, message: &str) {
    match KeyOpFieldsValues::from_json(message) {
        Ok(msg) => handler(&msg.key, &msg.op, &msg.fvs),
        Err(e) => warn_log!("RedisChannel", error = %e, "dropping malformed notification"),
    }
}

/// Reads the `ASIC_STATE` table.
pub struct RedisAsicStateTable {
    conn: Mutex<redis::Connection>,
}

impl RedisAsicStateTable {
    pub fn new(url: &str) -> SaiResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| redis_err(&format!("invalid redis url {}", url), e))?;
        let conn = client
            .get_connection()
            .map_err(|e| redis_err(&format!("failed to connect to {}", url), e))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl AsicStateTable for RedisAsicStateTable {
    fn dump(&self) -> SaiResult<Vec<(String, Vec<FieldValue>)>> {
        let mut conn = self.conn.lock();
        let pattern = format!("{}:*", ASIC_STATE_TABLE);
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(&pattern)
            .query(&mut *conn)
            .map_err(|e| redis_err("KEYS failed", e))?;

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            let fvs: Vec<(String, String)> = redis::cmd("HGETALL")
                .arg(&key)
                .query(&mut *conn)
                .map_err(|e| redis_err("HGETALL failed", e))?;
            let object_key = key
                .strip_prefix(ASIC_STATE_TABLE)
                .and_then(|k| k.strip_prefix(':'))
                .unwrap_or(&key)
                .to_string();
            entries.push((object_key, fvs));
        }
        debug_log!("RedisAsicStateTable", objects = entries.len(), "dumped ASIC state");
        Ok(entries)
    }
}
