//! ZeroMQ transport.
//!
//! Requests travel over a REQ socket connected to `zmq_endpoint`; every
//! request is answered on the same socket, so this channel is always used
//! in synchronous mode. Notifications arrive on a SUB socket connected to
//! `zmq_ntf_endpoint`.

use super::redis_channel::dispatch_notification;
use super::{Channel, FieldValue, KeyOpFieldsValues, NotificationHandler, Response};
use super::DEFAULT_RESPONSE_TIMEOUT;
use crate::config::ContextConfig;
use crate::{debug_log, error_log, info_log, warn_log};
use parking_lot::Mutex;
use sonic_sai::{SaiError, SaiResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const LINGER_MS: i32 = 0;
const NOTIFICATION_POLL_MS: i64 = 1000;

fn zmq_err(what: &str, e: zmq::Error) -> SaiError {
    SaiError::transport(format!("{}: {}", what, e))
}

/// Channel over ZeroMQ request/reply sockets.
pub struct ZeroMqChannel {
    _context: Arc<zmq::Context>,
    socket: Mutex<zmq::Socket>,
    endpoint: String,
    response_timeout: Mutex<Duration>,
    running: Arc<AtomicBool>,
    notification_thread: Option<JoinHandle<()>>,
}

impl ZeroMqChannel {
    pub fn connect(config: &ContextConfig, handler: NotificationHandler) -> SaiResult<Self> {
        let context = Arc::new(zmq::Context::new());

        let socket = context
            .socket(zmq::REQ)
            .map_err(|e| zmq_err("failed to create REQ socket", e))?;
        socket
            .set_linger(LINGER_MS)
            .map_err(|e| zmq_err("failed to set linger", e))?;
        socket
            .connect(&config.zmq_endpoint)
            .map_err(|e| zmq_err(&format!("failed to connect {}", config.zmq_endpoint), e))?;

        let running = Arc::new(AtomicBool::new(true));
        let notification_thread = spawn_notification_thread(
            context.clone(),
            config.zmq_ntf_endpoint.clone(),
            running.clone(),
            handler,
        )?;

        info_log!(
            "ZeroMqChannel",
            guid = config.guid,
            endpoint = %config.zmq_endpoint,
            ntf_endpoint = %config.zmq_ntf_endpoint,
            "zmq channel connected"
        );

        Ok(Self {
            _context: context,
            socket: Mutex::new(socket),
            endpoint: config.zmq_endpoint.clone(),
            response_timeout: Mutex::new(DEFAULT_RESPONSE_TIMEOUT),
            running,
            notification_thread: Some(notification_thread),
        })
    }

    fn send(&self, msg: KeyOpFieldsValues) -> SaiResult<()> {
        let json = msg.to_json();
        self.socket
            .lock()
            .send(json.as_bytes(), 0)
            .map_err(|e| zmq_err(&format!("send to {} failed", self.endpoint), e))
    }
}

impl Channel for ZeroMqChannel {
    fn set(&self, key: &str, values: &[FieldValue], command: &str) -> SaiResult<()> {
        self.send(KeyOpFieldsValues::new(key, command, values.to_vec()))
    }

    fn del(&self, key: &str, command: &str) -> SaiResult<()> {
        self.send(KeyOpFieldsValues::new(key, command, Vec::new()))
    }

    fn flush(&self) -> SaiResult<()> {
        Ok(())
    }

    fn wait(&self, command: &str) -> SaiResult<Response> {
        let timeout = *self.response_timeout.lock();
        let socket = self.socket.lock();
        socket
            .set_rcvtimeo(timeout.as_millis().min(i32::MAX as u128) as i32)
            .map_err(|e| zmq_err("failed to set receive timeout", e))?;

        let mut msg = zmq::Message::new();
        match socket.recv(&mut msg, 0) {
            Ok(()) => {}
            Err(zmq::Error::EAGAIN) => {
                error_log!("ZeroMqChannel", command = %command, "timed out waiting for response");
                return Err(SaiError::Timeout {
                    command: command.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                });
            }
            Err(e) => return Err(zmq_err("receive failed", e)),
        }

        let text = msg
            .as_str()
            .ok_or_else(|| SaiError::transport("response is not valid UTF-8"))?;
        let reply = KeyOpFieldsValues::from_json(text)?;
        if reply.op != command {
            // REQ/REP is lockstep; a mismatch means the peer answered something else
            return Err(SaiError::transport(format!(
                "expected {} response, got {}",
                command, reply.op
            )));
        }
        debug_log!("ZeroMqChannel", command = %command, status = %reply.key, "response received");
        Response::from_message(reply)
    }

    fn set_buffered(&self, buffered: bool) {
        if buffered {
            warn_log!("ZeroMqChannel", "buffering is not supported, ignoring");
        }
    }

    fn is_buffered(&self) -> bool {
        false
    }

    fn set_response_timeout(&self, timeout: Duration) {
        *self.response_timeout.lock() = timeout;
    }

    fn response_timeout(&self) -> Duration {
        *self.response_timeout.lock()
    }
}

impl Drop for ZeroMqChannel {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.notification_thread.take() {
            if handle.join().is_err() {
                error_log!("ZeroMqChannel", "notification thread panicked");
            }
        }
    }
}

fn spawn_notification_thread(
    context: Arc<zmq::Context>,
    endpoint: String,
    running: Arc<AtomicBool>,
    handler: NotificationHandler,
) -> SaiResult<JoinHandle<()>> {
    let socket = context
        .socket(zmq::SUB)
        .map_err(|e| zmq_err("failed to create SUB socket", e))?;
    socket
        .set_linger(LINGER_MS)
        .map_err(|e| zmq_err("failed to set linger", e))?;
    socket
        .set_subscribe(b"")
        .map_err(|e| zmq_err("failed to subscribe", e))?;
    socket
        .connect(&endpoint)
        .map_err(|e| zmq_err(&format!("failed to connect {}", endpoint), e))?;

    thread::Builder::new()
        .name("sairedis-zmq-ntf".to_string())
        .spawn(move || {
            while running.load(Ordering::Acquire) {
                let poll_items = &mut [socket.as_poll_item(zmq::POLLIN)];
                if let Err(e) = zmq::poll(poll_items, NOTIFICATION_POLL_MS) {
                    warn_log!("ZeroMqChannel", error = %e, "notification poll failed");
                    continue;
                }
                if !poll_items[0].is_readable() {
                    continue;
                }
                let mut msg = zmq::Message::new();
                match socket.recv(&mut msg, 0) {
                    Ok(()) => match msg.as_str() {
                        Some(text) => dispatch_notification(&handler, text),
                        None => warn_log!("ZeroMqChannel", "dropping non UTF-8 notification"),
                    },
                    Err(e) => warn_log!("ZeroMqChannel", error = %e, "notification receive failed"),
                }
            }
            debug_log!("ZeroMqChannel", "notification thread exiting");
        })
        .map_err(|e| SaiError::internal(format!("failed to spawn notification thread: {}", e)))
}
