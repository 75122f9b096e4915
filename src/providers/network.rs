//! UDP source for schema-described datagrams

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tracing::{debug, info, trace, warn};

use crate::dynamic_frame::{DynamicDecoder, DynamicFrame};
use crate::provider::{Availability, SourceAdapter, SourcePoll};
use crate::types::RawRecord;
use crate::{DecodeError, Result, TelemetryError};

/// Default wait for the first datagram of a tick.
pub const DEFAULT_RECV_WAIT: Duration = Duration::from_millis(10);

/// Minimum receive buffer; datagrams are far smaller in practice.
const MIN_RECV_BUFFER: usize = 4096;

/// Source receiving one datagram kind on a bound UDP socket.
///
/// Each poll waits at most `recv_wait` for a datagram, then drains whatever
/// else is queued without waiting and keeps the newest one that decodes.
/// The source is unavailable until the first datagram decodes.
pub struct NetworkSource {
    socket: UdpSocket,
    decoder: DynamicDecoder,
    recv_wait: Duration,
    buf: Vec<u8>,
    availability: Availability,
    received: u64,
    discarded: u64,
    last_rejected_len: Option<usize>,
}

impl NetworkSource {
    /// Bind `addr` and decode datagrams with `decoder`.
    pub async fn bind(addr: SocketAddr, decoder: DynamicDecoder, recv_wait: Duration) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| TelemetryError::io_error(format!("Failed to bind UDP socket on {addr}"), e))?;
        let source = Self::from_socket(socket, decoder, recv_wait);
        info!(
            addr = %source.local_addr()?,
            packet = source.decoder.plan().packet(),
            datagram_len = source.decoder.plan().byte_len(),
            "Listening for telemetry datagrams"
        );
        Ok(source)
    }

    /// Use an already bound socket.
    pub fn from_socket(socket: UdpSocket, decoder: DynamicDecoder, recv_wait: Duration) -> Self {
        let buf_len = MIN_RECV_BUFFER.max(decoder.plan().byte_len() + 1);
        Self {
            socket,
            decoder,
            recv_wait,
            buf: vec![0; buf_len],
            availability: Availability::Unavailable,
            received: 0,
            discarded: 0,
            last_rejected_len: None,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(|e| TelemetryError::io_error("Failed to read local address", e))
    }

    /// Datagrams decoded and discarded so far.
    pub fn counts(&self) -> (u64, u64) {
        (self.received, self.discarded)
    }

    fn accept(&mut self, len: usize) -> Option<DynamicFrame> {
        match self.decoder.decode(&self.buf[..len]) {
            Ok(frame) => {
                self.received += 1;
                self.last_rejected_len = None;
                Some(frame)
            }
            Err(e) => {
                self.discarded += 1;
                self.log_rejected(len, &e);
                None
            }
        }
    }

    /// Warn when a new bad length starts arriving, debug for repeats.
    fn log_rejected(&mut self, len: usize, error: &DecodeError) {
        if self.last_rejected_len == Some(len) {
            debug!(len, error = %error, "Discarded datagram");
        } else {
            warn!(len, error = %error, discarded = self.discarded, "Discarding datagrams that do not match the decode plan");
            self.last_rejected_len = Some(len);
        }
    }
}

#[async_trait::async_trait]
impl SourceAdapter for NetworkSource {
    async fn poll(&mut self) -> Result<SourcePoll> {
        let first = match tokio::time::timeout(self.recv_wait, self.socket.recv(&mut self.buf)).await {
            Ok(Ok(len)) => Some(len),
            Ok(Err(e)) if is_transient(&e) => {
                debug!(error = %e, "Transient UDP receive error");
                None
            }
            Ok(Err(e)) => return Err(TelemetryError::io_error("UDP receive failed", e)),
            Err(_) => None,
        };

        let mut newest = None;
        if let Some(len) = first {
            newest = self.accept(len);
            loop {
                match self.socket.try_recv(&mut self.buf) {
                    Ok(len) => {
                        if let Some(frame) = self.accept(len) {
                            newest = Some(frame);
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                    Err(e) if is_transient(&e) => {
                        debug!(error = %e, "Transient UDP receive error while draining");
                        break;
                    }
                    Err(e) => return Err(TelemetryError::io_error("UDP receive failed", e)),
                }
            }
        }

        match newest {
            Some(frame) => {
                if !self.availability.is_available() {
                    info!(packet = frame.plan().packet(), "Receiving telemetry datagrams");
                    self.availability = Availability::Available;
                }
                trace!(received = self.received, "Decoded datagram");
                Ok(SourcePoll::Record(RawRecord::from(frame)))
            }
            None if self.availability.is_available() => Ok(SourcePoll::NoChange),
            None => Ok(SourcePoll::Unavailable),
        }
    }

    fn availability(&self) -> Availability {
        self.availability
    }

    fn name(&self) -> &'static str {
        "network"
    }
}

/// Errors a UDP socket reports for conditions on the peer's side, such as an
/// ICMP port unreachable surfacing as a reset on Windows.
fn is_transient(error: &std::io::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::ConnectionReset | ErrorKind::ConnectionRefused | ErrorKind::Interrupted
    )
}
