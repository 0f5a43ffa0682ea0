//! Emulator console client.
//!
//! The emulator exposes a line-oriented text console on a local TCP port
//! (5554 for the first instance).  Touch and key input is injected with
//! `event send` commands; every command is answered with `OK` or `KO: reason`.
//!
//! # Connection lifecycle (for beginners)
//!
//! The session loop gives the sink one time slice per iteration through
//! [`InputSink::wait`].  All blocking work happens there:
//!
//! - While disconnected, `wait` tries to connect (at most once per
//!   `reconnect_interval`) and never overruns its budget.
//! - While connected, `wait` sleeps until the console has something to say
//!   or the budget is spent, then buffers whatever arrived.
//!
//! Everything else is non-blocking.  `send_*` only appends a line to a bounded
//! outbound queue, and [`InputSink::poll`] writes as much of that queue as the
//! socket accepts right now and logs the replies that were buffered by `wait`.
//!
//! Lines still queued when the sink is dropped get one last non-blocking
//! write attempt.
//!
//! Events produced while disconnected are rejected with
//! [`SinkError::NotConnected`] instead of being queued: replaying stale touch
//! input after a reconnect would inject gestures the user never made.

use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use emugl_core::protocol::console::DEFAULT_CONSOLE_PORT;
use emugl_core::{ConsoleCommand, ConsoleReply, LogicalKeyCode, ProtocolError};
use emugl_core::protocol::ReplyDecoder;
use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::{debug, info, trace, warn};

use crate::application::forward_events::{InputSink, SinkError};

const READ_CHUNK: usize = 1024;

/// Configuration for the console connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSinkConfig {
    pub host: String,
    pub port: u16,
    /// Minimum delay between two connection attempts.
    pub reconnect_interval: Duration,
    /// Sent as `auth <token>` right after connecting.
    pub auth_token: Option<String>,
    /// Upper bound of lines not yet started; the oldest one is dropped when
    /// full.
    pub max_queued: usize,
}

impl ConsoleSinkConfig {
    /// `host:port` as passed to the resolver.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConsoleSinkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_CONSOLE_PORT,
            reconnect_interval: Duration::from_secs(1),
            auth_token: None,
            max_queued: 256,
        }
    }
}

/// Reads the console auth token from `path`.
///
/// A missing or blank file yields `Ok(None)`: older emulators do not require
/// authentication.
///
/// # Errors
///
/// Returns any I/O error other than `NotFound`.
pub fn load_auth_token(path: &Path) -> std::io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let token = contents.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Lines waiting for the socket.
///
/// The bound applies to lines not yet started: a partially written front
/// line has to go out whole and never counts against `max`.
#[derive(Debug)]
struct OutboundQueue {
    lines: VecDeque<Vec<u8>>,
    /// Bytes of the front line already handed to the socket.
    written: usize,
    max: usize,
}

impl OutboundQueue {
    fn new(max: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            written: 0,
            max: max.max(1),
        }
    }

    fn len(&self) -> usize {
        self.lines.len()
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn unstarted(&self) -> usize {
        self.lines.len() - usize::from(self.written > 0)
    }

    /// Appends `line`, dropping the oldest unstarted line when full.
    /// Returns `true` when a line was dropped.
    fn push(&mut self, line: Vec<u8>) -> bool {
        let mut dropped = false;
        if self.unstarted() >= self.max {
            let victim = usize::from(self.written > 0);
            dropped = self.lines.remove(victim).is_some();
        }
        self.lines.push_back(line);
        dropped
    }

    /// Puts `line` ahead of everything that has not started yet.
    fn push_front(&mut self, line: Vec<u8>) {
        let at = usize::from(self.written > 0);
        self.lines.insert(at, line);
    }

    /// Remaining bytes of the front line.
    fn pending(&self) -> Option<&[u8]> {
        self.lines.front().map(|line| &line[self.written..])
    }

    /// Marks `n` more bytes of the front line as written.  Returns `true`
    /// when that completed the line.
    fn advance(&mut self, n: usize) -> bool {
        self.written += n;
        match self.lines.front() {
            Some(line) if self.written >= line.len() => {
                self.lines.pop_front();
                self.written = 0;
                true
            }
            _ => false,
        }
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.written = 0;
    }
}

/// [`InputSink`] backed by the emulator console.
pub struct ConsoleInputSink {
    config: ConsoleSinkConfig,
    stream: Option<TcpStream>,
    decoder: ReplyDecoder,
    outbound: OutboundQueue,
    /// First undecodable reply since the last `poll`.
    reply_error: Option<ProtocolError>,
    next_attempt: Option<Instant>,
    ko_replies: u64,
    dropped_lines: u64,
    lines_written: u64,
}

impl ConsoleInputSink {
    /// Creates a disconnected sink.  No I/O happens until the first `wait`.
    pub fn new(config: ConsoleSinkConfig) -> Self {
        let outbound = OutboundQueue::new(config.max_queued);
        Self {
            config,
            stream: None,
            decoder: ReplyDecoder::new(),
            outbound,
            reply_error: None,
            next_attempt: None,
            ko_replies: 0,
            dropped_lines: 0,
            lines_written: 0,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Number of `KO` replies received so far.
    pub fn ko_replies(&self) -> u64 {
        self.ko_replies
    }

    /// Lines discarded because the outbound queue was full.
    pub fn dropped_lines(&self) -> u64 {
        self.dropped_lines
    }

    /// Lines completely handed to the socket, auth included.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Lines waiting to be written, including a partially written one.
    pub fn queued_lines(&self) -> usize {
        self.outbound.len()
    }

    async fn connect(&mut self, deadline: Instant) -> Result<(), SinkError> {
        let addr = self.config.addr();
        // Set before the await so a cancelled attempt still counts.
        self.next_attempt = Some(Instant::now() + self.config.reconnect_interval);
        debug!("connecting to emulator console at {addr}");
        let attempt = time::timeout_at(deadline, TcpStream::connect(addr.as_str())).await;

        let stream = match attempt {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(SinkError::Connect { addr, source }),
            Err(_) => return Err(SinkError::ConnectTimeout { addr }),
        };
        if let Err(e) = stream.set_nodelay(true) {
            debug!("could not disable Nagle on console socket: {e}");
        }

        info!("connected to emulator console at {addr}");
        self.stream = Some(stream);
        self.decoder.reset();
        if let Some(token) = &self.config.auth_token {
            let line = ConsoleCommand::Auth(token.clone()).encode();
            self.outbound.push_front(line.into_bytes());
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.stream.take().is_some() {
            warn!(
                "emulator console connection lost; discarding {} queued line(s)",
                self.outbound.len()
            );
        }
        self.outbound.clear();
        self.decoder.reset();
        self.next_attempt = Some(Instant::now() + self.config.reconnect_interval);
    }

    /// Moves everything the socket has buffered into the reply decoder.
    ///
    /// Replies are decoded after every chunk so the decoder never holds more
    /// than one oversized line plus one chunk.
    fn read_available(&mut self) -> Result<(), SinkError> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let Some(stream) = self.stream.as_ref() else {
                return Ok(());
            };
            match stream.try_read(&mut buf) {
                Ok(0) => {
                    self.disconnect();
                    return Err(SinkError::Closed);
                }
                Ok(n) => {
                    self.decoder.push(&buf[..n]);
                    self.process_replies();
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) => {
                    self.disconnect();
                    return Err(SinkError::Io(e));
                }
            }
        }
    }

    fn process_replies(&mut self) {
        while let Some(reply) = self.decoder.next_reply() {
            match reply {
                Ok(ConsoleReply::Ok) => trace!("console: OK"),
                Ok(ConsoleReply::Ko(reason)) => {
                    self.ko_replies += 1;
                    warn!("emulator console rejected a command: {reason}");
                }
                Ok(ConsoleReply::Info(line)) => debug!("console: {line}"),
                Err(e) => {
                    self.reply_error.get_or_insert(e);
                }
            }
        }
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        loop {
            let Some(stream) = self.stream.as_ref() else {
                return Ok(());
            };
            let Some(bytes) = self.outbound.pending() else {
                return Ok(());
            };
            match stream.try_write(bytes) {
                Ok(0) => return Ok(()),
                Ok(n) => {
                    if self.outbound.advance(n) {
                        self.lines_written += 1;
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) => {
                    self.disconnect();
                    return Err(SinkError::Io(e));
                }
            }
        }
    }

    fn enqueue(&mut self, command: ConsoleCommand) -> Result<(), SinkError> {
        if self.stream.is_none() {
            return Err(SinkError::NotConnected);
        }
        if self.outbound.push(command.encode().into_bytes()) {
            self.dropped_lines += 1;
            debug!("console queue full; dropped oldest line");
        }
        Ok(())
    }
}

impl Drop for ConsoleInputSink {
    fn drop(&mut self) {
        if self.stream.is_none() || self.outbound.is_empty() {
            return;
        }
        if let Err(e) = self.flush() {
            debug!("final console flush failed: {e}");
        }
        if !self.outbound.is_empty() {
            warn!(
                "closing emulator console with {} unwritten line(s)",
                self.outbound.len()
            );
        }
    }
}

#[async_trait]
impl InputSink for ConsoleInputSink {
    async fn wait(&mut self, max_wait: Duration) -> Result<(), SinkError> {
        let deadline = Instant::now() + max_wait;

        if self.stream.is_none() {
            if let Some(next) = self.next_attempt {
                if next > Instant::now() {
                    time::sleep_until(next.min(deadline)).await;
                    if next > Instant::now() {
                        return Ok(());
                    }
                }
            }
            self.connect(deadline).await?;
        }

        let ready = match self.stream.as_ref() {
            Some(stream) => time::timeout_at(deadline, stream.readable()).await,
            None => return Ok(()),
        };
        match ready {
            Ok(Ok(())) => self.read_available(),
            Ok(Err(e)) => {
                self.disconnect();
                Err(SinkError::Io(e))
            }
            Err(_) => Ok(()),
        }
    }

    fn poll(&mut self) -> Result<(), SinkError> {
        self.process_replies();
        self.flush()?;
        self.reply_error.take().map_or(Ok(()), |e| Err(e.into()))
    }

    fn send_mouse_down(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        self.enqueue(ConsoleCommand::TouchDown { x, y })
    }

    fn send_mouse_up(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        self.enqueue(ConsoleCommand::TouchUp { x, y })
    }

    fn send_mouse_motion(&mut self, x: i32, y: i32) -> Result<(), SinkError> {
        self.enqueue(ConsoleCommand::TouchMove { x, y })
    }

    fn send_key_down(&mut self, code: LogicalKeyCode) -> Result<(), SinkError> {
        self.enqueue(ConsoleCommand::KeyDown(code))
    }

    fn send_key_up(&mut self, code: LogicalKeyCode) -> Result<(), SinkError> {
        self.enqueue(ConsoleCommand::KeyUp(code))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::forward_events::EventForwarder;
    use emugl_core::protocol::console::MAX_REPLY_LINE;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;

    async fn listener() -> (TcpListener, ConsoleSinkConfig) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = ConsoleSinkConfig {
            port,
            reconnect_interval: Duration::from_secs(60),
            ..Default::default()
        };
        (listener, config)
    }

    async fn read_line(reader: &mut BufReader<TcpStream>) -> String {
        let mut line = String::new();
        time::timeout(Duration::from_secs(5), reader.read_line(&mut line))
            .await
            .expect("line within timeout")
            .unwrap();
        line
    }

    #[test]
    fn test_default_config_targets_first_emulator() {
        let config = ConsoleSinkConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:5554");
        assert_eq!(config.max_queued, 256);
    }

    #[test]
    fn test_send_while_disconnected_is_rejected() {
        // Arrange
        let mut sink = ConsoleInputSink::new(ConsoleSinkConfig::default());

        // Act
        let result = sink.send_mouse_down(1, 2);

        // Assert
        assert!(matches!(result, Err(SinkError::NotConnected)));
        assert_eq!(sink.queued_lines(), 0);
    }

    #[test]
    fn test_load_auth_token_trims_and_ignores_missing_file() {
        let dir = std::env::temp_dir().join(format!("emugl-auth-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("token");

        assert_eq!(load_auth_token(&path).unwrap(), None);

        std::fs::write(&path, "  s3cret\n").unwrap();
        assert_eq!(load_auth_token(&path).unwrap(), Some("s3cret".to_string()));

        std::fs::write(&path, "\n").unwrap();
        assert_eq!(load_auth_token(&path).unwrap(), None);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_touch_down_is_written_as_event_send() {
        // Arrange
        let (listener, config) = listener().await;
        let mut sink = ConsoleInputSink::new(config);

        // Act
        sink.wait(Duration::from_millis(50)).await.unwrap();
        sink.send_mouse_down(10, 20).unwrap();
        sink.poll().unwrap();

        // Assert
        let (server, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(server);
        assert_eq!(read_line(&mut reader).await, "event send 3:0:10 3:1:20 1:330:1 0:0:0\n");
        assert_eq!(sink.queued_lines(), 0);
        assert_eq!(sink.lines_written(), 1);
    }

    #[tokio::test]
    async fn test_auth_token_is_sent_before_events() {
        // Arrange
        let (listener, mut config) = listener().await;
        config.auth_token = Some("abc123".to_string());
        let mut sink = ConsoleInputSink::new(config);

        // Act
        sink.wait(Duration::from_millis(50)).await.unwrap();
        sink.send_key_down(LogicalKeyCode::BACK).unwrap();
        sink.poll().unwrap();

        // Assert
        let (server, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(server);
        assert_eq!(read_line(&mut reader).await, "auth abc123\n");
        assert_eq!(read_line(&mut reader).await, "event send 1:158:1\n");
    }

    #[tokio::test]
    async fn test_refused_connection_waits_for_reconnect_interval() {
        // Arrange – bind then drop so the port refuses connections
        let (listener, config) = listener().await;
        drop(listener);
        let mut sink = ConsoleInputSink::new(config);

        // Act
        let first = sink.wait(Duration::from_millis(200)).await;
        let started = std::time::Instant::now();
        let second = sink.wait(Duration::from_millis(20)).await;

        // Assert
        assert!(matches!(first, Err(SinkError::Connect { .. }) | Err(SinkError::ConnectTimeout { .. })));
        assert!(second.is_ok(), "no attempt before the reconnect interval elapses");
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!sink.is_connected());
    }

    #[tokio::test]
    async fn test_ko_reply_is_counted() {
        // Arrange
        let (listener, config) = listener().await;
        let mut sink = ConsoleInputSink::new(config);
        sink.wait(Duration::from_millis(20)).await.unwrap();
        let (mut server, _) = listener.accept().await.unwrap();

        // Act
        server.write_all(b"Android Console\r\nOK\r\nKO: unknown command\r\n").await.unwrap();
        server.flush().await.unwrap();
        for _ in 0..50 {
            sink.wait(Duration::from_millis(20)).await.unwrap();
            sink.poll().unwrap();
            if sink.ko_replies() > 0 {
                break;
            }
        }

        // Assert
        assert_eq!(sink.ko_replies(), 1);
    }

    #[tokio::test]
    async fn test_remote_close_disconnects() {
        // Arrange
        let (listener, config) = listener().await;
        let mut sink = ConsoleInputSink::new(config);
        sink.wait(Duration::from_millis(20)).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();

        // Act
        drop(server);
        let mut result = Ok(());
        for _ in 0..50 {
            result = sink.wait(Duration::from_millis(20)).await;
            if result.is_err() {
                break;
            }
        }

        // Assert
        assert!(matches!(result, Err(SinkError::Closed) | Err(SinkError::Io(_))));
        assert!(!sink.is_connected());
        assert!(matches!(sink.send_mouse_up(0, 0), Err(SinkError::NotConnected)));
    }

    #[tokio::test]
    async fn test_full_queue_drops_oldest_line() {
        // Arrange
        let (listener, mut config) = listener().await;
        config.max_queued = 2;
        let mut sink = ConsoleInputSink::new(config);
        sink.wait(Duration::from_millis(20)).await.unwrap();

        // Act – three lines without flushing
        sink.send_mouse_down(1, 1).unwrap();
        sink.send_mouse_motion(2, 2).unwrap();
        sink.send_mouse_up(3, 3).unwrap();
        sink.poll().unwrap();

        // Assert
        assert_eq!(sink.dropped_lines(), 1);
        let (server, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(server);
        assert_eq!(read_line(&mut reader).await, "event send 3:0:2 3:1:2 0:0:0\n");
        assert_eq!(read_line(&mut reader).await, "event send 3:0:3 3:1:3 1:330:0 0:0:0\n");
    }

    /// Non-routable address: connects neither succeed nor get refused.
    fn blackholed() -> ConsoleSinkConfig {
        ConsoleSinkConfig {
            host: "10.255.255.1".to_string(),
            reconnect_interval: Duration::from_secs(30),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unreachable_console_is_retried_on_interval_and_counted() {
        // Arrange
        let mut forwarder = EventForwarder::new(ConsoleInputSink::new(blackholed()));

        // Act
        let started = std::time::Instant::now();
        for _ in 0..10 {
            forwarder.tick(Duration::from_millis(20)).await;
        }

        // Assert – one attempt, one counted failure, no tick overran
        assert_eq!(forwarder.stats().transport_errors, 1);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!forwarder.sink().is_connected());
    }

    #[tokio::test]
    async fn test_cancelled_connect_still_schedules_next_attempt() {
        // Arrange
        let mut sink = ConsoleInputSink::new(blackholed());
        let _ = time::timeout(Duration::from_millis(5), sink.wait(Duration::from_secs(1))).await;

        // Act
        let started = std::time::Instant::now();
        let result = sink.wait(Duration::from_millis(20)).await;

        // Assert
        assert!(result.is_ok(), "no second attempt inside the reconnect interval");
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!sink.is_connected());
    }

    #[test]
    fn test_queue_bound_ignores_partially_written_line() {
        // Arrange
        let mut queue = OutboundQueue::new(1);
        queue.push(b"first\n".to_vec());
        assert!(!queue.advance(2));

        // Act
        let first_drop = queue.push(b"second\n".to_vec());
        let second_drop = queue.push(b"third\n".to_vec());

        // Assert – the partial line stays, one unstarted line at most
        assert!(!first_drop);
        assert!(second_drop);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pending(), Some(&b"rst\n"[..]));
        assert!(queue.advance(4));
        assert_eq!(queue.pending(), Some(&b"third\n"[..]));
    }

    #[test]
    fn test_queue_push_front_never_splits_a_started_line() {
        let mut queue = OutboundQueue::new(4);
        queue.push(b"event\n".to_vec());
        queue.advance(1);

        queue.push_front(b"auth t\n".to_vec());

        assert_eq!(queue.pending(), Some(&b"vent\n"[..]));
        assert!(queue.advance(5));
        assert_eq!(queue.pending(), Some(&b"auth t\n"[..]));
    }

    #[tokio::test]
    async fn test_oversized_reply_is_bounded_and_reported() {
        // Arrange
        let (listener, config) = listener().await;
        let mut sink = ConsoleInputSink::new(config);
        sink.wait(Duration::from_millis(20)).await.unwrap();
        let (mut server, _) = listener.accept().await.unwrap();

        // Act – a reply far longer than any legal line, never terminated
        server.write_all(&vec![b'x'; 64 * 1024]).await.unwrap();
        server.flush().await.unwrap();
        let mut result = Ok(());
        for _ in 0..50 {
            sink.wait(Duration::from_millis(20)).await.unwrap();
            assert!(sink.decoder.buffered() <= MAX_REPLY_LINE + READ_CHUNK);
            result = sink.poll();
            if result.is_err() {
                break;
            }
        }

        // Assert
        assert!(matches!(
            result,
            Err(SinkError::Protocol(ProtocolError::LineTooLong { .. }))
        ));
        assert!(sink.is_connected());
    }

    #[tokio::test]
    async fn test_drop_writes_queued_lines() {
        // Arrange
        let (listener, config) = listener().await;
        let mut sink = ConsoleInputSink::new(config);
        sink.wait(Duration::from_millis(20)).await.unwrap();
        sink.send_mouse_up(4, 5).unwrap();

        // Act
        drop(sink);

        // Assert
        let (server, _) = listener.accept().await.unwrap();
        let mut reader = BufReader::new(server);
        assert_eq!(read_line(&mut reader).await, "event send 3:0:4 3:1:5 1:330:0 0:0:0\n");
    }
}
