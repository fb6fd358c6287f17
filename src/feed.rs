// Feed subscription: reads multi-part messages from stdin, a TCP endpoint or
// (with the `zmq` feature) a ZeroMQ SUB socket, and forwards them to the main
// loop over a channel.
//
// Line framing is one JSON array of strings per line, e.g.
// ["energy_from_filt_value","3","0:1:3","[1,2,3]","10","[0.1,0.2]"]

#[cfg(feature = "zmq")]
mod zmq_feed;

#[cfg(feature = "zmq")]
pub use zmq_feed::ZmqFeed;

use crossbeam_channel::Sender;
use std::io::{self, BufRead, BufReader};
use std::net::TcpStream;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default subscription prefix.
pub const DEFAULT_TOPIC: &str = "energy_from_filt_value";

/// The ordered parts of one published message.
pub type RawMessage = Vec<String>;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed frame on line {line}: {source}")]
    Frame {
        line: u64,
        #[source]
        source: serde_json::Error,
    },

    #[error("message part {index} is not valid UTF-8")]
    InvalidPart { index: usize },

    #[cfg(feature = "zmq")]
    #[error("zmq error: {0}")]
    Zmq(#[from] zmq::Error),
}

impl FeedError {
    /// Errors confined to a single message; the feed itself is still usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FeedError::Frame { .. } | FeedError::InvalidPart { .. })
    }
}

/// Where the feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Stdin,
    Tcp(String),
    /// ZeroMQ endpoint, e.g. `tcp://daq-host:5555`. Needs the `zmq` feature.
    Zmq(String),
}

/// Blocking source of raw messages. `Ok(None)` marks the end of the stream.
pub trait Feed {
    fn receive_next(&mut self) -> Result<Option<RawMessage>, FeedError>;
}

/// Newline-delimited JSON framing over any buffered reader.
///
/// Lines are read as raw bytes, so a line that is not UTF-8 is a frame error
/// for that line only.
pub struct LineFeed<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    line_no: u64,
}

impl<R: BufRead> LineFeed<R> {
    pub fn new(reader: R) -> Self {
        LineFeed {
            reader,
            line: Vec::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Feed for LineFeed<R> {
    fn receive_next(&mut self) -> Result<Option<RawMessage>, FeedError> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let trimmed = self.line.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }
            return serde_json::from_slice(trimmed)
                .map(Some)
                .map_err(|source| FeedError::Frame {
                    line: self.line_no,
                    source,
                });
        }
    }
}

/// Opens the configured source. `topic` is the subscription prefix, used by
/// sources that filter at the transport.
pub fn open_source(source: &FeedSource, topic: &str) -> io::Result<Box<dyn Feed + Send>> {
    match source {
        FeedSource::Stdin => Ok(Box::new(LineFeed::new(BufReader::new(io::stdin())))),
        FeedSource::Tcp(addr) => {
            let stream = TcpStream::connect(addr)?;
            info!(endpoint = %addr, "Connected to feed");
            Ok(Box::new(LineFeed::new(BufReader::new(stream))))
        }
        #[cfg(feature = "zmq")]
        FeedSource::Zmq(endpoint) => {
            let feed = ZmqFeed::connect(endpoint, topic).map_err(io::Error::other)?;
            info!(endpoint = %endpoint, topic, "Subscribed to feed");
            Ok(Box::new(feed))
        }
        #[cfg(not(feature = "zmq"))]
        FeedSource::Zmq(endpoint) => {
            let _ = topic;
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("cannot subscribe to {endpoint}: built without the `zmq` feature"),
            ))
        }
    }
}

/// Messages forwarded from the reader thread.
#[derive(Debug)]
pub enum FeedEvent {
    Message(RawMessage),
    /// The feed ended or failed irrecoverably.
    Closed,
}

/// Subscription filter: messages whose topic does not start with the prefix are dropped.
pub fn topic_matches(prefix: &str, topic: &str) -> bool {
    topic.starts_with(prefix)
}

/// Spawns a thread that pulls messages from `feed` and forwards them.
///
/// Malformed messages are logged and skipped. The thread exits on end of
/// stream, on a transport error, or once the receiving side hangs up.
pub fn spawn_reader(
    mut feed: Box<dyn Feed + Send>,
    sender: Sender<FeedEvent>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("feed-reader".to_string())
        .spawn(move || {
            loop {
                match feed.receive_next() {
                    Ok(Some(parts)) => {
                        if sender.send(FeedEvent::Message(parts)).is_err() {
                            debug!("Main loop hung up, stopping feed reader");
                            return;
                        }
                    }
                    Ok(None) => {
                        info!("Feed reached end of stream");
                        break;
                    }
                    Err(e) if e.is_recoverable() => {
                        warn!(error = %e, "Skipping malformed frame");
                    }
                    Err(e) => {
                        warn!(error = %e, "Feed read failed");
                        break;
                    }
                }
            }
            let _ = sender.send(FeedEvent::Closed);
        })
}
