//! ZeroMQ SUB socket feed. Each multipart message is one update.

use super::{Feed, FeedError, RawMessage};

pub struct ZmqFeed {
    // Keeps the context alive for as long as the socket.
    _context: zmq::Context,
    socket: zmq::Socket,
}

impl ZmqFeed {
    /// Connects a SUB socket to `endpoint` and subscribes to the `topic` prefix.
    pub fn connect(endpoint: &str, topic: &str) -> Result<Self, FeedError> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::SUB)?;
        socket.connect(endpoint)?;
        socket.set_subscribe(topic.as_bytes())?;
        Ok(ZmqFeed {
            _context: context,
            socket,
        })
    }
}

/// Converts raw message frames into string parts.
pub(crate) fn parts_from_frames(frames: Vec<Vec<u8>>) -> Result<RawMessage, FeedError> {
    frames
        .into_iter()
        .enumerate()
        .map(|(index, frame)| String::from_utf8(frame).map_err(|_| FeedError::InvalidPart { index }))
        .collect()
}

impl Feed for ZmqFeed {
    fn receive_next(&mut self) -> Result<Option<RawMessage>, FeedError> {
        let frames = self.socket.recv_multipart(0)?;
        parts_from_frames(frames).map(Some)
    }
}
