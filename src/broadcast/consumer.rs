//! Consumers the hub delivers records to

use std::io::{self, Write};
use std::sync::mpsc::Sender;

use thiserror::Error;

/// Registry key handed out by the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConsumerId(pub u64);

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("listener disconnected")]
    Disconnected,

    #[error("write failed")]
    Io(#[from] io::Error),
}

/// A connected listener, owned by the hub's coordinator thread
pub trait Consumer: Send {
    fn deliver(&mut self, record: &str) -> Result<(), DeliveryError>;
}

/// In-process listener on the other end of an mpsc channel
pub struct ChannelConsumer {
    tx: Sender<String>,
}

impl ChannelConsumer {
    pub fn new(tx: Sender<String>) -> Self {
        Self { tx }
    }
}

impl Consumer for ChannelConsumer {
    fn deliver(&mut self, record: &str) -> Result<(), DeliveryError> {
        self.tx.send(record.to_owned()).map_err(|_| DeliveryError::Disconnected)
    }
}

/// Newline-delimited records into any writer, e.g. stdout
pub struct WriterConsumer<W> {
    writer: W,
}

impl<W: Write + Send> WriterConsumer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> Consumer for WriterConsumer<W> {
    fn deliver(&mut self, record: &str) -> Result<(), DeliveryError> {
        writeln!(self.writer, "{record}")?;
        self.writer.flush()?;
        Ok(())
    }
}
