//! Trait abstraction for the telemetry link to enable testing

use async_trait::async_trait;
use bytes::BytesMut;
use std::io;

/// Trait for inbound telemetry link I/O
#[async_trait]
pub trait TelemetryLink: Send {
    /// Read whatever bytes are available, appending them to `buf`.
    ///
    /// Returns 0 at end of stream.
    async fn read_chunk(&mut self, buf: &mut BytesMut) -> io::Result<usize>;
}

/// Wrapper around tokio_serial::SerialStream that implements TelemetryLink
pub struct SerialLink {
    port: tokio_serial::SerialStream,
}

impl SerialLink {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl TelemetryLink for SerialLink {
    async fn read_chunk(&mut self, buf: &mut BytesMut) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;
        self.port.read_buf(buf).await
    }
}
