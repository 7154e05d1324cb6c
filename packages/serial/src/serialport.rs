use crate::binding::SerialBinding;
use crate::error::*;
use crate::frame::RawSerialFrame;
use bytes::BytesMut;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_serial::{SerialPortBuilderExt, SerialStream};
use tokio_util::codec::{Decoder, Encoder, Framed};

pub struct SerialPort {
    writer: SplitSink<Framed<SerialStream, SerialFrameCodec>, RawSerialFrame>,
    reader: SplitStream<Framed<SerialStream, SerialFrameCodec>>,
}

impl SerialPort {
    pub fn new(path: &str) -> Result<Self> {
        #[allow(unused_mut)]
        let mut port = tokio_serial::new(path, 115_200).open_native_async()?;

        #[cfg(unix)]
        port.set_exclusive(false)?;

        let (writer, reader) = SerialFrameCodec.framed(port).split();
        Ok(Self { writer, reader })
    }
}

impl SerialBinding for SerialPort {
    async fn write(&mut self, frame: RawSerialFrame) -> Result<()> {
        self.writer.send(frame).await?;
        Ok(())
    }

    async fn read(&mut self) -> Option<RawSerialFrame> {
        match self.reader.next().await {
            Some(Ok(frame)) => Some(frame),
            _ => None,
        }
    }
}

/// Serial-over-TCP, e.g. a `ser2net` bridge in raw mode
pub struct TcpSocket {
    writer: SplitSink<Framed<TcpStream, SerialFrameCodec>, RawSerialFrame>,
    reader: SplitStream<Framed<TcpStream, SerialFrameCodec>>,
}

impl TcpSocket {
    pub fn new(addr: &str) -> Result<Self> {
        let stream = std::net::TcpStream::connect(addr)?;
        stream.set_nonblocking(true)?;
        let stream = TcpStream::from_std(stream)?;

        let (writer, reader) = SerialFrameCodec.framed(stream).split();
        Ok(Self { writer, reader })
    }
}

impl SerialBinding for TcpSocket {
    async fn write(&mut self, frame: RawSerialFrame) -> Result<()> {
        self.writer.send(frame).await?;
        Ok(())
    }

    async fn read(&mut self) -> Option<RawSerialFrame> {
        match self.reader.next().await {
            Some(Ok(frame)) => Some(frame),
            _ => None,
        }
    }
}

struct SerialFrameCodec;

impl Decoder for SerialFrameCodec {
    type Item = RawSerialFrame;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> std::result::Result<Option<Self::Item>, Self::Error> {
        // `parse_mut` returns None until a full frame has been buffered
        Ok(RawSerialFrame::parse_mut(src))
    }
}

impl Encoder<RawSerialFrame> for SerialFrameCodec {
    type Error = std::io::Error;

    fn encode(
        &mut self,
        item: RawSerialFrame,
        dst: &mut BytesMut,
    ) -> std::result::Result<(), Self::Error> {
        item.serialize(dst);
        Ok(())
    }
}
