//! 演示：模拟套接字 → 直通过滤器 → 行收集器。
//!
//! 运行 `RUST_LOG=xfer_core=trace cargo run -p xfer-core --example chain` 可观察每次分发与插接。

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};
use xfer_core::{
    FilterPair, Interface, IoBuffer, Location, Status, XferError, XferOperations, adapters,
    dispatch, plug_plug,
};

/// 按行切分收到的字节流。
#[derive(Default)]
struct LineCollector {
    pending: Mutex<Vec<u8>>,
    lines: Arc<Mutex<Vec<String>>>,
}

impl XferOperations for LineCollector {
    fn close(&self, xfer: &Interface, rc: Status) {
        tracing::info!(interface = %xfer.id(), reason = ?rc, "collector closed");
    }

    fn vredirect(&self, xfer: &Interface, location: Location) -> Status {
        tracing::info!(interface = %xfer.id(), %location, "collector asked to redirect");
        Err(XferError::NotSupported {
            operation: "redirect",
        })
    }

    fn deliver(&self, xfer: &Interface, iobuf: IoBuffer) -> Status {
        adapters::deliver_as_raw(xfer, iobuf)
    }

    fn deliver_raw(&self, _xfer: &Interface, data: &[u8]) -> Status {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| XferError::rejected("collector state poisoned"))?;
        pending.extend_from_slice(data);
        let mut lines = self
            .lines
            .lock()
            .map_err(|_| XferError::rejected("collector state poisoned"))?;
        while let Some(end) = pending.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = pending.drain(..=end).collect();
            lines.push(String::from_utf8_lossy(&line).trim_end().to_owned());
        }
        Ok(())
    }
}

/// 套接字一侧：只接受关闭通知。
struct Socket;

impl XferOperations for Socket {
    fn close(&self, xfer: &Interface, rc: Status) {
        tracing::info!(interface = %xfer.id(), reason = ?rc, "socket closed by peer");
    }

    fn deliver(&self, xfer: &Interface, iobuf: IoBuffer) -> Status {
        adapters::deliver_as_raw(xfer, iobuf)
    }

    fn deliver_raw(&self, _xfer: &Interface, _data: &[u8]) -> Status {
        Ok(())
    }
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let collector = LineCollector::default();
    let lines = Arc::clone(&collector.lines);
    let collector = Interface::builder(collector).label("collector").build();
    let socket = Interface::builder(Socket).label("socket").build();
    let filter = FilterPair::new("log");

    plug_plug(&socket, filter.upstream());
    plug_plug(filter.downstream(), &collector);

    dispatch::deliver_raw(&socket, b"HTTP/1.0 200 OK\r\nContent-")
        .context("delivering status line")?;
    dispatch::deliver_fmt(&socket, format_args!("Length: {}\r\n\r\n", 5))
        .context("delivering headers")?;
    dispatch::deliver(&socket, IoBuffer::from_slice(b"hello\n"))
        .context("delivering body")?;

    if let Err(err) = dispatch::redirect(&socket, Location::uri("http://mirror.example/boot")) {
        tracing::warn!(code = err.code(), error = %err, "redirect refused");
    }

    dispatch::close(&socket, Ok(()));
    dispatch::close(&collector, Ok(()));

    let lines = lines
        .lock()
        .map_err(|_| anyhow::anyhow!("collector state poisoned"))?;
    for line in lines.iter() {
        println!("{line}");
    }
    Ok(())
}
