//! 记录型测试阶段。

use std::sync::{Arc, Mutex};

use xfer_core::{
    Interface, IoBuffer, Location, Status, XferOperations, adapters, deliver_as_iobuf,
    deliver_as_raw,
};

/// 阶段观察到的一次调用。
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    Close(Status),
    Redirect(Location),
    Seek(u64),
    Deliver(Vec<u8>),
    DeliverRaw(Vec<u8>),
}

/// 共享的事件日志。
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Event>>>);

impl Journal {
    pub fn push(&self, event: Event) {
        self.0.lock().expect("journal poisoned").push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().expect("journal poisoned").clone()
    }

    pub fn payload(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Deliver(data) | Event::DeliverRaw(data) => Some(data),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

/// 原生处理借用切片的阶段。
pub struct RawStage {
    pub journal: Journal,
    pub status: Status,
}

impl RawStage {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            status: Ok(()),
        }
    }
}

impl XferOperations for RawStage {
    fn close(&self, _xfer: &Interface, rc: Status) {
        self.journal.push(Event::Close(rc));
    }

    fn seek(&self, _xfer: &Interface, pos: u64) -> Status {
        self.journal.push(Event::Seek(pos));
        Ok(())
    }

    fn deliver(&self, xfer: &Interface, iobuf: IoBuffer) -> Status {
        deliver_as_raw(xfer, iobuf)
    }

    fn deliver_raw(&self, _xfer: &Interface, data: &[u8]) -> Status {
        self.journal.push(Event::DeliverRaw(data.to_vec()));
        self.status.clone()
    }
}

/// 原生处理拥有所有权缓冲的阶段。
pub struct IobufStage {
    pub journal: Journal,
    pub status: Status,
}

impl IobufStage {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            status: Ok(()),
        }
    }
}

impl XferOperations for IobufStage {
    fn close(&self, xfer: &Interface, rc: Status) {
        adapters::ignore_close(xfer, rc.clone());
        self.journal.push(Event::Close(rc));
    }

    fn vredirect(&self, _xfer: &Interface, location: Location) -> Status {
        self.journal.push(Event::Redirect(location));
        self.status.clone()
    }

    fn deliver(&self, _xfer: &Interface, iobuf: IoBuffer) -> Status {
        self.journal.push(Event::Deliver(iobuf.as_slice().to_vec()));
        self.status.clone()
    }

    fn deliver_raw(&self, xfer: &Interface, data: &[u8]) -> Status {
        deliver_as_iobuf(xfer, data)
    }
}
