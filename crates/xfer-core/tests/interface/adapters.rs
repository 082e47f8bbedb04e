//! 借用切片与拥有所有权缓冲之间的适配。

use std::sync::Arc;

use proptest::prelude::*;
use xfer_core::{
    HeapBufferProvider, Interface, IoBuffer, Status, XferError, XferOperations, deliver_as_iobuf,
    dispatch, ignore_seek,
};

use crate::support::{Event, IobufStage, Journal, RawStage};

#[test]
fn raw_delivery_reaches_buffer_native_peer_once() {
    let journal = Journal::default();
    let mut stage = IobufStage::new(&journal);
    stage.status = Err(XferError::stage("http.truncated", "short body"));
    let y = Interface::builder(stage).label("y").build();
    let x = Interface::builder(RawStage::new(&Journal::default()))
        .label("x")
        .plugged_to(&y)
        .build();

    let status = dispatch::deliver_raw(&x, b"abc");

    assert_eq!(status, Err(XferError::stage("http.truncated", "short body")));
    assert_eq!(journal.events(), vec![Event::Deliver(b"abc".to_vec())]);
}

#[test]
fn raw_delivery_reports_allocation_failure() {
    let journal = Journal::default();
    let y = Interface::builder(IobufStage::new(&journal))
        .buffer_provider(Arc::new(HeapBufferProvider::with_limit(16)))
        .build();
    let x = Interface::builder(RawStage::new(&Journal::default()))
        .plugged_to(&y)
        .build();

    let status = dispatch::deliver_raw(&x, &[0u8; 17]);

    assert_eq!(status, Err(XferError::NoMemory { requested: 17 }));
    assert_eq!(status.map_err(|err| err.code()), Err("xfer.no_memory"));
    assert!(journal.events().is_empty());
}

#[test]
fn buffer_delivery_reaches_raw_native_peer() {
    let journal = Journal::default();
    let y = Interface::new(RawStage::new(&journal));
    let x = Interface::builder(RawStage::new(&Journal::default()))
        .plugged_to(&y)
        .build();

    assert_eq!(dispatch::deliver(&x, IoBuffer::from_slice(b"xyz")), Ok(()));
    assert_eq!(journal.events(), vec![Event::DeliverRaw(b"xyz".to_vec())]);
}

#[test]
fn seek_on_stage_without_positioning_succeeds() {
    let journal = Journal::default();
    let y = Interface::new(IobufStage::new(&journal));
    let x = Interface::builder(RawStage::new(&Journal::default()))
        .plugged_to(&y)
        .build();

    assert_eq!(dispatch::seek(&x, 12345), Ok(()));
    assert_eq!(ignore_seek(&y, 12345), Ok(()));
    assert!(journal.events().is_empty());
}

/// 原生处理缓冲并原样转发给自己对端的中继。
struct Relay;

impl XferOperations for Relay {
    fn deliver(&self, xfer: &Interface, iobuf: IoBuffer) -> Status {
        dispatch::deliver(xfer, iobuf)
    }

    fn deliver_raw(&self, xfer: &Interface, data: &[u8]) -> Status {
        deliver_as_iobuf(xfer, data)
    }
}

proptest! {
    #[test]
    fn raw_to_iobuf_to_raw_is_byte_identical(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
        let journal = Journal::default();
        let end = Interface::new(RawStage::new(&journal));
        let relay = Interface::builder(Relay).plugged_to(&end).build();
        let source = Interface::builder(RawStage::new(&Journal::default()))
            .plugged_to(&relay)
            .build();

        prop_assert_eq!(dispatch::deliver_raw(&source, &payload), Ok(()));
        prop_assert_eq!(journal.events(), vec![Event::DeliverRaw(payload.clone())]);
    }
}
