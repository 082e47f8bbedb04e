//! `deliver` 无条件转移缓冲所有权。

use std::sync::{Arc, Mutex};

use bytes::BytesMut;
use xfer_core::{BufferRecycler, Interface, IoBuffer, ReclaimedBuffer, XferError, dispatch};

use crate::support::{IobufStage, Journal, RawStage};

#[derive(Default)]
struct DropProbe {
    reclaimed: Mutex<Vec<usize>>,
}

impl BufferRecycler for DropProbe {
    fn reclaim(&self, buffer: ReclaimedBuffer) {
        self.reclaimed
            .lock()
            .expect("probe poisoned")
            .push(buffer.leased());
    }
}

fn leased_buffer(probe: &Arc<DropProbe>, payload: &[u8]) -> IoBuffer {
    let recycler: Arc<dyn BufferRecycler> = probe.clone();
    let mut iobuf = IoBuffer::with_recycler(BytesMut::with_capacity(32), recycler);
    iobuf.put(payload).expect("within lease");
    iobuf
}

#[test]
fn buffer_is_released_when_peer_fails() {
    let probe = Arc::new(DropProbe::default());
    let mut stage = IobufStage::new(&Journal::default());
    stage.status = Err(XferError::rejected("disk full"));
    let peer = Interface::new(stage);
    let caller = Interface::builder(RawStage::new(&Journal::default()))
        .plugged_to(&peer)
        .build();

    let status = dispatch::deliver(&caller, leased_buffer(&probe, b"payload"));

    assert_eq!(status, Err(XferError::rejected("disk full")));
    assert_eq!(probe.reclaimed.lock().expect("probe poisoned").len(), 1);
}

#[test]
fn buffer_is_released_by_null_object() {
    let probe = Arc::new(DropProbe::default());
    let caller = Interface::new(RawStage::new(&Journal::default()));

    assert_eq!(dispatch::deliver(&caller, leased_buffer(&probe, b"void")), Ok(()));
    assert_eq!(probe.reclaimed.lock().expect("probe poisoned").len(), 1);
}

#[test]
fn buffer_is_released_after_raw_adaptation() {
    let probe = Arc::new(DropProbe::default());
    let journal = Journal::default();
    let peer = Interface::new(RawStage::new(&journal));
    let caller = Interface::builder(RawStage::new(&Journal::default()))
        .plugged_to(&peer)
        .build();

    assert_eq!(dispatch::deliver(&caller, leased_buffer(&probe, b"abc")), Ok(()));
    assert_eq!(journal.payload(), b"abc");
    let reclaimed = probe.reclaimed.lock().expect("probe poisoned");
    assert_eq!(reclaimed.len(), 1);
    assert!(reclaimed[0] >= 32);
}
