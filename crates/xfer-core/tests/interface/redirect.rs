//! 重定向请求的转发与拒绝。

use std::net::SocketAddr;

use xfer_core::{Interface, Location, LocationKind, XferError, dispatch};

use crate::support::{Event, IobufStage, Journal, RawStage};

#[test]
fn accepted_redirect_reaches_peer_with_location() {
    let journal = Journal::default();
    let peer = Interface::new(IobufStage::new(&journal));
    let caller = Interface::builder(RawStage::new(&Journal::default()))
        .plugged_to(&peer)
        .build();

    let addr: SocketAddr = "192.0.2.7:69".parse().expect("valid address");
    assert_eq!(dispatch::redirect(&caller, addr), Ok(()));
    assert_eq!(
        dispatch::redirect(&caller, Location::uri("http://boot/next")),
        Ok(())
    );

    let events = journal.events();
    assert_eq!(events.len(), 2);
    assert!(matches!(
        &events[0],
        Event::Redirect(location) if location.kind() == LocationKind::Socket
    ));
    assert_eq!(events[1], Event::Redirect(Location::uri("http://boot/next")));
}

#[test]
fn rejected_redirect_leaves_peer_unchanged() {
    let journal = Journal::default();
    let mut stage = IobufStage::new(&journal);
    stage.status = Err(XferError::rejected("unsupported scheme"));
    let peer = Interface::builder(stage).label("strict").build();
    let caller = Interface::builder(RawStage::new(&Journal::default()))
        .plugged_to(&peer)
        .build();

    let status = dispatch::redirect(&caller, Location::uri("gopher://elsewhere/"));

    assert_eq!(status, Err(XferError::rejected("unsupported scheme")));
    assert!(caller.is_plugged());
    assert_eq!(caller.dest().id(), peer.id());
}

#[test]
fn redirect_to_unplugged_interface_is_absorbed() {
    let caller = Interface::new(RawStage::new(&Journal::default()));
    assert_eq!(
        dispatch::redirect(&caller, Location::resource("/boot/pxelinux.0")),
        Ok(())
    );
    assert!(!caller.is_plugged());
}
