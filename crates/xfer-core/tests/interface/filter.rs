//! 过滤器串联与级联关闭。

use std::sync::Arc;

use xfer_core::{FilterPair, Interface, Location, XferError, dispatch, plug_plug};

use crate::support::{Event, IobufStage, Journal, RawStage};

fn chain(
    source_journal: &Journal,
    sink_journal: &Journal,
) -> (Arc<Interface>, FilterPair, Arc<Interface>) {
    let filter = FilterPair::new("passthrough");
    let source = Interface::builder(RawStage::new(source_journal))
        .label("source")
        .build();
    let sink = Interface::builder(IobufStage::new(sink_journal))
        .label("sink")
        .build();
    plug_plug(&source, filter.upstream());
    plug_plug(filter.downstream(), &sink);
    (source, filter, sink)
}

#[test]
fn data_and_requests_flow_through_filter() {
    let sink_journal = Journal::default();
    let (source, _filter, _sink) = chain(&Journal::default(), &sink_journal);

    assert_eq!(dispatch::deliver_raw(&source, b"GET / "), Ok(()));
    assert_eq!(
        dispatch::deliver_fmt(&source, format_args!("HTTP/1.{}\r\n", 0)),
        Ok(())
    );
    assert_eq!(
        dispatch::redirect(&source, Location::uri("http://mirror/")),
        Ok(())
    );

    assert_eq!(sink_journal.payload(), b"GET / HTTP/1.0\r\n");
    assert!(
        sink_journal
            .events()
            .contains(&Event::Redirect(Location::uri("http://mirror/")))
    );
}

#[test]
fn sink_status_is_forwarded_back_through_filter() {
    let sink_journal = Journal::default();
    let filter = FilterPair::new("strict");
    let mut stage = IobufStage::new(&sink_journal);
    stage.status = Err(XferError::NotSupported { operation: "deliver" });
    let sink = Interface::new(stage);
    filter.downstream().plug(&sink);
    let source = Interface::builder(RawStage::new(&Journal::default()))
        .plugged_to(filter.upstream())
        .build();

    assert_eq!(
        dispatch::deliver_raw(&source, b"x"),
        Err(XferError::NotSupported { operation: "deliver" })
    );
}

#[test]
fn closing_source_tears_down_whole_chain() {
    let source_journal = Journal::default();
    let sink_journal = Journal::default();
    let (source, filter, sink) = chain(&source_journal, &sink_journal);

    dispatch::close(&source, Err(XferError::rejected("link down")));

    assert_eq!(
        sink_journal.events(),
        vec![Event::Close(Err(XferError::rejected("link down")))]
    );
    assert!(source_journal.events().is_empty());
    assert!(filter.upstream().is_nullified());
    assert!(filter.downstream().is_nullified());
    assert!(!source.is_plugged());
    assert!(!filter.upstream().is_plugged());
    assert!(!filter.downstream().is_plugged());

    // sink 仍插接在下游半边上，由 sink 自己在拆除时关闭。
    assert!(sink.is_plugged());
    dispatch::close(&sink, Ok(()));
    assert!(!sink.is_plugged());
    assert_eq!(Arc::strong_count(filter.downstream()), 1);
}
