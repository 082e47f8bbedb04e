//! 直通过滤器：由两个互为出口的接口组成的阶段。
//!
//! # 设计背景（Why）
//! - 许多阶段只在数据流经时观察或改写数据，本身不是端点。过滤器提供这类阶段的骨架：
//!   上游插接 [`FilterPair::upstream`]，下游插接 [`FilterPair::downstream`]，
//!   任一半收到的调用都从另一半发出；
//! - 关闭时两半先被 nullify，再关闭另一半。另一侧的对端若回头关闭过滤器，
//!   调用只会落到空能力表上，不会在两半之间来回递归。
//!
//! # 契约说明（What）
//! - 两半以 `Weak` 互相引用，过滤器的存活由持有者（通常是插接在两半上的邻居）决定；
//! - 另一半已被释放时，转发退化为发往空对象。

use std::{
    borrow::Cow,
    sync::{Arc, OnceLock, Weak},
};

use crate::{
    buffer::IoBuffer,
    dispatch,
    error::Status,
    interface::Interface,
    location::Location,
    null::null_xfer,
    operations::XferOperations,
};

/// 一对直通接口。
#[derive(Clone, Debug)]
pub struct FilterPair {
    upstream: Arc<Interface>,
    downstream: Arc<Interface>,
}

impl FilterPair {
    /// 创建过滤器，两半的诊断名称分别为 `<label>.up` 与 `<label>.down`。
    pub fn new(label: impl Into<Cow<'static, str>>) -> Self {
        let label = label.into();
        let up_peer = Arc::new(OnceLock::new());
        let down_peer = Arc::new(OnceLock::new());

        let upstream = Interface::builder(FilterHalf {
            other: Arc::clone(&up_peer),
        })
        .label(format!("{label}.up"))
        .build();
        let downstream = Interface::builder(FilterHalf {
            other: Arc::clone(&down_peer),
        })
        .label(format!("{label}.down"))
        .build();

        let bound = up_peer.set(Arc::downgrade(&downstream)).is_ok()
            && down_peer.set(Arc::downgrade(&upstream)).is_ok();
        debug_assert!(bound, "filter halves are bound exactly once");

        tracing::trace!(
            upstream = %upstream.id(),
            downstream = %downstream.id(),
            label = %label,
            "filter created"
        );
        Self {
            upstream,
            downstream,
        }
    }

    /// 面向数据来源一侧的接口。
    pub fn upstream(&self) -> &Arc<Interface> {
        &self.upstream
    }

    /// 面向数据去向一侧的接口。
    pub fn downstream(&self) -> &Arc<Interface> {
        &self.downstream
    }
}

struct FilterHalf {
    other: Arc<OnceLock<Weak<Interface>>>,
}

impl FilterHalf {
    fn other(&self) -> Arc<Interface> {
        self.other
            .get()
            .and_then(Weak::upgrade)
            .unwrap_or_else(|| Arc::clone(null_xfer()))
    }
}

impl XferOperations for FilterHalf {
    fn close(&self, xfer: &Interface, rc: Status) {
        let other = self.other();
        xfer.nullify();
        other.nullify();
        dispatch::close(&other, rc);
        xfer.unplug();
    }

    fn vredirect(&self, _xfer: &Interface, location: Location) -> Status {
        dispatch::vredirect(&self.other(), location)
    }

    fn seek(&self, _xfer: &Interface, pos: u64) -> Status {
        dispatch::seek(&self.other(), pos)
    }

    fn deliver(&self, _xfer: &Interface, iobuf: IoBuffer) -> Status {
        dispatch::deliver(&self.other(), iobuf)
    }

    fn deliver_raw(&self, _xfer: &Interface, data: &[u8]) -> Status {
        dispatch::deliver_raw(&self.other(), data)
    }
}
