//! 空对象：所有未插接接口的隐含对端。
//!
//! # 设计背景（Why）
//! - 未插接的状态以“对端是空对象”表示，而不是“没有对端”，分发路径因此不需要任何空值判断；
//! - 空对象静默吸收一切调用：`close` 无事可做，`seek`/`vredirect` 立即报告成功，
//!   `deliver` 降级为 `deliver_raw`，`deliver_raw` 只记录一条诊断。
//!
//! # 契约说明（What）
//! - 进程级单例，首次使用时构造，此后地址稳定、永不拆除；
//! - 它的对端指向自己（自环），对它的任意重复分发都在自身终止，且不会改写这条自环；
//! - 诊断区分 “before connection” 与 “after termination”：前者表示数据在插接前就发往了空对象，
//!   后者表示数据发往了一个已被 [`nullify`](crate::Interface::nullify) 的接口。两者行为完全相同，仅文案不同。

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use crate::{
    adapters,
    buffer::IoBuffer,
    error::Status,
    interface::Interface,
    location::Location,
    operations::XferOperations,
};

static NULL_XFER: OnceLock<Arc<Interface>> = OnceLock::new();

/// 被 nullify 的接口共享的能力表。
pub(crate) static NULL_OPERATIONS: NullOperations = NullOperations;

/// 返回进程级空对象。
pub fn null_xfer() -> &'static Arc<Interface> {
    NULL_XFER.get_or_init(|| Arc::new(Interface::null_object()))
}

/// 数据被丢弃的原因，仅用于诊断文案。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DiscardCause {
    /// 数据直接发往了空对象，发送方尚未插接。
    BeforeConnection,
    /// 数据发往了一个已经终止并 nullify 的接口。
    AfterTermination,
}

impl DiscardCause {
    pub fn of(xfer: &Interface) -> Self {
        if xfer.is_null() {
            DiscardCause::BeforeConnection
        } else {
            DiscardCause::AfterTermination
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiscardCause::BeforeConnection => "before connection",
            DiscardCause::AfterTermination => "after termination",
        }
    }
}

impl fmt::Display for DiscardCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 丢弃借用数据报并记录一条诊断。
pub fn ignore_deliver_raw(xfer: &Interface, data: &[u8]) -> Status {
    let cause = DiscardCause::of(xfer);
    tracing::debug!(
        interface = %xfer.id(),
        label = xfer.label(),
        bytes = data.len(),
        cause = cause.as_str(),
        "{} bytes delivered {}",
        data.len(),
        cause
    );
    Ok(())
}

/// 空对象的能力表。
#[derive(Clone, Copy, Debug, Default)]
pub struct NullOperations;

impl XferOperations for NullOperations {
    fn close(&self, xfer: &Interface, rc: Status) {
        adapters::ignore_close(xfer, rc)
    }

    fn vredirect(&self, xfer: &Interface, location: Location) -> Status {
        adapters::ignore_vredirect(xfer, location)
    }

    fn seek(&self, xfer: &Interface, pos: u64) -> Status {
        adapters::ignore_seek(xfer, pos)
    }

    fn deliver(&self, xfer: &Interface, iobuf: IoBuffer) -> Status {
        adapters::deliver_as_raw(xfer, iobuf)
    }

    fn deliver_raw(&self, xfer: &Interface, data: &[u8]) -> Status {
        ignore_deliver_raw(xfer, data)
    }
}
