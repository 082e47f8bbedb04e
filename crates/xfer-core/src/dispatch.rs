//! 五个分发入口：`close`、`seek`、`vredirect`/`redirect`、`deliver`、`deliver_raw`。
//!
//! # 契约说明（What）
//! - 所有入口都是同步调用，在调用方栈上执行完毕，不挂起也不轮询；
//! - 每次调用都通过 [`Interface::dest`] 重新解析对端，然后调用对端能力表中的同名操作；
//! - 返回值即对端返回的状态，原样转发一跳，本层不重试、不恢复；
//! - `close` 没有返回值：关闭是无条件的，对端的关闭处理不能拒绝。

use std::fmt;

use crate::{
    buffer::IoBuffer,
    error::Status,
    interface::Interface,
    location::Location,
};

/// 关闭接口。
///
/// 把关闭原因 `rc` 转交给对端，然后拔出 `xfer`。无论对端的关闭处理做了什么
/// （包括把 `xfer` 重新插接到别处），返回时 `xfer` 的对端都是空对象，
/// 之后从 `xfer` 发出的调用只会落到空对象上。
pub fn close(xfer: &Interface, rc: Status) {
    let dest = xfer.dest();
    tracing::trace!(
        interface = %xfer.id(),
        dest = %dest.id(),
        reason = ?rc,
        "close"
    );
    dest.operations().close(&dest, rc);
    xfer.unplug();
}

/// 请求对端把逻辑读写位置移动到绝对偏移 `pos`。
///
/// 不支持定位的对端通过 `ignore_seek` 报告成功，属于尽力而为的契约。
pub fn seek(xfer: &Interface, pos: u64) -> Status {
    let dest = xfer.dest();
    tracing::trace!(interface = %xfer.id(), dest = %dest.id(), pos, "seek");
    dest.operations().seek(&dest, pos)
}

/// 请求对端把底层传输改绑到 `location`。
///
/// 返回 `Err` 表示对端拒绝或改绑失败，调用方应视会话保持原状；
/// 本函数从不改写 `xfer` 自身的绑定。
pub fn vredirect(xfer: &Interface, location: Location) -> Status {
    let dest = xfer.dest();
    tracing::trace!(
        interface = %xfer.id(),
        dest = %dest.id(),
        kind = ?location.kind(),
        location = %location,
        "redirect"
    );
    dest.operations().vredirect(&dest, location)
}

/// [`vredirect`] 的便捷形式，接受任何可转换为 [`Location`] 的值。
pub fn redirect(xfer: &Interface, location: impl Into<Location>) -> Status {
    vredirect(xfer, location.into())
}

/// 向下游投递拥有所有权的数据报。
///
/// 缓冲的所有权无条件转交给对端，与返回状态无关；调用方在语言层面无法再使用它：
///
/// ```compile_fail
/// use xfer_core::{IoBuffer, dispatch, null_xfer};
///
/// let iobuf = IoBuffer::from_slice(b"abc");
/// let _ = dispatch::deliver(null_xfer(), iobuf);
/// assert_eq!(iobuf.len(), 3);
/// ```
pub fn deliver(xfer: &Interface, iobuf: IoBuffer) -> Status {
    let dest = xfer.dest();
    tracing::trace!(
        interface = %xfer.id(),
        dest = %dest.id(),
        len = iobuf.len(),
        "deliver"
    );
    dest.operations().deliver(&dest, iobuf)
}

/// 向下游投递借用的数据报，对端不得在返回后保留 `data`。
pub fn deliver_raw(xfer: &Interface, data: &[u8]) -> Status {
    let dest = xfer.dest();
    tracing::trace!(
        interface = %xfer.id(),
        dest = %dest.id(),
        len = data.len(),
        "deliver_raw"
    );
    dest.operations().deliver_raw(&dest, data)
}

/// 格式化文本后以借用数据报的形式投递。
///
/// ```
/// use xfer_core::{dispatch, null_xfer};
///
/// let status = dispatch::deliver_fmt(null_xfer(), format_args!("GET {} HTTP/1.0\r\n", "/"));
/// assert_eq!(status, Ok(()));
/// ```
pub fn deliver_fmt(xfer: &Interface, args: fmt::Arguments<'_>) -> Status {
    match args.as_str() {
        Some(text) => deliver_raw(xfer, text.as_bytes()),
        None => deliver_raw(xfer, fmt::format(args).as_bytes()),
    }
}
