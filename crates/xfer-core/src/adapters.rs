//! 能力表的辅助实现：两种数据报表示之间的适配器，以及只实现部分契约时使用的“忽略”桩。
//!
//! # 使用方式（How）
//! - 原生处理借用切片的阶段，把 `deliver` 委托给 [`deliver_as_raw`]；
//! - 原生处理拥有所有权缓冲的阶段，把 `deliver_raw` 委托给 [`deliver_as_iobuf`]；
//! - 两个适配器都回调**同一接口**能力表中的另一项操作，而不是对端的。

use crate::{
    buffer::IoBuffer,
    error::Status,
    interface::Interface,
    location::Location,
};

/// 忽略关闭通知。
pub fn ignore_close(_xfer: &Interface, _rc: Status) {}

/// 忽略重定向请求，并报告成功。
///
/// 以成功作答，使做“尽力而为”能力探测的调用方不会因为对端不支持重定向而受罚。
pub fn ignore_vredirect(_xfer: &Interface, _location: Location) -> Status {
    Ok(())
}

/// 忽略定位请求，并报告成功。
pub fn ignore_seek(_xfer: &Interface, _pos: u64) -> Status {
    Ok(())
}

/// 以借用切片的形式处理拥有所有权的数据报。
///
/// 取出缓冲内容交给 `xfer` 自己的 `deliver_raw`，随后释放缓冲；
/// 无论嵌套调用返回什么状态，缓冲都会被释放，返回值即嵌套调用的状态。
pub fn deliver_as_raw(xfer: &Interface, iobuf: IoBuffer) -> Status {
    let rc = xfer.operations().deliver_raw(xfer, iobuf.as_slice());
    drop(iobuf);
    rc
}

/// 以拥有所有权缓冲的形式处理借用切片。
///
/// 通过 `xfer` 的缓冲供货方分配 `data.len()` 字节，复制后交给 `xfer` 自己的 `deliver`。
/// 分配或写入失败时返回 [`XferError::NoMemory`](crate::XferError::NoMemory)，借用的数据原样留给调用方。
pub fn deliver_as_iobuf(xfer: &Interface, data: &[u8]) -> Status {
    let mut iobuf = xfer.alloc_iob(data.len())?;
    iobuf.put(data)?;
    xfer.operations().deliver(xfer, iobuf)
}
