//! 接口的能力表。
//!
//! # 设计背景（Why）
//! - 每个协议阶段通过一个 [`Interface`] 暴露自己，接口收到的调用最终落到阶段实现的
//!   [`XferOperations`] 上；调用方只持有接口句柄，从不需要知道邻居的具体类型；
//! - 能力表必须完整：分发路径不检查“某项操作是否存在”。`close`、`vredirect`、`seek`
//!   的默认实现即 [`ignore_close`]、[`ignore_vredirect`]、[`ignore_seek`]，阶段只需覆盖自己关心的部分。
//!
//! # 契约说明（What）
//! - 每个方法的 `xfer` 参数是**接收调用的接口本身**（即能力表所属的接口），
//!   适配器据此回调同一能力表中的另一项操作；
//! - `deliver` 与 `deliver_raw` 没有默认实现：两者互为适配目标，若都默认互相转发将形成无限递归，
//!   因此实现者必须至少原生处理其中一种表示，另一种可直接委托给 [`deliver_as_raw`] 或 [`deliver_as_iobuf`]。
//!
//! # 风险提示（Trade-offs）
//! - 能力表要求 `Send + Sync + 'static`：空对象是进程级静态实例，接口因此需要可共享；
//!   在单线程协作模型下这只是类型层面的要求，不引入任何锁开销。
//!
//! [`Interface`]: crate::Interface
//! [`deliver_as_raw`]: crate::adapters::deliver_as_raw
//! [`deliver_as_iobuf`]: crate::adapters::deliver_as_iobuf
//! [`ignore_close`]: crate::adapters::ignore_close
//! [`ignore_vredirect`]: crate::adapters::ignore_vredirect
//! [`ignore_seek`]: crate::adapters::ignore_seek

use crate::{
    adapters,
    buffer::IoBuffer,
    error::Status,
    interface::Interface,
    location::Location,
};

/// 数据传输接口的五项操作。
pub trait XferOperations: Send + Sync + 'static {
    /// 对端关闭了连接，`rc` 为关闭原因。
    ///
    /// 关闭不可拒绝，也没有返回值。
    fn close(&self, xfer: &Interface, rc: Status) {
        adapters::ignore_close(xfer, rc)
    }

    /// 对端请求把底层传输改绑到 `location`。
    fn vredirect(&self, xfer: &Interface, location: Location) -> Status {
        adapters::ignore_vredirect(xfer, location)
    }

    /// 对端请求把逻辑读写位置移动到绝对偏移 `pos`。
    fn seek(&self, xfer: &Interface, pos: u64) -> Status {
        adapters::ignore_seek(xfer, pos)
    }

    /// 收到拥有所有权的数据报，无论返回什么状态都由本方负责释放。
    fn deliver(&self, xfer: &Interface, iobuf: IoBuffer) -> Status;

    /// 收到借用的数据报，不得在调用返回后保留 `data`。
    fn deliver_raw(&self, xfer: &Interface, data: &[u8]) -> Status;
}
