#![deny(unsafe_code)]

//! `xfer-core` 提供协议阶段之间的数据传输接口。
//!
//! # 模块定位（Why）
//! - 网络引导栈由若干阶段串联而成：套接字、协议解析器、下载缓冲等，每个阶段都需要把数据、
//!   关闭通知、重定向与定位请求交给邻居，却不应关心邻居的具体类型；
//! - 本 crate 只定义这一层连接面：接口句柄、插接生命周期、分发入口、空对象与表示适配器，
//!   具体阶段（TCP、HTTP、TFTP……）在各自的 crate 中实现 [`XferOperations`]。
//!
//! # 设计概要（How）
//! - [`Interface`] 以 `Arc` 共享，对端绑定存放在无锁槽位中，分发时逐次解析；
//! - 未插接的接口隐式指向进程级 [`null_xfer`]，它静默吸收一切调用，使分发路径无需判空；
//! - 数据报有两种表示：拥有所有权的 [`IoBuffer`] 与借用的 `&[u8]`，
//!   [`adapters`] 提供两者之间的适配器，阶段只需原生处理其中一种；
//! - 所有失败以 [`XferError`] 表达，并附带 `xfer.<reason>` 形式的稳定错误码。
//!
//! # 使用示例
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use xfer_core::{Interface, IoBuffer, Status, XferOperations, adapters, dispatch};
//!
//! #[derive(Default)]
//! struct Collect(Arc<Mutex<Vec<u8>>>);
//!
//! impl XferOperations for Collect {
//!     fn deliver(&self, xfer: &Interface, iobuf: IoBuffer) -> Status {
//!         adapters::deliver_as_raw(xfer, iobuf)
//!     }
//!
//!     fn deliver_raw(&self, _xfer: &Interface, data: &[u8]) -> Status {
//!         self.0.lock().unwrap().extend_from_slice(data);
//!         Ok(())
//!     }
//! }
//!
//! let sink = Collect::default();
//! let received = sink.0.clone();
//! let sink = Interface::builder(sink).label("sink").build();
//! let source = Interface::builder(Collect::default()).plugged_to(&sink).build();
//!
//! dispatch::deliver(&source, IoBuffer::from_slice(b"hello")).unwrap();
//! dispatch::close(&source, Ok(()));
//!
//! assert_eq!(&*received.lock().unwrap(), b"hello");
//! assert!(!source.is_plugged());
//! ```

pub mod adapters;
mod buffer;
pub mod dispatch;
mod error;
mod filter;
mod interface;
mod location;
mod null;
mod operations;

pub use adapters::{
    deliver_as_iobuf, deliver_as_raw, ignore_close, ignore_seek, ignore_vredirect,
};
pub use buffer::{
    BufferProvider, BufferRecycler, DEFAULT_HEAP_LIMIT, HeapBufferProvider, IoBuffer,
    ReclaimedBuffer,
};
pub use error::{Status, XferError, codes};
pub use filter::FilterPair;
pub use interface::{Interface, InterfaceBuilder, InterfaceId, plug_plug};
pub use location::{Location, LocationKind, SocketSemantics};
pub use null::{DiscardCause, NullOperations, ignore_deliver_raw, null_xfer};
pub use operations::XferOperations;
