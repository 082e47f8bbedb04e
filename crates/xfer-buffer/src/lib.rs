#![deny(unsafe_code)]

//! `xfer-buffer` 为 `xfer-core` 的数据传输接口提供池化缓冲供货方。
//!
//! # 模块定位（Why）
//! - `xfer-core` 只规定 [`BufferProvider`](xfer_core::BufferProvider) 契约与默认的堆供货方，
//!   本 crate 落地一个可复用存储、受预算约束的实现；
//! - 接口通过 `Interface::builder(..).buffer_provider(..)` 注入池，
//!   `deliver_as_iobuf` 等适配路径随即从池中取缓冲。
//!
//! # 设计概要（How）
//! - `pool` 模块实现 [`SlabBufferPool`]，以自由链表复用 `BytesMut`，以原子计数约束租出总量；
//! - `config` 模块定义 [`PoolConfig`]，可从 TOML 片段加载并校验。

mod config;
mod pool;

pub use config::{
    DEFAULT_MAX_BUFFER_LEN, DEFAULT_MAX_FREE_BUFFERS, DEFAULT_MAX_OUTSTANDING_BYTES, PoolConfig,
    PoolConfigError,
};
pub use pool::{PoolStats, SlabBufferPool};
