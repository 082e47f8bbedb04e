//! 数据传输接口的集成测试入口。
//!
//! # 结构概览（What）
//! - `lifecycle`：插接、关闭与重入关闭，空对象自环；
//! - `adapters`：两种数据报表示之间的适配与往返性质；
//! - `redirect`：重定向的转发与拒绝；
//! - `ownership`：`deliver` 转移缓冲所有权；
//! - `filter`：过滤器串联与级联关闭；
//! - `support`：各测试共享的记录型阶段。

mod adapters;
mod filter;
mod ownership;
mod redirect;
mod support;
