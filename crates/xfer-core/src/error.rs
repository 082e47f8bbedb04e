//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 数据传输接口只有一条错误通道：每次分发返回的 [`Status`]。`Ok(())` 表示成功，
//!   `Err(XferError)` 标识失败原因；
//! - 状态值只向上传递一跳，分发层原样返回对端给出的结果，不做重试也不做本地恢复。
//!
//! ## 设计要求（What）
//! - 所有错误类型派生 `thiserror::Error`，兼容 `std::error::Error`；
//! - 每个变体都对应一个稳定错误码（见 [`codes`]），遵循 `<领域>.<语义>` 约定；
//! - `XferError` 可克隆、可比较，便于测试断言“状态被原样转发”。

use std::borrow::Cow;

use thiserror::Error;

/// 单次分发的返回状态。
///
/// `close` 也以 `Status` 作为关闭原因传递：`Ok(())` 表示正常结束。
pub type Status = Result<(), XferError>;

/// 数据传输层的稳定错误码。
pub mod codes {
    /// 无法为数据报分配缓冲。
    pub const XFER_NO_MEMORY: &str = "xfer.no_memory";
    /// 对端不支持所请求的操作。
    pub const XFER_NOT_SUPPORTED: &str = "xfer.not_supported";
    /// 对端拒绝了请求。
    pub const XFER_REJECTED: &str = "xfer.rejected";
    /// 协议阶段自定义的失败。
    pub const XFER_STAGE: &str = "xfer.stage";
}

/// 数据传输接口的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：为分发路径上的全部失败给出统一表示，使协议阶段可以直接用 `?` 传播；
/// - **契约 (What)**：
///   - `NoMemory` 是核心层唯一自行产生的错误（来自 `deliver_as_iobuf` 的缓冲分配）；
///   - 其余变体由协议阶段构造，核心层只负责原样转发；
/// - **设计权衡 (Trade-offs)**：`Stage` 变体以 `&'static str` 错误码加自由文本承载阶段细节，
///   避免核心层枚举随协议数量膨胀。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum XferError {
    /// 无法获得足够容量的缓冲。
    #[error("unable to allocate a {requested}-byte I/O buffer")]
    NoMemory { requested: usize },

    /// 对端不支持该操作。
    #[error("operation `{operation}` is not supported by this interface")]
    NotSupported { operation: &'static str },

    /// 对端拒绝或无法处理请求。
    #[error("request rejected: {reason}")]
    Rejected { reason: Cow<'static, str> },

    /// 协议阶段自定义失败，`code` 应遵循 `<领域>.<语义>` 命名。
    #[error("{code}: {message}")]
    Stage {
        code: &'static str,
        message: Cow<'static, str>,
    },
}

impl XferError {
    /// 构造拒绝类错误。
    pub fn rejected(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// 构造协议阶段自定义错误。
    pub fn stage(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Stage {
            code,
            message: message.into(),
        }
    }

    /// 返回稳定错误码。
    ///
    /// `Stage` 变体返回阶段自带的错误码，其余变体返回 [`codes`] 中的常量。
    pub fn code(&self) -> &'static str {
        match self {
            XferError::NoMemory { .. } => codes::XFER_NO_MEMORY,
            XferError::NotSupported { .. } => codes::XFER_NOT_SUPPORTED,
            XferError::Rejected { .. } => codes::XFER_REJECTED,
            XferError::Stage { code, .. } => code,
        }
    }
}
