//! 缓冲池配置。
//!
//! # 契约说明（What）
//! - 所有字段均有默认值，TOML 中缺省的键沿用 [`PoolConfig::default`]；
//! - 未知键视为配置错误，避免拼写错误被静默忽略；
//! - 解析后立即校验：各上限必须非零，且单块上限不得超过总预算。

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 单块缓冲默认上限：1 MiB。
pub const DEFAULT_MAX_BUFFER_LEN: usize = 1024 * 1024;
/// 同时租出的字节总预算默认值：16 MiB。
pub const DEFAULT_MAX_OUTSTANDING_BYTES: usize = 16 * 1024 * 1024;
/// 自由链表默认长度上限。
pub const DEFAULT_MAX_FREE_BUFFERS: usize = 64;

/// [`SlabBufferPool`](crate::SlabBufferPool) 的容量策略。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// 单次分配允许的最大字节数。
    pub max_buffer_len: usize,
    /// 同时处于租出状态的容量总和上限。
    pub max_outstanding_bytes: usize,
    /// 自由链表最多保留的缓冲数量，超出部分在回收时直接释放。
    pub max_free_buffers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_buffer_len: DEFAULT_MAX_BUFFER_LEN,
            max_outstanding_bytes: DEFAULT_MAX_OUTSTANDING_BYTES,
            max_free_buffers: DEFAULT_MAX_FREE_BUFFERS,
        }
    }
}

impl PoolConfig {
    /// 从 TOML 文本解析并校验配置。
    ///
    /// ```
    /// use xfer_buffer::PoolConfig;
    ///
    /// let config = PoolConfig::from_toml_str("max_buffer_len = 4096").unwrap();
    /// assert_eq!(config.max_buffer_len, 4096);
    /// assert_eq!(config.max_free_buffers, xfer_buffer::DEFAULT_MAX_FREE_BUFFERS);
    /// ```
    pub fn from_toml_str(raw: &str) -> Result<Self, PoolConfigError> {
        let config: PoolConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 校验字段之间的约束。
    pub fn validate(&self) -> Result<(), PoolConfigError> {
        if self.max_buffer_len == 0 {
            return Err(PoolConfigError::Zero {
                field: "max_buffer_len",
            });
        }
        if self.max_outstanding_bytes == 0 {
            return Err(PoolConfigError::Zero {
                field: "max_outstanding_bytes",
            });
        }
        if self.max_buffer_len > self.max_outstanding_bytes {
            return Err(PoolConfigError::BufferExceedsBudget {
                max_buffer_len: self.max_buffer_len,
                max_outstanding_bytes: self.max_outstanding_bytes,
            });
        }
        Ok(())
    }
}

/// 配置解析或校验失败。
#[derive(Debug, Error)]
pub enum PoolConfigError {
    #[error("malformed pool configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("`{field}` must be greater than zero")]
    Zero { field: &'static str },

    #[error(
        "`max_buffer_len` ({max_buffer_len}) exceeds `max_outstanding_bytes` ({max_outstanding_bytes})"
    )]
    BufferExceedsBudget {
        max_buffer_len: usize,
        max_outstanding_bytes: usize,
    },
}
