use std::sync::{
    Arc,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};

use bytes::BytesMut;
use spin::Mutex;
use xfer_core::{BufferProvider, BufferRecycler, IoBuffer, ReclaimedBuffer, XferError};

use crate::config::PoolConfig;

/// `SlabBufferPool` 是基于自由链表的 [`BufferProvider`]，带单块上限与总量预算。
///
/// # 模块角色（Why）
/// - 引导阶段的数据报大小高度重复（TFTP 块、HTTP 分片），复用 `BytesMut` 能显著减少堆分配；
/// - 固件环境内存紧张，总预算让失控的阶段以 `NoMemory` 失败，而不是拖垮整个进程。
///
/// # 核心机制（How）
/// - `spin::Mutex<Vec<BytesMut>>` 作为自由链表，分配时优先取容量足够的块；
/// - 租出容量以原子计数登记，分配前按实际容量预留，预留失败即拒绝；
/// - 租出的缓冲写满后扩容，须先经 [`BufferRecycler::extend_lease`] 预留增量，超出上限即拒绝；
/// - 缓冲 `Drop` 时经 [`BufferRecycler`] 归还预算，存储在链表未满时放回复用。
///
/// # 契约说明（What）
/// - `alloc(len)` 在 `len > max_buffer_len` 或预算不足时返回 [`XferError::NoMemory`]；
/// - 任何时刻租出的实际容量总和都不超过 `max_outstanding_bytes`，写入导致的扩容同样计入；
/// - 每个租出的缓冲恰好归还一次预算，与是否被冻结无关；
/// - 克隆得到的句柄共享同一个池。
#[derive(Clone)]
pub struct SlabBufferPool {
    inner: Arc<PoolInner>,
}

impl Default for SlabBufferPool {
    fn default() -> Self {
        Self::with_config(PoolConfig::default())
    }
}

impl SlabBufferPool {
    /// 以默认配置创建空池。
    pub fn new() -> Self {
        Self::default()
    }

    /// 以指定配置创建空池，调用方应事先通过 [`PoolConfig::validate`] 校验配置。
    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            inner: Arc::new(PoolInner::new(config)),
        }
    }

    /// 创建时使用的配置。
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// 当前统计快照。
    pub fn statistics(&self) -> PoolStats {
        self.inner.snapshot()
    }

    /// 清空自由链表，返回释放的字节数。
    pub fn shrink_to_fit(&self) -> usize {
        self.inner.shrink_free_list()
    }
}

impl BufferProvider for SlabBufferPool {
    fn alloc(&self, len: usize) -> Result<IoBuffer, XferError> {
        let raw = self.inner.acquire_buffer(len)?;
        let recycler: Arc<dyn BufferRecycler> = self.inner.clone();
        Ok(IoBuffer::with_recycler(raw, recycler))
    }
}

/// 缓冲池统计快照。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PoolStats {
    /// 在堆上新分配的缓冲数量（不含复用）。
    pub allocated: u64,
    /// 从自由链表复用的次数。
    pub reused: u64,
    /// 当前租出的容量总和。
    pub outstanding_bytes: usize,
    /// 自由链表中的缓冲数量。
    pub free_buffers: usize,
    /// 因上限或预算被拒绝的分配次数。
    pub failed: u64,
}

struct PoolInner {
    config: PoolConfig,
    free_list: Mutex<Vec<BytesMut>>,
    metrics: PoolMetrics,
}

impl PoolInner {
    fn new(config: PoolConfig) -> Self {
        Self {
            config,
            free_list: Mutex::new(Vec::new()),
            metrics: PoolMetrics::default(),
        }
    }

    /// 从自由链表或堆上获取一个满足容量且在预算之内的 `BytesMut`。
    fn acquire_buffer(&self, len: usize) -> Result<BytesMut, XferError> {
        if len > self.config.max_buffer_len {
            return Err(self.reject(len, "exceeds per-buffer limit"));
        }

        let reused = {
            let mut list = self.free_list.lock();
            match list.iter().position(|buf| buf.capacity() >= len) {
                Some(index) if self.metrics.reserve(list[index].capacity(), &self.config) => {
                    Some(list.swap_remove(index))
                }
                _ => None,
            }
        };

        let mut buffer = match reused {
            Some(buf) => {
                self.metrics.reused.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                let buf = BytesMut::with_capacity(len);
                if !self.metrics.reserve(buf.capacity(), &self.config) {
                    return Err(self.reject(len, "outstanding budget exhausted"));
                }
                self.metrics.allocated.fetch_add(1, Ordering::Relaxed);
                buf
            }
        };
        buffer.clear();
        Ok(buffer)
    }

    fn reject(&self, len: usize, cause: &'static str) -> XferError {
        self.metrics.failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            requested = len,
            outstanding = self.metrics.outstanding_bytes.load(Ordering::Relaxed),
            max_buffer_len = self.config.max_buffer_len,
            max_outstanding_bytes = self.config.max_outstanding_bytes,
            cause,
            "buffer pool rejected allocation"
        );
        XferError::NoMemory { requested: len }
    }

    fn shrink_free_list(&self) -> usize {
        let mut list = self.free_list.lock();
        let released: usize = list.iter().map(BytesMut::capacity).sum();
        list.clear();
        released
    }

    fn snapshot(&self) -> PoolStats {
        PoolStats {
            allocated: self.metrics.allocated.load(Ordering::Relaxed),
            reused: self.metrics.reused.load(Ordering::Relaxed),
            outstanding_bytes: self.metrics.outstanding_bytes.load(Ordering::Relaxed),
            free_buffers: self.free_list.lock().len(),
            failed: self.metrics.failed.load(Ordering::Relaxed),
        }
    }
}

impl BufferRecycler for PoolInner {
    fn extend_lease(&self, leased: usize, capacity: usize) -> Result<(), XferError> {
        if capacity > self.config.max_buffer_len {
            return Err(self.reject(capacity, "exceeds per-buffer limit"));
        }
        if !self
            .metrics
            .reserve(capacity.saturating_sub(leased), &self.config)
        {
            return Err(self.reject(capacity, "outstanding budget exhausted"));
        }
        Ok(())
    }

    fn reclaim(&self, reclaimed: ReclaimedBuffer) {
        self.metrics.release(reclaimed.leased());
        if let Some(mut buf) = reclaimed.into_buffer() {
            if buf.capacity() > self.config.max_buffer_len {
                return;
            }
            let mut list = self.free_list.lock();
            if list.len() < self.config.max_free_buffers {
                buf.clear();
                list.push(buf);
            }
        }
    }
}

#[derive(Default)]
struct PoolMetrics {
    allocated: AtomicU64,
    reused: AtomicU64,
    failed: AtomicU64,
    outstanding_bytes: AtomicUsize,
}

impl PoolMetrics {
    /// 预留 `capacity` 字节的预算，超出上限时不做任何修改并返回 `false`。
    fn reserve(&self, capacity: usize, config: &PoolConfig) -> bool {
        self.outstanding_bytes
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current
                    .checked_add(capacity)
                    .filter(|total| *total <= config.max_outstanding_bytes)
            })
            .is_ok()
    }

    /// 归还一次租约预留的预算；每个租约恰好归还一次，数额与预留时一致。
    fn release(&self, capacity: usize) {
        let previous = self.outstanding_bytes.fetch_sub(capacity, Ordering::AcqRel);
        debug_assert!(
            previous >= capacity,
            "released {capacity} bytes with only {previous} outstanding"
        );
    }
}
