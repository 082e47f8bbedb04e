//! 数据报缓冲契约：拥有所有权的 [`IoBuffer`] 与为其供货的 [`BufferProvider`]。
//!
//! # 模块定位（Why）
//! - 数据报在接口之间有两种表示：拥有所有权的缓冲对象，以及仅在调用期间有效的借用切片；
//!   本模块定义前者，并规定“分配、追加、释放、查询长度”四项供货契约；
//! - 缓冲的释放即 `Drop`：`deliver` 把缓冲按值移交给对端，调用方在语言层面再也无法触碰它。
//!
//! # 设计概要（How）
//! - `IoBuffer` 以 `bytes::BytesMut` 持有数据，逻辑长度即已写入的字节数；
//! - 若缓冲来自缓冲池，构造时注入 [`BufferRecycler`]，生命周期结束时恰好通知一次；
//! - [`HeapBufferProvider`] 是默认供货方，直接在堆上分配，并以单次上限拒绝异常请求。

use std::{fmt, mem, ops::Deref, sync::Arc};

use bytes::{Buf, Bytes, BytesMut};

use crate::error::XferError;

/// 堆供货方默认允许的单个缓冲上限。
pub const DEFAULT_HEAP_LIMIT: usize = 64 * 1024 * 1024;

/// `BufferRecycler` 描述缓冲池在租借结束时的回收入口。
///
/// # 契约定义（What）
/// - 每个携带回收器的 [`IoBuffer`] 在生命周期结束时恰好触发一次 `reclaim`；
/// - **前置条件**：实现必须线程安全，且不得 panic，否则 `Drop` 路径上的 panic 会直接终止进程；
/// - **后置条件**：池应当已经记录该租约的归还，并可选择复用随附的 `BytesMut`。
pub trait BufferRecycler: Send + Sync + 'static {
    /// 通知池一次租约已经结束。
    fn reclaim(&self, reclaimed: ReclaimedBuffer);

    /// 租出的缓冲需要扩容：把登记的容量从 `leased` 扩展到 `capacity`。
    ///
    /// 返回 `Err` 时缓冲不会扩容，租约保持原样。默认实现不设上限。
    fn extend_lease(&self, leased: usize, capacity: usize) -> Result<(), XferError> {
        let _ = (leased, capacity);
        Ok(())
    }
}

/// 一次回收动作所携带的上下文。
///
/// - `leased`：租借时登记的容量，池据此回滚统计；
/// - `buffer`：若底层存储仍可复用则为 `Some`；缓冲被 [`IoBuffer::freeze`] 转为只读视图后为 `None`。
#[derive(Debug)]
pub struct ReclaimedBuffer {
    leased: usize,
    buffer: Option<BytesMut>,
}

impl ReclaimedBuffer {
    /// 创建回收结果。
    pub fn new(leased: usize, buffer: Option<BytesMut>) -> Self {
        Self { leased, buffer }
    }

    /// 租借时登记的容量。
    pub fn leased(&self) -> usize {
        self.leased
    }

    /// 消耗结构并返回可复用的 `BytesMut`。
    pub fn into_buffer(self) -> Option<BytesMut> {
        self.buffer
    }
}

struct Lease {
    recycler: Arc<dyn BufferRecycler>,
    leased: usize,
}

/// 拥有所有权的数据报缓冲。
///
/// # 契约说明（What）
/// - `len()` 为逻辑长度，即写入游标相对数据起点的偏移；
/// - 缓冲只会被一个持有者拥有：交给 `deliver` 之后所有权随之转移，接收方用完即丢弃；
/// - 丢弃时若存在回收器，则归还底层存储。
///
/// ```
/// use xfer_core::IoBuffer;
///
/// let mut iobuf = IoBuffer::with_capacity(8);
/// iobuf.put(b"GET /").unwrap();
/// assert_eq!(iobuf.len(), 5);
/// iobuf.pull(4);
/// assert_eq!(iobuf.as_slice(), b"/");
/// ```
pub struct IoBuffer {
    data: BytesMut,
    lease: Option<Lease>,
}

impl IoBuffer {
    /// 创建空缓冲，预留 `capacity` 字节。
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_bytes_mut(BytesMut::with_capacity(capacity))
    }

    /// 复制 `data` 构造缓冲。
    pub fn from_slice(data: &[u8]) -> Self {
        Self::from_bytes_mut(BytesMut::from(data))
    }

    /// 接管已有的 `BytesMut`，保留其中内容。
    pub fn from_bytes_mut(data: BytesMut) -> Self {
        Self { data, lease: None }
    }

    /// 接管池中取出的存储，并在生命周期结束时通知 `recycler`。
    ///
    /// `data` 中残留的内容会被清空，租约容量按当前容量登记。
    pub fn with_recycler(mut data: BytesMut, recycler: Arc<dyn BufferRecycler>) -> Self {
        data.clear();
        let leased = data.capacity();
        Self {
            data,
            lease: Some(Lease { recycler, leased }),
        }
    }

    /// 逻辑长度。
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 逻辑长度是否为 0。
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 当前容量。
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// 无需扩容即可追加的字节数。
    pub fn tailroom(&self) -> usize {
        self.data.capacity() - self.data.len()
    }

    /// 是否由缓冲池租借而来。
    pub fn is_pooled(&self) -> bool {
        self.lease.is_some()
    }

    /// 在尾部追加数据，必要时扩容。
    ///
    /// 池化缓冲的尾部空间不足时，先经 [`BufferRecycler::extend_lease`] 把租约扩展到新容量，
    /// 再换用恰好容纳全部内容的存储；扩展被拒绝时返回 [`XferError::NoMemory`]，内容保持不变。
    pub fn put(&mut self, data: &[u8]) -> Result<(), XferError> {
        if data.len() > self.tailroom() {
            if let Some(lease) = self.lease.as_mut() {
                let needed = self
                    .data
                    .len()
                    .checked_add(data.len())
                    .ok_or(XferError::NoMemory {
                        requested: data.len(),
                    })?;
                if needed > lease.leased {
                    lease.recycler.extend_lease(lease.leased, needed)?;
                    lease.leased = needed;
                }
                let mut grown = BytesMut::with_capacity(needed);
                grown.extend_from_slice(&self.data);
                self.data = grown;
            }
        }
        self.data.extend_from_slice(data);
        Ok(())
    }

    /// 从头部丢弃至多 `len` 字节，返回实际丢弃的字节数。
    pub fn pull(&mut self, len: usize) -> usize {
        let len = len.min(self.data.len());
        self.data.advance(len);
        len
    }

    /// 把逻辑长度截断为 `len`。
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// 已写入内容的只读视图。
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// 冻结为只读的 `Bytes`。
    ///
    /// 冻结后存储的所有权离开缓冲池，回收器收到的 `buffer` 为 `None`。
    pub fn freeze(mut self) -> Bytes {
        let data = mem::take(&mut self.data);
        if let Some(lease) = self.lease.take() {
            lease
                .recycler
                .reclaim(ReclaimedBuffer::new(lease.leased, None));
        }
        data.freeze()
    }
}

impl Deref for IoBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for IoBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for IoBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IoBuffer")
            .field("len", &self.data.len())
            .field("capacity", &self.data.capacity())
            .field("pooled", &self.lease.is_some())
            .finish()
    }
}

impl Drop for IoBuffer {
    fn drop(&mut self) {
        if let Some(lease) = self.lease.take() {
            let data = mem::take(&mut self.data);
            lease
                .recycler
                .reclaim(ReclaimedBuffer::new(lease.leased, Some(data)));
        }
    }
}

/// 缓冲供货契约。
///
/// # 教案式说明
/// - **意图 (Why)**：`deliver_as_iobuf` 需要把借用切片转换为拥有所有权的缓冲，
///   但核心层不应关心内存来自堆还是池；
/// - **契约 (What)**：`alloc(len)` 返回容量不小于 `len`、逻辑长度为 0 的缓冲；
///   无法满足时返回 [`XferError::NoMemory`]，不得 panic；
/// - **风险 (Trade-offs)**：追加、查询长度与释放由 [`IoBuffer`] 自身承担，供货方只负责分配与回收。
pub trait BufferProvider: Send + Sync + 'static {
    /// 分配至少 `len` 字节的空缓冲。
    fn alloc(&self, len: usize) -> Result<IoBuffer, XferError>;
}

/// 直接在堆上分配的默认供货方。
#[derive(Clone, Copy, Debug)]
pub struct HeapBufferProvider {
    max_len: usize,
}

impl HeapBufferProvider {
    /// 使用 [`DEFAULT_HEAP_LIMIT`] 作为单次上限。
    pub const fn new() -> Self {
        Self::with_limit(DEFAULT_HEAP_LIMIT)
    }

    /// 自定义单次分配上限，超过上限的请求返回 `NoMemory`。
    pub const fn with_limit(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for HeapBufferProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferProvider for HeapBufferProvider {
    fn alloc(&self, len: usize) -> Result<IoBuffer, XferError> {
        if len > self.max_len {
            return Err(XferError::NoMemory { requested: len });
        }
        Ok(IoBuffer::with_capacity(len))
    }
}
