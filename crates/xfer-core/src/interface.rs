//! 数据传输接口句柄及其插接生命周期。
//!
//! # 设计背景（Why）
//! - 协议阶段（套接字、解析器、应用缓冲……）各自暴露一个接口，接口之间“插接”后，
//!   在一端发起的调用会分发到对端的能力表；任何阶段都不需要知道邻居的具体类型；
//! - 对端绑定可能被 `redirect` 或 `close` 随时改写，因此分发路径每次都重新解析对端，
//!   绝不缓存对端引用。
//!
//! # 逻辑解析（How）
//! - 对端槽位使用 [`ArcSwapOption`]：读路径 `load_full` 取得一份强引用后即释放槽位，
//!   分发期间不持有任何锁，对端可以在 `deliver` 中途重入 `close` 本接口；
//! - 槽位为空即“未插接”，解析时统一落到 [`null_xfer`]，对外看来每个接口始终恰有一个对端；
//! - 插接会对对端持有一份 `Arc` 强引用，拔出时归还；引用计数决定对端何时真正释放。
//!
//! # 风险提示（Trade-offs）
//! - 两个互相插接的接口会形成引用环，必须通过 `close`（或显式 `unplug`）打破；
//!   这与“每个阶段在拆除时恰好关闭一次自己的接口”的约定一致。

use std::{
    borrow::Cow,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use arc_swap::ArcSwapOption;

use crate::{
    buffer::{BufferProvider, HeapBufferProvider, IoBuffer},
    error::XferError,
    null::{NULL_OPERATIONS, NullOperations, null_xfer},
    operations::XferOperations,
};

/// 接口标识，在诊断输出中代替地址使用。
///
/// 空对象固定为 [`InterfaceId::NULL`]，其余接口从 1 开始单调分配。
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct InterfaceId(u64);

impl InterfaceId {
    /// 空对象的标识。
    pub const NULL: InterfaceId = InterfaceId(0);

    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        InterfaceId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// 数值形式的标识。
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xfer#{}", self.0)
    }
}

/// 数据传输接口。
///
/// # 契约说明（What）
/// - 通过 [`Interface::builder`] 或 [`Interface::new`] 创建，返回 `Arc<Interface>`，
///   `Arc` 的强引用计数即接口的共享引用计数；
/// - 新建接口默认插接在空对象上，可通过 [`InterfaceBuilder::plugged_to`] 指定初始对端；
/// - 本类型只改写对端绑定，从不释放接口本身：最后一个 `Arc` 的持有者负责释放。
pub struct Interface {
    id: InterfaceId,
    label: Cow<'static, str>,
    dest: ArcSwapOption<Interface>,
    ops: Box<dyn XferOperations>,
    nullified: AtomicBool,
    provider: Arc<dyn BufferProvider>,
}

impl Interface {
    /// 以默认配置创建接口。
    pub fn new(ops: impl XferOperations) -> Arc<Self> {
        Self::builder(ops).build()
    }

    /// 创建接口构建器。
    pub fn builder(ops: impl XferOperations) -> InterfaceBuilder {
        InterfaceBuilder {
            ops: Box::new(ops),
            label: Cow::Borrowed("anonymous"),
            provider: None,
            dest: None,
        }
    }

    /// 构造空对象本体，仅供 [`null_xfer`] 初始化使用。
    pub(crate) fn null_object() -> Self {
        Self {
            id: InterfaceId::NULL,
            label: Cow::Borrowed("null"),
            dest: ArcSwapOption::empty(),
            ops: Box::new(NullOperations),
            nullified: AtomicBool::new(false),
            provider: Arc::new(HeapBufferProvider::new()),
        }
    }

    /// 接口标识，创建后不变。
    pub fn id(&self) -> InterfaceId {
        self.id
    }

    /// 诊断输出中使用的名称。
    pub fn label(&self) -> &str {
        &self.label
    }

    /// 是否为空对象。
    pub fn is_null(&self) -> bool {
        self.id == InterfaceId::NULL
    }

    /// 解析当前对端。
    ///
    /// 每次调用都重新读取绑定；未插接时返回空对象，空对象的对端是它自己。
    pub fn dest(&self) -> Arc<Interface> {
        match self.dest.load_full() {
            Some(dest) => dest,
            None => Arc::clone(null_xfer()),
        }
    }

    /// 当前对端是否为空对象以外的接口。
    pub fn is_plugged(&self) -> bool {
        self.dest.load().is_some()
    }

    /// 把对端改绑为 `dest`。
    ///
    /// - 插接到空对象等价于 [`unplug`](Self::unplug)；
    /// - 空对象自身的绑定永远不变，对它调用本方法不会产生任何效果。
    pub fn plug(&self, dest: &Arc<Interface>) {
        if self.is_null() {
            tracing::trace!(dest = %dest.id, "ignoring attempt to plug the null interface");
            return;
        }
        if dest.is_null() {
            self.unplug();
            return;
        }
        tracing::trace!(
            interface = %self.id,
            label = %self.label,
            dest = %dest.id,
            "plugged"
        );
        self.dest.store(Some(Arc::clone(dest)));
    }

    /// 把对端改绑为空对象，并归还对原对端的引用。
    pub fn unplug(&self) {
        if self.is_null() {
            return;
        }
        if let Some(previous) = self.dest.swap(None) {
            tracing::trace!(
                interface = %self.id,
                label = %self.label,
                dest = %previous.id,
                "unplugged"
            );
        }
    }

    /// 把本接口的能力表替换为空对象的能力表。
    ///
    /// 阶段开始拆除时先调用本方法，之后重入本接口的调用都会被静默吸收，
    /// 并以 “after termination” 记录诊断。该操作不可撤销。
    pub fn nullify(&self) {
        if self.is_null() {
            return;
        }
        self.nullified.store(true, Ordering::Release);
    }

    /// 是否已被 [`nullify`](Self::nullify)。
    pub fn is_nullified(&self) -> bool {
        self.nullified.load(Ordering::Acquire)
    }

    /// 当前生效的能力表。
    pub fn operations(&self) -> &dyn XferOperations {
        if self.is_nullified() {
            &NULL_OPERATIONS
        } else {
            self.ops.as_ref()
        }
    }

    /// 本接口分配数据报缓冲时使用的供货方。
    pub fn buffer_provider(&self) -> &Arc<dyn BufferProvider> {
        &self.provider
    }

    /// 通过本接口的缓冲供货方分配数据报缓冲。
    pub fn alloc_iob(&self, len: usize) -> Result<IoBuffer, XferError> {
        self.provider.alloc(len).inspect_err(|err| {
            tracing::debug!(
                interface = %self.id,
                label = %self.label,
                requested = len,
                error = %err,
                "could not allocate I/O buffer"
            );
        })
    }
}

impl fmt::Debug for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dest = self
            .dest
            .load_full()
            .map_or(InterfaceId::NULL, |dest| dest.id);
        f.debug_struct("Interface")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("dest", &dest)
            .field("nullified", &self.is_nullified())
            .finish()
    }
}

/// [`Interface`] 构建器。
pub struct InterfaceBuilder {
    ops: Box<dyn XferOperations>,
    label: Cow<'static, str>,
    provider: Option<Arc<dyn BufferProvider>>,
    dest: Option<Arc<Interface>>,
}

impl InterfaceBuilder {
    /// 诊断输出中使用的名称。
    pub fn label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// 指定缓冲供货方，默认使用 [`HeapBufferProvider`]。
    pub fn buffer_provider(mut self, provider: Arc<dyn BufferProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// 指定初始对端。
    pub fn plugged_to(mut self, dest: &Arc<Interface>) -> Self {
        self.dest = Some(Arc::clone(dest));
        self
    }

    /// 创建接口；若指定了初始对端，则随即插接。
    pub fn build(self) -> Arc<Interface> {
        let interface = Arc::new(Interface {
            id: InterfaceId::next(),
            label: self.label,
            dest: ArcSwapOption::empty(),
            ops: self.ops,
            nullified: AtomicBool::new(false),
            provider: self
                .provider
                .unwrap_or_else(|| Arc::new(HeapBufferProvider::new())),
        });
        if let Some(dest) = self.dest {
            interface.plug(&dest);
        }
        interface
    }
}

/// 把两个接口互相插接。
pub fn plug_plug(a: &Arc<Interface>, b: &Arc<Interface>) {
    a.plug(b);
    b.plug(a);
}
