//! `redirect` 使用的位置描述符。
//!
//! 重定向请求要求对端把底层传输改绑到新的位置，位置的形态由种类决定：
//! 网络端点、URI 或本地资源。这里用带标签的枚举承载，种类与参数一一对应。

use std::{fmt, net::SocketAddr};

/// 位置种类，决定如何解读随附参数。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LocationKind {
    Uri,
    Socket,
    Resource,
}

/// 套接字语义。
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SocketSemantics {
    /// 面向连接的字节流。
    Stream,
    /// 数据报。
    Datagram,
}

/// 重定向目标。
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Location {
    /// 以字符串给出的 URI，例如 HTTP 重定向中的 `Location` 头。
    Uri(String),
    /// 新的网络端点，`local` 为可选的本地绑定地址。
    Socket {
        semantics: SocketSemantics,
        peer: SocketAddr,
        local: Option<SocketAddr>,
    },
    /// 本地资源，例如文件路径或设备名。
    Resource(String),
}

impl Location {
    /// 构造 URI 位置。
    pub fn uri(uri: impl Into<String>) -> Self {
        Location::Uri(uri.into())
    }

    /// 构造流式套接字位置。
    pub fn stream(peer: SocketAddr) -> Self {
        Location::Socket {
            semantics: SocketSemantics::Stream,
            peer,
            local: None,
        }
    }

    /// 构造数据报套接字位置。
    pub fn datagram(peer: SocketAddr, local: Option<SocketAddr>) -> Self {
        Location::Socket {
            semantics: SocketSemantics::Datagram,
            peer,
            local,
        }
    }

    /// 构造本地资源位置。
    pub fn resource(name: impl Into<String>) -> Self {
        Location::Resource(name.into())
    }

    pub fn kind(&self) -> LocationKind {
        match self {
            Location::Uri(_) => LocationKind::Uri,
            Location::Socket { .. } => LocationKind::Socket,
            Location::Resource(_) => LocationKind::Resource,
        }
    }
}

impl From<SocketAddr> for Location {
    fn from(peer: SocketAddr) -> Self {
        Location::stream(peer)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Uri(uri) => write!(f, "uri {uri}"),
            Location::Socket {
                semantics,
                peer,
                local: Some(local),
            } => write!(f, "{semantics:?} socket {local} -> {peer}"),
            Location::Socket {
                semantics, peer, ..
            } => write!(f, "{semantics:?} socket -> {peer}"),
            Location::Resource(name) => write!(f, "resource {name}"),
        }
    }
}
