// rust_websocket_utils/src/frame.rs

//! 定义在连接上传输的最小数据单元：文本帧。

use std::fmt;
use std::string::FromUtf8Error;
use std::sync::Arc;

/// `Frame` 代表从连接上读取或写入连接的一个完整文本帧。
///
/// 帧在创建之后不可变。内部使用 `Arc<str>` 共享同一份缓冲区，
/// 因此在向多个接收方扇出时克隆一个 `Frame` 只增加引用计数，不复制内容。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame(Arc<str>);

impl Frame {
    /// 由任意文本创建一个帧。
    pub fn text(content: impl Into<Arc<str>>) -> Self {
        Frame(content.into())
    }

    /// 由二进制数据创建一个帧；数据必须是合法的 UTF-8。
    pub fn from_utf8(bytes: Vec<u8>) -> Result<Self, FromUtf8Error> {
        String::from_utf8(bytes).map(Frame::from)
    }

    /// 以 `&str` 形式访问帧内容。
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 帧内容的字节长度。
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Frame {
    fn from(value: String) -> Self {
        Frame(Arc::from(value))
    }
}

impl From<&str> for Frame {
    fn from(value: &str) -> Self {
        Frame(Arc::from(value))
    }
}

impl AsRef<str> for Frame {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
