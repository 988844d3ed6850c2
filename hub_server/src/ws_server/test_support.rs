//! 单元测试用的内存连接替身。

use async_trait::async_trait;
use rust_websocket_utils::{Connection, Frame, FrameSink, FrameSource, WsError};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

pub fn test_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 40000))
}

/// 写半部的行为模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkMode {
    Healthy,
    /// 每次写入立即失败
    Failing,
    /// 写入永远不返回，模拟卡死的对端
    Hanging,
}

#[derive(Debug)]
struct SinkState {
    frames: Vec<String>,
    write_attempts: usize,
    closes: usize,
    mode: SinkMode,
}

/// 观察并控制 `RecordingSink` 的句柄
#[derive(Debug, Clone)]
pub struct SinkMonitor {
    state: Arc<Mutex<SinkState>>,
}

impl SinkMonitor {
    pub fn frames(&self) -> Vec<String> {
        self.state.lock().unwrap().frames.clone()
    }

    pub fn write_attempts(&self) -> usize {
        self.state.lock().unwrap().write_attempts
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn set_mode(&self, mode: SinkMode) {
        self.state.lock().unwrap().mode = mode;
    }

    /// 轮询直到至少收到 `count` 帧，最多等待 2 秒
    pub async fn wait_for_frames(&self, count: usize) -> bool {
        self.wait_until(|state| state.frames.len() >= count).await
    }

    /// 轮询直到连接被关闭，最多等待 2 秒
    pub async fn wait_for_close(&self) -> bool {
        self.wait_until(|state| state.closes > 0).await
    }

    async fn wait_until(&self, condition: impl Fn(&SinkState) -> bool) -> bool {
        for _ in 0..200 {
            if condition(&self.state.lock().unwrap()) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

/// 记录所有写入帧与关闭次数的写半部
pub struct RecordingSink {
    monitor: SinkMonitor,
}

impl RecordingSink {
    pub fn new() -> (Self, SinkMonitor) {
        let monitor = SinkMonitor {
            state: Arc::new(Mutex::new(SinkState {
                frames: Vec::new(),
                write_attempts: 0,
                closes: 0,
                mode: SinkMode::Healthy,
            })),
        };
        (RecordingSink { monitor: monitor.clone() }, monitor)
    }
}

#[async_trait]
impl FrameSink for RecordingSink {
    async fn write_frame(&mut self, frame: &Frame) -> Result<(), WsError> {
        let mode = {
            let mut state = self.monitor.state.lock().unwrap();
            state.write_attempts += 1;
            if state.mode == SinkMode::Healthy {
                state.frames.push(frame.as_str().to_string());
            }
            state.mode
        };
        match mode {
            SinkMode::Healthy => Ok(()),
            SinkMode::Failing => Err(WsError::Transport("模拟写入失败".to_string())),
            SinkMode::Hanging => std::future::pending().await,
        }
    }

    async fn close(&mut self) -> Result<(), WsError> {
        self.monitor.state.lock().unwrap().closes += 1;
        Ok(())
    }
}

/// 由测试脚本驱动的读半部事件
#[derive(Debug)]
pub enum SourceEvent {
    Frame(Frame),
    Fail,
    Panic,
}

/// 按测试发送的事件依次返回结果的读半部；发送端全部丢弃后视为对端关闭
pub struct ScriptedSource {
    events: mpsc::UnboundedReceiver<SourceEvent>,
}

impl ScriptedSource {
    pub fn new() -> (Self, mpsc::UnboundedSender<SourceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ScriptedSource { events: rx }, tx)
    }
}

#[async_trait]
impl FrameSource for ScriptedSource {
    async fn read_frame(&mut self) -> Result<Option<Frame>, WsError> {
        match self.events.recv().await {
            Some(SourceEvent::Frame(frame)) => Ok(Some(frame)),
            Some(SourceEvent::Fail) => Err(WsError::Transport("模拟读取失败".to_string())),
            Some(SourceEvent::Panic) => panic!("模拟读取过程中 panic"),
            None => Ok(None),
        }
    }
}

/// 组装一个由脚本驱动的内存连接
pub fn scripted_connection() -> (Connection, SinkMonitor, mpsc::UnboundedSender<SourceEvent>) {
    let (sink, monitor) = RecordingSink::new();
    let (source, events) = ScriptedSource::new();
    (Connection::new(test_addr(), sink, source), monitor, events)
}
