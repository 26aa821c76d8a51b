//! Rotor 设备句柄
//!
//! 对外的 `Rotor` 结构体：构造时启动控制线程，持有期间提供
//! 无锁状态快照，drop 时发出停止信号并 join 线程。

use crate::builder::RotorBuilder;
use crate::error::DriverError;
use crate::state::{RotorContext, RotorState};
use crossbeam_channel::Sender;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;
use tracing::warn;

/// 旋钮驱动句柄
///
/// 控制循环在专用线程上运行；句柄只做三件事：读快照、请求停止、
/// 回收线程。构造见 [`RotorBuilder`]。
pub struct Rotor {
    ctx: Arc<RotorContext>,
    shutdown_tx: Sender<()>,
    thread: Option<JoinHandle<Result<(), DriverError>>>,
    link_addr: Option<SocketAddr>,
}

impl Rotor {
    /// 开始构造
    pub fn builder() -> RotorBuilder {
        RotorBuilder::new()
    }

    pub(crate) fn from_parts(
        ctx: Arc<RotorContext>,
        shutdown_tx: Sender<()>,
        thread: JoinHandle<Result<(), DriverError>>,
        link_addr: Option<SocketAddr>,
    ) -> Self {
        Self {
            ctx,
            shutdown_tx,
            thread: Some(thread),
            link_addr,
        }
    }

    /// 最新状态快照（无锁，任意线程可调用）
    pub fn state(&self) -> RotorState {
        self.ctx.snapshot()
    }

    /// 控制循环是否仍在运行
    pub fn is_running(&self) -> bool {
        self.ctx.is_running.load(Ordering::Relaxed)
    }

    /// 遥测链路实际绑定的本地地址（未启用链路时为 `None`）
    pub fn link_addr(&self) -> Option<SocketAddr> {
        self.link_addr
    }

    /// 停止信号发送端的克隆（交给 ctrlc 处理器等外部触发源）
    pub fn shutdown_sender(&self) -> Sender<()> {
        self.shutdown_tx.clone()
    }

    /// 停止控制循环并等待线程退出
    ///
    /// # 错误
    ///
    /// 返回循环的退出结果：正常停止为 `Ok(())`，
    /// 硬件故障导致的终止为对应的 [`DriverError`]。
    pub fn shutdown(mut self) -> Result<(), DriverError> {
        self.ctx.is_running.store(false, Ordering::Relaxed);
        let _ = self.shutdown_tx.send(());

        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| DriverError::ThreadPanicked)?,
            None => Ok(()),
        }
    }
}

impl Drop for Rotor {
    fn drop(&mut self) {
        self.ctx.is_running.store(false, Ordering::Relaxed);
        let _ = self.shutdown_tx.send(());

        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("control thread panicked during drop");
        }
    }
}
