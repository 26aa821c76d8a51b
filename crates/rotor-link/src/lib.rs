//! # Rotor Link
//!
//! 尽力而为的 UDP 遥测链路
//!
//! 无连接、无应答：第一个结构合法的入站报文把发送方注册为唯一对端
//! （后续合法报文会更新对端地址，天然支持无握手重连），
//! 之后按固定节拍向对端发送状态报文。
//!
//! 所有 socket 操作非阻塞，由控制循环在每个周期内协作式驱动：
//! `poll()` 每周期最多取一个数据报，`publish()` 自带节拍与错误退避，
//! 两者都不会阻塞控制循环。

use rotor_protocol::{Command, MAX_DATAGRAM_LEN, TelemetryReport, parse_command};
use std::net::{SocketAddr, UdpSocket};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// 链路层错误
///
/// 只有绑定/本地地址查询会把错误抛给调用方；收发路径上的瞬时错误
/// 按尽力而为语义就地吸收（丢弃或退避）。
#[derive(Error, Debug)]
pub enum LinkError {
    /// IO 错误（绑定失败、查询本地地址失败）
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
}

/// 链路配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// 本地绑定地址（设备侧固定端口）
    pub bind_addr: String,
    /// 遥测发送间隔（毫秒）
    pub telemetry_interval_ms: u64,
    /// 发送失败后的退避窗口（毫秒），窗口内暂停发送
    pub error_backoff_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{}", rotor_protocol::DEFAULT_PORT),
            telemetry_interval_ms: 50,
            error_backoff_ms: 1000,
        }
    }
}

impl LinkConfig {
    fn telemetry_interval(&self) -> Duration {
        Duration::from_millis(self.telemetry_interval_ms)
    }

    fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }
}

/// 遥测链路
///
/// 对端记录在首个合法入站报文到达时建立，进程结束前不会主动清除
/// （最小协议没有断开检测）。
pub struct TelemetryLink {
    socket: UdpSocket,
    config: LinkConfig,
    peer: Option<SocketAddr>,
    last_report: Option<Instant>,
    backoff_until: Option<Instant>,
}

impl TelemetryLink {
    /// 绑定本地端口并进入非阻塞模式
    pub fn bind(config: LinkConfig) -> Result<Self, LinkError> {
        let socket = UdpSocket::bind(&config.bind_addr)?;
        socket.set_nonblocking(true)?;
        info!(addr = %config.bind_addr, "telemetry link bound");
        Ok(Self {
            socket,
            config,
            peer: None,
            last_report: None,
            backoff_until: None,
        })
    }

    /// 实际绑定的本地地址（测试中绑定端口 0 后取回）
    pub fn local_addr(&self) -> Result<SocketAddr, LinkError> {
        Ok(self.socket.local_addr()?)
    }

    /// 当前注册的对端
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// 排空入站方向：每周期最多处理一个数据报
    ///
    /// 合法报文注册/更新对端并返回命令；非法报文静默丢弃（trace 级
    /// 记录丢弃原因）；无数据或瞬时接收错误返回 `None`。
    pub fn poll(&mut self) -> Option<Command> {
        // 缓冲区多留一字节，区分「恰好 64 字节」与被截断的超长报文
        let mut buf = [0u8; MAX_DATAGRAM_LEN + 1];

        let (len, from) = match self.socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => return None,
            Err(e) => {
                // 非阻塞 UDP 的瞬时错误（如 ICMP 引发的 ConnectionReset）不致命
                trace!("telemetry recv error (ignored): {}", e);
                return None;
            },
        };

        match parse_command(&buf[..len]) {
            Ok(command) => {
                if self.peer != Some(from) {
                    info!(peer = %from, "controller registered");
                }
                self.peer = Some(from);
                debug!(peer = %from, ?command, "command received");
                Some(command)
            },
            Err(reason) => {
                trace!(from = %from, %reason, "discarding invalid packet");
                None
            },
        }
    }

    /// 出站方向：对端已注册且节拍到期时发送一条报文
    ///
    /// 发送失败打开退避窗口，窗口内后续调用直接返回，
    /// 避免在持续故障的链路上每周期空转；窗口过后自动恢复。
    pub fn publish(&mut self, report: &TelemetryReport, now: Instant) {
        let Some(peer) = self.peer else {
            return;
        };

        if let Some(until) = self.backoff_until {
            if now < until {
                return;
            }
            self.backoff_until = None;
        }

        if let Some(last) = self.last_report
            && now.duration_since(last) < self.config.telemetry_interval()
        {
            return;
        }

        match self.socket.send_to(report.encode().as_bytes(), peer) {
            Ok(_) => {
                self.last_report = Some(now);
            },
            Err(e) => {
                let backoff = self.config.error_backoff();
                warn!(peer = %peer, "telemetry send failed ({}), backing off {:?}", e, backoff);
                self.backoff_until = Some(now + backoff);
            },
        }
    }

    #[cfg(test)]
    fn force_backoff(&mut self, until: Instant) {
        self.backoff_until = Some(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_link() -> TelemetryLink {
        TelemetryLink::bind(LinkConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            ..LinkConfig::default()
        })
        .unwrap()
    }

    fn remote() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket.set_nonblocking(true).unwrap();
        socket
    }

    fn recv_text(socket: &UdpSocket) -> Option<String> {
        // 本机回环，数据报几乎立即可见；轮询代替阻塞读
        let mut buf = [0u8; 128];
        for _ in 0..100 {
            match socket.recv_from(&mut buf) {
                Ok((len, _)) => return Some(String::from_utf8_lossy(&buf[..len]).into_owned()),
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    std::thread::sleep(Duration::from_millis(1));
                },
                Err(e) => panic!("recv failed: {e}"),
            }
        }
        None
    }

    fn report() -> TelemetryReport {
        TelemetryReport {
            logical_angle: 1.0,
            angular_velocity: 0.5,
            click_active: false,
        }
    }

    #[test]
    fn test_no_telemetry_before_registration() {
        let mut link = test_link();
        let peer = remote();

        // 对端未注册：publish 是空操作
        link.publish(&report(), Instant::now());
        assert!(link.peer().is_none());

        let mut buf = [0u8; 128];
        assert_eq!(
            peer.recv_from(&mut buf).unwrap_err().kind(),
            std::io::ErrorKind::WouldBlock
        );
    }

    #[test]
    fn test_invalid_packet_does_not_register() {
        let mut link = test_link();
        let peer = remote();
        let addr = link.local_addr().unwrap();

        peer.send_to(b"garbage!", addr).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert!(link.poll().is_none());
        assert!(link.peer().is_none());
    }

    #[test]
    fn test_registration_then_telemetry() {
        let mut link = test_link();
        let peer = remote();
        let addr = link.local_addr().unwrap();

        peer.send_to(b"HELLO", addr).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(link.poll(), Some(Command::Hello));
        assert_eq!(link.peer(), Some(peer.local_addr().unwrap()));

        link.publish(&report(), Instant::now());
        let text = recv_text(&peer).expect("expected telemetry datagram");
        assert_eq!(text, "T:1.000:0.500:0");
    }

    #[test]
    fn test_telemetry_cadence() {
        let mut link = test_link();
        let peer = remote();
        let addr = link.local_addr().unwrap();

        peer.send_to(b"HELLO", addr).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        link.poll().unwrap();

        let t0 = Instant::now();
        link.publish(&report(), t0);
        assert!(recv_text(&peer).is_some());

        // 间隔未到：不发送
        link.publish(&report(), t0 + Duration::from_millis(10));
        let mut buf = [0u8; 128];
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(
            peer.recv_from(&mut buf).unwrap_err().kind(),
            std::io::ErrorKind::WouldBlock
        );

        // 间隔到期：恢复发送
        link.publish(&report(), t0 + Duration::from_millis(50));
        assert!(recv_text(&peer).is_some());
    }

    #[test]
    fn test_peer_update_supports_reconnection() {
        let mut link = test_link();
        let first = remote();
        let second = remote();
        let addr = link.local_addr().unwrap();

        first.send_to(b"HELLO", addr).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        link.poll().unwrap();
        assert_eq!(link.peer(), Some(first.local_addr().unwrap()));

        // 换了端口的控制器重新握手：对端记录被覆盖
        second.send_to(b"R", addr).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(link.poll(), Some(Command::Reset));
        assert_eq!(link.peer(), Some(second.local_addr().unwrap()));
    }

    #[test]
    fn test_backoff_suppresses_sends_until_window_elapses() {
        let mut link = test_link();
        let peer = remote();
        let addr = link.local_addr().unwrap();

        peer.send_to(b"HELLO", addr).unwrap();
        std::thread::sleep(Duration::from_millis(5));
        link.poll().unwrap();

        let t0 = Instant::now();
        link.force_backoff(t0 + Duration::from_millis(1000));

        // 窗口内：抑制发送
        link.publish(&report(), t0 + Duration::from_millis(500));
        let mut buf = [0u8; 128];
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(
            peer.recv_from(&mut buf).unwrap_err().kind(),
            std::io::ErrorKind::WouldBlock
        );

        // 窗口过后：自动恢复
        link.publish(&report(), t0 + Duration::from_millis(1001));
        assert!(recv_text(&peer).is_some());
    }

    #[test]
    fn test_poll_drains_at_most_one_packet_per_cycle() {
        let mut link = test_link();
        let peer = remote();
        let addr = link.local_addr().unwrap();

        peer.send_to(b"HELLO", addr).unwrap();
        peer.send_to(b"R", addr).unwrap();
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(link.poll(), Some(Command::Hello));
        assert_eq!(link.poll(), Some(Command::Reset));
        assert!(link.poll().is_none());
    }
}
