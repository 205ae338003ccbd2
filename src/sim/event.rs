//! 事件记录
//!
//! 定义可回收的事件记录：事件类型、负载以及生命周期状态。
//! 事件由事件队列独占所有，仿真对象只通过 `EventId` 句柄引用。

use super::object::ObjectId;
use super::time::SimTime;

/// 事件句柄：事件 arena 中的下标。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(pub usize);

/// 事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PcktArrival,
    PcktEnque,
    PcktDeque,
    PcktDrop,
    MpcpGate,
    MpcpReport,
    TimerNextPacket,
    TimerGrantReport,
    TimerGrantData,
}

/// 数据包元信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacketData {
    /// 包产生时刻（全局时间）
    pub birth_time: SimTime,
    pub size: u32,
    pub source_id: i16,
}

/// GATE 消息元信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateData {
    pub timestamp: SimTime,
    pub start_time: SimTime,
    /// 授权长度（字节）
    pub length: i64,
}

/// REPORT 消息元信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportData {
    pub timestamp: SimTime,
    /// 上报的队列长度（字节，含每包开销）
    pub length: i64,
}

/// 事件负载：C 版本的 union 改写为带标签的和类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPayload {
    #[default]
    None,
    Packet(PacketData),
    Gate(GateData),
    Report(ReportData),
}

/// 事件生命周期状态。
///
/// 不变式：任一事件要么在有序队列/栈顶中（Queued），要么在空闲池中
/// （Pooled），要么刚被弹出、正在分发（Detached）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Detached,
    Queued,
    Pooled,
}

/// 事件记录
#[derive(Debug)]
pub struct Event {
    pub kind: EventKind,
    /// 事件生产者（非占有引用；可为空）
    pub producer: Option<ObjectId>,
    /// 事件消费者；`None` 表示事件已被取消，分发时为空操作
    pub consumer: Option<ObjectId>,
    pub payload: EventPayload,
    pub(crate) at: SimTime,
    pub(crate) state: EventState,
}

impl Event {
    pub(crate) fn blank() -> Self {
        Event {
            kind: EventKind::PcktArrival,
            producer: None,
            consumer: None,
            payload: EventPayload::None,
            at: SimTime::ZERO,
            state: EventState::Detached,
        }
    }

    /// 回收复用前清零
    pub(crate) fn recycle(&mut self) {
        self.kind = EventKind::PcktArrival;
        self.producer = None;
        self.consumer = None;
        self.payload = EventPayload::None;
        self.at = SimTime::ZERO;
        self.state = EventState::Detached;
    }

    /// 激活时间（只读；由注册时赋值）
    pub fn activation_time(&self) -> SimTime {
        self.at
    }

    pub fn state(&self) -> EventState {
        self.state
    }

    pub fn packet(&self) -> Option<PacketData> {
        match self.payload {
            EventPayload::Packet(p) => Some(p),
            _ => None,
        }
    }

    pub fn gate(&self) -> Option<GateData> {
        match self.payload {
            EventPayload::Gate(g) => Some(g),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<ReportData> {
        match self.payload {
            EventPayload::Report(r) => Some(r),
            _ => None,
        }
    }
}
