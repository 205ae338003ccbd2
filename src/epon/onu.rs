//! ONU 状态机
//!
//! ONU 维护一个有字节预算的尾丢弃 FIFO。收到 GATE 后按时间戳重新
//! 同步本地时钟，把授权拆成 REPORT 时隙和数据时隙两个定时器；
//! 数据时隙打开期间逐包发送，包不可抢占，队头放不下就停发等待
//! 下一次授权。

use std::any::Any;
use std::collections::VecDeque;

use tracing::trace;

use crate::sim::{
    EventId, EventKind, EventPayload, GateData, ObjectId, PacketData, ProtocolWarning, ReportData,
    SimObject, SimTime, Simulator, SyncClock,
};

use super::config::PonConfig;

/// 光网络单元
pub struct Onu {
    id: ObjectId,
    cfg: PonConfig,
    clock: SyncClock,
    /// 上行出端口（指向双向链路）
    out_port: Option<ObjectId>,
    fifo: VecDeque<PacketData>,
    queue_bytes: i64,
    /// 当前时隙关闭的本地时刻
    slot_end: SimTime,
    sending: bool,
}

impl Onu {
    pub fn new(id: ObjectId, cfg: PonConfig) -> Self {
        Onu {
            id,
            cfg,
            clock: SyncClock::default(),
            out_port: None,
            fifo: VecDeque::new(),
            queue_bytes: 0,
            slot_end: SimTime::ZERO,
            sending: false,
        }
    }

    pub fn set_port(&mut self, dst: ObjectId) {
        self.out_port = Some(dst);
    }

    /// 队列中数据的总字节数
    pub fn queue_bytes(&self) -> i64 {
        self.queue_bytes
    }

    pub fn queue_packets(&self) -> usize {
        self.fifo.len()
    }

    /// 数据包到达：放得下就入队并转写为入队事件，否则转写为丢包
    /// 事件。两者都是消费者为空的即时事件，只供观察者记账。
    fn receive_data_packet(&mut self, ev: EventId, sim: &mut Simulator) {
        let Some(pckt) = sim.event(ev).packet() else {
            return;
        };

        let record = sim.event_mut(ev);
        if self.queue_bytes + pckt.size as i64 <= self.cfg.buffer_size {
            self.fifo.push_back(pckt);
            self.queue_bytes += pckt.size as i64;
            record.kind = EventKind::PcktEnque;
        } else {
            record.kind = EventKind::PcktDrop;
        }
        record.consumer = None;
        self.clock.register_event(sim, ev, SimTime::ZERO, self.id);
    }

    /// 处理 GATE：同步本地时钟，拆分授权。
    fn process_gate(&mut self, ev: EventId, sim: &mut Simulator) {
        let Some(gate) = sim.event(ev).gate() else {
            return;
        };
        let mut length = gate.length;

        self.clock.set_local_time(sim, gate.timestamp);

        // 授权必须落在未来（算上硬件处理时延）
        let local = self.clock.local_time(sim);
        if gate.start_time < local + SimTime(self.cfg.onu_hw_process_delay) {
            sim.warn(ProtocolWarning::LateGrant(self.id));
            return;
        }

        // 给 REPORT 消息留出空间，REPORT 排在数据之后发送
        if length >= self.cfg.overhead(self.cfg.mpcp_packet_size) {
            length -= self.cfg.overhead(self.cfg.mpcp_packet_size);

            let timer = sim.allocate_event();
            let record = sim.event_mut(timer);
            record.kind = EventKind::TimerGrantReport;
            record.consumer = Some(self.id);
            self.clock.register_event_abs(
                sim,
                timer,
                gate.start_time + self.cfg.pon_time(length),
                self.id,
            );
        } else {
            sim.warn(ProtocolWarning::GrantTooSmall(self.id));
        }

        // 剩余空间够一个最小帧才值得打开数据时隙
        if length >= self.cfg.overhead(self.cfg.min_packet_size) {
            let timer = sim.allocate_event();
            let record = sim.event_mut(timer);
            record.kind = EventKind::TimerGrantData;
            record.consumer = Some(self.id);
            record.payload = EventPayload::Gate(GateData { length, ..gate });
            self.clock
                .register_event_abs(sim, timer, gate.start_time, self.id);
        }
    }

    /// 尝试开始发送队头包。时隙内包不可抢占；队头放不下就停。
    fn start_sending_packet(&mut self, sim: &mut Simulator) {
        if self.sending {
            return;
        }
        let Some(head) = self.fifo.front() else {
            return;
        };
        let local = self.clock.local_time(sim);
        if local + self.cfg.pon_pckt_time(head.size) > self.slot_end {
            return;
        }

        self.sending = true;
        let pckt = self.fifo.pop_front().expect("head checked above");
        self.queue_bytes -= pckt.size as i64;
        trace!(onu = self.id.0, size = pckt.size, "开始发送");

        let ev = sim.allocate_event();
        let record = sim.event_mut(ev);
        record.kind = EventKind::PcktDeque;
        record.consumer = Some(self.id);
        record.payload = EventPayload::Packet(pckt);
        self.clock
            .register_event(sim, ev, self.cfg.pon_pckt_time(pckt.size), self.id);
    }

    /// 发送完成：包转写为到达事件推向上行口，再尝试发下一个。
    fn finish_sending_packet(&mut self, ev: EventId, sim: &mut Simulator) {
        let record = sim.event_mut(ev);
        record.kind = EventKind::PcktArrival;
        record.consumer = self.out_port;
        self.clock.register_event(sim, ev, SimTime::ZERO, self.id);

        self.sending = false;
        self.start_sending_packet(sim);
    }

    /// 数据时隙打开。
    fn open_slot(&mut self, ev: EventId, sim: &mut Simulator) {
        let Some(gate) = sim.event(ev).gate() else {
            return;
        };
        self.slot_end = self.clock.local_time(sim) + self.cfg.pon_time(gate.length);
        self.start_sending_packet(sim);
    }

    /// 组装并发出 REPORT：上报队列字节数加上每包的线路开销。
    fn send_report(&mut self, ev: EventId, sim: &mut Simulator) {
        let timestamp = self.clock.local_time(sim) + self.cfg.pon_pckt_time(self.cfg.mpcp_packet_size);
        let record = sim.event_mut(ev);
        record.kind = EventKind::MpcpReport;
        record.consumer = self.out_port;
        record.payload = EventPayload::Report(ReportData {
            timestamp,
            length: self.queue_bytes + self.fifo.len() as i64 * self.cfg.packet_overhead as i64,
        });
        self.clock.register_event(
            sim,
            ev,
            self.cfg.pon_pckt_time(self.cfg.mpcp_packet_size),
            self.id,
        );
    }
}

impl SimObject for Onu {
    fn on_event(&mut self, ev: EventId, sim: &mut Simulator) {
        match sim.event(ev).kind {
            // 授权处理
            EventKind::MpcpGate => self.process_gate(ev, sim),
            EventKind::TimerGrantReport => self.send_report(ev, sim),
            EventKind::TimerGrantData => self.open_slot(ev, sim),

            // 数据处理
            EventKind::PcktArrival => self.receive_data_packet(ev, sim),
            EventKind::PcktDeque => self.finish_sending_packet(ev, sim),

            kind => sim.warn(ProtocolWarning::UnhandledEvent(self.id, kind)),
        }
    }

    fn reset(&mut self, _sim: &mut Simulator) {
        self.sending = false;
        self.slot_end = SimTime::ZERO;
        self.queue_bytes = 0;
        self.fifo.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
