//! OLT 调度器
//!
//! OLT 收 REPORT 发 GATE。`schedule_end` 记录上行信道已被承诺到的
//! 时刻；RTT 由 REPORT 时间戳现场估计，新授权的起点取"对端来得及
//! 处理"与"信道空出来"中较晚者。授权长度的计算是可插拔的服务
//! 策略，默认限制服务。

use std::any::Any;

use tracing::debug;

use serde::Deserialize;

use crate::sim::{
    EventId, EventKind, EventPayload, GateData, ObjectId, ProtocolWarning, SimObject, SimTime,
    Simulator, SyncClock,
};

use super::config::PonConfig;

/// 授权长度服务策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantPolicy {
    /// 固定：恒为 MAX_SLOT
    Fixed,
    /// 限制：min(请求 + REPORT 开销, MAX_SLOT)
    #[default]
    Limited,
    /// 门控：有多少给多少
    Gated,
    /// 常数信用：请求外加一个满长帧的信用
    ConstantCredit,
    /// 线性信用：请求的 1.2 倍
    LinearCredit,
    /// 弹性：N·MAX_SLOT 减去近期已授出的总量内公平分享
    Elastic,
}

/// 光线路终端
pub struct Olt {
    id: ObjectId,
    cfg: PonConfig,
    clock: SyncClock,
    /// 每 LLID 一个下行端口（指向双向链路）
    ports: Vec<ObjectId>,
    /// 上行信道已排定到的本地时刻
    schedule_end: SimTime,
    /// 上一个上行包的到达时刻（碰撞检测）
    last_packet_arrival: SimTime,
    max_slot: i64,
    policy: GrantPolicy,
    /// 弹性服务的每 LLID 上次授权量
    last_grant: Vec<i64>,
}

impl Olt {
    pub fn new(id: ObjectId, cfg: PonConfig, policy: GrantPolicy) -> Self {
        Olt {
            id,
            cfg,
            clock: SyncClock::default(),
            ports: Vec::new(),
            schedule_end: SimTime::ZERO,
            last_packet_arrival: SimTime::ZERO,
            max_slot: cfg.max_slot,
            policy,
            last_grant: vec![0; cfg.num_llid as usize],
        }
    }

    pub fn set_port(&mut self, dst: ObjectId, ndx: usize) {
        if self.ports.len() <= ndx {
            self.ports.resize(ndx + 1, dst);
        }
        self.ports[ndx] = dst;
    }

    pub fn set_max_slot(&mut self, slot: i64) {
        self.max_slot = slot;
    }

    pub fn max_slot(&self) -> i64 {
        self.max_slot
    }

    /// 相邻上行包的时间必须不重叠。
    fn check_packet_collision(&mut self, pckt_size: u32, sim: &mut Simulator) {
        let local = self.clock.local_time(sim);
        if self.last_packet_arrival + self.cfg.pon_pckt_time(pckt_size) > local {
            sim.warn(ProtocolWarning::Collision(self.id));
        }
        self.last_packet_arrival = local;
    }

    fn receive_data_packet(&mut self, ev: EventId, sim: &mut Simulator) {
        let size = sim.event(ev).packet().map(|p| p.size).unwrap_or(0);
        self.check_packet_collision(size, sim);
    }

    /// 按服务策略计算授权长度。
    fn grant_length(&mut self, report_length: i64, llid: usize) -> i64 {
        let report_oh = self.cfg.overhead(self.cfg.mpcp_packet_size);
        match self.policy {
            GrantPolicy::Fixed => self.max_slot,
            GrantPolicy::Limited => (report_length + report_oh).min(self.max_slot),
            GrantPolicy::Gated => report_length + report_oh,
            GrantPolicy::ConstantCredit => {
                (report_length + report_oh + self.cfg.overhead(self.cfg.max_packet_size))
                    .min(self.max_slot)
            }
            GrantPolicy::LinearCredit => {
                ((report_length as f64 * 1.2) as i64 + report_oh).min(self.max_slot)
            }
            GrantPolicy::Elastic => {
                let total_granted: i64 = self.last_grant.iter().sum();
                let share = (self.cfg.num_llid as i64 * self.max_slot - total_granted).max(0);
                let grant = (report_length + report_oh).min(share);
                self.last_grant[llid] = grant;
                grant
            }
        }
    }

    /// 收 REPORT，排一个 GATE 回去。
    fn receive_report(&mut self, ev: EventId, sim: &mut Simulator) {
        self.check_packet_collision(self.cfg.mpcp_packet_size, sim);

        let Some(report) = sim.event(ev).report() else {
            return;
        };
        // REPORT 的时间戳是 ONU 本地时间，收到时刻减掉它即为 RTT
        let local = self.clock.local_time(sim);
        let rtt = local - report.timestamp;

        // GATE 原路返回：REPORT 的生产者是这条 LLID 的链路
        let back_port = sim.event(ev).producer;
        let llid = back_port
            .and_then(|p| self.ports.iter().position(|&x| x == p))
            .unwrap_or(0);

        let timestamp =
            local + self.cfg.pon_pckt_time(self.cfg.mpcp_packet_size) + SimTime(self.cfg.olt_hw_process_delay);
        let start_time =
            (timestamp + SimTime(self.cfg.onu_hw_process_delay)).max(self.schedule_end - rtt);
        let length = self.grant_length(report.length, llid);

        let gate_ev = sim.allocate_event();
        let record = sim.event_mut(gate_ev);
        record.kind = EventKind::MpcpGate;
        record.consumer = back_port;
        record.payload = EventPayload::Gate(GateData {
            timestamp,
            start_time,
            length,
        });
        self.clock.register_event_abs(sim, gate_ev, timestamp, self.id);

        self.schedule_end =
            start_time + rtt + self.cfg.pon_time(length) + SimTime(self.cfg.guard_band_time);
        debug!(
            llid,
            length,
            start = ?start_time,
            schedule_end = ?self.schedule_end,
            "发出 GATE"
        );
    }

    /// 简化发现流程：给每个 LLID 发一个只够发 REPORT 的单播发现
    /// GATE，按 MPCP 帧时间加 OLT 处理时延错开。
    fn simplified_discovery(&mut self, sim: &mut Simulator) {
        let mut timestamp = self.clock.local_time(sim);

        for ndx in 0..self.ports.len() {
            let start_time =
                (timestamp + SimTime(self.cfg.onu_hw_process_delay)).max(self.schedule_end);
            let length = self.cfg.overhead(self.cfg.mpcp_packet_size);

            let ev = sim.allocate_event();
            let record = sim.event_mut(ev);
            record.kind = EventKind::MpcpGate;
            record.consumer = Some(self.ports[ndx]);
            record.payload = EventPayload::Gate(GateData {
                timestamp,
                start_time,
                length,
            });
            self.clock.register_event_abs(sim, ev, timestamp, self.id);

            self.schedule_end = start_time
                + SimTime(2 * self.cfg.max_link_distance * self.cfg.fiber_delay)
                + SimTime(self.cfg.guard_band_time);
            timestamp = timestamp
                + self.cfg.pon_pckt_time(self.cfg.mpcp_packet_size)
                + SimTime(self.cfg.olt_hw_process_delay);
        }
    }
}

impl SimObject for Olt {
    fn on_event(&mut self, ev: EventId, sim: &mut Simulator) {
        match sim.event(ev).kind {
            EventKind::MpcpReport => self.receive_report(ev, sim),
            EventKind::PcktArrival => self.receive_data_packet(ev, sim),
            kind => sim.warn(ProtocolWarning::UnhandledEvent(self.id, kind)),
        }
    }

    fn reset(&mut self, sim: &mut Simulator) {
        self.schedule_end = self.clock.local_time(sim);
        self.last_packet_arrival = self.schedule_end;
        self.last_grant.fill(0);
        self.simplified_discovery(sim);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
