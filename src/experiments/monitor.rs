//! 观察者
//!
//! 观察者在每个事件分发之前查看它并记账。哪类事件计入哪项统计：
//! - 到达事件且消费者是 ONU：ONU 收包计数；
//! - 到达事件且生产者是 ONU：送往 OLT 计数，并采样排队时延；
//! - 丢包事件：丢弃计数；
//! - 入队/出队事件：对总队列长度做时间加权采样；
//! - 送往 0 号 LLID 的 GATE：采样调度周期并累计授权字节。

use std::collections::HashSet;

use crate::epon::Onu;
use crate::sim::{EventId, EventKind, ObjectId, SimTime, Simulator};
use crate::stats::Stats;

/// 单个负载点的计数器
#[derive(Debug, Clone, Copy, Default)]
pub struct TestCounters {
    pub target_load: f64,
    /// 本负载点消耗的虚拟时间
    pub run_time: SimTime,

    pub recv_pckt: u64,
    pub sent_pckt: u64,
    pub drop_pckt: u64,
    pub schd_pckt: u64,

    pub recv_byte: u64,
    pub sent_byte: u64,
    pub drop_byte: u64,
    pub schd_byte: u64,

    /// 排队时延（毫秒）
    pub dly: Stats,
    /// 总队列长度（字节，时间加权）
    pub que: Stats,
    /// 调度周期（毫秒）
    pub cyc: Stats,
}

/// 事件观察者
pub struct Monitor {
    onu_set: HashSet<ObjectId>,
    onu_list: Vec<ObjectId>,
    /// 0 号 LLID，周期统计的参考点
    base_onu: ObjectId,
    last_queue_length: i64,
    /// 0 作为"尚未采样"的哨兵
    last_queue_change: SimTime,
    last_cycle_start: SimTime,
    pub tests: Vec<TestCounters>,
    cur: usize,
}

impl Monitor {
    pub fn new(onu_list: Vec<ObjectId>, num_test: usize) -> Self {
        let base_onu = onu_list[0];
        Monitor {
            onu_set: onu_list.iter().copied().collect(),
            onu_list,
            base_onu,
            last_queue_length: 0,
            last_queue_change: SimTime::ZERO,
            last_cycle_start: SimTime::ZERO,
            tests: vec![TestCounters::default(); num_test],
            cur: 0,
        }
    }

    /// 切换到第 t 个负载点。
    pub fn start_test(&mut self, t: usize, target_load: f64) {
        self.cur = t;
        self.tests[t].target_load = target_load;
    }

    /// 查看一个即将分发的事件。
    pub fn observe(&mut self, sim: &Simulator, ev: EventId) {
        let e = sim.event(ev);
        let cur = &mut self.tests[self.cur];

        let consumer_is_onu = e.consumer.is_some_and(|c| self.onu_set.contains(&c));
        let producer_is_onu = e.producer.is_some_and(|p| self.onu_set.contains(&p));

        match e.kind {
            EventKind::PcktArrival if consumer_is_onu => {
                let Some(pckt) = e.packet() else { return };
                cur.recv_pckt += 1;
                cur.recv_byte += pckt.size as u64;
            }

            EventKind::PcktArrival if producer_is_onu => {
                let Some(pckt) = e.packet() else { return };
                // 时延 = 包产生到离开 ONU 的时间差，换算成毫秒
                let dly = (sim.now() - pckt.birth_time).0 as f64 / 1e6;
                cur.dly.sample(dly);
                cur.sent_pckt += 1;
                cur.sent_byte += pckt.size as u64;
            }

            EventKind::PcktDrop => {
                let Some(pckt) = e.packet() else { return };
                cur.drop_pckt += 1;
                cur.drop_byte += pckt.size as u64;
            }

            EventKind::PcktEnque | EventKind::PcktDeque => {
                let Some(pckt) = e.packet() else { return };
                if self.last_queue_change == SimTime::ZERO {
                    // 第一次：从各 ONU 的队列现状取初始总长
                    for &onu in &self.onu_list {
                        if let Some(o) = sim.object_as::<Onu>(onu) {
                            self.last_queue_length += o.queue_bytes();
                        }
                    }
                } else {
                    // 以距上次变化的时长为权重采样，得到精确的时间平均
                    cur.que.sample_weighted(
                        self.last_queue_length as f64,
                        (sim.now() - self.last_queue_change).0 as f64,
                    );
                    self.last_queue_length += pckt.size as i64
                        * if e.kind == EventKind::PcktEnque { 1 } else { -1 };
                }
                self.last_queue_change = sim.now();
            }

            EventKind::MpcpGate if e.consumer == Some(self.base_onu) => {
                let Some(gate) = e.gate() else { return };
                if self.last_cycle_start != SimTime::ZERO {
                    cur.cyc
                        .sample((gate.start_time - self.last_cycle_start).0 as f64 / 1e6);
                }
                self.last_cycle_start = gate.start_time;
                cur.schd_pckt += 1;
                cur.schd_byte += gate.length as u64;
            }

            _ => {}
        }
    }
}
