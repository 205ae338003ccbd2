//! 本地时钟
//!
//! 每个网络元素持有一个本地时钟。`SyncClock` 只有偏移（ONU 由 GATE
//! 时间戳重新同步）；`DriftClock` 额外带 ppm 漂移，调度间隔按本地
//! 时长解释、换算成全局时长后注册。

use super::event::EventId;
use super::object::ObjectId;
use super::simulator::Simulator;
use super::time::SimTime;

/// 漂移换算窗口：每 1,000,000 个全局 tick。
pub const DRIFT_PERIOD: i64 = 1_000_000;

/// 无漂移时钟：本地时间 = 全局时间 + 偏移。
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncClock {
    offset: SimTime,
}

impl SyncClock {
    pub fn local_time(&self, sim: &Simulator) -> SimTime {
        sim.now() + self.offset
    }

    /// 重设偏移，使当前本地时间等于 `t`。
    pub fn set_local_time(&mut self, sim: &Simulator, t: SimTime) {
        self.offset = t - sim.now();
    }

    pub fn register_event(&self, sim: &mut Simulator, ev: EventId, interval: SimTime, owner: ObjectId) {
        sim.register_event(ev, interval, Some(owner));
    }

    /// 以未来本地时刻注册。
    pub fn register_event_abs(&self, sim: &mut Simulator, ev: EventId, local_t: SimTime, owner: ObjectId) {
        let interval = local_t - self.local_time(sim);
        self.register_event(sim, ev, interval, owner);
    }
}

/// 带漂移时钟：漂移以 ppm 表示（每 1,000,000 个全局 tick 的本地 tick 差）。
#[derive(Debug, Clone, Copy)]
pub struct DriftClock {
    offset: SimTime,
    /// 本地 tick 数 / DRIFT_PERIOD 个全局 tick
    rate: i64,
}

impl DriftClock {
    pub fn new(drift_ppm: i64) -> Self {
        DriftClock {
            offset: SimTime::ZERO,
            rate: DRIFT_PERIOD + drift_ppm,
        }
    }

    // 中间量用 i128，长时间运行时 g * rate 会溢出 i64
    fn global_to_local(&self, g: SimTime) -> SimTime {
        SimTime((g.0 as i128 * self.rate as i128 / DRIFT_PERIOD as i128) as i64)
    }

    fn local_to_global(&self, l: SimTime) -> SimTime {
        SimTime((l.0 as i128 * DRIFT_PERIOD as i128 / self.rate as i128) as i64)
    }

    pub fn local_time(&self, sim: &Simulator) -> SimTime {
        self.global_to_local(sim.now()) + self.offset
    }

    pub fn set_local_time(&mut self, sim: &Simulator, t: SimTime) {
        self.offset = t - self.global_to_local(sim.now());
    }

    /// `interval` 为本地时长，换算成全局时长后注册。
    pub fn register_event(&self, sim: &mut Simulator, ev: EventId, interval: SimTime, owner: ObjectId) {
        sim.register_event(ev, self.local_to_global(interval), Some(owner));
    }

    pub fn register_event_abs(&self, sim: &mut Simulator, ev: EventId, local_t: SimTime, owner: ObjectId) {
        let interval = local_t - self.local_time(sim);
        self.register_event(sim, ev, interval, owner);
    }
}

impl Default for DriftClock {
    fn default() -> Self {
        DriftClock::new(0)
    }
}
