//! 包源
//!
//! 包源持有一个突发聚合器，靠自时钟事件逐包释放：定时器到期时把
//! 定时器事件改写成到达事件推给出端口，同时立刻为下一个包定时。
//! 聚合器工作在字节戳上，这里按用户口字节时间换算成 tick。

use std::any::Any;

use crate::sim::{
    EventId, EventKind, EventPayload, ObjectId, PacketData, SimObject, SimTime, Simulator, SyncClock,
    ProtocolWarning,
};
use crate::traffic::PacketGenerator;

/// 自时钟包源
pub struct PacketSource {
    id: ObjectId,
    clock: SyncClock,
    out_port: Option<ObjectId>,
    gen: PacketGenerator,
    /// 用户口每字节时间（ns）
    byte_time: i64,
    /// 当前挂起的自时钟事件
    sclock: Option<EventId>,
}

impl PacketSource {
    pub fn new(id: ObjectId, gen: PacketGenerator, byte_time: i64) -> Self {
        PacketSource {
            id,
            clock: SyncClock::default(),
            out_port: None,
            gen,
            byte_time,
            sclock: None,
        }
    }

    pub fn set_port(&mut self, dst: ObjectId) {
        self.out_port = Some(dst);
    }

    pub fn generator(&self) -> &PacketGenerator {
        &self.gen
    }

    /// 为下一个包设置自时钟定时器。
    fn set_next_packet_timer(&mut self, sim: &mut Simulator) {
        let nxt = self.gen.next_packet(sim.rng_mut());
        let interval = SimTime(nxt.interval as i64 * self.byte_time);
        let birth_time = sim.now() + interval;

        let ev = sim.allocate_event();
        let record = sim.event_mut(ev);
        record.kind = EventKind::TimerNextPacket;
        record.consumer = Some(self.id);
        record.payload = EventPayload::Packet(PacketData {
            birth_time,
            size: nxt.size,
            source_id: nxt.source_id,
        });
        self.clock.register_event(sim, ev, interval, self.id);
        self.sclock = Some(ev);
    }

    /// 定时器到期：把定时器事件改写成立即到达事件，再为下一个包定时。
    fn output_packet(&mut self, ev: EventId, sim: &mut Simulator) {
        if Some(ev) == self.sclock {
            let record = sim.event_mut(ev);
            record.kind = EventKind::PcktArrival;
            record.consumer = self.out_port;
            self.clock.register_event(sim, ev, SimTime::ZERO, self.id);
            self.set_next_packet_timer(sim);
        }
    }

    /// 换负载：取消在途定时器，所有流复位到新负载，再重新定时。
    pub fn set_load(&mut self, load: f64, sim: &mut Simulator) {
        if let Some(ev) = self.sclock.take() {
            sim.cancel_event(ev);
        }
        self.gen.set_load_reset(load, sim.rng_mut());
        self.set_next_packet_timer(sim);
    }
}

impl SimObject for PacketSource {
    fn on_event(&mut self, ev: EventId, sim: &mut Simulator) {
        match sim.event(ev).kind {
            EventKind::TimerNextPacket => self.output_packet(ev, sim),
            kind => sim.warn(ProtocolWarning::UnhandledEvent(self.id, kind)),
        }
    }

    fn reset(&mut self, sim: &mut Simulator) {
        self.sclock = None;
        self.gen.reset(sim.rng_mut());
        self.set_next_packet_timer(sim);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
