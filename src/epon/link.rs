//! 链路类型
//!
//! 传播时延链路：收到事件后把消费者改写为出端口，再以时延重新
//! 注册。有无损、有损、双向与抖动四种。

use std::any::Any;

use crate::sim::{EventId, ObjectId, SimObject, SimRng, SimTime, Simulator};

/// 无损单向链路
#[derive(Debug)]
pub struct LosslessLink {
    id: ObjectId,
    delay: SimTime,
    out_port: Option<ObjectId>,
}

impl LosslessLink {
    pub fn new(id: ObjectId, delay: SimTime) -> Self {
        LosslessLink {
            id,
            delay,
            out_port: None,
        }
    }

    pub fn set_port(&mut self, dst: ObjectId) {
        self.out_port = Some(dst);
    }

    pub fn delay(&self) -> SimTime {
        self.delay
    }
}

impl SimObject for LosslessLink {
    fn on_event(&mut self, ev: EventId, sim: &mut Simulator) {
        sim.event_mut(ev).consumer = self.out_port;
        sim.register_event(ev, self.delay, Some(self.id));
    }

    fn reset(&mut self, _sim: &mut Simulator) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// 有损链路：以 `loss_prob` 概率丢弃事件（不再转发，由分发器回收）。
#[derive(Debug)]
pub struct LossyLink {
    id: ObjectId,
    delay: SimTime,
    loss_prob: f64,
    out_port: Option<ObjectId>,
}

impl LossyLink {
    pub fn new(id: ObjectId, delay: SimTime, loss_prob: f64) -> Self {
        LossyLink {
            id,
            delay,
            loss_prob,
            out_port: None,
        }
    }

    pub fn set_port(&mut self, dst: ObjectId) {
        self.out_port = Some(dst);
    }
}

impl SimObject for LossyLink {
    fn on_event(&mut self, ev: EventId, sim: &mut Simulator) {
        if sim.rng_mut().uniform_incl() > self.loss_prob {
            sim.event_mut(ev).consumer = self.out_port;
            sim.register_event(ev, self.delay, Some(self.id));
        }
    }

    fn reset(&mut self, _sim: &mut Simulator) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// 双向链路：两个端口，事件送往与生产者相对的一侧，绝不回环。
#[derive(Debug)]
pub struct BiDirLink {
    id: ObjectId,
    delay: SimTime,
    ports: [Option<ObjectId>; 2],
}

impl BiDirLink {
    pub fn new(id: ObjectId, delay: SimTime) -> Self {
        BiDirLink {
            id,
            delay,
            ports: [None, None],
        }
    }

    pub fn set_port(&mut self, dst: ObjectId, ndx: usize) {
        self.ports[ndx] = Some(dst);
    }

    pub fn delay(&self) -> SimTime {
        self.delay
    }
}

impl SimObject for BiDirLink {
    fn on_event(&mut self, ev: EventId, sim: &mut Simulator) {
        let producer = sim.event(ev).producer;
        let out = if producer == self.ports[0] {
            self.ports[1]
        } else {
            self.ports[0]
        };
        sim.event_mut(ev).consumer = out;
        sim.register_event(ev, self.delay, Some(self.id));
    }

    fn reset(&mut self, _sim: &mut Simulator) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub type JitterFn = Box<dyn FnMut(&mut SimRng) -> SimTime>;

/// 抖动链路：每次转发附加一个抖动量（可为负，注册时由引擎裁剪到 0）。
pub struct JitterLink {
    id: ObjectId,
    delay: SimTime,
    jitter: JitterFn,
    out_port: Option<ObjectId>,
}

impl JitterLink {
    pub fn new(id: ObjectId, delay: SimTime, jitter: JitterFn) -> Self {
        JitterLink {
            id,
            delay,
            jitter,
            out_port: None,
        }
    }

    pub fn set_port(&mut self, dst: ObjectId) {
        self.out_port = Some(dst);
    }
}

impl SimObject for JitterLink {
    fn on_event(&mut self, ev: EventId, sim: &mut Simulator) {
        let jitter = (self.jitter)(sim.rng_mut());
        sim.event_mut(ev).consumer = self.out_port;
        sim.register_event(ev, self.delay + jitter, Some(self.id));
    }

    fn reset(&mut self, _sim: &mut Simulator) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
