use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::sim::{EventId, EventKind, EventPayload, ObjectId, SimObject, SimTime, Simulator};

/// 接收并记录事件的测试对象
pub struct Recorder {
    pub log: Arc<Mutex<Vec<(EventKind, SimTime, EventPayload)>>>,
}

impl Recorder {
    pub fn register(sim: &mut Simulator) -> (ObjectId, Arc<Mutex<Vec<(EventKind, SimTime, EventPayload)>>>) {
        let log: Arc<Mutex<Vec<(EventKind, SimTime, EventPayload)>>> =
            Arc::new(Mutex::new(Vec::new()));
        let log2 = Arc::clone(&log);
        let id = sim.add_object(move |_id| Box::new(Recorder { log: log2 }));
        (id, log)
    }
}

impl SimObject for Recorder {
    fn on_event(&mut self, ev: EventId, sim: &mut Simulator) {
        let e = sim.event(ev);
        self.log
            .lock()
            .expect("log lock")
            .push((e.kind, sim.now(), e.payload));
    }

    fn reset(&mut self, _sim: &mut Simulator) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// 跑空事件队列（设一个安全步数上限）
pub fn run_to_completion(sim: &mut Simulator, max_events: usize) {
    for _ in 0..max_events {
        let Some(ev) = sim.pop_next_event() else {
            return;
        };
        sim.dispatch(ev);
    }
    panic!("simulation did not drain within {max_events} events");
}
