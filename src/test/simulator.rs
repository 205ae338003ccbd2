use std::any::Any;

use crate::sim::{
    EventId, EventKind, EventPayload, ObjectId, PacketData, SimObject, SimTime, Simulator,
};

use super::util::{run_to_completion, Recorder};

fn make_event(sim: &mut Simulator, consumer: ObjectId, source_id: i16) -> EventId {
    let ev = sim.allocate_event();
    let record = sim.event_mut(ev);
    record.kind = EventKind::PcktArrival;
    record.consumer = Some(consumer);
    record.payload = EventPayload::Packet(PacketData {
        birth_time: SimTime::ZERO,
        size: 64,
        source_id,
    });
    ev
}

fn logged_sources(log: &[(EventKind, SimTime, EventPayload)]) -> Vec<i16> {
    log.iter()
        .map(|(_, _, p)| match p {
            EventPayload::Packet(p) => p.source_id,
            _ => -1,
        })
        .collect()
}

#[test]
fn events_pop_in_time_order_and_time_is_monotonic() {
    let mut sim = Simulator::new(0);
    let (rec, log) = Recorder::register(&mut sim);

    for (ndx, interval) in [50i64, 10, 30].iter().enumerate() {
        let ev = make_event(&mut sim, rec, ndx as i16);
        sim.register_event(ev, SimTime(*interval), None);
    }

    run_to_completion(&mut sim, 100);

    let log = log.lock().expect("log lock");
    let times: Vec<i64> = log.iter().map(|(_, t, _)| t.0).collect();
    assert_eq!(times, vec![10, 30, 50]);
    assert_eq!(logged_sources(&log), vec![1, 2, 0]);
}

#[test]
fn equal_activation_times_pop_in_registration_order() {
    let mut sim = Simulator::new(0);
    let (rec, log) = Recorder::register(&mut sim);

    for ndx in 0..4 {
        let ev = make_event(&mut sim, rec, ndx);
        sim.register_event(ev, SimTime(25), None);
    }

    run_to_completion(&mut sim, 100);
    assert_eq!(logged_sources(&log.lock().expect("log lock")), vec![0, 1, 2, 3]);
}

/// 触发后立刻注册两个间隔 0 事件的对象
struct Chainer {
    id: ObjectId,
    target: ObjectId,
}

impl SimObject for Chainer {
    fn on_event(&mut self, _ev: EventId, sim: &mut Simulator) {
        for source_id in [1i16, 2] {
            let ev = make_event(sim, self.target, source_id);
            sim.register_event(ev, SimTime::ZERO, Some(self.id));
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

#[test]
fn immediate_follow_ups_fire_lifo_before_pending_events() {
    let mut sim = Simulator::new(0);
    let (rec, log) = Recorder::register(&mut sim);
    let chain = sim.add_object(|id| Box::new(Chainer { id, target: rec }));

    // 同一时刻：先触发 Chainer，再一个普通事件
    let trigger = make_event(&mut sim, chain, 0);
    sim.register_event(trigger, SimTime(10), None);
    let plain = make_event(&mut sim, rec, 3);
    sim.register_event(plain, SimTime(10), None);

    run_to_completion(&mut sim, 100);

    // Chainer 注册的两个即时事件后进先出，且都先于堆里的同刻事件
    assert_eq!(logged_sources(&log.lock().expect("log lock")), vec![2, 1, 3]);
}

#[test]
fn negative_interval_clamps_to_current_time() {
    let mut sim = Simulator::new(0);
    let (rec, log) = Recorder::register(&mut sim);

    let warm = make_event(&mut sim, rec, 0);
    sim.register_event(warm, SimTime(20), None);
    let ev = sim.pop_next_event().expect("warm event");
    sim.dispatch(ev);
    assert_eq!(sim.now(), SimTime(20));

    let late = make_event(&mut sim, rec, 1);
    sim.register_event(late, SimTime(-5), None);
    run_to_completion(&mut sim, 10);

    let log = log.lock().expect("log lock");
    assert_eq!(log[1].1, SimTime(20));
    assert_eq!(sim.now(), SimTime(20));
}

#[test]
fn cancelled_event_dispatch_is_noop_and_recycles() {
    let mut sim = Simulator::new(0);
    let (rec, log) = Recorder::register(&mut sim);

    let ev = make_event(&mut sim, rec, 0);
    sim.register_event(ev, SimTime(5), None);
    sim.cancel_event(ev);

    let pooled_before = sim.pooled_events();
    let popped = sim.pop_next_event().expect("queued event");
    sim.dispatch(popped);

    assert!(log.lock().expect("log lock").is_empty());
    assert_eq!(sim.pooled_events(), pooled_before + 1);
}

#[test]
fn unconsumed_event_returns_to_pool_and_is_reused() {
    let mut sim = Simulator::new(0);
    let (rec, _log) = Recorder::register(&mut sim);

    let ev = make_event(&mut sim, rec, 0);
    sim.register_event(ev, SimTime(5), None);
    run_to_completion(&mut sim, 10);
    assert_eq!(sim.pooled_events(), 1);

    // 空闲池复用同一条记录
    let again = sim.allocate_event();
    assert_eq!(again, ev);
    assert_eq!(sim.pooled_events(), 0);
}

#[test]
fn double_register_is_silently_ignored() {
    let mut sim = Simulator::new(0);
    let (rec, log) = Recorder::register(&mut sim);

    let ev = make_event(&mut sim, rec, 0);
    sim.register_event(ev, SimTime(5), None);
    sim.register_event(ev, SimTime(50), None);

    assert_eq!(sim.pending_events(), 1);
    run_to_completion(&mut sim, 10);
    let log = log.lock().expect("log lock");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].1, SimTime(5));
}

#[test]
fn global_reset_drains_queue_and_zeroes_time() {
    let mut sim = Simulator::new(0);
    let (rec, _log) = Recorder::register(&mut sim);

    for interval in [0i64, 7, 13] {
        let ev = make_event(&mut sim, rec, 0);
        sim.register_event(ev, SimTime(interval), None);
    }
    assert_eq!(sim.pending_events(), 3);

    sim.global_reset();
    assert_eq!(sim.pending_events(), 0);
    assert_eq!(sim.pooled_events(), 3);
    assert_eq!(sim.now(), SimTime::ZERO);
}

#[test]
fn global_free_releases_all_records() {
    let mut sim = Simulator::new(0);
    let (rec, _log) = Recorder::register(&mut sim);

    let ev = make_event(&mut sim, rec, 0);
    sim.register_event(ev, SimTime(7), None);
    sim.global_free();
    assert_eq!(sim.pending_events(), 0);
    assert_eq!(sim.pooled_events(), 0);
}
