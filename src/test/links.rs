use crate::epon::{BiDirLink, JitterLink, LosslessLink, LossyLink};
use crate::sim::{EventKind, EventPayload, PacketData, SimTime, Simulator};

use super::util::{run_to_completion, Recorder};

fn send_through(sim: &mut Simulator, link: crate::sim::ObjectId, producer: Option<crate::sim::ObjectId>) {
    let ev = sim.allocate_event();
    let record = sim.event_mut(ev);
    record.kind = EventKind::PcktArrival;
    record.consumer = Some(link);
    record.payload = EventPayload::Packet(PacketData {
        birth_time: SimTime::ZERO,
        size: 64,
        source_id: 0,
    });
    sim.register_event(ev, SimTime::ZERO, producer);
}

#[test]
fn lossless_link_delays_and_redirects() {
    let mut sim = Simulator::new(0);
    let (rec, log) = Recorder::register(&mut sim);
    let link = sim.add_object(|id| Box::new(LosslessLink::new(id, SimTime(500))));
    sim.with_object_mut::<LosslessLink, _>(link, |l, _| l.set_port(rec));

    send_through(&mut sim, link, None);
    run_to_completion(&mut sim, 10);

    let log = log.lock().expect("log lock");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].1, SimTime(500));
    // 事件记录被复用而不是重新分配
    assert_eq!(sim.pooled_events(), 1);
}

#[test]
fn bidir_link_crosses_sides_and_never_loops() {
    let mut sim = Simulator::new(0);
    let (side_a, log_a) = Recorder::register(&mut sim);
    let (side_b, log_b) = Recorder::register(&mut sim);
    let link = sim.add_object(|id| Box::new(BiDirLink::new(id, SimTime(100))));
    sim.with_object_mut::<BiDirLink, _>(link, |l, _| {
        l.set_port(side_a, 0);
        l.set_port(side_b, 1);
    });

    // A 侧发出 → B 侧收到
    send_through(&mut sim, link, Some(side_a));
    run_to_completion(&mut sim, 10);
    assert_eq!(log_a.lock().expect("log lock").len(), 0);
    assert_eq!(log_b.lock().expect("log lock").len(), 1);

    // B 侧发出 → A 侧收到
    send_through(&mut sim, link, Some(side_b));
    run_to_completion(&mut sim, 10);
    assert_eq!(log_a.lock().expect("log lock").len(), 1);
    assert_eq!(log_b.lock().expect("log lock").len(), 1);
}

#[test]
fn lossy_link_drops_with_certainty_at_probability_one() {
    let mut sim = Simulator::new(0);
    let (rec, log) = Recorder::register(&mut sim);
    let link = sim.add_object(|id| Box::new(LossyLink::new(id, SimTime(100), 1.0)));
    sim.with_object_mut::<LossyLink, _>(link, |l, _| l.set_port(rec));

    for _ in 0..50 {
        send_through(&mut sim, link, None);
    }
    run_to_completion(&mut sim, 200);

    assert!(log.lock().expect("log lock").is_empty());
    // 被丢的事件全部回到空闲池
    assert_eq!(sim.pooled_events(), 50);
}

#[test]
fn lossy_link_forwards_everything_at_probability_zero() {
    let mut sim = Simulator::new(0);
    let (rec, log) = Recorder::register(&mut sim);
    let link = sim.add_object(|id| Box::new(LossyLink::new(id, SimTime(100), 0.0)));
    sim.with_object_mut::<LossyLink, _>(link, |l, _| l.set_port(rec));

    for _ in 0..50 {
        send_through(&mut sim, link, None);
    }
    run_to_completion(&mut sim, 200);
    assert_eq!(log.lock().expect("log lock").len(), 50);
}

#[test]
fn jitter_link_spreads_delivery_times() {
    let mut sim = Simulator::new(9);
    let (rec, log) = Recorder::register(&mut sim);
    let link = sim.add_object(|id| {
        Box::new(JitterLink::new(
            id,
            SimTime(1_000),
            Box::new(|rng| SimTime(rng.uniform_int(0, 200))),
        ))
    });
    sim.with_object_mut::<JitterLink, _>(link, |l, _| l.set_port(rec));

    for _ in 0..20 {
        send_through(&mut sim, link, None);
    }
    run_to_completion(&mut sim, 100);

    let log = log.lock().expect("log lock");
    assert_eq!(log.len(), 20);
    assert!(log.iter().all(|(_, t, _)| (1_000..=1_200).contains(&t.0)));
    let distinct: std::collections::HashSet<i64> = log.iter().map(|(_, t, _)| t.0).collect();
    assert!(distinct.len() > 1);
}

#[test]
fn negative_jitter_is_clamped_by_the_engine() {
    let mut sim = Simulator::new(0);
    let (rec, log) = Recorder::register(&mut sim);
    let link = sim.add_object(|id| {
        Box::new(JitterLink::new(
            id,
            SimTime(100),
            Box::new(|_| SimTime(-500)),
        ))
    });
    sim.with_object_mut::<JitterLink, _>(link, |l, _| l.set_port(rec));

    send_through(&mut sim, link, None);
    run_to_completion(&mut sim, 10);

    // 100 - 500 < 0，被裁剪到当前时刻
    let log = log.lock().expect("log lock");
    assert_eq!(log[0].1, SimTime::ZERO);
}
