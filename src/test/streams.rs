use crate::sim::SimRng;
use crate::traffic::{Stream, StreamKind};

/// 突发占比 Σburst / 字节戳跨度，应收敛到目标负载
fn measured_load(kind: StreamKind, load: f64, cycles: usize, seed: u64) -> f64 {
    let mut rng = SimRng::new(seed);
    let mut strm = Stream::new(kind, load, &mut rng);

    let mut on_bytes = 0u64;
    for _ in 0..cycles {
        on_bytes += strm.burst_size();
        strm.extract_burst(&mut rng);
    }
    on_bytes as f64 / strm.arrival_bytestamp() as f64
}

#[test]
fn cbr_stream_hits_target_load() {
    let got = measured_load(StreamKind::cbr(3200.0), 0.5, 1_000, 1);
    assert!((0.49..0.51).contains(&got), "load = {got}");
}

#[test]
fn expon_stream_converges_to_target_load() {
    let got = measured_load(StreamKind::expon(3200.0), 0.3, 100_000, 2);
    assert!((0.27..0.33).contains(&got), "load = {got}");
}

#[test]
fn pareto_stream_converges_to_target_load() {
    // 重尾分布收敛慢，带子放宽
    let got = measured_load(StreamKind::pareto(3200.0, 1.4), 0.5, 200_000, 3);
    assert!((0.35..0.65).contains(&got), "load = {got}");
}

#[test]
fn video_stream_respects_burst_cap() {
    let mut rng = SimRng::new(4);
    let mut strm = Stream::new(StreamKind::video(3200.0, 10_000, 1.4), 0.4, &mut rng);
    for _ in 0..10_000 {
        assert!(strm.burst_size() <= 3200);
        strm.extract_burst(&mut rng);
    }
}

#[test]
fn shape_and_load_are_clamped() {
    let mut rng = SimRng::new(5);
    // 非法形状与负载不会产生 NaN / 除零
    let mut strm = Stream::new(StreamKind::pareto(3200.0, 5.0), 1.5, &mut rng);
    for _ in 0..1_000 {
        strm.extract_burst(&mut rng);
    }
    assert!(strm.arrival_bytestamp() > 0);
}

#[test]
fn reset_randomizes_the_starting_phase() {
    let mut rng = SimRng::new(6);
    let mut strm = Stream::new(StreamKind::expon(3200.0), 0.5, &mut rng);

    let mut started_on = 0;
    let mut started_off = 0;
    for _ in 0..200 {
        strm.reset(&mut rng);
        if strm.arrival_bytestamp() == 0 {
            // 起点落在 ON 窗口：立刻有数据
            assert!(strm.burst_size() > 0);
            started_on += 1;
        } else {
            started_off += 1;
        }
    }
    // 0.5 负载下两种相位都应出现
    assert!(started_on > 20, "started_on = {started_on}");
    assert!(started_off > 20, "started_off = {started_off}");
}

#[test]
fn post_reset_rate_stays_near_target() {
    // 换负载并复位后，长期速率仍贴合新负载
    let mut rng = SimRng::new(7);
    let mut strm = Stream::new(StreamKind::expon(3200.0), 0.8, &mut rng);

    strm.set_load(0.1);
    strm.reset(&mut rng);

    let mut on_bytes = 0u64;
    while strm.arrival_bytestamp() < 100_000_000 {
        on_bytes += strm.burst_size();
        strm.extract_burst(&mut rng);
    }
    let got = on_bytes as f64 / strm.arrival_bytestamp() as f64;
    assert!((0.09..0.11).contains(&got), "load = {got}");
}
