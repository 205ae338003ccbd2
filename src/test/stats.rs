use crate::stats::Stats;

#[test]
fn unweighted_series_statistics() {
    let mut st = Stats::new();
    for v in [1.0, 2.0, 3.0, 4.0] {
        st.sample(v);
    }
    assert_eq!(st.count(), 4.0);
    assert_eq!(st.total(), 10.0);
    assert_eq!(st.avg(), 2.5);
    assert_eq!(st.max(), 4.0);
    assert!((st.var() - 1.25).abs() < 1e-12);
}

#[test]
fn empty_series_reports_zero() {
    let st = Stats::new();
    assert_eq!(st.avg(), 0.0);
    assert_eq!(st.var(), 0.0);
    assert_eq!(st.max(), 0.0);
}

#[test]
fn weighted_average_equals_time_weighted_sum() {
    // 时间加权平均的回程律：avg · Σw == Σ(样本·w)
    let mut st = Stats::new();
    let samples = [(100.0, 3.0), (250.0, 7.0), (0.0, 2.0), (400.0, 5.0)];
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for (v, w) in samples {
        st.sample_weighted(v, w);
        weighted_sum += v * w;
        total_weight += w;
    }
    assert!((st.avg() * total_weight - weighted_sum).abs() < 1e-9);
    assert_eq!(st.count(), total_weight);
}

#[test]
fn merge_combines_series() {
    let mut a = Stats::new();
    let mut b = Stats::new();
    for v in [1.0, 5.0] {
        a.sample(v);
    }
    for v in [2.0, 8.0] {
        b.sample(v);
    }
    a.merge(&b);
    assert_eq!(a.count(), 4.0);
    assert_eq!(a.avg(), 4.0);
    assert_eq!(a.max(), 8.0);
}

#[test]
fn clear_resets_everything() {
    let mut st = Stats::new();
    st.sample(9.0);
    st.clear();
    assert_eq!(st.count(), 0.0);
    assert_eq!(st.max(), 0.0);
}
