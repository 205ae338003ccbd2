use crate::sim::SimTime;

#[test]
fn sim_time_unit_conversions() {
    assert_eq!(SimTime::from_micros(1), SimTime(1_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1), SimTime(1_000_000_000));
}

#[test]
fn sim_time_unit_conversions_saturate_on_overflow() {
    assert_eq!(SimTime::from_micros(i64::MAX), SimTime(i64::MAX));
    assert_eq!(SimTime::from_millis(i64::MAX), SimTime(i64::MAX));
    assert_eq!(SimTime::from_secs(i64::MAX), SimTime(i64::MAX));
}

#[test]
fn sim_time_arithmetic_saturates() {
    assert_eq!(SimTime(i64::MAX) + SimTime(1), SimTime(i64::MAX));
    assert_eq!(SimTime(5) - SimTime(7), SimTime(-2));
}

#[test]
fn sim_time_unit_views() {
    assert_eq!(SimTime::from_millis(3).as_millis_f64(), 3.0);
    assert_eq!(SimTime::from_secs(2).as_secs_f64(), 2.0);
}
