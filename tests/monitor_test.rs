//! Parser, window aggregator and alert state machine properties.

use stroke_monitor::{
    config::{AlertConfig, WindowConfig, WindowPolicy},
    presentation::ChannelHistory,
    risk::SharedMonitor,
    AlertMonitor, Band, FeatureVector, MonitorError, RiskScore, RunState, SampleParser, Verdict,
    WindowAggregator,
};

fn pct(v: f64) -> RiskScore {
    RiskScore::from_percent(v).unwrap()
}

fn monitor() -> AlertMonitor {
    AlertMonitor::new(&WindowConfig::default(), AlertConfig::default())
}

#[test]
fn parser_accepts_four_numeric_fields_in_order() {
    let p = SampleParser::default();
    let fv = p.parse("0.5, 0.7,0.2 ,-6e-1\r\n").unwrap().unwrap();
    assert_eq!(fv.values(), &[0.5, 0.7, 0.2, -0.6]);
    assert_eq!(fv.band(Band::Delta), -0.6);
}

#[test]
fn parser_rejects_wrong_field_count_and_non_numeric() {
    let p = SampleParser::default();
    for bad in ["1,2,3", "1,2,3,4,5", "1.0,2.0,bad,4.0", "1,,3,4", "1,2,3,NaN", "1,2,inf,4"] {
        let err = p.parse(bad).unwrap_err();
        assert!(
            matches!(err, MonitorError::MalformedSample { .. }),
            "{bad:?} gave {err:?}"
        );
        assert!(err.is_per_sample());
    }
    assert!(p.parse("").unwrap().is_none());
}

#[test]
fn parser_custom_delimiter() {
    let p = SampleParser::new(';');
    assert!(p.parse("1;2;3;4").unwrap().is_some());
    assert!(p.parse("1,2,3,4").is_err());
}

#[test]
fn feature_vector_requires_finite_values() {
    assert!(FeatureVector::new([1.0, f64::NAN, 0.0, 0.0]).is_none());
    assert!(FeatureVector::new([1.0, 2.0, 3.0, 4.0]).is_some());
}

#[test]
fn window_emits_mean_on_tenth_call_only() {
    let mut w = WindowAggregator::new(10);
    let scores = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
    for (i, s) in scores.iter().take(9).enumerate() {
        assert_eq!(w.observe(pct(*s)), None);
        assert_eq!(w.len(), i + 1);
    }
    let mean = w.observe(pct(scores[9])).unwrap();
    assert!((mean - 55.0).abs() < 1e-9);
    assert_eq!(w.len(), 0);
    assert_eq!(w.observe(pct(1.0)), None);
    assert_eq!(w.len(), 1);
}

#[test]
fn window_capacity_is_at_least_one() {
    let mut w = WindowAggregator::new(0);
    assert_eq!(w.capacity(), 1);
    assert_eq!(w.observe(pct(42.0)), Some(42.0));
}

#[test]
fn verdict_threshold_is_inclusive_over_range() {
    let alert = AlertConfig::default();
    let mut m = 0.0;
    while m <= 100.0 {
        let expected = if m >= 70.0 { Verdict::AtRisk } else { Verdict::Safe };
        assert_eq!(Verdict::from_mean(m, &alert), expected, "mean {m}");
        m += 0.5;
    }
    assert_eq!(Verdict::from_mean(69.999, &alert), Verdict::Safe);
    assert_eq!(Verdict::from_mean(70.0, &alert), Verdict::AtRisk);
}

#[test]
fn on_window_mean_only_while_listening() {
    let mut m = monitor();
    assert_eq!(m.on_window_mean(90.0), None);
    assert_eq!(m.verdict(), Verdict::Unknown);
    m.start();
    assert_eq!(m.on_window_mean(90.0), Some(Verdict::AtRisk));
    assert_eq!(m.on_window_mean(20.0), Some(Verdict::Safe));
    m.stop();
    assert_eq!(m.on_window_mean(90.0), None);
    assert_eq!(m.verdict(), Verdict::Safe);
}

#[test]
fn stop_is_noop_unless_listening() {
    let mut m = monitor();
    assert!(!m.stop());
    assert_eq!(m.state(), RunState::Idle);

    m.start();
    for _ in 0..10 {
        m.observe(pct(30.0));
    }
    for _ in 0..3 {
        m.observe(pct(30.0));
    }
    assert!(m.stop());
    let verdict = m.verdict();
    let len = m.window_len();
    assert!(!m.stop());
    assert_eq!(m.verdict(), verdict);
    assert_eq!(m.window_len(), len);
    assert_eq!(m.state(), RunState::Stopped);
}

#[test]
fn restart_resets_window_and_verdict() {
    let mut m = monitor();
    m.start();
    let first_session = m.session_id().unwrap().to_string();
    for _ in 0..10 {
        m.observe(pct(95.0));
    }
    assert_eq!(m.verdict(), Verdict::AtRisk);
    for _ in 0..4 {
        m.observe(pct(95.0));
    }
    m.stop();
    assert!(m.start());
    assert_eq!(m.window_len(), 0);
    assert_eq!(m.verdict(), Verdict::Unknown);
    assert_ne!(m.session_id().unwrap(), first_session);
}

#[test]
fn observe_ignored_when_not_listening() {
    let mut m = monitor();
    assert!(m.observe(pct(50.0)).is_none());
    assert_eq!(m.window_len(), 0);
}

#[test]
fn carry_over_policy_survives_stop() {
    let window = WindowConfig {
        capacity: 4,
        policy: WindowPolicy::CarryOver,
    };
    let mut m = AlertMonitor::new(&window, AlertConfig { threshold_pct: 50.0 });
    m.start();
    m.observe(pct(100.0));
    m.observe(pct(100.0));
    m.stop();
    assert_eq!(m.window_len(), 2);
    m.start();
    m.observe(pct(0.0));
    let v = m.observe(pct(0.0)).unwrap();
    assert_eq!(v.mean, 50.0);
    assert_eq!(v.verdict, Verdict::AtRisk);
    assert_eq!(v.samples, 4);
}

#[test]
fn shared_monitor_across_threads_emits_one_verdict_per_window() {
    let shared = SharedMonitor::new(monitor());
    shared.start();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let s = shared.clone();
            std::thread::spawn(move || (0..25).filter(|_| s.observe(pct(80.0)).is_some()).count())
        })
        .collect();
    let verdicts: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(verdicts, 10);
    assert_eq!(shared.verdict(), Verdict::AtRisk);
    assert_eq!(shared.with(|m| m.window_len()), 0);
    assert!(shared.stop());
    assert_eq!(shared.state(), RunState::Stopped);
}

#[test]
fn risk_score_clamps_and_rejects_nan() {
    assert_eq!(RiskScore::from_probability(1.2).unwrap().percent(), 100.0);
    assert_eq!(RiskScore::from_percent(-3.0).unwrap().percent(), 0.0);
    assert!(RiskScore::from_probability(f64::NAN).is_err());
}

#[test]
fn chart_history_is_bounded_and_renders_waveform() {
    let mut h = ChannelHistory::new(3);
    assert!(h.waveform(Band::Alpha, 100).is_none());
    for i in 0..5 {
        h.publish(&FeatureVector::new([i as f64, 0.0, 0.0, 10.0]).unwrap());
    }
    assert_eq!(h.len(), 3);
    assert_eq!(h.values(Band::Alpha).collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);

    let curve = h.waveform(Band::Delta, 100).unwrap();
    assert_eq!(curve.len(), 100);
    assert!(curve[0].abs() < 1e-12);
    // amplitude is latest / 10
    assert!(curve.iter().all(|y| y.abs() <= 1.0 + 1e-12));
    assert!(curve.iter().any(|y| y.abs() > 0.9));
}
