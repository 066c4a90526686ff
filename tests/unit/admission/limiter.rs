use super::*;

fn controller() -> AdmissionController {
    AdmissionController::new(&AdmissionConfig::default())
}

#[test]
fn burst_of_three_then_reject() {
    let ctl = controller();
    let t0 = Instant::now();
    assert!(ctl.check_at("1.2.3.4", t0));
    assert!(ctl.check_at("1.2.3.4", t0));
    assert!(ctl.check_at("1.2.3.4", t0));
    assert!(!ctl.check_at("1.2.3.4", t0));
}

#[test]
fn refills_one_token_per_second() {
    let ctl = controller();
    let t0 = Instant::now();
    for _ in 0..3 {
        assert!(ctl.check_at("a", t0));
    }
    assert!(!ctl.check_at("a", t0 + Duration::from_millis(500)));
    let t1 = t0 + Duration::from_secs(1);
    assert!(ctl.check_at("a", t1));
    assert!(!ctl.check_at("a", t1));
}

#[test]
fn refill_is_capped_at_burst() {
    let ctl = controller();
    let t0 = Instant::now();
    assert!(ctl.check_at("a", t0));
    let later = t0 + Duration::from_secs(60);
    for _ in 0..3 {
        assert!(ctl.check_at("a", later));
    }
    assert!(!ctl.check_at("a", later));
}

#[test]
fn identities_have_independent_buckets() {
    let ctl = controller();
    let t0 = Instant::now();
    for _ in 0..3 {
        assert!(ctl.check_at("a", t0));
    }
    assert!(!ctl.check_at("a", t0));
    assert!(ctl.check_at("b", t0));
    assert_eq!(ctl.len(), 2);
}

#[test]
fn rejected_checks_still_refresh_last_seen() {
    let ctl = controller();
    let t0 = Instant::now();
    for _ in 0..4 {
        ctl.check_at("a", t0);
    }
    let t1 = t0 + Duration::from_secs(170);
    ctl.check_at("a", t1);
    // 170s after the last check, not 340s after the first.
    assert_eq!(ctl.sweep_at(t1 + Duration::from_secs(170)), 0);
    assert!(ctl.contains("a"));
}

#[test]
fn sweep_evicts_only_idle_visitors() {
    let ctl = controller();
    let t0 = Instant::now();
    ctl.check_at("stale", t0);
    ctl.check_at("fresh", t0 + Duration::from_secs(120));

    let evicted = ctl.sweep_at(t0 + Duration::from_secs(181));
    assert_eq!(evicted, 1);
    assert!(!ctl.contains("stale"));
    assert!(ctl.contains("fresh"));
}

#[test]
fn evicted_visitor_comes_back_with_full_bucket() {
    let ctl = controller();
    let t0 = Instant::now();
    for _ in 0..3 {
        ctl.check_at("a", t0);
    }
    let later = t0 + Duration::from_secs(200);
    ctl.sweep_at(later);
    assert!(ctl.is_empty());
    for _ in 0..3 {
        assert!(ctl.check_at("a", later));
    }
}

#[test]
fn janitor_thread_sweeps_in_background() {
    let cfg = AdmissionConfig {
        sweep_interval_secs: 1,
        idle_secs: 0,
        ..AdmissionConfig::default()
    };
    let ctl = AdmissionController::start(&cfg).unwrap();
    ctl.check_at("gone", Instant::now());
    assert!(ctl.contains("gone"));

    let deadline = Instant::now() + Duration::from_secs(10);
    while ctl.contains("gone") && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
    }
    assert!(!ctl.contains("gone"));
}

#[test]
fn concurrent_checks_never_over_admit() {
    let ctl = Arc::new(controller());
    let t0 = Instant::now();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ctl = Arc::clone(&ctl);
            std::thread::spawn(move || (0..4).filter(|_| ctl.check_at("shared", t0)).count())
        })
        .collect();
    let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(admitted, 3);
}
