use super::*;
use crate::timing::event_queue::EventKind;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Start,
    Perform(f64, u32),
    End,
    Dispose,
}

#[derive(Clone, Default)]
struct Recorder(Rc<RefCell<Vec<Call>>>);

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    fn performed(&self) -> Vec<f64> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Perform(t, _) => Some(t),
                _ => None,
            })
            .collect()
    }
}

impl Animation for Recorder {
    fn start(&mut self) {
        self.0.borrow_mut().push(Call::Start);
    }

    fn perform(&mut self, t: f64, repeat: u32) {
        self.0.borrow_mut().push(Call::Perform(t, repeat));
    }

    fn end(&mut self) {
        self.0.borrow_mut().push(Call::End);
    }

    fn dispose(&mut self) {
        self.0.borrow_mut().push(Call::Dispose);
    }
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn activity(params: ActivityParams) -> (Activity, Recorder, TimerEventQueue) {
    let rec = Recorder::default();
    let mut queue = TimerEventQueue::new();
    let mut act = Activity::new(params, Box::new(rec.clone()), None).unwrap();
    let ev = queue.make_event(EventKind::TransitionEnded { slide: 1 });
    act.activate(ev);
    (act, rec, queue)
}

fn params(duration_ms: u64) -> ActivityParams {
    ActivityParams {
        duration: ms(duration_ms),
        ..Default::default()
    }
}

#[test]
fn accelerated_time_is_identity_when_fractions_overflow() {
    for i in 0..=20 {
        let nt = f64::from(i) / 20.0;
        assert_eq!(calc_accelerated_time(nt, 0.7, 0.6), nt);
        assert_eq!(calc_accelerated_time(nt, 0.0, 0.0), nt);
    }
}

#[test]
fn accelerated_time_hits_endpoints_and_is_monotonic() {
    let (a, d) = (0.3, 0.2);
    assert_eq!(calc_accelerated_time(0.0, a, d), 0.0);
    assert!((calc_accelerated_time(1.0, a, d) - 1.0).abs() < 1e-12);
    let mut prev = 0.0;
    for i in 0..=100 {
        let t = calc_accelerated_time(f64::from(i) / 100.0, a, d);
        assert!(t >= prev);
        assert!((0.0..=1.0).contains(&t));
        prev = t;
    }
}

#[test]
fn accelerated_time_matches_closed_form_in_linear_segment() {
    let (a, d) = (0.2, 0.2);
    let c = 1.0 - a / 2.0 - d / 2.0;
    let nt = 0.5;
    let expected = (a / 2.0 + (nt - a)) / c;
    assert!((calc_accelerated_time(nt, a, d) - expected).abs() < 1e-12);
}

#[test]
fn overflowing_fractions_are_zeroed_at_construction() {
    let (act, _, _) = activity(ActivityParams {
        acceleration: 0.8,
        deceleration: 0.5,
        ..params(100)
    });
    assert_eq!(act.params().acceleration, 0.0);
    assert_eq!(act.params().deceleration, 0.0);
}

#[test]
fn invalid_params_are_rejected() {
    let rec = Recorder::default();
    let bad = ActivityParams {
        repeat_count: -1.0,
        ..Default::default()
    };
    assert!(Activity::new(bad, Box::new(rec.clone()), None).is_err());
    let bad = ActivityParams {
        acceleration: -0.5,
        ..Default::default()
    };
    assert!(Activity::new(bad, Box::new(rec.clone()), None).is_err());
    let bad = ActivityParams {
        deceleration: f64::NAN,
        ..Default::default()
    };
    assert!(Activity::new(bad, Box::new(rec), None).is_err());
}

#[test]
fn single_fraction_above_one_falls_back_to_linear() {
    let rec = Recorder::default();
    let p = ActivityParams {
        acceleration: 1.5,
        ..params(1000)
    };
    assert!(p.validate().is_ok());
    let act = Activity::new(p, Box::new(rec), None).expect("linear fallback");
    assert_eq!(act.params().acceleration, 0.0);
    assert_eq!(act.params().deceleration, 0.0);
}

#[test]
fn first_perform_starts_animation_once() {
    let (mut act, rec, mut q) = activity(params(1000));
    assert!(act.is_first_perform_call());
    assert!(act.perform(ms(5000), &mut q));
    assert!(act.perform(ms(5100), &mut q));
    let starts = rec.calls().iter().filter(|c| **c == Call::Start).count();
    assert_eq!(starts, 1);
    assert_eq!(rec.calls()[0], Call::Start);
    assert!(!act.is_first_perform_call());
}

#[test]
fn progress_is_monotonic_and_clamped_and_ends_once() {
    let (mut act, rec, mut q) = activity(params(1000));
    let mut prev = 0.0;
    let times = [0, 100, 90, 400, 400, 999, 1000, 1500];
    for &now in &times {
        act.perform(ms(now), &mut q);
        let p = act.progress();
        assert!(p >= prev, "progress went backwards at {now}");
        assert!((0.0..=1.0).contains(&p));
        prev = p;
    }
    assert!(!act.is_active());
    let ts = rec.performed();
    assert!(ts.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(*ts.last().unwrap(), 1.0);
    assert_eq!(rec.calls().iter().filter(|c| **c == Call::End).count(), 1);

    let events = q.process_events(ms(2000));
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::TransitionEnded { slide: 1 });
}

#[test]
fn perform_returns_false_when_inactive() {
    let (mut act, rec, mut q) = activity(params(10));
    act.dispose();
    assert!(!act.perform(ms(0), &mut q));
    assert!(rec.performed().is_empty());
}

#[test]
fn forced_end_starts_then_finishes_and_enqueues_once() {
    let (mut act, rec, mut q) = activity(params(1000));
    act.end(ms(10), &mut q);
    act.end(ms(20), &mut q);
    assert_eq!(
        rec.calls(),
        vec![Call::Start, Call::Perform(1.0, 0), Call::End]
    );
    assert_eq!(q.len(), 1);
    assert!(!act.is_active());
}

#[test]
fn dispose_releases_end_event_without_enqueuing() {
    let (mut act, rec, mut q) = activity(params(1000));
    act.perform(ms(0), &mut q);
    act.dispose();
    act.end(ms(50), &mut q);
    assert!(q.is_empty());
    assert_eq!(rec.calls().last(), Some(&Call::Dispose));
    assert!(!rec.calls().contains(&Call::End));
}

#[test]
fn repeats_restart_simple_time() {
    let (mut act, rec, mut q) = activity(ActivityParams {
        repeat_count: 2.0,
        ..params(100)
    });
    act.perform(ms(0), &mut q);
    act.perform(ms(50), &mut q);
    act.perform(ms(150), &mut q);
    assert!(act.is_active());
    assert!(!act.perform(ms(200), &mut q));
    let calls: Vec<_> = rec
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Perform(..)))
        .collect();
    assert_eq!(
        calls,
        vec![
            Call::Perform(0.0, 0),
            Call::Perform(0.5, 0),
            Call::Perform(0.5, 1),
            Call::Perform(1.0, 1),
        ]
    );
}

#[test]
fn auto_reverse_runs_back_to_start() {
    let (mut act, rec, mut q) = activity(ActivityParams {
        auto_reverse: true,
        ..params(100)
    });
    act.perform(ms(0), &mut q);
    act.perform(ms(100), &mut q);
    act.perform(ms(150), &mut q);
    assert!(!act.perform(ms(200), &mut q));
    assert_eq!(rec.performed(), vec![0.0, 1.0, 0.5, 0.0]);
}

#[test]
fn zero_repeat_count_never_ends_naturally() {
    let (mut act, _, mut q) = activity(ActivityParams {
        repeat_count: 0.0,
        ..params(100)
    });
    assert!(!act.is_repeat_count_valid());
    for now in (0..5000).step_by(250) {
        assert!(act.perform(ms(now), &mut q));
    }
    assert!(q.is_empty());
}

#[test]
fn initial_lag_shifts_start() {
    let (mut act, rec, mut q) = activity(ActivityParams {
        initial_lag: ms(50),
        ..params(100)
    });
    act.perform(ms(1000), &mut q);
    assert_eq!(rec.performed(), vec![0.5]);
}
