use loaf_system_rotator::{Rotator, RotatorConfig, RotatorInput, SpeedStage, Strike};

const FRAME: f32 = 1.0 / 60.0;

const PUSH_POSITIVE: RotatorInput = RotatorInput {
    push_positive: true,
    push_negative: false,
};

const PUSH_NEGATIVE: RotatorInput = RotatorInput {
    push_positive: false,
    push_negative: true,
};

fn run(rotator: &mut Rotator, frames: usize, input: RotatorInput) -> Vec<Strike> {
    (0..frames)
        .filter_map(|_| rotator.step(FRAME, input))
        .collect()
}

#[test]
fn idle_swing_never_strikes() {
    let mut rotator = Rotator::default();
    let strikes = run(&mut rotator, 300, RotatorInput::default());

    assert!(strikes.is_empty(), "a gentle swing is not a strike: {strikes:?}");
    assert_eq!(rotator.stage(), SpeedStage::First);
    assert!(rotator.angular_velocity().abs() < 2.0);
}

#[test]
fn sustained_spin_reaches_top_stage() {
    let mut rotator = Rotator::default();
    let strikes = run(&mut rotator, 720, PUSH_POSITIVE);

    assert_eq!(rotator.stage(), SpeedStage::Third);
    assert_eq!(rotator.revolutions(), (12, 0));
    assert!((rotator.angular_velocity() - 12.0).abs() < 1e-3);

    let first = strikes.first().expect("spinning strikes");
    let last = strikes.last().expect("spinning strikes");
    assert_eq!(first.power(), 1);
    assert_eq!(last.power(), 3);
    assert!(strikes.iter().all(|strike| strike.angular_velocity > 0.0));
}

#[test]
fn negative_spin_mirrors_positive_spin() {
    let mut rotator = Rotator::default();
    let strikes = run(&mut rotator, 720, PUSH_NEGATIVE);

    assert_eq!(rotator.stage(), SpeedStage::Third);
    assert_eq!(rotator.revolutions(), (0, 12));
    assert!((rotator.angular_velocity() + 12.0).abs() < 1e-3);
    assert!(strikes.iter().all(|strike| strike.angular_velocity < 0.0));
}

#[test]
fn stage_caps_velocity() {
    let mut rotator = Rotator::default();
    let _ = run(&mut rotator, 60, PUSH_POSITIVE);

    assert_eq!(rotator.stage(), SpeedStage::First);
    assert!(rotator.angular_velocity() <= rotator.config().max_velocities[0]);
}

#[test]
fn releasing_lets_the_tool_settle() {
    let mut rotator = Rotator::default();
    let _ = run(&mut rotator, 720, PUSH_POSITIVE);
    let _ = run(&mut rotator, 1800, RotatorInput::default());

    assert_eq!(rotator.stage(), SpeedStage::First);
    assert_eq!(rotator.revolutions(), (0, 0));
    assert!(rotator.angular_velocity().abs() < 1.0);
}

#[test]
fn non_positive_dt_uses_one_frame() {
    let mut fallback = Rotator::default();
    let mut explicit = Rotator::default();
    for _ in 0..30 {
        let _ = fallback.step(0.0, PUSH_POSITIVE);
        let _ = explicit.step(FRAME, PUSH_POSITIVE);
    }
    assert_eq!(fallback.angle(), explicit.angle());
    assert_eq!(fallback.angular_velocity(), explicit.angular_velocity());
}

#[test]
fn rebound_reverses_and_weakens() {
    let mut rotator = Rotator::default();
    let _ = run(&mut rotator, 60, PUSH_POSITIVE);
    let before = rotator.angular_velocity();

    rotator.rebound();

    assert!((rotator.angular_velocity() + before * 0.2).abs() < 1e-5);
}

#[test]
fn head_hangs_below_anchor_at_rest() {
    let rotator = Rotator::new(RotatorConfig {
        start_angle: 0.0,
        ..RotatorConfig::default()
    });
    let direction = rotator.head_direction();
    assert!(direction.x.abs() < f32::EPSILON);
    assert!((direction.y - 1.0).abs() < f32::EPSILON);
}
