// Quality planner tests

use scan_pdf::plan::{EncodingPlan, ResampleQuality, emergency_plan, plan_for, portrait_height};

// ============================================================
// 1. Step table
// ============================================================

#[test]
fn test_plan_matches_step_table() {
    let cases: &[(u32, f32, u32)] = &[
        (1, 0.88, 1700),
        (6, 0.88, 1700),
        (7, 0.82, 1500),
        (12, 0.82, 1500),
        (13, 0.75, 1300),
        (20, 0.75, 1300),
        (21, 0.70, 1100),
        (30, 0.70, 1100),
        (31, 0.60, 900),
        (50, 0.60, 900),
    ];
    for &(count, quality, max_width) in cases {
        let plan = plan_for(count);
        assert_eq!(plan.quality, quality, "quality for {count} images");
        assert_eq!(plan.max_width, max_width, "max_width for {count} images");
        assert_eq!(plan.max_height, portrait_height(max_width));
        assert_eq!(plan.resample, ResampleQuality::High);
    }
}

#[test]
fn test_plan_is_monotonic() {
    let mut previous = plan_for(1);
    for count in 2..=100 {
        let plan = plan_for(count);
        assert!(plan.quality <= previous.quality, "quality rose at {count}");
        assert!(plan.max_width <= previous.max_width, "width rose at {count}");
        previous = plan;
    }
}

// ============================================================
// 2. Purity
// ============================================================

#[test]
fn test_plan_is_idempotent() {
    for count in [0, 1, 7, 13, 21, 31, 1000] {
        assert_eq!(plan_for(count), plan_for(count));
    }
}

#[test]
fn test_plan_callable_concurrently() {
    let handles: Vec<_> = (0..8)
        .map(|i| std::thread::spawn(move || plan_for(i * 5)))
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let plan = handle.join().expect("thread");
        assert_eq!(plan, plan_for(i as u32 * 5));
    }
}

// ============================================================
// 3. Concrete scenario and emergency settings
// ============================================================

#[test]
fn test_twenty_five_images_plan() {
    let plan = plan_for(25);
    assert_eq!(plan.quality, 0.70);
    assert_eq!(plan.max_width, 1100);
    assert_eq!(plan.max_height, 1571);
    assert_eq!(plan.jpeg_quality(), 70);
}

#[test]
fn test_emergency_plan_settings() {
    let plan = emergency_plan(800, 0.5);
    assert_eq!(
        plan,
        EncodingPlan {
            quality: 0.5,
            max_width: 800,
            max_height: 1143,
            resample: ResampleQuality::Medium,
        }
    );
    assert_eq!(plan.jpeg_quality(), 50);
}
