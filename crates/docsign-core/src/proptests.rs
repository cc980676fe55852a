use crate::geometry::{resolve, target_rect};
use crate::orchestrator::{validate_box, BoxInput};
use crate::SignError;
use proptest::prelude::*;
use shared_types::NormalizedBox;

// ============================================================
// Strategies
// ============================================================

/// Boxes with area after clamping; some fields deliberately out of range
fn placement_box() -> impl Strategy<Value = NormalizedBox> {
    (-0.5f64..1.5, -0.5f64..1.5, 0.01f64..1.5, 0.01f64..1.5)
        .prop_map(|(x, y, width, height)| NormalizedBox::new(x, y, width, height))
}

fn page_size() -> impl Strategy<Value = (f64, f64)> {
    (50.0f64..3000.0, 50.0f64..3000.0)
}

fn aspect() -> impl Strategy<Value = f64> {
    0.01f64..100.0
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // ============================================================
    // Geometry Resolver
    // ============================================================

    /// Property: the drawn rectangle never leaves the target rectangle
    #[test]
    fn placement_contained_in_target(
        target in placement_box(),
        (page_width, page_height) in page_size(),
        image_aspect in aspect(),
    ) {
        let area = target_rect(&target, page_width, page_height).unwrap();
        let rect = resolve(&target, page_width, page_height, image_aspect).unwrap();
        let tolerance = 1e-9 * page_width.max(page_height);
        prop_assert!(area.contains(&rect, tolerance), "{:?} not inside {:?}", rect, area);
    }

    /// Property: the drawn rectangle keeps the image aspect ratio
    #[test]
    fn placement_preserves_aspect(
        target in placement_box(),
        (page_width, page_height) in page_size(),
        image_aspect in aspect(),
    ) {
        let rect = resolve(&target, page_width, page_height, image_aspect).unwrap();
        let relative = (rect.aspect_ratio() - image_aspect).abs() / image_aspect;
        prop_assert!(relative < 1e-6, "aspect {} vs {}", rect.aspect_ratio(), image_aspect);
    }

    /// Property: the drawn rectangle touches the target on at least one axis
    #[test]
    fn placement_fills_one_axis(
        target in placement_box(),
        (page_width, page_height) in page_size(),
        image_aspect in aspect(),
    ) {
        let area = target_rect(&target, page_width, page_height).unwrap();
        let rect = resolve(&target, page_width, page_height, image_aspect).unwrap();
        let fills_width = (rect.width - area.width).abs() < 1e-9 * area.width;
        let fills_height = (rect.height - area.height).abs() < 1e-9 * area.height;
        prop_assert!(fills_width || fills_height);
    }

    /// Property: clamping makes out-of-range input equivalent to its clamped form
    #[test]
    fn resolve_is_clamp_invariant(
        target in placement_box(),
        (page_width, page_height) in page_size(),
        image_aspect in aspect(),
    ) {
        prop_assert_eq!(
            resolve(&target, page_width, page_height, image_aspect),
            resolve(&target.clamped(), page_width, page_height, image_aspect)
        );
    }

    // ============================================================
    // Box validation
    // ============================================================

    /// Property: a validated box always lies in the unit square with area
    #[test]
    fn validated_box_is_normalized(
        x in -10.0f64..10.0,
        y in -10.0f64..10.0,
        width in -10.0f64..10.0,
        height in -10.0f64..10.0,
    ) {
        match validate_box(&BoxInput::new(x, y, width, height)) {
            Ok(b) => {
                prop_assert!((0.0..=1.0).contains(&b.x));
                prop_assert!((0.0..=1.0).contains(&b.y));
                prop_assert!(b.width > 0.0 && b.width <= 1.0);
                prop_assert!(b.height > 0.0 && b.height <= 1.0);
            }
            Err(e) => {
                prop_assert!(matches!(e, SignError::InvalidCoordinates(_)));
                prop_assert!(width <= 0.0 || height <= 0.0);
            }
        }
    }
}
