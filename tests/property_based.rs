// Property tests for the filter engine and the history laws, over random
// buffers and parameter combinations.

use proptest::prelude::*;

use retouch::buffer::{Channels, PixelBuffer};
use retouch::ops::adjustments::{brightness, grayscale};
use retouch::ops::transform::{flip, resize, rotate, FlipAxis, RotationAngle};
use retouch::session::EditorSession;
use retouch::state::{recompute, Adjustments};
use retouch::EditorError;

fn buffer_strategy() -> impl Strategy<Value = PixelBuffer> {
    (1u32..=24, 1u32..=24, any::<bool>()).prop_flat_map(|(w, h, gray)| {
        let channels = if gray { Channels::Gray } else { Channels::Rgb };
        let len = (w * h) as usize * channels.count();
        prop::collection::vec(any::<u8>(), len)
            .prop_map(move |data| PixelBuffer::from_raw(w, h, channels, data).unwrap())
    })
}

fn params_strategy() -> impl Strategy<Value = Adjustments> {
    (0u32..=3, -100i32..=100, 0.5f32..=3.0, any::<bool>()).prop_map(
        |(blur_level, brightness, contrast, grayscale_on)| Adjustments {
            blur_level,
            brightness,
            contrast,
            grayscale_on,
        },
    )
}

/// A discrete edit step for the history-law test.
#[derive(Clone, Debug)]
enum Step {
    Rotate(i64),
    Flip(FlipAxis),
    Resize(i64, i64),
    Grayscale,
    Edges,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        prop_oneof![Just(90i64), Just(180), Just(270)].prop_map(Step::Rotate),
        prop_oneof![Just(FlipAxis::Horizontal), Just(FlipAxis::Vertical)].prop_map(Step::Flip),
        (4i64..=16, 4i64..=16).prop_map(|(w, h)| Step::Resize(w, h)),
        Just(Step::Grayscale),
        Just(Step::Edges),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    #[test]
    fn recompute_is_referentially_consistent(
        base in buffer_strategy(),
        params in params_strategy(),
    ) {
        let first = recompute(&base, &params);
        let second = recompute(&base, &params);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn four_quarter_turns_are_identity(buf in buffer_strategy()) {
        let mut out = buf.clone();
        for _ in 0..4 {
            out = rotate(&out, RotationAngle::Cw90);
        }
        prop_assert_eq!(out, buf);
    }

    #[test]
    fn opposite_quarter_turns_cancel(buf in buffer_strategy()) {
        let turned = rotate(&buf, RotationAngle::Cw90);
        let back = rotate(&turned, RotationAngle::Cw270);
        prop_assert_eq!(back, buf);
    }

    #[test]
    fn flips_are_involutions(buf in buffer_strategy()) {
        prop_assert_eq!(flip(&flip(&buf, FlipAxis::Horizontal), FlipAxis::Horizontal), buf.clone());
        prop_assert_eq!(flip(&flip(&buf, FlipAxis::Vertical), FlipAxis::Vertical), buf);
    }

    #[test]
    fn brightness_never_wraps(buf in buffer_strategy(), delta in -100i32..=100) {
        let out = brightness(&buf, delta);
        for (&a, &b) in buf.data().iter().zip(out.data()) {
            // Clamping keeps the adjustment monotone: a positive delta never
            // produces a darker sample, a negative one never a brighter one.
            if delta >= 0 {
                prop_assert!(b >= a);
            } else {
                prop_assert!(b <= a);
            }
        }
    }

    #[test]
    fn grayscale_is_idempotent_everywhere(buf in buffer_strategy()) {
        let once = grayscale(&buf);
        prop_assert_eq!(grayscale(&once), once.clone());
        prop_assert_eq!(once.channels(), Channels::Gray);
    }

    #[test]
    fn resize_rejects_zero_and_hits_exact_targets(
        buf in buffer_strategy(),
        w in 1u32..=32,
        h in 1u32..=32,
    ) {
        prop_assert!(matches!(resize(&buf, 0, h), Err(EditorError::InvalidParameter(_))));
        prop_assert!(matches!(resize(&buf, w, 0), Err(EditorError::InvalidParameter(_))));
        let out = resize(&buf, w, h).unwrap();
        prop_assert_eq!((out.width(), out.height()), (w, h));
    }

    #[test]
    fn undoing_everything_returns_to_the_loaded_image(
        buf in buffer_strategy(),
        steps in prop::collection::vec(step_strategy(), 1..6),
    ) {
        let mut session = EditorSession::new();
        session.load_buffer(buf.clone());

        for step in &steps {
            match step {
                Step::Rotate(deg) => session.rotate(*deg).unwrap(),
                Step::Flip(axis) => session.flip(*axis).unwrap(),
                Step::Resize(w, h) => session.resize(*w, *h).unwrap(),
                Step::Grayscale => session.toggle_grayscale().unwrap(),
                Step::Edges => session.edge_detect(100.0, 200.0).unwrap(),
            }
        }

        // Each discrete step committed exactly one snapshot.
        prop_assert_eq!(session.history().undo_count(), steps.len() + 1);

        for _ in 0..steps.len() {
            session.undo().unwrap();
        }
        prop_assert_eq!(session.displayed().unwrap(), &buf);
        prop_assert!(matches!(session.undo(), Err(EditorError::NothingToUndo)));
    }
}
