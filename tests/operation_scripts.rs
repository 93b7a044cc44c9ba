//! Integration tests for the operation scripts
//!
//! Every script is driven through `EditorContext::run_one_sync` against the
//! stub client, and the recorded calls are checked for order and content.

use ndarray::{Array3, Array4};
use skill_nodes::ops_prelude::*;
use skill_nodes::{RecolorRequest, RecordedCall, Skill, StubSkillClient};
use std::sync::Arc;

fn session(stub: StubSkillClient) -> (EditorContext, Arc<StubSkillClient>) {
    let stub = Arc::new(stub);
    (EditorContext::from_arc(stub.clone()), stub)
}

fn rgb(height: usize, width: usize) -> ImageTensor {
    Array4::from_shape_fn((1, height, width, 3), |(_, y, x, c)| {
        ((y * 16 + x * 4 + c) % 256) as f32 / 255.0
    })
}

fn rgba(height: usize, width: usize) -> ImageTensor {
    Array4::from_shape_fn((1, height, width, 4), |(_, y, x, c)| {
        if c == 3 {
            1.0
        } else {
            ((y * 8 + x * 2 + c) % 256) as f32 / 255.0
        }
    })
}

fn mask(height: usize, width: usize) -> MaskTensor {
    Array3::from_shape_fn((1, height, width), |(_, y, x)| if x > y { 1.0 } else { 0.0 })
}

const BBOX: BoundingBox = BoundingBox::new(2, 3, 40, 50);

fn erase_options(mode: Mode, seed: i64) -> erase::EraseOptions {
    erase::EraseOptions { mode, seed }
}

fn blend_options() -> blend::BlendOptions {
    blend::BlendOptions {
        bbox: BBOX,
        flip: false,
        rotation_angle: 0.0,
        mode: Mode::Standard,
        seed: 1,
    }
}

// ============================================================================
// Call sequences
// ============================================================================

#[test]
fn test_segment_uncropped_makes_one_call() {
    let (ctx, stub) = session(StubSkillClient::new());
    let params = segment::Params {
        image: "img".into(),
        options: segment::SegmentOptions {
            bbox: BBOX,
            cropped: false,
        },
    };

    ctx.run_one_sync(segment::run, params).unwrap();

    assert_eq!(
        stub.calls(),
        vec![RecordedCall::Segment(skill_nodes::SegmentRequest {
            state_id: "img".into(),
            bbox: BBOX,
        })]
    );
}

#[test]
fn test_segment_cropped_crops_the_mask_with_the_same_box() {
    let (ctx, stub) = session(StubSkillClient::new());
    let params = segment::Params {
        image: "img".into(),
        options: segment::SegmentOptions {
            bbox: BBOX,
            cropped: true,
        },
    };

    let cropped = ctx.run_one_sync(segment::run, params).unwrap();

    let calls = stub.calls();
    assert_eq!(stub.skills_called(), vec![Skill::Segment, Skill::Crop]);
    let RecordedCall::Crop(crop) = &calls[1] else {
        panic!("second call should be a crop, got {:?}", calls[1]);
    };
    assert_eq!(crop.bbox, BBOX);
    assert_ne!(crop.state_id.as_str(), "img");
    assert_ne!(cropped, crop.state_id);
}

#[test]
fn test_shadow_without_background_makes_one_call() {
    for bgcolor in [None, Some("transparent".to_string())] {
        let (ctx, stub) = session(StubSkillClient::new());
        let mut options = shadow::ShadowOptions::new(512, 256);
        options.bgcolor = bgcolor.clone();
        let params = shadow::Params {
            cutout: "cutout".into(),
            options,
        };

        ctx.run_one_sync(shadow::run, params).unwrap();

        assert_eq!(stub.skills_called(), vec![Skill::Shadow], "bgcolor {bgcolor:?}");
    }
}

#[test]
fn test_shadow_with_background_sets_it_on_the_shadow() {
    let (ctx, stub) = session(StubSkillClient::new());
    let mut options = shadow::ShadowOptions::new(512, 256);
    options.bgcolor = Some("#00ff00".to_string());
    options.seed = 12;
    let params = shadow::Params {
        cutout: "cutout".into(),
        options,
    };

    ctx.run_one_sync(shadow::run, params).unwrap();

    let calls = stub.calls();
    assert_eq!(stub.skills_called(), vec![Skill::Shadow, Skill::SetBackgroundColor]);
    let RecordedCall::Shadow(request) = &calls[0] else {
        panic!("first call should be a shadow");
    };
    assert_eq!(request.resolution, (512, 256));
    assert_eq!(request.seed, 12);
    let RecordedCall::SetBackgroundColor(background) = &calls[1] else {
        panic!("second call should set the background");
    };
    assert_eq!(background.background, "#00ff00");
    assert_ne!(background.state_id.as_str(), "cutout");
}

#[test]
fn test_high_level_erase_uploads_both_then_downloads() {
    let (ctx, stub) = session(StubSkillClient::new());
    let image = rgb(6, 5);
    let params = erase::TensorParams {
        image: image.clone(),
        mask: mask(6, 5),
        options: erase_options(Mode::Premium, 3),
    };

    let erased = ctx.run_one_sync(erase::run_tensor, params).unwrap();

    assert_eq!(
        stub.skills_called(),
        vec![Skill::Upload, Skill::Upload, Skill::Erase, Skill::Download]
    );
    // The stub echoes the uploaded image back.
    assert_eq!(erased, image);
}

#[test]
fn test_high_level_segment_returns_a_mask() {
    let (ctx, stub) = session(StubSkillClient::new());
    let params = segment::TensorParams {
        image: rgb(7, 9),
        options: segment::SegmentOptions {
            bbox: BoundingBox::new(0, 0, 4, 4),
            cropped: true,
        },
    };

    let mask = ctx.run_one_sync(segment::run_tensor, params).unwrap();

    assert_eq!(mask.dim(), (1, 7, 9));
    assert_eq!(
        stub.skills_called(),
        vec![Skill::Upload, Skill::Segment, Skill::Crop, Skill::Download]
    );
}

#[test]
fn test_high_level_blend_and_shadow() {
    let (ctx, stub) = session(StubSkillClient::new());
    let params = blend::TensorParams {
        scene: rgb(8, 8),
        cutout: rgba(4, 4),
        options: blend_options(),
    };
    let blended = ctx.run_one_sync(blend::run_tensor, params).unwrap();
    assert_eq!(blended.dim(), (1, 8, 8, 3));

    let params = shadow::TensorParams {
        cutout: rgba(4, 4),
        options: shadow::ShadowOptions::new(64, 64),
    };
    let shadowed = ctx.run_one_sync(shadow::run_tensor, params).unwrap();
    assert_eq!(shadowed.dim(), (1, 4, 4, 4));

    assert_eq!(
        stub.skills_called(),
        vec![
            Skill::Upload,
            Skill::Upload,
            Skill::Blend,
            Skill::Download,
            Skill::Upload,
            Skill::Shadow,
            Skill::Download,
        ]
    );
}

#[test]
fn test_box_and_main_subject() {
    let found = BoundingBox::new(5, 6, 7, 8);
    let (ctx, stub) = session(StubSkillClient::new().with_bbox(found));

    let params = bbox::TensorParams {
        image: rgb(4, 4),
        options: bbox::BoxOptions {
            prompt: "red mug".into(),
        },
    };
    assert_eq!(ctx.run_one_sync(bbox::run_tensor, params).unwrap(), found);

    let calls = stub.calls();
    let RecordedCall::InferBbox(request) = &calls[1] else {
        panic!("second call should infer a box");
    };
    assert_eq!(request.product_name, "red mug");

    let params = subject::Params {
        image: "photo".into(),
    };
    let name = ctx.run_one_sync(subject::run, params).unwrap();
    assert_eq!(name, "subject of photo");
}

// ============================================================================
// Validation happens before any call
// ============================================================================

#[test]
fn test_out_of_range_seeds_make_no_calls() {
    for seed in [-1, 1000, 123_456] {
        let (ctx, stub) = session(StubSkillClient::new());

        let params = erase::Params {
            image: "img".into(),
            mask: "mask".into(),
            options: erase_options(Mode::Standard, seed),
        };
        let err = ctx.run_one_sync(erase::run, params).unwrap_err();
        assert!(err.is_validation(), "erase seed {seed}: {err}");

        let params = blend::TensorParams {
            scene: rgb(4, 4),
            cutout: rgba(4, 4),
            options: blend::BlendOptions {
                seed,
                ..blend_options()
            },
        };
        assert!(ctx.run_one_sync(blend::run_tensor, params).unwrap_err().is_validation());

        let mut options = shadow::ShadowOptions::new(64, 64);
        options.seed = seed;
        let params = shadow::Params {
            cutout: "cutout".into(),
            options,
        };
        assert!(ctx.run_one_sync(shadow::run, params).unwrap_err().is_validation());

        assert_eq!(stub.call_count(), 0, "seed {seed}");
    }
}

#[test]
fn test_rotation_out_of_range_makes_no_calls() {
    let (ctx, stub) = session(StubSkillClient::new());
    for angle in [-360.5, 361.0, f64::INFINITY] {
        let params = blend::Params {
            scene: "scene".into(),
            cutout: "cutout".into(),
            options: blend::BlendOptions {
                rotation_angle: angle,
                ..blend_options()
            },
        };
        let err = ctx.run_one_sync(blend::run, params).unwrap_err();
        assert!(err.to_string().contains("Rotation angle"), "angle {angle}");
    }
    assert_eq!(stub.call_count(), 0);
}

#[test]
fn test_modes_are_checked_then_forwarded() {
    let (ctx, stub) = session(StubSkillClient::new());

    let params = blend::Params {
        scene: "scene".into(),
        cutout: "cutout".into(),
        options: blend::BlendOptions {
            mode: Mode::Premium,
            ..blend_options()
        },
    };
    assert!(ctx.run_one_sync(blend::run, params).unwrap_err().is_validation());
    assert_eq!(stub.call_count(), 0);

    let params = blend::Params {
        scene: "scene".into(),
        cutout: "cutout".into(),
        options: blend::BlendOptions {
            mode: Mode::Express,
            ..blend_options()
        },
    };
    ctx.run_one_sync(blend::run, params).unwrap();

    let params = erase::Params {
        image: "img".into(),
        mask: "mask".into(),
        options: erase_options(Mode::Premium, 0),
    };
    ctx.run_one_sync(erase::run, params).unwrap();

    let calls = stub.calls();
    let RecordedCall::Blend(blended) = &calls[0] else {
        panic!("expected a blend call");
    };
    assert_eq!(blended.mode, Mode::Express);
    let RecordedCall::Erase(erased) = &calls[1] else {
        panic!("expected an erase call");
    };
    assert_eq!(erased.mode, Mode::Premium);
}

#[test]
fn test_shadow_sides_and_prompt_make_no_calls() {
    let (ctx, stub) = session(StubSkillClient::new());

    let params = shadow::Params {
        cutout: "cutout".into(),
        options: shadow::ShadowOptions::new(7, 512),
    };
    assert!(ctx.run_one_sync(shadow::run, params).unwrap_err().is_validation());

    let params = bbox::TensorParams {
        image: rgb(4, 4),
        options: bbox::BoxOptions {
            prompt: String::new(),
        },
    };
    assert!(ctx.run_one_sync(bbox::run_tensor, params).unwrap_err().is_validation());

    assert_eq!(stub.call_count(), 0);
}

#[test]
fn test_colour_modes_are_checked_before_upload() {
    let (ctx, stub) = session(StubSkillClient::new());

    // Cutouts need an alpha channel.
    let params = blend::TensorParams {
        scene: rgb(4, 4),
        cutout: rgb(4, 4),
        options: blend_options(),
    };
    let err = ctx.run_one_sync(blend::run_tensor, params).unwrap_err();
    assert!(err.to_string().contains("Cutout must be RGBA"));

    // Plain images must not have one.
    let params = erase::TensorParams {
        image: rgba(4, 4),
        mask: mask(4, 4),
        options: erase_options(Mode::Standard, 1),
    };
    assert!(ctx.run_one_sync(erase::run_tensor, params).unwrap_err().is_validation());

    // Image and mask must line up.
    let params = recolor::TensorParams {
        image: rgb(4, 4),
        mask: mask(4, 5),
        options: recolor::RecolorOptions {
            color: "red".into(),
        },
    };
    let err = ctx.run_one_sync(recolor::run_tensor, params).unwrap_err();
    assert!(err.to_string().contains("sizes do not match"));

    assert_eq!(stub.call_count(), 0);
}

// ============================================================================
// Errors abort the pipeline
// ============================================================================

#[test]
fn test_rejected_segment_stops_before_crop() {
    let (ctx, stub) = session(StubSkillClient::new().fail(Skill::Segment, "no object found"));
    let params = segment::Params {
        image: "img".into(),
        options: segment::SegmentOptions {
            bbox: BBOX,
            cropped: true,
        },
    };

    let err = ctx.run_one_sync(segment::run, params).unwrap_err();

    match &err {
        NodeError::Skill { skill, message } => {
            assert_eq!(*skill, Skill::Segment);
            assert_eq!(message, "no object found");
        }
        other => panic!("unexpected error {other:?}"),
    }
    let text = err.to_string();
    assert!(text.contains("segment"));
    assert!(text.contains("no object found"));
    assert_eq!(stub.skills_called(), vec![Skill::Segment]);
}

#[test]
fn test_rejected_shadow_skips_background_and_download() {
    let (ctx, stub) = session(StubSkillClient::new().fail(Skill::Shadow, "cutout is empty"));
    let mut options = shadow::ShadowOptions::new(64, 64);
    options.bgcolor = Some("white".into());
    let params = shadow::TensorParams {
        cutout: rgba(4, 4),
        options,
    };

    let err = ctx.run_one_sync(shadow::run_tensor, params).unwrap_err();

    assert!(err.to_string().contains("cutout is empty"));
    assert_eq!(stub.skills_called(), vec![Skill::Upload, Skill::Shadow]);
}

#[test]
fn test_rejected_upload_names_the_upload_skill() {
    let (ctx, stub) = session(StubSkillClient::new().fail(Skill::Upload, "quota exceeded"));
    let err = ctx.run_one_sync(transfer::upload_image, rgb(2, 2)).unwrap_err();
    assert!(matches!(err, NodeError::Skill { skill: Skill::Upload, .. }));
    assert_eq!(stub.call_count(), 1);
}

#[test]
fn test_rejected_crop_skips_the_download() {
    let (ctx, stub) = session(StubSkillClient::new().fail(Skill::Crop, "box is empty"));
    let params = segment::TensorParams {
        image: rgb(6, 6),
        options: segment::SegmentOptions {
            bbox: BoundingBox::new(0, 0, 3, 3),
            cropped: true,
        },
    };

    let err = ctx.run_one_sync(segment::run_tensor, params).unwrap_err();

    assert!(matches!(err, NodeError::Skill { skill: Skill::Crop, .. }));
    let text = err.to_string();
    assert!(text.contains("crop"));
    assert!(text.contains("box is empty"));
    assert_eq!(
        stub.skills_called(),
        vec![Skill::Upload, Skill::Segment, Skill::Crop]
    );
}

#[test]
fn test_rejected_background_skips_the_download() {
    let (ctx, stub) =
        session(StubSkillClient::new().fail(Skill::SetBackgroundColor, "unknown colour"));
    let mut options = shadow::ShadowOptions::new(64, 64);
    options.bgcolor = Some("#123456".into());
    let params = shadow::TensorParams {
        cutout: rgba(4, 4),
        options,
    };

    let err = ctx.run_one_sync(shadow::run_tensor, params).unwrap_err();

    assert!(matches!(
        err,
        NodeError::Skill { skill: Skill::SetBackgroundColor, ref message } if message == "unknown colour"
    ));
    assert_eq!(
        stub.skills_called(),
        vec![Skill::Upload, Skill::Shadow, Skill::SetBackgroundColor]
    );
}

#[test]
fn test_recolor_forwards_the_colour_unchecked() {
    let (ctx, stub) = session(StubSkillClient::new());
    let params = recolor::Params {
        image: "img".into(),
        mask: "mask".into(),
        options: recolor::RecolorOptions {
            color: "not-a-hex".into(),
        },
    };

    ctx.run_one_sync(recolor::run, params).unwrap();

    assert_eq!(
        stub.calls(),
        vec![RecordedCall::Recolor(RecolorRequest {
            image_state_id: "img".into(),
            mask_state_id: "mask".into(),
            color: "not-a-hex".into(),
        })]
    );
}

// ============================================================================
// Transfers
// ============================================================================

#[test]
fn test_image_round_trip() {
    let (ctx, _stub) = session(StubSkillClient::new());
    for image in [rgb(5, 7), rgba(3, 2)] {
        let id = ctx.run_one_sync(transfer::upload_image, image.clone()).unwrap();
        let back = ctx.run_one_sync(transfer::download_image, id).unwrap();
        assert_eq!(back, image);
    }
}

#[test]
fn test_mask_round_trip() {
    let (ctx, _stub) = session(StubSkillClient::new());
    let original = mask(6, 4);
    let id = ctx.run_one_sync(transfer::upload_mask, original.clone()).unwrap();
    let back = ctx.run_one_sync(transfer::download_mask, id).unwrap();
    assert_eq!(back, original);
}

#[test]
fn test_download_of_unknown_state_is_a_skill_error() {
    let (ctx, _stub) = session(StubSkillClient::new());
    let err = ctx
        .run_one_sync(transfer::download_image, StateId::from("missing"))
        .unwrap_err();
    assert!(matches!(err, NodeError::Skill { skill: Skill::Download, .. }));
}
