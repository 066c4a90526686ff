use super::*;

#[path = "../../support/fixtures.rs"]
mod fixtures;

use fixtures::{GifFrameSpec, encode_gif, encode_png, solid, three_frame_gif};

#[test]
fn decodes_frames_offsets_and_delays() {
    let anim = decode_animation(&three_frame_gif()).unwrap();
    assert_eq!(anim.len(), 3);
    assert_eq!(anim.delays_cs(), &[10, 20, 30]);
    assert_eq!(anim.frames()[1].rect, Rect::from_origin_size(1, 1, 2, 2));
    assert_eq!(anim.frames()[1].rgba, solid(2, 2, [0, 255, 0, 255]));
    assert_eq!(anim.bounds(), Rect::from_origin_size(0, 0, 4, 4));
}

#[test]
fn maps_disposal_methods() {
    let mut frames = vec![
        GifFrameSpec::solid(0, 0, 2, 2, [9, 9, 9, 255], 1),
        GifFrameSpec::solid(0, 0, 1, 1, [8, 8, 8, 255], 1),
        GifFrameSpec::solid(0, 0, 1, 1, [7, 7, 7, 255], 1),
    ];
    frames[0].dispose = gif::DisposalMethod::Background;
    frames[1].dispose = gif::DisposalMethod::Previous;
    frames[2].dispose = gif::DisposalMethod::Any;
    let anim = decode_animation(&encode_gif(2, 2, &frames)).unwrap();
    let disposals: Vec<_> = anim.frames().iter().map(|f| f.disposal).collect();
    assert_eq!(
        disposals,
        vec![Disposal::Background, Disposal::Previous, Disposal::Keep]
    );
}

#[test]
fn transparent_pixels_decode_with_zero_alpha() {
    let mut rgba = solid(2, 1, [200, 10, 10, 255]);
    rgba[4..8].copy_from_slice(&[0, 0, 0, 0]);
    let spec = GifFrameSpec {
        rgba,
        ..GifFrameSpec::solid(0, 0, 2, 1, [0, 0, 0, 0], 0)
    };
    let anim = decode_animation(&encode_gif(2, 1, &[spec])).unwrap();
    assert_eq!(anim.frames()[0].rgba[3], 255);
    assert_eq!(anim.frames()[0].rgba[7], 0);
}

#[test]
fn garbage_bytes_are_a_decode_error() {
    assert!(matches!(
        decode_animation(b"definitely not a gif"),
        Err(GiftermError::Decode(_))
    ));
}

#[test]
fn gif_without_frames_is_empty_sequence() {
    let bytes = encode_gif(2, 2, &[]);
    assert!(matches!(
        decode_animation(&bytes),
        Err(GiftermError::EmptySequence)
    ));
}

#[test]
fn new_validates_parallel_delays_and_buffer_sizes() {
    let frame = RawFrame::new(0, 0, 1, 1, vec![1, 2, 3, 255]);
    assert!(matches!(
        AnimatedImage::new(vec![frame.clone()], vec![]),
        Err(GiftermError::Validation(_))
    ));
    assert!(matches!(
        AnimatedImage::new(vec![RawFrame::new(0, 0, 2, 2, vec![0; 4])], vec![0]),
        Err(GiftermError::Decode(_))
    ));
    assert!(matches!(
        AnimatedImage::new(vec![], vec![]),
        Err(GiftermError::EmptySequence)
    ));
    assert!(AnimatedImage::new(vec![frame], vec![0]).is_ok());
}

#[test]
fn bounds_cover_every_placement() {
    let anim = AnimatedImage::new(
        vec![
            RawFrame::new(0, 0, 2, 2, vec![0; 16]),
            RawFrame::new(3, 1, 2, 4, vec![0; 32]),
        ],
        vec![0, 0],
    )
    .unwrap();
    assert_eq!(anim.bounds(), Rect { x0: 0, y0: 0, x1: 5, y1: 5 });
}

#[test]
fn offset_frames_do_not_inflate_the_canvas() {
    let bytes = encode_gif(
        6001,
        6001,
        &[
            GifFrameSpec::solid(6000, 6000, 1, 1, [255, 0, 0, 255], 5),
            GifFrameSpec::solid(6000, 6000, 1, 1, [0, 0, 255, 255], 5),
        ],
    );
    let anim = decode_animation(&bytes).unwrap();
    assert_eq!(anim.bounds(), Rect::from_origin_size(6000, 6000, 1, 1));

    let frames = crate::composite::compositor::Compositor::default()
        .composite(&anim)
        .unwrap();
    assert_eq!(frames[0].image.dimensions(), (1, 1));
    assert_eq!(frames[0].image.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(frames[1].image.get_pixel(0, 0).0, [0, 0, 255, 255]);
}

#[test]
fn oversized_canvas_is_rejected() {
    let err = AnimatedImage::new(
        vec![
            RawFrame::new(0, 0, 1, 1, vec![0; 4]),
            RawFrame::new(60000, 60000, 1, 1, vec![0; 4]),
        ],
        vec![0, 0],
    )
    .unwrap_err();
    assert!(matches!(err, GiftermError::Decode(_)));
    assert!(err.to_string().contains("exceeds"));
}

#[test]
fn decode_still_png() {
    let png = encode_png(2, 1, solid(2, 1, [1, 2, 3, 255]));
    let img = decode_still(&png).unwrap();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.get_pixel(1, 0).0, [1, 2, 3, 255]);
    assert!(decode_still(b"nope").is_err());
}
