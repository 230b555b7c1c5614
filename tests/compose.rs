use std::io::Cursor;

use ringframe::{
    CompletionOutcome, CpuSurface, FrameProfile, FrameRgba, PreparedImage, Session,
    StandardDecoder,
};

fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn default_session() -> Session {
    Session::new(
        FrameProfile::default(),
        Box::new(CpuSurface::new(1080, 1080).unwrap()),
        Box::new(StandardDecoder),
    )
    .unwrap()
}

fn px(frame: &FrameRgba, x: u32, y: u32) -> [u8; 4] {
    let idx = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[idx],
        frame.data[idx + 1],
        frame.data[idx + 2],
        frame.data[idx + 3],
    ]
}

#[test]
fn full_pipeline_masks_photo_and_exports_transparent_corners() {
    let mut session = default_session();

    let ticket = session.begin_selection();
    let outcome = session
        .complete_selection(ticket, &png_bytes(200, 100, [255, 0, 0, 255]))
        .unwrap();
    assert_eq!(outcome, CompletionOutcome::Composited);

    let frame = session.frame().unwrap();
    assert_eq!((frame.width, frame.height), (1080, 1080));
    // Inside the circle the wide photo is center-cropped to solid red.
    assert_eq!(px(&frame, 540, 540), [255, 0, 0, 255]);
    assert_eq!(px(&frame, 540, 80)[3], 255, "top of circle is covered");
    // Outside the 500 px mask everything stays transparent.
    assert_eq!(px(&frame, 0, 0)[3], 0);
    assert_eq!(px(&frame, 1079, 0)[3], 0);
    assert_eq!(px(&frame, 540, 20)[3], 0, "inset ring stays transparent");

    // The exported PNG carries the same pixels.
    let exported = session.export_png().unwrap();
    let decoded = image::load_from_memory(&exported).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (1080, 1080));
    assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    assert_eq!(decoded.get_pixel(540, 540).0, [255, 0, 0, 255]);
}

#[test]
fn overlay_sits_on_top_of_the_masked_photo() {
    let mut session = default_session();

    // Opaque center texel, transparent elsewhere: the middle of a 3x3
    // overlay covers the canvas center once scaled by 1.09.
    let mut overlay_rgba = vec![0u8; 3 * 3 * 4];
    let dot = (1 * 3 + 1) * 4;
    overlay_rgba[dot..dot + 4].copy_from_slice(&[0, 0, 255, 255]);
    let overlay = PreparedImage::from_straight_rgba8(3, 3, overlay_rgba).unwrap();
    session.install_overlay(overlay).unwrap();

    let ticket = session.begin_selection();
    session
        .complete_selection(ticket, &png_bytes(300, 300, [255, 0, 0, 255]))
        .unwrap();

    let frame = session.frame().unwrap();
    // Overlay wins at the center (bilinear edges allow a hair of slack).
    let center = px(&frame, 540, 540);
    assert!(center[2] >= 250 && center[3] >= 250 && center[0] <= 5, "{center:?}");
    // Far from the dot's texel footprint the photo shows through exactly.
    assert_eq!(px(&frame, 100, 540), [255, 0, 0, 255]);
}

#[test]
fn deferred_overlay_fires_after_composite() {
    let mut session = default_session();

    let ticket = session.begin_selection();
    session
        .complete_selection(ticket, &png_bytes(300, 300, [255, 0, 0, 255]))
        .unwrap();
    let before = session.frame().unwrap();
    assert_eq!(px(&before, 540, 540), [255, 0, 0, 255]);

    let overlay = PreparedImage::from_straight_rgba8(1, 1, vec![0, 255, 0, 255]).unwrap();
    session.install_overlay(overlay).unwrap();

    let after = session.frame().unwrap();
    assert_eq!(px(&after, 540, 540), [0, 255, 0, 255]);
    // The overlay overdraws past the canvas, so even the corners take it.
    assert_eq!(px(&after, 0, 0), [0, 255, 0, 255]);
}

#[test]
fn data_url_export_matches_file_export_pixels() {
    let mut session = default_session();
    let ticket = session.begin_selection();
    session
        .complete_selection(ticket, &png_bytes(64, 64, [12, 34, 56, 255]))
        .unwrap();

    let url = session.export_png_data_url().unwrap();
    let payload = url.strip_prefix("data:image/png;base64,").unwrap();

    use base64::Engine as _;
    let from_url = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .unwrap();
    let a = image::load_from_memory(&from_url).unwrap().to_rgba8();
    let b = image::load_from_memory(&session.export_png().unwrap())
        .unwrap()
        .to_rgba8();
    assert_eq!(a.as_raw(), b.as_raw());
}
