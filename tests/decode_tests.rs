//! End-to-end decoding of hand-built payloads

mod common;

use common::{flat_tiles, BitWriter};
use texpak::{decode, decode_bytes, decode_with_stats, Raster, TextureHeader};

fn header(width: u32, height: u32, has_alpha: bool) -> TextureHeader {
    TextureHeader {
        width,
        height,
        compressed_size: 0,
        thumb_width: 0,
        thumb_height: 0,
        flags: if has_alpha { 0x80 } else { 0 },
        has_alpha,
        data_start: 0,
    }
}

fn is_uniform(raster: &Raster, rgba: [u8; 4]) -> bool {
    raster.pixels().chunks_exact(4).all(|p| p == rgba)
}

#[test]
fn test_flat_tile_colors() {
    let gray = decode_bytes(&header(8, 8, false), &flat_tiles(&[[100, 0, 0, 0]], false)).unwrap();
    assert!(is_uniform(&gray, [100, 100, 100, 255]));

    let tinted =
        decode_bytes(&header(8, 8, false), &flat_tiles(&[[50, 20, -10, 0]], false)).unwrap();
    assert!(is_uniform(&tinted, [78, 39, 32, 255]));
}

#[test]
fn test_output_matches_header_dimensions() {
    for (width, height) in [(1, 1), (8, 8), (9, 7), (24, 16), (33, 1)] {
        let raster = decode(&header(width, height, false), &[]).unwrap();
        assert_eq!(raster.width(), width);
        assert_eq!(raster.height(), height);
        assert_eq!(raster.pixels().len(), (width * height * 4) as usize);
    }
}

#[test]
fn test_dc_carries_across_tiles() {
    let payload = flat_tiles(&[[100, 0, 0, 0], [50, 0, 0, 0]], false);
    let raster = decode_bytes(&header(16, 8, false), &payload).unwrap();

    assert_eq!(raster.pixel(0, 0), [100, 100, 100, 255]);
    assert_eq!(raster.pixel(7, 7), [100, 100, 100, 255]);
    assert_eq!(raster.pixel(8, 0), [50, 50, 50, 255]);
    assert_eq!(raster.pixel(15, 7), [50, 50, 50, 255]);
}

#[test]
fn test_partial_edge_tiles() {
    let tiles = [[10, 0, 0, 0], [20, 0, 0, 0], [30, 0, 0, 0], [40, 0, 0, 0]];
    let (raster, stats) = decode_with_stats(
        &header(12, 10, false),
        &texpak::decode::words_from_le_bytes(&flat_tiles(&tiles, false)),
    )
    .unwrap();

    assert_eq!(stats.tiles, 4);
    assert_eq!(stats.flat_blocks, 12);
    assert_eq!(stats.overrun_bits, 0);
    assert_eq!(raster.pixel(7, 7)[0], 10);
    assert_eq!(raster.pixel(8, 0)[0], 20);
    assert_eq!(raster.pixel(0, 8)[0], 30);
    assert_eq!(raster.pixel(11, 9)[0], 40);
}

#[test]
fn test_alpha_plane() {
    let translucent =
        decode_bytes(&header(8, 8, true), &flat_tiles(&[[100, 0, 0, 200]], true)).unwrap();
    assert!(is_uniform(&translucent, [100, 100, 100, 200]));

    let saturated =
        decode_bytes(&header(8, 8, true), &flat_tiles(&[[100, 0, 0, 300]], true)).unwrap();
    assert!(is_uniform(&saturated, [100, 100, 100, 255]));

    let clear = decode_bytes(&header(8, 8, true), &flat_tiles(&[[100, 0, 0, -5]], true)).unwrap();
    assert!(is_uniform(&clear, [100, 100, 100, 0]));
}

#[test]
fn test_opaque_entries_ignore_alpha_values() {
    // The fourth value is never encoded without the alpha flag
    let raster =
        decode_bytes(&header(8, 8, false), &flat_tiles(&[[100, 0, 0, 17]], false)).unwrap();
    assert!(raster.pixels().chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn test_dc_only_coded_block_matches_flat() {
    let mut writer = BitWriter::new();
    writer.coded(100, &[]).flat(0).flat(0);
    let (coded, stats) = decode_with_stats(&header(8, 8, false), &writer.into_words()).unwrap();
    assert_eq!(stats.coded_blocks, 1);

    let flat = decode_bytes(&header(8, 8, false), &flat_tiles(&[[100, 0, 0, 0]], false)).unwrap();
    assert_eq!(coded, flat);
}

#[test]
fn test_run_past_last_coefficient_matches_flat() {
    // Run 63 steps past the last coefficient, leaving only DC for the transform
    let mut writer = BitWriter::new();
    writer.coded_start(100).escape(63, 1);
    writer.flat(0).flat(0);
    let (coded, stats) = decode_with_stats(&header(8, 8, false), &writer.into_words()).unwrap();

    assert_eq!(stats.coded_blocks, 1);
    assert_eq!(stats.flat_blocks, 2);
    assert_eq!(stats.escape_codes, 1);

    let flat = decode_bytes(&header(8, 8, false), &flat_tiles(&[[100, 0, 0, 0]], false)).unwrap();
    assert_eq!(coded, flat);
}

#[test]
fn test_horizontal_coefficient() {
    let mut writer = BitWriter::new();
    writer.coded(100, &[(0, 1)]).flat(0).flat(0);
    let raster = decode(&header(8, 8, false), &writer.into_words()).unwrap();

    for y in 0..8 {
        for x in 0..8 {
            let p = raster.pixel(x, y);
            assert_eq!(p, raster.pixel(x, 0), "rows must match");
            assert_eq!(p[0], p[1]);
            assert_eq!(p[1], p[2]);
            assert!((95..=105).contains(&p[0]), "sample {} at {x}", p[0]);
        }
    }
    assert!(raster.pixel(0, 0)[0] > raster.pixel(7, 0)[0]);
}

#[test]
fn test_vertical_coefficient() {
    // Zig-zag index 2 is the first vertical frequency
    let mut writer = BitWriter::new();
    writer.coded(100, &[(1, -1)]).flat(0).flat(0);
    let raster = decode(&header(8, 8, false), &writer.into_words()).unwrap();

    for y in 0..8 {
        assert!(
            raster
                .pixels()
                .chunks_exact(4)
                .skip(y * 8)
                .take(8)
                .all(|p| p == raster.pixel(0, y as u32)),
            "row {y} must be uniform"
        );
    }
    assert!(raster.pixel(0, 0)[0] < raster.pixel(0, 7)[0]);
}

#[test]
fn test_escape_coefficients() {
    let mut writer = BitWriter::new();
    writer
        .coded(128, &[(0, 200), (2, -200), (5, 90)])
        .flat(0)
        .flat(0);
    let (raster, stats) = decode_with_stats(&header(8, 8, false), &writer.into_words()).unwrap();

    assert_eq!(stats.escape_codes, 3);
    assert_eq!(stats.coded_blocks, 1);
    assert!(!is_uniform(&raster, raster.pixel(0, 0)));
}

#[test]
fn test_chroma_coded_block() {
    // Luma flat, Cr carries texture: red and green vary, blue stays put
    let mut writer = BitWriter::new();
    writer.flat(128).coded(0, &[(0, 2), (0, 1)]).flat(0);
    let (raster, stats) = decode_with_stats(&header(8, 8, false), &writer.into_words()).unwrap();

    assert_eq!(stats.flat_blocks, 2);
    assert!(raster.pixels().chunks_exact(4).all(|p| p[2] == 128));
    assert_ne!(raster.pixel(0, 0)[0], raster.pixel(7, 0)[0]);
}

#[test]
fn test_truncated_payload_decodes() {
    // Only the first of four tiles is present
    let payload = flat_tiles(&[[90, 0, 0, 0]], false);
    let (raster, stats) = decode_with_stats(
        &header(16, 16, false),
        &texpak::decode::words_from_le_bytes(&payload),
    )
    .unwrap();

    assert_eq!(stats.tiles, 4);
    assert!(stats.overrun_bits > 0);
    assert_eq!(raster.pixel(0, 0), [90, 90, 90, 255]);
}

#[test]
fn test_decode_is_deterministic() {
    let mut writer = BitWriter::new();
    for _ in 0..4 {
        writer.coded(3, &[(0, 5), (3, -2), (0, 40)]).flat(-2).coded(1, &[(6, 1)]);
    }
    let words = writer.into_words();
    let head = header(16, 16, false);

    assert_eq!(decode(&head, &words).unwrap(), decode(&head, &words).unwrap());
}
