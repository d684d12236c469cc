//! End-to-end planning tests: field of view -> grid -> mask.

use image::{GrayImage, Luma};

use sem_montage::geometry::{plan_montage, tile_size, MontageSpec, StagePosition};
use sem_montage::mask::{apply_mask, rasterize, TileMask};

fn reference_spec() -> MontageSpec {
    // The canonical worked example: 6400 x 9000 nm montage of 1000 nm tiles
    // at 0.2 overlap -> 800 nm steps -> 8 rows x 11 cols -> 88 tiles.
    MontageSpec {
        start: StagePosition::new(0, 0),
        total_height_nm: 6_400,
        total_width_nm: 9_000,
        tile_height_nm: 1_000.0,
        tile_width_nm: 1_000.0,
        overlap: 0.2,
    }
}

#[test]
fn test_reference_montage_has_88_tiles() {
    let plan = plan_montage(&reference_spec()).unwrap();
    assert_eq!(plan.rows(), 8);
    assert_eq!(plan.cols(), 11);
    assert_eq!(plan.positions().len(), 88);
}

#[test]
fn test_field_of_view_feeds_planner() {
    // At mag 1000 with factor 4 the field of view is 508 x 381 nm.
    let tile = tile_size(1_000.0, 4.0).unwrap();
    assert_eq!(tile.width_nm, 508.0);
    assert_eq!(tile.height_nm, 381.0);

    let plan = plan_montage(&MontageSpec {
        start: StagePosition::new(0, 0),
        total_height_nm: 3_810,
        total_width_nm: 5_080,
        tile_height_nm: tile.height_nm,
        tile_width_nm: tile.width_nm,
        overlap: 0.0,
    })
    .unwrap();

    assert_eq!(plan.rows(), 10);
    assert_eq!(plan.cols(), 10);
}

#[test]
fn test_all_true_mask_preserves_plan() {
    let plan = plan_montage(&reference_spec()).unwrap();
    let mask = TileMask::filled(plan.rows(), plan.cols(), true);

    let flags = mask.visitation_order();
    assert_eq!(flags.len(), plan.positions().len());
    assert!(flags.iter().all(|&f| f));

    let positions = apply_mask(&plan, &mask).unwrap();
    assert_eq!(positions, plan.positions());
}

#[test]
fn test_rasterized_mask_selects_spatially_correct_tiles() {
    let plan = plan_montage(&reference_spec()).unwrap();

    // Bitmap with only its bottom-left quadrant white. The bottom of the
    // image maps to scan row 0, so only tiles with small x and small y may
    // be selected.
    let img = image::DynamicImage::ImageLuma8(GrayImage::from_fn(88, 64, |x, y| {
        if x < 40 && y >= 32 {
            Luma([255])
        } else {
            Luma([0])
        }
    }));
    let mask = rasterize(&img, plan.rows(), plan.cols());
    let positions = apply_mask(&plan, &mask).unwrap();

    assert!(!positions.is_empty());
    for position in &positions {
        assert!(
            position.x < 5 * 800,
            "selected tile outside left half: {position:?}"
        );
        assert!(
            position.y < 4 * 800,
            "selected tile outside bottom rows: {position:?}"
        );
    }
}

#[test]
fn test_mismatched_mask_aborts_planning() {
    let plan = plan_montage(&reference_spec()).unwrap();
    let mask = TileMask::filled(4, 4, true);
    assert!(apply_mask(&plan, &mask).is_err());
}
