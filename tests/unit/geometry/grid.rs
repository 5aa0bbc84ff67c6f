//! Tests for grid dimension arithmetic, aspect locking and output sizing

#[cfg(test)]
mod tests {
    use mosaicbuild::geometry::grid::{
        aspect_ratio, clamp_dimension, locked_height, locked_width, required_tile_count,
    };
    use mosaicbuild::geometry::{GridConfig, OutputSizing};

    // Tests required tile count for the default grid with no reuse
    // Verified by using floor division
    #[test]
    fn test_required_tiles_without_repeats() {
        assert_eq!(required_tile_count(20, 20, 1), 400);
    }

    // Tests required tile count rounds up when repeats do not divide the cells
    // Verified by using floor division
    #[test]
    fn test_required_tiles_rounds_up() {
        assert_eq!(required_tile_count(20, 20, 3), 134);
        assert_eq!(required_tile_count(2, 2, 3), 2);
        assert_eq!(required_tile_count(3, 3, 9), 1);
    }

    // Tests required tile count matches ceil(w*h/r) across a range of inputs
    // Verified by dropping the rounding step
    #[test]
    fn test_required_tiles_matches_ceiling() {
        for width in 2..12_u32 {
            for height in 2..12_u32 {
                for repeats in 1..8_usize {
                    let cells = (width * height) as usize;
                    let expected = cells / repeats + usize::from(cells % repeats != 0);
                    assert_eq!(required_tile_count(width, height, repeats), expected);
                }
            }
        }
    }

    // Tests zero repeats behaves like a single use per tile
    // Verified by dividing by the raw repeat count
    #[test]
    fn test_required_tiles_zero_repeats() {
        assert_eq!(required_tile_count(4, 5, 0), 20);
    }

    // Tests locked height for a 3:2 master
    // Verified by multiplying instead of dividing
    #[test]
    fn test_locked_height_three_by_two() {
        assert_eq!(locked_height(30, 1.5), 20);
    }

    // Tests locked height rounds to nearest
    // Verified by truncating instead of rounding
    #[test]
    fn test_locked_height_rounds_to_nearest() {
        // 25 / 1.5 = 16.67
        assert_eq!(locked_height(25, 1.5), 17);
        // 10 / 0.75 = 13.33
        assert_eq!(locked_height(10, 0.75), 13);
    }

    // Tests locked height never drops below the minimum dimension
    // Verified by removing the clamp
    #[test]
    fn test_locked_height_clamped() {
        assert_eq!(locked_height(2, 10.0), 2);
        assert_eq!(locked_height(2, f64::INFINITY), 2);
    }

    // Tests locked width is the inverse of locked height
    // Verified by dividing instead of multiplying
    #[test]
    fn test_locked_width() {
        assert_eq!(locked_width(20, 1.5), 30);
        assert_eq!(locked_width(2, 0.1), 2);
    }

    // Tests aspect ratio is width over height and undefined for empty sizes
    // Verified by swapping the operands
    #[test]
    fn test_aspect_ratio() {
        assert_eq!(aspect_ratio(800, 600), Some(800.0 / 600.0));
        assert_eq!(aspect_ratio(0, 600), None);
        assert_eq!(aspect_ratio(800, 0), None);
    }

    // Tests dimension clamping to the minimum of two
    // Verified by clamping to one
    #[test]
    fn test_clamp_dimension() {
        assert_eq!(clamp_dimension(0), 2);
        assert_eq!(clamp_dimension(1), 2);
        assert_eq!(clamp_dimension(2), 2);
        assert_eq!(clamp_dimension(57), 57);
    }

    // Tests grid config defaults and clamping constructor
    // Verified by skipping the clamp in new
    #[test]
    fn test_grid_config() {
        let default = GridConfig::default();
        assert_eq!((default.width, default.height, default.tile_repeats), (20, 20, 1));
        assert_eq!(default.required_tiles(), 400);

        let clamped = GridConfig::new(1, 0, 0);
        assert_eq!((clamped.width, clamped.height, clamped.tile_repeats), (2, 2, 1));
        assert_eq!(clamped.cell_count(), 4);
    }

    // Tests output size is base size times upscale
    // Verified by ignoring the upscale factor
    #[test]
    fn test_output_size_upscaled() {
        let mut sizing = OutputSizing::new(3);
        assert_eq!(sizing.output_size(), None);

        sizing.set_base_size((800, 600));
        assert_eq!(sizing.output_size(), Some((2400, 1800)));
    }

    // Tests upscale is clamped to the supported range
    // Verified by storing the raw value
    #[test]
    fn test_upscale_clamped() {
        let mut sizing = OutputSizing::new(0);
        assert_eq!(sizing.upscale(), 1);

        sizing.set_upscale(25);
        assert_eq!(sizing.upscale(), 10);

        sizing.set_upscale(4);
        assert_eq!(sizing.upscale(), 4);
    }

    // Tests clearing the base size makes output size unknown again
    // Verified by leaving the base size in place
    #[test]
    fn test_clear_base_size() {
        let mut sizing = OutputSizing::default();
        sizing.set_base_size((640, 480));
        assert!(sizing.aspect_ratio().is_some());

        sizing.clear_base_size();
        assert_eq!(sizing.base_size(), None);
        assert_eq!(sizing.output_size(), None);
        assert_eq!(sizing.aspect_ratio(), None);
    }
}
