//! Tests for palette statistics, transfer and equalization

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};
    use mosaicbuild::engine::color::{ChannelStats, apply, equalize, transfer};
    use mosaicbuild::protocol::ColorMatching;

    fn solid(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(2, 2, Rgb(color))
    }

    fn two_tone(low: u8, high: u8) -> RgbImage {
        RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([low; 3]) } else { Rgb([high; 3]) })
    }

    // Tests pooled statistics across several images
    // Verified by averaging per image instead of per pixel
    #[test]
    fn test_channel_stats_pooled() {
        let stats = ChannelStats::of(&[solid([0, 100, 200]), solid([100, 100, 0])]);
        assert!((stats.mean[0] - 50.0).abs() < 1e-4);
        assert!((stats.mean[1] - 100.0).abs() < 1e-4);
        assert!((stats.std[0] - 50.0).abs() < 1e-4);
        assert!(stats.std[1].abs() < 1e-4);
    }

    // Tests statistics of an empty set are zero
    // Verified by dividing by the zero pixel count
    #[test]
    fn test_channel_stats_empty() {
        let stats = ChannelStats::of(&[]);
        assert_eq!(stats.mean, [0.0; 3]);
        assert_eq!(stats.std, [0.0; 3]);
    }

    // Tests transfer maps the source distribution onto the target
    // Verified by skipping the standard deviation rescale
    #[test]
    fn test_transfer_matches_target() {
        let img = two_tone(100, 200);
        let source = ChannelStats::of(std::slice::from_ref(&img));
        let target = ChannelStats::of(&[two_tone(0, 50)]);

        let out = transfer(&img, &source, &target);
        assert_eq!(*out.get_pixel(0, 0), Rgb([0; 3]));
        assert_eq!(*out.get_pixel(1, 0), Rgb([50; 3]));
    }

    // Tests a flat source channel becomes the target mean
    // Verified by dividing by a zero deviation
    #[test]
    fn test_transfer_flat_source() {
        let img = solid([10, 10, 10]);
        let source = ChannelStats::of(std::slice::from_ref(&img));
        let target = ChannelStats::of(&[two_tone(100, 120)]);

        let out = transfer(&img, &source, &target);
        assert_eq!(*out.get_pixel(0, 0), Rgb([110; 3]));
    }

    // Tests equalization stretches values to span the range
    // Verified by normalising per image
    #[test]
    fn test_equalize_spreads_values() {
        let out = equalize(&[two_tone(100, 101)]);
        assert_eq!(*out[0].get_pixel(0, 0), Rgb([127; 3]));
        assert_eq!(*out[0].get_pixel(1, 0), Rgb([255; 3]));
    }

    // Tests each matching mode changes only the intended side
    // Verified by transferring in the wrong direction
    #[test]
    fn test_apply_directions() {
        let master = two_tone(0, 100);
        let tiles = vec![two_tone(200, 220)];

        let (same_master, same_tiles) = apply(ColorMatching::None, master.clone(), tiles.clone());
        assert_eq!(same_master, master);
        assert_eq!(same_tiles, tiles);

        let (kept_master, moved_tiles) =
            apply(ColorMatching::MasterToTile, master.clone(), tiles.clone());
        assert_eq!(kept_master, master);
        assert_eq!(moved_tiles[0], master);

        let (moved_master, kept_tiles) =
            apply(ColorMatching::TileToMaster, master, tiles.clone());
        assert_eq!(kept_tiles, tiles);
        assert_eq!(moved_master, tiles[0]);
    }

    // Tests equalize mode processes master and tiles
    // Verified by equalizing only the tiles
    #[test]
    fn test_apply_equalize() {
        let (master, tiles) = apply(
            ColorMatching::Equalize,
            two_tone(10, 11),
            vec![two_tone(30, 31)],
        );
        assert_eq!(*master.get_pixel(1, 0), Rgb([255; 3]));
        assert_eq!(*tiles[0].get_pixel(1, 0), Rgb([255; 3]));
    }
}
