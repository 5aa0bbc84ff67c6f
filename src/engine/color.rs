//! Palette transfer and histogram equalization across image sets

use crate::protocol::ColorMatching;
use image::RgbImage;

/// Per-channel mean and standard deviation of a set of images
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelStats {
    /// Mean of each RGB channel
    pub mean: [f32; 3],
    /// Standard deviation of each RGB channel
    pub std: [f32; 3],
}

impl ChannelStats {
    /// Pool the pixels of every image into one distribution
    pub fn of(images: &[RgbImage]) -> Self {
        let mut sum = [0.0_f64; 3];
        let mut count = 0_u64;
        for pixel in images.iter().flat_map(|img| img.pixels()) {
            for (total, &channel) in sum.iter_mut().zip(pixel.0.iter()) {
                *total += f64::from(channel);
            }
            count += 1;
        }

        if count == 0 {
            return Self {
                mean: [0.0; 3],
                std: [0.0; 3],
            };
        }

        let mean = sum.map(|total| total / count as f64);
        let mut squared = [0.0_f64; 3];
        for pixel in images.iter().flat_map(|img| img.pixels()) {
            for ((total, &channel), &centre) in
                squared.iter_mut().zip(pixel.0.iter()).zip(mean.iter())
            {
                let deviation = f64::from(channel) - centre;
                *total = deviation.mul_add(deviation, *total);
            }
        }

        Self {
            mean: mean.map(|value| value as f32),
            std: squared.map(|total| (total / count as f64).sqrt() as f32),
        }
    }
}

/// Shift an image from the `source` distribution to the `target` one
pub fn transfer(img: &RgbImage, source: &ChannelStats, target: &ChannelStats) -> RgbImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        for (i, channel) in pixel.0.iter_mut().enumerate() {
            let (Some(&src_mean), Some(&src_std), Some(&tgt_mean), Some(&tgt_std)) = (
                source.mean.get(i),
                source.std.get(i),
                target.mean.get(i),
                target.std.get(i),
            ) else {
                continue;
            };
            let value = if src_std > 0.0 {
                ((f32::from(*channel) - src_mean) / src_std).mul_add(tgt_std, tgt_mean)
            } else {
                // Flat source channel carries no contrast to rescale
                tgt_mean
            };
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Equalize a set of images against their pooled per-channel histogram
pub fn equalize(images: &[RgbImage]) -> Vec<RgbImage> {
    let mut histograms = [[0_u64; 256]; 3];
    let mut total = 0_u64;
    for pixel in images.iter().flat_map(|img| img.pixels()) {
        for (histogram, &channel) in histograms.iter_mut().zip(pixel.0.iter()) {
            if let Some(bin) = histogram.get_mut(usize::from(channel)) {
                *bin += 1;
            }
        }
        total += 1;
    }

    if total == 0 {
        return images.to_vec();
    }

    let lookup = histograms.map(|histogram| {
        let mut table = [0_u8; 256];
        let mut cumulative = 0_u64;
        for (entry, count) in table.iter_mut().zip(histogram.iter()) {
            cumulative += count;
            *entry = ((cumulative * 255) / total) as u8;
        }
        table
    });

    images
        .iter()
        .map(|img| {
            let mut out = img.clone();
            for pixel in out.pixels_mut() {
                for (channel, table) in pixel.0.iter_mut().zip(lookup.iter()) {
                    *channel = table.get(usize::from(*channel)).copied().unwrap_or(*channel);
                }
            }
            out
        })
        .collect()
}

/// Apply the requested colour matching to the master and tiles
pub fn apply(
    method: ColorMatching,
    master: RgbImage,
    tiles: Vec<RgbImage>,
) -> (RgbImage, Vec<RgbImage>) {
    match method {
        ColorMatching::None => (master, tiles),
        ColorMatching::Equalize => {
            let master = equalize(std::slice::from_ref(&master))
                .pop()
                .unwrap_or(master);
            (master, equalize(&tiles))
        }
        ColorMatching::MasterToTile => {
            let source = ChannelStats::of(&tiles);
            let target = ChannelStats::of(std::slice::from_ref(&master));
            let tiles = tiles
                .iter()
                .map(|tile| transfer(tile, &source, &target))
                .collect();
            (master, tiles)
        }
        ColorMatching::TileToMaster => {
            let source = ChannelStats::of(std::slice::from_ref(&master));
            let target = ChannelStats::of(&tiles);
            (transfer(&master, &source, &target), tiles)
        }
    }
}
