//! Cell-to-tile distance metrics and the distance matrix

use crate::protocol::Metric;
use image::{Rgb, RgbImage};
use ndarray::Array2;

/// Signature shared by every metric
pub type MetricFn = fn(&RgbImage, &RgbImage) -> i64;

/// Sum of absolute channel differences
pub fn norm_l1(a: &RgbImage, b: &RgbImage) -> i64 {
    a.pixels().zip(b.pixels()).fold(0, |sum, (p, q)| {
        sum + p
            .0
            .iter()
            .zip(q.0.iter())
            .map(|(&x, &y)| i64::from(x.abs_diff(y)))
            .sum::<i64>()
    })
}

/// Sum of squared channel differences, without the square root
pub fn norm_l2(a: &RgbImage, b: &RgbImage) -> i64 {
    a.pixels().zip(b.pixels()).fold(0, |sum, (p, q)| {
        sum + p
            .0
            .iter()
            .zip(q.0.iter())
            .map(|(&x, &y)| i64::from(x.abs_diff(y)).pow(2))
            .sum::<i64>()
    })
}

fn luminance(pixel: &Rgb<u8>) -> i64 {
    let [r, g, b] = pixel.0;
    0.114_f64.mul_add(
        f64::from(b),
        0.299_f64.mul_add(f64::from(r), 0.587 * f64::from(g)),
    ) as i64
}

/// Sum of absolute luminance differences
pub fn luminance_l1(a: &RgbImage, b: &RgbImage) -> i64 {
    a.pixels()
        .zip(b.pixels())
        .fold(0, |sum, (p, q)| sum + (luminance(p) - luminance(q)).abs())
}

/// Root of summed squared luminance differences
pub fn luminance_l2(a: &RgbImage, b: &RgbImage) -> i64 {
    a.pixels()
        .zip(b.pixels())
        .fold(0_i64, |sum, (p, q)| sum + (luminance(p) - luminance(q)).pow(2))
        .isqrt()
}

/// Per-channel difference of channel sums, normalised by pixel count
pub fn avg_color(a: &RgbImage, b: &RgbImage) -> i64 {
    let channel_sums = |img: &RgbImage| {
        img.pixels().fold([0_i64; 3], |mut sums, pixel| {
            for (sum, &channel) in sums.iter_mut().zip(pixel.0.iter()) {
                *sum += i64::from(channel);
            }
            sums
        })
    };
    let difference: i64 = channel_sums(a)
        .iter()
        .zip(channel_sums(b).iter())
        .map(|(x, y)| (x - y).abs())
        .sum();
    let pixels = i64::from(a.width()) * i64::from(a.height());
    if pixels == 0 {
        0
    } else {
        difference / (3 * pixels)
    }
}

/// Function implementing a metric choice
pub const fn metric_fn(metric: Metric) -> MetricFn {
    match metric {
        Metric::NormL1 => norm_l1,
        Metric::NormL2 => norm_l2,
        Metric::LuminanceL1 => luminance_l1,
        Metric::LuminanceL2 => luminance_l2,
        Metric::AvgColor => avg_color,
    }
}

/// Distance of every cell (rows) to every tile (columns)
pub fn distance_matrix(cells: &[RgbImage], tiles: &[RgbImage], metric: Metric) -> Array2<i64> {
    let distance = metric_fn(metric);
    Array2::from_shape_fn((cells.len(), tiles.len()), |(row, column)| {
        match (cells.get(row), tiles.get(column)) {
            (Some(cell), Some(tile)) => distance(cell, tile),
            _ => 0,
        }
    })
}
