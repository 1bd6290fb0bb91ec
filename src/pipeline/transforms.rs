//! Shape-transform functions of the built-in block types.
//!
//! Every block type reads its configuration through a small parameter record
//! whose `from_config` falls back to the documented default for any missing
//! or ill-typed key. The shape functions are total: they never panic, and a
//! shape with fewer dimensions than a block expects is indexed defensively.

use crate::pipeline::config::BlockConfig;
use crate::pipeline::shape::Shape;

/// Signature shared by all shape-transform functions.
pub type ShapeFn = fn(&Shape, &BlockConfig) -> Shape;

/// Index of the time axis: 0 for rank ≤ 2, `rank - 2` for windowed data.
pub fn time_axis(rank: usize) -> usize {
    if rank <= 2 {
        0
    } else {
        rank - 2
    }
}

/// Product of `dims`, pinned at `usize::MAX` instead of overflowing.
pub fn saturating_product(dims: &[usize]) -> usize {
    dims.iter().fold(1, |acc, d| acc.saturating_mul(*d))
}

pub fn identity(input: &Shape, _config: &BlockConfig) -> Shape {
    input.clone()
}

// ==================== Loaders ====================

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLoaderParams {
    pub samples: usize,
    pub channels: usize,
}

impl SeriesLoaderParams {
    fn from_config(config: &BlockConfig, channel_key: &str, default_channels: usize) -> Self {
        Self {
            samples: config.get_usize("samples").unwrap_or(1000),
            channels: config.get_usize(channel_key).unwrap_or(default_channels),
        }
    }

    fn shape(&self) -> Shape {
        Shape::from([self.samples, self.channels])
    }
}

pub fn imu_loader(_input: &Shape, config: &BlockConfig) -> Shape {
    SeriesLoaderParams::from_config(config, "channels", 6).shape()
}

pub fn csi_loader(_input: &Shape, config: &BlockConfig) -> Shape {
    SeriesLoaderParams::from_config(config, "subcarriers", 128).shape()
}

pub fn mfcw_loader(_input: &Shape, config: &BlockConfig) -> Shape {
    SeriesLoaderParams::from_config(config, "bins", 256).shape()
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameParams {
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl FrameParams {
    pub fn from_config(config: &BlockConfig) -> Self {
        Self {
            height: config.get_usize("height").unwrap_or(224),
            width: config.get_usize("width").unwrap_or(224),
            channels: config.get_usize("channels").unwrap_or(3),
        }
    }
}

pub fn image_loader(_input: &Shape, config: &BlockConfig) -> Shape {
    let p = FrameParams::from_config(config);
    Shape::from([p.height, p.width, p.channels])
}

pub fn video_loader(_input: &Shape, config: &BlockConfig) -> Shape {
    let p = FrameParams::from_config(config);
    let frames = config.get_usize("frames").unwrap_or(30);
    Shape::from([frames, p.height, p.width, p.channels])
}

// ==================== Extractors ====================

/// CSI amplitude/phase: the interleaved complex last dimension is halved.
pub fn halve_last_dim(input: &Shape, _config: &BlockConfig) -> Shape {
    match input.last_dim() {
        Some(last) => input.clone().with_last_dim(last / 2),
        None => input.clone(),
    }
}

/// Collapse each group of `axes` channels into one magnitude channel.
pub fn vector_magnitude(input: &Shape, config: &BlockConfig) -> Shape {
    let axes = config.get_usize("axes").filter(|a| *a > 0).unwrap_or(3);
    match input.last_dim() {
        Some(last) => input.clone().with_last_dim((last / axes).max(1)),
        None => input.clone(),
    }
}

// ==================== Filters ====================

/// Two subcarrier ranges `[start1, end1)` and `[start2, end2)` are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct SubcarrierRanges {
    pub start1: usize,
    pub end1: usize,
    pub start2: usize,
    pub end2: usize,
}

impl SubcarrierRanges {
    pub fn from_config(config: &BlockConfig) -> Self {
        Self {
            start1: config.get_usize("start1").unwrap_or(5),
            end1: config.get_usize("end1").unwrap_or(32),
            start2: config.get_usize("start2").unwrap_or(33),
            end2: config.get_usize("end2").unwrap_or(60),
        }
    }

    pub fn kept(&self) -> usize {
        self.end1
            .saturating_sub(self.start1)
            .saturating_add(self.end2.saturating_sub(self.start2))
    }
}

pub fn subcarrier_filter(input: &Shape, config: &BlockConfig) -> Shape {
    if input.rank() == 0 {
        return input.clone();
    }
    input
        .clone()
        .with_last_dim(SubcarrierRanges::from_config(config).kept())
}

// ==================== Transforms ====================

#[derive(Debug, Clone, PartialEq)]
pub struct WindowParams {
    pub window_size: usize,
    pub overlap: f64,
}

impl WindowParams {
    pub fn from_config(config: &BlockConfig) -> Self {
        let window_size = config
            .get_usize("window_size")
            .filter(|w| *w > 0)
            .unwrap_or(100);
        let overlap = config
            .get_f64("overlap")
            .filter(|o| (0.0..1.0).contains(o))
            .unwrap_or(0.5);
        Self {
            window_size,
            overlap,
        }
    }

    pub fn step(&self) -> usize {
        ((self.window_size as f64 * (1.0 - self.overlap)).floor() as usize).max(1)
    }

    /// Number of complete windows over `samples` time steps.
    pub fn num_windows(&self, samples: usize) -> usize {
        if samples < self.window_size {
            0
        } else {
            (samples - self.window_size) / self.step() + 1
        }
    }
}

/// `[n, rest..]` → `[n_windows, window_size, rest..]`.
pub fn windowing(input: &Shape, config: &BlockConfig) -> Shape {
    let Some((&samples, rest)) = input.dims().split_first() else {
        return input.clone();
    };
    let params = WindowParams::from_config(config);
    let mut dims = vec![params.num_windows(samples), params.window_size];
    dims.extend_from_slice(rest);
    Shape::new(dims)
}

/// `[d0, d1, .., dn]` → `[d0, d1 * .. * dn]`.
pub fn flatten(input: &Shape, _config: &BlockConfig) -> Shape {
    match input.dims().split_first() {
        Some((&first, rest)) if !rest.is_empty() => {
            Shape::from([first, saturating_product(rest)])
        }
        _ => input.clone(),
    }
}

/// Replaces the time axis with `n_fft / 2 + 1` frequency bins.
pub fn fft(input: &Shape, config: &BlockConfig) -> Shape {
    if input.rank() == 0 {
        return input.clone();
    }
    let n_fft = config.get_usize("n_fft").filter(|n| *n > 0).unwrap_or(256);
    let mut dims = input.dims().to_vec();
    let axis = time_axis(dims.len());
    dims[axis] = n_fft / 2 + 1;
    Shape::new(dims)
}

pub fn downsample(input: &Shape, config: &BlockConfig) -> Shape {
    if input.rank() == 0 {
        return input.clone();
    }
    let factor = config.get_usize("factor").filter(|f| *f > 0).unwrap_or(2);
    let mut dims = input.dims().to_vec();
    let axis = time_axis(dims.len());
    dims[axis] = dims[axis].div_ceil(factor);
    Shape::new(dims)
}

pub const DEFAULT_FEATURES: [&str; 4] = ["mean", "std", "min", "max"];

/// Statistical features computed over the time axis.
pub fn feature_extraction(input: &Shape, config: &BlockConfig) -> Shape {
    let n_features = config
        .get_str_list("features")
        .map(|f| f.len())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_FEATURES.len());
    let dims = input.dims();
    match dims.len() {
        0 => input.clone(),
        1 => Shape::from([n_features]),
        2 => Shape::from([1, n_features.saturating_mul(dims[1])]),
        rank => {
            let axis = time_axis(rank);
            let mut out: Vec<usize> = dims
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != axis)
                .map(|(_, d)| *d)
                .collect();
            if let Some(last) = out.last_mut() {
                *last = last.saturating_mul(n_features);
            }
            Shape::new(out)
        }
    }
}

/// Each sample is replicated `copies` times with noise.
pub fn data_augmentation(input: &Shape, config: &BlockConfig) -> Shape {
    if input.rank() == 0 {
        return input.clone();
    }
    let copies = config.get_usize("copies").filter(|c| *c > 0).unwrap_or(2);
    let mut dims = input.dims().to_vec();
    dims[0] = dims[0].saturating_mul(copies);
    Shape::new(dims)
}

pub fn pca(input: &Shape, config: &BlockConfig) -> Shape {
    let components = config
        .get_usize("components")
        .filter(|c| *c > 0)
        .unwrap_or(32);
    match input.last_dim() {
        Some(last) => input.clone().with_last_dim(components.min(last)),
        None => input.clone(),
    }
}
