//! Block-type catalogue for the pipeline editor.
//!
//! The catalogue is a static table built at compile time and never mutated.
//! Each entry pairs display metadata with a default configuration and a pure
//! shape-transform function from `pipeline::transforms`.

use crate::pipeline::config::{BlockConfig, ConfigValue};
use crate::pipeline::data_type::DataType;
use crate::pipeline::shape::Shape;
use crate::pipeline::transforms::{self, ShapeFn, DEFAULT_FEATURES};
use serde::{Deserialize, Serialize};

/// Menu grouping of block types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockCategory {
    Loaders,
    Extractors,
    Filters,
    Transforms,
    Combiners,
}

impl BlockCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            BlockCategory::Loaders => "Loaders",
            BlockCategory::Extractors => "Extractors",
            BlockCategory::Filters => "Filters",
            BlockCategory::Transforms => "Transforms",
            BlockCategory::Combiners => "Combiners",
        }
    }

    pub fn all() -> &'static [BlockCategory] {
        &[
            BlockCategory::Loaders,
            BlockCategory::Extractors,
            BlockCategory::Filters,
            BlockCategory::Transforms,
            BlockCategory::Combiners,
        ]
    }
}

impl std::fmt::Display for BlockCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// How a block derives its input shape from several upstream outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMerge {
    /// One upstream block; extra connections only use the first.
    Single,
    /// Feature concatenation: the last dimensions are summed.
    ConcatLastDim,
    /// Multi-input block without defined merge semantics; uses the first input.
    FirstInput,
}

/// Immutable registry entry describing one block type.
#[derive(Debug)]
pub struct BlockTypeDescriptor {
    pub type_id: &'static str,
    pub name: &'static str,
    pub category: BlockCategory,
    pub compatible_data_types: &'static [DataType],
    pub description: &'static str,
    /// Loader blocks: no input port, input shape is always `[0]`.
    pub is_source: bool,
    pub input_merge: InputMerge,
    defaults: fn() -> BlockConfig,
    transform: ShapeFn,
}

impl BlockTypeDescriptor {
    pub fn default_config(&self) -> BlockConfig {
        (self.defaults)()
    }

    pub fn transform_shape(&self, input: &Shape, config: &BlockConfig) -> Shape {
        (self.transform)(input, config)
    }

    pub fn accepts_multiple_inputs(&self) -> bool {
        !matches!(self.input_merge, InputMerge::Single)
    }

    pub fn is_compatible_with(&self, data_type: DataType) -> bool {
        self.compatible_data_types.contains(&data_type)
    }

    /// Case-insensitive match on id, name, category or description.
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.type_id.to_lowercase().contains(&q)
            || self.name.to_lowercase().contains(&q)
            || self.category.display_name().to_lowercase().contains(&q)
            || self.description.to_lowercase().contains(&q)
    }
}

const ALL: &[DataType] = &[
    DataType::Imu,
    DataType::Csi,
    DataType::Mfcw,
    DataType::Image,
    DataType::Video,
];
const SIGNALS: &[DataType] = &[DataType::Imu, DataType::Csi, DataType::Mfcw];

fn no_config() -> BlockConfig {
    BlockConfig::new()
}

fn imu_loader_defaults() -> BlockConfig {
    BlockConfig::new().with("samples", 1000).with("channels", 6)
}

fn csi_loader_defaults() -> BlockConfig {
    BlockConfig::new()
        .with("samples", 1000)
        .with("subcarriers", 128)
}

fn mfcw_loader_defaults() -> BlockConfig {
    BlockConfig::new().with("samples", 1000).with("bins", 256)
}

fn image_loader_defaults() -> BlockConfig {
    BlockConfig::new()
        .with("height", 224)
        .with("width", 224)
        .with("channels", 3)
}

fn video_loader_defaults() -> BlockConfig {
    image_loader_defaults().with("frames", 30)
}

fn phase_defaults() -> BlockConfig {
    BlockConfig::new().with("unwrap", true)
}

fn magnitude_defaults() -> BlockConfig {
    BlockConfig::new().with("axes", 3)
}

fn lowpass_defaults() -> BlockConfig {
    BlockConfig::new().with("cutoff", 10.0).with("order", 4)
}

fn highpass_defaults() -> BlockConfig {
    BlockConfig::new().with("cutoff", 0.5).with("order", 4)
}

fn bandpass_defaults() -> BlockConfig {
    BlockConfig::new()
        .with("low", 0.5)
        .with("high", 10.0)
        .with("order", 4)
}

fn moving_average_defaults() -> BlockConfig {
    BlockConfig::new().with("window", 5)
}

fn subcarrier_defaults() -> BlockConfig {
    BlockConfig::new()
        .with("start1", 5)
        .with("end1", 32)
        .with("start2", 33)
        .with("end2", 60)
}

fn normalize_defaults() -> BlockConfig {
    BlockConfig::new().with("min", 0.0).with("max", 1.0)
}

fn windowing_defaults() -> BlockConfig {
    BlockConfig::new()
        .with("window_size", 100)
        .with("overlap", 0.5)
}

fn fft_defaults() -> BlockConfig {
    BlockConfig::new().with("n_fft", 256)
}

fn downsample_defaults() -> BlockConfig {
    BlockConfig::new().with("factor", 2)
}

fn feature_extraction_defaults() -> BlockConfig {
    BlockConfig::new().with(
        "features",
        ConfigValue::List(DEFAULT_FEATURES.iter().map(|f| (*f).into()).collect()),
    )
}

fn augmentation_defaults() -> BlockConfig {
    BlockConfig::new()
        .with("copies", 2)
        .with("noise_std", 0.01)
}

fn pca_defaults() -> BlockConfig {
    BlockConfig::new().with("components", 32)
}

fn concat_defaults() -> BlockConfig {
    BlockConfig::new().with("axis", -1)
}

static BLOCK_TYPES: &[BlockTypeDescriptor] = &[
    // Loaders
    BlockTypeDescriptor {
        type_id: "imu_loader",
        name: "IMU Loader",
        category: BlockCategory::Loaders,
        compatible_data_types: &[DataType::Imu],
        description: "Loads accelerometer and gyroscope recordings.",
        is_source: true,
        input_merge: InputMerge::Single,
        defaults: imu_loader_defaults,
        transform: transforms::imu_loader,
    },
    BlockTypeDescriptor {
        type_id: "csi_loader",
        name: "CSI Loader",
        category: BlockCategory::Loaders,
        compatible_data_types: &[DataType::Csi],
        description: "Loads WiFi channel state information captures.",
        is_source: true,
        input_merge: InputMerge::Single,
        defaults: csi_loader_defaults,
        transform: transforms::csi_loader,
    },
    BlockTypeDescriptor {
        type_id: "mfcw_loader",
        name: "MFCW Loader",
        category: BlockCategory::Loaders,
        compatible_data_types: &[DataType::Mfcw],
        description: "Loads multi-frequency continuous-wave radar frames.",
        is_source: true,
        input_merge: InputMerge::Single,
        defaults: mfcw_loader_defaults,
        transform: transforms::mfcw_loader,
    },
    BlockTypeDescriptor {
        type_id: "image_loader",
        name: "Image Loader",
        category: BlockCategory::Loaders,
        compatible_data_types: &[DataType::Image],
        description: "Loads still camera images.",
        is_source: true,
        input_merge: InputMerge::Single,
        defaults: image_loader_defaults,
        transform: transforms::image_loader,
    },
    BlockTypeDescriptor {
        type_id: "video_loader",
        name: "Video Loader",
        category: BlockCategory::Loaders,
        compatible_data_types: &[DataType::Video],
        description: "Loads fixed-length video clips.",
        is_source: true,
        input_merge: InputMerge::Single,
        defaults: video_loader_defaults,
        transform: transforms::video_loader,
    },
    // Extractors
    BlockTypeDescriptor {
        type_id: "amplitude_extractor",
        name: "Amplitude Extractor",
        category: BlockCategory::Extractors,
        compatible_data_types: &[DataType::Csi],
        description: "Magnitude of the complex CSI values.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: no_config,
        transform: transforms::halve_last_dim,
    },
    BlockTypeDescriptor {
        type_id: "phase_extractor",
        name: "Phase Extractor",
        category: BlockCategory::Extractors,
        compatible_data_types: &[DataType::Csi],
        description: "Phase of the complex CSI values, optionally unwrapped.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: phase_defaults,
        transform: transforms::halve_last_dim,
    },
    BlockTypeDescriptor {
        type_id: "vector_magnitude",
        name: "Vector Magnitude",
        category: BlockCategory::Extractors,
        compatible_data_types: &[DataType::Imu],
        description: "Euclidean norm over each group of sensor axes.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: magnitude_defaults,
        transform: transforms::vector_magnitude,
    },
    // Filters
    BlockTypeDescriptor {
        type_id: "lowpass_filter",
        name: "Low-pass Filter",
        category: BlockCategory::Filters,
        compatible_data_types: SIGNALS,
        description: "Butterworth low-pass filter along time.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: lowpass_defaults,
        transform: transforms::identity,
    },
    BlockTypeDescriptor {
        type_id: "highpass_filter",
        name: "High-pass Filter",
        category: BlockCategory::Filters,
        compatible_data_types: SIGNALS,
        description: "Butterworth high-pass filter along time.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: highpass_defaults,
        transform: transforms::identity,
    },
    BlockTypeDescriptor {
        type_id: "bandpass_filter",
        name: "Band-pass Filter",
        category: BlockCategory::Filters,
        compatible_data_types: SIGNALS,
        description: "Butterworth band-pass filter along time.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: bandpass_defaults,
        transform: transforms::identity,
    },
    BlockTypeDescriptor {
        type_id: "moving_average",
        name: "Moving Average",
        category: BlockCategory::Filters,
        compatible_data_types: ALL,
        description: "Sliding mean smoothing; output length is preserved.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: moving_average_defaults,
        transform: transforms::identity,
    },
    BlockTypeDescriptor {
        type_id: "subcarrier_filter",
        name: "Subcarrier Filter",
        category: BlockCategory::Filters,
        compatible_data_types: &[DataType::Csi],
        description: "Keeps two subcarrier ranges and drops guard bands.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: subcarrier_defaults,
        transform: transforms::subcarrier_filter,
    },
    // Transforms
    BlockTypeDescriptor {
        type_id: "normalize",
        name: "Normalize",
        category: BlockCategory::Transforms,
        compatible_data_types: ALL,
        description: "Min-max scaling into a target range.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: normalize_defaults,
        transform: transforms::identity,
    },
    BlockTypeDescriptor {
        type_id: "standardize",
        name: "Standardize",
        category: BlockCategory::Transforms,
        compatible_data_types: ALL,
        description: "Zero mean, unit variance per channel.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: no_config,
        transform: transforms::identity,
    },
    BlockTypeDescriptor {
        type_id: "windowing",
        name: "Windowing",
        category: BlockCategory::Transforms,
        compatible_data_types: ALL,
        description: "Splits the time axis into overlapping windows.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: windowing_defaults,
        transform: transforms::windowing,
    },
    BlockTypeDescriptor {
        type_id: "flatten",
        name: "Flatten",
        category: BlockCategory::Transforms,
        compatible_data_types: ALL,
        description: "Collapses all but the first dimension.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: no_config,
        transform: transforms::flatten,
    },
    BlockTypeDescriptor {
        type_id: "fft",
        name: "FFT",
        category: BlockCategory::Transforms,
        compatible_data_types: ALL,
        description: "Real FFT magnitude along the time axis.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: fft_defaults,
        transform: transforms::fft,
    },
    BlockTypeDescriptor {
        type_id: "downsample",
        name: "Downsample",
        category: BlockCategory::Transforms,
        compatible_data_types: ALL,
        description: "Keeps every n-th sample along the time axis.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: downsample_defaults,
        transform: transforms::downsample,
    },
    BlockTypeDescriptor {
        type_id: "feature_extraction",
        name: "Feature Extraction",
        category: BlockCategory::Transforms,
        compatible_data_types: ALL,
        description: "Statistical features over the time axis.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: feature_extraction_defaults,
        transform: transforms::feature_extraction,
    },
    BlockTypeDescriptor {
        type_id: "data_augmentation",
        name: "Data Augmentation",
        category: BlockCategory::Transforms,
        compatible_data_types: ALL,
        description: "Adds noisy copies of every sample.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: augmentation_defaults,
        transform: transforms::data_augmentation,
    },
    BlockTypeDescriptor {
        type_id: "pca",
        name: "PCA",
        category: BlockCategory::Transforms,
        compatible_data_types: ALL,
        description: "Projects features onto the leading principal components.",
        is_source: false,
        input_merge: InputMerge::Single,
        defaults: pca_defaults,
        transform: transforms::pca,
    },
    // Combiners
    BlockTypeDescriptor {
        type_id: "feature_concat",
        name: "Feature Concat",
        category: BlockCategory::Combiners,
        compatible_data_types: ALL,
        description: "Concatenates inputs along the feature dimension.",
        is_source: false,
        input_merge: InputMerge::ConcatLastDim,
        defaults: concat_defaults,
        transform: transforms::identity,
    },
    BlockTypeDescriptor {
        type_id: "average_fusion",
        name: "Average Fusion",
        category: BlockCategory::Combiners,
        compatible_data_types: ALL,
        description: "Element-wise mean of equally shaped inputs.",
        is_source: false,
        input_merge: InputMerge::FirstInput,
        defaults: no_config,
        transform: transforms::identity,
    },
];

/// Look up a block type by id.
pub fn lookup(type_id: &str) -> Option<&'static BlockTypeDescriptor> {
    BLOCK_TYPES.iter().find(|d| d.type_id == type_id)
}

/// Every registered block type, in menu order.
pub fn all() -> &'static [BlockTypeDescriptor] {
    BLOCK_TYPES
}

pub fn compatible_with(data_type: DataType) -> impl Iterator<Item = &'static BlockTypeDescriptor> {
    BLOCK_TYPES
        .iter()
        .filter(move |d| d.is_compatible_with(data_type))
}

pub fn by_category(category: BlockCategory) -> impl Iterator<Item = &'static BlockTypeDescriptor> {
    BLOCK_TYPES.iter().filter(move |d| d.category == category)
}

/// Block types offered by the "add block" menu for `data_type` and `query`.
pub fn search<'q>(
    query: &'q str,
    data_type: DataType,
) -> impl Iterator<Item = &'static BlockTypeDescriptor> + 'q {
    compatible_with(data_type).filter(move |d| d.matches_query(query))
}
