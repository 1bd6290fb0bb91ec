//! Raw sensor data domains collected by Thoth devices.

use crate::pipeline::shape::Shape;
use serde::{Deserialize, Serialize};

/// Input domain a pipeline operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Inertial measurement unit (accelerometer + gyroscope).
    Imu,
    /// WiFi channel state information.
    #[default]
    Csi,
    /// Multi-frequency continuous-wave radar.
    Mfcw,
    Image,
    Video,
}

impl DataType {
    pub fn display_name(&self) -> &'static str {
        match self {
            DataType::Imu => "IMU",
            DataType::Csi => "CSI",
            DataType::Mfcw => "MFCW",
            DataType::Image => "Image",
            DataType::Video => "Video",
        }
    }

    /// Wire identifier (`imu`, `csi`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Imu => "imu",
            DataType::Csi => "csi",
            DataType::Mfcw => "mfcw",
            DataType::Image => "image",
            DataType::Video => "video",
        }
    }

    pub fn all() -> &'static [DataType] {
        &[
            DataType::Imu,
            DataType::Csi,
            DataType::Mfcw,
            DataType::Image,
            DataType::Video,
        ]
    }

    /// Domains offered by the data-type selector.
    pub fn selectable() -> &'static [DataType] {
        &[DataType::Imu, DataType::Csi, DataType::Mfcw]
    }

    /// Input shape assumed for a non-source block with no incoming connection.
    pub fn default_input_shape(&self) -> Shape {
        match self {
            DataType::Imu => Shape::from([1000, 6]),
            DataType::Csi => Shape::from([1000, 128]),
            DataType::Mfcw => Shape::from([1000, 256]),
            DataType::Image => Shape::from([224, 224, 3]),
            DataType::Video => Shape::from([30, 224, 224, 3]),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataType::all()
            .iter()
            .copied()
            .find(|dt| dt.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown data type '{}'", s))
    }
}
