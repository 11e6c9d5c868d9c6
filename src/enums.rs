use serde::{Deserialize, Serialize};

/// Which of the two rendering paths the backend should draw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Iso-surface extracted with marching cubes at the current threshold.
    Surface,
    /// Direct volume rendering through the transfer functions.
    #[default]
    RayCast,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightingChannel {
    Ambient,
    Diffuse,
    Specular,
}

impl LightingChannel {
    pub const ALL: [LightingChannel; 3] = [
        LightingChannel::Ambient,
        LightingChannel::Diffuse,
        LightingChannel::Specular,
    ];

    /// Human readable name, as shown next to the slider.
    pub fn name(self) -> &'static str {
        match self {
            LightingChannel::Ambient => "Ambient",
            LightingChannel::Diffuse => "Diffuse",
            LightingChannel::Specular => "Specular",
        }
    }
}

/// Sampling of the volume between voxel centers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    #[default]
    Linear,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    ImagePositionPatient,
    TablePosition,
    InstanceNumber,
    None,
}
