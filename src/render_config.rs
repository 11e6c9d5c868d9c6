//! The rendering configuration a viewer edits through its controls, and the
//! per-frame description handed to the rendering backend.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::{Interpolation, LightingChannel, RenderMode};
use crate::transfer_function::{
    COLOR_POINTS, ColorTransferFunction, GRADIENT_OPACITY_POINTS, PiecewiseFunction,
    SCALAR_OPACITY_POINTS,
};

pub const THRESHOLD_RANGE: RangeInclusive<i32> = 1..=255;
pub const LIGHTING_RANGE: RangeInclusive<i32> = 0..=10;

const LIGHTING_SCALE: f32 = 10.0;

/// The value a setter was asked to change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    Threshold,
    Lighting(LightingChannel),
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Threshold => f.write_str("ISO threshold"),
            Quantity::Lighting(channel) => write!(f, "{} coefficient", channel.name()),
        }
    }
}

/// A setter was given a value outside its bounds. The model keeps its previous value.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("{quantity} {value} is outside [{min}, {max}]")]
pub struct OutOfRangeError {
    pub quantity: Quantity,
    pub value: i32,
    pub min: i32,
    pub max: i32,
}

impl OutOfRangeError {
    fn check(quantity: Quantity, value: i32, range: &RangeInclusive<i32>) -> Result<u8, Self> {
        if range.contains(&value) {
            // both ranges fit in u8
            if let Ok(value) = u8::try_from(value) {
                return Ok(value);
            }
        }
        log::warn!("rejected {quantity} {value}");
        Err(Self {
            quantity,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

/// Lighting coefficients scaled to `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Lighting {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
}

/// Which groups of controls a UI should currently show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlVisibility {
    pub iso_controls: bool,
    pub lighting_controls: bool,
}

/// A control that was just changed, for deciding whether to redraw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigChange {
    Mode,
    Threshold,
    Lighting(LightingChannel),
}

/// Serializable form of the user-editable state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub mode: RenderMode,
    pub threshold: i32,
    pub ambient: i32,
    pub diffuse: i32,
    pub specular: i32,
    pub real_time: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: RenderMode::RayCast,
            threshold: 50,
            ambient: 4,
            diffuse: 6,
            specular: 2,
            real_time: true,
        }
    }
}

/// Everything a ray-casting backend needs to classify and shade the volume.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VolumeProperty {
    pub color: ColorTransferFunction,
    pub scalar_opacity: PiecewiseFunction,
    pub gradient_opacity: PiecewiseFunction,
    pub lighting: Lighting,
    pub shade: bool,
    pub interpolation: Interpolation,
}

/// Description of one frame in the active mode.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum RenderFrame {
    Surface { iso_value: u8 },
    RayCast(VolumeProperty),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LightingCoefficients {
    ambient: u8,
    diffuse: u8,
    specular: u8,
}

impl LightingCoefficients {
    fn get(&self, channel: LightingChannel) -> u8 {
        match channel {
            LightingChannel::Ambient => self.ambient,
            LightingChannel::Diffuse => self.diffuse,
            LightingChannel::Specular => self.specular,
        }
    }

    fn get_mut(&mut self, channel: LightingChannel) -> &mut u8 {
        match channel {
            LightingChannel::Ambient => &mut self.ambient,
            LightingChannel::Diffuse => &mut self.diffuse,
            LightingChannel::Specular => &mut self.specular,
        }
    }
}

/// Current render mode, iso threshold and lighting, plus the fixed transfer functions.
///
/// The model owns no rendering resources. A UI mutates it through the setters and
/// reads [`RenderConfigModel::frame`] to describe what the backend should draw.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfigModel {
    mode: RenderMode,
    threshold: u8,
    lighting: LightingCoefficients,
    real_time: bool,
    color: ColorTransferFunction,
    scalar_opacity: PiecewiseFunction,
    gradient_opacity: PiecewiseFunction,
}

impl Default for RenderConfigModel {
    fn default() -> Self {
        Self {
            mode: RenderMode::RayCast,
            threshold: 50,
            lighting: LightingCoefficients {
                ambient: 4,
                diffuse: 6,
                specular: 2,
            },
            real_time: true,
            color: ColorTransferFunction::from_static(&COLOR_POINTS),
            scalar_opacity: PiecewiseFunction::from_static(&SCALAR_OPACITY_POINTS),
            gradient_opacity: PiecewiseFunction::from_static(&GRADIENT_OPACITY_POINTS),
        }
    }
}

impl RenderConfigModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from stored settings, validating every bounded value.
    pub fn from_settings(settings: &RenderSettings) -> Result<Self, OutOfRangeError> {
        let mut model = Self::default();
        model.set_mode(settings.mode);
        model.set_threshold(settings.threshold)?;
        model.set_lighting_coefficient(LightingChannel::Ambient, settings.ambient)?;
        model.set_lighting_coefficient(LightingChannel::Diffuse, settings.diffuse)?;
        model.set_lighting_coefficient(LightingChannel::Specular, settings.specular)?;
        model.set_real_time(settings.real_time);
        Ok(model)
    }

    pub fn settings(&self) -> RenderSettings {
        RenderSettings {
            mode: self.mode,
            threshold: self.threshold.into(),
            ambient: self.lighting.ambient.into(),
            diffuse: self.lighting.diffuse.into(),
            specular: self.lighting.specular.into(),
            real_time: self.real_time,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Switch the active mode. Threshold and lighting are kept as they are.
    pub fn set_mode(&mut self, mode: RenderMode) {
        if self.mode != mode {
            log::debug!("render mode {:?} -> {mode:?}", self.mode);
        }
        self.mode = mode;
    }

    pub fn is_surface_mode_active(&self) -> bool {
        self.mode == RenderMode::Surface
    }

    pub fn is_ray_cast_mode_active(&self) -> bool {
        self.mode == RenderMode::RayCast
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn set_threshold(&mut self, value: i32) -> Result<(), OutOfRangeError> {
        self.threshold = OutOfRangeError::check(Quantity::Threshold, value, &THRESHOLD_RANGE)?;
        log::debug!("iso threshold set to {}", self.threshold);
        Ok(())
    }

    /// Stored integer coefficient, in `[0, 10]`.
    pub fn lighting_coefficient(&self, channel: LightingChannel) -> u8 {
        self.lighting.get(channel)
    }

    pub fn set_lighting_coefficient(
        &mut self,
        channel: LightingChannel,
        value: i32,
    ) -> Result<(), OutOfRangeError> {
        let value = OutOfRangeError::check(Quantity::Lighting(channel), value, &LIGHTING_RANGE)?;
        *self.lighting.get_mut(channel) = value;
        log::debug!("{} coefficient set to {value}", channel.name());
        Ok(())
    }

    pub fn effective_lighting(&self) -> Lighting {
        let scale = |v: u8| f32::from(v) / LIGHTING_SCALE;
        Lighting {
            ambient: scale(self.lighting.ambient),
            diffuse: scale(self.lighting.diffuse),
            specular: scale(self.lighting.specular),
        }
    }

    pub fn is_real_time(&self) -> bool {
        self.real_time
    }

    pub fn set_real_time(&mut self, real_time: bool) {
        self.real_time = real_time;
    }

    pub fn color_transfer_function(&self) -> &ColorTransferFunction {
        &self.color
    }

    pub fn scalar_opacity_transfer_function(&self) -> &PiecewiseFunction {
        &self.scalar_opacity
    }

    pub fn gradient_opacity_transfer_function(&self) -> &PiecewiseFunction {
        &self.gradient_opacity
    }

    /// Iso controls only make sense for surfaces; lighting is always adjustable.
    pub fn control_visibility(&self) -> ControlVisibility {
        ControlVisibility {
            iso_controls: self.is_surface_mode_active(),
            lighting_controls: true,
        }
    }

    /// Whether `change` should trigger an immediate redraw.
    ///
    /// Only applies in real-time mode, and only when the changed value feeds the
    /// active render path.
    pub fn should_rerender(&self, change: ConfigChange) -> bool {
        self.real_time
            && match change {
                ConfigChange::Mode => true,
                ConfigChange::Threshold => self.is_surface_mode_active(),
                ConfigChange::Lighting(_) => self.is_ray_cast_mode_active(),
            }
    }

    pub fn threshold_label(&self) -> String {
        format!("ISO Value: {}", self.threshold)
    }

    pub fn lighting_label(&self, channel: LightingChannel) -> String {
        let value = f32::from(self.lighting.get(channel)) / LIGHTING_SCALE;
        format!("{}: {value:.1}", channel.name())
    }

    pub fn volume_property(&self) -> VolumeProperty {
        VolumeProperty {
            color: self.color.clone(),
            scalar_opacity: self.scalar_opacity.clone(),
            gradient_opacity: self.gradient_opacity.clone(),
            lighting: self.effective_lighting(),
            shade: true,
            interpolation: Interpolation::Linear,
        }
    }

    pub fn frame(&self) -> RenderFrame {
        match self.mode {
            RenderMode::Surface => RenderFrame::Surface {
                iso_value: self.threshold,
            },
            RenderMode::RayCast => RenderFrame::RayCast(self.volume_property()),
        }
    }
}
