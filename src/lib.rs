//! # DICOM render configuration
//!
//! This crate holds the state behind a DICOM volume viewer's rendering
//! controls and turns it into a description a rendering backend can draw.
//!
//! A viewer shows a loaded series in one of two modes:
//!  - Surface: an iso-surface extracted at the current threshold
//!  - Ray cast: direct volume rendering through three fixed transfer
//!    functions (colour, scalar opacity and gradient opacity) with
//!    ambient, diffuse and specular lighting
//!
//! [`RenderConfigModel`] validates every user edit and answers the questions a
//! UI asks after one: which controls to show, whether to redraw right away,
//! and what the backend should draw ([`RenderFrame`]). Surface extraction and
//! ray casting themselves are left to the backend.
//!
//! Series are read with [`VolumeLoader`], which relies on the dicom-rs
//! ecosystem for decoding and keeps voxel values in modality units so they
//! line up with the transfer functions.
//!
//! # Examples
//!
//! ```
//! # use dicom_render_config::{RenderConfigModel, RenderFrame, RenderMode};
//! let mut model = RenderConfigModel::new();
//! model.set_mode(RenderMode::Surface);
//! model.set_threshold(120).expect("threshold is within [1, 255]");
//! assert!(model.set_threshold(300).is_err());
//!
//! assert_eq!(model.frame(), RenderFrame::Surface { iso_value: 120 });
//! let opacity = model.scalar_opacity_transfer_function().value_at(750.0);
//! assert!((opacity - 0.85).abs() < 1e-6);
//! ```

pub mod enums;
pub mod render_config;
pub mod transfer_function;
pub mod volume;
pub mod volume_loader;

pub use enums::{Interpolation, LightingChannel, RenderMode, SortBy};
pub use render_config::{
    ConfigChange, ControlVisibility, Lighting, OutOfRangeError, Quantity, RenderConfigModel,
    RenderFrame, RenderSettings, VolumeProperty,
};
pub use transfer_function::{
    ColorTransferFunction, ControlPoint, PiecewiseFunction, TransferFunction,
    TransferFunctionError,
};
pub use volume::Volume;
pub use volume_loader::{VolumeLoader, VolumeLoaderError};
