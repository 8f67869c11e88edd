//! Canonical record model for reconstruction data.
//!
//! This module defines the format-agnostic records that every reader
//! produces: cameras, sparse points with their 2D measurements, and dense
//! points with normals. Readers append records to the owning container
//! ([`SparseReconstruction`] or [`DenseReconstruction`]); once appended a
//! record is never modified.

use serde::{Deserialize, Serialize};

use super::geometry::{Color, Normal, Position, Quat};
use super::ids::{CameraIndex, PointIndex};
use super::metadata::{CameraAuxData, DenseVisibility, MetaData};
use crate::error::BridgeError;

/// Width of the fixed file-path column that downstream exporters reserve
/// per camera.
pub const LENGTH_MAX_FILE_PATH: usize = 0x26;

/// One 2D observation of a sparse point in one camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub camera_index: CameraIndex,
    pub occurence_x: f64,
    pub occurence_y: f64,
}

impl Measurement {
    pub fn new(camera_index: impl Into<CameraIndex>, occurence_x: f64, occurence_y: f64) -> Self {
        Self {
            camera_index: camera_index.into(),
            occurence_x,
            occurence_y,
        }
    }
}

/// A calibrated camera.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Zero-based position in the input camera list.
    pub index: CameraIndex,

    pub focal_length: f64,

    /// Orientation exactly as stored in the source file.
    pub quat: Quat,

    /// Camera center in world space.
    pub center: Position,

    /// Packed [`CameraAuxData`].
    pub meta_data: MetaData,

    /// Image path as written in the source file.
    pub file_path: String,
}

impl Camera {
    /// Creates a new camera with the given properties.
    pub fn new(
        index: impl Into<CameraIndex>,
        focal_length: f64,
        quat: Quat,
        center: Position,
        meta_data: MetaData,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            index: index.into(),
            focal_length,
            quat,
            center,
            meta_data,
            file_path: file_path.into(),
        }
    }

    /// Decodes the auxiliary scalars carried in the metadata buffer.
    pub fn aux_data(&self) -> Result<CameraAuxData, BridgeError> {
        CameraAuxData::unpack(&self.meta_data)
    }
}

/// A 3D point reconstructed from matched 2D observations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SparsePoint {
    pub index: PointIndex,
    pub position: Position,
    pub color: Color,
    pub meta_data: MetaData,

    /// Observations in file order.
    pub measurements: Vec<Measurement>,
}

impl SparsePoint {
    /// Creates a new sparse point with the given properties.
    pub fn new(
        index: impl Into<PointIndex>,
        position: Position,
        color: Color,
        meta_data: MetaData,
        measurements: Vec<Measurement>,
    ) -> Self {
        Self {
            index: index.into(),
            position,
            color,
            meta_data,
            measurements,
        }
    }
}

/// A 3D point produced by dense stereo expansion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensePoint {
    pub index: PointIndex,
    pub position: Position,
    pub color: Color,

    /// Packed [`DenseVisibility`].
    pub meta_data: MetaData,

    pub normal: Normal,
}

impl DensePoint {
    /// Creates a new dense point with the given properties.
    pub fn new(
        index: impl Into<PointIndex>,
        position: Position,
        color: Color,
        meta_data: MetaData,
        normal: Normal,
    ) -> Self {
        Self {
            index: index.into(),
            position,
            color,
            meta_data,
            normal,
        }
    }

    /// Decodes the photometric score and visibility lists.
    pub fn visibility(&self) -> Result<DenseVisibility, BridgeError> {
        DenseVisibility::unpack(&self.meta_data)
    }
}

/// Cameras and sparse points read from one bundle file.
///
/// Records are appended through [`push_camera`](Self::push_camera) and
/// [`push_spoint`](Self::push_spoint) so the metadata length maxima stay in
/// step with the records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SparseReconstruction {
    pub cameras: Vec<Camera>,
    pub spoints: Vec<SparsePoint>,

    /// Largest camera metadata buffer seen so far, in bytes.
    pub length_meta_data_camera: usize,

    /// Largest sparse point metadata buffer seen so far, in bytes.
    pub length_meta_data_spoints: usize,

    /// Fixed file-path column width for consumers.
    pub length_max_file_path: usize,
}

impl Default for SparseReconstruction {
    fn default() -> Self {
        Self {
            cameras: Vec::new(),
            spoints: Vec::new(),
            length_meta_data_camera: 0,
            length_meta_data_spoints: 0,
            length_max_file_path: LENGTH_MAX_FILE_PATH,
        }
    }
}

impl SparseReconstruction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_camera(&mut self, camera: Camera) {
        self.length_meta_data_camera = self.length_meta_data_camera.max(camera.meta_data.len());
        self.cameras.push(camera);
    }

    pub fn push_spoint(&mut self, spoint: SparsePoint) {
        self.length_meta_data_spoints = self.length_meta_data_spoints.max(spoint.meta_data.len());
        self.spoints.push(spoint);
    }

    /// Total number of 2D measurements across all sparse points.
    pub fn measurement_count(&self) -> usize {
        self.spoints.iter().map(|p| p.measurements.len()).sum()
    }
}

/// Dense points read from one patch/PLY pair.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DenseReconstruction {
    pub dpoints: Vec<DensePoint>,

    /// Largest dense point metadata buffer seen so far, in bytes.
    pub length_meta_data_dpoints: usize,
}

impl DenseReconstruction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_dpoint(&mut self, dpoint: DensePoint) {
        self.length_meta_data_dpoints = self.length_meta_data_dpoints.max(dpoint.meta_data.len());
        self.dpoints.push(dpoint);
    }
}
