//! Canonical record model and the readers that produce it.
//!
//! Sparse bundle-adjustment output (NVM_V3) and dense multi-view-stereo
//! output (PMVS patches + PLY colors) are both converted into the same
//! record types, so downstream viewers and exporters only ever deal with
//! one model.
//!
//! # Design Principles
//!
//! 1. **Values as read**: quaternions, normals and colors are stored exactly
//!    as they appear in the source; no normalization or transformation.
//!
//! 2. **Typed auxiliary data**: per-record extras are handled as
//!    [`CameraAuxData`] / [`DenseVisibility`] and packed into the opaque
//!    big-endian [`MetaData`] buffer only when a record is built.
//!
//! 3. **All or nothing**: a reader either returns every declared record or
//!    an error; nothing is salvaged from a malformed input.
//!
//! # Example
//!
//! ```
//! use reconbridge::ir::io_nvm::from_nvm_str;
//!
//! let recon = from_nvm_str(
//!     "NVM_V3\n\n1\nimg0.jpg 1000.0 1 0 0 0 0 0 0 0.1 0.2\n\n0\n",
//! )?;
//! assert_eq!(recon.cameras[0].file_path, "img0.jpg");
//! # Ok::<(), reconbridge::BridgeError>(())
//! ```

mod geometry;
mod ids;
pub mod io_nvm;
pub mod io_pmvs;
mod lines;
mod metadata;
mod model;

// Re-export core types for convenient access
pub use geometry::{Color, Normal, Position, Quat};
pub use ids::{CameraIndex, PointIndex};
pub use metadata::{CameraAuxData, DenseVisibility, MetaData};
pub use model::{
    Camera, DensePoint, DenseReconstruction, Measurement, SparsePoint, SparseReconstruction,
    LENGTH_MAX_FILE_PATH,
};
