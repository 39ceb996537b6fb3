//! Spatial (World Coordinate System) fields
//!
//! The `Spatial.*` fields describe how image pixels map to sky coordinates.
//! [`SpatialFields`] gathers them in one typed struct. Conversion to and from
//! an actual projection object is left to a [`ProjectionConverter`]
//! implementation supplied by the caller.

use super::AvmMeta;
use crate::core::error::{AvmError, AvmResult};
use crate::types::value::AvmValue;

/// Typed view of the `Spatial.*` fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialFields {
    /// Celestial frame, such as `ICRS` or `FK5`
    pub coordinate_frame: Option<String>,
    /// Equinox of the frame, such as `J2000`
    pub equinox: Option<String>,
    /// Sky coordinates of the reference pixel, in degrees
    pub reference_value: Option<[f64; 2]>,
    /// Image width and height in pixels
    pub reference_dimension: Option<[f64; 2]>,
    /// Pixel position of the reference point, one-based
    pub reference_pixel: Option<[f64; 2]>,
    /// Degrees per pixel along each axis
    pub scale: Option<[f64; 2]>,
    /// Rotation of the image from north, in degrees
    pub rotation: Option<f64>,
    /// Projection code, such as `TAN`
    pub coordsystem_projection: Option<String>,
    /// Quality of the solution, `Full` or `Position`
    pub quality: Option<String>,
    /// Free text notes on the solution
    pub notes: Option<String>,
    /// FITS header the solution came from
    pub fits_header: Option<String>,
    /// CD matrix in row order, degrees per pixel
    pub cd_matrix: Option<[f64; 4]>,
}

/// Conversion between spatial fields and a projection type
///
/// Implement this to plug in a WCS library.
pub trait ProjectionConverter {
    /// Projection type produced and consumed
    type Projection;

    /// Build a projection from spatial fields
    fn to_projection(&self, spatial: &SpatialFields) -> AvmResult<Self::Projection>;

    /// Describe a projection as spatial fields
    fn from_projection(&self, projection: &Self::Projection) -> AvmResult<SpatialFields>;
}

impl AvmMeta {
    /// Read the spatial fields
    ///
    /// Fails with [`AvmError::NoSpatialInformation`] when neither
    /// `Spatial.ReferenceValue` nor `Spatial.FITSheader` is set.
    pub fn spatial(&self) -> AvmResult<SpatialFields> {
        let spatial = SpatialFields {
            coordinate_frame: self.text("Spatial.CoordinateFrame"),
            equinox: self.text("Spatial.Equinox"),
            reference_value: self.floats("Spatial.ReferenceValue"),
            reference_dimension: self.floats("Spatial.ReferenceDimension"),
            reference_pixel: self.floats("Spatial.ReferencePixel"),
            scale: self.floats("Spatial.Scale"),
            rotation: self
                .get("Spatial.Rotation")
                .ok()
                .flatten()
                .and_then(AvmValue::as_float),
            coordsystem_projection: self.text("Spatial.CoordsystemProjection"),
            quality: self.text("Spatial.Quality"),
            notes: self.text("Spatial.Notes"),
            fits_header: self.text("Spatial.FITSheader"),
            cd_matrix: self.floats("Spatial.CDMatrix"),
        };

        if spatial.reference_value.is_none() && spatial.fits_header.is_none() {
            return Err(AvmError::NoSpatialInformation);
        }
        Ok(spatial)
    }

    /// Write the spatial fields that are set
    ///
    /// Fields left as `None` keep their current value. `cd_matrix` is only
    /// written when the active version declares `Spatial.CDMatrix`.
    pub fn apply_spatial(&mut self, spatial: &SpatialFields) -> AvmResult<()> {
        self.set_if("Spatial.CoordinateFrame", spatial.coordinate_frame.as_deref())?;
        self.set_if("Spatial.Equinox", spatial.equinox.as_deref())?;
        self.set_if("Spatial.ReferenceValue", spatial.reference_value)?;
        self.set_if("Spatial.ReferenceDimension", spatial.reference_dimension)?;
        self.set_if("Spatial.ReferencePixel", spatial.reference_pixel)?;
        self.set_if("Spatial.Scale", spatial.scale)?;
        self.set_if("Spatial.Rotation", spatial.rotation)?;
        self.set_if(
            "Spatial.CoordsystemProjection",
            spatial.coordsystem_projection.as_deref(),
        )?;
        self.set_if("Spatial.Quality", spatial.quality.as_deref())?;
        self.set_if("Spatial.Notes", spatial.notes.as_deref())?;
        self.set_if("Spatial.FITSheader", spatial.fits_header.as_deref())?;
        if self.spec().contains("Spatial.CDMatrix") {
            self.set_if("Spatial.CDMatrix", spatial.cd_matrix)?;
        }
        Ok(())
    }

    /// Build a projection from the spatial fields
    pub fn to_projection<C: ProjectionConverter>(&self, converter: &C) -> AvmResult<C::Projection> {
        converter.to_projection(&self.spatial()?)
    }

    /// Create a tree holding the spatial description of a projection
    pub fn from_projection<C: ProjectionConverter>(
        converter: &C,
        projection: &C::Projection,
    ) -> AvmResult<Self> {
        let mut meta = Self::new();
        meta.apply_spatial(&converter.from_projection(projection)?)?;
        Ok(meta)
    }

    fn set_if<T: Into<AvmValue>>(&mut self, name: &str, value: Option<T>) -> AvmResult<()> {
        match value {
            Some(value) => self.set(name, value),
            None => Ok(()),
        }
    }

    fn text(&self, name: &str) -> Option<String> {
        self.get(name)
            .ok()
            .flatten()
            .and_then(AvmValue::as_str)
            .map(str::to_string)
    }

    fn floats<const N: usize>(&self, name: &str) -> Option<[f64; N]> {
        let items = self.get(name).ok().flatten()?.as_float_list()?;
        let items: Vec<f64> = items.into_iter().collect::<Option<_>>()?;
        items.try_into().ok()
    }
}
