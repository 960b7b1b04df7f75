//! NetCDF I/O: loading images and masks, writing statistics
//!
//! Images are read as `f64` samples. Values equal to the variable's
//! `_FillValue` are read as NaN so that `remove_na` excludes them.

use crate::errors::{MaskedStatsError, Result};
use crate::image::{Image, Mask, PixelValue};
use crate::statistics::StatisticsResult;
use chrono::Utc;
use ndarray::ArrayD;
use netcdf::{create, AttributeValue, File, Variable};
use std::{fs, path::Path};
use tracing::debug;

fn find_variable<'f>(file: &'f File, var_name: &str) -> Result<Variable<'f>> {
    file.variable(var_name)
        .ok_or_else(|| MaskedStatsError::VariableNotFound {
            var: var_name.to_string(),
        })
}

fn variable_shape(var: &Variable<'_>) -> Vec<usize> {
    var.dimensions().iter().map(|d| d.len()).collect()
}

/// `_FillValue` attribute of a variable, if numeric
fn fill_value(var: &Variable<'_>) -> Option<f64> {
    var.attribute("_FillValue")
        .and_then(|attr| match attr.value().ok()? {
            AttributeValue::Float(v) => Some(f64::from(v)),
            AttributeValue::Double(v) => Some(v),
            AttributeValue::Short(v) => Some(f64::from(v)),
            AttributeValue::Int(v) => Some(f64::from(v)),
            AttributeValue::Uchar(v) => Some(f64::from(v)),
            _ => None,
        })
}

/// Read a variable as an image
///
/// With `vector` set, the variable's last dimension holds the pixel
/// components.
///
/// # Errors
///
/// Returns an error if the variable does not exist or cannot be read.
pub fn read_image(file: &File, var_name: &str, vector: bool) -> Result<Image<f64>> {
    let var = find_variable(file, var_name)?;
    let shape = variable_shape(&var);
    let mut values: Vec<f64> = var.get_values::<f64, _>(..)?;

    if let Some(fill) = fill_value(&var) {
        for value in values.iter_mut().filter(|v| **v == fill) {
            *value = f64::NAN;
        }
    }
    debug!(variable = var_name, shape = ?shape, "read image variable");

    let data = ArrayD::from_shape_vec(shape, values)?;
    if vector {
        Image::vector(data)
    } else {
        Image::scalar(data)
    }
}

/// Read a variable as an inclusion mask
///
/// # Errors
///
/// Returns an error if the variable does not exist or cannot be read.
pub fn read_mask(file: &File, var_name: &str) -> Result<Mask> {
    let var = find_variable(file, var_name)?;
    let shape = variable_shape(&var);
    let values: Vec<u8> = var.get_values::<u8, _>(..)?;
    Ok(Mask::new(ArrayD::from_shape_vec(shape, values)?))
}

/// Describes where a set of statistics came from
#[derive(Debug, Clone, Copy)]
pub struct StatisticsSource<'a> {
    pub variable: &'a str,
    pub mask_variable: Option<&'a str>,
    pub remove_na: bool,
}

/// Writes statistics to a NetCDF file as global attributes
pub struct StatisticsWriter<'a> {
    output_path: &'a Path,
}

impl<'a> StatisticsWriter<'a> {
    /// Create a new NetCDF writer
    #[must_use]
    pub const fn new(output_path: &'a Path) -> Self {
        Self { output_path }
    }

    /// Write the result, replacing any existing file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed or created.
    pub fn write_result<T: PixelValue>(
        &self,
        result: &StatisticsResult<T>,
        source: &StatisticsSource<'_>,
    ) -> Result<()> {
        if self.output_path.exists() {
            fs::remove_file(self.output_path)?;
        }

        let mut file = create(self.output_path)?;

        file.add_attribute("count", result.count())?;
        file.add_attribute("minimum", result.minimum().to_real())?;
        file.add_attribute("maximum", result.maximum().to_real())?;
        file.add_attribute("sum", result.sum())?;
        file.add_attribute("sum_of_squares", result.sum_of_squares())?;
        file.add_attribute("mean", result.mean())?;
        file.add_attribute("variance", result.variance())?;
        file.add_attribute("sigma", result.sigma())?;

        file.add_attribute("source_variable", source.variable)?;
        if let Some(mask_variable) = source.mask_variable {
            file.add_attribute("mask_variable", mask_variable)?;
        }
        file.add_attribute("remove_na", i32::from(source.remove_na))?;

        file.add_attribute(
            "history",
            format!("Created by masked-stats on {}", Utc::now().to_rfc3339()),
        )?;

        debug!(path = %self.output_path.display(), "wrote statistics");
        Ok(())
    }
}
