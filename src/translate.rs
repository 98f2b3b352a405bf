use crate::{codec, gcp::Gcp, geojson::parse_feature_collection, input::InputFile};
use gdal::{Dataset, errors::GdalError, vsi};
use gdal_sys::{
    CPLGetLastErrorMsg, GDALClose, GDALVectorTranslate, GDALVectorTranslateOptionsFree,
    GDALVectorTranslateOptionsNew,
};
use geojson::FeatureCollection;
use std::{
    ffi::{CStr, CString, NulError, c_char, c_int},
    path::Path,
    ptr,
    sync::atomic::{AtomicU64, Ordering},
};
use thiserror::Error;

pub const OUTPUT_FORMAT: &str = "GeoJSON";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("GDAL error: {0}")]
    Gdal(#[from] GdalError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] NulError),

    #[error("Vector translate failed: {0}")]
    Translate(String),

    #[error("Invalid output: {0}")]
    InvalidOutput(String),
}

/// How the engine fits a transformation through the GCPs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformMethod {
    Polynomial(u8),
    ThinPlateSpline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// `None` lets the engine pick a polynomial order from the GCP count.
    pub method: Option<TransformMethod>,
}

impl ConvertOptions {
    pub fn build_args(&self, gcps: &[Gcp]) -> Vec<String> {
        let mut args = vec!["-f".to_string(), OUTPUT_FORMAT.to_string()];

        match self.method {
            Some(TransformMethod::Polynomial(order)) => {
                args.extend(["-order".to_string(), order.to_string()]);
            }
            Some(TransformMethod::ThinPlateSpline) => args.push("-tps".to_string()),
            None => {}
        }

        args.extend(codec::to_args(gcps));

        args
    }
}

/// Turns the input file into a geographic feature collection, driven by
/// `ogr2ogr`-style arguments.
pub trait Converter: Send + Sync {
    fn convert(
        &self,
        input: &InputFile,
        args: &[String],
    ) -> Result<FeatureCollection, ConvertError>;
}

/// Runs GDAL's vector translate on in-memory files.
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalConverter;

static NEXT_JOB: AtomicU64 = AtomicU64::new(0);

impl Converter for GdalConverter {
    fn convert(
        &self,
        input: &InputFile,
        args: &[String],
    ) -> Result<FeatureCollection, ConvertError> {
        let job = NEXT_JOB.fetch_add(1, Ordering::Relaxed);

        let file_name = Path::new(input.name())
            .file_name()
            .map_or_else(|| "input.geojson".into(), |name| name.to_string_lossy());

        let source_path = format!("/vsimem/georef-editor/{job}/{file_name}");

        let target_path = format!("/vsimem/georef-editor/{job}/referenced.geojson");

        vsi::create_mem_file(&source_path, input.contents().to_vec())?;

        let result = translate_mem_file(&source_path, &target_path, args);

        for path in [&source_path, &target_path] {
            if let Err(e) = vsi::unlink_mem_file(path) {
                log::debug!("Error unlinking {path}: {e}");
            }
        }

        result
    }
}

fn translate_mem_file(
    source_path: &str,
    target_path: &str,
    args: &[String],
) -> Result<FeatureCollection, ConvertError> {
    {
        let source_ds = Dataset::open(source_path)?;

        vector_translate(&source_ds, target_path, args)?;
    }

    let bytes = vsi::get_vsi_mem_file_bytes_owned(target_path)?;

    parse_feature_collection(&bytes).map_err(ConvertError::InvalidOutput)
}

fn vector_translate(
    source_ds: &Dataset,
    target_path: &str,
    args: &[String],
) -> Result<(), ConvertError> {
    let args = args
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut argv: Vec<*mut c_char> = args.iter().map(|arg| arg.as_ptr().cast_mut()).collect();

    argv.push(ptr::null_mut());

    let target_path = CString::new(target_path)?;

    unsafe {
        let options = GDALVectorTranslateOptionsNew(argv.as_mut_ptr(), ptr::null_mut());

        if options.is_null() {
            return Err(ConvertError::Translate(last_error_message()));
        }

        let mut sources = [source_ds.c_dataset()];

        let mut usage_error: c_int = 0;

        let target_ds = GDALVectorTranslate(
            target_path.as_ptr(),
            ptr::null_mut(),
            1,
            sources.as_mut_ptr(),
            options,
            &mut usage_error,
        );

        GDALVectorTranslateOptionsFree(options);

        if target_ds.is_null() {
            let message = last_error_message();

            return Err(ConvertError::Translate(if usage_error != 0 {
                format!("usage error: {message}")
            } else {
                message
            }));
        }

        // flushes the GeoJSON into the memory file
        GDALClose(target_ds);
    }

    Ok(())
}

fn last_error_message() -> String {
    unsafe { CStr::from_ptr(CPLGetLastErrorMsg()) }
        .to_string_lossy()
        .into_owned()
}
