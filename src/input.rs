use std::{path::Path, sync::Arc};
use thiserror::Error;

pub const ACCEPTED_EXTENSION: &str = "geojson";

const REFERENCED_SUFFIX: &str = "_referenced";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Please choose a GeoJSON file (*.geojson), got \"{0}\"")]
pub struct UnsupportedFile(pub String);

/// The file being georeferenced. Cloning shares the contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    name: String,
    contents: Arc<[u8]>,
}

impl InputFile {
    pub fn new(
        name: impl Into<String>,
        contents: impl Into<Arc<[u8]>>,
    ) -> Result<Self, UnsupportedFile> {
        let name = name.into();

        let accepted = Path::new(&name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION));

        if !accepted {
            return Err(UnsupportedFile(name));
        }

        Ok(Self {
            name,
            contents: contents.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// `parcels.geojson` -> `parcels_referenced.geojson`
    pub fn referenced_name(&self) -> String {
        let path = Path::new(&self.name);

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();

        match path.extension() {
            Some(ext) => format!("{stem}{REFERENCED_SUFFIX}.{}", ext.to_string_lossy()),
            None => format!("{stem}{REFERENCED_SUFFIX}"),
        }
    }
}
