use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
};

/// The referenced GeoJSON ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub file_name: String,
    pub contents: String,
}

impl Export {
    /// Fails with [`io::ErrorKind::AlreadyExists`] if `path` exists and `overwrite` is not set.
    pub fn write_to(&self, path: &Path, overwrite: bool) -> io::Result<()> {
        let mut options = OpenOptions::new();

        options.write(true);

        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("Target file exists: {}", path.display()),
                )
            } else {
                e
            }
        })?;

        file.write_all(self.contents.as_bytes())?;

        file.flush()
    }
}
