use anyhow::anyhow;
use formatx::formatx;
use std::fmt::Debug;
use std::fs::File;
use std::io;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub trait Output: Debug {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write>;
    /// Whether this output can be considered a no-op and therefore that any code that only
    /// writes to the output can be skipped.
    fn is_noop(&self) -> bool {
        false
    }
}

/// Writes each output to a file in a directory. The file template takes the location key and
/// the file extension, e.g. `greenhouse__results__{}.{}`.
#[derive(Debug)]
pub struct FileOutput {
    directory_path: PathBuf,
    file_template: String,
}

impl FileOutput {
    pub fn new(directory_path: PathBuf, file_template: String) -> Self {
        Self {
            directory_path,
            file_template,
        }
    }
}

impl Output for FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        let file_name = formatx!(&self.file_template, location_key, file_extension)
            .map_err(|e| anyhow!("Could not build output file name: {e:?}"))?;
        Ok(BufWriter::new(File::create(
            self.directory_path.join(file_name),
        )?))
    }
}

impl Output for &FileOutput {
    fn writer_for_location_key(
        &self,
        location_key: &str,
        file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        <FileOutput as Output>::writer_for_location_key(self, location_key, file_extension)
    }
}

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(
        &self,
        _location_key: &str,
        _file_extension: &str,
    ) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        true
    }
}
