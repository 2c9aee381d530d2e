//! Utilities for input/output.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};
use tempfile::NamedTempFile;

#[cfg(feature = "serialization")]
use serde::Serialize;

/// Writes to a temporary file next to the given path and moves it into place
/// once `write` has succeeded, so an interrupted write never leaves a
/// truncated output file behind.
pub fn write_atomically<P, W>(file_path: P, write: W) -> io::Result<()>
where
    P: AsRef<Path>,
    W: FnOnce(&mut BufWriter<&mut fs::File>) -> io::Result<()>,
{
    let file_path = file_path.as_ref();
    let directory = match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(directory)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file.persist(file_path).map_err(|err| err.error)?;
    Ok(())
}

/// Serializes the given data into protocol 3 pickle format and saves it at the given path.
#[cfg(feature = "pickle")]
pub fn save_data_as_pickle<P, T>(file_path: P, data: &T) -> io::Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    write_atomically(file_path, |writer| write_data_as_pickle(writer, data))
}

/// Serializes the given data into protocol 3 pickle format and writes it to the given writer.
#[cfg(feature = "pickle")]
pub fn write_data_as_pickle<W, T>(writer: &mut W, data: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize,
{
    match serde_pickle::to_writer(writer, data, serde_pickle::SerOptions::new()) {
        Ok(_) => Ok(()),
        Err(serde_pickle::Error::Io(err)) => Err(err),
        Err(err) => Err(io::Error::new(
            io::ErrorKind::Other,
            format!("Unexpected error while serializing data to pickle: {}", err),
        )),
    }
}

/// Serializes the given data into JSON format and saves it at the given path.
#[cfg(feature = "json")]
pub fn save_data_as_json<P, T>(file_path: P, data: &T) -> io::Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    write_atomically(file_path, |writer| write_data_as_json(writer, data))
}

/// Serializes the given data into JSON format and writes it to the given writer.
#[cfg(feature = "json")]
pub fn write_data_as_json<W, T>(writer: &mut W, data: &T) -> io::Result<()>
where
    W: Write,
    T: Serialize,
{
    serde_json::to_writer(writer, data).map_err(io::Error::from)
}
