//! Durable storage for [`ActionValueTable`]s
//!
//! Tables are written as MessagePack with named fields. Loading decodes into a fixed
//! record type and then validates it field by field before a table is rebuilt, so a
//! file can only ever produce states, actions and values, never arbitrary objects.

use std::{
    collections::HashSet,
    ffi::OsString,
    fs::{self, File},
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use log::{info, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    algo::tabular::{ActionValueTable, Hashable},
    Error, Result, State,
};

/// Header identifying a saved table
pub const MAGIC: &str = "kickoff.q-table";

/// Version of the on-disk layout written by this crate
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct TableFile<A> {
    magic: String,
    version: u32,
    dims: u32,
    actions: Vec<A>,
    rows: Vec<RowRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct RowRecord {
    /// Bit patterns of the state features
    state: Vec<u32>,
    values: Vec<f32>,
    terminal: bool,
}

impl<A, const N: usize> ActionValueTable<A, N>
where
    A: Hashable + Serialize + DeserializeOwned,
{
    /// Write the whole table to `writer`
    pub fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        let mut rows = self
            .rows()
            .iter()
            .map(|(state, row)| RowRecord {
                state: state.to_bits().to_vec(),
                values: row.values.to_vec(),
                terminal: row.terminal,
            })
            .collect::<Vec<_>>();
        rows.sort_unstable_by(|a, b| a.state.cmp(&b.state));

        let file = TableFile {
            magic: MAGIC.to_owned(),
            version: FORMAT_VERSION,
            dims: N as u32,
            actions: self.actions().to_vec(),
            rows,
        };
        rmp_serde::encode::write_named(writer, &file)?;
        Ok(())
    }

    /// Read a table previously written by [`encode`](Self::encode)
    ///
    /// **Errors** with [`Error::CorruptData`] if the bytes do not decode or fail validation
    pub fn decode<R: Read>(reader: R) -> Result<Self> {
        let file: TableFile<A> =
            rmp_serde::decode::from_read(reader).map_err(|e| Error::corrupt(e.to_string()))?;
        Self::from_file(file).inspect_err(|e| warn!("rejecting saved table: {e}"))
    }

    fn from_file(file: TableFile<A>) -> Result<Self> {
        if file.magic != MAGIC {
            return Err(Error::corrupt(format!("unrecognized header {:?}", file.magic)));
        }
        if file.version != FORMAT_VERSION {
            return Err(Error::corrupt(format!(
                "unsupported format version {}, expected {FORMAT_VERSION}",
                file.version
            )));
        }
        if file.dims as usize != N {
            return Err(Error::corrupt(format!(
                "states have {} features, expected {N}",
                file.dims
            )));
        }

        let mut table = Self::new(file.actions).map_err(|e| Error::corrupt(e.to_string()))?;
        let width = table.actions().len();
        let mut seen = HashSet::with_capacity(file.rows.len());

        for (i, row) in file.rows.into_iter().enumerate() {
            let bits: [u32; N] = row.state.try_into().map_err(|s: Vec<u32>| {
                Error::corrupt(format!("row {i} has {} state features, expected {N}", s.len()))
            })?;
            if row.values.len() != width {
                return Err(Error::corrupt(format!(
                    "row {i} has {} values, expected {width}",
                    row.values.len()
                )));
            }
            if row.terminal && row.values.iter().any(|&v| v != 0.0) {
                return Err(Error::corrupt(format!("terminal row {i} has non-zero values")));
            }
            let state = State::from_bits(bits);
            if !seen.insert(state) {
                return Err(Error::corrupt(format!("row {i} repeats state {state:?}")));
            }
            table.insert_row(state, row.values.into_boxed_slice(), row.terminal);
        }

        Ok(table)
    }

    /// Save the table to a file, replacing any existing file at `path`
    ///
    /// The table is written to a sibling `.tmp` file and renamed over `path` once it is
    /// complete, so a failed save leaves the previous file intact.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = tmp_path(path);

        let written = self
            .write_synced(&tmp_path)
            .and_then(|()| fs::rename(&tmp_path, path).map_err(io_err("rename", path)));
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written?;

        info!("saved {} states to {}", self.len(), path.display());
        Ok(())
    }

    fn write_synced(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(io_err("create", path))?;
        let mut writer = BufWriter::new(file);
        self.encode(&mut writer)?;
        let file = writer
            .into_inner()
            .map_err(|e| io_err("write", path)(e.into_error()))?;
        file.sync_all().map_err(io_err("sync", path))
    }

    /// Load a table saved with [`save`](Self::save)
    ///
    /// **Errors** with [`Error::NotFound`] if there is no file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io {
                operation: "open",
                path: path.to_path_buf(),
                source,
            },
        })?;

        let table = Self::decode(BufReader::new(file))?;
        info!("loaded {} states from {}", table.len(), path.display());
        Ok(table)
    }
}

fn io_err(operation: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Error {
    let path = path.to_path_buf();
    move |source| Error::Io {
        operation,
        path,
        source,
    }
}

/// `q_values.msgpack` is staged as `q_values.msgpack.tmp` in the same directory
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
