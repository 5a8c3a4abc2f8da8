//! Named graph snapshots under a fixed storage directory.
//!
//! Graphs are written as JSON objects of the form
//! `{"directed": bool, "adjacency": [[neighbour, ...], ...]}`. Neighbour order
//! and duplicate entries survive a round trip unchanged.

use std::{
    borrow::Cow,
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{Graph, error::StoreError};

const EXTENSION: &str = "json";

#[derive(Serialize, Deserialize)]
struct GraphRecord<'a> {
    directed: bool,
    adjacency: Cow<'a, [Vec<usize>]>,
}

/// Saves and loads graphs by name inside one directory.
#[derive(Clone, Debug)]
pub struct GraphStore {
    dir: PathBuf,
}

impl GraphStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the storage directory.
    #[must_use]
    #[rustfmt::skip]
    pub fn dir(&self) -> &Path { &self.dir }

    /// Returns the file backing `name`. Names without an extension get
    /// `.json` appended.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        let path = self.dir.join(name);
        if path.extension().is_some() {
            path
        } else {
            path.with_extension(EXTENSION)
        }
    }

    /// Writes `graph` under `name`, replacing any previous snapshot.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] when the directory or file cannot be written
    /// and [`StoreError::Decode`] if serialisation fails.
    #[instrument(name = "store.save", err, skip(self, graph), fields(num_nodes = graph.num_nodes()))]
    pub fn save(&self, graph: &Graph, name: &str) -> Result<PathBuf, StoreError> {
        let path = self.path_for(name);
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let file = File::create(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        let record = GraphRecord {
            directed: graph.is_directed(),
            adjacency: Cow::Borrowed(graph.adjacency()),
        };
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &record).map_err(|source| StoreError::Decode {
            path: path.clone(),
            source,
        })?;
        writer.flush().map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "graph saved");
        Ok(path)
    }

    /// Reads the graph stored under `name`.
    ///
    /// The node count is the number of stored neighbour lists.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] when the file cannot be read,
    /// [`StoreError::Decode`] for malformed JSON and [`StoreError::Graph`] when
    /// the adjacency is empty, references missing nodes or stores an
    /// undirected edge in one direction only.
    #[instrument(name = "store.load", err, skip(self))]
    pub fn load(&self, name: &str) -> Result<Graph, StoreError> {
        let path = self.path_for(name);
        let file = File::open(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let record: GraphRecord<'static> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| StoreError::Decode {
                path: path.clone(),
                source,
            })?;
        let graph = Graph::from_adjacency(record.adjacency.into_owned(), record.directed)
            .map_err(|source| StoreError::Graph {
                path: path.clone(),
                source,
            })?;
        debug!(num_nodes = graph.num_nodes(), "graph loaded");
        Ok(graph)
    }
}
