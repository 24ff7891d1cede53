// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On-disk artifacts of a model.
//!
//! A model named `m` in directory `d` is persisted as three files:
//!
//! | File      | Content                                             |
//! |-----------|-----------------------------------------------------|
//! | `d/m.scs` | compact stream: 8 byte header + bincode body        |
//! | `d/m.scz` | bundle: the compact stream, gzip compressed         |
//! | `d/m.xml` | editable assembly tree                              |
//!
//! Every encoding is deterministic: writing an unchanged model twice produces
//! identical bytes.

use crate::assembly_tree::AssemblyTree;
use crate::error::{Error, Result};
use crate::model::{Model, ModelStore};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Magic bytes at the start of a compact stream.
pub const STREAM_MAGIC: [u8; 4] = *b"SCPS";
/// Current compact stream version.
pub const STREAM_VERSION: u16 = 1;
const HEADER_LEN: usize = 8;

/// Suffix appended to an artifact path to form its baseline sidecar.
pub const SIDECAR_SUFFIX: &str = "orig";

/// One of the three persisted artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    CompactStream,
    Bundle,
    Tree,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::CompactStream,
        ArtifactKind::Bundle,
        ArtifactKind::Tree,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::CompactStream => "scs",
            ArtifactKind::Bundle => "scz",
            ArtifactKind::Tree => "xml",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Paths of a model's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSet {
    dir: PathBuf,
    model_name: String,
}

impl ArtifactSet {
    pub fn new(dir: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            model_name: model_name.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Live artifact path, e.g. `dir/model.scs`.
    pub fn path(&self, kind: ArtifactKind) -> PathBuf {
        self.dir
            .join(format!("{}.{}", self.model_name, kind.extension()))
    }

    /// Baseline sidecar path, e.g. `dir/model.scs.orig`.
    pub fn sidecar(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(format!(
            "{}.{}.{}",
            self.model_name,
            kind.extension(),
            SIDECAR_SUFFIX
        ))
    }

    /// Open the model: bundle first, then compact stream, else a new empty model.
    pub fn open_model(&self) -> Result<Model> {
        let bundle = self.path(ArtifactKind::Bundle);
        if bundle.is_file() {
            tracing::debug!(path = %bundle.display(), "Opening model bundle");
            return Model::from_bundle(&fs::read(&bundle)?);
        }
        let compact = self.path(ArtifactKind::CompactStream);
        if compact.is_file() {
            tracing::debug!(path = %compact.display(), "Opening compact model stream");
            return Model::from_compact_stream(&fs::read(&compact)?);
        }
        tracing::info!(model = %self.model_name, "No model artifacts found, starting empty model");
        Ok(Model::new(self.model_name.clone()))
    }

    /// Open the assembly tree: XML document first, then the tree stored in
    /// the model, else a new tree whose root is named after the model.
    pub fn open_tree(&self, model: &Model) -> Result<AssemblyTree> {
        let xml = self.path(ArtifactKind::Tree);
        if xml.is_file() {
            tracing::debug!(path = %xml.display(), "Reading assembly tree");
            return AssemblyTree::from_xml(&fs::read_to_string(&xml)?);
        }
        if let Some(tree) = model.assembly() {
            return Ok(tree.clone());
        }
        Ok(AssemblyTree::with_root(model.name()))
    }

    /// Write the tree document.
    pub fn write_tree(&self, tree: &AssemblyTree) -> Result<()> {
        let path = self.path(ArtifactKind::Tree);
        fs::write(&path, tree.to_xml()?)?;
        tracing::debug!(path = %path.display(), nodes = tree.len(), "Wrote assembly tree");
        Ok(())
    }

    /// Prepare the model for streaming, then write the compact stream and the bundle.
    pub fn write_model(&self, model: &mut Model) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        model.prepare_stream();
        model.generate_compact_stream(self.path(ArtifactKind::CompactStream))?;
        model.generate_bundle(self.path(ArtifactKind::Bundle))?;
        Ok(())
    }
}

impl Model {
    /// Encode the model as a compact stream.
    pub fn to_compact_stream(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(HEADER_LEN);
        bytes.extend_from_slice(&STREAM_MAGIC);
        bytes.extend_from_slice(&STREAM_VERSION.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bincode::serialize_into(&mut bytes, self)?;
        Ok(bytes)
    }

    /// Decode a compact stream written by [`Model::to_compact_stream`].
    pub fn from_compact_stream(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::InvalidStream(format!(
                "{} bytes is shorter than the header",
                bytes.len()
            )));
        }
        if bytes[..4] != STREAM_MAGIC {
            return Err(Error::InvalidStream("bad magic".to_string()));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != STREAM_VERSION {
            return Err(Error::InvalidStream(format!(
                "unsupported version {version}"
            )));
        }
        Ok(bincode::deserialize(&bytes[HEADER_LEN..])?)
    }

    /// Gzip-compressed compact stream.
    pub fn to_bundle(&self) -> Result<Vec<u8>> {
        let stream = self.to_compact_stream()?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&stream)?;
        Ok(encoder.finish()?)
    }

    pub fn from_bundle(bytes: &[u8]) -> Result<Self> {
        let mut stream = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut stream)?;
        Self::from_compact_stream(&stream)
    }

    /// Write the compact stream file.
    pub fn generate_compact_stream(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_compact_stream()?;
        fs::write(path, &bytes)?;
        tracing::info!(path = %path.display(), size = bytes.len(), "Generated compact stream");
        Ok(())
    }

    /// Write the compressed bundle file.
    pub fn generate_bundle(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bundle()?;
        fs::write(path, &bytes)?;
        tracing::info!(path = %path.display(), size = bytes.len(), "Generated bundle");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, Projection};

    #[test]
    fn test_paths() {
        let set = ArtifactSet::new("/tmp/out", "microengine");
        assert_eq!(
            set.path(ArtifactKind::Bundle),
            PathBuf::from("/tmp/out/microengine.scz")
        );
        assert_eq!(
            set.sidecar(ArtifactKind::Tree),
            PathBuf::from("/tmp/out/microengine.xml.orig")
        );
    }

    #[test]
    fn test_compact_stream_round_trip() {
        let mut model = Model::new("m");
        model.set_default_camera(Camera {
            projection: Projection::Perspective,
            field_width: 2.0,
            ..Default::default()
        });
        let bytes = model.to_compact_stream().unwrap();
        assert_eq!(&bytes[..4], b"SCPS");
        assert_eq!(Model::from_compact_stream(&bytes).unwrap(), model);
    }

    #[test]
    fn test_bundle_is_deterministic() {
        let model = Model::new("m");
        let a = model.to_bundle().unwrap();
        let b = model.to_bundle().unwrap();
        assert_eq!(a, b);
        assert_eq!(Model::from_bundle(&a).unwrap(), model);
    }

    #[test]
    fn test_rejects_foreign_stream() {
        assert!(matches!(
            Model::from_compact_stream(b"PK\x03\x04\0\0\0\0"),
            Err(Error::InvalidStream(_))
        ));
        assert!(matches!(
            Model::from_compact_stream(b"SC"),
            Err(Error::InvalidStream(_))
        ));
    }
}
