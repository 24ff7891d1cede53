// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # scpatch core
//!
//! Decoding of scene patch documents.
//!
//! A patch document is a JSON object whose keys name sections and whose
//! values are arrays of records. Decoding happens once, up front:
//!
//! - insignificant whitespace outside string literals is removed
//!   ([`Compacted`]), keeping a map back to the submitted text for error
//!   positions;
//! - every top-level key becomes a [`Section`], unknown keys included;
//! - every record becomes a typed value or a [`RecordError`], independently
//!   of its neighbours.
//!
//! ## Quick Start
//!
//! ```rust
//! use scpatch_core::{PatchDocument, Section};
//!
//! let doc = PatchDocument::parse(r#"{"attributes": [{"nodeId": 6, "Material": "Inconel"}]}"#)?;
//! let Section::Attributes(records) = &doc.sections[0] else { unreachable!() };
//! let record = records[0].as_ref().unwrap();
//! assert_eq!((record.name.as_str(), record.value.as_str()), ("Material", "Inconel"));
//! # Ok::<(), scpatch_core::Error>(())
//! ```

pub mod compact;
pub mod document;
pub mod error;
pub mod records;

pub use compact::Compacted;
pub use document::{names, PatchDocument, Section};
pub use error::{Error, Position, RecordError, Result};
pub use records::{
    AttributeRecord, CameraRecord, ChannelSet, ColorRecord, ColorTarget, Decoded, MeshRecord,
    NodeRenameRecord, Vec3,
};
