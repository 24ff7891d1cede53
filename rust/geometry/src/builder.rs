// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh assembly from patch channel data
//!
//! A [`MeshBuilder`] starts empty, takes at most one channel set per element
//! kind and is finalized exactly once. Optional channels that fail to assemble,
//! or whose entry count does not match the position count, are dropped and the
//! kind's presence for that channel stays [`Presence::Absent`]. Every dropped
//! channel is recorded as a [`ChannelIssue`] for the caller to report.

use crate::channels::{
    assemble_colors, assemble_normals, assemble_points, assemble_uvs, Channel, Presence, Rgba,
};
use crate::error::{Error, Result};
use crate::mesh::{ElementKind, Mesh, MeshElement, Winding};

/// Borrowed flat channel lists for one element kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct Channels<'a> {
    pub position: &'a [f64],
    pub normal: Option<&'a [f64]>,
    pub rgba: Option<&'a [f64]>,
    pub uv: Option<&'a [f64]>,
}

/// A recoverable problem found while assembling channel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelIssue {
    /// List length is not a multiple of the channel arity.
    Malformed {
        kind: ElementKind,
        channel: Channel,
        len: usize,
    },
    /// Entry count differs from the number of positions.
    CountMismatch {
        kind: ElementKind,
        channel: Channel,
        expected: usize,
        found: usize,
    },
    /// Trailing positions that do not complete a triangle.
    IncompleteTriangle { dropped: usize },
    /// A second channel set for a kind that was already filled.
    Duplicate { kind: ElementKind },
}

impl std::fmt::Display for ChannelIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelIssue::Malformed { kind, channel, len } => write!(
                f,
                "{kind}.{channel}: {len} values is not a multiple of {}",
                channel.arity()
            ),
            ChannelIssue::CountMismatch {
                kind,
                channel,
                expected,
                found,
            } => write!(f, "{kind}.{channel}: expected {expected} entries, found {found}"),
            ChannelIssue::IncompleteTriangle { dropped } => {
                write!(f, "faces: {dropped} trailing positions do not form a triangle")
            }
            ChannelIssue::Duplicate { kind } => write!(f, "{kind}: channel set already supplied"),
        }
    }
}

/// Builds one mesh from per-kind channel sets.
#[derive(Debug, Default)]
pub struct MeshBuilder {
    mesh: Mesh,
    filled: [bool; 3],
    issues: Vec<ChannelIssue>,
    overflow: Option<usize>,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn faces(&mut self, channels: Channels<'_>) -> &mut Self {
        self.add(ElementKind::Face, channels)
    }

    pub fn lines(&mut self, channels: Channels<'_>) -> &mut Self {
        self.add(ElementKind::Line, channels)
    }

    pub fn points(&mut self, channels: Channels<'_>) -> &mut Self {
        self.add(ElementKind::Point, channels)
    }

    pub fn winding(&mut self, winding: Winding) -> &mut Self {
        self.mesh.winding = winding;
        self
    }

    pub fn two_sided(&mut self, two_sided: bool) -> &mut Self {
        self.mesh.two_sided = two_sided;
        self
    }

    pub fn manifold(&mut self, manifold: bool) -> &mut Self {
        self.mesh.manifold = manifold;
        self
    }

    /// Problems recorded so far.
    pub fn issues(&self) -> &[ChannelIssue] {
        &self.issues
    }

    /// Add the channel set for one element kind.
    pub fn add(&mut self, kind: ElementKind, channels: Channels<'_>) -> &mut Self {
        let slot = kind as usize;
        if self.filled[slot] {
            self.issues.push(ChannelIssue::Duplicate { kind });
            return self;
        }
        self.filled[slot] = true;

        let Some(mut points) = assemble_points(channels.position) else {
            self.issues.push(ChannelIssue::Malformed {
                kind,
                channel: Channel::Position,
                len: channels.position.len(),
            });
            return self;
        };

        let supplied = points.len();
        if kind == ElementKind::Face {
            let dropped = points.len() % 3;
            if dropped != 0 {
                self.issues.push(ChannelIssue::IncompleteTriangle { dropped });
                points.truncate(points.len() - dropped);
            }
        }
        let count = points.len();
        if count == 0 {
            return self;
        }

        // Optional channels follow the positions as supplied, then lose the
        // same incomplete triangle.
        let normals = channels
            .normal
            .and_then(|v| self.checked(kind, Channel::Normal, v, supplied, assemble_normals));
        let uvs = channels
            .uv
            .and_then(|v| self.checked(kind, Channel::Uv, v, supplied, assemble_uvs));
        let colors = channels.rgba.and_then(|v| {
            self.checked(kind, Channel::Color, v, supplied, |values| {
                assemble_colors(values).map(|raw| {
                    raw.into_iter()
                        .map(|[r, g, b, a]| Rgba::from_255(r, g, b, a))
                        .collect::<Vec<_>>()
                })
            })
        });
        let normals = normals.map(|v| truncated(v, count));
        let uvs = uvs.map(|v| truncated(v, count));
        let colors = colors.map(|v| truncated(v, count));

        let presence = self.mesh.channels.get_mut(kind);
        presence.normals = Presence::from_bool(normals.is_some());
        presence.uvs = Presence::from_bool(uvs.is_some());
        presence.colors = Presence::from_bool(colors.is_some());

        let point_base = self.mesh.points.len();
        let normal_base = self.mesh.normals.len();
        let uv_base = self.mesh.uvs.len();
        let color_base = self.mesh.colors.len();

        let largest = [point_base, normal_base, uv_base, color_base]
            .into_iter()
            .max()
            .unwrap_or(0)
            + count;
        if u32::try_from(largest).is_err() {
            self.overflow = Some(largest);
            return self;
        }

        let stride = self.mesh.channels.get(kind).stride();
        let mut indices = Vec::with_capacity(count * stride);
        for i in 0..count {
            indices.push((point_base + i) as u32);
            if normals.is_some() {
                indices.push((normal_base + i) as u32);
            }
            if uvs.is_some() {
                indices.push((uv_base + i) as u32);
            }
            if colors.is_some() {
                indices.push((color_base + i) as u32);
            }
        }

        self.mesh.points.extend(points);
        if let Some(normals) = normals {
            self.mesh.normals.extend(normals);
        }
        if let Some(uvs) = uvs {
            self.mesh.uvs.extend(uvs);
        }
        if let Some(colors) = colors {
            self.mesh.colors.extend(colors);
        }

        let element = MeshElement::new(indices);
        match kind {
            ElementKind::Face => self.mesh.face_elements.push(element),
            ElementKind::Line => self.mesh.polyline_elements.push(element),
            ElementKind::Point => self.mesh.point_elements.push(element),
        }
        self
    }

    /// Assemble an optional channel and check its entry count.
    fn checked<T>(
        &mut self,
        kind: ElementKind,
        channel: Channel,
        values: &[f64],
        expected: usize,
        assemble: impl FnOnce(&[f64]) -> Option<Vec<T>>,
    ) -> Option<Vec<T>> {
        match assemble(values) {
            None => {
                self.issues.push(ChannelIssue::Malformed {
                    kind,
                    channel,
                    len: values.len(),
                });
                None
            }
            Some(entries) if entries.len() != expected => {
                self.issues.push(ChannelIssue::CountMismatch {
                    kind,
                    channel,
                    expected,
                    found: entries.len(),
                });
                None
            }
            Some(entries) => Some(entries),
        }
    }

    /// Finalize the mesh. Fails if no element of any kind was produced.
    pub fn finish(self) -> Result<Mesh> {
        if let Some(len) = self.overflow {
            return Err(Error::IndexOverflow(len));
        }
        if self.mesh.is_empty() {
            return Err(Error::EmptyMesh(
                "no faces, lines or points were assembled".to_string(),
            ));
        }
        Ok(self.mesh)
    }
}

fn truncated<T>(mut entries: Vec<T>, len: usize) -> Vec<T> {
    entries.truncate(len);
    entries
}
