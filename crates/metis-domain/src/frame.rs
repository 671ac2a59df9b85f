// frame.rs
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Rol de un frame dentro de un frameset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameGroup {
    Raw,
    Calib,
    Product,
}

impl FrameGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameGroup::Raw => "RAW",
            FrameGroup::Calib => "CALIB",
            FrameGroup::Product => "PRODUCT",
        }
    }
}

/// Nivel de procesamiento de un producto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameLevel {
    Intermediate,
    Final,
}

impl FrameLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameLevel::Intermediate => "INTERMEDIATE",
            FrameLevel::Final => "FINAL",
        }
    }
}

/// Tipo físico del contenido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameType {
    Image,
    Table,
    Any,
}

impl FrameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrameType::Image => "IMAGE",
            FrameType::Table => "TABLE",
            FrameType::Any => "ANY",
        }
    }
}

/// Referencia a un fichero etiquetado. El grupo, nivel y tipo sólo se
/// conocen tras clasificar el frame (o al emitir un producto).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub path: PathBuf,
    pub tag: String,
    pub group: Option<FrameGroup>,
    pub level: Option<FrameLevel>,
    pub frame_type: Option<FrameType>,
}

impl Frame {
    pub fn new(path: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self { path: path.into(),
               tag: tag.into(),
               group: None,
               level: None,
               frame_type: None }
    }

    pub fn with_group(mut self, group: FrameGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_level(mut self, level: FrameLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_frame_type(mut self, frame_type: FrameType) -> Self {
        self.frame_type = Some(frame_type);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_raw(&self) -> bool {
        self.group == Some(FrameGroup::Raw)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.path.display(), self.tag)
    }
}

/// Colección ordenada de frames. El orden es el del llamador y no tiene
/// significado semántico salvo para la política "último gana" de inputs
/// simples.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSet {
    frames: Vec<Frame>,
}

impl FrameSet {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Atajo para construir framesets a partir de pares (fichero, tag).
    pub fn from_pairs<P, T, I>(pairs: I) -> Self
        where I: IntoIterator<Item = (P, T)>,
              P: Into<PathBuf>,
              T: Into<String>
    {
        pairs.into_iter().map(|(p, t)| Frame::new(p, t)).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.frames.iter().map(|f| f.tag.as_str()).collect()
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<&Frame> {
        self.frames.iter().filter(|f| f.tag == tag).collect()
    }
}

impl FromIterator<Frame> for FrameSet {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self { frames: iter.into_iter().collect() }
    }
}

impl Extend<Frame> for FrameSet {
    fn extend<I: IntoIterator<Item = Frame>>(&mut self, iter: I) {
        self.frames.extend(iter);
    }
}

impl<'a> IntoIterator for &'a FrameSet {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl IntoIterator for FrameSet {
    type Item = Frame;
    type IntoIter = std::vec::IntoIter<Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.into_iter()
    }
}
