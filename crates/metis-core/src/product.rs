//! Productos de receta.
//!
//! Una declaración de producto (un `ItemTemplate`) sirve para todas las
//! configuraciones; cada instancia emite un único tag resuelto.
use std::path::PathBuf;

use chrono::Utc;
use metis_domain::{Frame, FrameGroup, FrameLevel, FrameSet, FrameType, Header, HeaderValue, Image, SlotBindings};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::constants::{KEY_DATE, KEY_PRO_CATG, KEY_PRO_DATAHASH, KEY_PRO_DATANCOM, KEY_PRO_PIPE_ID, KEY_PRO_REC_ID, KEY_PRO_TYPE,
                       PRO_TYPE_REDUCED};
use crate::errors::PipelineError;
use crate::hashing::{hash_f64s, hash_value};
use crate::io::{FrameIo, SaveRequest};
use crate::item::ItemTemplate;
use crate::params::ParameterList;

#[derive(Debug, Clone, PartialEq)]
pub enum ProductData {
    Image(Image),
    Table(Value),
}

impl ProductData {
    pub fn hash(&self) -> String {
        match self {
            ProductData::Image(img) => hash_f64s(&img.data),
            ProductData::Table(v) => hash_value(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    item: String,
    tag: String,
    category: String,
    group: FrameGroup,
    level: FrameLevel,
    frame_type: FrameType,
    bindings: SlotBindings,
    data: ProductData,
    header: Header,
    file_name: Option<String>,
}

impl Product {
    /// Especializa `template` con `bindings`. Falla si queda algún slot
    /// libre o falta grupo, nivel o tipo.
    pub fn new(template: &ItemTemplate, bindings: &SlotBindings, data: ProductData) -> Result<Self, PipelineError> {
        let resolved = template.specialize(bindings);
        if resolved.is_abstract() {
            return Err(PipelineError::Unresolvable { template: template.id.clone(),
                                                     name: resolved.resolved_name(),
                                                     bindings: resolved.bindings.to_string() });
        }
        let missing = |attribute: &str| PipelineError::MissingAttribute { item: template.id.clone(),
                                                                         attribute: attribute.to_string() };
        let group = resolved.group.ok_or_else(|| missing("group"))?;
        let level = resolved.level.ok_or_else(|| missing("level"))?;
        let frame_type = resolved.frame_type.ok_or_else(|| missing("frame_type"))?;
        let tag = resolved.resolved_name();
        if tag.is_empty() {
            return Err(missing("tag"));
        }
        Ok(Self { item: template.id.clone(),
                  category: tag.clone(),
                  tag,
                  group,
                  level,
                  frame_type,
                  bindings: resolved.bindings,
                  data,
                  header: Header::new(),
                  file_name: None })
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Tarjeta propia del producto; las estándar se añaden al guardar.
    pub fn with_card(mut self, keyword: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.header.set(keyword, value);
        self
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn group(&self) -> FrameGroup {
        self.group
    }

    pub fn level(&self) -> FrameLevel {
        self.level
    }

    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    pub fn bindings(&self) -> &SlotBindings {
        &self.bindings
    }

    pub fn data(&self) -> &ProductData {
        &self.data
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Nombre de fichero: explícito o el tag en minúsculas.
    pub fn file_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| format!("{}.fits", self.tag.to_lowercase()))
    }

    /// Ruta de salida bajo `config.output_dir`.
    pub fn output_path(&self, config: &EngineConfig) -> PathBuf {
        config.output_dir.join(self.file_name())
    }

    /// Tarjetas estándar más las propias del producto.
    pub fn standard_header(&self, recipe: &str, used_frames: &[Frame], config: &EngineConfig) -> Header {
        let n_raw = used_frames.iter().filter(|f| f.is_raw()).count();
        let mut header = Header::new().with(KEY_PRO_CATG, self.category.as_str())
                                      .with(KEY_PRO_TYPE, PRO_TYPE_REDUCED)
                                      .with(KEY_PRO_REC_ID, recipe)
                                      .with(KEY_PRO_PIPE_ID, config.pipeline_id.as_str())
                                      .with(KEY_PRO_DATANCOM, n_raw as i64)
                                      .with(KEY_DATE, Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string());
        if config.write_checksums {
            header.set(KEY_PRO_DATAHASH, self.data.hash());
        }
        header.extend_from(&self.header);
        header
    }

    /// Guarda el producto a través del colaborador de I/O. Exige al menos un
    /// frame RAW entre los usados.
    pub fn save(&self,
                recipe: &str,
                frameset: &FrameSet,
                parameters: &ParameterList,
                used_frames: &[Frame],
                io: &dyn FrameIo,
                config: &EngineConfig)
                -> Result<Frame, PipelineError> {
        if !used_frames.iter().any(Frame::is_raw) {
            return Err(PipelineError::NoRawFrame { product: self.tag.clone() });
        }
        let request = SaveRequest { recipe,
                                    product: self,
                                    frameset,
                                    parameters,
                                    used_frames,
                                    path: self.output_path(config),
                                    header: self.standard_header(recipe, used_frames, config) };
        Ok(io.save_product(&request)?)
    }
}
