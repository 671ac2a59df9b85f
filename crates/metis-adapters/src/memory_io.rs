//! Colaborador de I/O en memoria.
//!
//! Guarda cabeceras e imágenes por ruta. Los productos guardados quedan
//! disponibles para lectura, de modo que una receta puede consumir la
//! salida de otra dentro del mismo proceso.
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use metis_core::{FrameIo, FrameIoError, HeaderReader, ProductData, SaveRequest};
use metis_domain::{CombineMethod, Frame, FrameGroup, Header, Image};

#[derive(Debug, Clone)]
struct StoredFrame {
    header: Header,
    image: Option<Image>,
}

#[derive(Debug, Default)]
pub struct MemoryFrameIo {
    files: RefCell<HashMap<PathBuf, StoredFrame>>,
    saved: RefCell<Vec<PathBuf>>,
}

impl MemoryFrameIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, header: Header, image: Image) {
        self.files.borrow_mut().insert(path.into(),
                                       StoredFrame { header,
                                                     image: Some(image) });
    }

    /// Variante encadenable de `insert`.
    pub fn with_frame(self, path: impl Into<PathBuf>, header: Header, image: Image) -> Self {
        self.insert(path, header, image);
        self
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.files.borrow().contains_key(path.as_ref())
    }

    pub fn header_of(&self, path: impl AsRef<Path>) -> Option<Header> {
        self.files.borrow().get(path.as_ref()).map(|f| f.header.clone())
    }

    pub fn image_of(&self, path: impl AsRef<Path>) -> Option<Image> {
        self.files.borrow().get(path.as_ref()).and_then(|f| f.image.clone())
    }

    /// Rutas escritas por `save_product`, en orden.
    pub fn saved_paths(&self) -> Vec<PathBuf> {
        self.saved.borrow().clone()
    }

    fn stored(&self, frame: &Frame) -> Result<StoredFrame, FrameIoError> {
        self.files
            .borrow()
            .get(&frame.path)
            .cloned()
            .ok_or_else(|| FrameIoError::DataNotFound { path: frame.path.display().to_string() })
    }
}

impl HeaderReader for MemoryFrameIo {
    fn read_header(&self, frame: &Frame) -> Result<Header, FrameIoError> {
        Ok(self.stored(frame)?.header)
    }
}

impl FrameIo for MemoryFrameIo {
    fn load_image(&self, frame: &Frame) -> Result<Image, FrameIoError> {
        self.stored(frame)?.image.ok_or_else(|| FrameIoError::Read { path: frame.path.display().to_string(),
                                                                     reason: "no image data".to_string() })
    }

    fn combine(&self, images: &[Image], method: CombineMethod) -> Result<Image, FrameIoError> {
        let first = images.first().ok_or_else(|| FrameIoError::Other("nothing to combine".to_string()))?;
        let shape = first.shape();
        if let Some(other) = images.iter().find(|i| i.shape() != shape) {
            return Err(FrameIoError::Other(format!("cannot combine {:?} with {:?}", shape, other.shape())));
        }
        for image in images {
            image.check_len().map_err(|e| FrameIoError::Other(e.to_string()))?;
        }
        let n = first.data.len();
        let mut data = Vec::with_capacity(n);
        let mut column = Vec::with_capacity(images.len());
        for px in 0..n {
            column.clear();
            column.extend(images.iter().map(|i| i.data[px]));
            data.push(match method {
                          CombineMethod::Sum => column.iter().sum::<f64>(),
                          CombineMethod::Average => column.iter().sum::<f64>() / column.len() as f64,
                          CombineMethod::Median => median(&mut column),
                      });
        }
        Image::new(shape.0, shape.1, data).map_err(|e| FrameIoError::Other(e.to_string()))
    }

    fn save_product(&self, request: &SaveRequest<'_>) -> Result<Frame, FrameIoError> {
        let product = request.product;
        let image = match product.data() {
            ProductData::Image(img) => Some(img.clone()),
            ProductData::Table(_) => None,
        };
        self.files.borrow_mut().insert(request.path.clone(),
                                       StoredFrame { header: request.header.clone(),
                                                     image });
        self.saved.borrow_mut().push(request.path.clone());
        debug!("{}: saved {} as {}", request.recipe, product.tag(), request.path.display());
        Ok(Frame::new(request.path.clone(), product.tag()).with_group(FrameGroup::Product)
                                                          .with_level(product.level())
                                                          .with_frame_type(product.frame_type()))
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
