//! Frontera con el colaborador externo de ficheros.
//!
//! El motor sólo lee una palabra clave de cabecera (`ESO DPR TECH`); carga,
//! combinación y guardado de píxeles se delegan por completo.
use std::path::PathBuf;

use metis_domain::{CombineMethod, Frame, FrameSet, Header, Image};

use crate::errors::FrameIoError;
use crate::params::ParameterList;
use crate::product::Product;

/// Acceso de sólo lectura a cabeceras.
pub trait HeaderReader {
    fn read_header(&self, frame: &Frame) -> Result<Header, FrameIoError>;
}

/// Colaborador completo de I/O.
pub trait FrameIo: HeaderReader {
    fn load_image(&self, frame: &Frame) -> Result<Image, FrameIoError>;

    fn combine(&self, images: &[Image], method: CombineMethod) -> Result<Image, FrameIoError>;

    /// Escribe un producto y devuelve el frame emitido.
    fn save_product(&self, request: &SaveRequest<'_>) -> Result<Frame, FrameIoError>;
}

/// Todo lo que el guardado externo recibe: el frameset completo, la lista
/// de parámetros y los frames usados.
#[derive(Debug)]
pub struct SaveRequest<'a> {
    pub recipe: &'a str,
    pub product: &'a Product,
    pub frameset: &'a FrameSet,
    pub parameters: &'a ParameterList,
    pub used_frames: &'a [Frame],
    pub path: PathBuf,
    /// Cabecera final (tarjetas estándar + propias del producto).
    pub header: Header,
}
