//! Payload de imagen mínimo intercambiado con la librería de imagen externa.
//!
//! Las operaciones aquí son aritmética píxel a píxel; los algoritmos de
//! combinación viven del lado del colaborador de I/O.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f64>,
}

impl Image {
    /// Crea una imagen; `data` debe tener `width * height` elementos.
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Result<Self, DomainError> {
        if data.len() != width * height {
            return Err(DomainError::DataLength { expected: width * height,
                                                 found: data.len() });
        }
        Ok(Self { width, height, data })
    }

    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self { width,
               height,
               data: vec![value; width * height] }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// `DataLength` si `data` no tiene `width * height` elementos.
    pub fn check_len(&self) -> Result<(), DomainError> {
        if self.data.len() != self.width * self.height {
            return Err(DomainError::DataLength { expected: self.width * self.height,
                                                 found: self.data.len() });
        }
        Ok(())
    }

    fn check_shape(&self, other: &Image) -> Result<(), DomainError> {
        self.check_len()?;
        other.check_len()?;
        if self.shape() != other.shape() {
            return Err(DomainError::ShapeMismatch { expected: self.shape(),
                                                    found: other.shape() });
        }
        Ok(())
    }

    pub fn subtract(&self, other: &Image) -> Result<Image, DomainError> {
        self.check_shape(other)?;
        let data = self.data.iter().zip(other.data.iter()).map(|(a, b)| a - b).collect();
        Ok(Image { width: self.width,
                   height: self.height,
                   data })
    }

    /// División píxel a píxel; los divisores nulos producen 0.
    pub fn divide(&self, other: &Image) -> Result<Image, DomainError> {
        self.check_shape(other)?;
        let data = self.data
                       .iter()
                       .zip(other.data.iter())
                       .map(|(a, b)| if *b == 0.0 { 0.0 } else { a / b })
                       .collect();
        Ok(Image { width: self.width,
                   height: self.height,
                   data })
    }

    pub fn scale(&self, factor: f64) -> Image {
        Image { width: self.width,
                height: self.height,
                data: self.data.iter().map(|v| v * factor).collect() }
    }

    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }
}

/// Método de combinación de una pila de imágenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombineMethod {
    Average,
    Median,
    Sum,
}

impl CombineMethod {
    pub const ALL: &'static [CombineMethod] = &[CombineMethod::Average, CombineMethod::Median, CombineMethod::Sum];

    pub fn as_str(&self) -> &'static str {
        match self {
            CombineMethod::Average => "average",
            CombineMethod::Median => "median",
            CombineMethod::Sum => "sum",
        }
    }
}

impl fmt::Display for CombineMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CombineMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "average" | "mean" => Ok(CombineMethod::Average),
            "median" => Ok(CombineMethod::Median),
            "sum" => Ok(CombineMethod::Sum),
            _ => Err(DomainError::UnknownCombineMethod(s.to_string())),
        }
    }
}
