//! Configuración del motor desde variables de entorno.
//!
//! Convención `METIS_*`; el fichero `.env` se carga una sola vez.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use log::debug;
use once_cell::sync::Lazy;

use crate::constants::PIPELINE_ID;

static DOTENV: Lazy<Option<PathBuf>> = Lazy::new(|| dotenv().ok());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directorio donde se escriben los productos.
    pub output_dir: PathBuf,
    /// Identificador escrito en `ESO PRO REC1 PIPE ID`.
    pub pipeline_id: String,
    /// Añadir `ESO PRO DATAHASH` a cada producto.
    pub write_checksums: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { output_dir: PathBuf::from("."),
               pipeline_id: PIPELINE_ID.to_string(),
               write_checksums: true }
    }
}

impl EngineConfig {
    /// Lee `METIS_OUTPUT_DIR`, `METIS_PIPELINE_ID` y `METIS_WRITE_CHECKSUMS`;
    /// lo que falte (o no se entienda) toma el valor por defecto.
    pub fn from_env() -> Self {
        if let Some(path) = Lazy::force(&DOTENV) {
            debug!("engine config: loaded {}", path.display());
        }
        let defaults = Self::default();
        let output_dir = env::var("METIS_OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir);
        let pipeline_id = env::var("METIS_PIPELINE_ID").unwrap_or(defaults.pipeline_id);
        let write_checksums = env::var("METIS_WRITE_CHECKSUMS").ok()
                                                               .and_then(|v| parse_flag(&v))
                                                               .unwrap_or(defaults.write_checksums);
        Self { output_dir,
               pipeline_id,
               write_checksums }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
