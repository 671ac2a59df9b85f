//! Constantes del motor.
//!
//! `ENGINE_VERSION` forma parte del fingerprint de cada ejecución: cambiarlo
//! invalida los fingerprints previos aunque recetas y datos no cambien.

/// Versión lógica del motor.
pub const ENGINE_VERSION: &str = "M1.0";

/// Identificador del pipeline escrito en las cabeceras de producto.
pub const PIPELINE_ID: &str = concat!("metisflow/", env!("CARGO_PKG_VERSION"));

/// Modo técnico del detector (único keyword que lee la clasificación).
pub const KEY_DPR_TECH: &str = "ESO DPR TECH";

pub const KEY_PRO_CATG: &str = "ESO PRO CATG";
pub const KEY_PRO_TYPE: &str = "ESO PRO TYPE";
pub const KEY_PRO_REC_ID: &str = "ESO PRO REC1 ID";
pub const KEY_PRO_PIPE_ID: &str = "ESO PRO REC1 PIPE ID";
pub const KEY_PRO_DATANCOM: &str = "ESO PRO DATANCOM";
pub const KEY_PRO_DATAHASH: &str = "ESO PRO DATAHASH";
pub const KEY_DATE: &str = "DATE";

/// Valor de `ESO PRO TYPE` para productos reducidos.
pub const PRO_TYPE_REDUCED: &str = "REDUCED";
