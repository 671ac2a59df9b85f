//! Items de datos del instrumento.
//!
//! Cada declaración es un template; `register_catalogue` interna todas sus
//! variantes concretas (p.ej. `MASTER_DARK_{detector}` da tres items).
use std::sync::Arc;

use metis_core::item::{DataItem, ItemRegistry, ItemTemplate};
use metis_core::{data_item, PipelineError};
use once_cell::sync::OnceCell;

data_item! {
    /// Exposición oscura cruda.
    pub DarkRaw {
        name: "DARK_{detector}_RAW",
        title: "{detector} raw dark",
        description: "Raw dark exposure of the {detector} detector",
        group: Raw,
        frame_type: Image,
        extensions { "DET1.DATA" => Image },
    }
}

data_item! {
    /// Exposición cruda de imagen.
    pub ImageRaw {
        name: "{band}_IMAGE_{target}_RAW",
        title: "{band} {target} raw image",
        description: "Raw {target} exposure in the {band} imaging band",
        group: Raw,
        frame_type: Image,
        restrict { band: ["LM", "N"] },
        extensions { "DET1.DATA" => Image },
    }
}

data_item! {
    /// Flat crudo.
    pub FlatRaw {
        name: "{band}_FLAT_{source}_RAW",
        title: "{band} {source} raw flat",
        description: "Raw {band} flat field illuminated by {source}",
        group: Raw,
        frame_type: Image,
        restrict { band: ["LM", "N"] },
        extensions { "DET1.DATA" => Image },
    }
}

data_item! {
    pub MasterDark {
        name: "MASTER_DARK_{detector}",
        title: "{detector} master dark",
        description: "Combined dark current of the {detector} detector",
        group: Calib,
        level: Final,
        frame_type: Image,
    }
}

data_item! {
    pub MasterFlat {
        name: "MASTER_IMG_FLAT_{source}_{band}",
        title: "{band} {source} master flat",
        description: "Normalised {band} imaging flat from {source} exposures",
        group: Calib,
        level: Final,
        frame_type: Image,
        restrict { band: ["LM", "N"] },
    }
}

data_item! {
    pub PersistenceMap {
        name: "PERSISTENCE_MAP",
        title: "Persistence map",
        description: "Residual signal from previous exposures",
        group: Calib,
        level: Final,
        frame_type: Image,
    }
}

data_item! {
    pub GainMap {
        name: "GAIN_MAP_{detector}",
        title: "{detector} gain map",
        description: "Per-pixel gain of the {detector} detector",
        group: Calib,
        level: Final,
        frame_type: Image,
    }
}

data_item! {
    pub LinearityMap {
        name: "LINEARITY_{detector}",
        title: "{detector} linearity",
        description: "Non-linearity coefficients of the {detector} detector",
        group: Calib,
        level: Final,
        frame_type: Image,
    }
}

data_item! {
    pub BadPixMap {
        name: "BADPIX_MAP_{detector}",
        title: "{detector} bad pixel map",
        description: "Known bad pixels of the {detector} detector",
        group: Calib,
        level: Final,
        frame_type: Image,
    }
}

data_item! {
    /// Imagen reducida (dark y flat aplicados).
    pub BasicReduced {
        name: "{band}_{target}_BASIC_REDUCED",
        title: "{band} {target} basic reduced image",
        description: "Dark subtracted and flat fielded {target} image in the {band} band",
        group: Product,
        level: Intermediate,
        frame_type: Image,
        restrict { band: ["LM", "N"] },
    }
}

/// Todos los templates del catálogo, en orden de declaración.
pub fn catalogue() -> Vec<ItemTemplate> {
    vec![DarkRaw::template(),
         ImageRaw::template(),
         FlatRaw::template(),
         MasterDark::template(),
         MasterFlat::template(),
         PersistenceMap::template(),
         GainMap::template(),
         LinearityMap::template(),
         BadPixMap::template(),
         BasicReduced::template()]
}

/// Registra el catálogo completo. Devuelve cuántos items nuevos se
/// añadieron (0 si ya estaba registrado).
pub fn register_catalogue(registry: &ItemRegistry) -> Result<usize, PipelineError> {
    let mut added = 0;
    for template in catalogue() {
        added += registry.register_template(&template)?;
    }
    Ok(added)
}

static CATALOGUE: OnceCell<Arc<ItemRegistry>> = OnceCell::new();

/// Registro global con el catálogo ya cargado (una sola vez por proceso).
pub fn global_registry() -> Result<Arc<ItemRegistry>, PipelineError> {
    CATALOGUE.get_or_try_init(|| {
                 let registry = ItemRegistry::global();
                 register_catalogue(&registry)?;
                 Ok(registry)
             })
             .map(Arc::clone)
}
