//! Arranque del backend de log (`env_logger`).
//!
//! Respeta `RUST_LOG`; sin él, el filtro por defecto es `info`. Puede
//! llamarse varias veces: sólo la primera instala el logger.
use env_logger::Env;

pub const DEFAULT_FILTER: &str = "info";

pub fn init() {
    init_with(DEFAULT_FILTER);
}

/// Como `init`, con otro filtro por defecto.
pub fn init_with(default_filter: &str) {
    let installed = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).format_timestamp_millis()
                                                                                                   .try_init()
                                                                                                   .is_ok();
    if installed {
        log::debug!("logger installed (default filter '{default_filter}')");
    }
}
