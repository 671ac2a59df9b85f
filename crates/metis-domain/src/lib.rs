// metis-domain library entry point
//
// Vocabulario del instrumento: ejes de configuración (slots), frames,
// cabeceras y payloads de imagen. No conoce el registro ni el motor.
pub mod error;
pub mod frame;
pub mod header;
pub mod image;
pub mod slot;

pub use error::DomainError;
pub use frame::{Frame, FrameGroup, FrameLevel, FrameSet, FrameType};
pub use header::{Header, HeaderValue};
pub use image::{CombineMethod, Image};
pub use slot::{Band, Detector, SlotBindings, SlotDomain, Source, Target};
