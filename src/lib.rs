#![forbid(unsafe_code)]

pub mod assets;
pub mod composite_cpu;
pub mod compositor;
pub mod config;
pub mod cover;
pub mod encode;
pub mod error;
pub mod render;
pub mod render_cpu;
pub mod session;

pub use assets::decode::StandardDecoder;
pub use assets::{ImageDecoder, PreparedImage, load_overlay};
pub use compositor::Compositor;
pub use config::FrameProfile;
pub use cover::{CropRect, compute_cover};
pub use encode::{encode_png, encode_png_data_url};
pub use error::{RingframeError, RingframeResult};
pub use render::{FrameRgba, RenderSurface};
pub use render_cpu::CpuSurface;
pub use session::{CompletionOutcome, SelectionTicket, Session};
