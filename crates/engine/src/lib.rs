pub mod codec;
pub mod compositor;
pub mod crop;
pub mod filters;
pub mod mapper;
pub mod overlay;
pub mod resize;
pub mod session;
pub mod surface;
pub mod transform;

pub use codec::{decode, encode, Encoded};
pub use compositor::{crop_and_filter, render_overlay};
pub use crop::DragSession;
pub use mapper::{map_to_source, ScaleMode};
pub use overlay::{plan_overlay, LogoPlacement, OverlayLayout};
pub use session::{AiCompletion, AiRequest, AiTicket, EditorSession, EditorState, Export};
pub use transform::{apply_transform, Transform};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Cannot allocate a {width}x{height} drawing surface")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("'{operation}' is not allowed while the editor is {state}")]
    InvalidState {
        operation: &'static str,
        state: EditorState,
    },

    #[error("An AI request is already in progress")]
    Busy,
}

pub type Result<T> = std::result::Result<T, EngineError>;
