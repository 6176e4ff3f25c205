pub mod handlers;
pub mod store;

pub use store::{PreviewError, PreviewStore, PREVIEW_MAX_BODY_BYTES, PUBLIC_PREFIX};
