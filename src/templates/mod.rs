//! Saved watermark templates and last-used settings.

pub mod error;
pub mod record;
pub mod store;

pub use error::TemplateError;
pub use record::{
    timestamp, StoredPosition, TemplateInfo, TemplateRecord, DEFAULT_TEMPLATE_NAME,
    DEFAULT_TEMPLATE_TEXT, TIMESTAMP_FORMAT,
};
pub use store::{TemplateBundle, TemplateStore, Templates};
