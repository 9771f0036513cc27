pub mod alert;
pub mod category;
pub mod constants;
pub mod record;

pub use alert::{AlertEvent, AlertPayload, Attachment, RowFormat};
pub use category::{AlertTemplate, Category, CategoryQuery, DateWindow};
pub use record::{DocumentRecord, ResolvedDocument};
