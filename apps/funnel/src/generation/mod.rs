pub mod delivery;
pub mod documents;
pub mod selector;
pub mod tailor;

pub use delivery::{Delivery, ResendMailer};
pub use documents::{DocumentRenderer, MarkdownRenderer, RenderedDocuments};
pub use selector::{select_variant, DocumentVariant, VariantSet};
pub use tailor::{DocumentTailor, Tailor, TailoredContent};
