pub mod admin_helpers;
pub mod i18n_helpers;
pub mod public_helpers;
pub mod reader_helpers;
pub mod rendering_helpers;
pub mod sanitization_helpers;
pub mod slug_helpers;
pub mod submission_helpers;
pub mod tag_helpers;
