pub mod autolink;
pub mod link;
pub mod raw_html;

pub use autolink::Autolink;
pub use link::{InlineTail, LinkParts, normalize_label};
pub use raw_html::RawHtml;
