pub mod block_quote;
pub mod code_fence;
pub mod footnote;
pub mod heading;
pub mod html_block;
pub mod list_item;
pub mod table;
pub mod thematic_break;

pub use block_quote::BlockQuote;
pub use code_fence::{CodeFence, FenceOpen};
pub use footnote::FootnoteDef;
pub use heading::{AtxHeading, SetextUnderline};
pub use html_block::HtmlBlock;
pub use list_item::{ListMarker, MarkerKind, pos_of_list_item, task_checkbox};
pub use table::TableRow;
pub use thematic_break::ThematicBreak;
