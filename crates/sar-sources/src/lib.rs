pub mod attachment;
pub mod denylist;
pub mod file;
pub mod html;
pub mod tree;

pub use attachment::SubjectMatcher;
pub use denylist::{Denylist, MetadataFile};
pub use html::{ExtractError, HtmlTextExtractor, TextExtractor};
pub use tree::{EntryKind, ExportTree, TreeLayout};
