pub mod doc;
pub mod id;
pub mod layout;
pub mod model;
pub mod visibility;

pub use doc::{ImportError, MapDocument, export_document, import_document};
pub use id::{IdAllocator, NodeId};
pub use layout::{LayoutConfig, compute_layout};
pub use model::*;
pub use visibility::{collapse, collapse_other_siblings, expand, is_visible, visible_ids};
