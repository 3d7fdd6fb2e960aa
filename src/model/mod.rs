pub mod project;
pub mod timeline;
pub mod work_item;

pub use project::Project;
pub use timeline::{SelectionMode, TimelineScale, TimelineViewport, ViewParams};
pub use work_item::{Relation, WorkItem};
