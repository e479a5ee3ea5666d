pub mod color;
pub mod linkage;
pub mod timeline;

pub use timeline::{
    Event, EventPatch, ROOT_SCOPE, TimelineConfig, Worldline, WorldlinePatch, is_root_scope,
};
