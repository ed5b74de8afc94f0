pub mod hit;
pub mod overview;

pub use hit::{hit_resize_handle, hit_test, hit_test_rect};
pub use overview::{Overview, OverviewNode};
