//! Component aggregation: template inheritance, widget composition, style and
//! script collection.

mod component;
mod descriptor;
mod params;
mod scripts;

pub use component::Component;
pub use descriptor::ComponentDescriptor;
pub use params::LayoutParameters;
pub use scripts::collect_scripts;
