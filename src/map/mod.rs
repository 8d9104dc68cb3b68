mod dots;
mod geometry;
pub mod layer;
mod projection;
mod renderer;
mod spatial;

pub use dots::DotLayer;
pub use layer::{Bounds, Layer, Polygon, Region};
pub use projection::{Viewport, CONUS};
pub use renderer::{Boundaries, FillColors, MapFrame, MapRenderer, RenderRequest};
