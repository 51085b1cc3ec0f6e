//! Everything that writes pixels: depth plane, frame buffer view,
//! triangle rasterizers, 2D compositing and the frame entry point.

pub mod blit;
pub mod depth;
pub mod framebuffer;
pub mod rasterizer;
pub mod renderer;

pub use blit::{blit, draw_rect_outline, fill_rect};
pub use depth::DepthBuffer;
pub use framebuffer::FrameBuffer;
pub use rasterizer::{
    CullMode, EdgeFunctionRasterizer, FlatShader, NormalShader, PixelShader,
    Rasterizer, RasterizerDispatcher, RasterizerType, ScanlineRasterizer,
};
pub use renderer::{FrameStats, Renderer, Scene};
