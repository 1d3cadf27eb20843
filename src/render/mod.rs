pub mod hud;
pub mod renderer;

pub use hud::Hud;
pub use renderer::Renderer;
