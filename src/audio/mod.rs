pub mod clock;
pub mod engine;
pub mod renderer;

pub use clock::StreamClock;
pub use engine::AudioEngine;
pub use renderer::RendererHandle;
