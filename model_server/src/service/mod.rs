mod handle;
mod manager;
mod slot;
mod snapshot;

pub use handle::TrainingHandle;
pub use manager::ModelManager;
