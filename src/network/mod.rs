pub mod metadata;
pub mod network;
pub mod spec;

pub use network::Network;
pub use metadata::{InputType, ModelMetadata};
pub use spec::{LayerSpec, NetworkSpec};
