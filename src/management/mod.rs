mod state;

pub use state::AuthStateStore;
pub use state::STATE_LENGTH;
pub use state::STATE_TTL;
