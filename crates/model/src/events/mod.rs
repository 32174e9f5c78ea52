pub mod account;
pub mod order;
pub mod position;

pub use account::AccountState;
pub use order::OrderEventAny;
pub use position::PositionEventAny;
