mod sensors;
mod side;
mod tasks;
mod timers;

pub use sensors::*;
pub use side::*;
pub use tasks::*;
pub use timers::*;
