//! Host-side glue: control events, the cancellable frame loop and the
//! registry of visualizations a page declares.

pub mod frame_loop;
pub mod stage;

pub use frame_loop::{start, Animation, ControlEvent, LoopHandle, SimHandle};
pub use stage::Stage;
