//! Job execution infrastructure.
//!
//! Worker threads, job queues and the CPU thread pool the mapper runs on.

pub mod cpu_pool;
pub mod panic_handler;
mod task;
mod worker;

pub use cpu_pool::CpuPool;
pub use panic_handler::{PanicHandler, PanicInfo, PanicStrategy};
