/*!
 * Monitoring
 * Tracing setup for allocator diagnostics
 */

mod tracer;

pub use tracer::init_tracing;
