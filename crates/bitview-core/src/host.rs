//! # Host Collaborators
//!
//! The engine never talks to a debugger directly. Everything it needs from
//! the inspected process comes through the traits in this module:
//!
//! - [`MemoryReader`]: read bytes at an address
//! - [`TypeSystem`]: look up type descriptors by qualified name
//! - [`Tracer`]: optional call tracing, a no-op unless a host injects one
//!
//! ## Why traits?
//!
//! The same decoding logic runs against a live debugger session, a DWARF file
//! plus a memory dump, or hand-built fixtures in tests. Each of those is just
//! another implementation of these traits.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DecodeResult;
use crate::types::{Address, BasicType, ByteOrder, PointerWidth, TypeDescriptor};

/// Access to the inspected process's memory
///
/// Implementations must return exactly `len` bytes or an error; a short read
/// is reported as [`DecodeError::ReadFailed`](crate::error::DecodeError::ReadFailed).
pub trait MemoryReader: Send + Sync
{
    /// Read `len` bytes starting at `address`.
    ///
    /// ## Errors
    ///
    /// Returns `ReadFailed` when the range is not fully readable.
    fn read_memory(&self, address: Address, len: usize) -> DecodeResult<Vec<u8>>;
}

/// Access to the inspected process's type metadata
pub trait TypeSystem: Send + Sync
{
    /// Look up a type by its fully qualified name (`clang::Type`,
    /// `llvm::PointerIntPairInfo<...>::MaskAndShiftConstants`).
    fn find_type(&self, qualified_name: &str) -> Option<Arc<TypeDescriptor>>;

    /// Byte order of the target
    fn byte_order(&self) -> ByteOrder;

    /// Pointer width of the target
    fn pointer_width(&self) -> PointerWidth;

    /// Descriptor for a basic type. The default asks [`find_type`](Self::find_type)
    /// first and falls back to the C defaults.
    fn basic_type(&self, basic: BasicType) -> Arc<TypeDescriptor>
    {
        self.find_type(basic.name())
            .unwrap_or_else(|| Arc::new(TypeDescriptor::basic(basic)))
    }
}

/// Call tracing hook
///
/// The engine reports entry and exit of its decode operations here. The
/// default [`NoopTracer`] does nothing; [`LogTracer`] forwards to `tracing`
/// with per-instance call depth.
pub trait Tracer: Send + Sync
{
    fn enter(&self, operation: &str);
    fn exit(&self, operation: &str, elapsed: Duration);
}

/// Tracer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer
{
    fn enter(&self, _operation: &str) {}

    fn exit(&self, _operation: &str, _elapsed: Duration) {}
}

/// Tracer that emits `trace`-level events, indented by call depth
#[derive(Debug, Default)]
pub struct LogTracer
{
    depth: std::sync::atomic::AtomicUsize,
}

impl LogTracer
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Current nesting depth (0 outside any traced operation)
    pub fn depth(&self) -> usize
    {
        self.depth.load(std::sync::atomic::Ordering::Relaxed)
    }
}

impl Tracer for LogTracer
{
    fn enter(&self, operation: &str)
    {
        let depth = self.depth.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        tracing::trace!(depth, "{:indent$}{operation}()", "", indent = depth * 2);
    }

    fn exit(&self, operation: &str, elapsed: Duration)
    {
        let depth = self.depth.fetch_sub(1, std::sync::atomic::Ordering::Relaxed).saturating_sub(1);
        tracing::trace!(
            depth,
            elapsed_ns = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX),
            "{:indent$}{operation}() exit",
            "",
            indent = depth * 2
        );
    }
}

/// RAII guard pairing [`Tracer::enter`] with [`Tracer::exit`]
pub(crate) struct TraceScope<'a>
{
    tracer: &'a dyn Tracer,
    operation: &'static str,
    started: std::time::Instant,
}

impl<'a> TraceScope<'a>
{
    pub(crate) fn new(tracer: &'a dyn Tracer, operation: &'static str) -> Self
    {
        tracer.enter(operation);
        Self {
            tracer,
            operation,
            started: std::time::Instant::now(),
        }
    }
}

impl Drop for TraceScope<'_>
{
    fn drop(&mut self)
    {
        self.tracer.exit(self.operation, self.started.elapsed());
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_tracer_depth_is_per_instance()
    {
        let first = LogTracer::new();
        let second = LogTracer::new();
        {
            let _outer = TraceScope::new(&first, "outer");
            let _inner = TraceScope::new(&first, "inner");
            assert_eq!(first.depth(), 2);
            assert_eq!(second.depth(), 0);
        }
        assert_eq!(first.depth(), 0);
    }
}
