//! Pass-through hooks for a simulator's native coverage database.
//!
//! A model mirrors its bins and hits into a [`VendorCoverage`] sink when one
//! is attached. The model never reads anything back beyond the scope handle,
//! so a sink that ignores every call leaves the model's behavior unchanged.

use crate::bin::BinKind;
use crate::range::RangeSet;
use std::fmt;

/// Opaque scope handle issued by a vendor sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VendorHandle(u64);

impl VendorHandle {
    /// Wrap a vendor-issued value
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the inner value
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Simulator-native coverage sink
#[allow(unused_variables)]
pub trait VendorCoverage: fmt::Debug {
    /// Open a scope for a single-dimension model
    fn create_point_scope(&mut self, name: &str) -> Option<VendorHandle> {
        None
    }

    /// Open a scope for a crossed model
    fn create_cross_scope(&mut self, name: &str) -> Option<VendorHandle> {
        None
    }

    /// Rename a scope
    fn set_name(&mut self, scope: VendorHandle, name: &str) {}

    /// Declare a bin; bins are declared in store order
    fn add_bin(&mut self, scope: VendorHandle, region: &RangeSet, kind: BinKind, goal: i64, name: &str) {}

    /// Record a hit on the bin at `index` (store order)
    fn inc_bin(&mut self, scope: VendorHandle, index: usize) {}
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVendor;

impl VendorCoverage for NullVendor {}
