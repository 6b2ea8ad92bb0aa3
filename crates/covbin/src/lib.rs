//! covbin: functional coverage bins for constrained-random verification
//!
//! A [`CoverageModel`] holds an ordered list of bins. Each bin covers a
//! rectangular region of an N-dimensional integer space and counts the
//! samples that land in it. The model answers coverage questions and picks
//! the next region worth stimulating.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐   ┌───────────────┐   ┌──────────────────────────┐
//! │ generate      │   │ cross         │   │ CoverageModel            │
//! │ make_range    │──►│ N-way product │──►│  BinStore (merge policy) │
//! │ gen_values    │   │ kind combine  │   │  record / select / codec │
//! └───────────────┘   └───────────────┘   └────────────┬─────────────┘
//!                                                      │
//!                      AlertLog ◄── RandomSource ◄─────┤
//!                      VendorCoverage ◄────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use covbin::{gen_bin, BinOptions, CoverageModel};
//!
//! let mut model = CoverageModel::named("addr");
//! model.add_bins(&BinOptions::new(), gen_bin(0, 255, 4))?;
//! while !model.is_covered() {
//!     let point = model.rand_point(100.0)?;
//!     model.record(&point)?;
//! }
//! assert_eq!(model.cov(), 100.0);
//! # Ok::<(), covbin::CovError>(())
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod alert;
mod bin;
mod codec;
mod config;
mod cross;
mod generate;
#[allow(clippy::module_name_repetitions)]
mod model;
mod range;
mod registry;
mod report;
mod result;
mod rng;
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod select;
mod store;
mod vendor;


pub use alert::{Alert, AlertLog, AlertSink, Severity};
pub use bin::{percent_for, Bin, BinKind, BinList, PERCENT_SENTINEL};
pub use codec::Database;
pub use config::{BinOptions, CountMode, IllegalMode, ModelSettings, SelectMode, WeightMode};
pub use cross::{cross, CrossBuilder, MAX_CROSS_DIMS};
pub use generate::{
    gen_bin, gen_bins, gen_values, ignore_bin, ignore_values, illegal_bin, illegal_values,
    make_discrete, make_range, MAX_GENERATED_BINS,
};
pub use model::{CoverageModel, UNNAMED_MODEL};
pub use range::{Range, RangeSet};
pub use registry::{CoverageRegistry, ModelId};
pub use report::{CoverageSummary, TextReport};
pub use result::{CovError, CovResult};
pub use rng::{RandomSource, Seed, Xorshift64};
pub use store::{BinStore, InsertOutcome, GROWTH_QUANTUM};
pub use vendor::{NullVendor, VendorCoverage, VendorHandle};
