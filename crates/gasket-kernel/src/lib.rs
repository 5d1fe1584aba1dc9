//! # Gasket Kernel
//!
//! Closed-form generation of Apollonian gaskets. Three mutually tangent
//! generator circles determine, through Descartes' circle theorem, every
//! circle of the packing; this crate enumerates them down to a bounded
//! recursion level.
//!
//! ## Architecture
//!
//! ```text
//! Circle                ← Immutable (center, signed curvature, level)
//!     │
//! Complex               ← Principal-branch arithmetic for centers
//!     │
//! descartes             ← Children (seeding) and daughters (recursion)
//!     │
//! GasketBuilder         ← Ternary triple-rotation expansion → Gasket
//!     │
//! tangency::audit       ← Lineage check of every circle against its triple
//! ```
//!
//! ## Example
//!
//! ```
//! use gasket_kernel::{generate_gasket, seed::Preset};
//!
//! let [g1, g2, g3] = Preset::EqualTriple.generators().unwrap();
//! let gasket = generate_gasket(g1, g2, g3, 4).unwrap();
//! assert_eq!(gasket.len(), 3usize.pow(4) + 2);
//! ```

pub mod circle;
pub mod complex;
pub mod config;
pub mod descartes;
pub mod error;
pub mod gasket;
pub mod seed;
pub mod tangency;

pub use circle::{Circle, Point};
pub use complex::Complex;
pub use config::{ConfigError, GasketConfig};
pub use error::GasketError;
pub use gasket::{Gasket, GasketBuilder, GasketDigest, expected_circle_count, generate_gasket};
pub use seed::Preset;
pub use tangency::{AuditReport, audit};
