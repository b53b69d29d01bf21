//! Tabular Q-learning
//!
//! This module holds the learning machinery that does not depend on how the
//! episode is driven:
//!
//! - [`StateEncoder`]: maps an (agent, enemy, world) triple to one of 144 states
//! - [`QTable`]: dense action-value store with the Q-learning update
//! - [`EpsilonGreedy`] / [`EpsilonSchedule`]: exploration policy and its decay
//! - [`serialization`]: the `state,action,q_value` CSV snapshot codec
//!
//! ## Usage Example
//!
//! ```
//! use evader::q_learning::{EpsilonGreedy, QTable, StateEncoder};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut table = QTable::new(4, StateEncoder::NUM_STATES);
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! table.update(17, 2, 1.0, 18, 0.5, 0.9)?;
//! let action = EpsilonGreedy::new(0.0).select_action(&table, 17, true, &mut rng)?;
//! assert_eq!(action, 2);
//! # Ok::<(), evader::Error>(())
//! ```

pub mod encoder;
pub mod policy;
pub mod q_table;
pub mod serialization;

pub use encoder::{StateEncoder, StateFeatures};
pub use policy::{EpsilonGreedy, EpsilonSchedule};
pub use q_table::QTable;
pub use serialization::LoadReport;
