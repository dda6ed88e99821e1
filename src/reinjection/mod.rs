/*!
 * Reinjection of translations and per-locale overrides into SQL.
 *
 * - `reinjector`: statement rewriting
 * - `overrides`: declarative override rules
 * - `address`: deterministic address synthesis used by address rules
 */

pub mod address;
pub mod overrides;
pub mod reinjector;

pub use overrides::{OverrideAction, OverrideContext, OverrideRule};
pub use reinjector::{ReinjectionOutput, ReinjectionStats, Reinjector, TranslationMap};
