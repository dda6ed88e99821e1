/*!
 * Lightweight SQL handling for seed files.
 *
 * This is not a SQL grammar. It knows enough about quoting, comments and
 * dollar-quoted strings to cut a file into statements, and enough about
 * `INSERT INTO ... VALUES` to recover tables, columns and row literals.
 *
 * - `splitter`: statement splitting on top-level semicolons
 * - `insert`: parsing of the two recognized INSERT shapes
 * - `literal`: quoting, unquoting and identifier helpers
 */

pub mod insert;
pub mod literal;
pub mod splitter;

pub use insert::{InsertParser, ParsedInsert};
pub use literal::StringLiteral;
pub use splitter::StatementSplitter;
