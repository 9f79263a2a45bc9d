//! Built-in handler implementations.

mod forbid;
mod replace;
mod table;
mod view;

pub use forbid::Forbid;
pub use replace::{Replacing, TryReplacing, replacing, try_replacing};
pub use table::{PredicateTable, TableHandler};
pub use view::View;
