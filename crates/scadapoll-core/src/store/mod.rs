// ── Synchronized item storage ──

mod collection;
mod sync;

pub use collection::ItemCollection;
pub use sync::MergeReport;
