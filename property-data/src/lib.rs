pub mod loader;

pub use loader::{
    CONTINUITY_TOLERANCE, RowKind, TABLE_KEY_PREFIX, TaxTableLoader, TaxTableLoaderError,
    TaxTableRecord,
};
