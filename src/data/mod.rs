// Storage-layer modules
pub mod lead_store {
    pub use crate::lead_store::*;
}

pub mod list_store {
    pub use crate::list_store::*;
}
