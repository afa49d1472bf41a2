// Domain-layer modules and shared errors/models
pub mod scoring {
    pub use crate::scoring::*;
}

pub mod predictor {
    pub use crate::predictor::*;
}

pub mod snapshot_store {
    pub use crate::snapshot_store::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
