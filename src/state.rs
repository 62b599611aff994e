use std::sync::Arc;

use crate::database::Database;
use crate::sequence::{PgCounterStore, SequenceAllocator};

pub type Sequences = SequenceAllocator<PgCounterStore>;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sequences: Arc<Sequences>,
    pub jwt_secret: Arc<str>,
}
