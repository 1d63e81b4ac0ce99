//! Sled store for the plasma child chain.

mod batch;
mod config;
mod init;
pub mod lexicographic;
pub mod macros;
pub mod plasma;
pub mod tree;
pub mod utxo;

use std::{path::Path, sync::Arc};

// Re-exports
pub use config::SledDbConfig;
use plasma::db::PlasmaDBSled;
use plasma_db_types::{traits::DatabaseBackend, DbResult, StateBatch};
use utxo::db::UtxoDBSled;

pub use crate::init::open_sled_database;

pub const SLED_NAME: &str = "plasma-node";

/// Opens a complete Sled backend from datadir with all database types
pub fn open_sled_backend(
    datadir: &Path,
    dbname: &'static str,
    ops_config: SledDbConfig,
) -> anyhow::Result<Arc<SledBackend>> {
    let sled_db = open_sled_database(datadir, dbname)?;
    SledBackend::new(sled_db, ops_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize sled backend: {}", e))
        .map(Arc::new)
}

/// Complete Sled backend with all database types
#[derive(Debug)]
pub struct SledBackend {
    utxo_db: Arc<UtxoDBSled>,
    plasma_db: Arc<PlasmaDBSled>,
    config: SledDbConfig,
}

impl SledBackend {
    pub fn new(sled_db: Arc<sled::Db>, config: SledDbConfig) -> DbResult<Self> {
        let utxo_db = Arc::new(UtxoDBSled::new(sled_db.clone(), config.clone())?);
        let plasma_db = Arc::new(PlasmaDBSled::new(sled_db, config.clone())?);
        Ok(Self {
            utxo_db,
            plasma_db,
            config,
        })
    }
}

impl DatabaseBackend for SledBackend {
    type UtxoDb = UtxoDBSled;
    type PlasmaDb = PlasmaDBSled;

    fn utxo_db(&self) -> Arc<UtxoDBSled> {
        self.utxo_db.clone()
    }

    fn plasma_db(&self) -> Arc<PlasmaDBSled> {
        self.plasma_db.clone()
    }

    fn apply_batch(&self, batch: &StateBatch) -> DbResult<()> {
        batch::apply_batch(&self.utxo_db, &self.plasma_db, &self.config, batch)
    }
}

#[cfg(test)]
mod tests {
    use plasma_db_tests::backend_tests;
    use plasma_db_types::traits::UtxoDatabase;
    use plasma_primitives::{buf::Address, position::Position};
    use plasma_state::utxo::Utxo;

    use super::*;

    fn setup_backend() -> SledBackend {
        let db = sled::Config::new().temporary(true).open().unwrap();
        SledBackend::new(db.into(), SledDbConfig::test()).unwrap()
    }

    backend_tests!(setup_backend());

    #[test]
    fn test_backend_reopens_with_data() {
        let dir = tempfile::tempdir().unwrap();
        let owner = Address([3; 20]);

        {
            let backend = open_sled_backend(dir.path(), SLED_NAME, SledDbConfig::test()).unwrap();
            let batch = StateBatch::new()
                .insert_utxo(Utxo::standalone(owner, 10, Position::deposit(1)))
                .mark_deposit_included(1);
            backend.apply_batch(&batch).unwrap();
        }

        let backend = open_sled_backend(dir.path(), SLED_NAME, SledDbConfig::test()).unwrap();
        let utxo = backend
            .utxo_db()
            .get_utxo(&owner, &Position::deposit(1))
            .unwrap()
            .unwrap();
        assert_eq!(utxo.amount, 10);
        assert!(dir.path().join("sled").join(SLED_NAME).exists());
    }
}
