use plasma_db_types::{traits::UtxoDatabase, DbError, DbResult};
use plasma_primitives::{buf::Address, position::Position};
use plasma_state::utxo::{Utxo, UtxoKey};
use sled::transaction::ConflictableTransactionError;

use super::schemas::{UtxoOwnerByPositionSchema, UtxoSchema};
use crate::define_sled_database;

define_sled_database!(
    pub struct UtxoDBSled {
        pub(crate) utxo_tree: UtxoSchema,
        pub(crate) owner_tree: UtxoOwnerByPositionSchema,
    }
);

impl UtxoDatabase for UtxoDBSled {
    fn get_utxo(&self, owner: &Address, position: &Position) -> DbResult<Option<Utxo>> {
        self.utxo_tree.get(&UtxoKey::new(owner, position))
    }

    fn get_utxo_by_position(&self, position: &Position) -> DbResult<Option<Utxo>> {
        let Some(owner) = self.owner_tree.get(position)? else {
            return Ok(None);
        };

        match self.get_utxo(&owner, position)? {
            Some(utxo) => Ok(Some(utxo)),
            None => Err(DbError::Other(format!(
                "position index points at missing utxo {position}"
            ))),
        }
    }

    fn get_utxos_for_owner(&self, owner: &Address, include_spent: bool) -> DbResult<Vec<Utxo>> {
        Ok(self
            .utxo_tree
            .scan_prefix(owner)?
            .into_iter()
            .map(|(_, utxo)| utxo)
            .filter(|utxo| include_spent || utxo.valid)
            .collect())
    }

    fn insert_utxo(&self, utxo: Utxo) -> DbResult<()> {
        let key = utxo.key();
        self.config.with_retry(|| {
            self.utxo_tree
                .transaction_with(&self.owner_tree, |ut, ot| {
                    // a position holds exactly one output, whoever owns it
                    if ut.get(&key)?.is_some() || ot.get(&utxo.position)?.is_some() {
                        return Err(ConflictableTransactionError::Abort(DbError::UtxoExists(key)));
                    }

                    ut.insert(&key, &utxo)?;
                    ot.insert(&utxo.position, &utxo.owner)?;
                    Ok(())
                })
        })
    }

    fn spend_utxo(
        &self,
        owner: &Address,
        position: &Position,
        spender_keys: Vec<UtxoKey>,
    ) -> DbResult<()> {
        let key = UtxoKey::new(owner, position);
        self.config.with_retry(|| {
            self.utxo_tree.transaction(|ut| {
                let Some(mut utxo) = ut.get(&key)? else {
                    return Err(ConflictableTransactionError::Abort(DbError::UtxoNotFound(key)));
                };
                if !utxo.valid {
                    return Err(ConflictableTransactionError::Abort(
                        DbError::UtxoAlreadySpent(key),
                    ));
                }

                utxo.valid = false;
                utxo.spender_keys = spender_keys.clone();
                ut.insert(&key, &utxo)?;
                Ok(())
            })
        })
    }
}
