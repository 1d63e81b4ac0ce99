//! Typed views over sled trees.

use std::{fmt, marker::PhantomData};

use borsh::{BorshDeserialize, BorshSerialize};
use plasma_db_types::{DbError, DbResult};
use sled::{
    transaction::{
        ConflictableTransactionError, ConflictableTransactionResult, TransactionResult,
        TransactionalTree,
    },
    Transactional,
};

use crate::lexicographic::{decode_key, encode_key, LexicographicKey};

/// A table stored in its own sled tree.
///
/// Keys use the lexicographic encoding, values are borsh.
pub trait Schema: fmt::Debug + Send + Sync + 'static {
    const TREE_NAME: &'static str;
    type Key: LexicographicKey;
    type Value: BorshSerialize + BorshDeserialize;
}

fn codec_err<S: Schema>(err: impl fmt::Display) -> DbError {
    DbError::CodecError(format!("{}: {err}", S::TREE_NAME))
}

fn encode_value<S: Schema>(value: &S::Value) -> DbResult<Vec<u8>> {
    borsh::to_vec(value).map_err(codec_err::<S>)
}

fn decode_value<S: Schema>(data: &[u8]) -> DbResult<S::Value> {
    borsh::from_slice(data).map_err(codec_err::<S>)
}

fn decode_entry<S: Schema>(key: &[u8], value: &[u8]) -> DbResult<(S::Key, S::Value)> {
    let key = decode_key(key).map_err(codec_err::<S>)?;
    Ok((key, decode_value::<S>(value)?))
}

fn io_err(err: sled::Error) -> DbError {
    DbError::IoError(err.to_string())
}

/// Handle to the tree backing schema `S`.
pub struct SledTree<S: Schema> {
    inner: sled::Tree,
    _schema: PhantomData<S>,
}

impl<S: Schema> fmt::Debug for SledTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SledTree").field("tree", &S::TREE_NAME).finish()
    }
}

impl<S: Schema> SledTree<S> {
    pub fn open(db: &sled::Db) -> DbResult<Self> {
        let inner = db.open_tree(S::TREE_NAME).map_err(io_err)?;
        Ok(Self {
            inner,
            _schema: PhantomData,
        })
    }

    pub fn get(&self, key: &S::Key) -> DbResult<Option<S::Value>> {
        self.inner
            .get(encode_key(key))
            .map_err(io_err)?
            .map(|raw| decode_value::<S>(&raw))
            .transpose()
    }

    pub fn contains_key(&self, key: &S::Key) -> DbResult<bool> {
        self.inner.contains_key(encode_key(key)).map_err(io_err)
    }

    pub fn insert(&self, key: &S::Key, value: &S::Value) -> DbResult<()> {
        self.inner
            .insert(encode_key(key), encode_value::<S>(value)?)
            .map_err(io_err)?;
        Ok(())
    }

    /// Entry with the greatest key.
    pub fn last(&self) -> DbResult<Option<(S::Key, S::Value)>> {
        self.inner
            .last()
            .map_err(io_err)?
            .map(|(k, v)| decode_entry::<S>(&k, &v))
            .transpose()
    }

    /// All entries whose encoded key starts with the encoding of `prefix`, in
    /// key order.
    pub fn scan_prefix<P: LexicographicKey>(
        &self,
        prefix: &P,
    ) -> DbResult<Vec<(S::Key, S::Value)>> {
        self.inner
            .scan_prefix(encode_key(prefix))
            .map(|entry| {
                let (k, v) = entry.map_err(io_err)?;
                decode_entry::<S>(&k, &v)
            })
            .collect()
    }

    /// Up to `limit` entries with keys at or after `start`, in key order.
    pub fn range_from(&self, start: &S::Key, limit: usize) -> DbResult<Vec<(S::Key, S::Value)>> {
        self.inner
            .range(encode_key(start)..)
            .take(limit)
            .map(|entry| {
                let (k, v) = entry.map_err(io_err)?;
                decode_entry::<S>(&k, &v)
            })
            .collect()
    }

    /// The untyped tree, for transactions spanning several schemas.
    pub(crate) fn raw(&self) -> &sled::Tree {
        &self.inner
    }

    /// Runs `f` as a sled transaction over this tree.
    pub fn transaction<F, R>(&self, f: F) -> TransactionResult<R, DbError>
    where
        F: Fn(&TxTree<'_, S>) -> ConflictableTransactionResult<R, DbError>,
    {
        self.inner.transaction(|t| f(&TxTree::new(t)))
    }

    /// Runs `f` as a sled transaction spanning this tree and `other`.
    pub fn transaction_with<T, F, R>(&self, other: &SledTree<T>, f: F) -> TransactionResult<R, DbError>
    where
        T: Schema,
        F: Fn(&TxTree<'_, S>, &TxTree<'_, T>) -> ConflictableTransactionResult<R, DbError>,
    {
        (&self.inner, &other.inner).transaction(|(a, b)| f(&TxTree::new(a), &TxTree::new(b)))
    }
}

/// Typed view of a tree inside a sled transaction.
pub struct TxTree<'a, S: Schema> {
    inner: &'a TransactionalTree,
    _schema: PhantomData<S>,
}

impl<'a, S: Schema> TxTree<'a, S> {
    pub(crate) fn new(inner: &'a TransactionalTree) -> Self {
        Self {
            inner,
            _schema: PhantomData,
        }
    }

    pub fn get(&self, key: &S::Key) -> ConflictableTransactionResult<Option<S::Value>, DbError> {
        match self.inner.get(encode_key(key))? {
            Some(raw) => decode_value::<S>(&raw)
                .map(Some)
                .map_err(ConflictableTransactionError::Abort),
            None => Ok(None),
        }
    }

    pub fn insert(&self, key: &S::Key, value: &S::Value) -> ConflictableTransactionResult<(), DbError> {
        let raw = encode_value::<S>(value).map_err(ConflictableTransactionError::Abort)?;
        self.inner.insert(encode_key(key), raw)?;
        Ok(())
    }
}

impl<S: Schema> fmt::Debug for TxTree<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxTree").field("tree", &S::TREE_NAME).finish()
    }
}
