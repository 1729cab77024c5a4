use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, LedgerEntry, ResultEngine, ledger,
    util::{is_unique_violation, parse_uuid},
};

use super::{Engine, with_tx};

impl Engine {
    /// Ledger entries emitted for an appointment or a rental.
    pub async fn ledger_entries(&self, source_id: Uuid) -> ResultEngine<Vec<LedgerEntry>> {
        with_tx!(self, |db_tx| {
            let models = ledger::Entity::find()
                .filter(ledger::Column::SourceId.eq(source_id.to_string()))
                .order_by_asc(ledger::Column::OccurredAt)
                .order_by_asc(ledger::Column::EffectKind)
                .all(&db_tx)
                .await?;
            models.into_iter().map(LedgerEntry::try_from).collect()
        })
    }

    /// Append `entry` unless its `(source_id, effect_kind)` was already
    /// emitted, and return the id of the entry that is now in the ledger.
    ///
    /// A replayed effect is logged and otherwise ignored: the id of the
    /// first emission is returned.
    pub(super) async fn emit<C: ConnectionTrait>(
        &self,
        db: &C,
        entry: &LedgerEntry,
    ) -> ResultEngine<Uuid> {
        match self.insert_entry(db, entry).await {
            Ok(id) => Ok(id),
            Err(EngineError::DuplicateSideEffect(existing_id)) => {
                tracing::warn!(
                    source_id = %entry.source_id,
                    effect = entry.effect_kind.as_str(),
                    %existing_id,
                    "side effect already emitted, skipping"
                );
                parse_uuid(&existing_id, "ledger transaction")
            }
            Err(err) => Err(err),
        }
    }

    async fn existing_entry_id<C: ConnectionTrait>(
        &self,
        db: &C,
        entry: &LedgerEntry,
    ) -> ResultEngine<Option<String>> {
        let existing = ledger::Entity::find()
            .filter(ledger::Column::SourceId.eq(entry.source_id.to_string()))
            .filter(ledger::Column::EffectKind.eq(entry.effect_kind.as_str()))
            .one(db)
            .await?;
        Ok(existing.map(|model| model.id))
    }

    async fn insert_entry<C: ConnectionTrait>(
        &self,
        db: &C,
        entry: &LedgerEntry,
    ) -> ResultEngine<Uuid> {
        if let Some(existing_id) = self.existing_entry_id(db, entry).await? {
            return Err(EngineError::DuplicateSideEffect(existing_id));
        }

        let model: ledger::ActiveModel = entry.into();
        match model.insert(db).await {
            Ok(_) => {
                tracing::info!(
                    id = %entry.id,
                    source_id = %entry.source_id,
                    effect = entry.effect_kind.as_str(),
                    amount_minor = entry.amount_minor,
                    "ledger entry emitted"
                );
                Ok(entry.id)
            }
            Err(err) if is_unique_violation(&err) => match self.existing_entry_id(db, entry).await? {
                Some(existing_id) => Err(EngineError::DuplicateSideEffect(existing_id)),
                None => Err(err.into()),
            },
            Err(err) => Err(err.into()),
        }
    }
}
