//! Unique indices backing the one-rental-per-machine-day and the
//! one-entry-per-effect rules.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum MachineRentals {
    Table,
    MachineId,
    Date,
}

#[derive(Iden)]
enum LedgerTransactions {
    Table,
    SourceId,
    EffectKind,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("uidx-machine_rentals-machine_id-date")
                    .table(MachineRentals::Table)
                    .col(MachineRentals::MachineId)
                    .col(MachineRentals::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uidx-ledger_transactions-source_id-effect_kind")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::SourceId)
                    .col(LedgerTransactions::EffectKind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uidx-ledger_transactions-source_id-effect_kind")
                    .table(LedgerTransactions::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("uidx-machine_rentals-machine_id-date")
                    .table(MachineRentals::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
