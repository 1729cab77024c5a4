//! Initial schema migration.
//!
//! - `professionals`: agenda owners with their working calendar
//! - `machines`: rentable equipment
//! - `services`: bookable services, optionally needing a machine
//! - `appointments`: booked services with status and payment state
//! - `machine_rentals`: one machine reserved for one business date
//! - `ledger_transactions`: finance entries emitted by lifecycle transitions

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Professionals {
    Table,
    Id,
    Name,
    WorkingDays,
    WorkStart,
    WorkEnd,
    SlotIntervalMinutes,
}

#[derive(Iden)]
enum Machines {
    Table,
    Id,
    Name,
    DailyCostMinor,
}

#[derive(Iden)]
enum Services {
    Table,
    Id,
    Name,
    DurationMinutes,
    PriceMinor,
    MachineId,
    CommissionBps,
}

#[derive(Iden)]
enum Appointments {
    Table,
    Id,
    ProfessionalId,
    ClientId,
    ServiceId,
    Date,
    StartAt,
    EndAt,
    Status,
    PaymentStatus,
    DepositMinor,
    TotalMinor,
    Notes,
    #[iden = "reminder_24h_sent"]
    Reminder24hSent,
    #[iden = "reminder_2h_sent"]
    Reminder2hSent,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum MachineRentals {
    Table,
    Id,
    MachineId,
    Date,
    Status,
    CostMinor,
    Notes,
    ExpenseTransactionId,
    CreatedAt,
}

#[derive(Iden)]
enum LedgerTransactions {
    Table,
    Id,
    Kind,
    AmountMinor,
    Category,
    Description,
    SourceKind,
    SourceId,
    EffectKind,
    OccurredAt,
    CreatedBy,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Master data
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Professionals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Professionals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Professionals::Name).string().not_null())
                    .col(
                        ColumnDef::new(Professionals::WorkingDays)
                            .string()
                            .not_null()
                            .default("mon,tue,wed,thu,fri"),
                    )
                    .col(ColumnDef::new(Professionals::WorkStart).time().not_null())
                    .col(ColumnDef::new(Professionals::WorkEnd).time().not_null())
                    .col(
                        ColumnDef::new(Professionals::SlotIntervalMinutes)
                            .big_integer()
                            .not_null()
                            .default(30),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Machines::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Machines::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Machines::Name).string().not_null())
                    .col(
                        ColumnDef::new(Machines::DailyCostMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Services::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Services::Name).string().not_null())
                    .col(
                        ColumnDef::new(Services::DurationMinutes)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Services::PriceMinor).big_integer().not_null())
                    .col(ColumnDef::new(Services::MachineId).string())
                    .col(ColumnDef::new(Services::CommissionBps).big_integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-services-machine_id")
                            .from(Services::Table, Services::MachineId)
                            .to(Machines::Table, Machines::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Appointments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Appointments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Appointments::ProfessionalId).string())
                    .col(ColumnDef::new(Appointments::ClientId).string().not_null())
                    .col(ColumnDef::new(Appointments::ServiceId).string().not_null())
                    .col(ColumnDef::new(Appointments::Date).date().not_null())
                    .col(ColumnDef::new(Appointments::StartAt).timestamp().not_null())
                    .col(ColumnDef::new(Appointments::EndAt).timestamp().not_null())
                    .col(ColumnDef::new(Appointments::Status).string().not_null())
                    .col(
                        ColumnDef::new(Appointments::PaymentStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Appointments::DepositMinor).big_integer())
                    .col(
                        ColumnDef::new(Appointments::TotalMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Appointments::Notes).string())
                    .col(
                        ColumnDef::new(Appointments::Reminder24hSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Appointments::Reminder2hSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Appointments::CreatedBy).string())
                    .col(ColumnDef::new(Appointments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-appointments-professional_id")
                            .from(Appointments::Table, Appointments::ProfessionalId)
                            .to(Professionals::Table, Professionals::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-appointments-service_id")
                            .from(Appointments::Table, Appointments::ServiceId)
                            .to(Services::Table, Services::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-appointments-professional_id-date")
                    .table(Appointments::Table)
                    .col(Appointments::ProfessionalId)
                    .col(Appointments::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-appointments-service_id-date")
                    .table(Appointments::Table)
                    .col(Appointments::ServiceId)
                    .col(Appointments::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Rentals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MachineRentals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MachineRentals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MachineRentals::MachineId).string().not_null())
                    .col(ColumnDef::new(MachineRentals::Date).date().not_null())
                    .col(
                        ColumnDef::new(MachineRentals::Status)
                            .string()
                            .not_null()
                            .default("scheduled"),
                    )
                    .col(
                        ColumnDef::new(MachineRentals::CostMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MachineRentals::Notes).string())
                    .col(ColumnDef::new(MachineRentals::ExpenseTransactionId).string())
                    .col(
                        ColumnDef::new(MachineRentals::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-machine_rentals-machine_id")
                            .from(MachineRentals::Table, MachineRentals::MachineId)
                            .to(Machines::Table, Machines::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(LedgerTransactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::SourceKind)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::SourceId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::EffectKind)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::CreatedBy).string())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(LedgerTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MachineRentals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Appointments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Services::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Machines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Professionals::Table).to_owned())
            .await?;
        Ok(())
    }
}
