use std::error::Error;

use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};
use engine::{Engine, NewProfessionalCmd, NewServiceCmd, SlotInterval, WorkingDays};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "salon_admin")]
#[command(about = "Admin utilities for the salon (bootstrap professionals/services/machines)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./salon.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Professional(Professional),
    Service(Service),
    Machine(Machine),
}

#[derive(Args, Debug)]
struct Professional {
    #[command(subcommand)]
    command: ProfessionalCommand,
}

#[derive(Subcommand, Debug)]
enum ProfessionalCommand {
    Create(ProfessionalCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct ProfessionalCreateArgs {
    #[arg(long)]
    name: String,
    /// Comma separated weekday codes.
    #[arg(long, default_value = "mon,tue,wed,thu,fri", value_parser = parse_working_days)]
    working_days: WorkingDays,
    /// Start of the working window, `HH:MM`.
    #[arg(long, default_value = "09:00", value_parser = parse_time)]
    work_start: NaiveTime,
    /// End of the working window, `HH:MM`.
    #[arg(long, default_value = "18:00", value_parser = parse_time)]
    work_end: NaiveTime,
    /// 15, 30, 45 or 60.
    #[arg(long, default_value_t = 30)]
    slot_interval: i64,
}

#[derive(Args, Debug)]
struct Service {
    #[command(subcommand)]
    command: ServiceCommand,
}

#[derive(Subcommand, Debug)]
enum ServiceCommand {
    Create(ServiceCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct ServiceCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    duration_minutes: i64,
    /// Price in minor units.
    #[arg(long)]
    price_minor: i64,
    /// Machine the service needs, if any.
    #[arg(long)]
    machine_id: Option<Uuid>,
    /// Commission of the professional in basis points (1000 = 10%).
    #[arg(long)]
    commission_bps: Option<i64>,
}

#[derive(Args, Debug)]
struct Machine {
    #[command(subcommand)]
    command: MachineCommand,
}

#[derive(Subcommand, Debug)]
enum MachineCommand {
    Create(MachineCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct MachineCreateArgs {
    #[arg(long)]
    name: String,
    /// Daily rental cost in minor units.
    #[arg(long)]
    daily_cost_minor: i64,
}

fn parse_working_days(raw: &str) -> Result<WorkingDays, String> {
    WorkingDays::try_from(raw).map_err(|err| err.to_string())
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|err| format!("invalid time {raw:?}: {err}"))
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Professional(Professional {
            command: ProfessionalCommand::Create(args),
        }) => {
            let slot_interval = match SlotInterval::try_from(args.slot_interval) {
                Ok(v) => v,
                Err(err) => {
                    eprintln!("{err}");
                    std::process::exit(2);
                }
            };
            let id = engine
                .new_professional(NewProfessionalCmd {
                    name: args.name.clone(),
                    working_days: args.working_days,
                    work_start: args.work_start,
                    work_end: args.work_end,
                    slot_interval,
                })
                .await?;
            println!("created professional: {} ({id})", args.name);
        }
        Command::Professional(Professional {
            command: ProfessionalCommand::List,
        }) => {
            for p in engine.professionals().await? {
                println!(
                    "{}\t{}\t{}\t{}-{}\t{}min",
                    p.id,
                    p.name,
                    p.working_days.to_codes(),
                    p.work_start.format("%H:%M"),
                    p.work_end.format("%H:%M"),
                    p.slot_interval.minutes()
                );
            }
        }
        Command::Service(Service {
            command: ServiceCommand::Create(args),
        }) => {
            let mut cmd = NewServiceCmd::new(&args.name, args.duration_minutes, args.price_minor);
            if let Some(machine_id) = args.machine_id {
                cmd = cmd.machine_id(machine_id);
            }
            if let Some(commission_bps) = args.commission_bps {
                cmd = cmd.commission_bps(commission_bps);
            }
            let id = engine.new_service(cmd).await?;
            println!("created service: {} ({id})", args.name);
        }
        Command::Service(Service {
            command: ServiceCommand::List,
        }) => {
            for s in engine.services().await? {
                let machine = s.machine_id.map(|id| id.to_string()).unwrap_or_default();
                println!(
                    "{}\t{}\t{}min\t{}\t{}",
                    s.id, s.name, s.duration_minutes, s.price_minor, machine
                );
            }
        }
        Command::Machine(Machine {
            command: MachineCommand::Create(args),
        }) => {
            let id = engine.new_machine(&args.name, args.daily_cost_minor).await?;
            println!("created machine: {} ({id})", args.name);
        }
        Command::Machine(Machine {
            command: MachineCommand::List,
        }) => {
            for m in engine.machines().await? {
                println!("{}\t{}\t{}", m.id, m.name, m.daily_cost_minor);
            }
        }
    }

    Ok(())
}
