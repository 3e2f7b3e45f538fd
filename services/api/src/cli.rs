use crate::demo::{run_demo, run_laptop_schedule, DemoArgs, ScheduleArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use employee_portal::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Employee Portal",
    about = "Serve and explore the employee portal subsidy engine from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Laptop subsidy helpers
    Laptop {
        #[command(subcommand)]
        command: LaptopCommand,
    },
    /// Seed a sample employee directory and print entitlements and usage statistics
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum LaptopCommand {
    /// Print the installment schedule for an invoice amount
    Schedule(ScheduleArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Laptop {
            command: LaptopCommand::Schedule(args),
        } => run_laptop_schedule(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["employee-portal-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_laptop_schedule_amounts() {
        let cli = Cli::try_parse_from([
            "employee-portal-api",
            "laptop",
            "schedule",
            "--invoice-amount",
            "67500.50",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Laptop {
                command: LaptopCommand::Schedule(args),
            }) => assert_eq!(args.invoice_amount.to_string(), "67500.50"),
            other => panic!("expected laptop schedule, got {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_demo_dates() {
        let result = Cli::try_parse_from(["employee-portal-api", "demo", "--today", "03/01/2024"]);
        assert!(result.is_err());
    }
}
