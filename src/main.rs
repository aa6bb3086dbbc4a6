use std::io::{self, Write};
use std::net::IpAddr;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::debug;

use paystrat::api::run_http_server;
use paystrat::client::{RemoteCalculator, RemoteError};
use paystrat::config::{ConfigError, ServerConfig};
use paystrat::core::{CalculationInput, InputError, MonthOverflow, calculate_payment_strategy};
use paystrat::render::{JsonRender, Render, TextRender};

#[derive(Parser, Debug)]
#[command(
    name = "paystrat",
    about = "Compare paying an obligation in installments against paying it as a lump sum"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculation over HTTP
    Serve {
        #[arg(long, help = "Address to bind; overrides PAYSTRAT_BIND")]
        bind: Option<IpAddr>,
        #[arg(long, help = "Port to listen on; overrides PORT")]
        port: Option<u16>,
    },
    /// Run one calculation and print the comparison
    Calculate(CalculateArgs),
}

#[derive(Args, Debug)]
struct CalculateArgs {
    #[arg(long, help = "Full value of the obligation")]
    total_amount: f64,
    #[arg(long, help = "Number of equal installments")]
    installments: u32,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "One-time fee charged when paying by installments"
    )]
    on_time_fee: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Annual return on uninvested funds in percent, e.g. 6"
    )]
    return_rate: f64,
    #[arg(long, help = "Date of the first installment (YYYY-MM-DD)")]
    first_payment_date: NaiveDate,
    #[arg(long, help = "Date the lump sum would be paid (YYYY-MM-DD)")]
    lump_sum_date: NaiveDate,
    #[arg(
        long,
        default_value_t = 0,
        help = "Leading installments to defer into the first payment"
    )]
    postpone_months: u32,
    #[arg(long, value_enum, default_value_t = CliMonthOverflow::Rollover)]
    month_overflow: CliMonthOverflow,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    #[arg(long, help = "Print only the recommendation and totals")]
    summary_only: bool,
    #[arg(
        long,
        help = "Base URL of a paystrat server to calculate on instead of locally"
    )]
    remote: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliMonthOverflow {
    Rollover,
    Clamp,
}

impl From<CliMonthOverflow> for MonthOverflow {
    fn from(value: CliMonthOverflow) -> Self {
        match value {
            CliMonthOverflow::Rollover => MonthOverflow::Rollover,
            CliMonthOverflow::Clamp => MonthOverflow::Clamp,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn build_input(args: &CalculateArgs) -> Result<CalculationInput, InputError> {
    let input = CalculationInput {
        total_amount: args.total_amount,
        installments: args.installments,
        on_time_fee: args.on_time_fee,
        return_rate: args.return_rate,
        first_payment_date: Some(args.first_payment_date),
        lump_sum_date: Some(args.lump_sum_date),
        postpone_months: args.postpone_months,
        month_overflow: args.month_overflow.into(),
    };
    input.validate()?;
    Ok(input)
}

async fn run_calculate(args: CalculateArgs) -> Result<(), AppError> {
    let input = build_input(&args)?;

    let result = match args.remote.as_deref() {
        Some(base_url) => Some(RemoteCalculator::new(base_url)?.calculate(&input).await?),
        None => calculate_payment_strategy(&input),
    };
    debug!(has_result = result.is_some(), "calculation finished");

    let renderer: Box<dyn Render> = match args.format {
        OutputFormat::Text => Box::new(TextRender {
            details: !args.summary_only,
        }),
        OutputFormat::Json => Box::new(JsonRender),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    renderer.render(result.as_ref(), &mut out)?;
    out.flush()?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Serve { bind, port } => {
            let config = ServerConfig::from_env()?.with_overrides(bind, port);
            run_http_server(config).await?;
            Ok(())
        }
        Command::Calculate(args) => run_calculate(args).await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// The single stderr line shown for a failed command.
fn report_failure(e: &AppError, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Error: {e}")
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "paystrat failed");
            let _ = report_failure(&e, &mut io::stderr().lock());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec![
            "paystrat",
            "calculate",
            "--total-amount",
            "12000",
            "--installments",
            "12",
            "--first-payment-date",
            "2024-01-31",
            "--lump-sum-date",
            "2024-01-31",
        ];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv)
    }

    fn calculate_args(cli: Cli) -> CalculateArgs {
        match cli.command {
            Command::Calculate(args) => args,
            other => panic!("expected calculate, got {other:?}"),
        }
    }

    #[test]
    fn calculate_defaults_optional_flags() {
        let args = calculate_args(parse(&[]).expect("valid args"));
        let input = build_input(&args).expect("valid input");

        assert_eq!(input.installments, 12);
        assert_eq!(input.on_time_fee, 0.0);
        assert_eq!(input.return_rate, 0.0);
        assert_eq!(input.postpone_months, 0);
        assert_eq!(input.month_overflow, MonthOverflow::Rollover);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.remote.is_none());
    }

    #[test]
    fn calculate_parses_every_flag() {
        let args = calculate_args(
            parse(&[
                "--on-time-fee",
                "50",
                "--return-rate",
                "6",
                "--postpone-months",
                "2",
                "--month-overflow",
                "clamp",
                "--format",
                "json",
                "--summary-only",
                "--remote",
                "http://127.0.0.1:5500",
            ])
            .expect("valid args"),
        );
        let input = build_input(&args).expect("valid input");

        assert_eq!(input.on_time_fee, 50.0);
        assert_eq!(input.return_rate, 6.0);
        assert_eq!(input.postpone_months, 2);
        assert_eq!(input.month_overflow, MonthOverflow::Clamp);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.summary_only);
        assert_eq!(args.remote.as_deref(), Some("http://127.0.0.1:5500"));
    }

    #[test]
    fn calculate_rejects_unparsable_date() {
        let err = Cli::try_parse_from([
            "paystrat",
            "calculate",
            "--total-amount",
            "100",
            "--installments",
            "2",
            "--first-payment-date",
            "31/01/2024",
            "--lump-sum-date",
            "2024-01-31",
        ])
        .expect_err("must reject non-ISO date");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn build_input_rejects_zero_total_as_missing() {
        let args = calculate_args(parse(&[]).expect("valid args"));
        let args = CalculateArgs {
            total_amount: 0.0,
            ..args
        };
        let err = build_input(&args).expect_err("zero total");
        assert_eq!(err, InputError::Missing("totalAmount"));
    }

    #[test]
    fn build_input_rejects_negative_fee() {
        let args = calculate_args(parse(&["--on-time-fee=-5"]).expect("valid args"));
        let err = build_input(&args).expect_err("negative fee");
        assert_eq!(err.field(), "onTimeFee");
    }

    #[test]
    fn failure_is_reported_on_one_line() {
        let mut out = Vec::new();
        report_failure(&AppError::Input(InputError::Missing("totalAmount")), &mut out)
            .expect("write");
        assert_eq!(
            String::from_utf8(out).expect("utf-8"),
            "Error: Missing required: totalAmount\n"
        );

        let mut out = Vec::new();
        let err = AppError::Config(ConfigError::InvalidPort {
            var: "PORT",
            value: "eighty".to_string(),
        });
        report_failure(&err, &mut out).expect("write");
        assert_eq!(
            String::from_utf8(out).expect("utf-8"),
            "Error: Configuration error: PORT must be a port number, got \"eighty\"\n"
        );
    }

    #[test]
    fn serve_accepts_bind_and_port() {
        let cli = Cli::try_parse_from(["paystrat", "serve", "--bind", "127.0.0.1", "--port", "8080"])
            .expect("valid args");
        match cli.command {
            Command::Serve { bind, port } => {
                assert_eq!(bind, Some(IpAddr::from([127, 0, 0, 1])));
                assert_eq!(port, Some(8080));
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }
}
