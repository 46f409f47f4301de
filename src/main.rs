use clap::{Parser, ValueEnum};
use colored::Colorize;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use std::error::Error;
use std::path::PathBuf;
use vpc_planner::{load_config, output, plan_from_config};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Tree,
    Json,
    Csv,
    Terraform,
    Pulumi,
}

/// Plan VPC, zone and subnet CIDR blocks from a YAML config.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the plan config.
    #[arg(short, long, env = "VPC_PLANNER_CONFIG", default_value = "vpc-plan.yml")]
    config: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Tree)]
    format: Format,
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    if log4rs::init_file("log4rs.yml", Default::default()).is_ok() {
        return Ok(());
    }
    let stderr = ConsoleAppender::builder().target(Target::Stderr).build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(log::LevelFilter::Info))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    init_logging()?;
    let args = Args::parse();
    log::info!("#Start main() {args:?}");

    let cluster = match load_config(&args.config).and_then(|config| plan_from_config(&config)) {
        Ok(cluster) => cluster,
        Err(e) if e.is_user_facing() => {
            eprintln!("{} {e}", "Config ERROR:".on_red());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    match args.format {
        Format::Tree => print!("{}", output::render_tree(&cluster)),
        Format::Json => println!("{}", output::render_json(&cluster)?),
        Format::Csv => print!("{}", output::render_csv(&cluster)),
        Format::Terraform => println!("{}", output::render_terraform(&cluster)),
        Format::Pulumi => println!("{}", output::render_pulumi(&cluster)),
    }

    Ok(())
}
