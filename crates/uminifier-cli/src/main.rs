//! main.rs — Binaire `uminifier`.
//!
//! Codes de sortie : 0 succès, 1 aide (sans argument) ou compilation échouée,
//! 2 erreur d'usage (clap), 255 erreur fatale.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use uminifier::ConversionResult;
use uminifier_cli::{colors, logging, run, Cli, FATAL_EXIT};

fn main() -> ExitCode {
    colors::init();

    if std::env::args_os().len() <= 1 {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("{e}");
        }
        return ExitCode::from(1);
    }

    let cli = Cli::parse();
    logging::init(cli.verbose);
    report(&cli, run(&cli))
}

fn report(cli: &Cli, outcome: anyhow::Result<ConversionResult>) -> ExitCode {
    match outcome {
        Ok(res) if res.is_success() => {
            if let (true, Some(n)) = (cli.verbose, res.bytes_reduced()) {
                println!("{}", colors::highlight(&format!("{n} Bytes reduced.")));
            }
            println!("\n{}", colors::success(&"Execution successful."));
            ExitCode::SUCCESS
        }
        Ok(res) => {
            let why = match (res.compile.timed_out, res.compile.exit_code) {
                (true, _) => "timed out".to_string(),
                (false, Some(0)) => format!("no output written to {}", res.output_path.display()),
                (false, Some(code)) => format!("exit code {code}"),
                (false, None) => "killed by a signal".to_string(),
            };
            let msg = if res.intermediate.on_disk() {
                format!("Compilation failed ({why}); minified source kept at {}", res.intermediate_path.display())
            } else {
                format!("Compilation failed ({why})")
            };
            eprintln!("{}", colors::failure(&msg));
            if let Some(diag) = res.compile.diagnostic() {
                eprintln!("{diag}");
            }
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("{}", colors::failure(&format!("{e:#}")));
            eprintln!("{}", colors::warning(&format!("{cli:?}")));
            ExitCode::from(FATAL_EXIT)
        }
    }
}
