use crate::cli::Args;
use adhs_store::SharedStore;
use adhs_web::ServerConfig;
use anyhow::Context;
use clap::Parser;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

mod cli;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.logfile.as_deref())?;
    debug!("Parsed args: {args:?}");

    let store = SharedStore::load_file(&args.file, args.input.rdf_format()).inspect_err(|e| {
        error!("{e}");
    })?;

    let config = ServerConfig {
        store,
        bind: args.bind(),
        base_path: args.basepath.clone(),
        cors: args.cors,
        source: args.file.display().to_string(),
        query_timeout: args.query_timeout.map(Duration::from_secs),
    };
    adhs_web::serve(config).await
}

/// Installs the console logger and, if `logfile` is given, a debug logger writing to that file.
fn init_logging(verbose: u8, logfile: Option<&Path>) -> anyhow::Result<()> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_level(verbose));

    let file = logfile
        .map(|path| {
            open_logfile(path).map(|file| {
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(LevelFilter::DEBUG)
            })
        })
        .transpose()?;

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()?;
    if let Some(path) = logfile {
        info!("Logfile: {}", path.display());
    }
    Ok(())
}

fn console_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::ERROR,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

fn open_logfile(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Can not create logfile: {}", path.display()))
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use crate::cli::InputFormat;
    use anyhow::Result;
    use assert_cmd::Command;
    use assert_fs::prelude::*;
    use assert_fs::{NamedTempFile, TempDir};
    use oxrdfio::RdfFormat;
    use predicates::prelude::*;

    fn cli_command() -> Command {
        let mut command = Command::new(env!("CARGO"));
        command.arg("run").arg("--bin").arg("adhs");
        command.arg("--");
        command
    }

    #[test]
    fn cli_help() {
        cli_command()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("SPARQL 1.1 Protocol"));
    }

    #[test]
    fn cli_requires_file() {
        cli_command()
            .assert()
            .failure()
            .stdout("")
            .stderr(predicate::str::contains("--file"));
    }

    #[test]
    fn cli_missing_file() {
        cli_command()
            .arg("--file")
            .arg("/this/file/does/not/exist.ttl")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Can't read file /this/file/does/not/exist.ttl"));
    }

    #[test]
    fn cli_unparseable_file() -> Result<()> {
        let input_file = NamedTempFile::new("broken.ttl")?;
        input_file.write_str("<urn:a> <urn:b> .")?;
        cli_command()
            .arg("-f")
            .arg(input_file.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Can not parse"));
        Ok(())
    }

    #[test]
    fn cli_unknown_extension() -> Result<()> {
        let input_file = NamedTempFile::new("data.unknown")?;
        input_file.write_str("<urn:a> <urn:b> <urn:c> .")?;
        cli_command()
            .arg("-f")
            .arg(input_file.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Can't guess the RDF format"));
        Ok(())
    }

    #[test]
    fn cli_invalid_input_format() {
        cli_command()
            .arg("-f")
            .arg("data.ttl")
            .arg("--input")
            .arg("json")
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value 'json'"));
    }

    #[test]
    fn cli_unwritable_logfile() -> Result<()> {
        let dir = TempDir::new()?;
        let input_file = dir.child("data.nt");
        input_file.write_str("<urn:a> <urn:b> <urn:c> .\n")?;
        cli_command()
            .arg("-f")
            .arg(input_file.path())
            .arg("--logfile")
            .arg(dir.path().join("missing").join("adhs.log"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Can not create logfile"));
        Ok(())
    }

    #[test]
    fn input_formats() {
        assert_eq!(InputFormat::Guess.rdf_format(), None);
        assert_eq!(InputFormat::Nt.rdf_format(), Some(RdfFormat::NTriples));
        assert_eq!(InputFormat::Nquads.rdf_format(), Some(RdfFormat::NQuads));
        assert_eq!(InputFormat::Xml.rdf_format(), Some(RdfFormat::RdfXml));
        assert_eq!(InputFormat::N3.rdf_format(), Some(RdfFormat::N3));
    }

    #[test]
    fn bind_address() {
        let args = Args::parse_from(["adhs", "-f", "data.ttl", "--host", "127.0.0.1", "-p", "8080"]);
        assert_eq!(args.bind(), "127.0.0.1:8080");

        let args = Args::parse_from(["adhs", "-f", "data.ttl", "--host", "::1", "-p", "8080"]);
        assert_eq!(args.bind(), "[::1]:8080");
    }

    #[test]
    fn verbosity() {
        assert_eq!(console_level(0), LevelFilter::ERROR);
        assert_eq!(console_level(1), LevelFilter::INFO);
        assert_eq!(console_level(2), LevelFilter::DEBUG);
        assert_eq!(console_level(5), LevelFilter::DEBUG);

        let args = Args::parse_from(["adhs", "-f", "data.ttl", "-vv"]);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn clap_debug() {
        use clap::CommandFactory;

        Args::command().debug_assert()
    }
}
