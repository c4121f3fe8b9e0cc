use clap::{ArgAction, Parser, ValueEnum, ValueHint};
use oxrdfio::RdfFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about, version, name = "adhs")]
/// ADHS: serves an RDF file as an in-memory SPARQL 1.1 Protocol endpoint
pub struct Args {
    /// The RDF file to load
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
    /// Host to listen to
    #[arg(long, default_value = "0.0.0.0", value_hint = ValueHint::Hostname)]
    pub host: String,
    /// Port to listen to
    #[arg(short, long, default_value_t = 5000, env = "ADHS_PORT")]
    pub port: u16,
    /// Path prefix of all routes, e.g. "/adhs"
    #[arg(short, long, env = "ADHS_BASEPATH")]
    pub basepath: Option<String>,
    /// File to write a debug log to
    #[arg(short, long, env = "ADHS_LOGFILE", value_hint = ValueHint::FilePath)]
    pub logfile: Option<PathBuf>,
    /// Log more: -v for info, -vv for debug
    #[arg(short, action = ArgAction::Count)]
    pub verbose: u8,
    /// Format of the RDF file
    #[arg(short, long, value_enum, default_value_t = InputFormat::Guess)]
    pub input: InputFormat,
    /// Allows cross-origin requests
    #[arg(long)]
    pub cors: bool,
    /// Aborts queries running longer than the given number of seconds
    #[arg(long, value_name = "SECONDS")]
    pub query_timeout: Option<u64>,
}

impl Args {
    /// The socket address to bind, with IPv6 hosts in brackets.
    pub fn bind(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Guess the format from the file extension
    Guess,
    N3,
    Nquads,
    Nt,
    Trig,
    Turtle,
    Xml,
}

impl InputFormat {
    /// The parser to use, [None] if it should be guessed.
    pub fn rdf_format(self) -> Option<RdfFormat> {
        match self {
            Self::Guess => None,
            Self::N3 => Some(RdfFormat::N3),
            Self::Nquads => Some(RdfFormat::NQuads),
            Self::Nt => Some(RdfFormat::NTriples),
            Self::Trig => Some(RdfFormat::TriG),
            Self::Turtle => Some(RdfFormat::Turtle),
            Self::Xml => Some(RdfFormat::RdfXml),
        }
    }
}
