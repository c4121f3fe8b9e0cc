use crate::error::LoadError;
use oxigraph::store::{LoaderError, Store};
use oxrdfio::{RdfFormat, RdfParser};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use url::Url;

/// Guesses the RDF format of `path` from its file extension.
///
/// Returns [`None`] if the path has no extension or the extension is unknown.
pub fn guess_format(path: &Path) -> Option<RdfFormat> {
    let extension = path.extension().and_then(OsStr::to_str)?;
    RdfFormat::from_extension(extension).or_else(|| {
        match extension.to_ascii_lowercase().as_str() {
            "xml" | "owl" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    })
}

/// Parses the file at `path` into `store`.
///
/// Relative IRIs in the file are resolved against the `file:` URL of the file.
pub(crate) fn load_file(
    store: &Store,
    path: &Path,
    format: Option<RdfFormat>,
) -> Result<(), LoadError> {
    let format = match format {
        Some(format) => format,
        None => guess_format(path).ok_or_else(|| LoadError::UnknownFormat {
            path: path.to_owned(),
        })?,
    };
    let file = File::open(path).map_err(|error| LoadError::Io {
        path: path.to_owned(),
        error,
    })?;

    let parser = match file_base_iri(path) {
        Some(base_iri) => RdfParser::from_format(format)
            .with_base_iri(&base_iri)
            .unwrap_or_else(|_| RdfParser::from_format(format)),
        None => RdfParser::from_format(format),
    };

    store
        .load_from_reader(parser, BufReader::new(file))
        .map_err(|error| match error {
            LoaderError::Parsing(error) => LoadError::Parsing {
                path: path.to_owned(),
                format: format.name(),
                error,
            },
            error => LoadError::Loader {
                path: path.to_owned(),
                error,
            },
        })
}

fn file_base_iri(path: &Path) -> Option<String> {
    let path = fs::canonicalize(path).ok()?;
    Url::from_file_path(path).ok().map(String::from)
}
