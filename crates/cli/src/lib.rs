// The verbosity stuff is cribbed from https://github.com/clap-rs/clap-verbosity-flag/blob/c621a6a8a7c0b6df8f1464a985a5d076b4915693/src/lib.rs and updated for tracing

#![deny(unused_crate_dependencies)]

mod output;

use anyhow::{Error, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use output::{Heading, Outcome};
use stac_check::{Linter, MergePolicy, RuleConfig, StacObject};
use stac_check_io::{ObjectList, Pages, Reader, Walk};
use stac_check_validate::Validator;
use std::{io::Write, path::PathBuf, str::FromStr};
use tracing::metadata::Level;
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::{
    EnvFilter, Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// stac-check: lint SpatioTemporal Asset Catalog (STAC) objects against best practices
#[derive(Debug, Parser)]
#[command(name = "stac-check", version)]
pub struct StacCheck {
    #[command(subcommand)]
    command: Command,

    /// A YAML file whose top-level keys override the default configuration.
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// A YAML file to use as the default configuration.
    ///
    /// If not provided, the configuration shipped with stac-check is used.
    #[arg(long = "default-config", env = "STAC_CHECK_CONFIG", global = true)]
    default_config: Option<PathBuf>,

    /// Merge the override configuration into the default key by key.
    ///
    /// By default, each top-level block in the override (e.g. `linting`)
    /// replaces the whole block in the default configuration.
    #[arg(long = "deep-merge", global = true)]
    deep_merge: bool,

    /// A directory of json schemas to validate against instead of fetching them.
    ///
    /// Each `*.json` file is registered under its `$id`. Schemas that aren't
    /// in the directory are still fetched.
    #[arg(long = "schema-dir", env = "STAC_CHECK_SCHEMA_DIR", global = true)]
    schema_dir: Option<PathBuf>,

    /// Headers to send with every request, in `KEY=VALUE` format.
    ///
    /// e.g.: `stac-check --header "x-api-key=redacted" lint https://stac.test/catalog.json`
    #[arg(long = "header", global = true, verbatim_doc_comment)]
    headers: Vec<KeyValue>,

    /// The output format.
    #[arg(
        short = 'o',
        long = "output-format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text
    )]
    output_format: OutputFormat,

    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        help = ErrorLevel::verbose_help(),
        long_help = ErrorLevel::verbose_long_help(),
    )]
    verbose: u8,

    #[arg(
        long,
        short = 'q',
        action = clap::ArgAction::Count,
        global = true,
        help = ErrorLevel::quiet_help(),
        long_help = ErrorLevel::quiet_long_help(),
        conflicts_with = "verbose",
    )]
    quiet: u8,
}

/// A stac-check subcommand.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validates and lints a STAC object.
    Lint {
        /// The path or url of the object.
        href: String,

        /// Lint every object reachable by following `child` and `item` links.
        #[arg(short = 'r', long = "recursive")]
        recursive: bool,

        /// Maximum depth to walk when linting recursively.
        ///
        /// The root object is at depth one. Omit to walk the whole tree.
        #[arg(long = "max-depth", requires = "recursive")]
        max_depth: Option<usize>,
    },

    /// Validates and lints the items served by a STAC API items or search endpoint.
    ItemCollection {
        /// The url of the endpoint.
        url: String,

        /// The maximum number of pages to read.
        #[arg(long = "pages", default_value_t = 1)]
        pages: usize,
    },

    /// Validates and lints the collections served by a STAC API.
    Collections {
        /// The url of the `/collections` endpoint.
        url: String,

        /// The maximum number of pages to read.
        #[arg(long = "pages", default_value_t = 1)]
        pages: usize,
    },

    /// Generate completion scripts for a given shell.
    GenerateCompletions {
        /// The shell to generate completion scripts for.
        shell: clap_complete::Shell,
    },
}

/// How results are written to standard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,

    /// One json object per linted object
    Json,
}

#[derive(Debug, Clone)]
struct KeyValue(String, String);

#[derive(Copy, Clone, Debug, Default)]
struct ErrorLevel;

struct Session {
    reader: Reader,
    check: Check,
}

struct Check {
    validator: Validator,
    linter: Linter,
}

impl StacCheck {
    /// Runs this command, writing results to standard output.
    ///
    /// If `init_tracing_subscriber` is `false`, it is expected that the caller
    /// is setting up the appropriate logging.
    pub fn run(self, init_tracing_subscriber: bool) -> Result<()> {
        if init_tracing_subscriber {
            let indicatif_layer = IndicatifLayer::new();
            let filter = EnvFilter::builder()
                .with_default_directive(LevelFilter::from(self.log_level()).into())
                .from_env_lossy();
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(indicatif_layer.get_stderr_writer())
                        .with_filter(filter),
                )
                .with(indicatif_layer)
                .init();
        }
        let mut stdout = std::io::stdout().lock();
        self.execute(&mut stdout)?;
        stdout.flush()?;
        Ok(())
    }

    /// Runs this command, writing results to `writer`.
    pub fn execute(&self, writer: &mut impl Write) -> Result<()> {
        match self.command {
            Command::Lint {
                ref href,
                recursive,
                max_depth,
            } => {
                let mut session = self.session()?;
                if recursive {
                    let mut outcomes = Vec::new();
                    let mut unreadable = 0;
                    for result in Walk::new(&session.reader, href).max_depth(max_depth) {
                        match result {
                            Ok(object) => outcomes.push(session.check.lint(&object, None)?),
                            Err(err) => {
                                tracing::error!("{err}");
                                unreadable += 1;
                            }
                        }
                    }
                    let heading = Heading {
                        title: "Recursive: Validate all assets in a collection or catalog",
                        setting: (
                            "Max-depth",
                            max_depth
                                .map(|depth| depth.to_string())
                                .unwrap_or_else(|| "None".to_string()),
                        ),
                    };
                    self.write_all(writer, &heading, &outcomes)?;
                    if unreadable > 0 {
                        return Err(anyhow!("{unreadable} object(s) could not be read"));
                    }
                    Ok(())
                } else {
                    let object = session.reader.read(href)?;
                    let outcome = session.check.lint(&object, None)?;
                    match self.output_format {
                        OutputFormat::Text => output::write_outcome(writer, &outcome)?,
                        OutputFormat::Json => {
                            serde_json::to_writer_pretty(&mut *writer, &outcome)?;
                            writeln!(writer)?;
                        }
                    }
                    Ok(())
                }
            }
            Command::ItemCollection { ref url, pages } => {
                let heading = Heading {
                    title: "Item Collection: Validate all assets in a feature collection",
                    setting: ("Pages", pages.to_string()),
                };
                self.lint_pages(writer, url, ObjectList::Features, pages, &heading)
            }
            Command::Collections { ref url, pages } => {
                let heading = Heading {
                    title: "Collections: Validate all collections in a STAC API",
                    setting: ("Pages", pages.to_string()),
                };
                self.lint_pages(writer, url, ObjectList::Collections, pages, &heading)
            }
            Command::GenerateCompletions { shell } => {
                let mut command = StacCheck::command();
                clap_complete::generate(shell, &mut command, "stac-check", writer);
                Ok(())
            }
        }
    }

    /// Resolves the rule configuration from the default and override files.
    pub fn rule_config(&self) -> Result<RuleConfig> {
        let default = match &self.default_config {
            Some(path) => stac_check::config::read_yaml(path)?,
            None => stac_check::config::default_value()?,
        };
        let override_config = self
            .config
            .as_ref()
            .map(|path| stac_check::config::read_yaml(path))
            .transpose()?;
        let policy = if self.deep_merge {
            MergePolicy::Deep
        } else {
            MergePolicy::Shallow
        };
        RuleConfig::resolve(default, override_config, policy).map_err(Error::from)
    }

    /// Returns the log level set by the verbosity flags.
    pub fn log_level(&self) -> Option<Level> {
        level_enum(self.verbosity())
    }

    fn verbosity(&self) -> i8 {
        level_value(ErrorLevel::default()) - (self.quiet as i8) + (self.verbose as i8)
    }

    fn session(&self) -> Result<Session> {
        let linter = Linter::new(self.rule_config()?);
        let headers = self.headers.iter().cloned().map(|kv| (kv.0, kv.1)).collect();
        Ok(Session {
            reader: Reader::new(headers)?,
            check: Check {
                validator: self.validator()?,
                linter,
            },
        })
    }

    fn validator(&self) -> Result<Validator> {
        let mut validator = Validator::new()?;
        let Some(dir) = &self.schema_dir else {
            return Ok(validator);
        };
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|extension| extension.to_str()) != Some("json") {
                continue;
            }
            let schema: serde_json::Value = serde_json::from_slice(&std::fs::read(&path)?)?;
            let id = schema
                .get("$id")
                .and_then(serde_json::Value::as_str)
                .map(String::from)
                .ok_or_else(|| anyhow!("schema has no $id: {}", path.display()))?;
            tracing::debug!("registering schema {id} from {}", path.display());
            validator = validator.with_schema(id, schema);
        }
        Ok(validator)
    }

    fn lint_pages(
        &self,
        writer: &mut impl Write,
        url: &str,
        object_list: ObjectList,
        pages: usize,
        heading: &Heading,
    ) -> Result<()> {
        let mut session = self.session()?;
        let mut outcomes = Vec::new();
        for result in Pages::new(&session.reader, url, object_list).pages(pages) {
            let (object, object_url) = result?;
            outcomes.push(session.check.lint(&object, Some(object_url))?);
        }
        self.write_all(writer, heading, &outcomes)
    }

    fn write_all(&self, writer: &mut impl Write, heading: &Heading, outcomes: &[Outcome]) -> Result<()> {
        match self.output_format {
            OutputFormat::Text => output::write_outcomes(writer, heading, outcomes)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, outcomes)?;
                writeln!(writer)?;
            }
        }
        Ok(())
    }
}

impl Check {
    fn lint(&mut self, object: &StacObject, path: Option<String>) -> Result<Outcome> {
        let mut validation = self.validator.validate(object);
        if path.is_some() {
            validation.path = path;
        }
        let report = self.linter.lint(object, &validation)?;
        Ok(Outcome {
            links: object.links().map(Vec::len),
            validation,
            report,
        })
    }
}

impl ErrorLevel {
    fn default() -> Option<Level> {
        Some(Level::ERROR)
    }

    fn verbose_help() -> Option<&'static str> {
        Some("Increase verbosity")
    }

    fn verbose_long_help() -> Option<&'static str> {
        None
    }

    fn quiet_help() -> Option<&'static str> {
        Some("Decrease verbosity")
    }

    fn quiet_long_help() -> Option<&'static str> {
        None
    }
}

impl FromStr for KeyValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Some((key, value)) = s.split_once('=') {
            Ok(KeyValue(key.to_string(), value.to_string()))
        } else {
            Err(anyhow!("invalid header '{s}', expected format KEY=VALUE"))
        }
    }
}

fn level_enum(verbosity: i8) -> Option<Level> {
    match verbosity {
        i8::MIN..=-1 => None,
        0 => Some(Level::ERROR),
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        4..=i8::MAX => Some(Level::TRACE),
    }
}

fn level_value(level: Option<Level>) -> i8 {
    match level {
        None => -1,
        Some(Level::ERROR) => 0,
        Some(Level::WARN) => 1,
        Some(Level::INFO) => 2,
        Some(Level::DEBUG) => 3,
        Some(Level::TRACE) => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputFormat, StacCheck};
    use clap::Parser;
    use rstest::rstest;
    use tracing::Level;

    #[rstest]
    #[case(&[], Some(Level::ERROR))]
    #[case(&["-v"], Some(Level::WARN))]
    #[case(&["-vvv"], Some(Level::DEBUG))]
    #[case(&["-vvvvvv"], Some(Level::TRACE))]
    #[case(&["-q"], None)]
    fn log_level(#[case] flags: &[&str], #[case] level: Option<Level>) {
        let args = ["stac-check"]
            .into_iter()
            .chain(flags.iter().copied())
            .chain(["lint", "item.json"]);
        assert_eq!(StacCheck::parse_from(args).log_level(), level);
    }

    #[test]
    fn headers() {
        let stac_check = StacCheck::parse_from([
            "stac-check",
            "--header",
            "x-api-key=a=b",
            "lint",
            "item.json",
        ]);
        assert_eq!(stac_check.headers[0].0, "x-api-key");
        assert_eq!(stac_check.headers[0].1, "a=b");
        assert!(StacCheck::try_parse_from(["stac-check", "--header", "nope", "lint", "item.json"]).is_err());
    }

    #[test]
    fn output_format() {
        let stac_check = StacCheck::parse_from(["stac-check", "lint", "item.json"]);
        assert_eq!(stac_check.output_format, OutputFormat::Text);
        let stac_check = StacCheck::parse_from(["stac-check", "lint", "item.json", "-o", "json"]);
        assert_eq!(stac_check.output_format, OutputFormat::Json);
    }

    #[test]
    fn max_depth_requires_recursive() {
        assert!(StacCheck::try_parse_from(["stac-check", "lint", "catalog.json", "--max-depth", "2"]).is_err());
    }

    #[test]
    fn shallow_override_drops_default_block() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "linting:\n  searchable_identifiers: false\n").unwrap();
        let shallow = StacCheck::parse_from([
            "stac-check",
            "--config",
            path.to_str().unwrap(),
            "lint",
            "item.json",
        ]);
        let config = shallow.rule_config().unwrap();
        assert!(!config.linting("searchable_identifiers").unwrap());
        assert!(config.linting("percent_encoded").is_err());

        let deep = StacCheck::parse_from([
            "stac-check",
            "--deep-merge",
            "--config",
            path.to_str().unwrap(),
            "lint",
            "item.json",
        ]);
        let config = deep.rule_config().unwrap();
        assert!(!config.linting("searchable_identifiers").unwrap());
        assert!(config.linting("percent_encoded").unwrap());
    }

    #[test]
    fn generate_completions() {
        let stac_check = StacCheck::parse_from(["stac-check", "generate-completions", "bash"]);
        let mut buf = Vec::new();
        stac_check.execute(&mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("stac-check"));
    }
}

#[cfg(test)]
use {assert_cmd as _, tempfile as _};
