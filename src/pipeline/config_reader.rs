use crate::args::Args;
use crate::pipeline::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_INPUT_DIR: &str = "Data/openelections";
pub const DEFAULT_BOUNDARY_FILE: &str = "Data/geo/va_counties_2020.geojson";
pub const DEFAULT_OUTPUT_FILE: &str = "Data/va_county_aggregated_results.json";
pub const DEFAULT_FOCUS: &str = "Clean geographic political patterns";
pub const DEFAULT_SOURCE_LABEL: &str = "openelections";

/// The content of the JSON configuration file. Every entry is optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(rename = "inputDirectory")]
    pub input_directory: Option<String>,
    #[serde(rename = "boundaryFile")]
    pub boundary_file: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    pub focus: Option<String>,
    #[serde(rename = "sourceLabel")]
    pub source_label: Option<String>,
    #[serde(rename = "stateName")]
    pub state_name: Option<String>,
    #[serde(rename = "idProperty")]
    pub id_property: Option<String>,
    #[serde(rename = "nameProperty")]
    pub name_property: Option<String>,
    #[serde(rename = "processedDate")]
    pub processed_date: Option<String>,
    #[serde(rename = "localityAliases", default)]
    pub locality_aliases: BTreeMap<String, String>,
    #[serde(rename = "candidateOverrides", default)]
    pub candidate_overrides: BTreeMap<String, String>,
}

/// Everything a run needs, once the configuration file and the arguments are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub input_dir: PathBuf,
    pub boundary_file: PathBuf,
    /// A file path, `stdout`, or nothing to skip writing.
    pub out: Option<String>,
    pub reference: Option<String>,
    pub processed_date: NaiveDate,
    pub focus: String,
    pub source_label: String,
    pub state_name: String,
    pub id_property: String,
    pub name_property: String,
    pub locality_aliases: BTreeMap<String, String>,
    pub candidate_overrides: BTreeMap<String, String>,
    pub insights: bool,
}

impl RunSettings {
    /// The lookup tables, with the additions of the configuration file.
    pub fn lookup_tables(&self) -> LookupTables {
        LookupTables::new(&self.state_name)
            .with_aliases(
                self.locality_aliases
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            )
            .with_candidate_overrides(
                self.candidate_overrides
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            )
    }
}

pub fn read_config(path: &Path) -> PipelineResult<PipelineConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.display().to_string(),
    })?;
    let config: PipelineConfig =
        serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn parse_processed_date(value: &str) -> PipelineResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").context(InvalidDateSnafu { value })
}

fn resolve(root: &Path, p: &str) -> PathBuf {
    let path = Path::new(p);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Merges the configuration file, if any, with the command line arguments.
/// The arguments take precedence.
pub fn build_settings(args: &Args) -> PipelineResult<RunSettings> {
    let (config, root) = match &args.config {
        Some(config_path) => {
            let config_p = Path::new(config_path);
            let root = config_p
                .parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_default();
            (read_config(config_p)?, root)
        }
        None => (PipelineConfig::default(), PathBuf::new()),
    };

    let input_dir = match (&args.input, &config.input_directory) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => resolve(&root, p),
        (None, None) => PathBuf::from(DEFAULT_INPUT_DIR),
    };
    let boundary_file = match (&args.boundary, &config.boundary_file) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => resolve(&root, p),
        (None, None) => PathBuf::from(DEFAULT_BOUNDARY_FILE),
    };
    let out = match (&args.out, &config.output_file) {
        (Some(p), _) if p.is_empty() => None,
        (Some(p), _) => Some(p.clone()),
        (None, Some(p)) if p == "stdout" => Some(p.clone()),
        (None, Some(p)) => Some(resolve(&root, p).display().to_string()),
        (None, None) => Some(DEFAULT_OUTPUT_FILE.to_string()),
    };
    let processed_date = match args.processed_date.as_ref().or(config.processed_date.as_ref()) {
        Some(d) => parse_processed_date(d)?,
        None => chrono::Local::now().date_naive(),
    };

    Ok(RunSettings {
        input_dir,
        boundary_file,
        out,
        reference: args.reference.clone(),
        processed_date,
        focus: config.focus.unwrap_or_else(|| DEFAULT_FOCUS.to_string()),
        source_label: config
            .source_label
            .unwrap_or_else(|| DEFAULT_SOURCE_LABEL.to_string()),
        state_name: config
            .state_name
            .unwrap_or_else(|| DEFAULT_STATE_NAME.to_string()),
        id_property: config.id_property.unwrap_or_else(|| "geoid".to_string()),
        name_property: config
            .name_property
            .unwrap_or_else(|| "namelsad".to_string()),
        locality_aliases: config.locality_aliases,
        candidate_overrides: config.candidate_overrides,
        insights: args.insights,
    })
}
