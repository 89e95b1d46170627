use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use config::Config;
use directories::ProjectDirs;
use sector_procedures::drawing::DrawSection;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use tracing::debug;

use crate::{
    Cli,
    error::{ApplicationError, ApplicationResult},
    sector_file::SectorSection,
};

const DEFAULT_DATA_FOLDER: &str = "temp";
const DEFAULT_NAVDATA_FOLDER: &str = "NavDataPro";
const DEFAULT_OUTPUT_FOLDER: &str = "output";

pub(crate) fn es_procedure_generator_project_dir() -> ApplicationResult<ProjectDirs> {
    ProjectDirs::from("", "meltinglava", "es_procedure_generator")
        .ok_or(ApplicationError::NoProjectDirectory)
}

#[derive(Debug)]
pub(crate) struct GeneratorConfig {
    config_file_path: PathBuf,
    config: Configurable,
}

/// Folder settings survive `--clean-config`.
#[skip_serializing_none]
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct FolderSettings {
    data_folder: Option<PathBuf>,
    navdata_folder: Option<PathBuf>,
    output_folder: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Configurable {
    #[serde(flatten)]
    folders: FolderSettings,
    combiner_output_file: String,
    tables: TableFiles,
    navdata_files: NavdataFiles,
    sections: SectionToggles,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableFiles {
    procedures: String,
    runways: String,
    combiner: String,
    airports: String,
    waypoints: String,
    settings: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct NavdataFiles {
    navaids: String,
    waypoints: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SectionToggles {
    vor: bool,
    ndb: bool,
    fixes: bool,
    airport: bool,
    runway: bool,
    sid: bool,
    star: bool,
    app: bool,
    #[serde(rename = "final")]
    final_approach: bool,
}

impl GeneratorConfig {
    pub fn load(cli: &Cli) -> ApplicationResult<Self> {
        let (config, config_file_path) = setup_configuration(cli.clean_config)?;
        let mut generator_config = Self {
            config_file_path,
            config,
        };
        generator_config.apply_overrides(
            cli.data_folder.clone(),
            cli.navdata_folder.clone(),
            cli.output_folder.clone(),
        );
        Ok(generator_config)
    }

    pub fn apply_overrides(
        &mut self,
        data_folder: Option<PathBuf>,
        navdata_folder: Option<PathBuf>,
        output_folder: Option<PathBuf>,
    ) {
        let folders = &mut self.config.folders;
        folders.data_folder = data_folder.or(folders.data_folder.take());
        folders.navdata_folder = navdata_folder.or(folders.navdata_folder.take());
        folders.output_folder = output_folder.or(folders.output_folder.take());
        debug!(?folders, "Using folders");
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_file_path
    }

    pub fn data_folder(&self) -> &Path {
        self.config
            .folders
            .data_folder
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_DATA_FOLDER))
    }

    pub fn navdata_folder(&self) -> &Path {
        self.config
            .folders
            .navdata_folder
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_NAVDATA_FOLDER))
    }

    pub fn output_folder(&self) -> &Path {
        self.config
            .folders
            .output_folder
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_OUTPUT_FOLDER))
    }

    pub fn procedure_table_path(&self) -> PathBuf {
        self.data_folder().join(&self.config.tables.procedures)
    }

    pub fn runway_table_path(&self) -> PathBuf {
        self.data_folder().join(&self.config.tables.runways)
    }

    pub fn combiner_table_path(&self) -> PathBuf {
        self.data_folder().join(&self.config.tables.combiner)
    }

    pub fn airport_table_path(&self) -> PathBuf {
        self.data_folder().join(&self.config.tables.airports)
    }

    pub fn waypoint_table_path(&self) -> PathBuf {
        self.data_folder().join(&self.config.tables.waypoints)
    }

    pub fn settings_table_path(&self) -> PathBuf {
        self.data_folder().join(&self.config.tables.settings)
    }

    pub fn navaids_path(&self) -> PathBuf {
        self.navdata_folder().join(&self.config.navdata_files.navaids)
    }

    pub fn navdata_waypoints_path(&self) -> PathBuf {
        self.navdata_folder()
            .join(&self.config.navdata_files.waypoints)
    }

    pub fn combiner_output_path(&self) -> PathBuf {
        self.output_folder().join(&self.config.combiner_output_file)
    }

    pub fn section_path(&self, section: SectorSection) -> PathBuf {
        self.output_folder().join(section.file_name())
    }

    pub fn is_section_enabled(&self, section: SectorSection) -> bool {
        let sections = &self.config.sections;
        match section {
            SectorSection::Vor => sections.vor,
            SectorSection::Ndb => sections.ndb,
            SectorSection::Fixes => sections.fixes,
            SectorSection::Airport => sections.airport,
            SectorSection::Runway => sections.runway,
            SectorSection::Drawing(DrawSection::Sid) => sections.sid,
            SectorSection::Drawing(DrawSection::Star) => sections.star,
            SectorSection::Drawing(DrawSection::App) => sections.app,
            SectorSection::Drawing(DrawSection::Final) => sections.final_approach,
        }
    }
}

fn load_configurable(config_file: &Path) -> ApplicationResult<Configurable> {
    Ok(Config::builder()
        .add_source(config::File::from(config_file).required(true))
        .build()?
        .try_deserialize::<Configurable>()?)
}

fn setup_configuration(clean_config: bool) -> ApplicationResult<(Configurable, PathBuf)> {
    let config_dir = es_procedure_generator_project_dir()?
        .config_dir()
        .to_path_buf();
    setup_configuration_in(&config_dir, clean_config)
}

fn setup_configuration_in(
    config_dir: &Path,
    clean_config: bool,
) -> ApplicationResult<(Configurable, PathBuf)> {
    let mut raw_config_file = Cow::Borrowed(include_str!("../config.toml"));
    let config_file = config_dir.join("config.toml");
    if !config_file.exists() {
        debug!(path = ?config_file, "Writing default config");
        fs::create_dir_all(config_dir)?;
        fs::write(&config_file, raw_config_file.as_bytes())?;
    }
    let configurable = load_configurable(&config_file)?;
    if clean_config {
        if configurable.folders != FolderSettings::default() {
            raw_config_file = format!(
                "{}\n{}",
                toml::to_string(&configurable.folders)?,
                raw_config_file
            )
            .into();
        }
        fs::write(&config_file, raw_config_file.as_bytes())?;
        self::setup_configuration_in(config_dir, false)
    } else {
        Ok((configurable, config_file))
    }
}
