//! Resolved installation configuration for one service.
//!
//! The configuration is an overlay of three documents found next to each
//! other: the operator-private `.credentials`, the shared
//! `common.install.ini` and the service-specific `<name>.install.ini`.
//! [`InstallConfig`] wraps the merged [`ConfigDocument`] and exposes only
//! the typed getters the installer needs, verifying the flavor's required
//! options once at construction.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ConfigDocument, parser};
use crate::error::{Component, InstallError, Result};
use crate::modules::ModuleLocator;

const COMPONENT: &str = "CONFIG";

const CREDENTIALS_FILE: &str = ".credentials";
const COMMON_CONFIG_FILE: &str = "common.install.ini";

const SECTION_SERVICE: &str = "SERVICE";
const SECTION_GENERAL: &str = "GENERAL";
const SECTION_PATH: &str = "PATH";
const SECTION_EXTERNALS: &str = "EXTERNALS";
const SECTION_COMMON_EXTERNALS: &str = "COMMON-EXTERNALS";
const SECTION_MODULES: &str = "MODULES";
const SECTION_COMMON_MODULES: &str = "COMMON-MODULES";
const SECTION_DATABASE: &str = "DATABASE";
const SECTION_WSGI: &str = "WSGI";
const SECTION_FILES: &str = "FILES";
const SECTION_LOG: &str = "LOG";

const OPTION_NAME: &str = "name";
const OPTION_DESCRIPTION: &str = "description";
const OPTION_FLAVOR: &str = "flavor";
const OPTION_SHORT_NAME: &str = "short-name";
const OPTION_VENV: &str = "service-venv";
const OPTION_SERVICE_INI: &str = "service-ini";
const OPTION_SERVICE_BASE: &str = "service-base";
const OPTION_SERVICE_LOG: &str = "service-log";
const OPTION_LOOKUP_PATH: &str = "module-path";
const OPTION_SITE_PACKAGES: &str = "site-packages";
const OPTION_CONFIG_SOURCE: &str = "config-source";
const OPTION_SYSTEMD_DIR: &str = "systemd-dir";
const OPTION_UNIT_TEMPLATE: &str = "unit-template";
const OPTION_DJANGO_MANAGER: &str = "django-manager";
const OPTION_MAIN: &str = "main";
const OPTION_WSGI: &str = "wsgi";
const OPTION_PORT: &str = "port";
const OPTION_DB: &str = "db";
const OPTION_DB_TEST: &str = "db_test";
const OPTION_HOST: &str = "host";
const OPTION_USER: &str = "user";
const OPTION_PASSWORD: &str = "password";
const OPTION_LOGFILE: &str = "logfile";

const DEFAULT_DESCRIPTION: &str = "Provis managed service";
const DEFAULT_DB: &str = "provis";
const DEFAULT_DB_TEST: &str = "provis_test";
const DEFAULT_LOG_DIR: &str = "/var/log/provis";
const DEFAULT_LOOKUP_PATH: &str = "../";
const DEFAULT_SYSTEMD_DIR: &str = "/etc/systemd/system";
const DEFAULT_CONFIG_SOURCE_DIR: &str = "../deployment/config";
const DEFAULT_TEMPLATE_DIR: &str = "./templates";
const DEFAULT_WEBAPP_PORT: u16 = 80;

/// How the installed service is launched and supervised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceFlavor {
    /// A plain long-running executable started directly by the supervisor.
    Daemon,
    /// A WSGI application served by `mod_wsgi-express` on a fixed port.
    Wsgi,
    /// A Django application behind a generated Apache configuration.
    WebApp,
}

impl ServiceFlavor {
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "daemon" => Ok(Self::Daemon),
            "wsgi" => Ok(Self::Wsgi),
            "webapp" => Ok(Self::WebApp),
            other => Err(InstallError::configuration(
                COMPONENT,
                format!("unknown service flavor '{other}', expected daemon, wsgi or webapp"),
            )),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Daemon => "daemon",
            Self::Wsgi => "wsgi",
            Self::WebApp => "webapp",
        }
    }

    fn template_file(self) -> &'static str {
        match self {
            Self::Daemon => "daemon.service",
            Self::Wsgi => "wsgi.service",
            Self::WebApp => "webapp.service",
        }
    }
}

/// The (section, option) pairs a configuration must resolve to non-empty
/// values before installation may start.
pub struct RequiredOptionSet {
    pairs: Vec<(&'static str, &'static str)>,
}

impl RequiredOptionSet {
    pub fn for_flavor(flavor: ServiceFlavor) -> Self {
        let mut pairs = vec![
            (SECTION_SERVICE, OPTION_NAME),
            (SECTION_GENERAL, OPTION_SHORT_NAME),
            (SECTION_PATH, OPTION_VENV),
            (SECTION_PATH, OPTION_SERVICE_INI),
            (SECTION_MODULES, OPTION_MAIN),
            (SECTION_DATABASE, OPTION_HOST),
        ];
        match flavor {
            ServiceFlavor::Daemon => {}
            ServiceFlavor::Wsgi => {
                pairs.push((SECTION_MODULES, OPTION_WSGI));
                pairs.push((SECTION_WSGI, OPTION_PORT));
            }
            ServiceFlavor::WebApp => {
                pairs.push((SECTION_MODULES, OPTION_WSGI));
                pairs.push((SECTION_PATH, OPTION_SERVICE_BASE));
            }
        }
        Self { pairs }
    }

    /// Scans every required pair and fails once with the complete list of
    /// violations, so an operator fixes all of them in one pass.
    pub fn verify(&self, document: &ConfigDocument) -> Result<()> {
        let mut violations = Vec::new();
        for (section, option) in &self.pairs {
            if !document.has_section(section) {
                violations.push(format!("[{section}] {option}: section missing"));
                continue;
            }
            if !document.has_option(section, option) {
                violations.push(format!("[{section}] {option}: option missing"));
                continue;
            }
            match document.get(section, option) {
                Ok(value) if value.is_empty() => {
                    violations.push(format!("[{section}] {option}: value is empty"));
                }
                Ok(_) => {}
                Err(err) => violations.push(format!("[{section}] {option}: {}", err.message())),
            }
        }
        if violations.is_empty() {
            return Ok(());
        }
        Err(InstallError::configuration(
            COMPONENT,
            format!(
                "the configuration misses required options: {}",
                violations.join("; ")
            ),
        ))
    }
}

/// Typed view over the merged installation configuration.
#[derive(Debug)]
pub struct InstallConfig {
    document: ConfigDocument,
    flavor: ServiceFlavor,
}

impl Component for InstallConfig {
    fn component(&self) -> &'static str {
        COMPONENT
    }
}

impl InstallConfig {
    /// Loads the three configuration layers surrounding `config_path` and
    /// verifies the flavor's required options.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_dir = config_path.parent().unwrap_or(Path::new(""));
        let credentials = config_dir.join(CREDENTIALS_FILE);
        let common = config_dir.join(COMMON_CONFIG_FILE);

        if !credentials.exists() {
            return Err(InstallError::configuration(
                COMPONENT,
                format!("the credentials file {} does not exist", credentials.display()),
            ));
        }
        if !common.exists() {
            return Err(InstallError::configuration(
                COMPONENT,
                format!(
                    "the common installation configuration {} does not exist",
                    common.display()
                ),
            ));
        }

        let document =
            ConfigDocument::load(&[credentials.as_path(), common.as_path(), config_path])?;
        Self::from_document(document)
    }

    /// Wraps an already-merged document. Used by [`load`](Self::load) and
    /// by tests that assemble documents in memory.
    pub fn from_document(document: ConfigDocument) -> Result<Self> {
        let flavor =
            ServiceFlavor::parse(&document.get_or(SECTION_SERVICE, OPTION_FLAVOR, "daemon")?)?;
        RequiredOptionSet::for_flavor(flavor).verify(&document)?;
        Ok(Self { document, flavor })
    }

    pub fn flavor(&self) -> ServiceFlavor {
        self.flavor
    }

    pub fn service_name(&self) -> Result<String> {
        self.document.get(SECTION_SERVICE, OPTION_NAME)
    }

    pub fn short_name(&self) -> Result<String> {
        self.document.get(SECTION_GENERAL, OPTION_SHORT_NAME)
    }

    pub fn description(&self) -> Result<String> {
        self.document
            .get_or(SECTION_SERVICE, OPTION_DESCRIPTION, DEFAULT_DESCRIPTION)
    }

    pub fn venv_path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(self.document.get(SECTION_PATH, OPTION_VENV)?))
    }

    /// Deployment root of a web application; holds `manage.py` and the
    /// collected static files.
    pub fn service_base_dir(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(
            self.document.get(SECTION_PATH, OPTION_SERVICE_BASE)?,
        ))
    }

    /// Directory the service's own configuration is deployed into.
    pub fn service_ini_dir(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(
            self.document.get(SECTION_PATH, OPTION_SERVICE_INI)?,
        ))
    }

    pub fn site_packages_dir(&self) -> Result<PathBuf> {
        if self.document.has_option(SECTION_PATH, OPTION_SITE_PACKAGES) {
            return Ok(PathBuf::from(
                self.document.get(SECTION_PATH, OPTION_SITE_PACKAGES)?,
            ));
        }
        Ok(self.venv_path()?.join("lib/python3/site-packages"))
    }

    /// Ordered directories probed for module sources. Defaults to the
    /// parent of the working directory.
    pub fn module_lookup_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.document.has_option(SECTION_PATH, OPTION_LOOKUP_PATH) {
            return Ok(vec![PathBuf::from(DEFAULT_LOOKUP_PATH)]);
        }
        let raw = self.document.get(SECTION_PATH, OPTION_LOOKUP_PATH)?;
        Ok(raw.split(',').map(|p| PathBuf::from(p.trim())).collect())
    }

    /// Directory the installed service writes its logs to.
    ///
    /// Resolution order: explicit `[PATH] service-log`, then the parent of
    /// `[LOG] logfile` in the origin service ini, then the packaged
    /// default. The derived value is cached back into the document so
    /// repeated reads within one run are stable.
    pub fn service_log_dir(&mut self) -> Result<PathBuf> {
        if self.document.has_option(SECTION_PATH, OPTION_SERVICE_LOG) {
            return Ok(PathBuf::from(
                self.document.get(SECTION_PATH, OPTION_SERVICE_LOG)?,
            ));
        }

        let mut log_dir = PathBuf::from(DEFAULT_LOG_DIR);
        if let Ok(text) = fs::read_to_string(self.origin_service_ini()?) {
            let service_ini = parser::parse_str(&text)?;
            if service_ini.has_option(SECTION_LOG, OPTION_LOGFILE) {
                let logfile = service_ini.get(SECTION_LOG, OPTION_LOGFILE)?;
                if let Some(parent) = Path::new(&logfile).parent()
                    && !parent.as_os_str().is_empty()
                {
                    log_dir = parent.to_path_buf();
                }
            }
        }

        self.document.set(
            SECTION_PATH,
            OPTION_SERVICE_LOG,
            log_dir.display().to_string(),
        );
        Ok(log_dir)
    }

    /// The service's own configuration file in the source tree.
    pub fn origin_service_ini(&self) -> Result<PathBuf> {
        if self.document.has_option(SECTION_PATH, OPTION_CONFIG_SOURCE) {
            return Ok(PathBuf::from(
                self.document.get(SECTION_PATH, OPTION_CONFIG_SOURCE)?,
            ));
        }
        Ok(Path::new(DEFAULT_CONFIG_SOURCE_DIR).join(format!("{}.ini", self.short_name()?)))
    }

    pub fn env_ini_path(&self) -> Result<PathBuf> {
        Ok(self.service_ini_dir()?.join("env.ini"))
    }

    /// Target location of the generated unit file.
    pub fn unit_path(&self) -> Result<PathBuf> {
        let systemd_dir = self
            .document
            .get_or(SECTION_PATH, OPTION_SYSTEMD_DIR, DEFAULT_SYSTEMD_DIR)?;
        Ok(Path::new(&systemd_dir).join(format!("{}.service", self.service_name()?)))
    }

    pub fn unit_template_path(&self) -> Result<PathBuf> {
        if self.document.has_option(SECTION_PATH, OPTION_UNIT_TEMPLATE) {
            return Ok(PathBuf::from(
                self.document.get(SECTION_PATH, OPTION_UNIT_TEMPLATE)?,
            ));
        }
        Ok(Path::new(DEFAULT_TEMPLATE_DIR).join(self.flavor.template_file()))
    }

    pub fn database(&self, test_mode: bool) -> Result<String> {
        if test_mode {
            self.document
                .get_or(SECTION_DATABASE, OPTION_DB_TEST, DEFAULT_DB_TEST)
        } else {
            self.document.get_or(SECTION_DATABASE, OPTION_DB, DEFAULT_DB)
        }
    }

    pub fn database_host(&self) -> Result<String> {
        self.document.get(SECTION_DATABASE, OPTION_HOST)
    }

    /// User and password from the credentials section named by the
    /// upper-cased short name.
    pub fn database_credentials(&self) -> Result<(String, String)> {
        let section = self.short_name()?.to_uppercase();
        let user = self.document.get(&section, OPTION_USER)?;
        let password = self.document.get(&section, OPTION_PASSWORD)?;
        Ok((user, password))
    }

    /// Packages installed into the venv, shared list first.
    pub fn external_modules(&self) -> Result<Vec<String>> {
        let mut modules = self.section_options_if_present(SECTION_COMMON_EXTERNALS)?;
        modules.extend(self.section_options_if_present(SECTION_EXTERNALS)?);
        Ok(modules)
    }

    /// Application modules to deploy, shared list first; the main and wsgi
    /// entries are installed separately and excluded here.
    pub fn modules(&self) -> Result<Vec<String>> {
        let mut modules = self.section_options_if_present(SECTION_COMMON_MODULES)?;
        for name in self.section_options_if_present(SECTION_MODULES)? {
            if name != OPTION_MAIN && name != OPTION_WSGI {
                modules.push(name);
            }
        }
        Ok(modules)
    }

    pub fn main_module(&self) -> Result<String> {
        self.document.get(SECTION_MODULES, OPTION_MAIN)
    }

    pub fn wsgi_module(&self) -> Result<String> {
        self.document.get(SECTION_MODULES, OPTION_WSGI)
    }

    /// Loose files deployed next to a web application, may be empty.
    pub fn extra_files(&self) -> Result<Vec<String>> {
        self.section_options_if_present(SECTION_FILES)
    }

    pub fn wsgi_port(&self) -> Result<u16> {
        let raw = self.document.get(SECTION_WSGI, OPTION_PORT)?;
        raw.parse().map_err(|_| {
            self.configuration_error(format!("[WSGI] port '{raw}' is not a valid port number"))
        })
    }

    /// Port the generated Apache configuration listens on.
    pub fn webapp_port(&self) -> Result<u16> {
        if !self.document.has_option(SECTION_WSGI, OPTION_PORT) {
            return Ok(DEFAULT_WEBAPP_PORT);
        }
        self.wsgi_port()
    }

    /// Locates `manage.py` for a web application: an explicit
    /// `[PATH] django-manager` wins, otherwise the module lookup paths are
    /// probed with the usual exactly-one-match discipline and the result is
    /// cached back into the document.
    pub fn django_manager(&mut self) -> Result<PathBuf> {
        if self.document.has_option(SECTION_PATH, OPTION_DJANGO_MANAGER) {
            return Ok(PathBuf::from(
                self.document.get(SECTION_PATH, OPTION_DJANGO_MANAGER)?,
            ));
        }

        let locator = ModuleLocator::new(self.module_lookup_paths()?);
        let manager = locator.locate("manage.py").map_err(|err| {
            self.configuration_error(format!("cannot locate the Django manager: {}", err.message()))
        })?;
        self.document.set(
            SECTION_PATH,
            OPTION_DJANGO_MANAGER,
            manager.display().to_string(),
        );
        Ok(manager)
    }

    /// `manage.py` as deployed into the service base directory.
    pub fn target_django_manager(&self) -> Result<PathBuf> {
        Ok(self.service_base_dir()?.join("manage.py"))
    }

    pub fn static_target_dir(&self) -> Result<PathBuf> {
        Ok(self.service_base_dir()?.join("static"))
    }

    fn section_options_if_present(&self, section: &str) -> Result<Vec<String>> {
        if !self.document.has_section(section) {
            return Ok(Vec::new());
        }
        self.document.options(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::parse_str;

    fn daemon_document() -> ConfigDocument {
        parse_str(
            "[SERVICE]\n\
             name = Collector\n\
             [GENERAL]\n\
             short-name = coll\n\
             [PATH]\n\
             service-venv = /opt/coll/venv\n\
             service-ini = /etc/coll\n\
             [MODULES]\n\
             main = collector\n\
             [DATABASE]\n\
             host = db.internal\n\
             [COLL]\n\
             user = coll_user\n\
             password = coll_pw\n",
        )
        .unwrap()
    }

    fn daemon_config() -> InstallConfig {
        InstallConfig::from_document(daemon_document()).unwrap()
    }

    #[test]
    fn test_flavor_defaults_to_daemon() {
        let config = daemon_config();
        assert_eq!(config.flavor(), ServiceFlavor::Daemon);
    }

    #[test]
    fn test_unknown_flavor_is_rejected() {
        let mut document = daemon_document();
        document.set("SERVICE", "flavor", "cgi");
        let err = InstallConfig::from_document(document).unwrap_err();
        assert!(err.to_string().contains("unknown service flavor 'cgi'"));
    }

    #[test]
    fn test_verify_reports_every_violation_at_once() {
        let document = parse_str(
            "[SERVICE]\nname = Collector\n[GENERAL]\nshort-name =\n[PATH]\nservice-ini = /etc/x\n",
        )
        .unwrap();
        let err = RequiredOptionSet::for_flavor(ServiceFlavor::Daemon)
            .verify(&document)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("[GENERAL] short-name: value is empty"));
        assert!(message.contains("[PATH] service-venv: option missing"));
        assert!(message.contains("[MODULES] main: section missing"));
        assert!(message.contains("[DATABASE] host: section missing"));
        assert!(!message.contains("[SERVICE] name"));
    }

    #[test]
    fn test_verify_flags_unresolvable_interpolation() {
        let mut document = daemon_document();
        document.set("PATH", "service-venv", "${MISSING:root}/venv");
        let err = RequiredOptionSet::for_flavor(ServiceFlavor::Daemon)
            .verify(&document)
            .unwrap_err();
        assert!(err.to_string().contains("[PATH] service-venv"));
    }

    #[test]
    fn test_wsgi_flavor_requires_wsgi_module_and_port() {
        let mut document = daemon_document();
        document.set("SERVICE", "flavor", "wsgi");
        let err = InstallConfig::from_document(document).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("[MODULES] wsgi"));
        assert!(message.contains("[WSGI] port"));
    }

    #[test]
    fn test_webapp_flavor_requires_base_dir() {
        let mut document = daemon_document();
        document.set("SERVICE", "flavor", "webapp");
        document.set("MODULES", "wsgi", "app.wsgi");
        let err = InstallConfig::from_document(document).unwrap_err();
        assert!(err.to_string().contains("[PATH] service-base"));
    }

    #[test]
    fn test_description_falls_back() {
        let config = daemon_config();
        assert_eq!(config.description().unwrap(), DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_modules_merge_shared_before_specific_and_skip_entry_points() {
        let mut document = daemon_document();
        document.merge_from(
            parse_str(
                "[COMMON-MODULES]\nshared_db\n[MODULES]\nhelpers\nwsgi = app.wsgi\n",
            )
            .unwrap(),
        );
        let config = InstallConfig::from_document(document).unwrap();
        assert_eq!(config.modules().unwrap(), vec!["shared_db", "helpers"]);
        assert_eq!(config.main_module().unwrap(), "collector");
    }

    #[test]
    fn test_external_modules_merge_shared_before_specific() {
        let mut document = daemon_document();
        document.merge_from(
            parse_str("[COMMON-EXTERNALS]\nrequests\n[EXTERNALS]\npsycopg2\n").unwrap(),
        );
        let config = InstallConfig::from_document(document).unwrap();
        assert_eq!(config.external_modules().unwrap(), vec!["requests", "psycopg2"]);
    }

    #[test]
    fn test_missing_module_sections_mean_empty_lists() {
        let config = daemon_config();
        assert!(config.external_modules().unwrap().is_empty());
        assert!(config.extra_files().unwrap().is_empty());
    }

    #[test]
    fn test_lookup_paths_default_to_parent_directory() {
        let config = daemon_config();
        assert_eq!(
            config.module_lookup_paths().unwrap(),
            vec![PathBuf::from("../")]
        );
    }

    #[test]
    fn test_lookup_paths_split_and_trim() {
        let mut document = daemon_document();
        document.set("PATH", "module-path", "../src, ../shared ,/abs");
        let config = InstallConfig::from_document(document).unwrap();
        assert_eq!(
            config.module_lookup_paths().unwrap(),
            vec![
                PathBuf::from("../src"),
                PathBuf::from("../shared"),
                PathBuf::from("/abs")
            ]
        );
    }

    #[test]
    fn test_database_selection_and_fallbacks() {
        let config = daemon_config();
        assert_eq!(config.database(false).unwrap(), DEFAULT_DB);
        assert_eq!(config.database(true).unwrap(), DEFAULT_DB_TEST);

        let mut document = daemon_document();
        document.set("DATABASE", "db", "coll");
        document.set("DATABASE", "db_test", "coll_test");
        let config = InstallConfig::from_document(document).unwrap();
        assert_eq!(config.database(false).unwrap(), "coll");
        assert_eq!(config.database(true).unwrap(), "coll_test");
    }

    #[test]
    fn test_credentials_come_from_uppercased_short_name_section() {
        let config = daemon_config();
        let (user, password) = config.database_credentials().unwrap();
        assert_eq!(user, "coll_user");
        assert_eq!(password, "coll_pw");
    }

    #[test]
    fn test_unit_path_and_template_defaults() {
        let config = daemon_config();
        assert_eq!(
            config.unit_path().unwrap(),
            PathBuf::from("/etc/systemd/system/Collector.service")
        );
        assert_eq!(
            config.unit_template_path().unwrap(),
            PathBuf::from("./templates/daemon.service")
        );
    }

    #[test]
    fn test_unit_template_override() {
        let mut document = daemon_document();
        document.set("PATH", "unit-template", "/tmp/custom.service");
        let config = InstallConfig::from_document(document).unwrap();
        assert_eq!(
            config.unit_template_path().unwrap(),
            PathBuf::from("/tmp/custom.service")
        );
    }

    #[test]
    fn test_site_packages_default_and_override() {
        let config = daemon_config();
        assert_eq!(
            config.site_packages_dir().unwrap(),
            PathBuf::from("/opt/coll/venv/lib/python3/site-packages")
        );

        let mut document = daemon_document();
        document.set("PATH", "site-packages", "/opt/coll/venv/lib/python3.12/site-packages");
        let config = InstallConfig::from_document(document).unwrap();
        assert_eq!(
            config.site_packages_dir().unwrap(),
            PathBuf::from("/opt/coll/venv/lib/python3.12/site-packages")
        );
    }

    #[test]
    fn test_service_log_dir_from_origin_ini_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let origin = dir.path().join("coll.ini");
        std::fs::write(&origin, "[LOG]\nlogfile = /var/log/coll/coll.log\n").unwrap();

        let mut document = daemon_document();
        document.set("PATH", "config-source", origin.display().to_string());
        let mut config = InstallConfig::from_document(document).unwrap();

        assert_eq!(
            config.service_log_dir().unwrap(),
            PathBuf::from("/var/log/coll")
        );

        // A second read must not depend on the origin file any more.
        std::fs::remove_file(&origin).unwrap();
        assert_eq!(
            config.service_log_dir().unwrap(),
            PathBuf::from("/var/log/coll")
        );
    }

    #[test]
    fn test_service_log_dir_defaults_when_origin_is_absent() {
        let mut config = daemon_config();
        assert_eq!(config.service_log_dir().unwrap(), PathBuf::from(DEFAULT_LOG_DIR));
    }

    #[test]
    fn test_explicit_service_log_dir_wins() {
        let mut document = daemon_document();
        document.set("PATH", "service-log", "/srv/logs");
        let mut config = InstallConfig::from_document(document).unwrap();
        assert_eq!(config.service_log_dir().unwrap(), PathBuf::from("/srv/logs"));
    }

    #[test]
    fn test_wsgi_port_parsing() {
        let mut document = daemon_document();
        document.set("WSGI", "port", "8081");
        let config = InstallConfig::from_document(document).unwrap();
        assert_eq!(config.wsgi_port().unwrap(), 8081);
        assert_eq!(config.webapp_port().unwrap(), 8081);

        let mut document = daemon_document();
        document.set("WSGI", "port", "eighty");
        let config = InstallConfig::from_document(document).unwrap();
        assert!(config.wsgi_port().is_err());
    }

    #[test]
    fn test_webapp_port_defaults() {
        let config = daemon_config();
        assert_eq!(config.webapp_port().unwrap(), DEFAULT_WEBAPP_PORT);
    }

    #[test]
    fn test_django_manager_discovery_is_memoized() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manage.py"), "#!/usr/bin/python3\n").unwrap();

        let mut document = daemon_document();
        document.set("PATH", "module-path", dir.path().display().to_string());
        let mut config = InstallConfig::from_document(document).unwrap();

        let manager = config.django_manager().unwrap();
        assert_eq!(manager, dir.path().join("manage.py"));

        std::fs::remove_file(dir.path().join("manage.py")).unwrap();
        assert_eq!(config.django_manager().unwrap(), manager);
    }

    #[test]
    fn test_django_manager_absence_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = daemon_document();
        document.set("PATH", "module-path", dir.path().display().to_string());
        let mut config = InstallConfig::from_document(document).unwrap();
        let err = config.django_manager().unwrap_err();
        assert!(err.to_string().contains("Django manager"));
    }

    #[test]
    fn test_load_requires_credentials_and_common_files() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("svc.install.ini");
        std::fs::write(&config_path, "[SERVICE]\nname = svc\n").unwrap();

        let err = InstallConfig::load(&config_path).unwrap_err();
        assert!(err.to_string().contains(".credentials"));

        std::fs::write(dir.path().join(".credentials"), "[SVC]\nuser = u\npassword = p\n")
            .unwrap();
        let err = InstallConfig::load(&config_path).unwrap_err();
        assert!(err.to_string().contains("common.install.ini"));
    }

    #[test]
    fn test_load_layers_credentials_common_and_service() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".credentials"),
            "[COLL]\nuser = secret_user\npassword = secret_pw\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("common.install.ini"),
            "[DATABASE]\nhost = common-host\n[COMMON-MODULES]\nshared_db\n",
        )
        .unwrap();
        let config_path = dir.path().join("coll.install.ini");
        std::fs::write(
            &config_path,
            "[SERVICE]\nname = Collector\n[GENERAL]\nshort-name = coll\n\
             [PATH]\nservice-venv = /opt/coll/venv\nservice-ini = /etc/coll\n\
             [MODULES]\nmain = collector\n[DATABASE]\nhost = db.internal\n",
        )
        .unwrap();

        let config = InstallConfig::load(&config_path).unwrap();
        // The service layer overrides the common database host.
        assert_eq!(config.database_host().unwrap(), "db.internal");
        assert_eq!(config.modules().unwrap(), vec!["shared_db"]);
        let (user, _) = config.database_credentials().unwrap();
        assert_eq!(user, "secret_user");
    }
}
