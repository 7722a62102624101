//! Unified install and update sequence for every service flavor.

use std::path::PathBuf;

use crate::config::{EnvIniWriter, ServiceFlavor};
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::orchestration::ServiceContext;
use crate::service::{UnitFields, UnitFile};
use crate::web::{ApacheConfigurator, ApacheSettings, StaticFiles};

/// Knobs of one installation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    update_only: bool,
    test_database: bool,
    start_after_install: bool,
}

impl InstallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh deployed code and configuration without recreating the
    /// virtual environment or touching the supervisor registration.
    pub fn with_update_only(mut self, update_only: bool) -> Self {
        self.update_only = update_only;
        self
    }

    /// Point the generated environment settings at the test database.
    pub fn with_test_database(mut self, test_database: bool) -> Self {
        self.test_database = test_database;
        self
    }

    /// Start the service as the final step of the run.
    pub fn with_start(mut self, start: bool) -> Self {
        self.start_after_install = start;
        self
    }
}

/// What one run deployed.
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub service_name: String,
    pub flavor: ServiceFlavor,
    pub external_modules: usize,
    pub modules: usize,
    pub unit_file: Option<PathBuf>,
    pub started: bool,
}

/// The deployed artifact the generated unit file has to point at.
enum EntryPoint {
    /// Deployed main module, run directly by the supervisor.
    Daemon(PathBuf),
    /// Deployed wsgi file, served by `mod_wsgi-express`.
    Wsgi(PathBuf),
    /// Start and stop go through the generated `apachectl`.
    WebApp,
}

pub struct InstallOrchestrator {
    context: ServiceContext,
    options: InstallOptions,
}

impl InstallOrchestrator {
    pub fn new(context: ServiceContext, options: InstallOptions) -> Self {
        Self { context, options }
    }

    /// Runs the fixed installation sequence. Any fatal error aborts the
    /// remainder; there is no rollback.
    pub fn execute(&mut self) -> Result<InstallReport> {
        let service_name = self.context.service_name().to_string();
        let flavor = self.context.config.flavor();
        tracing::info!(
            "installation initialized for service {service_name}{}",
            if self.options.update_only {
                " [update-only mode]"
            } else {
                ""
            }
        );

        self.context.control.stop()?;
        tracing::info!("service {service_name} stopped");

        let mut external_modules = 0;
        if !self.options.update_only {
            self.context.control.disable()?;
            tracing::info!("service {service_name} disabled");

            self.context.venv.create()?;
            tracing::info!(
                "virtual environment created at {}",
                self.context.venv.path().display()
            );

            external_modules = self.install_external_modules()?;
        }

        let modules = self.install_modules()?;
        let entry = self.install_entry_point()?;

        if !self.options.update_only {
            self.ensure_log_dir()?;
        }

        self.context.settings.copy()?;
        tracing::info!(
            "service configuration copied to {}",
            self.context.settings.target_file().display()
        );

        if matches!(flavor, ServiceFlavor::Daemon | ServiceFlavor::Wsgi) {
            let env_ini = self.write_env_ini()?;
            tracing::info!("environment settings written to {}", env_ini.display());
        }

        let mut unit_file = None;
        if !self.options.update_only {
            let unit_path = self.render_unit(&entry)?;
            tracing::info!("unit file created at {}", unit_path.display());
            unit_file = Some(unit_path);

            self.context.control.register()?;
            tracing::info!("supervisor instructed to enable the service");
        }

        if self.options.start_after_install {
            self.context.control.start()?;
            tracing::info!("service {service_name} started");
        }

        if self.options.update_only {
            tracing::info!("service {service_name} updated");
        } else {
            tracing::info!("service {service_name} installed");
        }
        Ok(InstallReport {
            service_name,
            flavor,
            external_modules,
            modules,
            unit_file,
            started: self.options.start_after_install,
        })
    }

    fn install_external_modules(&self) -> Result<usize> {
        let externals = self.context.config.external_modules()?;
        for external in &externals {
            self.context.venv.install_package(external)?;
            tracing::info!("module {external} installed");
        }
        tracing::info!("all external modules installed");
        Ok(externals.len())
    }

    fn install_modules(&self) -> Result<usize> {
        let modules = self.context.config.modules()?;
        for module in &modules {
            self.context.installer.install_module(module)?;
            tracing::info!("module {module} installed");
        }
        tracing::info!("all modules installed");
        Ok(modules.len())
    }

    /// Deploys the flavor's entry-point artifacts and reports what the
    /// unit file has to reference.
    fn install_entry_point(&mut self) -> Result<EntryPoint> {
        match self.context.config.flavor() {
            ServiceFlavor::Daemon => {
                let main_module = self.context.config.main_module()?;
                let target = self.context.installer.install_main(&main_module)?;
                tracing::info!("main module {main_module} installed at {}", target.display());
                Ok(EntryPoint::Daemon(target))
            }
            ServiceFlavor::Wsgi => {
                let main_module = self.context.config.main_module()?;
                let main_target = self.context.installer.install_file(&main_module)?;
                tracing::info!(
                    "main module {main_module} installed at {}",
                    main_target.display()
                );

                let wsgi_module = self.context.config.wsgi_module()?;
                let wsgi_target = self.context.installer.install_file(&wsgi_module)?;
                tracing::info!(
                    "wsgi file {wsgi_module} installed at {}",
                    wsgi_target.display()
                );
                Ok(EntryPoint::Wsgi(wsgi_target))
            }
            ServiceFlavor::WebApp => {
                let wsgi_module = self.context.config.wsgi_module()?;
                let wsgi_target = self.context.installer.install_file(&wsgi_module)?;
                tracing::info!(
                    "wsgi file {wsgi_module} installed at {}",
                    wsgi_target.display()
                );

                let python = self.context.venv.python();
                let manager = self.context.config.django_manager()?;
                let target_dir = self.context.config.static_target_dir()?;
                let statics = StaticFiles::new(python, manager, target_dir);
                statics.collect()?;
                tracing::info!(
                    "static files collected into {}",
                    statics.target_dir().display()
                );

                for file in self.context.config.extra_files()? {
                    let target = self.context.installer.install_file(&file)?;
                    tracing::info!("file {file} installed at {}", target.display());
                }
                tracing::info!("all files installed");
                Ok(EntryPoint::WebApp)
            }
        }
    }

    /// The services log as an unprivileged user, so the directory is
    /// created and widened without sudo, best-effort.
    fn ensure_log_dir(&mut self) -> Result<()> {
        let log_dir = self.context.config.service_log_dir()?;
        let dir = log_dir.display().to_string();
        let runner = CommandRunner::new("COMMAND");
        if !log_dir.exists() {
            runner.execute(&["mkdir", "-p", dir.as_str()], false)?;
            tracing::info!("service log dir {dir} created");
        }
        runner.execute(&["chmod", "ugo+rw", dir.as_str()], false)?;
        tracing::info!("access rights to service log dir {dir} amended");
        Ok(())
    }

    fn write_env_ini(&self) -> Result<PathBuf> {
        let writer = EnvIniWriter::new(self.context.config.env_ini_path()?);
        let host = self.context.config.database_host()?;
        let db = self.context.config.database(self.options.test_database)?;
        let (user, password) = self.context.config.database_credentials()?;
        writer.create(&host, &db, &user, &password)?;
        Ok(writer.target_file().to_path_buf())
    }

    fn render_unit(&mut self, entry: &EntryPoint) -> Result<PathBuf> {
        let template = self.context.config.unit_template_path()?;
        let unit = UnitFile::load(&template, self.context.config.unit_path()?)?;
        let description = self.context.config.description()?;

        let fields = match entry {
            EntryPoint::Daemon(main_target) => UnitFields::new(
                main_target.display().to_string(),
                self.context.installer.base_dir().display().to_string(),
            )
            .with_description(description),
            EntryPoint::Wsgi(wsgi_target) => {
                let server = self.context.venv.path().join("bin/mod_wsgi-express");
                let exec_start = format!(
                    "{} start-server {} --port={}",
                    server.display(),
                    wsgi_target.display(),
                    self.context.config.wsgi_port()?
                );
                UnitFields::new(
                    exec_start,
                    self.context.installer.base_dir().display().to_string(),
                )
                .with_description(description)
            }
            EntryPoint::WebApp => {
                let apachectl = self.configure_apache()?;
                UnitFields::new(
                    format!("{} start", apachectl.display()),
                    self.context.config.service_base_dir()?.display().to_string(),
                )
                .with_description(description)
                .with_exec_stop(format!("{} stop", apachectl.display()))
            }
        };
        unit.create(&fields)
    }

    /// Generates the Apache instance and returns the path of its control
    /// script for the unit's start and stop commands.
    fn configure_apache(&mut self) -> Result<PathBuf> {
        let log_dir = self.context.config.service_log_dir()?.join("web");
        let apache = ApacheConfigurator::new(ApacheSettings {
            venv_python: self.context.venv.python(),
            django_manager: self.context.config.target_django_manager()?,
            server_root: self.context.config.service_ini_dir()?,
            working_dir: self.context.config.service_base_dir()?,
            site_packages: self.context.config.site_packages_dir()?,
            log_dir,
            process_name: self.context.service_name().to_string(),
            port: self.context.config.webapp_port()?,
        });
        apache.configure()?;
        tracing::info!("runmodwsgi executed to create the Apache configuration");
        Ok(apache.apachectl())
    }
}
