//! Handlers for `install`, `uninstall` and `retry`.
//!
//! Each command opens the engine against the configured database, recovers
//! persisted instances, performs one operation and shuts the engine down.
//! Provisioning that is still in flight when the command exits resumes under
//! the next `berth run`.

use std::path::Path;
use std::time::Duration;

use miette::Result;
use serde_json::json;

use super::command::{InstallArgs, TargetArgs};
use super::diagnostic::report;
use super::{config, output};
use crate::domain::{InstanceState, UserId};
use crate::error::InstallError;
use crate::infrastructure::config::Config;
use crate::infrastructure::Engine;
use crate::port::{InstallApi, InstallRequest, InstanceView, UninstallRequest};

async fn open(path: &Path, with_catalog: bool) -> Result<(Config, Engine)> {
    let config = config::load(path)?;
    let engine = Engine::build(&config).map_err(report)?;
    engine
        .installer()
        .recover()
        .map_err(|e| report(e.into()))?;

    if with_catalog {
        engine.load_catalog().await.map_err(report)?;
    }
    Ok((config, engine))
}

fn print_instance(command: &str, view: &InstanceView) {
    if output::is_json() {
        output::json_output(json!({
            "command": command,
            "instance": view,
        }));
        return;
    }

    output::field("Name", &view.name);
    output::field("Package", &view.package_id);
    output::field("State", output::state(view.state));
    if let Some(error) = &view.error {
        output::field("Error", output::muted(error));
    }
}

/// Turn a settled view into the command outcome.
fn settle(view: &InstanceView, config: &Config) -> std::result::Result<(), InstallError> {
    match view.state {
        InstanceState::Stuck => Err(InstallError::StuckInstallation {
            name: view.name.clone(),
            waited_secs: config.install.stuck_threshold_secs,
        }),
        InstanceState::Failed => Err(InstallError::DeployFailure {
            reason: view
                .error
                .clone()
                .unwrap_or_else(|| "installation failed".to_string()),
        }),
        _ => Ok(()),
    }
}

/// Install a package under a new name.
pub async fn install(args: &InstallArgs) -> Result<()> {
    let (config, engine) = open(&args.config.config, true).await?;
    let installer = engine.installer();
    let user = UserId::from(args.user.as_str());

    let pb = output::spinner(&format!("Installing {}", args.name));
    let dispatched = installer
        .install(InstallRequest::new(
            user.clone(),
            args.name.as_str(),
            args.package.as_str(),
        ))
        .await;
    let mut view = match dispatched {
        Ok(view) => view,
        Err(e) => {
            output::spinner_fail(&pb, e.user_message());
            installer.shutdown().await;
            return Err(report(e.into()));
        }
    };

    if args.wait {
        pb.set_message(format!("Provisioning {}", args.name));
        let timeout = Duration::from_secs(args.timeout_secs);
        if let Some(settled) = installer.wait_for_settled(&user, &args.name, timeout).await {
            view = settled;
        }
    }
    installer.shutdown().await;

    let outcome = settle(&view, &config);
    match (&outcome, view.state) {
        (Err(e), _) => output::spinner_fail(&pb, e.user_message()),
        (Ok(()), InstanceState::Running) => {
            output::spinner_success(&pb, &format!("{} is running", view.name));
        }
        (Ok(()), _) => output::spinner_success(&pb, &format!("{} dispatched", view.name)),
    }
    print_instance("install", &view);
    if view.state == InstanceState::Provisioning {
        output::hint("provisioning continues under `berth run`");
    }

    outcome.map_err(|e| report(e.into()))
}

/// Remove an instance.
pub async fn uninstall(args: &TargetArgs) -> Result<()> {
    let (_, engine) = open(&args.config.config, false).await?;
    let installer = engine.installer();

    let pb = output::spinner(&format!("Removing {}", args.name));
    let result = installer
        .uninstall(UninstallRequest::new(args.user.as_str(), args.name.as_str()))
        .await;
    installer.shutdown().await;

    match result {
        Ok(()) => {
            output::spinner_success(&pb, &format!("{} removed", args.name));
            if output::is_json() {
                output::json_output(json!({
                    "command": "uninstall",
                    "name": args.name,
                    "removed": true,
                }));
            }
            Ok(())
        }
        Err(e) => {
            output::spinner_fail(&pb, e.user_message());
            Err(report(e.into()))
        }
    }
}

/// Retry a stuck or failed instance.
pub async fn retry(args: &TargetArgs) -> Result<()> {
    let (_, engine) = open(&args.config.config, true).await?;
    let installer = engine.installer();
    let user = UserId::from(args.user.as_str());

    let pb = output::spinner(&format!("Retrying {}", args.name));
    let result = installer.retry(&user, &args.name).await;
    installer.shutdown().await;

    match result {
        Ok(view) => {
            output::spinner_success(&pb, &format!("{} is {}", view.name, view.state));
            print_instance("retry", &view);
            Ok(())
        }
        Err(e) => {
            output::spinner_fail(&pb, e.user_message());
            Err(report(e.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::PackageId;

    fn view(state: InstanceState, error: Option<&str>) -> InstanceView {
        InstanceView {
            name: "myapp".into(),
            package_id: PackageId::from("wordpress"),
            state,
            error: error.map(Into::into),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_status_check: None,
        }
    }

    #[test]
    fn settle_maps_terminal_failures() {
        let config = Config::default();

        assert!(settle(&view(InstanceState::Running, None), &config).is_ok());
        assert!(settle(&view(InstanceState::Provisioning, None), &config).is_ok());
        assert_eq!(
            settle(&view(InstanceState::Stuck, None), &config),
            Err(InstallError::StuckInstallation {
                name: "myapp".into(),
                waited_secs: 15,
            })
        );
        assert_eq!(
            settle(&view(InstanceState::Failed, Some("image pull failed")), &config),
            Err(InstallError::DeployFailure {
                reason: "image pull failed".into(),
            })
        );
    }
}
