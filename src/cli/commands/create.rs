//! Create command implementation.
//!
//! The `sprout create` command scaffolds a new project from a built-in,
//! local or remote template.

use std::path::{Path, PathBuf};

use crate::cli::args::CreateArgs;
use crate::config::{SproutConfig, DEFAULT_TEMPLATE};
use crate::error::{Result, SproutError};
use crate::generator::{
    git_init, is_git_available, prepare_target, Generated, Generator, GitInit, TemplateContext,
};
use crate::template::{builtin, Fetcher, TemplateProvider, TemplateSource};
use crate::ui::{Prompt, PromptOption, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Name offered when none is given.
pub const DEFAULT_PROJECT_NAME: &str = "sprout-project";

/// The create command implementation.
pub struct CreateCommand {
    working_dir: PathBuf,
    config: SproutConfig,
    args: CreateArgs,
}

impl CreateCommand {
    /// Create a new create command.
    pub fn new(working_dir: &Path, config: SproutConfig, args: CreateArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            config,
            args,
        }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &CreateArgs {
        &self.args
    }

    /// Run with an explicit provider.
    pub fn run_with<F: Fetcher>(
        &self,
        provider: &TemplateProvider<F>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandResult> {
        let name = self.project_name(ui)?;
        let Some(project_name) = Path::new(&name)
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
        else {
            ui.error(&format!("Invalid project name: '{}'", name));
            return Ok(CommandResult::failure(2));
        };

        let template = self.template(ui)?;
        let builtins = builtin::names();
        let source = TemplateSource::classify(&template, &builtins);
        let target = self.working_dir.join(&name);

        ui.show_header(&format!("Creating {}", project_name));
        ui.detail(&format!("Template: {}", source));
        ui.detail(&format!("Target: {}", target.display()));

        if !self.prepare(&target, ui)? {
            return Ok(CommandResult::failure(1));
        }

        let context = TemplateContext::new(&project_name).with("template", template.as_str());
        let generated = match self.generate(provider, &source, &target, &context, ui) {
            Ok(generated) => generated,
            Err(e) if source.is_remote() => {
                ui.error(&e.to_string());
                match self.fall_back(provider, &target, &context, &builtins, ui)? {
                    Some(generated) => generated,
                    None => return Ok(CommandResult::failure(1)),
                }
            }
            Err(e) => return Err(e),
        };

        if self.args.git_choice().unwrap_or(self.config.defaults.git) {
            init_repository(&generated.target, ui);
        }

        ui.success(&format!(
            "Created {} ({} files)",
            project_name, generated.files
        ));
        ui.message("\nNext steps:");
        ui.message(&format!("  cd {}", name));
        ui.message("  npm install");
        ui.message("  npm run dev");

        Ok(CommandResult::success())
    }

    fn project_name(&self, ui: &mut dyn UserInterface) -> Result<String> {
        let name = match &self.args.name {
            Some(name) => name.clone(),
            None => ui
                .prompt(&Prompt::input(
                    "project-name",
                    "Project name",
                    Some(DEFAULT_PROJECT_NAME),
                ))?
                .as_string(),
        };

        let name = name.trim().trim_end_matches(['/', '\\']).to_string();
        if name.is_empty() {
            return Err(SproutError::ConfigValidationError {
                message: "project name cannot be empty".to_string(),
            });
        }
        Ok(name)
    }

    fn template(&self, ui: &mut dyn UserInterface) -> Result<String> {
        if let Some(template) = &self.args.template {
            return Ok(template.clone());
        }

        let options: Vec<PromptOption> = builtin::list()?
            .into_iter()
            .map(|t| PromptOption::new(format!("{} - {}", t.name, t.description), t.name))
            .collect();

        let answer = ui.prompt(&Prompt::select(
            "template",
            "Select a template",
            options,
            Some(self.config.defaults.template.as_str()),
        ))?;

        Ok(answer.as_string())
    }

    /// Ensure the target is usable. Returns false if the user declined.
    fn prepare(&self, target: &Path, ui: &mut dyn UserInterface) -> Result<bool> {
        match prepare_target(target, self.args.force) {
            Ok(()) => Ok(true),
            Err(SproutError::TargetNotEmpty { path }) => {
                let answer = ui.prompt(&Prompt::confirm(
                    "overwrite",
                    &format!(
                        "{} is not empty. Remove existing files and continue?",
                        path.display()
                    ),
                    false,
                ))?;

                if answer.as_bool() == Some(true) {
                    prepare_target(target, true)?;
                    Ok(true)
                } else {
                    ui.error(&format!(
                        "Target directory is not empty: {} (use --force to overwrite)",
                        path.display()
                    ));
                    Ok(false)
                }
            }
            Err(e) => Err(e),
        }
    }

    fn generate<F: Fetcher>(
        &self,
        provider: &TemplateProvider<F>,
        source: &TemplateSource,
        target: &Path,
        context: &TemplateContext,
        ui: &mut dyn UserInterface,
    ) -> Result<Generated> {
        let mut spinner = ui.start_spinner(&format!("Preparing {}", source));
        match Generator::new(provider).generate(source, target, context) {
            Ok(generated) => {
                spinner.finish_success(&format!("Copied {}", source));
                Ok(generated)
            }
            Err(e) => {
                spinner.finish_error(&format!("Could not use {}", source));
                Err(e)
            }
        }
    }

    /// Offer the default built-in after a remote failure.
    fn fall_back<F: Fetcher>(
        &self,
        provider: &TemplateProvider<F>,
        target: &Path,
        context: &TemplateContext,
        builtins: &[String],
        ui: &mut dyn UserInterface,
    ) -> Result<Option<Generated>> {
        let default = if builtins.contains(&self.config.defaults.template) {
            self.config.defaults.template.clone()
        } else {
            DEFAULT_TEMPLATE.to_string()
        };

        let answer = ui.prompt(&Prompt::confirm(
            "use-default-template",
            &format!("Continue with the built-in '{}' template instead?", default),
            false,
        ))?;
        if answer.as_bool() != Some(true) {
            ui.message("Aborted");
            return Ok(None);
        }

        prepare_target(target, true)?;
        let source = TemplateSource::Builtin(default);
        self.generate(provider, &source, target, context, ui).map(Some)
    }
}

impl Command for CreateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let provider = TemplateProvider::from_config(&self.config)?;
        self.run_with(&provider, ui)
    }
}

/// Initialize git in the new project, reporting problems as warnings.
fn init_repository(dir: &Path, ui: &mut dyn UserInterface) {
    if !is_git_available() {
        ui.warning("git not found; skipping repository initialization");
        return;
    }

    match git_init(dir) {
        Ok(GitInit::Committed) => ui.detail("Initialized git repository"),
        Ok(GitInit::InitializedOnly) => {
            ui.warning("Initialized git repository, but the initial commit failed")
        }
        Err(e) => ui.warning(&format!("Failed to initialize git repository: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::template::CanonicalLocator;
    use crate::ui::MockUI;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    struct FailingFetcher;

    impl Fetcher for FailingFetcher {
        fn fetch(&self, locator: &CanonicalLocator, destination: &Path) -> Result<()> {
            Err(SproutError::FetchFailed {
                locator: locator.to_string(),
                destination: destination.to_path_buf(),
                message: "repository or branch not found (HTTP 404)".into(),
            })
        }
    }

    fn provider(temp: &TempDir) -> TemplateProvider<FailingFetcher> {
        TemplateProvider::new(
            CacheStore::new(temp.path().join("cache"), Duration::from_secs(60)),
            FailingFetcher,
        )
    }

    fn command(temp: &TempDir, args: CreateArgs) -> CreateCommand {
        CreateCommand::new(temp.path(), SproutConfig::default(), args)
    }

    fn args(name: &str, template: &str) -> CreateArgs {
        CreateArgs {
            name: Some(name.into()),
            template: Some(template.into()),
            no_git: true,
            ..Default::default()
        }
    }

    #[test]
    fn creates_from_builtin() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = command(&temp, args("my-app", "vanilla"))
            .run_with(&provider(&temp), &mut ui)
            .unwrap();

        assert!(result.success);
        let pkg = fs::read_to_string(temp.path().join("my-app/package.json")).unwrap();
        assert!(pkg.contains("\"name\": \"my-app\""));
        assert!(temp.path().join("my-app/.gitignore").exists());
        assert!(ui.has_success("Created my-app"));
    }

    #[test]
    fn creates_from_local_directory() {
        let temp = TempDir::new().unwrap();
        let local = temp.path().join("tpl");
        fs::create_dir_all(&local).unwrap();
        fs::write(local.join("README.md"), "# {{project_name}}").unwrap();
        let mut ui = MockUI::new();

        let result = command(&temp, args("local-app", local.to_str().unwrap()))
            .run_with(&provider(&temp), &mut ui)
            .unwrap();

        assert!(result.success);
        assert_eq!(
            fs::read_to_string(temp.path().join("local-app/README.md")).unwrap(),
            "# local-app"
        );
    }

    #[test]
    fn prompts_for_missing_name_and_template() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        ui.set_prompt_response("project-name", "prompted");
        ui.set_prompt_response("template", "vanilla-ts");

        let cmd = command(
            &temp,
            CreateArgs {
                no_git: true,
                ..Default::default()
            },
        );
        let result = cmd.run_with(&provider(&temp), &mut ui).unwrap();

        assert!(result.success);
        assert_eq!(ui.prompts_shown(), ["project-name", "template"]);
        assert!(temp.path().join("prompted/tsconfig.json").exists());
    }

    #[test]
    fn remote_failure_falls_back_to_default_when_accepted() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        ui.set_prompt_response("use-default-template", "yes");

        let result = command(&temp, args("fallback", "someone/missing"))
            .run_with(&provider(&temp), &mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_error("someone/missing"));
        assert!(temp.path().join("fallback/index.html").exists());
    }

    #[test]
    fn remote_failure_aborts_when_declined() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        ui.set_prompt_response("use-default-template", "no");

        let result = command(&temp, args("aborted", "someone/missing"))
            .run_with(&provider(&temp), &mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_message("Aborted"));
    }

    #[test]
    fn non_empty_target_is_kept_when_declined() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("existing");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("keep.txt"), "mine").unwrap();
        let mut ui = MockUI::new();

        let result = command(&temp, args("existing", "vanilla"))
            .run_with(&provider(&temp), &mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(target.join("keep.txt").exists());
        assert!(ui.has_error("not empty"));
    }

    #[test]
    fn non_empty_target_is_replaced_when_confirmed() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("existing");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("old.txt"), "old").unwrap();
        let mut ui = MockUI::new();
        ui.set_prompt_response("overwrite", "y");

        let result = command(&temp, args("existing", "vanilla"))
            .run_with(&provider(&temp), &mut ui)
            .unwrap();

        assert!(result.success);
        assert!(!target.join("old.txt").exists());
        assert!(target.join("package.json").exists());
    }

    #[test]
    fn force_skips_overwrite_prompt() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("forced");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("old.txt"), "old").unwrap();
        let mut ui = MockUI::new();

        let mut create_args = args("forced", "vanilla");
        create_args.force = true;
        let result = command(&temp, create_args)
            .run_with(&provider(&temp), &mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.prompts_shown().is_empty());
    }

    #[test]
    fn empty_name_is_rejected() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let err = command(&temp, args("  ", "vanilla"))
            .run_with(&provider(&temp), &mut ui)
            .unwrap_err();

        assert!(err.to_string().contains("project name"));
    }
}
